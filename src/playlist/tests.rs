use std::path::PathBuf;

use super::*;
use crate::store::{PersistedTapeRecord, TapeId};

fn demo(name: &str) -> TrackDescriptor {
    TrackDescriptor::bundled(name, PathBuf::from(format!("{name}.mp3")))
}

fn imported(id: u64, name: &str) -> TrackDescriptor {
    TrackDescriptor::persisted(PersistedTapeRecord {
        id: TapeId(id),
        name: name.to_string(),
        bytes: vec![0; 4],
        created_at: 0,
    })
}

fn three_demos() -> Playlist {
    Playlist::new(vec![demo("hatsukoi"), demo("okashina"), demo("kaseijin")])
}

#[test]
fn empty_playlist_has_no_cursor_and_navigation_is_noop() {
    let mut p = Playlist::default();
    assert_eq!(p.cursor(), None);
    p.next();
    p.prev();
    assert_eq!(p.cursor(), None);
    assert!(p.current().is_none());
}

#[test]
fn first_append_sets_cursor() {
    let mut p = Playlist::default();
    p.append(demo("a"));
    assert_eq!(p.cursor(), Some(0));
    p.append(demo("b"));
    assert_eq!(p.cursor(), Some(0));
    assert_eq!(p.len(), 2);
}

#[test]
fn next_wraps_around() {
    let mut p = three_demos();
    assert!(p.select(2));
    p.next();
    assert_eq!(p.cursor(), Some(0));
}

#[test]
fn prev_wraps_around() {
    let mut p = three_demos();
    p.prev();
    assert_eq!(p.cursor(), Some(2));
}

#[test]
fn next_and_prev_are_inverse_for_every_position() {
    for len in 1..6 {
        let mut p = Playlist::new((0..len).map(|i| demo(&i.to_string())).collect());
        for start in 0..len {
            assert!(p.select(start));
            p.next();
            p.prev();
            assert_eq!(p.cursor(), Some(start));
            p.prev();
            p.next();
            assert_eq!(p.cursor(), Some(start));
        }
    }
}

#[test]
fn removing_demo_tape_is_protected_and_changes_nothing() {
    let mut p = three_demos();
    p.select(1);
    let err = p.remove(1).unwrap_err();
    assert_eq!(
        err,
        PlaylistError::Protected {
            name: "okashina".to_string()
        }
    );
    assert_eq!(p.len(), 3);
    assert_eq!(p.cursor(), Some(1));
    assert_eq!(p.current().unwrap().name, "okashina");
}

#[test]
fn removing_out_of_range_is_an_error() {
    let mut p = three_demos();
    assert_eq!(
        p.remove(3).unwrap_err(),
        PlaylistError::OutOfRange { index: 3, len: 3 }
    );
}

#[test]
fn import_then_delete_keeps_cursor_in_bounds() {
    let mut p = three_demos();
    p.select(2);
    p.next();
    assert_eq!(p.cursor(), Some(0));

    p.append(imported(1, "MIXTAPE"));
    assert_eq!(p.len(), 4);
    p.select(3);

    let removed = p.remove(3).unwrap();
    assert_eq!(removed.id, Some(TapeId(1)));
    assert_eq!(p.len(), 3);
    let c = p.cursor().unwrap();
    assert!(c < p.len());
    assert_eq!(c, 0);
}

#[test]
fn removing_current_in_the_middle_keeps_position() {
    let mut p = Playlist::new(vec![imported(1, "A"), imported(2, "B"), imported(3, "C")]);
    p.select(1);
    p.remove(1).unwrap();
    assert_eq!(p.cursor(), Some(1));
    assert_eq!(p.current().unwrap().name, "C");
}

#[test]
fn removing_after_cursor_leaves_cursor_alone() {
    let mut p = Playlist::new(vec![demo("a"), imported(1, "B"), imported(2, "C")]);
    p.select(0);
    p.remove(2).unwrap();
    assert_eq!(p.cursor(), Some(0));
}

#[test]
fn removing_last_tape_clears_cursor() {
    let mut p = Playlist::default();
    p.append(imported(5, "ONLY"));
    p.remove(0).unwrap();
    assert!(p.is_empty());
    assert_eq!(p.cursor(), None);
    assert!(p.current().is_none());
}

#[test]
fn every_persisted_deletion_keeps_cursor_valid() {
    for len in 1..6u64 {
        for at in 0..len as usize {
            let mut p = Playlist::new((0..len).map(|i| imported(i, "T")).collect());
            p.select(at);
            p.remove(at).unwrap();
            match p.cursor() {
                Some(c) => assert!(c < p.len()),
                None => assert!(p.is_empty()),
            }
        }
    }
}

#[test]
fn insert_undoes_a_remove() {
    let mut p = three_demos();
    p.append(imported(1, "mine"));
    p.append(imported(2, "also mine"));

    // Removing the current last tape wraps the cursor to 0.
    p.select(4);
    let removed = p.remove(4).unwrap();
    assert_eq!(p.cursor(), Some(0));
    p.insert(4, removed);
    p.select(4);
    assert_eq!(p.len(), 5);
    assert_eq!(p.current().map(|t| t.name.as_str()), Some("also mine"));

    // Inserting before the cursor keeps it on the same tape.
    p.select(3);
    let removed = p.remove(3).unwrap();
    p.insert(0, removed);
    assert_eq!(p.cursor(), Some(4));
    assert_eq!(p.iter().next().map(|t| t.name.as_str()), Some("mine"));
}

#[test]
fn insert_into_empty_playlist_sets_cursor() {
    let mut p = Playlist::default();
    p.insert(7, imported(1, "solo"));
    assert_eq!(p.cursor(), Some(0));
    assert_eq!(p.len(), 1);
}
