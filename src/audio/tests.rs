use std::path::PathBuf;
use std::time::Duration;

use super::fake::FakeOutput;
use super::lofi::Tone;
use super::spectrum::FFT_SIZE;
use super::types::PlaybackErrorKind;
use super::*;
use crate::library::TrackDescriptor;

fn tape(name: &str) -> TrackDescriptor {
    TrackDescriptor::bundled(name, PathBuf::from(format!("{name}.mp3")))
}

#[test]
fn loading_while_paused_stays_paused() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.load_current(Some(&tape("a"))).unwrap();
    assert!(deck.is_loaded());
    assert!(!deck.is_playing());
    assert!(!deck.output().running);
}

#[test]
fn loading_while_playing_keeps_playing() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.load_current(Some(&tape("a"))).unwrap();
    deck.play();
    deck.load_current(Some(&tape("b"))).unwrap();
    assert!(deck.output().running);
    assert_eq!(deck.output().loads, 2);
}

#[test]
fn loading_nothing_stops_the_deck() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.load_current(Some(&tape("a"))).unwrap();
    deck.play();
    deck.load_current(None).unwrap();
    assert!(!deck.is_playing());
    assert!(!deck.is_loaded());
    assert!(deck.output().loaded.is_none());
}

#[test]
fn failed_load_reports_kind_and_unloads() {
    let mut output = FakeOutput::default();
    output.fail_next_load = Some(PlaybackErrorKind::Decode);
    let mut deck = Deck::new(output);
    let err = deck.load_current(Some(&tape("broken"))).unwrap_err();
    assert_eq!(err.kind, PlaybackErrorKind::Decode);
    assert!(err.to_string().starts_with("DECODE ERROR"));
    assert!(!deck.is_loaded());
    assert_eq!(deck.position(), Duration::ZERO);
}

#[test]
fn toggle_flips_intent_and_output() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.load_current(Some(&tape("a"))).unwrap();
    assert!(deck.toggle());
    assert!(deck.output().running);
    assert!(!deck.toggle());
    assert!(!deck.output().running);
}

#[test]
fn mute_keeps_volume_level() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.set_volume(0.6);
    deck.set_muted(true);
    assert_eq!(deck.output().volume, 0.0);
    assert_eq!(deck.volume(), 0.6);
    deck.set_muted(false);
    assert_eq!(deck.output().volume, 0.6);
}

#[test]
fn volume_and_lofi_are_clamped() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.set_volume(1.7);
    assert_eq!(deck.volume(), 1.0);
    deck.set_lofi(-1.0);
    assert_eq!(deck.lofi(), 0.0);
    deck.set_lofi(1.0);
    assert_eq!(deck.output().tone, Tone::for_lofi(1.0));
}

#[test]
fn output_can_run_without_changing_intent() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.load_current(Some(&tape("a"))).unwrap();
    deck.resume_output();
    assert!(deck.output().running);
    assert!(!deck.is_playing());
    deck.halt_output();
    assert!(!deck.output().running);
}

#[test]
fn finished_only_counts_while_playing() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.load_current(Some(&tape("a"))).unwrap();
    assert!(!deck.finished());
    deck.output_mut().finished = true;
    assert!(!deck.finished());
    deck.play();
    assert!(deck.finished());
}

#[test]
fn spectrum_follows_what_the_output_played() {
    let mut deck = Deck::new(FakeOutput::default());
    deck.load_current(Some(&tape("a"))).unwrap();
    deck.play();

    // A tone on FFT bin 40 lands in band 10 (four bins per band).
    let tone: Vec<f32> = (0..FFT_SIZE)
        .map(|n| (2.0 * std::f32::consts::PI * 40.0 * n as f32 / FFT_SIZE as f32).sin())
        .collect();
    *deck.output().recent.borrow_mut() = tone;
    deck.refresh_spectrum();

    let bands = deck.spectrum();
    assert!(bands[10] > 0.9);
    assert!(bands[0] < 0.1);
    assert!(deck.output().recent.borrow().is_empty());

    // Nothing new played: the bars fall.
    let before = bands[10];
    for _ in 0..30 {
        deck.refresh_spectrum();
    }
    assert!(deck.spectrum()[10] < before);
}
