use std::path::Path;

use crate::app::{App, Player};
use crate::audio::{Deck, MediaOutput};
use crate::config::Settings;
use crate::gesture::{GestureConfig, GestureDispatcher};
use crate::library::{TrackDescriptor, scan};
use crate::playlist::Playlist;
use crate::store::TrackStore;

/// Assemble the deck: bundled tapes first, then everything the store holds,
/// with the first tape loaded and paused.
pub fn build_app<O: MediaOutput>(settings: &Settings, bundled_dir: Option<&Path>, output: O) -> App<O> {
    let mut tracks: Vec<TrackDescriptor> = match bundled_dir {
        Some(dir) => scan(dir, &settings.library),
        None => Vec::new(),
    };

    let mut status = None;
    let store = match settings.data_dir() {
        Some(dir) => match TrackStore::open(&dir, settings.storage.quota_bytes()) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "tape storage unavailable");
                status = Some("TAPE STORAGE UNAVAILABLE".to_string());
                None
            }
        },
        None => {
            tracing::warn!("no data dir (HOME unset?); imports disabled");
            status = Some("TAPE STORAGE UNAVAILABLE".to_string());
            None
        }
    };

    if let Some(store) = &store {
        match store.list() {
            Ok(records) => {
                tracing::info!(count = records.len(), "restored stored tapes");
                for r in &records {
                    tracing::debug!(id = %r.id, name = %r.name, created_at = r.created_at, "stored tape");
                }
                tracks.extend(records.into_iter().map(TrackDescriptor::persisted));
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored tapes");
                status = Some("COULD NOT READ STORED TAPES".to_string());
            }
        }
    }

    let mut deck = Deck::new(output);
    deck.set_volume(settings.audio.volume);
    deck.set_lofi(settings.audio.lofi);

    let mut player = Player::new(Playlist::new(tracks), deck);
    player.load_current();
    if let Some(msg) = status {
        player.set_status(msg);
    }

    App::new(
        player,
        store,
        GestureDispatcher::new(GestureConfig::from(&settings.transport)),
    )
}
