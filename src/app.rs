//! Application state: the playlist, the deck, the tape store and the
//! transport gesture dispatcher, owned together by one `App`.
//!
//! `App` is what the runtime event loop and the UI talk to. `Player` is the
//! part the gesture dispatcher drives.

mod model;
mod player;

pub use model::*;
pub use player::Player;
