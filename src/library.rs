//! Tapes known to the deck: the `TrackDescriptor` model and the scanner
//! that discovers bundled tapes on disk.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;
