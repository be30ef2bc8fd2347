use crate::app::{App, PlaybackState};
use crate::audio::MediaOutput;
use crate::mpris::MprisHandle;

/// Last values pushed to the bus, so unchanged state is not re-sent every frame.
#[derive(Debug, Default)]
pub struct MprisSync {
    index: Option<usize>,
    name: Option<String>,
    playback: PlaybackState,
    primed: bool,
}

impl MprisSync {
    pub fn update<O: MediaOutput>(&mut self, mpris: &MprisHandle, app: &App<O>) {
        let now = app.now_playing();
        let index = now.map(|(i, _)| i);
        let name = now.map(|(_, t)| t.name.clone());
        let playback = app.playback_state();

        if self.primed && index == self.index && name == self.name && playback == self.playback {
            return;
        }
        mpris.set_track_metadata(index, now.map(|(_, t)| t));
        mpris.set_playback(playback);

        self.index = index;
        self.name = name;
        self.playback = playback;
        self.primed = true;
    }
}
