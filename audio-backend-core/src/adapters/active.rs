use std::sync::Arc;

use arc_swap::ArcSwapOption;

use super::capture::CaptureAdapter;
use super::playback::PlaybackAdapter;

/// The application's current capture/playback device pointers.
///
/// Owned by the application; this backend only loads them from the
/// real-time process callback. Loads are lock-free, so the callback never
/// waits on a writer.
#[derive(Default)]
pub struct ActiveDevices {
    capture: ArcSwapOption<CaptureAdapter>,
    playback: ArcSwapOption<PlaybackAdapter>,
}

impl ActiveDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_capture(&self, adapter: Option<Arc<CaptureAdapter>>) {
        self.capture.store(adapter);
    }

    pub fn set_playback(&self, adapter: Option<Arc<PlaybackAdapter>>) {
        self.playback.store(adapter);
    }

    pub fn capture(&self) -> Option<Arc<CaptureAdapter>> {
        self.capture.load_full()
    }

    pub fn playback(&self) -> Option<Arc<PlaybackAdapter>> {
        self.playback.load_full()
    }
}
