use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::format::{speaker, SampleFormat, StreamFormat};
use crate::session::backend::SessionView;
use crate::traits::pipeline::PlaybackPipeline;

use super::capture::AdapterShared;

/// Speaker-output device backed by the server session, symmetric to
/// [`CaptureAdapter`](super::capture::CaptureAdapter).
///
/// Configures a fixed front-left/front-right speaker layout but reports a
/// single active output channel; the mixer runs at the session sample rate.
pub struct PlaybackAdapter {
    shared: Arc<AdapterShared>,
    pipeline: Arc<dyn PlaybackPipeline>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl PlaybackAdapter {
    /// Spawn the playback worker. Setup only completes if `session` is
    /// healthy; otherwise the adapter stays idle with zero channels and the
    /// process callback skips it.
    pub fn start(session: SessionView, pipeline: Arc<dyn PlaybackPipeline>) -> Self {
        let shared = Arc::new(AdapterShared::new());

        let worker_shared = Arc::clone(&shared);
        let worker_pipeline = Arc::clone(&pipeline);
        let handle = thread::Builder::new()
            .name("playback-adapter".into())
            .spawn(move || {
                if session.is_healthy() {
                    let format = StreamFormat {
                        sample_rate: session.sample_rate().max(0) as u32,
                        channels: 1,
                        sample_format: SampleFormat::Float32,
                        channel_masks: vec![speaker::FRONT_LEFT, speaker::FRONT_RIGHT],
                    };
                    worker_pipeline.initialize(&format);
                    worker_shared.channels.store(1, Ordering::SeqCst);
                }
                worker_shared.idle_wait();
            })
            .expect("failed to spawn playback worker");

        Self {
            shared,
            pipeline,
            worker: Mutex::new(Some(handle)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Active channel count; zero until worker setup completes.
    pub fn channels(&self) -> usize {
        self.shared.channels.load(Ordering::SeqCst)
    }

    /// Real-time entry point: let the pipeline fill one zero-filled output
    /// block. Returns whether any audio was written.
    ///
    /// Called from the server's real-time thread; must not block.
    pub fn mix(&self, buffer: &mut [f32]) -> bool {
        self.pipeline.mix(buffer)
    }

    /// Stop the worker and wait for it to exit.
    pub fn stop(&self) {
        self.shared.shut_down();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PlaybackAdapter {
    fn drop(&mut self) {
        self.stop();
    }
}
