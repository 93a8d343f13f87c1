use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use crate::models::format::{SampleFormat, StreamFormat};
use crate::session::backend::SessionView;
use crate::traits::pipeline::CapturePipeline;

/// State shared between an adapter and its idle worker.
pub(super) struct AdapterShared {
    pub(super) running: AtomicBool,
    pub(super) channels: AtomicUsize,
    wait: Mutex<()>,
    wake: Condvar,
}

impl AdapterShared {
    pub(super) fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            channels: AtomicUsize::new(0),
            wait: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    /// Parks the calling worker until `running` is cleared.
    pub(super) fn idle_wait(&self) {
        let mut guard = self.wait.lock();
        while self.running.load(Ordering::SeqCst) {
            self.wake.wait(&mut guard);
        }
    }

    /// Clears the published state and wakes the idle worker.
    pub(super) fn shut_down(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.channels.store(0, Ordering::SeqCst);
        let _guard = self.wait.lock();
        self.wake.notify_all();
    }
}

/// Microphone-capture device backed by the server session.
///
/// A dedicated worker performs one-time setup, gated on session health, then
/// idle-waits until teardown. The real-time process callback feeds blocks in
/// synchronously via [`add_mic`](Self::add_mic); the worker itself never
/// copies buffers.
pub struct CaptureAdapter {
    shared: Arc<AdapterShared>,
    pipeline: Arc<dyn CapturePipeline>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CaptureAdapter {
    /// Spawn the capture worker. Setup only completes if `session` is
    /// healthy; otherwise the adapter stays idle with zero channels and the
    /// process callback skips it.
    pub fn start(session: SessionView, pipeline: Arc<dyn CapturePipeline>) -> Self {
        let shared = Arc::new(AdapterShared::new());

        let worker_shared = Arc::clone(&shared);
        let worker_pipeline = Arc::clone(&pipeline);
        let handle = thread::Builder::new()
            .name("capture-adapter".into())
            .spawn(move || {
                if session.is_healthy() {
                    let format = StreamFormat {
                        sample_rate: session.sample_rate().max(0) as u32,
                        channels: 1,
                        sample_format: SampleFormat::Float32,
                        channel_masks: Vec::new(),
                    };
                    worker_pipeline.initialize(&format);
                    worker_shared.channels.store(1, Ordering::SeqCst);
                }
                worker_shared.idle_wait();
            })
            .expect("failed to spawn capture worker");

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

    /// Real-time entry point: hand one captured block to the pipeline.
    ///
    /// Called from the server's real-time thread; must not block.
    pub fn add_mic(&self, samples: &[f32]) {
        self.pipeline.add_mic(samples);
    }

    /// Stop the worker and wait for it to exit. The worker has fully exited
    /// before this returns, so no lingering worker can touch the adapter
    /// after destruction.
    pub fn stop(&self) {
        self.shared.shut_down();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureAdapter {
    fn drop(&mut self) {
        self.stop();
    }
}
