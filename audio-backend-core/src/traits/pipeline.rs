use crate::models::format::StreamFormat;

/// Microphone side of the application's internal audio pipeline.
///
/// The pipeline owns all encoding and mixing; this backend only feeds it.
pub trait CapturePipeline: Send + Sync {
    /// One-time mixer initialization with the negotiated stream format.
    fn initialize(&self, format: &StreamFormat);

    /// Hand one block of captured samples to the pipeline.
    ///
    /// Called synchronously from the server's real-time thread; must not
    /// block or allocate.
    fn add_mic(&self, samples: &[f32]);
}

/// Speaker side of the application's internal audio pipeline.
pub trait PlaybackPipeline: Send + Sync {
    /// One-time mixer initialization with the negotiated stream format.
    fn initialize(&self, format: &StreamFormat);

    /// Fill `buffer` with mixed output for one block. The buffer arrives
    /// zero-filled; returns whether any audio was written.
    ///
    /// Called synchronously from the server's real-time thread; must not
    /// block or allocate.
    fn mix(&self, buffer: &mut [f32]) -> bool;
}
