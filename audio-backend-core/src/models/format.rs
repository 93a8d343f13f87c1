/// Sample formats the internal audio pipeline accepts.
///
/// This backend always negotiates `Float32`; `Int16` exists for backends
/// that deliver integer PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Int16,
    Float32,
}

/// Speaker-position channel masks (WAVEFORMATEXTENSIBLE values).
pub mod speaker {
    pub const FRONT_LEFT: u32 = 0x1;
    pub const FRONT_RIGHT: u32 = 0x2;
}

/// Stream format an adapter publishes to the internal pipeline at setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFormat {
    /// Sample rate in Hz, taken from the server session.
    pub sample_rate: u32,

    /// Number of active channels the adapter reports.
    pub channels: usize,

    pub sample_format: SampleFormat,

    /// Speaker-position mask per physical output channel; empty for capture.
    pub channel_masks: Vec<u32>,
}
