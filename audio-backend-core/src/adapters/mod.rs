pub mod active;
pub mod capture;
pub mod playback;
