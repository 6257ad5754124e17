pub mod audio;
pub mod scheduler;
pub mod waveform;

pub use audio::{AudioPlayerHandle, Sampler, DEFAULT_FADE, DEFAULT_VOLUME};
pub use scheduler::PlaybackScheduler;
