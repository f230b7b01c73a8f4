//! Error types for patch construction and host I/O.
//!
//! Nothing on the render path returns these; rendering degrades to silence.

use thiserror::Error;

use crate::graph::NodeKind;

/// Error type for patchbay operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid sample rate: {0}. Must be between 8000 and 384000 Hz")]
    InvalidSampleRate(f32),

    #[error("Invalid channel count: {0}. Must be between 1 and {max}", max = crate::MAX_CHANNELS)]
    InvalidChannelCount(usize),

    #[error("{node:?} has no input named '{port}'")]
    UnknownPort { node: NodeKind, port: String },

    #[error("{node:?} has no parameter named '{param}'")]
    UnknownParam { node: NodeKind, param: String },

    #[error("Source already feeds {limit} ports")]
    FanOutExceeded { limit: usize },

    #[error("Engine command queue is full")]
    CommandQueueFull,

    #[error("Sample data is empty")]
    EmptySample,

    #[error("No default audio device available")]
    DeviceNotAvailable,

    #[error("Failed to query default stream config")]
    DefaultStreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to build audio stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to play audio stream")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Failed to pause audio stream")]
    PauseStream(#[from] cpal::PauseStreamError),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
