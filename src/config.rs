//! Engine configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result, DEFAULT_MAX_FAN_OUT, MAX_BLOCK_SIZE, MAX_CHANNELS};

/// Configuration for the [`Evaluator`](crate::engine::Evaluator).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub channels: usize,
    /// Largest block rendered in one pass; longer callbacks are split.
    pub max_block_frames: usize,
    /// How many ports one node may feed.
    pub max_fan_out: usize,
    /// Linear gain applied to the summed sinks before clipping.
    pub output_gain: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            channels: 2,
            max_block_frames: MAX_BLOCK_SIZE,
            max_fan_out: DEFAULT_MAX_FAN_OUT,
            output_gain: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_max_block_frames(mut self, frames: usize) -> Self {
        self.max_block_frames = frames;
        self
    }

    pub fn with_max_fan_out(mut self, limit: usize) -> Self {
        self.max_fan_out = limit;
        self
    }

    pub fn with_output_gain(mut self, gain: f32) -> Self {
        self.output_gain = gain;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(8_000.0..=384_000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(Error::InvalidChannelCount(self.channels));
        }
        if self.max_block_frames == 0 || self.max_block_frames > MAX_BLOCK_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max_block_frames {} out of range (1-{})",
                self.max_block_frames, MAX_BLOCK_SIZE
            )));
        }
        if self.max_fan_out == 0 {
            return Err(Error::InvalidConfig("max_fan_out must be at least 1".into()));
        }
        if !self.output_gain.is_finite() || self.output_gain < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "output_gain {} must be finite and non-negative",
                self.output_gain
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate, 48_000.0);
        assert_eq!(config.channels, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad_rate = EngineConfig::default().with_sample_rate(f32::NAN);
        assert!(matches!(bad_rate.validate(), Err(Error::InvalidSampleRate(_))));

        let no_channels = EngineConfig::default().with_channels(0);
        assert!(matches!(no_channels.validate(), Err(Error::InvalidChannelCount(0))));

        let huge_block = EngineConfig::default().with_max_block_frames(MAX_BLOCK_SIZE + 1);
        assert!(matches!(huge_block.validate(), Err(Error::InvalidConfig(_))));

        let negative_gain = EngineConfig::default().with_output_gain(-1.0);
        assert!(negative_gain.validate().is_err());
    }
}
