use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

use crate::{
    engine::{EngineHandle, Evaluator},
    EngineConfig, Error, Result,
};

/// A running output stream on the default device.
///
/// The device callback owns the [`Evaluator`]; patch edits go through the
/// [`EngineHandle`] returned alongside. Dropping the stream stops playback.
pub struct OutputStream {
    stream: cpal::Stream,
    sample_rate: f32,
    channels: usize,
}

impl OutputStream {
    /// Open the default output device and start pulling the graph.
    ///
    /// The device's sample rate and channel count replace the ones in
    /// `config`; everything else is kept.
    pub fn start(config: EngineConfig) -> Result<(OutputStream, EngineHandle)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(Error::DeviceNotAvailable)?;
        let supported = device.default_output_config()?;

        let sample_rate = supported.sample_rate().0 as f32;
        let channels = supported.channels() as usize;
        let config = config
            .with_sample_rate(sample_rate)
            .with_channels(channels);
        let (mut evaluator, handle) = Evaluator::new(config)?;

        let stream = device.build_output_stream(
            &supported.config(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    evaluator.process(data, frames, channels);
                }));
                if result.is_err() {
                    data.fill(0.0);
                }
            },
            |err| warn!(%err, "output stream error"),
            None,
        )?;
        stream.play()?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate, channels, "output stream started"
        );

        Ok((
            OutputStream {
                stream,
                sample_rate,
                channels,
            },
            handle,
        ))
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Suspend the device callback. The graph keeps its state.
    pub fn pause(&self) -> Result<()> {
        self.stream.pause()?;
        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        self.stream.play()?;
        Ok(())
    }
}
