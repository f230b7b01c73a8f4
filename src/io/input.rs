use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::Producer;
use tracing::{info, warn};

use crate::{graph::ExternalInputNode, Error, Result};

/// Captures the default input device into an [`ExternalInputNode`].
///
/// The node can live anywhere in the graph; the capture only owns the
/// device stream and the producer end of the ring. Dropping it stops the
/// device and the node falls back to silence once the ring drains.
pub struct InputCapture {
    _stream: cpal::Stream,
    sample_rate: f32,
    channels: usize,
}

impl InputCapture {
    /// Open the default input device with a ring of `capacity_frames` frames.
    pub fn start(capacity_frames: usize) -> Result<(InputCapture, ExternalInputNode)> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(Error::DeviceNotAvailable)?;
        let supported = device.default_input_config()?;

        let sample_rate = supported.sample_rate().0 as f32;
        let channels = (supported.channels() as usize).max(1);
        let (mut producer, node) = ExternalInputNode::with_capacity(channels, capacity_frames);

        let stream = device.build_input_stream(
            &supported.config(),
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                push_frames(&mut producer, data, channels);
            },
            |err| warn!(%err, "input stream error"),
            None,
        )?;
        stream.play()?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate, channels, "input capture started"
        );

        Ok((
            InputCapture {
                _stream: stream,
                sample_rate,
                channels,
            },
            node,
        ))
    }

    /// Device sample rate. No resampling happens between the device and the graph.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// Push as many whole frames of `data` as fit; the rest is dropped.
fn push_frames(producer: &mut Producer<f32>, data: &[f32], channels: usize) -> usize {
    let room = producer.slots().min(data.len()) / channels * channels;
    for &sample in &data[..room] {
        if producer.push(sample).is_err() {
            break;
        }
    }
    room
}
