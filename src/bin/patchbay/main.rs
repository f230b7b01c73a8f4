//! patchbay - plays a small demo patch on the default output device
//!
//! Run with: cargo run
//! Press Enter to stop. Set RUST_LOG=debug to see patching and the spectrum peak.

use std::{
    io::BufRead,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use patchbay::{
    engine::EngineHandle,
    graph::{
        AdEnvelopeNode, AmplifierNode, DelayNode, FilterNode, Node, NodeRef, OscillatorNode,
        PulseNode, ReverbNode, SpeakerNode,
    },
    io::{OutputStream, SpectrumAnalyzer},
    EngineConfig,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Builds the patch. Ports only hold weak references, so the caller keeps
/// every returned node alive; the speaker comes last.
///
/// ```text
/// pulse ─→ AD env ─────────────┐ cv
/// saw ─→ filter ─→ amplifier ──┴─→ delay ─→ reverb ─→ speaker
///          ↑ cutoff
/// slow sine
/// ```
fn build_patch(handle: &EngineHandle, sample_rate: f32, channels: usize) -> EyreResult<Vec<NodeRef>> {
    let clock = Node::new(PulseNode::new(sample_rate));
    clock.set_param("rate", 4.0)?;

    let env = Node::new(AdEnvelopeNode::new(sample_rate));
    env.set_param("attack", 0.005)?;
    env.set_param("decay", 0.18)?;
    env.set_param("decay_curve", 3.0)?;
    handle.connect(&clock, env.input("trigger")?)?;

    let saw = Node::new(OscillatorNode::saw(sample_rate));
    saw.set_param("frequency", 110.0)?;
    saw.set_param("amplitude", 0.6)?;

    let sweep = Node::new(OscillatorNode::sine(sample_rate));
    sweep.set_param("frequency", 0.1)?;

    let filter = Node::new(FilterNode::new(sample_rate));
    filter.set_param("cutoff", 900.0)?;
    filter.set_param("resonance", 0.6)?;
    filter.set_param("cutoff_depth", 1.5)?;
    handle.connect(&saw, filter.input("in")?)?;
    handle.connect(&sweep, filter.input("cutoff")?)?;

    let vca = Node::new(AmplifierNode::new());
    handle.connect(&filter, vca.input("in")?)?;
    handle.connect(&env, vca.input("cv")?)?;

    let delay = Node::new(DelayNode::new(sample_rate, channels));
    delay.set_param("time", 0.375)?;
    delay.set_param("feedback", 0.45)?;
    delay.set_param("mix", 0.3)?;
    handle.connect(&vca, delay.input("in")?)?;

    let reverb = Node::new(ReverbNode::new(sample_rate, channels));
    reverb.set_param("room", 0.7)?;
    reverb.set_param("mix", 0.25)?;
    handle.connect(&delay, reverb.input("in")?)?;

    let speaker = Node::new(SpeakerNode::new());
    speaker.set_param("volume", 0.8)?;
    handle.connect(&reverb, speaker.input("in")?)?;

    Ok(vec![clock, env, saw, sweep, filter, vca, delay, reverb, speaker])
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (stream, mut handle) =
        OutputStream::start(EngineConfig::default()).wrap_err("failed to start audio output")?;
    let sample_rate = stream.sample_rate();

    let patch = build_patch(&handle, sample_rate, stream.channels())?;
    let speaker = &patch[patch.len() - 1];
    handle.add_sink(speaker);
    let mut reader = handle.add_tap(speaker, 16_384)?;
    let mut analyzer = SpectrumAnalyzer::new(sample_rate, 2_048);

    info!(sample_rate, channels = stream.channels(), "playing, press Enter to stop");

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        stop_flag.store(true, Ordering::Relaxed);
    });

    while !stop.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_millis(250));
        if analyzer.update(&mut reader) {
            analyzer.analyze();
            if let Some((frequency, magnitude)) = analyzer.peak() {
                debug!(frequency, magnitude, "spectrum peak");
            }
        }
    }

    handle.clear_sinks();
    drop(stream);
    info!("stopped");
    Ok(())
}
