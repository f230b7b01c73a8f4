//! Benchmarks for evaluator callbacks over whole patches.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use patchbay::{
    engine::{EngineHandle, Evaluator},
    graph::{
        AdEnvelopeNode, AmplifierNode, DelayNode, FilterNode, MixerNode, MultipleNode, Node,
        NodeRef, OscillatorNode, PulseNode, ReverbNode, SpeakerNode,
    },
    EngineConfig,
};

use crate::{BLOCK_SIZES, CHANNELS, SAMPLE_RATE};

fn engine() -> (Evaluator, EngineHandle) {
    let config = EngineConfig::default()
        .with_sample_rate(SAMPLE_RATE)
        .with_channels(CHANNELS);
    Evaluator::new(config).expect("valid config")
}

/// One oscillator feeding `consumers` filters, summed through chained
/// mixers. Ports hold weak references, so every node is returned to keep the
/// patch alive; the speaker comes last.
fn fan_out_patch(handle: &EngineHandle, consumers: usize) -> Vec<NodeRef> {
    let osc = Node::new(OscillatorNode::saw(SAMPLE_RATE));
    let split = Node::new(MultipleNode::new());
    handle.connect(&osc, split.input("in").unwrap()).unwrap();

    let speaker = Node::new(SpeakerNode::new());
    let mut mixer = Node::new(MixerNode::new());
    handle.connect(&mixer, speaker.input("in").unwrap()).unwrap();

    let mut nodes = vec![osc, split];
    for index in 0..consumers {
        let slot = index % 3;
        if index > 0 && slot == 0 {
            // The fourth input of a full mixer takes the next one.
            let next = Node::new(MixerNode::new());
            handle.connect(&next, mixer.input("in4").unwrap()).unwrap();
            nodes.push(std::mem::replace(&mut mixer, next));
        }

        let filter = Node::new(FilterNode::new(SAMPLE_RATE));
        filter
            .set_param("cutoff", 200.0 + index as f32 * 100.0)
            .unwrap();
        handle.connect(&nodes[1], filter.input("in").unwrap()).unwrap();
        let port = format!("in{}", slot + 1);
        handle.connect(&filter, mixer.input(&port).unwrap()).unwrap();
        nodes.push(filter);
    }
    nodes.push(mixer);
    nodes.push(speaker);
    nodes
}

/// pulse → envelope → amplifier over a saw, through delay and reverb.
fn chain_patch(handle: &EngineHandle) -> Vec<NodeRef> {
    let clock = Node::new(PulseNode::new(SAMPLE_RATE));
    clock.set_param("rate", 8.0).unwrap();
    let env = Node::new(AdEnvelopeNode::new(SAMPLE_RATE));
    handle.connect(&clock, env.input("trigger").unwrap()).unwrap();

    let osc = Node::new(OscillatorNode::saw(SAMPLE_RATE));
    let filter = Node::new(FilterNode::new(SAMPLE_RATE));
    handle.connect(&osc, filter.input("in").unwrap()).unwrap();

    let vca = Node::new(AmplifierNode::new());
    handle.connect(&filter, vca.input("in").unwrap()).unwrap();
    handle.connect(&env, vca.input("cv").unwrap()).unwrap();

    let delay = Node::new(DelayNode::new(SAMPLE_RATE, CHANNELS));
    handle.connect(&vca, delay.input("in").unwrap()).unwrap();
    let reverb = Node::new(ReverbNode::new(SAMPLE_RATE, CHANNELS));
    handle.connect(&delay, reverb.input("in").unwrap()).unwrap();

    let speaker = Node::new(SpeakerNode::new());
    handle.connect(&reverb, speaker.input("in").unwrap()).unwrap();
    vec![clock, env, osc, filter, vca, delay, reverb, speaker]
}

pub fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/fan_out");

    for consumers in [2, 8, 32] {
        let (mut evaluator, handle) = engine();
        let patch = fan_out_patch(&handle, consumers);
        handle.add_sink(&patch[patch.len() - 1]);

        let size = 256;
        let mut out = vec![0.0f32; size * CHANNELS];
        group.bench_with_input(BenchmarkId::new("consumers", consumers), &consumers, |b, _| {
            b.iter(|| {
                evaluator.process(black_box(&mut out), size, CHANNELS);
            })
        });
    }

    group.finish();
}

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/chain");

    for &size in BLOCK_SIZES {
        let (mut evaluator, handle) = engine();
        let patch = chain_patch(&handle);
        handle.add_sink(&patch[patch.len() - 1]);

        let mut out = vec![0.0f32; size * CHANNELS];
        group.bench_with_input(BenchmarkId::new("voice", size), &size, |b, _| {
            b.iter(|| {
                evaluator.process(black_box(&mut out), size, CHANNELS);
            })
        });
    }

    group.finish();
}
