use crate::graph::{
    node::{AudioContext, NodeIo, NodeKind, Processor},
    param::ParamSpec,
};

/// A dial: outputs its `value` parameter on every sample.
///
/// Patch it into any modulation input to set that input by hand.
pub struct ControlNode;

static PARAMS: [ParamSpec; 1] = [ParamSpec::new("value", 0.0, -20_000.0, 20_000.0)];
const VALUE: usize = 0;

impl ControlNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ControlNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for ControlNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Control
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], _ctx: &AudioContext) {
        out.fill(io.param(VALUE));
    }
}
