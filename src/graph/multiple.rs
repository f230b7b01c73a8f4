use crate::graph::{
    node::{AudioContext, NodeIo, NodeKind, Processor},
    port::PortSpec,
};

/// A splitter: one input, copied to every consumer.
///
/// The node itself only passes the signal through. Splitting is what the
/// render cache already does for any node; this exists so a patch can show
/// the split as a module.
pub struct MultipleNode;

static INPUTS: [PortSpec; 1] = [PortSpec::audio("in")];
const IN: usize = 0;

impl MultipleNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MultipleNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for MultipleNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Multiple
    }

    fn inputs(&self) -> &'static [PortSpec] {
        &INPUTS
    }

    fn process(&mut self, io: &NodeIo<'_>, out: &mut [f32], _ctx: &AudioContext) {
        if let Some(input) = io.input(IN) {
            out.copy_from_slice(input);
        }
    }
}
