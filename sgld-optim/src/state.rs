use crate::ParamId;
use ndarray::ArrayD;
use std::collections::HashMap;

/// Per-parameter anchors: the values each parameter held when the optimizer
/// was built. Written once per parameter and never modified afterwards.
#[derive(Clone, Debug, Default)]
pub struct AnchorStore {
    anchors: HashMap<ParamId, ArrayD<f32>>,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an owned copy of `value`. Later captures for the same id are
    /// ignored.
    pub fn capture(&mut self, id: ParamId, value: &ArrayD<f32>) {
        self.anchors.entry(id).or_insert_with(|| value.to_owned());
    }

    pub fn anchor(&self, id: ParamId) -> Option<&ArrayD<f32>> {
        self.anchors.get(&id)
    }

    pub fn contains(&self, id: ParamId) -> bool {
        self.anchors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
