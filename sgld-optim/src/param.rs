use anyhow::{anyhow, Result};
use ndarray::ArrayD;

/// Handle to a parameter inside a [`ParameterSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub usize);

#[derive(Clone, Debug)]
pub struct Parameter {
    pub value: ArrayD<f32>,
    /// `None` when the parameter took no part in the latest backward pass.
    pub grad: Option<ArrayD<f32>>,
}

/// Tensors owned by the host model, together with their current gradients.
#[derive(Clone, Debug, Default)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: ArrayD<f32>) -> ParamId {
        self.params.push(Parameter { value, grad: None });
        ParamId(self.params.len() - 1)
    }

    pub fn get(&self, id: ParamId) -> Result<&Parameter> {
        self.params
            .get(id.0)
            .ok_or_else(|| anyhow!("Unknown parameter id {}", id.0))
    }

    pub fn get_mut(&mut self, id: ParamId) -> Result<&mut Parameter> {
        self.params
            .get_mut(id.0)
            .ok_or_else(|| anyhow!("Unknown parameter id {}", id.0))
    }

    pub fn value(&self, id: ParamId) -> Result<&ArrayD<f32>> {
        Ok(&self.get(id)?.value)
    }

    pub fn grad(&self, id: ParamId) -> Result<Option<&ArrayD<f32>>> {
        Ok(self.get(id)?.grad.as_ref())
    }

    pub fn set_grad(&mut self, id: ParamId, grad: ArrayD<f32>) -> Result<()> {
        let param = self.get_mut(id)?;
        if grad.shape() != param.value.shape() {
            return Err(anyhow!(
                "Gradient shape {:?} does not match parameter {} shape {:?}",
                grad.shape(),
                id.0,
                param.value.shape()
            ));
        }
        param.grad = Some(grad);
        Ok(())
    }

    pub fn zero_grad(&mut self) {
        for param in &mut self.params {
            param.grad = None;
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ParamId> + '_ {
        (0..self.params.len()).map(ParamId)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
