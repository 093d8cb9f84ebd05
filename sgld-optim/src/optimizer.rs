use crate::{ParamGroup, ParameterSet};
use anyhow::Result;
use std::any::Any;

/// Seam between a host training loop and an update rule.
///
/// The host runs forward and backward, stores gradients in the
/// [`ParameterSet`], then calls [`Optimizer::step`] once per iteration.
pub trait Optimizer: Any + Send + Sync {
    fn step(&mut self, params: &mut ParameterSet) -> Result<()>;
    fn param_groups(&self) -> &[ParamGroup];
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
