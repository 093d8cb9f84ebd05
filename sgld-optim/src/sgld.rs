use crate::{
    config::read_config, AnchorStore, ConfigWarning, GaussianNoise, NoiseSource, Optimizer,
    ParamGroup, ParamId, ParameterSet, SgldConfig,
};
use anyhow::{anyhow, Result};
use logging_timer::time;
use ndarray::{ArrayD, Zip};
use std::{any::Any, collections::HashSet};

/// Stochastic Gradient Langevin Dynamics sampler with localization towards
/// the initial weights and an optional bounding box around them.
pub struct Sgld {
    param_groups: Vec<ParamGroup>,
    anchors: AnchorStore,
    noise_source: Box<dyn NoiseSource>,
    save_noise: bool,
    noise: Vec<ArrayD<f32>>,
    warnings: Vec<ConfigWarning>,
    steps: usize,
}

impl Sgld {
    /// Builds the sampler and captures an anchor for every parameter whose
    /// group uses localization or a bounding box.
    ///
    /// Fails on invalid configs, unknown parameter ids, or a parameter that
    /// appears in more than one group. Suspicious but usable configs only
    /// produce [`ConfigWarning`]s.
    pub fn new(
        params: &ParameterSet,
        param_groups: Vec<ParamGroup>,
        noise_source: Box<dyn NoiseSource>,
        save_noise: bool,
    ) -> Result<Self> {
        let mut anchors = AnchorStore::new();
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for (i, group) in param_groups.iter().enumerate() {
            let config = read_config(&group.config)?;
            config
                .validate()
                .map_err(|e| anyhow!("Param group {} has an invalid config: {}", i, e))?;
            for warning in config.warnings() {
                log::warn!("Param group {}: {}", i, warning);
                warnings.push(warning);
            }

            for &id in &group.params {
                if !seen.insert(id) {
                    return Err(anyhow!(
                        "Parameter {} appears in more than one param group",
                        id.0
                    ));
                }
                let value = params.value(id)?;
                if config.needs_anchor() {
                    anchors.capture(id, value);
                }
            }
        }

        Ok(Self {
            param_groups,
            anchors,
            noise_source,
            save_noise,
            noise: Vec::new(),
            warnings,
            steps: 0,
        })
    }

    pub fn with_seed(
        params: &ParameterSet,
        param_groups: Vec<ParamGroup>,
        seed: [u8; 32],
        save_noise: bool,
    ) -> Result<Self> {
        Self::new(
            params,
            param_groups,
            Box::new(GaussianNoise::from_seed(seed)),
            save_noise,
        )
    }

    /// Applies one Langevin update to every parameter that has a gradient.
    ///
    /// Group configs are read once at the start of the step. All
    /// preconditions are checked before any parameter is written, so an
    /// error leaves every parameter untouched.
    #[time]
    pub fn step(&mut self, params: &mut ParameterSet) -> Result<()> {
        self.noise.clear();
        let configs = self
            .param_groups
            .iter()
            .map(|group| read_config(&group.config))
            .collect::<Result<Vec<_>>>()?;
        self.check_preconditions(params, &configs)?;

        // Draw every noise tensor up front so a failing source cannot leave
        // the step half applied.
        let mut draws = Vec::new();
        for (group, config) in self.param_groups.iter().zip(&configs) {
            for &id in &group.params {
                let param = params.get(id)?;
                if param.grad.is_some() {
                    draws.push(
                        self.noise_source
                            .sample(param.value.shape(), config.noise_level)?,
                    );
                }
            }
        }
        let mut draws = draws.into_iter();

        for (group, config) in self.param_groups.iter().zip(&configs) {
            for &id in &group.params {
                let param = params.get_mut(id)?;
                let grad = match &param.grad {
                    Some(grad) => grad,
                    None => continue,
                };
                let value = &mut param.value;
                let anchor = || {
                    self.anchors
                        .anchor(id)
                        .ok_or_else(|| anyhow!("Parameter {} has no anchor", id.0))
                };

                let mut dw = grad * config.temperature;
                if config.weight_decay != 0.0 {
                    dw.scaled_add(config.weight_decay, &*value);
                }
                if config.localization != 0.0 {
                    // dw grows with the distance from the anchor, so the
                    // subtraction below pulls the value back towards it.
                    Zip::from(&mut dw)
                        .and(&*value)
                        .and(anchor()?)
                        .for_each(|d, &v, &a| *d += config.localization * (v - a));
                }
                value.scaled_add(-0.5 * config.lr, &dw);

                let noise = draws
                    .next()
                    .ok_or_else(|| anyhow!("Missing noise draw for parameter {}", id.0))?;
                value.scaled_add(config.lr.sqrt(), &noise);
                if self.save_noise {
                    self.noise.push(noise);
                }

                if let Some(size) = config.bounding_box() {
                    Zip::from(&mut *value)
                        .and(anchor()?)
                        .for_each(|v, &a| *v = v.max(a - size).min(a + size));
                }
            }
        }

        self.steps += 1;
        Ok(())
    }

    fn check_preconditions(&self, params: &ParameterSet, configs: &[SgldConfig]) -> Result<()> {
        for (i, (group, config)) in self.param_groups.iter().zip(configs).enumerate() {
            config
                .validate()
                .map_err(|e| anyhow!("Param group {} has an invalid config: {}", i, e))?;
            for &id in &group.params {
                let param = params.get(id)?;
                let grad = match &param.grad {
                    Some(grad) => grad,
                    None => continue,
                };
                if grad.shape() != param.value.shape() {
                    return Err(anyhow!(
                        "Gradient shape {:?} does not match parameter {} shape {:?}",
                        grad.shape(),
                        id.0,
                        param.value.shape()
                    ));
                }
                if config.needs_anchor() {
                    match self.anchors.anchor(id) {
                        Some(anchor) if anchor.shape() == param.value.shape() => {}
                        Some(anchor) => {
                            return Err(anyhow!(
                                "Anchor shape {:?} does not match parameter {} shape {:?}",
                                anchor.shape(),
                                id.0,
                                param.value.shape()
                            ))
                        }
                        None => {
                            return Err(anyhow!(
                                "Param group {} needs an anchor for parameter {}, but none was captured at construction",
                                i,
                                id.0
                            ))
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Noise injected during the latest step, one tensor per updated
    /// parameter in processing order. Empty unless `save_noise` was set.
    pub fn noise(&self) -> &[ArrayD<f32>] {
        &self.noise
    }

    pub fn param_groups(&self) -> &[ParamGroup] {
        &self.param_groups
    }

    pub fn anchors(&self) -> &AnchorStore {
        &self.anchors
    }

    pub fn anchor(&self, id: ParamId) -> Option<&ArrayD<f32>> {
        self.anchors.anchor(id)
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn save_noise(&self) -> bool {
        self.save_noise
    }
}

impl Optimizer for Sgld {
    fn step(&mut self, params: &mut ParameterSet) -> Result<()> {
        Sgld::step(self, params)
    }

    fn param_groups(&self) -> &[ParamGroup] {
        &self.param_groups
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
