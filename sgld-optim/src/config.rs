use crate::ParamId;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fmt,
    sync::{Arc, RwLock},
};

/// Hyperparameters shared by every parameter of a group.
///
/// `lr` scales the drift by `lr / 2` and the noise by `sqrt(lr)`.
/// `temperature` multiplies the gradient term only; callers are expected to
/// set it from the dataset and batch sizes (see
/// [`sgld_utils::optimal_temperature`]).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SgldConfig {
    #[serde(default = "default_lr")]
    pub lr: f32,
    // anything other than 1.0 breaks posterior sampling, kept for testing
    #[serde(default = "default_noise_level")]
    pub noise_level: f32,
    // pull towards the origin
    #[serde(default)]
    pub weight_decay: f32,
    // pull towards the anchor
    #[serde(default)]
    pub localization: f32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    // half-width of the clamp around the anchor; None or Some(0.0) disables it
    #[serde(default)]
    pub bounding_box_size: Option<f32>,
}

fn default_lr() -> f32 {
    0.01
}

fn default_noise_level() -> f32 {
    1.0
}

fn default_temperature() -> f32 {
    1.0
}

impl Default for SgldConfig {
    fn default() -> Self {
        Self {
            lr: default_lr(),
            noise_level: default_noise_level(),
            weight_decay: 0.0,
            localization: 0.0,
            temperature: default_temperature(),
            bounding_box_size: None,
        }
    }
}

impl SgldConfig {
    pub fn from_hyperparameters(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        match hyperparameters {
            Some(params) => serde_json::from_value(Value::Object(params.clone()))
                .map_err(|e| anyhow!("Failed to parse SGLD hyperparameters: {}", e)),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        sgld_utils::jsonify(self)
    }

    /// Half-width of the box around the anchor, if bounding is enabled.
    /// A size of zero disables bounding.
    pub fn bounding_box(&self) -> Option<f32> {
        self.bounding_box_size.filter(|size| *size != 0.0)
    }

    pub fn needs_anchor(&self) -> bool {
        self.localization != 0.0 || self.bounding_box().is_some()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("lr", self.lr), ("noise_level", self.noise_level)] {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!(
                    "{} must be finite and non-negative, got {}",
                    name,
                    value
                ));
            }
        }
        for (name, value) in [
            ("weight_decay", self.weight_decay),
            ("localization", self.localization),
            ("temperature", self.temperature),
        ] {
            if !value.is_finite() {
                return Err(anyhow!("{} must be finite, got {}", name, value));
            }
        }
        if let Some(size) = self.bounding_box_size {
            if !size.is_finite() || size < 0.0 {
                return Err(anyhow!(
                    "bounding_box_size must be finite and non-negative, got {}",
                    size
                ));
            }
        }
        Ok(())
    }

    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.noise_level != 1.0 {
            warnings.push(ConfigWarning::NoiseLevelNotOne {
                noise_level: self.noise_level,
            });
        }
        if self.temperature == 1.0 {
            warnings.push(ConfigWarning::DefaultTemperature);
        }
        warnings
    }
}

/// Non-fatal configuration problems reported when an optimizer is built.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigWarning {
    NoiseLevelNotOne { noise_level: f32 },
    DefaultTemperature,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::NoiseLevelNotOne { noise_level } => write!(
                f,
                "noise_level is {} instead of 1, this removes SGLD posterior sampling guarantees",
                noise_level
            ),
            ConfigWarning::DefaultTemperature => write!(
                f,
                "temperature is 1, LLC estimates will be off unless this is intended. \
                 Use optimal_temperature(batch_size) instead"
            ),
        }
    }
}

/// Config handle shared between the optimizer and whatever schedules it.
/// The optimizer reads it afresh at the start of every step.
pub type SharedConfig = Arc<RwLock<SgldConfig>>;

pub fn shared(config: SgldConfig) -> SharedConfig {
    Arc::new(RwLock::new(config))
}

pub(crate) fn read_config(config: &SharedConfig) -> Result<SgldConfig> {
    config
        .read()
        .map(|guard| guard.clone())
        .map_err(|_| anyhow!("SGLD config lock was poisoned"))
}

#[derive(Clone, Debug)]
pub struct ParamGroup {
    pub params: Vec<ParamId>,
    pub config: SharedConfig,
}

impl ParamGroup {
    pub fn new(params: Vec<ParamId>, config: SharedConfig) -> Self {
        Self { params, config }
    }

    pub fn from_config(params: Vec<ParamId>, config: SgldConfig) -> Self {
        Self::new(params, shared(config))
    }
}
