//! Stochastic Gradient Langevin Dynamics for sampling a tempered, localized
//! posterior over model weights.
//!
//! The host owns a [`ParameterSet`], fills in gradients, then calls
//! [`Sgld::step`]. Each step applies
//!
//! ```text
//! w <- w - lr/2 * (temperature * grad + weight_decay * w + localization * (w - w0))
//!        + sqrt(lr) * N(0, noise_level^2)
//! ```
//!
//! and optionally clamps `w` to `[w0 - size, w0 + size]`, where `w0` is the
//! anchor captured when the optimizer was built.

pub mod config;
pub use config::*;
pub mod noise;
pub use noise::*;
pub mod optimizer;
pub use optimizer::*;
pub mod param;
pub use param::*;
pub mod sgld;
pub use sgld::*;
pub mod state;
pub use state::*;
