//! # pnn-train
//!
//! Training and evaluation stages of paramnn.
//!
//! - [`fixed`]: one regressor per JES condition on `(mwwbb, mjj)`.
//! - [`parameterized`]: one regressor on `(mwwbb, mjj, jes)` across all
//!   conditions, plus leave-one-condition-out holdout models.
//! - [`interpolate`]: probing the parameterized model at arbitrary scales.
//! - [`analysis`]: comma-separated evaluation tables.
//!
//! The regressor itself ([`RegressorPipeline`]) is a min/max scaler in front
//! of a one-hidden-layer sigmoid MLP trained on squared error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod fixed;
pub mod interpolate;
pub mod mlp;
pub mod parameterized;
pub mod pipeline;
pub mod roc;
pub mod scaler;

pub use fixed::{FixedConditionResult, train_fixed};
pub use interpolate::{ModelChoice, ScaleEvaluation, evaluate_alpha, predict_at};
pub use mlp::{Mlp, TrainingReport};
pub use parameterized::{ParameterizedResult, train_parameterized};
pub use pipeline::{FIXED_FEATURES, PARAM_FEATURES, RegressorPipeline};
pub use roc::{RocCurve, roc_curve};
pub use scaler::MinMaxScaler;
