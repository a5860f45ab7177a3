//! Data preprocessing
//!
//! Feature scaling is fit on the training partition only and reapplied unchanged to any
//! other partition.

mod scaler;

pub use scaler::{ScalingParameters, StandardScaler};
