//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use ponderar::prelude::*;
//! ```

pub use crate::error::{PonderarError, Result};
pub use crate::perceptron::{
    Example, FeatureExtractor, FeatureVector, Perceptron, PerceptronConfig, RawExample,
    UNKNOWN_LABEL,
};
