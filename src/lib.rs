//! Ponderar: multi-class averaged perceptron in pure Rust.
//!
//! An online linear classifier over sparse named features. The model is
//! trained with mistake-driven updates and served from the time-weighted
//! average of all historical weight values, computed lazily so that
//! averaging costs O(touched entries) instead of
//! O(features × classes × iterations).
//!
//! # Quick Start
//!
//! ```
//! use ponderar::prelude::*;
//!
//! let data = vec![
//!     Example::from_pairs(&[("need", 1.0), ("loan", 1.0)], "autoloan"),
//!     Example::from_pairs(&[("early", 1.0), ("payoff", 1.0)], "prepay"),
//! ];
//!
//! let mut model = Perceptron::new().with_max_iterations(3);
//! model.learn(&data).expect("two classes present");
//!
//! let query = Example::from_pairs(&[("loan", 1.0)], "").features;
//! assert_eq!(model.predict(&query).expect("trained"), "autoloan");
//! ```
//!
//! # Modules
//!
//! - [`perceptron`]: the classifier, its configuration, and snapshot
//!   persistence
//! - [`error`]: error types

pub mod error;
pub mod perceptron;
pub mod prelude;

pub use error::{PonderarError, Result};
pub use perceptron::{
    Example, FeatureExtractor, FeatureVector, Perceptron, PerceptronConfig, RawExample,
    DEFAULT_MAX_ITERATIONS, UNKNOWN_LABEL,
};
