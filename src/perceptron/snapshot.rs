//! Snapshot framing: the persisted form of an averaged model.
//!
//! The wire layout is a 4-element JSON sequence:
//! `[averaged weights, averaged biases, reserved mapping, reserved sequence]`.
//! The last two fields are a forward-compatibility extension point; they
//! are written empty and only type-checked on import, never interpreted.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{PonderarError, Result};
use crate::perceptron::weights::{AveragedSnapshot, BiasVector, WeightMatrix};

/// Borrowed view of the wire frame; a tuple struct serializes as the
/// 4-element sequence the format requires.
#[derive(Serialize)]
struct Frame<'a>(
    &'a WeightMatrix,
    &'a BiasVector,
    BTreeMap<String, Value>,
    Vec<Value>,
);

/// Serializes an averaged snapshot to its 4-field JSON form.
pub(crate) fn to_json(snapshot: &AveragedSnapshot) -> Result<String> {
    let frame = Frame(
        &snapshot.weights,
        &snapshot.biases,
        BTreeMap::new(),
        Vec::new(),
    );
    serde_json::to_string(&frame).map_err(|e| PonderarError::Serialization(e.to_string()))
}

/// Parses and fully validates a snapshot payload.
///
/// Validation covers: non-empty input, well-formed JSON, 4-element
/// sequence, element structural types (mapping, mapping, mapping,
/// sequence), and numeric weight/bias leaves. Nothing is returned unless
/// every check passes, so a failed import can leave the caller's state
/// untouched.
pub(crate) fn from_json(payload: &str) -> Result<AveragedSnapshot> {
    if payload.trim().is_empty() {
        return Err(PonderarError::EmptySnapshot);
    }
    let value: Value =
        serde_json::from_str(payload).map_err(|e| PonderarError::Serialization(e.to_string()))?;
    let parts = value.as_array().ok_or_else(|| PonderarError::SnapshotFormat {
        message: "expected a JSON array".to_string(),
    })?;
    if parts.len() != 4 {
        return Err(PonderarError::SnapshotFormat {
            message: format!("expected a 4-element array, found {}", parts.len()),
        });
    }
    for (index, expect_mapping) in [(0, true), (1, true), (2, true), (3, false)] {
        let ok = if expect_mapping {
            parts[index].is_object()
        } else {
            parts[index].is_array()
        };
        if !ok {
            return Err(PonderarError::SnapshotFormat {
                message: format!(
                    "element {index} must be a {}",
                    if expect_mapping { "mapping" } else { "sequence" }
                ),
            });
        }
    }
    let weights: WeightMatrix =
        serde_json::from_value(parts[0].clone()).map_err(|e| PonderarError::SnapshotFormat {
            message: format!("weights: {e}"),
        })?;
    let biases: BiasVector =
        serde_json::from_value(parts[1].clone()).map_err(|e| PonderarError::SnapshotFormat {
            message: format!("biases: {e}"),
        })?;
    Ok(AveragedSnapshot { weights, biases })
}
