//! Scenario overlay: applying parameter changes to a copy of the base
//! process.
//!
//! `apply` is a pure function. The base definition is cloned first and
//! only the clone is mutated, so a single base process can be reused
//! across any number of scenario runs, including parallel ones.

use crate::error::{EngineError, SimResult};
use crate::model::{ChangeType, Distribution, ParameterChange, ProcessDefinition};

/// Returns a deep copy of `base` with every parameter change applied.
///
/// Fails fast, before any simulation starts, when a change targets a
/// step that does not exist or coerces a resource capacity below 1.
pub fn apply(base: &ProcessDefinition, changes: &[ParameterChange]) -> SimResult<ProcessDefinition> {
    let mut process = base.clone();

    for change in changes {
        let step = process
            .steps
            .iter_mut()
            .find(|s| s.id == change.target)
            .ok_or_else(|| EngineError::UnknownChangeTarget {
                step: change.target.clone(),
            })?;

        match change.change_type {
            ChangeType::StepDuration => {
                set_central_value(&mut step.duration_distribution, change.new_value);
            }
            ChangeType::DefectRate => {
                step.defect_rate = change.new_value;
            }
            ChangeType::Cost => {
                if change.parameter.as_deref() == Some("fixed_cost") {
                    step.fixed_cost = change.new_value;
                } else {
                    step.variable_cost_per_unit = change.new_value;
                }
            }
            ChangeType::ResourceCapacity => {
                let capacity = change.new_value as i64;
                if capacity < 1 {
                    return Err(EngineError::InvalidCapacity {
                        step: change.target.clone(),
                        value: change.new_value,
                    });
                }
                step.max_concurrent = Some(capacity as u32);
            }
        }
    }

    Ok(process)
}

/// Overwrite the central tendency of a duration distribution.
///
/// Normal keeps its spread and gets a new mean; every other family is
/// replaced by a fixed value, which covers FIXED and NORMAL-shaped
/// distributions uniformly.
fn set_central_value(dist: &mut Distribution, new_value: f64) {
    match dist {
        Distribution::Normal { mean, .. } => *mean = new_value,
        other => *other = Distribution::Fixed { value: new_value },
    }
}
