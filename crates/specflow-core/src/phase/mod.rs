//! Phase state machine.
//!
//! Phases only move forward, one step at a time. Each edge is guarded by a
//! [`GateFailure`]-producing check; `force` turns a failed gate into a
//! warning carried by the [`AdvanceOutcome`] and flags the recorded
//! transition. The `reviewed → archived` edge is owned by archive and is
//! never taken by [`advance`].

pub mod artifacts;
pub mod gate;

pub use artifacts::{ArtifactProbe, FsArtifacts};
pub use gate::{GateFailure, UnfinishedTask};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OrchestratorError, Result},
    models::{Phase, PhaseTransition, Spec},
};

/// Result of a successful phase advance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvanceOutcome {
    pub from: Phase,
    pub to: Phase,
    /// Whether a failed gate was bypassed
    pub forced: bool,
    /// Gate failures bypassed by `force`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<GateFailure>,
}

/// Moves `spec` to the next phase, enforcing the gate unless `force` is set.
///
/// On error `spec` is unchanged.
pub fn advance(spec: &mut Spec, force: bool, probe: &dyn ArtifactProbe) -> Result<AdvanceOutcome> {
    let from = spec.phase;
    let to = match from {
        Phase::Reviewed => {
            return Err(OrchestratorError::ArchiveRequired {
                id: spec.id.clone(),
            })
        }
        _ => from.next().ok_or_else(|| OrchestratorError::TerminalPhase {
            id: spec.id.clone(),
        })?,
    };

    let mut warnings = Vec::new();
    if let Some(unmet) = gate::check(spec, to, probe) {
        if !force {
            return Err(OrchestratorError::Validation {
                id: spec.id.clone(),
                from,
                to,
                unmet,
            });
        }
        warnings.push(unmet);
    }

    let forced = !warnings.is_empty();
    record_transition(spec, to, forced);
    Ok(AdvanceOutcome {
        from,
        to,
        forced,
        warnings,
    })
}

/// Sets the phase and appends the transition to the spec history.
pub(crate) fn record_transition(spec: &mut Spec, to: Phase, forced: bool) {
    spec.history.push(PhaseTransition {
        from: spec.phase,
        to,
        at: Timestamp::now(),
        forced,
    });
    spec.phase = to;
}
