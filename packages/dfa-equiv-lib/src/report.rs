use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    automaton::dfa::Dfa,
    config::DfaEquivConfig,
    render::DfaRenderer,
    solver::{
        SerializableSolverStatus, SolverStatus,
        equivalence::{
            EquivalenceChecker, EquivalenceError, EquivalenceStatistics,
            EquivalenceUnknownReason, word_to_string,
        },
    },
};

/// Artifact names used for the two rendered automata.
pub const LEFT_ARTIFACT: &str = "dfa1";
pub const RIGHT_ARTIFACT: &str = "dfa2";

/// Everything one comparison request produces: the verdict, the witness if
/// there is one, and where the diagrams ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: SerializableSolverStatus,
    /// Letters of the shortest distinguishing word.
    pub witness: Option<Vec<String>>,
    /// The witness with its letters concatenated.
    pub witness_string: Option<String>,
    pub unknown_reason: Option<EquivalenceUnknownReason>,
    pub statistics: EquivalenceStatistics,
    pub left_image: Option<PathBuf>,
    pub right_image: Option<PathBuf>,
    /// Rendering problems. They never affect the verdict.
    pub render_errors: Vec<String>,
}

impl CheckReport {
    pub fn is_equivalent(&self) -> bool {
        self.status == SerializableSolverStatus::True
    }
}

/// Checks two automata and, if `render` is set, draws both of them.
///
/// The verdict is computed first and returned even if rendering fails, the
/// rendering errors are collected in [`CheckReport::render_errors`].
pub fn check_and_render(
    left: &Dfa<String, String>,
    right: &Dfa<String, String>,
    config: &DfaEquivConfig,
    render: bool,
) -> Result<CheckReport, EquivalenceError> {
    let result = EquivalenceChecker::new(left, right, config.get_equivalence().clone()).check()?;

    let mut report = CheckReport {
        status: SerializableSolverStatus::from(&result.status),
        witness: result.status.failure().cloned(),
        witness_string: result.status.failure().map(|word| word_to_string(word)),
        unknown_reason: result.status.unknown().cloned(),
        statistics: result.statistics.clone(),
        left_image: None,
        right_image: None,
        render_errors: Vec::new(),
    };

    if !render {
        return Ok(report);
    }

    let witness = match &result.status {
        SolverStatus::False(word) => Some(word.as_slice()),
        _ => None,
    };

    let renderer = DfaRenderer::new(config.get_render().clone());

    match renderer.render_with_witness(left, LEFT_ARTIFACT, witness) {
        Ok(path) => report.left_image = Some(path),
        Err(err) => {
            tracing::warn!(error = %err, "Rendering the left automaton failed");
            report.render_errors.push(format!("{LEFT_ARTIFACT}: {err}"));
        }
    }

    match renderer.render_with_witness(right, RIGHT_ARTIFACT, witness) {
        Ok(path) => report.right_image = Some(path),
        Err(err) => {
            tracing::warn!(error = %err, "Rendering the right automaton failed");
            report.render_errors.push(format!("{RIGHT_ARTIFACT}: {err}"));
        }
    }

    Ok(report)
}
