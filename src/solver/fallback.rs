// src/solver/fallback.rs

//! Retry a failed solve with a second strategy

use crate::error::Result;
use crate::model::Requirements;
use crate::solver::{SolveContext, Solution, Solver};
use tracing::warn;

/// Runs `primary`, and `secondary` if the primary reports a solver failure
///
/// Cancellation and other errors propagate without a retry. When both
/// strategies fail, the secondary's error is returned.
#[derive(Debug, Clone)]
pub struct FallbackSolver<P, S> {
    primary: P,
    secondary: S,
}

impl<P: Solver, S: Solver> FallbackSolver<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: Solver, S: Solver> Solver for FallbackSolver<P, S> {
    fn solve(&self, ctx: &SolveContext, requirements: &Requirements) -> Result<Solution> {
        match self.primary.solve(ctx, requirements) {
            Err(e) if e.is_solver_failure() => {
                warn!(
                    "Primary solver failed for {}, retrying: {}",
                    requirements.interface, e
                );
                self.secondary.solve(ctx, requirements)
            }
            result => result,
        }
    }
}
