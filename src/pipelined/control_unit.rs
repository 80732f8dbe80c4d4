//! Branch resolution policy
//! and the pluggable computation of the redirect target

use log::trace;

use crate::instruction::Instruction;

/// How the control unit turns a condition signal into a decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PredictorHeuristic {
    /// Static prediction: the branch is never taken
    #[default]
    AlwaysNotTaken,
    /// Record the condition signal as given
    FollowCondition,
}

/// Holds the last resolved branch decision
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlUnit {
    heuristic: PredictorHeuristic,
    branch_taken: bool,
}

impl ControlUnit {
    pub fn new(heuristic: PredictorHeuristic) -> Self {
        Self { heuristic, branch_taken: false }
    }

    /// Records whether the branch is taken.
    /// Under [`PredictorHeuristic::AlwaysNotTaken`] the signal has no effect.
    pub fn resolve_branch(&mut self, condition: bool) {
        self.branch_taken = match self.heuristic {
            PredictorHeuristic::AlwaysNotTaken => false,
            PredictorHeuristic::FollowCondition => condition,
        };
        trace!(
            "Branch resolved: condition={}, taken={}",
            condition,
            self.branch_taken
        );
    }

    pub fn branch_taken(&self) -> bool {
        self.branch_taken
    }
}

/// Computes the next program counter for a taken branch
pub trait RedirectPolicy {
    fn target(&self, pc: usize, instruction: &Instruction) -> usize;
}

/// Redirects to the instruction after the branch.
/// Coincides with sequential advance; the decoded target is not consulted.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialRedirect;

impl RedirectPolicy for SequentialRedirect {
    fn target(&self, pc: usize, _: &Instruction) -> usize {
        pc + 1
    }
}

impl<F> RedirectPolicy for F
where
    F: Fn(usize, &Instruction) -> usize,
{
    fn target(&self, pc: usize, instruction: &Instruction) -> usize {
        self(pc, instruction)
    }
}
