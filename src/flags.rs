use std::path::PathBuf;
use std::str::FromStr;

use crate::cpu::CPUPolicy;
use crate::pipelined::control_unit::PredictorHeuristic;

xflags::xflags! {
    /// Five-stage teaching pipeline simulator.
    cmd sim-args {
        /// Path to the assembly program (defaults to test.asm).
        optional program: PathBuf

        /// Enables history module, printing cycle and branch counts after simulation.
        optional --history

        /// Specifies the branch resolution heuristic.
        /// ANT: Always not taken (default)
        /// FC: Follow the condition signal
        optional -p, --prediction heuristic: HeuristicArg

        /// Writes the per-cycle stage occupancy to a CSV file.
        optional -t, --trace path: PathBuf

        /// Enables verbose mode, logging every cycle at debug level.
        optional -v, --verbose
    }
}

impl SimArgs {
    pub fn policy(&self) -> CPUPolicy {
        CPUPolicy {
            verbose: self.verbose,
            history: self.history,
            heuristic: self.prediction.map(Into::into).unwrap_or_default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeuristicArg {
    AlwaysNotTaken,
    FollowCondition,
}

impl FromStr for HeuristicArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ANT" => Ok(HeuristicArg::AlwaysNotTaken),
            "FC" => Ok(HeuristicArg::FollowCondition),
            _ => Err(format!(
                "Invalid branch resolution heuristic: '{}'. Expected 'ANT' or 'FC'.",
                s
            )),
        }
    }
}

impl From<HeuristicArg> for PredictorHeuristic {
    fn from(val: HeuristicArg) -> Self {
        match val {
            HeuristicArg::AlwaysNotTaken => PredictorHeuristic::AlwaysNotTaken,
            HeuristicArg::FollowCondition => PredictorHeuristic::FollowCondition,
        }
    }
}
