//! Pipeline state
use std::fmt;
use std::io::{self, Write};

use super::stages::{PipelineStage, StageId, STAGE_COUNT};

/// Pipeline state = 5 stage slots acting as a shift register
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineState {
    stages: [PipelineStage; STAGE_COUNT],
}

impl Default for PipelineState {
    fn default() -> Self {
        Self { stages: StageId::ALL.map(PipelineStage::new) }
    }
}

impl PipelineState {
    /// Moves every token one stage toward WB, dropping the one in WB.
    /// Walks from WB down to ID so no slot is overwritten before it is copied.
    pub fn shift(&mut self) {
        for i in (1..STAGE_COUNT).rev() {
            let token = self.stages[i - 1].token().to_owned();
            self.stages[i].process(token);
        }
    }

    /// Places a freshly fetched token in IF
    pub fn fetch(&mut self, token: impl Into<String>) {
        self.stages[StageId::IF.index()].process(token);
    }

    pub fn stage(&self, id: StageId) -> &PipelineStage {
        &self.stages[id.index()]
    }

    pub fn stages(&self) -> &[PipelineStage; STAGE_COUNT] {
        &self.stages
    }

    /// Number of stages holding an instruction
    pub fn occupancy(&self) -> usize {
        self.stages.iter().filter(|stage| !stage.is_empty()).count()
    }
}

/// Stage occupancy reported after one cycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    /// Program counter after the cycle
    pub pc: usize,
    pub state: PipelineState,
}

impl CycleReport {
    pub fn token(&self, id: StageId) -> &str {
        self.state.stage(id).token()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline Stages (PC: {}):", self.pc)?;
        for stage in self.state.stages() {
            writeln!(f, "{}", stage)?;
        }
        writeln!(f)
    }
}

/// Final line printed once the pipeline halts
pub fn write_total(out: &mut impl Write, count: u64) -> io::Result<()> {
    writeln!(out, "Total instructions executed: {}", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_moves_each_token_one_stage() {
        let mut state = PipelineState::default();
        for token in ["a", "b", "c"] {
            state.shift();
            state.fetch(token);
        }
        let tokens: Vec<_> = state.stages().iter().map(|s| s.token()).collect();
        assert_eq!(tokens, vec!["c", "b", "a", "", ""]);
        assert_eq!(state.occupancy(), 3);
    }

    #[test]
    fn shift_drops_writeback_token() {
        let mut state = PipelineState::default();
        for token in ["1", "2", "3", "4", "5", "6"] {
            state.shift();
            state.fetch(token);
        }
        assert_eq!(state.stage(StageId::WB).token(), "2");
        assert_eq!(state.stage(StageId::IF).token(), "6");
        assert_eq!(state.occupancy(), STAGE_COUNT);
    }

    #[test]
    fn report_lists_stages_in_order() {
        let mut state = PipelineState::default();
        state.fetch("NOP nop");
        let report = CycleReport { cycle: 1, pc: 1, state };
        assert_eq!(
            report.to_string(),
            "Pipeline Stages (PC: 1):\nIF: NOP nop\nID: (empty)\nEX: (empty)\nMEM: (empty)\nWB: (empty)\n\n"
        );
    }
}
