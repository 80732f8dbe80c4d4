//! The five named pipeline slots

use std::fmt;

use strum_macros::{Display, EnumIter};

/// Number of pipeline stages
pub const STAGE_COUNT: usize = 5;

/// Rendered in place of the token of an unoccupied stage
pub const EMPTY_MARKER: &str = "(empty)";

/// Stage identifier, in pipeline order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum StageId {
    IF = 0,
    ID = 1,
    EX = 2,
    MEM = 3,
    WB = 4,
}

impl StageId {
    pub const ALL: [StageId; STAGE_COUNT] =
        [StageId::IF, StageId::ID, StageId::EX, StageId::MEM, StageId::WB];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One slot holding the display token of at most one in-flight instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineStage {
    id: StageId,
    token: String,
}

impl PipelineStage {
    pub fn new(id: StageId) -> Self {
        Self { id, token: String::new() }
    }

    /// Stores `token` as the stage content
    pub fn process(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.is_empty() { EMPTY_MARKER } else { &self.token };
        write!(f, "{}: {}", self.id, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn renders_name_and_token() {
        let mut stage = PipelineStage::new(StageId::MEM);
        assert_eq!(stage.to_string(), "MEM: (empty)");
        stage.process("R-TYPE add r1, r2, r3");
        assert_eq!(stage.to_string(), "MEM: R-TYPE add r1, r2, r3");
        stage.process("");
        assert!(stage.is_empty());
    }

    #[test]
    fn ids_are_in_pipeline_order() {
        let ids: Vec<_> = StageId::iter().collect();
        assert_eq!(ids, StageId::ALL);
        for (i, id) in StageId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }
}
