//! Instruction representation

use std::fmt;

use strum_macros::{Display, EnumIter, EnumString};

pub mod decode_helper;

/// Substring of the rendered form that marks a branch instruction
pub const BRANCH_MARKER: &str = "BRANCH";

/// Decoded instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Format
    pub format: Format,
    /// Function
    pub function: Function,
    /// Operands
    pub attributes: Attributes,
}

impl Instruction {
    pub fn new(function: Function, attributes: Attributes) -> Self {
        Self { format: function.format(), function, attributes }
    }

    /// Whether the rendered form carries the branch marker
    pub fn is_branch(&self) -> bool {
        self.to_string().contains(BRANCH_MARKER)
    }
}

impl Default for Instruction {
    fn default() -> Self {
        Self::new(Function::NOP, Attributes::default())
    }
}

/// Instruction format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    R,
    I,
    Branch,
    Jump,
    Nop,
}

impl Format {
    /// Tag printed in front of the mnemonic
    pub fn tag(self) -> &'static str {
        match self {
            Format::R => "R-TYPE",
            Format::I => "I-TYPE",
            Format::Branch => BRANCH_MARKER,
            Format::Jump => "JUMP",
            Format::Nop => "NOP",
        }
    }
}

/// Supported mnemonics
///
/// Parsed case-insensitively and always rendered lowercase, so the
/// upper-case format tag is the only place [`BRANCH_MARKER`] can show up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Function {
    ADD,
    SUB,
    AND,
    OR,
    SLT,
    ADDI,
    LW,
    SW,
    BEQ,
    BNE,
    J,
    NOP,
}

impl Function {
    pub fn format(self) -> Format {
        use Function::*;
        match self {
            ADD | SUB | AND | OR | SLT => Format::R,
            ADDI | LW | SW => Format::I,
            BEQ | BNE => Format::Branch,
            J => Format::Jump,
            NOP => Format::Nop,
        }
    }

    /// Memory access instructions use the `offset(base)` operand form
    pub fn is_memory_access(self) -> bool {
        matches!(self, Function::LW | Function::SW)
    }
}

/// Instruction operands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    pub rs: Option<u8>,
    pub rt: Option<u8>,
    pub rd: Option<u8>,
    pub imm: Option<i64>,
    /// Branch or jump target as an instruction index
    pub target: Option<usize>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format.tag(), self.function)?;

        let Attributes { rs, rt, rd, imm, target } = self.attributes;
        let reg = |r: Option<u8>| r.unwrap_or(0);
        match self.format {
            Format::R => {
                write!(f, " r{}, r{}, r{}", reg(rd), reg(rs), reg(rt))
            }
            Format::I if self.function.is_memory_access() => {
                write!(f, " r{}, {}(r{})", reg(rt), imm.unwrap_or(0), reg(rs))
            }
            Format::I => {
                write!(f, " r{}, r{}, {}", reg(rt), reg(rs), imm.unwrap_or(0))
            }
            Format::Branch => {
                write!(f, " r{}, r{}, {}", reg(rs), reg(rt), target.unwrap_or(0))
            }
            Format::Jump => write!(f, " {}", target.unwrap_or(0)),
            Format::Nop => Ok(()),
        }
    }
}
