use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load program: {0}")]
    LoadError(#[from] LoadError),

    #[error("Register file error: {0}")]
    RegisterError(#[from] RegisterError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Trace error: {0}")]
    TraceError(#[from] csv::Error),
}

/// Errors related to reading and decoding a program file
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read program file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Line {line}: cannot parse '{text}': {reason}")]
    ParseError { line: usize, text: String, reason: String },

    #[error("Line {line}: unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("Line {line}: invalid register '{register}'")]
    InvalidRegister { line: usize, register: String },

    #[error("Line {line}: invalid immediate '{value}'")]
    InvalidImmediate { line: usize, value: String },

    #[error("Line {line}: label '{label}' already defined on line {previous}")]
    DuplicateLabel { line: usize, label: String, previous: usize },

    #[error("Line {line}: undefined label '{label}'")]
    UndefinedLabel { line: usize, label: String },
}

/// Errors related to register file access
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegisterError {
    #[error("Register index {0} out of range (0..=31)")]
    IndexOutOfRange(usize),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
