//! CPU state shared by the pipeline engine

use std::fmt;

use crate::error::RegisterError;
use crate::pipelined::control_unit::PredictorHeuristic;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 32;

/// CPU state
#[derive(Clone, Debug, Default)]
pub struct CPUState {
    /// Program counter, an index into the instruction sequence
    pub pc: usize,
    /// General purpose registers
    pub registers: RegisterFile,

    /// CPU policy
    pub policy: CPUPolicy,

    /// History of execution
    pub history: CPUHistory,
}

impl CPUState {
    pub fn make(policy: CPUPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    /// Increments history cycle count
    pub fn update_cycle_count(&mut self, value: u64) {
        self.history.cycle_count += value;
    }

    /// Increments history instruction count
    pub fn update_inst_count(&mut self, value: u64) {
        self.history.inst_count += value;
    }
}

/// A single register cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Register {
    /// Current data in the register
    data: i64,
}

impl Register {
    pub fn new(data: i64) -> Self {
        Self { data }
    }

    /// Reads the register
    pub fn read(&self) -> i64 {
        self.data
    }

    /// Writes to register
    pub fn write(&mut self, value: i64) {
        self.data = value;
    }
}

/// Register file simulation
///
/// Register 0 is hard-wired to zero: writes to it are accepted and dropped.
/// Indices outside `0..32` are rejected instead of touching any cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    registers: [Register; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads register `index`
    pub fn read(&self, index: usize) -> Result<i64, RegisterError> {
        self.registers
            .get(index)
            .map(Register::read)
            .ok_or(RegisterError::IndexOutOfRange(index))
    }

    /// Writes `value` to register `index`
    pub fn write(&mut self, index: usize, value: i64) -> Result<(), RegisterError> {
        let register = self
            .registers
            .get_mut(index)
            .ok_or(RegisterError::IndexOutOfRange(index))?;
        // You don't write to r0
        if index != 0 {
            register.write(value);
        }
        Ok(())
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pair) in self.registers.chunks(2).enumerate() {
            writeln!(
                f,
                "r{:<2} = {:<12} r{:<2} = {}",
                2 * i,
                pair[0].read(),
                2 * i + 1,
                pair[1].read()
            )?;
        }
        Ok(())
    }
}

/// CPU policy
#[derive(Clone, Copy, Debug, Default)]
pub struct CPUPolicy {
    pub verbose: bool,
    pub history: bool,
    pub heuristic: PredictorHeuristic,
}

/// History module
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CPUHistory {
    /// Clock cycles simulated
    pub cycle_count: u64,
    /// Executed instructions, one per cycle while the PC is in bounds
    pub inst_count: u64,
    /// Branch-classified instructions fetched
    pub branch_count: u64,
    /// Instructions that reached WB
    pub retired_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r0_ignores_writes() {
        let mut registers = RegisterFile::new();
        for value in [1, -7, i64::MAX] {
            registers.write(0, value).unwrap();
            assert_eq!(registers.read(0), Ok(0));
        }
    }

    #[test]
    fn write_then_read_every_register() {
        let mut registers = RegisterFile::new();
        for index in 1..REGISTER_COUNT {
            let value = -(index as i64) * 1000;
            registers.write(index, value).unwrap();
            assert_eq!(registers.read(index), Ok(value));
        }
    }

    #[test]
    fn out_of_range_access_is_rejected() {
        let mut registers = RegisterFile::new();
        assert_eq!(registers.read(32), Err(RegisterError::IndexOutOfRange(32)));
        assert_eq!(
            registers.write(40, 5),
            Err(RegisterError::IndexOutOfRange(40))
        );
        assert_eq!(registers, RegisterFile::default());
    }

    #[test]
    fn dump_lists_pairs() {
        let mut registers = RegisterFile::new();
        registers.write(3, 42).unwrap();
        let dump = registers.to_string();
        assert_eq!(dump.lines().count(), REGISTER_COUNT / 2);
        assert!(dump.lines().nth(1).unwrap().ends_with("r3  = 42"));
    }
}
