//! Pipelined implementation
//!
//! The pipeline is a fixed shift register: every cycle each stage hands its
//! token to the next one and IF takes the instruction at the program counter.
//! There is no hazard detection, stalling or forwarding, so the program
//! counter always advances by one and a program of `N` instructions halts
//! after exactly `N` cycles.

use std::io::Write;

use log::{debug, trace};

use crate::cpu::{CPUHistory, CPUState, RegisterFile};
use crate::error::SimulatorResult;
use crate::instruction::{Instruction, BRANCH_MARKER};
use crate::pipelined::control_unit::{ControlUnit, RedirectPolicy, SequentialRedirect};
use crate::pipelined::pipeline::{write_total, CycleReport, PipelineState};
use crate::pipelined::stages::StageId;

pub mod control_unit;
pub mod pipeline;
pub mod stages;

/// Initial machine state handed over by the loader
#[derive(Clone, Debug, Default)]
pub struct State {
    pub pc: usize,
    pub instructions: Vec<Instruction>,
    pub registers: RegisterFile,
}

impl State {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions, ..Self::default() }
    }
}

/// Engine status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The program counter is within the instruction sequence
    Running,
    /// The program counter ran past the end
    Halted,
}

/// Pipeline engine
#[derive(Debug)]
pub struct Pipeline<R = SequentialRedirect> {
    instructions: Vec<Instruction>,
    cpu: CPUState,
    control_unit: ControlUnit,
    state: PipelineState,
    redirect: R,
}

impl Pipeline<SequentialRedirect> {
    pub fn new(state: State, cpu: CPUState) -> Self {
        Self::with_redirect(state, cpu, SequentialRedirect)
    }
}

impl<R: RedirectPolicy> Pipeline<R> {
    /// Builds an engine whose taken branches jump to `redirect`'s target
    pub fn with_redirect(state: State, mut cpu: CPUState, redirect: R) -> Self {
        cpu.pc = state.pc;
        cpu.registers = state.registers;
        let control_unit = ControlUnit::new(cpu.policy.heuristic);
        Self {
            instructions: state.instructions,
            cpu,
            control_unit,
            state: PipelineState::default(),
            redirect,
        }
    }

    pub fn status(&self) -> RunStatus {
        if self.cpu.pc < self.instructions.len() {
            RunStatus::Running
        } else {
            RunStatus::Halted
        }
    }

    pub fn pc(&self) -> usize {
        self.cpu.pc
    }

    /// Executed instructions so far (one per cycle)
    pub fn instruction_count(&self) -> u64 {
        self.cpu.history.inst_count
    }

    pub fn history(&self) -> CPUHistory {
        self.cpu.history
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.cpu.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.cpu.registers
    }

    pub fn control_unit(&self) -> &ControlUnit {
        &self.control_unit
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Advances one cycle, or returns `None` once halted
    pub fn step(&mut self) -> Option<CycleReport> {
        match self.status() {
            RunStatus::Running => Some(self.cycle()),
            RunStatus::Halted => None,
        }
    }

    /// Runs to completion, handing every cycle's report to `observer`.
    /// Returns the executed instruction count.
    pub fn run_with<F>(&mut self, mut observer: F) -> SimulatorResult<u64>
    where
        F: FnMut(&CycleReport) -> SimulatorResult<()>,
    {
        while let Some(report) = self.step() {
            observer(&report)?;
        }
        debug!(
            "Halted at PC {} after {} cycle(s)",
            self.cpu.pc, self.cpu.history.cycle_count
        );
        Ok(self.cpu.history.inst_count)
    }

    /// Runs to completion, printing each cycle and the final count to `out`
    pub fn run(&mut self, out: &mut impl Write) -> SimulatorResult<u64> {
        self.run_reporting(out, |_| Ok(()))
    }

    /// Like [`Pipeline::run`], also handing every printed report to `on_report`
    pub fn run_reporting<F>(&mut self, out: &mut impl Write, mut on_report: F) -> SimulatorResult<u64>
    where
        F: FnMut(&CycleReport) -> SimulatorResult<()>,
    {
        let count = self.run_with(|report| {
            write!(out, "{}", report)?;
            on_report(report)
        })?;
        write_total(out, count)?;
        Ok(count)
    }

    fn cycle(&mut self) -> CycleReport {
        self.cpu.update_cycle_count(1);

        // Shift: WB first so nothing is overwritten before it moves on
        self.state.shift();
        if !self.state.stage(StageId::WB).is_empty() {
            self.cpu.history.retired_count += 1;
        }

        // IF
        let pc = self.cpu.pc;
        let fetched = self.instructions.get(pc);
        let token = fetched.map(Instruction::to_string).unwrap_or_default();
        debug!(
            "New cycle {}; PC: {}; fetched '{}'",
            self.cpu.history.cycle_count, pc, token
        );
        self.state.fetch(token.as_str());
        trace!("Stage occupancy after fetch: {}", self.state.occupancy());

        // ID: branch check
        self.cpu.pc = match fetched {
            Some(inst) if token.contains(BRANCH_MARKER) => {
                self.cpu.history.branch_count += 1;
                self.control_unit.resolve_branch(false);
                if self.control_unit.branch_taken() {
                    let target = self.redirect.target(pc, inst);
                    debug!("Branch at PC {} taken, redirecting to {}", pc, target);
                    target
                } else {
                    pc + 1
                }
            }
            _ => pc + 1,
        };

        self.cpu.update_inst_count(1);

        CycleReport {
            cycle: self.cpu.history.cycle_count,
            pc: self.cpu.pc,
            state: self.state.clone(),
        }
    }
}
