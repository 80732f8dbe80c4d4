//! A simulator wrapper

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::info;

use crate::cpu::CPUHistory;
use crate::cpu::CPUPolicy;
use crate::cpu::CPUState;
use crate::cpu::RegisterFile;
use crate::error::SimulatorResult;
use crate::instruction::Instruction;
use crate::loader;
use crate::pipelined::{Pipeline, State};
use crate::trace::TraceWriter;

/// Summary of a finished run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunStats {
    /// Reported executed instruction count
    pub instructions: u64,
    pub cycles: u64,
    pub branches: u64,
    pub retired: u64,
    /// Register file contents at halt
    pub registers: RegisterFile,
}

impl RunStats {
    fn collect(history: CPUHistory, registers: &RegisterFile) -> Self {
        Self {
            instructions: history.inst_count,
            cycles: history.cycle_count,
            branches: history.branch_count,
            retired: history.retired_count,
            registers: registers.clone(),
        }
    }
}

/// Run simulation on the given program file,
/// printing the cycle reports to stdout
pub fn run(
    program_file: impl AsRef<Path>,
    policy: CPUPolicy,
    trace_file: Option<&Path>,
) -> SimulatorResult<RunStats> {
    // Nothing is simulated unless the whole program decodes
    let instructions = loader::load_program(program_file)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stats = match trace_file {
        Some(path) => {
            let mut trace = TraceWriter::create(path)?;
            let stats = run_program(instructions, policy, &mut out, Some(&mut trace))?;
            trace.finish()?;
            info!("Wrote cycle trace to {}", path.display());
            stats
        }
        None => run_program(instructions, policy, &mut out, None::<&mut TraceWriter<File>>)?,
    };

    if policy.history {
        write_history(&mut io::stderr().lock(), &stats)?;
    }

    Ok(stats)
}

/// Run simulation on already decoded instructions, writing reports to `out`
/// and optionally recording every cycle in `trace`
pub fn run_program<W: Write, T: Write>(
    instructions: Vec<Instruction>,
    policy: CPUPolicy,
    out: &mut W,
    mut trace: Option<&mut TraceWriter<T>>,
) -> SimulatorResult<RunStats> {
    let cpu = CPUState::make(policy);
    let mut pipeline = Pipeline::new(State::new(instructions), cpu);

    pipeline.run_reporting(out, |report| match trace.as_deref_mut() {
        Some(trace) => trace.record(report),
        None => Ok(()),
    })?;
    out.flush()?;

    let stats = RunStats::collect(pipeline.history(), pipeline.registers());
    info!(
        "Run finished: {} instruction(s) in {} cycle(s)",
        stats.instructions, stats.cycles
    );
    Ok(stats)
}

/// Prints the `[HISTORY]` block: counters, then the register file at halt
pub fn write_history(out: &mut impl Write, stats: &RunStats) -> io::Result<()> {
    writeln!(out, "[HISTORY] # instructions = {}", stats.instructions)?;
    writeln!(
        out,
        "[HISTORY] # cycles = {}, # branches = {}, # retired = {}",
        stats.cycles, stats.branches, stats.retired
    )?;
    for line in stats.registers.to_string().lines() {
        writeln!(out, "[HISTORY] {}", line)?;
    }
    Ok(())
}
