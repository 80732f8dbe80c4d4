//! Per-cycle stage occupancy as CSV

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::SimulatorResult;
use crate::pipelined::pipeline::CycleReport;
use crate::pipelined::stages::StageId;

/// Writes one row per cycle: `cycle,pc,IF,ID,EX,MEM,WB`
pub struct TraceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl TraceWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> SimulatorResult<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(inner: W) -> SimulatorResult<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        let mut header = vec!["cycle".to_owned(), "pc".to_owned()];
        header.extend(StageId::ALL.iter().map(ToString::to_string));
        writer.write_record(&header)?;
        Ok(Self { writer })
    }

    pub fn record(&mut self, report: &CycleReport) -> SimulatorResult<()> {
        let mut row = vec![report.cycle.to_string(), report.pc.to_string()];
        row.extend(StageId::ALL.iter().map(|&id| report.token(id).to_owned()));
        self.writer.write_record(&row)?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer
    pub fn finish(self) -> SimulatorResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}
