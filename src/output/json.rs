//! JSON export of a scan job

use crate::output::OutputResult;
use crate::scan::ScanJob;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the job as pretty-printed JSON, the same shape a status poll returns
pub fn write_json_report(job: &ScanJob, output_path: &Path) -> OutputResult<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, job)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
