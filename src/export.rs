//! Error table export
//!
//! One column, `error_angle_deg`, one row per completed trial in completion
//! order. Respond-late samples are written as `NaN`.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::Result;
use crate::sim::{ErrorSample, ErrorValue};

/// Column header of the exported table
pub const HEADER: &str = "error_angle_deg";

/// Marker written for invalid samples
pub const INVALID_MARKER: &str = "NaN";

/// File name for a session started or ended at `at`
pub fn session_file_name(at: DateTime<Local>) -> String {
    format!("{}.csv", at.format("%Y-%m-%d_%H-%M-%S"))
}

fn cell(sample: &ErrorSample) -> String {
    match sample.error {
        ErrorValue::Degrees(d) => d.to_string(),
        ErrorValue::Invalid => INVALID_MARKER.to_string(),
    }
}

/// Write the table to any writer
pub fn write_errors<W: Write>(writer: W, samples: &[ErrorSample]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([HEADER])?;
    for sample in samples {
        wtr.write_record([cell(sample)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the table into `dir` under a timestamped name, returning the path
pub fn export_session(dir: &Path, samples: &[ErrorSample]) -> Result<PathBuf> {
    match write_session_file(dir, samples) {
        Ok(path) => {
            log::info!("Exported {} error samples to {}", samples.len(), path.display());
            Ok(path)
        }
        Err(e) => {
            log::warn!("Export to {} failed: {e}", dir.display());
            Err(e)
        }
    }
}

fn write_session_file(dir: &Path, samples: &[ErrorSample]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(session_file_name(Local::now()));
    let file = std::fs::File::create(&path)?;
    write_errors(file, samples)?;
    Ok(path)
}
