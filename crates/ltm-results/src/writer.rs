//! Common writer interface and format selection.

use std::path::Path;

use ltm_network::ThermalNetwork;
use tracing::debug;

use crate::binary::BinaryWriter;
use crate::csv::CsvWriter;
use crate::{ResultsError, ResultsResult};

/// A sink for network snapshots.
///
/// The header is written once, before any snapshot. Every snapshot holds
/// the temperatures of all bodies in registration order.
pub trait SnapshotWriter {
    fn write_header(&mut self, network: &ThermalNetwork) -> ResultsResult<()>;

    fn write_snapshot(&mut self, network: &ThermalNetwork) -> ResultsResult<()>;

    /// Flush buffered output. Dropping a writer also releases its handle,
    /// but only `finish` reports flush failures.
    fn finish(&mut self) -> ResultsResult<()>;
}

/// Output layout selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Binary,
}

/// Create a file writer for `path` in the requested layout.
pub fn create_writer(path: &Path, format: OutputFormat) -> ResultsResult<Box<dyn SnapshotWriter>> {
    debug!(path = %path.display(), ?format, "opening snapshot stream");
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvWriter::create(path)?),
        OutputFormat::Binary => Box::new(BinaryWriter::create(path)?),
    })
}

/// Tracks the header/body-count contract shared by both layouts.
#[derive(Debug, Default)]
pub(crate) struct HeaderState {
    bodies: Option<usize>,
}

impl HeaderState {
    pub(crate) fn begin(&mut self, network: &ThermalNetwork) -> ResultsResult<()> {
        if self.bodies.is_some() {
            return Err(ResultsError::format("header already written"));
        }
        self.bodies = Some(network.body_count());
        Ok(())
    }

    pub(crate) fn check(&self, network: &ThermalNetwork) -> ResultsResult<()> {
        match self.bodies {
            None => Err(ResultsError::format("snapshot written before header")),
            Some(n) if n != network.body_count() => Err(ResultsError::format(format!(
                "network has {} bodies but the header lists {}",
                network.body_count(),
                n
            ))),
            Some(_) => Ok(()),
        }
    }
}
