//! CSV snapshot layout.
//!
//! ```text
//! "Body A","Body B"
//! 270,600
//! 270.0123,599.9877
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ltm_network::ThermalNetwork;

use crate::ResultsResult;
use crate::writer::{HeaderState, SnapshotWriter};

pub struct CsvWriter<W: Write> {
    out: W,
    header: HeaderState,
}

impl CsvWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> ResultsResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header: HeaderState::default(),
        }
    }

    /// Flush and hand back the underlying stream.
    pub fn into_inner(mut self) -> ResultsResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> SnapshotWriter for CsvWriter<W> {
    fn write_header(&mut self, network: &ThermalNetwork) -> ResultsResult<()> {
        self.header.begin(network)?;
        let line = network
            .bodies()
            .iter()
            .map(|b| format!("\"{}\"", b.label().replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn write_snapshot(&mut self, network: &ThermalNetwork) -> ResultsResult<()> {
        self.header.check(network)?;
        let line = network
            .temperatures()
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn finish(&mut self) -> ResultsResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltm_network::Body;

    #[test]
    fn quotes_inside_labels_are_doubled() {
        let mut net = ThermalNetwork::new("q");
        net.register_body(Body::constant("say \"hi\"", 1.5).unwrap())
            .unwrap();
        let mut w = CsvWriter::new(Vec::new());
        w.write_header(&net).unwrap();
        w.write_snapshot(&net).unwrap();
        let text = String::from_utf8(w.into_inner().unwrap()).unwrap();
        assert_eq!(text, "\"say \"\"hi\"\"\"\n1.5\n");
    }

    #[test]
    fn snapshot_requires_header() {
        let net = ThermalNetwork::new("empty");
        let mut w = CsvWriter::new(Vec::new());
        assert!(w.write_snapshot(&net).is_err());
        w.write_header(&net).unwrap();
        assert!(w.write_header(&net).is_err());
    }
}
