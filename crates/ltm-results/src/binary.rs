//! Binary snapshot layout (all integers and doubles little-endian).
//!
//! Header, written once:
//! - `u32` body count
//! - per body: `u32` label length, then the raw label bytes
//!
//! Then one record per snapshot: an `f64` per body in registration order,
//! followed by the two-byte end-of-record marker `[0, 0]`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use ltm_network::ThermalNetwork;

use crate::writer::{HeaderState, SnapshotWriter};
use crate::{ResultsError, ResultsResult};

/// Marker closing every record.
pub const END_OF_RECORD: [u8; 2] = [0, 0];

pub struct BinaryWriter<W: Write> {
    out: W,
    header: HeaderState,
}

impl BinaryWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> ResultsResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> BinaryWriter<W> {
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

fn len_u32(len: usize, what: &str) -> ResultsResult<u32> {
    u32::try_from(len)
        .map_err(|_| ResultsError::format(format!("{what} does not fit in u32: {len}")))
}

impl<W: Write> SnapshotWriter for BinaryWriter<W> {
    fn write_header(&mut self, network: &ThermalNetwork) -> ResultsResult<()> {
        self.header.begin(network)?;
        let count = len_u32(network.body_count(), "body count")?;
        self.out.write_all(&count.to_le_bytes())?;
        for body in network.bodies() {
            let label = body.label().as_bytes();
            self.out
                .write_all(&len_u32(label.len(), "label length")?.to_le_bytes())?;
            self.out.write_all(label)?;
        }
        Ok(())
    }

    fn write_snapshot(&mut self, network: &ThermalNetwork) -> ResultsResult<()> {
        self.header.check(network)?;
        for t in network.temperatures().iter() {
            self.out.write_all(&t.to_le_bytes())?;
        }
        self.out.write_all(&END_OF_RECORD)?;
        Ok(())
    }

    fn finish(&mut self) -> ResultsResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Reader for the binary layout.
pub struct BinaryReader<R: Read> {
    input: R,
    labels: Vec<String>,
    record: Vec<u8>,
}

impl BinaryReader<BufReader<File>> {
    pub fn open(path: &Path) -> ResultsResult<Self> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read> BinaryReader<R> {
    /// Read the header; records are read lazily afterwards.
    ///
    /// Counts and lengths in the header are not trusted for allocation: a
    /// header promising more than the stream holds is an error.
    pub fn new(mut input: R) -> ResultsResult<Self> {
        let count = read_u32(&mut input)? as usize;
        let mut labels = Vec::new();
        for _ in 0..count {
            let len = read_u32(&mut input)? as usize;
            let mut raw = Vec::new();
            input.by_ref().take(len as u64).read_to_end(&mut raw)?;
            if raw.len() != len {
                return Err(ResultsError::format(format!(
                    "label truncated: expected {len} bytes, found {}",
                    raw.len()
                )));
            }
            let label = String::from_utf8(raw)
                .map_err(|e| ResultsError::format(format!("label is not UTF-8: {e}")))?;
            labels.push(label);
        }
        Ok(Self {
            input,
            labels,
            record: vec![0u8; 8 * count + END_OF_RECORD.len()],
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Size in bytes of one snapshot record.
    pub fn record_len(&self) -> usize {
        self.record.len()
    }

    /// Next snapshot, or `None` at a clean end of stream.
    pub fn next_record(&mut self) -> ResultsResult<Option<Vec<f64>>> {
        if !fill_or_eof(&mut self.input, &mut self.record)? {
            return Ok(None);
        }
        let (values, marker) = self.record.split_at(self.record.len() - END_OF_RECORD.len());
        if marker != END_OF_RECORD {
            return Err(ResultsError::format("missing end-of-record marker"));
        }
        let temps = values
            .chunks_exact(8)
            .map(|chunk| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(chunk);
                f64::from_le_bytes(bytes)
            })
            .collect();
        Ok(Some(temps))
    }

    /// Read every remaining snapshot.
    pub fn read_all(&mut self) -> ResultsResult<Vec<Vec<f64>>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }
}

fn read_u32(input: &mut impl Read) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    input.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

/// Fill `buf` completely. Returns `false` if the stream ended before the
/// first byte; a stream ending mid-buffer is an `UnexpectedEof` error.
fn fill_or_eof(input: &mut impl Read, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "truncated snapshot record",
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}
