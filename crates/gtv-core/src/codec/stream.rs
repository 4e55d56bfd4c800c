//! Reading and writing sequences of encoded values over IO streams

use super::{decode_with_limits, encode};
use crate::config::CodecLimits;
use crate::error::{GtvError, Result};
use crate::value::Gtv;
use std::io::{self, Read, Write};
use tracing::trace;

/// Reads consecutive encoded values from a byte stream
///
/// Each record is framed by its own outer tag and length, so the reader only
/// buffers one value at a time. End of input between records ends the
/// iteration; end of input inside a record is a malformed encoding.
pub struct GtvStreamReader<R> {
    reader: R,
    limits: CodecLimits,
    position: usize,
}

impl<R: Read> GtvStreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, CodecLimits::default())
    }

    pub fn with_limits(reader: R, limits: CodecLimits) -> Self {
        Self {
            reader,
            limits,
            position: 0,
        }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Read the next value, or `None` at a clean end of input
    pub fn read_next(&mut self) -> Result<Option<Gtv>> {
        let start = self.position;
        let Some(tag) = self.read_first_byte()? else {
            return Ok(None);
        };

        let mut frame = vec![tag];
        let first = self.read_byte()?;
        frame.push(first);
        let len = if first < 0x80 {
            first as usize
        } else {
            let count = (first & 0x7F) as usize;
            if count == 0 || count > std::mem::size_of::<usize>() {
                return Err(GtvError::malformed(start + 1, "unsupported length form"));
            }
            let mut len = 0usize;
            for _ in 0..count {
                let b = self.read_byte()?;
                frame.push(b);
                len = (len << 8) | b as usize;
            }
            len
        };

        if frame.len().saturating_add(len) > self.limits.max_bytes {
            return Err(GtvError::LimitExceeded(format!(
                "record at byte {start} exceeds {} bytes",
                self.limits.max_bytes
            )));
        }

        let header = frame.len();
        frame.resize(header + len, 0);
        self.reader
            .read_exact(&mut frame[header..])
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => {
                    GtvError::malformed(self.position, "stream ended inside a record")
                }
                _ => GtvError::Io(e),
            })?;
        self.position += len;

        let value = decode_with_limits(&frame, &self.limits).map_err(|e| match e {
            GtvError::MalformedEncoding { offset, reason } => GtvError::MalformedEncoding {
                offset: start + offset,
                reason,
            },
            other => other,
        })?;
        trace!(offset = start, bytes = frame.len(), "read record");
        Ok(Some(value))
    }

    fn read_first_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.read_first_byte()?
            .ok_or_else(|| GtvError::malformed(self.position, "stream ended inside a record"))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for GtvStreamReader<R> {
    type Item = Result<Gtv>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Writes encoded values back to back
pub struct GtvStreamWriter<W> {
    writer: W,
    written: usize,
}

impl<W: Write> GtvStreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn write(&mut self, value: &Gtv) -> Result<()> {
        self.writer.write_all(&encode(value))?;
        self.written += 1;
        Ok(())
    }

    /// Number of values written
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
