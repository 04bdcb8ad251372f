use std::sync::Arc;

use futures::stream::{self, BoxStream};
use quiver_error::{QuiverError, Result};

use crate::source::{ChunkRead, SourceOpener};

/// Default byte size for a single source read.
pub const DEFAULT_CHUNK_SIZE: usize = 2 * 1024 * 1024;

/// Streaming CSV parser over a reopenable byte source.
///
/// Comma separated, double-quote field quoting with `""` as an escaped
/// literal quote, row terminators CRLF, LF, or bare CR. Rows are parsed per
/// chunk; the raw bytes of a trailing row that wasn't terminated within the
/// chunk are carried verbatim into the next chunk and reparsed from the row
/// start, so cell and quote state never leak across a chunk boundary.
#[derive(Debug, Clone)]
pub struct CsvParser {
    opener: Arc<dyn SourceOpener>,
    chunk_size: usize,
}

impl CsvParser {
    pub fn new(opener: Arc<dyn SourceOpener>, chunk_size: usize) -> Self {
        CsvParser { opener, chunk_size }
    }

    /// Read just enough of the source to parse its first row.
    ///
    /// Errors if the source is empty.
    pub fn preview(&self) -> Result<Vec<String>> {
        let mut reader = self.opener.open()?;
        let mut buf = Vec::new();
        loop {
            let chunk = reader.read_chunk(self.chunk_size)?;
            let eof = chunk.is_empty();
            buf.extend_from_slice(&chunk);
            let parsed = parse_block(&buf, eof);
            if let Some(row) = parsed.rows.into_iter().next() {
                return Ok(row);
            }
            if eof {
                return Err(QuiverError::sql("Cannot preview an empty source"));
            }
        }
    }

    /// Lazily parse the whole source into blocks of rows, one block per
    /// source chunk.
    ///
    /// Each call opens a fresh reader; nothing is read until the stream is
    /// polled. Dropping the stream closes the reader.
    pub fn parse_rows(&self) -> BoxStream<'static, Result<Vec<Vec<String>>>> {
        let opener = self.opener.clone();
        let chunk_size = self.chunk_size;

        Box::pin(stream::try_unfold(
            ScanState::Start { opener, chunk_size },
            |state| async move {
                let mut scan = match state {
                    ScanState::Start { opener, chunk_size } => RowScan {
                        reader: opener.open()?,
                        chunk_size,
                        carry: Vec::new(),
                        skip_leading_lf: false,
                    },
                    ScanState::Running(scan) => scan,
                    ScanState::Done => return Ok(None),
                };

                loop {
                    let chunk = scan.reader.read_chunk(scan.chunk_size)?;
                    if chunk.is_empty() {
                        // End of input. Whatever was carried is the final
                        // row, terminator or not.
                        if scan.carry.is_empty() {
                            return Ok(None);
                        }
                        let parsed = parse_block(&scan.carry, true);
                        return Ok(Some((parsed.rows, ScanState::Done)));
                    }

                    let mut chunk = &chunk[..];
                    if scan.skip_leading_lf && chunk.first() == Some(&b'\n') {
                        // Second half of a CRLF split across chunks.
                        chunk = &chunk[1..];
                    }
                    scan.skip_leading_lf = false;

                    let mut buf = std::mem::take(&mut scan.carry);
                    buf.extend_from_slice(chunk);

                    let parsed = parse_block(&buf, false);
                    if let Some(start) = parsed.carry_start {
                        scan.carry = buf[start..].to_vec();
                    }
                    scan.skip_leading_lf = parsed.ended_with_cr;

                    if !parsed.rows.is_empty() {
                        return Ok(Some((parsed.rows, ScanState::Running(scan))));
                    }
                }
            },
        ))
    }
}

enum ScanState {
    Start {
        opener: Arc<dyn SourceOpener>,
        chunk_size: usize,
    },
    Running(RowScan),
    Done,
}

struct RowScan {
    reader: Box<dyn ChunkRead>,
    chunk_size: usize,
    carry: Vec<u8>,
    skip_leading_lf: bool,
}

struct ParsedBlock {
    rows: Vec<Vec<String>>,
    /// Byte offset where the trailing unterminated row starts, if any.
    carry_start: Option<usize>,
    /// The block ended exactly at a bare CR terminator; a leading LF in the
    /// next block belongs to it.
    ended_with_cr: bool,
}

/// Single-pass two-state machine over one block of bytes.
fn parse_block(input: &[u8], eof: bool) -> ParsedBlock {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Vec<u8> = Vec::new();
    let mut in_quotes = false;
    let mut row_start = 0;
    let mut idx = 0;

    while idx < input.len() {
        let b = input[idx];
        if in_quotes {
            if b == b'"' {
                if input.get(idx + 1) == Some(&b'"') {
                    cell.push(b'"');
                    idx += 2;
                } else {
                    in_quotes = false;
                    idx += 1;
                }
            } else {
                cell.push(b);
                idx += 1;
            }
            continue;
        }
        match b {
            b'"' => {
                in_quotes = true;
                idx += 1;
            }
            b',' => {
                row.push(take_cell(&mut cell));
                idx += 1;
            }
            b'\n' | b'\r' => {
                row.push(take_cell(&mut cell));
                rows.push(std::mem::take(&mut row));
                idx += 1;
                if b == b'\r' && input.get(idx) == Some(&b'\n') {
                    idx += 1;
                }
                row_start = idx;
            }
            other => {
                cell.push(other);
                idx += 1;
            }
        }
    }

    let mut carry_start = (row_start < input.len()).then_some(row_start);
    if eof && carry_start.take().is_some() {
        row.push(take_cell(&mut cell));
        rows.push(row);
    }
    let ended_with_cr = carry_start.is_none() && input.last() == Some(&b'\r');

    ParsedBlock {
        rows,
        carry_start,
        ended_with_cr,
    }
}

fn take_cell(cell: &mut Vec<u8>) -> String {
    String::from_utf8_lossy(&std::mem::take(cell)).into_owned()
}
