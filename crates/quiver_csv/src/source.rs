use std::fmt::Debug;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use bytes::Bytes;
use quiver_error::{Result, ResultExt};

/// Forward-only reader over a byte source.
pub trait ChunkRead: Debug + Send {
    /// Read up to `size` bytes. An empty result means end of input.
    fn read_chunk(&mut self, size: usize) -> Result<Bytes>;
}

/// Opens a fresh reader over the same underlying source.
///
/// Each scan of a data source re-opens the source, so concurrent scans never
/// share read position.
pub trait SourceOpener: Debug + Send + Sync {
    fn open(&self) -> Result<Box<dyn ChunkRead>>;
}

#[derive(Debug, Clone)]
pub struct FileOpener {
    path: PathBuf,
}

impl FileOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileOpener { path: path.into() }
    }
}

impl SourceOpener for FileOpener {
    fn open(&self) -> Result<Box<dyn ChunkRead>> {
        let file = File::open(&self.path)
            .context_fn(|| format!("Failed to open file: {}", self.path.display()))?;
        Ok(Box::new(FileChunkRead { file }))
    }
}

#[derive(Debug)]
struct FileChunkRead {
    file: File,
}

impl ChunkRead for FileChunkRead {
    fn read_chunk(&mut self, size: usize) -> Result<Bytes> {
        let mut buf = vec![0; size];
        let mut filled = 0;
        // Short reads don't mean EOF for files, keep filling until the chunk
        // is full or the file is exhausted.
        while filled < size {
            let n = self.file.read(&mut buf[filled..]).context("Failed to read file chunk")?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);
        Ok(Bytes::from(buf))
    }
}

/// In-memory byte source, used in tests and for pre-loaded content.
#[derive(Debug, Clone)]
pub struct MemoryOpener {
    data: Bytes,
}

impl MemoryOpener {
    pub fn new(data: impl Into<Bytes>) -> Self {
        MemoryOpener { data: data.into() }
    }
}

impl SourceOpener for MemoryOpener {
    fn open(&self) -> Result<Box<dyn ChunkRead>> {
        Ok(Box::new(MemoryChunkRead {
            data: self.data.clone(),
            pos: 0,
        }))
    }
}

#[derive(Debug)]
struct MemoryChunkRead {
    data: Bytes,
    pos: usize,
}

impl ChunkRead for MemoryChunkRead {
    fn read_chunk(&mut self, size: usize) -> Result<Bytes> {
        let end = usize::min(self.pos + size, self.data.len());
        let chunk = self.data.slice(self.pos..end);
        self.pos = end;
        Ok(chunk)
    }
}
