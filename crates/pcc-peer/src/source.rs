use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Where the sender pulls payload bytes from.
///
/// The total length is known upfront because it goes on the wire first.
/// The content itself is fetched in bounded chunks and never has to fit in
/// memory at once.
pub trait PayloadSource {
    /// Bytes still to be read.
    fn remaining(&self) -> u64;

    /// Read up to `buf.len()` bytes. `Ok(0)` means the source is exhausted.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// A regular file, sized with `metadata` at open time.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    path: PathBuf,
    remaining: u64,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let remaining = file.metadata()?.len();
        Ok(Self {
            file,
            path,
            remaining,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PayloadSource for FileSource {
    fn remaining(&self) -> u64 {
        self.remaining
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.file.read(buf)?;
        self.remaining = self.remaining.saturating_sub(read as u64);
        Ok(read)
    }
}

/// An in-memory payload.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl PayloadSource for SliceSource<'_> {
    fn remaining(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}
