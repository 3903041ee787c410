use std::fs;
use std::path::Path;

use log::debug;

use super::{ByteSource, SourceError};

/// Replays captured bytes, releasing at most `chunk_size` per tick.
///
/// The source starts open. Closing it stops delivery; reopening resumes
/// from where it stopped.
///
/// # Examples
/// ```
/// use mpac_core::{ByteSource, ReplaySource};
///
/// let mut source = ReplaySource::new(vec![1, 2, 3], 2)?;
/// assert_eq!(source.bytes_available(), 2);
/// let mut buf = [0u8; 2];
/// assert_eq!(source.read(&mut buf)?, 2);
/// assert_eq!(source.bytes_available(), 1);
/// # Ok::<(), mpac_core::SourceError>(())
/// ```
#[derive(Debug)]
pub struct ReplaySource {
    data: Vec<u8>,
    position: usize,
    chunk_size: usize,
    open: bool,
}

impl ReplaySource {
    pub fn new(data: Vec<u8>, chunk_size: usize) -> Result<Self, SourceError> {
        if chunk_size == 0 {
            return Err(SourceError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            data,
            position: 0,
            chunk_size,
            open: true,
        })
    }

    pub fn from_path(path: &Path, chunk_size: usize) -> Result<Self, SourceError> {
        let data = fs::read(path)?;
        debug!("loaded {} bytes from {}", data.len(), path.display());
        Self::new(data, chunk_size)
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ByteSource for ReplaySource {
    fn is_open(&self) -> bool {
        self.open
    }

    fn bytes_available(&self) -> usize {
        if !self.open {
            return 0;
        }
        (self.data.len() - self.position).min(self.chunk_size)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        if !self.open {
            return Err(SourceError::Closed);
        }
        let count = buf.len().min(self.bytes_available());
        buf[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::ReplaySource;
    use crate::source::{ByteSource, SourceError};

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = ReplaySource::new(vec![1], 0).unwrap_err();
        assert!(matches!(err, SourceError::InvalidChunkSize(0)));
    }

    #[test]
    fn releases_data_in_ticks() {
        let mut source = ReplaySource::new((0..5).collect(), 2).unwrap();
        let mut ticks = Vec::new();
        while !source.is_exhausted() {
            let mut buf = vec![0u8; source.bytes_available()];
            let read = source.read(&mut buf).unwrap();
            ticks.push(buf[..read].to_vec());
        }
        assert_eq!(ticks, vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn closed_source_reports_nothing() {
        let mut source = ReplaySource::new(vec![1, 2], 8).unwrap();
        source.close();
        assert!(!source.is_open());
        assert_eq!(source.bytes_available(), 0);
        let mut buf = [0u8; 2];
        assert!(matches!(source.read(&mut buf), Err(SourceError::Closed)));

        source.open();
        assert_eq!(source.read(&mut buf).unwrap(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReplaySource::from_path(&dir.path().join("missing.bin"), 4).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
