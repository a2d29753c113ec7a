use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::constants::*;
use super::error::DumpStackError;

/// The collection of text files making up one capture.
///
/// The acquisition writes gzip compressed `level0_######.txt.gz` chunks and, when it is
/// interrupted, a plain text `dump_######.txt` holding whatever was still buffered. The full
/// dump is every compressed chunk in order followed by every supplement in order.
#[derive(Debug)]
pub struct DumpStack {
    compressed: Vec<(PathBuf, u64)>,
    supplements: Vec<(PathBuf, u64)>,
    total_stack_size_bytes: u64,
}

impl DumpStack {
    /// Create a new DumpStack for a capture directory
    pub fn new(path: &Path) -> Result<Self, DumpStackError> {
        if !path.is_dir() {
            return Err(DumpStackError::BadDirectory(path.to_path_buf()));
        }
        let mut compressed: Vec<(PathBuf, u64)> = Vec::new();
        let mut supplements: Vec<(PathBuf, u64)> = Vec::new();
        for item in path.read_dir()? {
            let item_path = item?.path();
            if !item_path.is_file() {
                continue;
            }
            let name = match item_path.file_name() {
                Some(n) => n.to_string_lossy().to_string(),
                None => continue,
            };
            let bytes = item_path.metadata()?.len();
            if name.contains(COMPRESSED_PATTERN) && name.ends_with(COMPRESSED_EXTENSION) {
                compressed.push((item_path, bytes));
            } else if name.starts_with(SUPPLEMENT_PATTERN) && name.ends_with(SUPPLEMENT_EXTENSION) {
                supplements.push((item_path, bytes));
            } else {
                log::info!("Skipping file {name}");
            }
        }

        // Chunks are numbered with zero padding so a plain sort is the capture order
        compressed.sort();
        supplements.sort();
        let total_stack_size_bytes = compressed
            .iter()
            .chain(supplements.iter())
            .fold(0, |sum, (_, bytes)| sum + bytes);

        if compressed.is_empty() && supplements.is_empty() {
            log::warn!("No level0 or dump files found in {}", path.display());
        }

        Ok(Self {
            compressed,
            supplements,
            total_stack_size_bytes,
        })
    }

    pub fn get_total_data_size(&self) -> &u64 {
        &self.total_stack_size_bytes
    }

    pub fn n_files(&self) -> usize {
        self.compressed.len() + self.supplements.len()
    }

    /// Files in read order with their on-disk sizes
    pub fn get_file_stack(&self) -> Vec<&(PathBuf, u64)> {
        self.compressed.iter().chain(self.supplements.iter()).collect()
    }

    /// Read and decompress every file, concatenating them into a single dump
    pub fn read_all(&self) -> Result<String, DumpStackError> {
        let mut dump = String::new();
        for (path, _) in self.compressed.iter() {
            log::debug!("Reading {}", path.display());
            let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(path)?));
            decoder.read_to_string(&mut dump)?;
        }
        for (path, _) in self.supplements.iter() {
            log::debug!("Reading {}", path.display());
            File::open(path)?.read_to_string(&mut dump)?;
        }
        Ok(dump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn write_gz(path: &Path, text: &str) {
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_read_order() {
        let dir = tempfile::tempdir().unwrap();
        write_gz(&dir.path().join("level0_000001.txt.gz"), "b\n");
        write_gz(&dir.path().join("level0_000000.txt.gz"), "a\n");
        std::fs::write(dir.path().join("dump_000002.txt"), "d\n").unwrap();
        std::fs::write(dir.path().join("dump_000001.txt"), "c\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored\n").unwrap();

        let stack = DumpStack::new(dir.path()).unwrap();
        assert_eq!(stack.n_files(), 4);
        assert_eq!(stack.read_all().unwrap(), "a\nb\nc\nd\n");
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let stack = DumpStack::new(dir.path()).unwrap();
        assert_eq!(stack.n_files(), 0);
        assert_eq!(*stack.get_total_data_size(), 0);
        assert!(stack.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_bad_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DumpStack::new(&dir.path().join("missing")),
            Err(DumpStackError::BadDirectory(_))
        ));
    }
}
