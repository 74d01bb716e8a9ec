//! Publish-on-success file writes.
//!
//! Artifacts are written to a temporary file in the destination directory and
//! renamed over the target only after every byte has been flushed. A failed
//! stage therefore never leaves a partial file at the canonical path.

use podar_common::{PodarError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A file that becomes visible at its target path only on [`commit`](Self::commit).
///
/// Dropping an uncommitted `AtomicFile` removes the temporary file.
pub struct AtomicFile {
    target: PathBuf,
    temp: NamedTempFile,
}

impl AtomicFile {
    /// Start writing `target`, creating its parent directory if needed.
    pub fn create(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref().to_path_buf();
        let parent = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .map_err(|e| PodarError::io(format!("creating directory {}", parent.display()), e))?;
        let temp = NamedTempFile::new_in(&parent).map_err(|e| {
            PodarError::io(format!("creating temporary file in {}", parent.display()), e)
        })?;
        Ok(Self { target, temp })
    }

    /// Destination path.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Flush, sync and rename over the target.
    pub fn commit(mut self) -> Result<PathBuf> {
        let context = format!("publishing {}", self.target.display());
        self.temp.flush().map_err(|e| PodarError::io(context.clone(), e))?;
        self.temp
            .as_file()
            .sync_all()
            .map_err(|e| PodarError::io(context.clone(), e))?;
        self.temp
            .persist(&self.target)
            .map_err(|e| PodarError::io(context, e.error))?;
        Ok(self.target)
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

/// Write `bytes` to `path` atomically.
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<PathBuf> {
    let mut file = AtomicFile::create(path)?;
    let context = format!("writing {}", file.target().display());
    file.write_all(bytes).map_err(|e| PodarError::io(context, e))?;
    file.commit()
}

/// Open a CSV writer whose output is published by [`finish_csv`].
pub fn csv_writer(path: impl AsRef<Path>) -> Result<csv::Writer<AtomicFile>> {
    Ok(csv::Writer::from_writer(AtomicFile::create(path)?))
}

/// Flush a CSV writer and publish its file.
pub fn finish_csv(writer: csv::Writer<AtomicFile>) -> Result<PathBuf> {
    let file = writer
        .into_inner()
        .map_err(|e| PodarError::io("flushing CSV output", e.into_error()))?;
    file.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/policy.csv");
        write_atomic(&path, b"node_id,prune\n0,0\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "node_id,prune\n0,0\n");
    }

    #[test]
    fn test_uncommitted_file_leaves_no_trace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        {
            let mut file = AtomicFile::create(&path).unwrap();
            file.write_all(b"{\"partial\":").unwrap();
        }
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_commit_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("labels.csv");
        fs::write(&path, "old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_csv_writer_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        let mut writer = csv_writer(&path).unwrap();
        writer.write_record(["a", "b"]).unwrap();
        writer.write_record(["1", "2"]).unwrap();
        assert!(!path.exists());
        finish_csv(writer).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");
    }
}
