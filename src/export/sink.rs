//! Artifact delivery
//!
//! The coordinator never writes files itself; it hands finished bytes to an
//! [`ArtifactSink`]. [`DirectorySink`] saves into a folder through a staged
//! temp file that is removed on every exit path unless committed, and
//! [`MemorySink`] keeps artifacts in memory for tests and embedding hosts.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ExportError, ExportResult};

/// What the host did with an offered artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferOutcome {
    /// Artifact was accepted; `location` names where it ended up, if anywhere
    Delivered { location: Option<PathBuf> },
    /// Host declined the artifact (e.g. the user closed the save prompt)
    Declined,
}

/// Receives finished export artifacts
pub trait ArtifactSink: Send + Sync {
    fn offer_artifact(&self, bytes: &[u8], filename: &str, mime_type: &str) -> ExportResult<OfferOutcome>;
}

/// Saves artifacts into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn offer_artifact(&self, bytes: &[u8], filename: &str, mime_type: &str) -> ExportResult<OfferOutcome> {
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.starts_with('.') {
            return Err(ExportError::SinkFailed {
                filename: filename.to_string(),
                reason: "file name must be a plain, non-hidden name".to_string(),
            });
        }

        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(filename);

        let (staged, mut file) = StagedFile::create(&self.dir, filename)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()?;
        drop(file);
        staged.commit(&target)?;

        log::info!(
            "Exported {} ({} bytes, {}) to {}",
            filename,
            bytes.len(),
            mime_type,
            target.display()
        );
        Ok(OfferOutcome::Delivered {
            location: Some(target),
        })
    }
}

/// Temp file that is deleted when dropped without being committed
struct StagedFile {
    path: PathBuf,
    committed: bool,
}

impl StagedFile {
    fn create(dir: &Path, filename: &str) -> std::io::Result<(Self, File)> {
        let path = dir.join(format!(".{}.{}.tmp", filename, uuid::Uuid::new_v4()));
        let file = File::create(&path)?;
        Ok((
            Self {
                path,
                committed: false,
            },
            file,
        ))
    }

    fn commit(mut self, target: &Path) -> std::io::Result<()> {
        std::fs::rename(&self.path, target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::debug!("Could not remove staged export {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Artifact captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferedArtifact {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Sink that records artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    offered: Mutex<Vec<OfferedArtifact>>,
    decline: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that records every offer but reports it as declined
    pub fn declining() -> Self {
        Self {
            offered: Mutex::new(Vec::new()),
            decline: true,
        }
    }

    /// Artifacts offered so far, oldest first
    pub fn offered(&self) -> Vec<OfferedArtifact> {
        self.offered
            .lock()
            .map(|offered| offered.clone())
            .unwrap_or_default()
    }
}

impl ArtifactSink for MemorySink {
    fn offer_artifact(&self, bytes: &[u8], filename: &str, mime_type: &str) -> ExportResult<OfferOutcome> {
        let mut offered = self.offered.lock().map_err(|_| ExportError::SinkFailed {
            filename: filename.to_string(),
            reason: "memory sink lock poisoned".to_string(),
        })?;
        offered.push(OfferedArtifact {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });

        if self.decline {
            Ok(OfferOutcome::Declined)
        } else {
            Ok(OfferOutcome::Delivered { location: None })
        }
    }
}

impl<T: ArtifactSink + ?Sized> ArtifactSink for std::sync::Arc<T> {
    fn offer_artifact(&self, bytes: &[u8], filename: &str, mime_type: &str) -> ExportResult<OfferOutcome> {
        (**self).offer_artifact(bytes, filename, mime_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        let outcome = sink
            .offer_artifact(b"hello", "a_2024-01-01T00-00-00.txt", "text/plain")
            .unwrap();

        let expected = dir.path().join("out").join("a_2024-01-01T00-00-00.txt");
        assert_eq!(
            outcome,
            OfferOutcome::Delivered {
                location: Some(expected.clone())
            }
        );
        assert_eq!(std::fs::read(&expected).unwrap(), b"hello");
        assert_eq!(names_in(&dir.path().join("out")), vec!["a_2024-01-01T00-00-00.txt"]);
    }

    #[test]
    fn test_directory_sink_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        assert!(matches!(
            sink.offer_artifact(b"x", "../x.txt", "text/plain"),
            Err(ExportError::SinkFailed { .. })
        ));
        assert!(names_in(dir.path()).is_empty());
    }

    #[test]
    fn test_staged_file_removed_without_commit() {
        let dir = tempfile::tempdir().unwrap();
        {
            let (_staged, mut file) = StagedFile::create(dir.path(), "a.txt").unwrap();
            file.write_all(b"partial").unwrap();
            assert_eq!(names_in(dir.path()).len(), 1);
        }
        assert!(names_in(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_commit_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let (staged, file) = StagedFile::create(dir.path(), "a.txt").unwrap();
        drop(file);
        // renaming into a missing directory fails
        let target = dir.path().join("missing").join("a.txt");
        assert!(staged.commit(&target).is_err());
        assert!(names_in(dir.path()).is_empty());
    }

    #[test]
    fn test_memory_sink_records_offers() {
        let sink = MemorySink::new();
        sink.offer_artifact(b"1", "one.txt", "text/plain").unwrap();
        let declining = MemorySink::declining();
        assert_eq!(
            declining.offer_artifact(b"2", "two.txt", "text/plain").unwrap(),
            OfferOutcome::Declined
        );
        assert_eq!(sink.offered()[0].filename, "one.txt");
        assert_eq!(declining.offered().len(), 1);
    }
}
