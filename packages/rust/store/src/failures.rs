//! Line-oriented record of items that failed mid-fetch.
//!
//! One video id per line, appended as failures happen so the record survives
//! a crash later in the same run. The file is informational; no stage reads
//! it to decide what to do next.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use tubedigest_shared::{Result, TubeDigestError, VideoId};

/// Append-only list of failed item ids.
#[derive(Debug, Clone)]
pub struct FailureList {
    path: PathBuf,
}

impl FailureList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one id, creating the file and its parent directory on first
    /// use.
    pub fn append(&self, id: &VideoId) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TubeDigestError::io(parent, e))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| TubeDigestError::io(&self.path, e))?;
        writeln!(file, "{id}").map_err(|e| TubeDigestError::io(&self.path, e))?;

        debug!(id = %id, path = %self.path.display(), "failure recorded");
        Ok(())
    }

    /// Read all recorded ids. A missing file means no failures yet.
    pub fn load(&self) -> Result<Vec<VideoId>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(TubeDigestError::io(&self.path, e)),
        };

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(VideoId::from)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_list() -> FailureList {
        let dir = std::env::temp_dir().join(format!("tubedigest-failures-test-{}", Uuid::now_v7()));
        FailureList::new(dir.join("failed_items.txt"))
    }

    #[test]
    fn append_accumulates_ids() {
        let list = temp_list();
        list.append(&VideoId::from("vid-1")).unwrap();
        list.append(&VideoId::from("vid-2")).unwrap();

        assert_eq!(
            list.load().unwrap(),
            vec![VideoId::from("vid-1"), VideoId::from("vid-2")]
        );

        std::fs::remove_dir_all(list.path().parent().unwrap()).ok();
    }

    #[test]
    fn load_of_missing_file_is_empty() {
        let list = temp_list();
        assert_eq!(list.load().unwrap(), Vec::<VideoId>::new());
    }
}
