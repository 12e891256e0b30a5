use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::OverlayerResult;

/// Per-request scratch directory, `<root>/req-<uuid>`.
///
/// Every intermediate file of one request lives here, so concurrent requests never collide. The
/// directory is removed on [`RequestWorkspace::teardown`] or when the value is dropped.
#[derive(Debug)]
pub struct RequestWorkspace {
    id: String,
    dir: PathBuf,
    torn_down: bool,
}

impl RequestWorkspace {
    /// Create a fresh workspace under `root`.
    pub fn create(root: &Path) -> OverlayerResult<Self> {
        let id = format!("req-{}", uuid::Uuid::new_v4().simple());
        let dir = root.join(&id);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create request workspace '{}'", dir.display()))?;
        tracing::debug!(request_id = %id, dir = %dir.display(), "created request workspace");
        Ok(Self {
            id,
            dir,
            torn_down: false,
        })
    }

    /// Request-scoped identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Workspace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a file named `name` inside the workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Remove the workspace and everything in it.
    pub fn teardown(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => tracing::debug!(request_id = %self.id, "removed request workspace"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                request_id = %self.id,
                dir = %self.dir.display(),
                error = %e,
                "failed to remove request workspace"
            ),
        }
    }
}

impl Drop for RequestWorkspace {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/workspace.rs"]
mod tests;
