use std::{
    io,
    path::{Component, Path, PathBuf},
};

use uuid::Uuid;

/// Directory owned by exactly one execution.
///
/// Created under the shared base directory with a random name and removed,
/// recursively and best effort, when the guard is dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub async fn create(base_dir: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(base_dir).await?;

        let dir = base_dir.join(format!("run_{}", Uuid::new_v4()));
        // `create_dir` fails on an existing path, so two calls never share a directory.
        tokio::fs::create_dir(&dir).await?;

        tracing::debug!(workspace = %dir.display(), "Workspace created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn join<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.dir.join(path)
    }

    /// Writes `contents` to `file_name` directly inside the workspace.
    ///
    /// `file_name` must be a single plain path component; anything that could
    /// resolve elsewhere (absolute paths, `..`, separators) is rejected.
    pub async fn write_file(&self, file_name: &str, contents: &str) -> io::Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{file_name}` is not a plain file name"),
            ));
        }

        let path = self.join(file_name);
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => tracing::debug!(workspace = %self.dir.display(), "Workspace removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                workspace = %self.dir.display(),
                error = %e,
                "Failed to remove workspace"
            ),
        }
    }
}
