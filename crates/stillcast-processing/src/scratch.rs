use std::path::{Path, PathBuf};
use stillcast_core::constants::SCRATCH_DIR_PREFIX;
use stillcast_core::{AppError, BlobName};
use tempfile::TempDir;

/// Per-request working directory.
///
/// Inputs land under `in/` and the encoder writes under `out/`, so an output
/// name that equals an input name never clobbers the input. The whole tree is
/// removed when the value is dropped, whatever path the request took.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a fresh, uniquely named directory under `root`.
    pub async fn create(root: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(root).await.map_err(|e| AppError::InternalWithSource {
            message: format!("Failed to create scratch root {}", root.display()),
            source: e.into(),
        })?;

        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir_in(root)
            .map_err(|e| AppError::InternalWithSource {
                message: "Failed to create scratch directory".to_string(),
                source: e.into(),
            })?;

        for sub in ["in", "out"] {
            tokio::fs::create_dir(dir.path().join(sub)).await?;
        }

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_path(&self, name: &BlobName) -> PathBuf {
        self.dir.path().join("in").join(name.as_str())
    }

    pub fn output_path(&self, name: &BlobName) -> PathBuf {
        self.dir.path().join("out").join(name.as_str())
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(name: &str) -> BlobName {
        BlobName::from_reference(name).unwrap()
    }

    #[tokio::test]
    async fn test_scratch_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchSpace::create(root.path()).await.unwrap();
            tokio::fs::write(scratch.input_path(&blob("cover.png")), b"png")
                .await
                .unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_close_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::create(root.path()).await.unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.join("in").is_dir());
        assert!(path.join("out").is_dir());

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_requests_get_distinct_directories() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchSpace::create(root.path()).await.unwrap();
        let b = ScratchSpace::create(root.path()).await.unwrap();

        let name = blob("cover.png");
        assert_ne!(a.input_path(&name), b.input_path(&name));
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(SCRATCH_DIR_PREFIX));
    }

    #[tokio::test]
    async fn test_output_never_collides_with_input() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::create(root.path()).await.unwrap();
        let name = blob("same.mp4");
        assert_ne!(scratch.input_path(&name), scratch.output_path(&name));
    }

    #[tokio::test]
    async fn test_missing_root_is_created() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        let scratch = ScratchSpace::create(&nested).await.unwrap();
        assert!(scratch.path().starts_with(&nested));
    }
}
