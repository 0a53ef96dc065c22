use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

/// Where uploaded images and result blobs live. Handlers only see
/// returned path strings; the store owns the directory layout.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store one uploaded image under the analysis directory and
    /// return the path that was written.
    async fn save_image(
        &self,
        analysis_id: &str,
        file_name: &str,
        body: Bytes,
    ) -> anyhow::Result<String>;

    /// Persist the result blob for an analysis and return its path.
    async fn save_result(
        &self,
        analysis_id: &str,
        result: &serde_json::Value,
    ) -> anyhow::Result<String>;

    async fn load_result(&self, path: &str) -> anyhow::Result<serde_json::Value>;

    /// Remove every artifact belonging to an analysis: the image
    /// directory and the result file. Missing pieces are not an error.
    async fn remove_artifacts(&self, analysis_id: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct DiskStore {
    images_dir: PathBuf,
    results_dir: PathBuf,
}

impl DiskStore {
    pub fn new(images_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            results_dir: results_dir.into(),
        }
    }

    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.images_dir)
            .await
            .context("create images dir")?;
        tokio::fs::create_dir_all(&self.results_dir)
            .await
            .context("create results dir")?;
        Ok(())
    }

    fn analysis_dir(&self, analysis_id: &str) -> PathBuf {
        self.images_dir.join(analysis_id)
    }

    fn result_path(&self, analysis_id: &str) -> PathBuf {
        self.results_dir.join(format!("{analysis_id}.json"))
    }
}

#[async_trait]
impl ArtifactStore for DiskStore {
    async fn save_image(
        &self,
        analysis_id: &str,
        file_name: &str,
        body: Bytes,
    ) -> anyhow::Result<String> {
        let dir = self.analysis_dir(analysis_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create dir {}", dir.display()))?;
        let dest = dir.join(file_name);
        tokio::fs::write(&dest, &body)
            .await
            .with_context(|| format!("write image {}", dest.display()))?;
        Ok(dest.to_string_lossy().into_owned())
    }

    async fn save_result(
        &self,
        analysis_id: &str,
        result: &serde_json::Value,
    ) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.results_dir)
            .await
            .context("create results dir")?;
        let dest = self.result_path(analysis_id);
        let body = serde_json::to_vec_pretty(result).context("serialize result")?;
        tokio::fs::write(&dest, body)
            .await
            .with_context(|| format!("write result {}", dest.display()))?;
        Ok(dest.to_string_lossy().into_owned())
    }

    async fn load_result(&self, path: &str) -> anyhow::Result<serde_json::Value> {
        let raw = tokio::fs::read(Path::new(path))
            .await
            .with_context(|| format!("read result {path}"))?;
        serde_json::from_slice(&raw).with_context(|| format!("parse result {path}"))
    }

    async fn remove_artifacts(&self, analysis_id: &str) -> anyhow::Result<()> {
        let dir = self.analysis_dir(analysis_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove dir {}", dir.display())),
        }
        let result = self.result_path(analysis_id);
        match tokio::fs::remove_file(&result).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove file {}", result.display())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn temp_store() -> (DiskStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("wristsight-test-{}", Uuid::new_v4()));
        let store = DiskStore::new(root.join("images"), root.join("results"));
        (store, root)
    }

    #[tokio::test]
    async fn save_load_and_remove_roundtrip() {
        let (store, root) = temp_store();

        let img_path = store
            .save_image("a1", "ap.jpg", Bytes::from_static(b"fake image"))
            .await
            .unwrap();
        assert!(Path::new(&img_path).exists());

        let result_path = store
            .save_result("a1", &json!({"summary": "ok"}))
            .await
            .unwrap();
        let loaded = store.load_result(&result_path).await.unwrap();
        assert_eq!(loaded["summary"], "ok");

        store.remove_artifacts("a1").await.unwrap();
        assert!(!Path::new(&img_path).exists());
        assert!(!Path::new(&result_path).exists());

        tokio::fs::remove_dir_all(root).await.ok();
    }

    #[tokio::test]
    async fn remove_is_idempotent_for_missing_artifacts() {
        let (store, root) = temp_store();
        store.remove_artifacts("never-created").await.unwrap();
        tokio::fs::remove_dir_all(root).await.ok();
    }
}
