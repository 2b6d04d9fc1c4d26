//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::debug;

/// Ensure the parent directory of a data file exists.
pub async fn ensure_parent_dir(file_path: &str) -> anyhow::Result<()> {
    let Some(parent) = Path::new(file_path).parent() else { return Ok(()) };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    debug!(dir = %parent.display(), "data directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parent() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("solutil_env_{}", std::process::id()));
        let file = dir.join("nested").join("mirror.json");
        ensure_parent_dir(&file.to_string_lossy()).await?;
        assert!(tokio::fs::metadata(dir.join("nested")).await.is_ok());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
