use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use super::StoreError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file. Mutations are applied to a copy,
/// written to disk, and only then published, so a failed write leaves the
/// in-memory map untouched.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::Backend(format!("corrupt store file {}: {e}", file_path.display()))
            })?,
            Err(_) => {
                let empty: HashMap<K, V> = HashMap::new();
                write_file(&file_path, &empty).await?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    /// Read a value by key through a projection, avoiding a full clone.
    pub async fn read<F, R>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        let map = self.inner.read().await;
        map.get(key).map(f)
    }

    /// Apply a mutation and persist; the write lock is held until the file is written.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<R, StoreError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let out = f(&mut next)?;
        write_file(&self.file_path, &next).await?;
        *map = next;
        Ok(out)
    }
}

async fn write_file<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<(), StoreError> {
    let data = serde_json::to_vec(value).map_err(|e| StoreError::Backend(e.to_string()))?;
    fs::write(path, data)
        .await
        .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        assert!(store.read(&"a".into(), |_| ()).await.is_none());

        store
            .update_map(|m| {
                m.insert("a".into(), "1".into());
                m.insert("b".into(), "2".into());
                Ok(())
            })
            .await?;
        assert_eq!(store.read(&"a".into(), |v| v.clone()).await.as_deref(), Some("1"));

        let existed = store.update_map(|m| Ok(m.remove("b").is_some())).await?;
        assert!(existed);

        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.read(&"a".into(), |v| v.clone()).await.as_deref(), Some("1"));
        assert!(reloaded.read(&"b".into(), |_| ()).await.is_none());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_is_not_published() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        let res = store
            .update_map(|m| {
                m.insert("x".into(), "1".into());
                Err::<(), _>(StoreError::InvalidDocument("rejected".into()))
            })
            .await;
        assert!(res.is_err());
        assert!(store.read(&"x".into(), |_| ()).await.is_none());
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
