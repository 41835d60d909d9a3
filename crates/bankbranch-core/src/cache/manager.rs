use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::BankRecord;

/// Cache entry holding the full branch list
const BRANCHES_ENTRY: &str = "branches";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cache entry {name}: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Negative ages come from clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self, ttl: Duration) -> bool {
        Utc::now() - self.cached_at > ttl
    }
}

/// JSON file cache rooted at a directory. Each entry is one file.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&cache_dir).map_err(|e| CacheError::io(&cache_dir, e))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>, CacheError> {
        let path = self.cache_path(name);
        if !path.exists() {
            debug!(cache = name, "Cache miss");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| CacheError::io(&path, e))?;

        let cached: CachedData<T> =
            serde_json::from_str(&contents).map_err(|source| CacheError::Malformed {
                name: name.to_string(),
                source,
            })?;

        debug!(cache = name, age = %cached.age_display(), "Cache hit");
        Ok(Some(cached))
    }

    /// Write an entry in full. The new contents land in a sibling temp file
    /// first so a crash never leaves a half-written entry behind.
    fn save<T: Serialize>(&self, name: &str, cached: &CachedData<T>) -> Result<(), CacheError> {
        let path = self.cache_path(name);
        let tmp_path = self.cache_dir.join(format!("{}.json.tmp", name));

        let contents = serde_json::to_string(cached).map_err(|source| CacheError::Malformed {
            name: name.to_string(),
            source,
        })?;
        std::fs::write(&tmp_path, contents).map_err(|e| CacheError::io(&tmp_path, e))?;
        std::fs::rename(&tmp_path, &path).map_err(|e| CacheError::io(&path, e))?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool, CacheError> {
        let path = self.cache_path(name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    // ===== Branches =====

    pub fn load_branches(&self) -> Result<Option<CachedData<Vec<BankRecord>>>, CacheError> {
        self.load(BRANCHES_ENTRY)
    }

    /// Save a freshly fetched branch list, stamped with the current time.
    pub fn save_branches(&self, branches: &[BankRecord]) -> Result<(), CacheError> {
        self.save(BRANCHES_ENTRY, &CachedData::new(branches))
    }

    /// Save the branch list under an existing timestamp. Local edits such as
    /// favourite toggles go through here so the entry keeps the age of the
    /// data it holds.
    pub fn save_branches_at(
        &self,
        branches: &[BankRecord],
        cached_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        self.save(BRANCHES_ENTRY, &CachedData { data: branches, cached_at })
    }

    /// Delete the branch list. Returns whether an entry existed.
    pub fn clear_branches(&self) -> Result<bool, CacheError> {
        self.remove(BRANCHES_ENTRY)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bank::sample;
    use tempfile::TempDir;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_buckets() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Utc::now() - Duration::hours(26);
        assert_eq!(cached.age_display(), "1d ago");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let ttl = Duration::hours(24);
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale(ttl));

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::hours(25);
        assert!(old.is_stale(ttl));
    }

    #[test]
    fn test_missing_entry_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        assert!(cache.load_branches().unwrap().is_none());
    }

    #[test]
    fn test_branches_round_trip_keeps_favourites() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

        let mut branches = vec![sample("A1", "Mumbai"), sample("B2", "Delhi")];
        branches[1].favourite = true;
        cache.save_branches(&branches).unwrap();

        let loaded = cache.load_branches().unwrap().unwrap();
        assert_eq!(loaded.data, branches);
        assert!(!dir.path().join("branches.json.tmp").exists());
    }

    #[test]
    fn test_save_branches_at_keeps_timestamp() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        let three_days_ago = Utc::now() - Duration::days(3);

        cache.save_branches_at(&[sample("A1", "Mumbai")], three_days_ago).unwrap();

        let loaded = cache.load_branches().unwrap().unwrap();
        assert_eq!(loaded.cached_at, three_days_ago);
        assert!(loaded.is_stale(Duration::hours(24)));
    }

    #[test]
    fn test_malformed_entry_is_cache_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("branches.json"), "{not json").unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

        let err = cache.load_branches().unwrap_err();
        assert!(matches!(err, CacheError::Malformed { .. }));
    }

    #[test]
    fn test_clear_branches() {
        let dir = TempDir::new().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();
        assert!(!cache.clear_branches().unwrap());

        cache.save_branches(&[sample("A1", "Mumbai")]).unwrap();
        assert!(cache.clear_branches().unwrap());
        assert!(cache.load_branches().unwrap().is_none());
    }

    #[test]
    fn test_new_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        CacheManager::new(nested.clone()).unwrap();
        assert!(nested.is_dir());
    }
}
