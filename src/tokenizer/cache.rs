//! Token count cache
//!
//! Counting tokens is expensive (a network call for some providers),
//! so counts are cached on disk keyed by content hash and model.
//! Entries expire after a week.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::tokenizer::error::{TokenizerError, TokenizerResult};

/// Maximum age of a cache entry, in seconds
const MAX_ENTRY_AGE: u64 = 7 * 24 * 60 * 60;

/// A cached token count
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// Token count
    tokens: usize,
    /// Unix timestamp when the entry was created
    timestamp: u64,
}

/// Statistics for token cache
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

/// On-disk cache of token counts for one project directory
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenCache {
    /// Cached counts keyed by content hash and model id
    entries: BTreeMap<String, CacheEntry>,

    #[serde(skip)]
    cache_file: PathBuf,

    #[serde(skip)]
    hits: usize,

    #[serde(skip)]
    misses: usize,
}

impl TokenCache {
    /// Open the cache for a project directory, loading and pruning any
    /// persisted entries.
    pub fn open(project_dir: &str) -> TokenizerResult<Self> {
        let cache_file = cache_file_path(project_dir)?;
        let mut cache = Self::with_file(cache_file);

        if cache.cache_file.exists() {
            let content = fs::read_to_string(&cache.cache_file)?;
            match serde_json::from_str::<TokenCache>(&content) {
                Ok(loaded) => cache.entries = loaded.entries,
                Err(err) => {
                    log::warn!(
                        "discarding unreadable token cache {}: {}",
                        cache.cache_file.display(),
                        err
                    );
                }
            }
            cache.prune()?;
        }

        Ok(cache)
    }

    fn with_file(cache_file: PathBuf) -> Self {
        Self {
            entries: BTreeMap::new(),
            cache_file,
            hits: 0,
            misses: 0,
        }
    }

    /// Get token count from cache if available
    pub fn get(&mut self, content: &str, model_id: &str) -> Option<usize> {
        let result = self
            .entries
            .get(&cache_key(content, model_id))
            .map(|entry| entry.tokens);

        if result.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }

        result
    }

    /// Insert a token count and persist the cache
    pub fn insert(&mut self, content: &str, model_id: &str, tokens: usize) -> TokenizerResult<()> {
        self.entries.insert(
            cache_key(content, model_id),
            CacheEntry {
                tokens,
                timestamp: unix_now(),
            },
        );
        self.save()
    }

    /// Get cache statistics for this session
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Drop entries older than a week, persisting if any were removed
    fn prune(&mut self) -> TokenizerResult<()> {
        let now = unix_now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_sub(entry.timestamp) < MAX_ENTRY_AGE);

        if self.entries.len() < before {
            self.save()?;
        }
        Ok(())
    }

    /// Save cache to disk
    fn save(&self) -> TokenizerResult<()> {
        let content = serde_json::to_string(self)?;

        if let Some(parent) = self.cache_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.cache_file, content)?;

        Ok(())
    }
}

/// Cache key for a content/model pair
fn cache_key(content: &str, model_id: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}:{}", hasher.finish(), model_id)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Path of the cache file for a project directory
fn cache_file_path(project_dir: &str) -> TokenizerResult<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| TokenizerError::Cache("Could not determine cache directory".to_string()))?
        .join("promptpack");

    let canonical_path = fs::canonicalize(project_dir)
        .map_err(|e| TokenizerError::Cache(format!("Invalid project directory: {}", e)))?;

    // Flatten the project path into a file name.
    let path_str = canonical_path.to_string_lossy().to_string();
    let sanitized_path = path_str.replace(
        |c: char| !c.is_alphanumeric() && c != '_' && c != '-' && c != '.',
        "_",
    );

    Ok(cache_dir.join(format!("{}.token_cache.json", sanitized_path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_records_hits_and_misses() {
        let dir = TempDir::new().unwrap();
        let mut cache = TokenCache::with_file(dir.path().join("cache.json"));

        assert_eq!(cache.get("hello", "gpt-4"), None);
        cache.insert("hello", "gpt-4", 3).unwrap();
        assert_eq!(cache.get("hello", "gpt-4"), Some(3));
        // Same content under another model is a separate entry.
        assert_eq!(cache.get("hello", "gpt-4o"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_insert_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cache.json");

        let mut cache = TokenCache::with_file(file.clone());
        cache.insert("fn main() {}", "gpt-4", 5).unwrap();

        let content = fs::read_to_string(&file).unwrap();
        let mut reloaded: TokenCache = serde_json::from_str(&content).unwrap();
        reloaded.cache_file = file;
        assert_eq!(reloaded.get("fn main() {}", "gpt-4"), Some(5));
    }

    #[test]
    fn test_prune_drops_stale_entries() {
        let dir = TempDir::new().unwrap();
        let mut cache = TokenCache::with_file(dir.path().join("cache.json"));

        cache.entries.insert(
            cache_key("old", "gpt-4"),
            CacheEntry {
                tokens: 9,
                timestamp: unix_now() - MAX_ENTRY_AGE - 1,
            },
        );
        cache.entries.insert(
            cache_key("fresh", "gpt-4"),
            CacheEntry {
                tokens: 2,
                timestamp: unix_now(),
            },
        );

        cache.prune().unwrap();

        assert_eq!(cache.get("old", "gpt-4"), None);
        assert_eq!(cache.get("fresh", "gpt-4"), Some(2));
    }
}
