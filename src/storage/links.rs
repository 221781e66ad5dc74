use crate::models::CommunityLink;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk shape of the link cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCacheFile {
    pub extracted_at: DateTime<Utc>,
    pub total_links: usize,
    pub links: Vec<CommunityLink>,
}

/// Older caches were written as a bare array of links
#[derive(Deserialize)]
#[serde(untagged)]
enum CachedLinks {
    Wrapped(LinkCacheFile),
    Bare(Vec<CommunityLink>),
}

/// Discovered community links, saved once so later runs skip discovery
pub struct LinkCache {
    path: PathBuf,
}

impl LinkCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Vec<CommunityLink>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read link cache {}", self.path.display()))?;
        let cached: CachedLinks = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse link cache {}", self.path.display()))?;

        Ok(match cached {
            CachedLinks::Wrapped(file) => file.links,
            CachedLinks::Bare(links) => links,
        })
    }

    pub fn save(&self, links: &[CommunityLink]) -> Result<()> {
        let file = LinkCacheFile {
            extracted_at: Utc::now(),
            total_links: links.len(),
            links: links.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write link cache {}", self.path.display()))?;

        info!("💾 Saved {} links to {}", links.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn links() -> Vec<CommunityLink> {
        vec![
            CommunityLink {
                origin_region: "Texas".to_string(),
                name: "The Bowie".to_string(),
                source_url: "https://www.greystar.com/the-bowie".to_string(),
            },
            CommunityLink {
                origin_region: "Florida".to_string(),
                name: "Ellis, Tampa".to_string(),
                source_url: "https://www.greystar.com/ellis".to_string(),
            },
        ]
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let cache = LinkCache::new(temp_dir.path().join("links.json"));
        assert!(!cache.exists());

        cache.save(&links()).unwrap();
        assert!(cache.exists());
        assert_eq!(cache.load().unwrap(), links());

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(json["totalLinks"], 2);
        assert!(json["extractedAt"].is_string());
        assert_eq!(json["links"][0]["communityName"], "The Bowie");
    }

    #[test]
    fn test_load_bare_array() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("links.json");
        std::fs::write(
            &path,
            r#"[{"state":"Texas","communityName":"The Bowie","communityUrl":"https://www.greystar.com/the-bowie"}]"#,
        )
        .unwrap();

        let loaded = LinkCache::new(&path).load().unwrap();
        assert_eq!(loaded, links()[..1].to_vec());
    }

    #[test]
    fn test_load_garbage_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("links.json");
        std::fs::write(&path, "<html>").unwrap();

        assert!(LinkCache::new(&path).load().is_err());
    }
}
