use crate::collaborator::QueryService;
use crate::error::{ResolveError, Result};
use crate::layout::{path_string, StoreLayout};
use crate::sql::{quote_literal, LikePattern};
use locview_protocol::{QueryRequest, QueryResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A manifest hit: content hash plus the canonical asset name.
///
/// Built fresh for every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReference {
    pub logical_name: String,
    pub hash: String,
    pub name: String,
}

impl AssetReference {
    pub fn new(
        logical_name: impl Into<String>,
        hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let hash = hash.into();
        if hash.chars().nth(1).is_none() {
            return Err(ResolveError::malformed(format!(
                "content hash '{hash}' is shorter than its shard prefix"
            )));
        }
        Ok(Self {
            logical_name: logical_name.into(),
            hash,
            name: name.into(),
        })
    }

    /// First two characters of the hash.
    pub fn shard_prefix(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(2)
            .map_or(self.hash.len(), |(idx, _)| idx);
        &self.hash[..end]
    }

    /// `{prefix}/{hash}`.
    pub fn shard_path(&self) -> String {
        format!("{}/{}", self.shard_prefix(), self.hash)
    }

    pub fn storage_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.shard_prefix()).join(&self.hash)
    }
}

/// How a manifest row is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestFilter {
    Exact(String),
    Matching(LikePattern),
}

impl ManifestFilter {
    fn where_clause(&self) -> String {
        match self {
            Self::Exact(name) => format!("n = {}", quote_literal(name)),
            Self::Matching(pattern) => format!("n {}", pattern.to_sql()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Exact(name) => name.clone(),
            Self::Matching(pattern) => pattern.to_string(),
        }
    }
}

/// Resolves logical asset names through the manifest (`a` table: `h`, `n`).
#[derive(Clone)]
pub struct AssetLocator {
    query: Arc<dyn QueryService>,
    layout: StoreLayout,
}

impl AssetLocator {
    pub fn new(query: Arc<dyn QueryService>, layout: StoreLayout) -> Self {
        Self { query, layout }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Exact-name lookup.
    pub async fn locate(&self, logical_name: &str) -> Result<AssetReference> {
        self.locate_by(&ManifestFilter::Exact(logical_name.to_string()))
            .await
    }

    /// Pattern lookup. The first row the collaborator returns wins.
    pub async fn locate_matching(&self, pattern: &LikePattern) -> Result<AssetReference> {
        self.locate_by(&ManifestFilter::Matching(pattern.clone()))
            .await
    }

    pub async fn locate_by(&self, filter: &ManifestFilter) -> Result<AssetReference> {
        let sql = format!(
            "SELECT h, n FROM a WHERE {} LIMIT 1",
            filter.where_clause()
        );
        let result = self.run(sql).await?;
        if result.rows.len() > 1 {
            log::debug!(
                "Manifest filter {} matched {} rows, taking the first",
                filter.describe(),
                result.rows.len()
            );
        }

        let row = result
            .rows
            .first()
            .ok_or_else(|| ResolveError::not_found(format!("asset {}", filter.describe())))?;
        let (hash, name) = match row.as_slice() {
            [hash, name, ..] => (hash.to_string(), name.to_string()),
            _ => {
                return Err(ResolveError::malformed(format!(
                    "manifest row has {} columns, expected h and n",
                    row.len()
                )))
            }
        };

        let asset = AssetReference::new(filter.describe(), hash, name)?;
        log::debug!("Located {} at {}", asset.name, asset.shard_path());
        Ok(asset)
    }

    /// Every manifest name matching `pattern`, in collaborator order.
    pub async fn list_names(&self, pattern: &LikePattern) -> Result<Vec<String>> {
        let sql = format!("SELECT n FROM a WHERE n {}", pattern.to_sql());
        Ok(self.run(sql).await?.first_column())
    }

    /// Absolute location of an asset's shard file.
    pub fn storage_path(&self, asset: &AssetReference) -> PathBuf {
        asset.storage_path(&self.layout.data_dir())
    }

    async fn run(&self, sql: String) -> Result<QueryResult> {
        let request = QueryRequest {
            store_path: path_string(&self.layout.meta_path()),
            query: sql,
            key: self.layout.meta_key().to_string(),
        };
        self.query.query(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_path_uses_two_character_prefix() {
        let asset = AssetReference::new("x", "abcd1234ef", "story/x").unwrap();
        assert_eq!(asset.shard_prefix(), "ab");
        assert_eq!(asset.shard_path(), "ab/abcd1234ef");
        assert_eq!(
            asset.storage_path(Path::new("/g/dat")),
            PathBuf::from("/g/dat/ab/abcd1234ef")
        );
    }

    #[test]
    fn short_hash_is_malformed() {
        let err = AssetReference::new("x", "a", "x").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedInput(_)));
    }

    #[test]
    fn exact_filter_quotes_name() {
        let filter = ManifestFilter::Exact("it's".to_string());
        assert_eq!(filter.where_clause(), "n = 'it''s'");
    }
}
