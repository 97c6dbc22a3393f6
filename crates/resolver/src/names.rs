use crate::collaborator::QueryService;
use crate::layout::{path_string, StoreLayout};
use locview_protocol::QueryRequest;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A `text_data` category holding display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameCategory(pub u32);

impl NameCategory {
    pub const CHARACTER: Self = Self(6);
    pub const SONG: Self = Self(16);
    pub const STORY: Self = Self(181);
}

impl fmt::Display for NameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index (as text) to label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    labels: HashMap<String, String>,
}

impl NameTable {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Lookup by numeric value, so `"0042"` finds the label stored under `42`.
    pub fn get_number(&self, key: &str) -> Option<&str> {
        let number: u64 = key.trim().parse().ok()?;
        self.get(&number.to_string())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(String, String)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

/// Session-owned memo of name tables, one per category.
///
/// Only successful loads are stored. Entries are never evicted; the cache
/// lives as long as the session that owns it.
#[derive(Debug, Default)]
pub struct NameLookupCache {
    tables: RwLock<HashMap<NameCategory, Arc<NameTable>>>,
}

impl NameLookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, category: NameCategory) -> Option<Arc<NameTable>> {
        self.tables.read().await.get(&category).cloned()
    }

    pub async fn insert(&self, category: NameCategory, table: Arc<NameTable>) {
        self.tables.write().await.insert(category, table);
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.is_empty()
    }
}

/// Resolves display labels from the master text table.
///
/// Failures degrade to an empty table: labels are cosmetic and callers fall
/// back to raw keys.
#[derive(Clone)]
pub struct NameResolver {
    query: Arc<dyn QueryService>,
    layout: StoreLayout,
    cache: Arc<NameLookupCache>,
}

impl NameResolver {
    pub fn new(
        query: Arc<dyn QueryService>,
        layout: StoreLayout,
        cache: Arc<NameLookupCache>,
    ) -> Self {
        Self {
            query,
            layout,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<NameLookupCache> {
        &self.cache
    }

    pub async fn resolve_category_names(&self, category: NameCategory) -> Arc<NameTable> {
        if let Some(table) = self.cache.get(category).await {
            return table;
        }

        // Two concurrent first loads may both query; the second insert
        // replaces an identical table.
        match self.load(category).await {
            Ok(table) => {
                let table = Arc::new(table);
                log::debug!("Loaded {} names for category {category}", table.len());
                self.cache.insert(category, table.clone()).await;
                table
            }
            Err(err) => {
                log::warn!("Failed to load names for category {category}: {err}");
                Arc::new(NameTable::default())
            }
        }
    }

    async fn load(&self, category: NameCategory) -> crate::Result<NameTable> {
        let request = QueryRequest {
            store_path: path_string(&self.layout.master_path()),
            query: format!(
                "SELECT \"index\", \"text\" FROM text_data WHERE category = {}",
                category.0
            ),
            key: String::new(),
        };
        let result = self.query.query(&request).await?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| match row.as_slice() {
                [index, text, ..] => Some((index.to_string(), text.to_string())),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_lookup_ignores_leading_zeros() {
        let table: NameTable = [("42".to_string(), "Answer".to_string())]
            .into_iter()
            .collect();
        assert_eq!(table.get_number("0042"), Some("Answer"));
        assert_eq!(table.get("0042"), None);
        assert_eq!(table.get_number("unknown"), None);
    }
}
