use super::report;
use crate::loading::LoadKind;
use crate::session::Session;
use anyhow::{Context, Result};
use locview_protocol::{EntryNode, TextSlot, TreeNode};
use locview_resolver::ResolveError;
use locview_tree::{dictionary_category, TreeBuilder};
use serde_json::Value;
use std::path::Path;

/// Group a `localize_dump.json` document by key prefix.
///
/// Keys are visited in document order. The whole document is rejected when it
/// is not an object of strings.
pub fn dictionary_tree(raw: &str) -> Result<Vec<TreeNode>, ResolveError> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|err| ResolveError::malformed(format!("localize dict is not JSON: {err}")))?;
    let Value::Object(entries) = document else {
        return Err(ResolveError::malformed("localize dict is not a JSON object"));
    };

    let mut builder = TreeBuilder::new();
    for (key, value) in entries {
        let Value::String(text) = value else {
            return Err(ResolveError::malformed(format!(
                "localize dict value for '{key}' is not a string"
            )));
        };
        let category = dictionary_category(&key).to_string();
        let entry = EntryNode::new(key.clone(), key, vec![TextSlot::multiline(text)]);
        builder.push(&category, str::to_string, entry);
    }
    Ok(builder.finish())
}

impl Session {
    /// Load the localization dictionary, from `path` or the configured
    /// translation directory.
    pub async fn load_localize_dict(&self, path: Option<&Path>) -> Result<Vec<TreeNode>> {
        let _loading = self.begin(LoadKind::Dictionary);
        report("load localize dict", self.load_localize_dict_inner(path).await)
    }

    async fn load_localize_dict_inner(&self, path: Option<&Path>) -> Result<Vec<TreeNode>> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => self.config.dictionary_path()?,
        };
        log::info!("Loading dict from {}", path.display());

        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        Ok(dictionary_tree(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layout(forest: &[TreeNode]) -> Vec<(String, Vec<String>)> {
        forest
            .iter()
            .map(|node| {
                let category = node.as_category().unwrap();
                let ids = category.children.iter().map(|e| e.id.clone()).collect();
                (category.id.clone(), ids)
            })
            .collect()
    }

    #[test]
    fn groups_keys_by_leading_letters_in_document_order() {
        let raw = r#"{"foo123": "a", "123": "b", "AB12CD": "c", "foo9": "d", "7x": "e"}"#;
        let forest = dictionary_tree(raw).unwrap();

        assert_eq!(
            layout(&forest),
            vec![
                ("foo".to_string(), vec!["foo123".to_string(), "foo9".to_string()]),
                ("Misc".to_string(), vec!["123".to_string(), "7x".to_string()]),
                ("AB".to_string(), vec!["AB12CD".to_string()]),
            ]
        );

        let foo = &forest[0].as_category().unwrap().children;
        assert_eq!(foo[0].next.as_deref(), Some("foo9"));
        assert_eq!(foo[1].prev.as_deref(), Some("foo123"));
        assert_eq!(foo[1].content[0].content, "d");
    }

    #[test]
    fn malformed_documents_are_rejected() {
        for raw in ["{not json", "[1, 2]", r#"{"a1": 5}"#] {
            let err = dictionary_tree(raw).unwrap_err();
            assert!(matches!(err, ResolveError::MalformedInput(_)), "{raw}: {err}");
        }
    }
}
