use crate::error::Result;
use locview_protocol::{CategoryNode, EntryNode, TreeNode};
use std::collections::HashMap;

/// Describes how one record becomes a node in a grouped tree.
///
/// `record_index` is the record's position in the input and only feeds error
/// messages.
pub trait RecordLayout<R: ?Sized> {
    /// Key shared by every record of one category.
    fn group_key(&self, record: &R, record_index: usize) -> Result<String>;

    /// Display label of a freshly created category.
    fn category_name(&self, key: &str) -> String {
        key.to_string()
    }

    /// Entry for one record. `prev`/`next` are filled in by the builder.
    fn entry(&self, record: &R, record_index: usize) -> Result<EntryNode>;
}

/// Builds a two-level category/entry forest in a single forward pass.
///
/// Records are consumed in input order and never sorted: the first time a
/// group key is seen its category is appended to the forest, later records of
/// the same key are appended to that category's children.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    categories: Vec<CategoryNode>,
    by_key: HashMap<String, usize>,
    entries: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the category `group_key`, creating it with
    /// `category_name` if this is the first time the key is seen.
    pub fn push(
        &mut self,
        group_key: &str,
        category_name: impl FnOnce(&str) -> String,
        entry: EntryNode,
    ) {
        let slot = match self.by_key.get(group_key) {
            Some(&slot) => slot,
            None => {
                let slot = self.categories.len();
                self.categories.push(CategoryNode {
                    id: group_key.to_string(),
                    name: category_name(group_key),
                    children: Vec::new(),
                });
                self.by_key.insert(group_key.to_string(), slot);
                slot
            }
        };

        link_append(&mut self.categories[slot].children, entry);
        self.entries += 1;
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn finish(self) -> Vec<TreeNode> {
        log::debug!(
            "Built tree: {} categories, {} entries",
            self.categories.len(),
            self.entries
        );
        self.categories.into_iter().map(TreeNode::Category).collect()
    }
}

/// Same linking as [`TreeBuilder`] for single-level sources.
#[derive(Debug, Default)]
pub struct EntryChain {
    entries: Vec<EntryNode>,
}

impl EntryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: EntryNode) {
        link_append(&mut self.entries, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> Vec<TreeNode> {
        log::debug!("Built flat list: {} entries", self.entries.len());
        self.entries.into_iter().map(TreeNode::Entry).collect()
    }
}

fn link_append(children: &mut Vec<EntryNode>, mut entry: EntryNode) {
    entry.next = None;
    entry.prev = match children.last_mut() {
        Some(last) => {
            last.next = Some(entry.id.clone());
            Some(last.id.clone())
        }
        None => None,
    };
    children.push(entry);
}

/// Group `records` into categories using `layout`.
pub fn build_grouped<R, L>(records: impl IntoIterator<Item = R>, layout: &L) -> Result<Vec<TreeNode>>
where
    L: RecordLayout<R>,
{
    let mut builder = TreeBuilder::new();
    for (index, record) in records.into_iter().enumerate() {
        let key = layout.group_key(&record, index)?;
        let entry = layout.entry(&record, index)?;
        builder.push(&key, |key| layout.category_name(key), entry);
    }
    Ok(builder.finish())
}

/// Link `records` as one flat entry list, ignoring the layout's group key.
pub fn build_flat<R, L>(records: impl IntoIterator<Item = R>, layout: &L) -> Result<Vec<TreeNode>>
where
    L: RecordLayout<R>,
{
    let mut chain = EntryChain::new();
    for (index, record) in records.into_iter().enumerate() {
        chain.push(layout.entry(&record, index)?);
    }
    Ok(chain.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use locview_protocol::TextSlot;
    use pretty_assertions::assert_eq;

    fn entry(id: &str) -> EntryNode {
        EntryNode::new(id, id, vec![TextSlot::multiline(id)])
    }

    fn children(node: &TreeNode) -> &[EntryNode] {
        &node.as_category().expect("category").children
    }

    #[test]
    fn links_siblings_within_category() {
        let mut builder = TreeBuilder::new();
        builder.push("a", str::to_string, entry("1"));
        builder.push("b", str::to_string, entry("x"));
        builder.push("a", str::to_string, entry("2"));
        builder.push("a", str::to_string, entry("3"));

        assert_eq!(builder.category_count(), 2);
        assert_eq!(builder.entry_count(), 4);
        let forest = builder.finish();

        let a = children(&forest[0]);
        assert_eq!(a[0].prev, None);
        assert_eq!(a[0].next.as_deref(), Some("2"));
        assert_eq!(a[1].prev.as_deref(), Some("1"));
        assert_eq!(a[1].next.as_deref(), Some("3"));
        assert_eq!(a[2].prev.as_deref(), Some("2"));
        assert_eq!(a[2].next, None);

        let b = children(&forest[1]);
        assert_eq!(b.len(), 1);
        assert_eq!((b[0].prev.clone(), b[0].next.clone()), (None, None));
    }

    #[test]
    fn category_label_is_computed_once() {
        let mut calls = 0;
        let mut builder = TreeBuilder::new();
        for id in ["1", "2"] {
            builder.push(
                "16",
                |key| {
                    calls += 1;
                    format!("{key} Songs")
                },
                entry(id),
            );
        }
        assert_eq!(calls, 1);
        assert_eq!(builder.finish()[0].name(), "16 Songs");
    }

    #[test]
    fn pushed_links_are_overwritten() {
        let mut stale = entry("1");
        stale.prev = Some("bogus".to_string());
        stale.next = Some("bogus".to_string());

        let mut chain = EntryChain::new();
        chain.push(stale);
        let forest = chain.finish();
        let only = forest[0].as_entry().unwrap();
        assert_eq!((only.prev.clone(), only.next.clone()), (None, None));
    }

    #[test]
    fn flat_chain_links_in_order() {
        let mut chain = EntryChain::new();
        for id in ["10", "7", "12"] {
            chain.push(entry(id));
        }
        let forest = chain.finish();
        let ids: Vec<_> = forest.iter().map(TreeNode::id).collect();
        assert_eq!(ids, vec!["10", "7", "12"]);
        assert_eq!(forest[1].as_entry().unwrap().prev.as_deref(), Some("10"));
        assert_eq!(forest[1].as_entry().unwrap().next.as_deref(), Some("12"));
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        assert!(TreeBuilder::new().finish().is_empty());
        assert!(EntryChain::new().is_empty());
    }
}
