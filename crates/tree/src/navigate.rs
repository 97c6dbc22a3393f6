use locview_protocol::{CategoryNode, EntryNode, TreeNode};

/// Borrowed view of a node reached by an id path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Category(&'a CategoryNode),
    Entry(&'a EntryNode),
}

/// Ids of the entries around the selected one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbours {
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Resolve `path` against a forest.
///
/// A path is `[category_id]`, `[category_id, entry_id]` or, for flat lists,
/// `[entry_id]`. Entry ids are only unique within their category, so the
/// category segment is required whenever the forest is grouped.
pub fn find<'a, S: AsRef<str>>(forest: &'a [TreeNode], path: &[S]) -> Option<NodeRef<'a>> {
    let (head, rest) = path.split_first()?;
    let node = forest.iter().find(|node| node.id() == head.as_ref())?;

    match (node, rest) {
        (TreeNode::Category(category), []) => Some(NodeRef::Category(category)),
        (TreeNode::Category(category), [entry_id]) => category
            .children
            .iter()
            .find(|entry| entry.id == entry_id.as_ref())
            .map(NodeRef::Entry),
        (TreeNode::Entry(entry), []) => Some(NodeRef::Entry(entry)),
        _ => None,
    }
}

/// Prev/next of the entry at `path`; `None` if the path does not reach an entry.
pub fn neighbours<S: AsRef<str>>(forest: &[TreeNode], path: &[S]) -> Option<Neighbours> {
    match find(forest, path)? {
        NodeRef::Entry(entry) => Some(Neighbours {
            prev: entry.prev.clone(),
            next: entry.next.clone(),
        }),
        NodeRef::Category(_) => None,
    }
}

/// Split a `/`-joined entry path against the forest.
///
/// Category ids may themselves contain `/`, so a category matches when its id
/// is a prefix of `raw` followed by `/` and the rest names one of its entries.
/// The longest matching category id wins.
pub fn parse_path(forest: &[TreeNode], raw: &str) -> Option<Vec<String>> {
    forest
        .iter()
        .filter_map(|node| match node {
            TreeNode::Entry(entry) => (entry.id == raw).then(|| vec![entry.id.clone()]),
            TreeNode::Category(category) => {
                let entry_id = raw.strip_prefix(category.id.as_str())?.strip_prefix('/')?;
                category
                    .children
                    .iter()
                    .any(|entry| entry.id == entry_id)
                    .then(|| vec![category.id.clone(), entry_id.to_string()])
            }
        })
        .max_by_key(|path| path[0].len())
}

/// Path of the first entry in the forest, skipping empty categories.
pub fn first_entry(forest: &[TreeNode]) -> Option<Vec<String>> {
    forest.iter().find_map(|node| match node {
        TreeNode::Category(category) => category
            .children
            .first()
            .map(|entry| vec![category.id.clone(), entry.id.clone()]),
        TreeNode::Entry(entry) => Some(vec![entry.id.clone()]),
    })
}

/// Path of the next (`forward`) or previous sibling, keeping the category prefix.
pub fn step<S: AsRef<str>>(forest: &[TreeNode], path: &[S], forward: bool) -> Option<Vec<String>> {
    let around = neighbours(forest, path)?;
    let target = if forward { around.next } else { around.prev }?;

    let mut next_path: Vec<String> = path[..path.len() - 1]
        .iter()
        .map(|segment| segment.as_ref().to_string())
        .collect();
    next_path.push(target);
    Some(next_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{EntryChain, TreeBuilder};
    use locview_protocol::TextSlot;
    use pretty_assertions::assert_eq;

    fn entry(id: &str) -> EntryNode {
        EntryNode::new(id, id, vec![TextSlot::multiline(id)])
    }

    fn grouped() -> Vec<TreeNode> {
        let mut builder = TreeBuilder::new();
        builder.push("16", str::to_string, entry("1"));
        builder.push("16", str::to_string, entry("2"));
        builder.push("17", str::to_string, entry("1"));
        builder.finish()
    }

    #[test]
    fn finds_entries_by_category_path() {
        let forest = grouped();
        match find(&forest, &["17", "1"]) {
            Some(NodeRef::Entry(entry)) => assert_eq!(entry.next, None),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(find(&forest, &["16"]), Some(NodeRef::Category(_))));
        assert!(find(&forest, &["16", "9"]).is_none());
        assert!(find::<&str>(&forest, &[]).is_none());
    }

    #[test]
    fn steps_forward_and_back() {
        let forest = grouped();
        assert_eq!(
            step(&forest, &["16", "1"], true),
            Some(vec!["16".to_string(), "2".to_string()])
        );
        assert_eq!(
            step(&forest, &["16", "2"], false),
            Some(vec!["16".to_string(), "1".to_string()])
        );
        assert_eq!(step(&forest, &["16", "2"], true), None);
        assert_eq!(neighbours(&forest, &["16"]), None);
        assert_eq!(
            first_entry(&forest),
            Some(vec!["16".to_string(), "1".to_string()])
        );
        assert_eq!(first_entry(&[]), None);
    }

    #[test]
    fn parses_paths_whose_ids_contain_slashes() {
        let mut builder = TreeBuilder::new();
        builder.push("ui/title", str::to_string, entry("ui/title1"));
        builder.push("ui/title", str::to_string, entry("ui/title2"));
        builder.push("a", str::to_string, entry("b/c"));
        builder.push("a/b", str::to_string, entry("c"));
        let forest = builder.finish();

        assert_eq!(
            parse_path(&forest, "ui/title/ui/title2"),
            Some(vec!["ui/title".to_string(), "ui/title2".to_string()])
        );
        assert_eq!(
            parse_path(&forest, "a/b/c"),
            Some(vec!["a/b".to_string(), "c".to_string()])
        );
        assert_eq!(parse_path(&forest, "ui/title"), None);
        assert_eq!(parse_path(&forest, "ui/title/missing"), None);
    }

    #[test]
    fn flat_paths_have_one_segment() {
        let mut chain = EntryChain::new();
        chain.push(entry("a"));
        chain.push(entry("b"));
        let forest = chain.finish();

        assert_eq!(step(&forest, &["a"], true), Some(vec!["b".to_string()]));
        assert!(find(&forest, &["a", "b"]).is_none());
        assert_eq!(parse_path(&forest, "b"), Some(vec!["b".to_string()]));
    }
}
