use locview_protocol::{EntryNode, Record, Scalar, TextSlot, TreeNode};
use locview_tree::{build_flat, build_grouped, cell_text, RecordLayout, TreeError};
use pretty_assertions::assert_eq;

/// (category, index, text) rows, as in the master text table.
struct TextRows;

impl RecordLayout<Record> for TextRows {
    fn group_key(&self, record: &Record, index: usize) -> locview_tree::Result<String> {
        cell_text(record, index, 0)
    }

    fn entry(&self, record: &Record, index: usize) -> locview_tree::Result<EntryNode> {
        let id = cell_text(record, index, 1)?;
        let text = cell_text(record, index, 2)?;
        Ok(EntryNode::new(id, text.clone(), vec![TextSlot::multiline(text)]))
    }
}

fn row(category: i64, index: i64, text: &str) -> Record {
    vec![Scalar::Int(category), Scalar::Int(index), Scalar::from(text)]
}

fn categories(forest: &[TreeNode]) -> Vec<(&str, Vec<&str>)> {
    forest
        .iter()
        .map(|node| {
            let category = node.as_category().expect("grouped output");
            let ids = category.children.iter().map(|e| e.id.as_str()).collect();
            (category.id.as_str(), ids)
        })
        .collect()
}

fn assert_chain(children: &[EntryNode]) {
    let heads: Vec<_> = children.iter().filter(|e| e.prev.is_none()).collect();
    let tails: Vec<_> = children.iter().filter(|e| e.next.is_none()).collect();
    assert_eq!(heads.len(), 1, "exactly one head");
    assert_eq!(tails.len(), 1, "exactly one tail");

    let mut visited = vec![heads[0].id.clone()];
    let mut cursor = heads[0];
    while let Some(next) = &cursor.next {
        cursor = children
            .iter()
            .find(|e| &e.id == next && e.prev.as_deref() == Some(cursor.id.as_str()))
            .expect("next points at a sibling that points back");
        visited.push(cursor.id.clone());
        assert!(visited.len() <= children.len(), "cycle in next chain");
    }
    let expected: Vec<_> = children.iter().map(|e| e.id.clone()).collect();
    assert_eq!(visited, expected);
}

#[test]
fn three_text_rows_make_two_linked_categories() {
    let rows = vec![row(16, 1, "Song A"), row(16, 2, "Song B"), row(17, 1, "Other")];
    let forest = build_grouped(rows, &TextRows).unwrap();

    assert_eq!(categories(&forest), vec![("16", vec!["1", "2"]), ("17", vec!["1"])]);

    let songs = &forest[0].as_category().unwrap().children;
    assert_eq!(songs[0].next.as_deref(), Some("2"));
    assert_eq!(songs[1].prev.as_deref(), Some("1"));
    assert_eq!(songs[0].name, "Song A");

    let other = &forest[1].as_category().unwrap().children[0];
    assert_eq!((other.prev.as_deref(), other.next.as_deref()), (None, None));
}

#[test]
fn rebuilding_is_deterministic() {
    let rows: Vec<Record> = (0..200)
        .map(|i| row(i % 7, i, &format!("text {i}")))
        .collect();

    let first = build_grouped(rows.clone(), &TextRows).unwrap();
    let second = build_grouped(rows, &TextRows).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn every_category_forms_one_chain_in_input_order() {
    let rows: Vec<Record> = [3, 1, 3, 2, 1, 3, 3, 2]
        .iter()
        .enumerate()
        .map(|(i, &category)| row(category, i as i64, "t"))
        .collect();
    let forest = build_grouped(rows, &TextRows).unwrap();

    assert_eq!(
        categories(&forest),
        vec![
            ("3", vec!["0", "2", "5", "6"]),
            ("1", vec!["1", "4"]),
            ("2", vec!["3", "7"]),
        ]
    );
    for node in &forest {
        assert_chain(&node.as_category().unwrap().children);
    }
}

#[test]
fn input_order_is_kept_not_sorted() {
    // Ordering is the caller's job: descending input stays descending.
    let rows = vec![row(5, 9, "c"), row(5, 3, "b"), row(4, 1, "a")];
    let forest = build_grouped(rows, &TextRows).unwrap();
    assert_eq!(categories(&forest), vec![("5", vec!["9", "3"]), ("4", vec!["1"])]);
}

#[test]
fn same_entry_id_may_repeat_across_categories() {
    let rows = vec![row(1, 1, "a"), row(2, 1, "b")];
    let forest = build_grouped(rows, &TextRows).unwrap();
    assert_eq!(categories(&forest), vec![("1", vec!["1"]), ("2", vec!["1"])]);
}

#[test]
fn flat_build_links_without_categories() {
    let rows = vec![row(0, 11, "x"), row(0, 12, "y"), row(9, 13, "z")];
    let forest = build_flat(rows, &TextRows).unwrap();

    assert!(forest.iter().all(|node| node.as_entry().is_some()));
    let entries: Vec<EntryNode> = forest
        .into_iter()
        .filter_map(|node| match node {
            TreeNode::Entry(entry) => Some(entry),
            TreeNode::Category(_) => None,
        })
        .collect();
    assert_chain(&entries);
}

#[test]
fn short_record_is_an_error_and_no_tree_is_returned() {
    let rows = vec![row(1, 1, "ok"), vec![Scalar::Int(1)]];
    let err = build_grouped(rows, &TextRows).unwrap_err();
    assert!(matches!(
        err,
        TreeError::MissingColumn {
            record: 1,
            column: 1,
            arity: 1
        }
    ));
}
