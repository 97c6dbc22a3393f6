use super::report;
use crate::loading::LoadKind;
use crate::session::Session;
use anyhow::Result;
use clap::ValueEnum;
use locview_protocol::{EntryNode, QueryRequest, Record, TextSlot, TreeNode};
use locview_resolver::{quote_ident, NameCategory, NameTable};
use locview_tree::{build_flat, build_grouped, cell_text, RecordLayout};
use std::collections::BTreeMap;
use std::fmt;

/// Master database tables the inspector can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum MdbTable {
    TextData,
    CharacterSystemText,
    RaceJikkyoComment,
    RaceJikkyoMessage,
}

impl MdbTable {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextData => "text_data",
            Self::CharacterSystemText => "character_system_text",
            Self::RaceJikkyoComment => "race_jikkyo_comment",
            Self::RaceJikkyoMessage => "race_jikkyo_message",
        }
    }

    /// Selected columns; the last one is always the text.
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::TextData => &["category", "index", "text"],
            Self::CharacterSystemText => &["character_id", "voice_id", "text"],
            Self::RaceJikkyoComment | Self::RaceJikkyoMessage => &["id", "message"],
        }
    }

    /// `SELECT <cols> FROM <table> ORDER BY <all but the text column>`.
    pub fn query(self) -> String {
        let columns = self.columns();
        let select = columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>();
        let order = select[..select.len() - 1].join(",");
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            select.join(","),
            self.as_str(),
            order
        )
    }

    fn needs_character_names(self) -> bool {
        matches!(self, Self::TextData | Self::CharacterSystemText)
    }
}

impl fmt::Display for MdbTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `text_data` categories whose entries are per-character strings.
fn is_character_category(category: &str) -> bool {
    matches!(
        category.parse::<u32>(),
        Ok(7 | 8 | 9 | 144 | 157 | 158 | 162..=169)
    )
}

fn text_entry(id: String, name: String, text: String) -> EntryNode {
    EntryNode::new(id, name, vec![TextSlot::multiline(text)])
}

/// `(category, index, text)`.
struct TextDataLayout<'a> {
    characters: &'a NameTable,
    labels: &'a BTreeMap<String, String>,
}

impl RecordLayout<Record> for TextDataLayout<'_> {
    fn group_key(&self, record: &Record, index: usize) -> locview_tree::Result<String> {
        cell_text(record, index, 0)
    }

    fn category_name(&self, key: &str) -> String {
        match self.labels.get(key) {
            Some(label) => format!("{key} {label}"),
            None => key.to_string(),
        }
    }

    fn entry(&self, record: &Record, index: usize) -> locview_tree::Result<EntryNode> {
        let category = cell_text(record, index, 0)?;
        let id = cell_text(record, index, 1)?;
        let text = cell_text(record, index, 2)?;

        let name = if is_character_category(&category) {
            match self.characters.get(&id) {
                Some(character) => format!("{id} {character}"),
                None => id.clone(),
            }
        } else {
            text.clone()
        };
        Ok(text_entry(id, name, text))
    }
}

/// `(character_id, voice_id, text)`.
struct CharacterTextLayout<'a> {
    characters: &'a NameTable,
}

impl RecordLayout<Record> for CharacterTextLayout<'_> {
    fn group_key(&self, record: &Record, index: usize) -> locview_tree::Result<String> {
        cell_text(record, index, 0)
    }

    fn category_name(&self, key: &str) -> String {
        self.characters.get(key).unwrap_or(key).to_string()
    }

    fn entry(&self, record: &Record, index: usize) -> locview_tree::Result<EntryNode> {
        let voice_id = cell_text(record, index, 1)?;
        let text = cell_text(record, index, 2)?;
        Ok(text_entry(voice_id, text.clone(), text))
    }
}

/// `(id, message)`, not grouped.
struct JikkyoLayout;

impl RecordLayout<Record> for JikkyoLayout {
    fn group_key(&self, record: &Record, index: usize) -> locview_tree::Result<String> {
        cell_text(record, index, 0)
    }

    fn entry(&self, record: &Record, index: usize) -> locview_tree::Result<EntryNode> {
        let id = cell_text(record, index, 0)?;
        let text = cell_text(record, index, 1)?;
        Ok(text_entry(id, text.clone(), text))
    }
}

/// Arrange master table rows (already ordered by the query) into a tree.
pub(crate) fn table_tree(
    table: MdbTable,
    rows: Vec<Record>,
    characters: &NameTable,
    labels: &BTreeMap<String, String>,
) -> locview_tree::Result<Vec<TreeNode>> {
    match table {
        MdbTable::TextData => build_grouped(rows, &TextDataLayout { characters, labels }),
        MdbTable::CharacterSystemText => build_grouped(rows, &CharacterTextLayout { characters }),
        MdbTable::RaceJikkyoComment | MdbTable::RaceJikkyoMessage => build_flat(rows, &JikkyoLayout),
    }
}

impl Session {
    pub async fn load_mdb_table(&self, table: MdbTable) -> Result<Vec<TreeNode>> {
        let _loading = self.begin(LoadKind::MdbTable);
        report(
            &format!("load table {table}"),
            self.load_mdb_table_inner(table).await,
        )
    }

    async fn load_mdb_table_inner(&self, table: MdbTable) -> Result<Vec<TreeNode>> {
        self.require_game()?;
        let request = QueryRequest {
            store_path: self.layout.master_path().to_string_lossy().into_owned(),
            query: table.query(),
            key: String::new(),
        };
        log::debug!("Querying {table}: {}", request.query);
        let result = self.query.query(&request).await?;
        log::info!("Loaded {} rows from {table}", result.rows.len());

        let characters = if table.needs_character_names() {
            self.names
                .resolve_category_names(NameCategory::CHARACTER)
                .await
        } else {
            Default::default()
        };

        Ok(table_tree(
            table,
            result.rows,
            &characters,
            &self.config.text_data_categories,
        )?)
    }
}
