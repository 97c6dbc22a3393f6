use serde::{Deserialize, Serialize};

/// One editable text slot of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSlot {
    pub content: String,
    pub multiline: bool,
}

impl TextSlot {
    pub fn multiline(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            multiline: true,
        }
    }
}

/// Leaf node. `prev`/`next` hold sibling ids within the same category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "entry")]
pub struct EntryNode {
    pub id: String,
    pub name: String,
    pub content: Vec<TextSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl EntryNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, content: Vec<TextSlot>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content,
            prev: None,
            next: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "category")]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub children: Vec<EntryNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Category(CategoryNode),
    Entry(EntryNode),
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Category(category) => &category.id,
            Self::Entry(entry) => &entry.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Category(category) => &category.name,
            Self::Entry(entry) => &entry.name,
        }
    }

    pub fn as_category(&self) -> Option<&CategoryNode> {
        match self {
            Self::Category(category) => Some(category),
            Self::Entry(_) => None,
        }
    }

    pub fn as_entry(&self) -> Option<&EntryNode> {
        match self {
            Self::Entry(entry) => Some(entry),
            Self::Category(_) => None,
        }
    }
}
