//! # Locview Tree
//!
//! Turns ordered query rows into the category/entry trees the inspector
//! navigates.
//!
//! ## Architecture
//!
//! ```text
//! Record[] (collaborator order, never re-sorted)
//!     │
//!     ├──> RecordLayout
//!     │      ├─ group key  (category id)
//!     │      ├─ category label
//!     │      └─ entry (id, name, text slots)
//!     │
//!     ├──> TreeBuilder / EntryChain
//!     │      ├─ single forward pass
//!     │      └─ prev/next links between adjacent siblings
//!     │
//!     └──> navigate
//!            └─ id path -> node, neighbours, step
//! ```

mod builder;
mod dictionary;
mod error;
pub mod navigate;
mod record;

pub use builder::{build_flat, build_grouped, EntryChain, RecordLayout, TreeBuilder};
pub use dictionary::{dictionary_category, FALLBACK_CATEGORY};
pub use error::{Result, TreeError};
pub use record::{cell, cell_text};
