//! # Locview Resolver
//!
//! Turns logical asset names into content-addressed shard locations and
//! extraction requests, and resolves display labels from the master text
//! table.
//!
//! ## Architecture
//!
//! ```text
//! logical name / LikePattern
//!     │
//!     ├──> AssetLocator ──(QueryService: manifest `a`)──> AssetReference
//!     │                                                   └─ {hash[..2]}/{hash}
//!     │
//!     ├──> ExtractionRequestBuilder (pure) ──> ExtractionRequest
//!     │
//!     └──> NameResolver ──(QueryService: text_data)──> NameTable
//!            └─ NameLookupCache (session-owned, successful loads only)
//! ```
//!
//! Error policy: locator and collaborator failures propagate as
//! [`ResolveError`]; name resolution never fails and degrades to an empty
//! table instead.

mod collaborator;
mod error;
mod layout;
mod locator;
mod names;
mod request;
mod sql;

pub use collaborator::{ExtractionService, QueryService};
pub use error::{ResolveError, Result};
pub use layout::StoreLayout;
pub use locator::{AssetLocator, AssetReference, ManifestFilter};
pub use names::{NameCategory, NameLookupCache, NameResolver, NameTable};
pub use request::{ExtractionExtra, ExtractionRequestBuilder, HCA_KEY};
pub use sql::{quote_ident, quote_literal, LikePattern};
