//! # graphql-relay-helpers
//!
//! Relay conventions for `async-graphql` services.
//!
//! ## Features
//!
//! - **Global IDs** - Opaque `(type, id)` tokens for object identification
//! - **Cursor Connections** - Relay-style pagination over ordered lists
//! - **Node Lookup** - Root `node(id:)` resolution by type name
//! - **Dynamic Schema** - `Node`, `PageInfo` and connection types for `async_graphql::dynamic`
//!
//! ## Usage
//!
//! ```rust
//! use graphql_relay_helpers::pagination::{connection_from_array, offset_to_cursor, ConnectionArguments};
//! use graphql_relay_helpers::global_id::{from_global_id, to_global_id};
//!
//! let ships = vec!["X-Wing", "Y-Wing", "A-Wing", "Millenium Falcon", "Home One"];
//! let args = ConnectionArguments::first(3).after(offset_to_cursor(1));
//! let page = connection_from_array(ships, &args);
//! assert_eq!(page.edges[0].node, "A-Wing");
//! assert!(!page.page_info.has_next_page);
//!
//! let id = to_global_id("Ship", "1");
//! assert_eq!(from_global_id(&id).unwrap().id, "1");
//! ```

pub mod config;
pub mod dynamic;
pub mod global_id;
pub mod node;
pub mod pagination;

pub use config::ConnectionConfig;
pub use dynamic::{
    connection_args, connection_definitions, global_id_field, node_definitions, page_info_type,
    ConnectionDefinitions, NodeDefinitions, TypeResolveFn,
};
pub use global_id::{from_global_id, to_global_id, GlobalId};
pub use node::{NodeResolver, NodeType, ResolvedNode};
pub use pagination::{
    connection_from_array, connection_from_array_slice, Connection, ConnectionArguments, Edge,
    PageInfo, SliceMeta,
};

use thiserror::Error;

/// Error type produced by node fetchers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Relay errors
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Node lookup failed: {0}")]
    LookupFailure(#[source] BoxError),
}

/// Result type for Relay operations
pub type Result<T> = std::result::Result<T, RelayError>;
