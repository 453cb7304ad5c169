//! Global object identification
//!
//! A global ID packs a GraphQL type name and a type-local identifier into a
//! single opaque token: base64 of `"<type>:<id>"`.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::RelayError;

const DELIMITER: char = ':';

/// Decoded global ID
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalId {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
}

impl GlobalId {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    /// Checked constructor for a global ID built from untrusted parts
    ///
    /// Rejects an empty type name or local ID, and a type name containing
    /// `:`, which would make the token ambiguous.
    pub fn try_new(type_name: impl Into<String>, id: impl Into<String>) -> crate::Result<Self> {
        let global_id = Self::new(type_name, id);
        if global_id.type_name.is_empty() || global_id.type_name.contains(DELIMITER) {
            return Err(RelayError::InvalidToken(format!(
                "invalid type name {:?}",
                global_id.type_name
            )));
        }
        if global_id.id.is_empty() {
            return Err(RelayError::InvalidToken("empty local ID".to_string()));
        }
        Ok(global_id)
    }

    /// Encode into the opaque token
    pub fn encode(&self) -> String {
        to_global_id(&self.type_name, &self.id)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for GlobalId {
    type Err = RelayError;

    fn from_str(token: &str) -> crate::Result<Self> {
        from_global_id(token)
    }
}

/// Build the global ID for `id` of type `type_name`
///
/// Precondition: `type_name` must not contain `:`. GraphQL type names never
/// do; for names from any other source build the ID with
/// [`GlobalId::try_new`]. A type name containing `:` is only caught by a debug
/// assertion, and in release builds `("A:b", "c")` and `("A", "b:c")` encode
/// to the same token. The local ID may contain anything.
pub fn to_global_id(type_name: &str, id: &str) -> String {
    debug_assert!(
        !type_name.contains(DELIMITER),
        "type name {type_name:?} contains the global ID delimiter"
    );
    BASE64.encode(format!("{type_name}{DELIMITER}{id}"))
}

/// Recover the type name and local ID from a token built by [`to_global_id`]
pub fn from_global_id(token: &str) -> crate::Result<GlobalId> {
    let bytes = BASE64
        .decode(token.as_bytes())
        .map_err(|e| RelayError::InvalidToken(e.to_string()))?;
    let raw = String::from_utf8(bytes).map_err(|e| RelayError::InvalidToken(e.to_string()))?;

    let (type_name, id) = raw
        .split_once(DELIMITER)
        .ok_or_else(|| RelayError::InvalidToken(format!("missing '{DELIMITER}' in global ID")))?;

    if type_name.is_empty() {
        return Err(RelayError::InvalidToken("empty type name".to_string()));
    }
    if id.is_empty() {
        return Err(RelayError::InvalidToken("empty local ID".to_string()));
    }

    Ok(GlobalId::new(type_name, id))
}
