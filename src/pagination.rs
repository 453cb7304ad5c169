//! Relay-style cursor pagination over materialized lists

use async_graphql::{InputObject, Object, SimpleObject};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, trace};

use crate::RelayError;

const CURSOR_PREFIX: &str = "arrayconnection:";

/// Page information
#[derive(SimpleObject, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// Edge in a connection
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

#[Object]
impl<T: async_graphql::OutputType> Edge<T> {
    async fn cursor(&self) -> &str {
        &self.cursor
    }

    async fn node(&self) -> &T {
        &self.node
    }
}

/// Connection (paginated result)
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

#[Object]
impl<T: async_graphql::OutputType> Connection<T> {
    async fn edges(&self) -> &[Edge<T>] {
        &self.edges
    }

    async fn page_info(&self) -> &PageInfo {
        &self.page_info
    }
}

impl<T> Connection<T> {
    /// Create empty connection
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
        }
    }

    /// Iterate over the nodes of this page, in order
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

/// Opaque cursor for the item at `offset`
pub fn offset_to_cursor(offset: usize) -> String {
    BASE64.encode(format!("{CURSOR_PREFIX}{offset}"))
}

/// Position encoded by a cursor built with [`offset_to_cursor`]
pub fn cursor_to_offset(cursor: &str) -> crate::Result<usize> {
    let bytes = BASE64
        .decode(cursor.as_bytes())
        .map_err(|e| RelayError::InvalidToken(e.to_string()))?;
    let raw = String::from_utf8(bytes).map_err(|e| RelayError::InvalidToken(e.to_string()))?;
    let digits = raw
        .strip_prefix(CURSOR_PREFIX)
        .ok_or_else(|| RelayError::InvalidToken(format!("cursor is not an {CURSOR_PREFIX} cursor")))?;
    let offset = digits
        .parse::<usize>()
        .map_err(|e| RelayError::InvalidToken(e.to_string()))?;
    // Only the canonical spelling is accepted: no sign, no leading zeros.
    if offset.to_string() != digits {
        return Err(RelayError::InvalidToken(format!("non-canonical cursor offset {digits:?}")));
    }
    Ok(offset)
}

/// Cursor of the first item equal to `object`, if it is in `items`
pub fn cursor_for_object_in_connection<T: PartialEq>(items: &[T], object: &T) -> Option<String> {
    items
        .iter()
        .position(|item| item == object)
        .map(offset_to_cursor)
}

/// Pagination arguments for connection fields
///
/// Follows the Relay Cursor Connections Specification:
/// https://relay.dev/graphql/connections.htm
///
/// Cursors that fail to decode are ignored, as if the argument was absent.
#[derive(InputObject, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionArguments {
    /// Number of items to return from the head (forward pagination)
    pub first: Option<i32>,

    /// Only return items after this cursor
    pub after: Option<String>,

    /// Number of items to return from the tail (backward pagination)
    pub last: Option<i32>,

    /// Only return items before this cursor
    pub before: Option<String>,
}

impl ConnectionArguments {
    pub fn first(first: i32) -> Self {
        Self {
            first: Some(first),
            ..Self::default()
        }
    }

    pub fn last(last: i32) -> Self {
        Self {
            last: Some(last),
            ..Self::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Decoded `after` position, `None` when absent or malformed
    pub fn after_offset(&self) -> Option<usize> {
        decode_argument("after", self.after.as_deref())
    }

    /// Decoded `before` position, `None` when absent or malformed
    pub fn before_offset(&self) -> Option<usize> {
        decode_argument("before", self.before.as_deref())
    }
}

fn decode_argument(name: &str, cursor: Option<&str>) -> Option<usize> {
    let cursor = cursor?;
    match cursor_to_offset(cursor) {
        Ok(offset) => Some(offset),
        Err(e) => {
            debug!(argument = name, cursor, error = %e, "ignoring malformed cursor");
            None
        }
    }
}

/// Where a materialized window sits in the full list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceMeta {
    /// Position of the window's first item in the full list
    pub slice_start: usize,
    /// Length of the full list
    pub array_length: usize,
}

/// Build a connection from a fully materialized, ordered list
///
/// `after`/`before` bound the list first, then `first` keeps the head and
/// `last` keeps the tail of what remains. A `first` or `last` of zero or
/// less yields an empty page.
///
/// # Example
///
/// ```rust
/// use graphql_relay_helpers::pagination::{connection_from_array, ConnectionArguments};
///
/// let ships = vec!["X-Wing", "Y-Wing", "A-Wing"];
/// let page = connection_from_array(ships, &ConnectionArguments::first(2));
/// assert_eq!(page.edges.len(), 2);
/// assert!(page.page_info.has_next_page);
/// ```
pub fn connection_from_array<T>(items: Vec<T>, args: &ConnectionArguments) -> Connection<T> {
    let meta = SliceMeta {
        slice_start: 0,
        array_length: items.len(),
    };
    connection_from_array_slice(items, args, meta)
}

/// Build a connection when only a window of the full list is materialized
///
/// `slice` holds the items at positions `meta.slice_start..` of a list of
/// `meta.array_length` items. Cursors always refer to positions in the full
/// list; items requested outside the window are simply not returned.
pub fn connection_from_array_slice<T>(
    slice: Vec<T>,
    args: &ConnectionArguments,
    meta: SliceMeta,
) -> Connection<T> {
    let slice_start = meta.slice_start;
    let slice_end = slice_start.saturating_add(slice.len());
    let array_length = meta.array_length;

    let mut start = args
        .after_offset()
        .map_or(0, |after| after.saturating_add(1))
        .max(slice_start);
    let mut end = args
        .before_offset()
        .unwrap_or(array_length)
        .min(slice_end)
        .min(array_length);

    if let Some(first) = args.first {
        end = end.min(start.saturating_add(count(first)));
    }
    if let Some(last) = args.last {
        start = start.max(end.saturating_sub(count(last)));
    }
    // Bounds that cross (after >= before, or after past the end) retain nothing.
    start = start.min(end);

    trace!(start, end, array_length, "connection page bounds");

    let edges: Vec<Edge<T>> = slice
        .into_iter()
        .enumerate()
        .map(|(idx, node)| (slice_start.saturating_add(idx), node))
        .filter(|(offset, _)| (start..end).contains(offset))
        .map(|(offset, node)| Edge {
            cursor: offset_to_cursor(offset),
            node,
        })
        .collect();

    let start_cursor = edges.first().map(|e| e.cursor.clone());
    let end_cursor = edges.last().map(|e| e.cursor.clone());

    Connection {
        edges,
        page_info: PageInfo {
            has_next_page: end < array_length,
            has_previous_page: start > 0,
            start_cursor,
            end_cursor,
        },
    }
}

fn count(requested: i32) -> usize {
    usize::try_from(requested).unwrap_or(0)
}
