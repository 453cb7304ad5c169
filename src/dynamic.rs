//! Schema descriptors for `async_graphql::dynamic`
//!
//! Plain type and field values wiring node lookup, global IDs and
//! connections into a dynamically built schema. Register the returned
//! types with `Schema::build(..).register(..)` and attach the fields to
//! your own objects.

use std::sync::Arc;

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, Interface, InterfaceField, Object, ObjectAccessor,
    TypeRef,
};
use async_graphql::Value;
use tracing::debug;

use crate::node::{NodeResolver, NodeType, ResolvedNode};
use crate::pagination::{Connection, ConnectionArguments, Edge, PageInfo};
use crate::RelayError;

/// Name of the `Node` interface
pub const NODE_INTERFACE: &str = "Node";

/// Name of the `PageInfo` object type
pub const PAGE_INFO_TYPE: &str = "PageInfo";

/// The `Node` interface and the root `node(id:)` field
pub struct NodeDefinitions {
    pub interface: Interface,
    pub field: Field,
}

/// Picks the concrete GraphQL object type of a fetched node
pub type TypeResolveFn<T> = Arc<dyn Fn(&ResolvedNode<T>) -> String + Send + Sync>;

/// Build the `Node` interface and a `node` field backed by `resolver`
///
/// Without `type_resolve` the fetched object is reported as the concrete type
/// named in the global ID, so every registered type name must then be an
/// object type implementing `Node`. Fetchers see the request context.
///
/// A malformed ID resolves to `null`, like an unknown one. A failed lookup is
/// returned as a field error.
pub fn node_definitions<T>(
    resolver: Arc<NodeResolver<T>>,
    type_resolve: Option<TypeResolveFn<T>>,
) -> NodeDefinitions
where
    T: for<'a> Into<FieldValue<'a>> + Send + 'static,
{
    let interface = Interface::new(NODE_INTERFACE)
        .description("An object with an ID")
        .field(
            InterfaceField::new("id", TypeRef::named_nn(TypeRef::ID))
                .description("The id of the object"),
        );

    let field = Field::new("node", TypeRef::named(NODE_INTERFACE), move |ctx| {
        let resolver = resolver.clone();
        let type_resolve = type_resolve.clone();
        FieldFuture::new(async move {
            let id = ctx.args.try_get("id")?.string()?.to_string();
            let resolved = match resolver.resolve_with_context(&id, ctx.ctx) {
                Ok(resolved) => resolved,
                Err(RelayError::InvalidToken(reason)) => {
                    debug!(id = %id, reason = %reason, "node id is not a global ID");
                    None
                }
                Err(e) => return Err(async_graphql::Error::from(e)),
            };
            Ok(resolved.map(|resolved| {
                let concrete = match &type_resolve {
                    Some(type_resolve) => type_resolve(&resolved),
                    None => resolved.type_name.clone(),
                };
                let value: FieldValue<'_> = resolved.node.into();
                value.with_type(concrete)
            }))
        })
    })
    .description("Fetches an object given its ID")
    .argument(
        InputValue::new("id", TypeRef::named_nn(TypeRef::ID)).description("The ID of an object"),
    );

    NodeDefinitions { interface, field }
}

/// `id: ID!` field resolving to the global ID of the parent `N`
pub fn global_id_field<N>() -> Field
where
    N: NodeType + Send + Sync + 'static,
{
    Field::new("id", TypeRef::named_nn(TypeRef::ID), |ctx| {
        FieldFuture::new(async move {
            let node = ctx.parent_value.try_downcast_ref::<N>()?;
            Ok(Some(Value::String(node.global_id().0)))
        })
    })
    .description("The ID of an object")
}

/// The `PageInfo` object type, resolved from a parent [`PageInfo`]
pub fn page_info_type() -> Object {
    Object::new(PAGE_INFO_TYPE)
        .description("Information about pagination in a connection.")
        .field(page_info_field(
            "hasNextPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            "When paginating forwards, are there more items?",
            |page_info| Some(Value::from(page_info.has_next_page)),
        ))
        .field(page_info_field(
            "hasPreviousPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            "When paginating backwards, are there more items?",
            |page_info| Some(Value::from(page_info.has_previous_page)),
        ))
        .field(page_info_field(
            "startCursor",
            TypeRef::named(TypeRef::STRING),
            "When paginating backwards, the cursor to continue.",
            |page_info| page_info.start_cursor.clone().map(Value::String),
        ))
        .field(page_info_field(
            "endCursor",
            TypeRef::named(TypeRef::STRING),
            "When paginating forwards, the cursor to continue.",
            |page_info| page_info.end_cursor.clone().map(Value::String),
        ))
}

fn page_info_field(
    name: &str,
    ty: TypeRef,
    description: &str,
    read: fn(&PageInfo) -> Option<Value>,
) -> Field {
    Field::new(name, ty, move |ctx| {
        FieldFuture::new(async move {
            let page_info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
            Ok(read(page_info))
        })
    })
    .description(description)
}

/// Connection and edge object types for one node type
pub struct ConnectionDefinitions {
    pub connection: Object,
    pub edge: Object,
}

/// Build `<node_type>Connection` and `<node_type>Edge`
///
/// Fields returning the connection type must resolve to a
/// `FieldValue::owned_any(Connection<T>)`, e.g. the result of
/// [`connection_from_array`](crate::pagination::connection_from_array).
/// `node_type` must be an object type resolving from a parent `T`.
pub fn connection_definitions<T>(node_type: &str) -> ConnectionDefinitions
where
    T: Send + Sync + 'static,
{
    let edge_type = format!("{node_type}Edge");
    let connection_type = format!("{node_type}Connection");

    let edge = Object::new(edge_type.as_str())
        .description("An edge in a connection")
        .field(
            Field::new("node", TypeRef::named(node_type), |ctx| {
                FieldFuture::new(async move {
                    let edge = ctx.parent_value.try_downcast_ref::<Edge<T>>()?;
                    Ok(Some(FieldValue::borrowed_any(&edge.node)))
                })
            })
            .description("The item at the end of the edge"),
        )
        .field(
            Field::new("cursor", TypeRef::named_nn(TypeRef::STRING), |ctx| {
                FieldFuture::new(async move {
                    let edge = ctx.parent_value.try_downcast_ref::<Edge<T>>()?;
                    Ok(Some(Value::String(edge.cursor.clone())))
                })
            })
            .description("A cursor for use in pagination"),
        );

    let connection = Object::new(connection_type)
        .description("A connection to a list of items.")
        .field(
            Field::new("edges", TypeRef::named_list(edge_type), |ctx| {
                FieldFuture::new(async move {
                    let connection = ctx.parent_value.try_downcast_ref::<Connection<T>>()?;
                    Ok(Some(FieldValue::list(
                        connection.edges.iter().map(|edge| FieldValue::borrowed_any(edge)),
                    )))
                })
            })
            .description("A list of edges."),
        )
        .field(
            Field::new("pageInfo", TypeRef::named_nn(PAGE_INFO_TYPE), |ctx| {
                FieldFuture::new(async move {
                    let connection = ctx.parent_value.try_downcast_ref::<Connection<T>>()?;
                    Ok(Some(FieldValue::borrowed_any(&connection.page_info)))
                })
            })
            .description("Information to aid in pagination."),
        );

    ConnectionDefinitions { connection, edge }
}

/// Add the `first`, `after`, `last` and `before` arguments to `field`
pub fn connection_args(field: Field) -> Field {
    field
        .argument(
            InputValue::new("first", TypeRef::named(TypeRef::INT))
                .description("Returns the first n elements from the list."),
        )
        .argument(
            InputValue::new("after", TypeRef::named(TypeRef::STRING))
                .description("Returns the elements in the list that come after the specified cursor."),
        )
        .argument(
            InputValue::new("last", TypeRef::named(TypeRef::INT))
                .description("Returns the last n elements from the list."),
        )
        .argument(
            InputValue::new("before", TypeRef::named(TypeRef::STRING))
                .description("Returns the elements in the list that come before the specified cursor."),
        )
}

impl ConnectionArguments {
    /// Read the arguments added by [`connection_args`] from a resolver
    pub fn from_accessor(args: &ObjectAccessor<'_>) -> async_graphql::Result<Self> {
        let count = |name: &str| -> async_graphql::Result<Option<i32>> {
            match args.get(name) {
                Some(value) if !value.is_null() => Ok(Some(i32::try_from(value.i64()?)?)),
                _ => Ok(None),
            }
        };
        let cursor = |name: &str| -> async_graphql::Result<Option<String>> {
            match args.get(name) {
                Some(value) if !value.is_null() => Ok(Some(value.string()?.to_string())),
                _ => Ok(None),
            }
        };

        Ok(Self {
            first: count("first")?,
            after: cursor("after")?,
            last: count("last")?,
            before: cursor("before")?,
        })
    }
}
