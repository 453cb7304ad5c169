//! Node lookup by global ID
//!
//! Entity types expose their local identifier through [`NodeType`]; the
//! application registers one fetcher per type name on a [`NodeResolver`],
//! which backs the root `node(id:)` field.

use std::collections::HashMap;

use async_graphql::{Context, ID};
use tracing::debug;

use crate::global_id::{from_global_id, to_global_id, GlobalId};
use crate::{BoxError, RelayError};

/// An entity that can be fetched through the `Node` interface
pub trait NodeType {
    /// GraphQL type name used in the global ID
    const TYPE_NAME: &'static str;

    /// Identifier of this entity among entities of the same type
    fn local_id(&self) -> String;

    fn global_id(&self) -> ID {
        ID(to_global_id(Self::TYPE_NAME, &self.local_id()))
    }
}

type Fetcher<T> =
    Box<dyn Fn(&str, Option<&Context<'_>>) -> Result<Option<T>, BoxError> + Send + Sync>;

/// Node returned by [`NodeResolver::resolve`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode<T> {
    /// Type name decoded from the global ID
    pub type_name: String,
    pub node: T,
}

/// Fetchers keyed by GraphQL type name
pub struct NodeResolver<T> {
    fetchers: HashMap<String, Fetcher<T>>,
}

impl<T: 'static> NodeResolver<T> {
    pub fn new() -> Self {
        Self {
            fetchers: HashMap::new(),
        }
    }

    /// Register the fetcher for `type_name`, replacing any previous one
    ///
    /// The fetcher receives the local ID and returns `Ok(None)` when no such
    /// entity exists.
    pub fn register<F, E>(mut self, type_name: impl Into<String>, fetcher: F) -> Self
    where
        F: Fn(&str) -> Result<Option<T>, E> + Send + Sync + 'static,
        E: Into<BoxError> + 'static,
    {
        let fetcher: Fetcher<T> = Box::new(move |id, _| fetcher(id).map_err(Into::into));
        self.fetchers.insert(type_name.into(), fetcher);
        self
    }

    /// Register a fetcher that reads per-request data from the GraphQL context
    ///
    /// Such a fetcher only runs through [`NodeResolver::resolve_with_context`];
    /// plain [`NodeResolver::resolve`] reports a lookup failure for its type.
    pub fn register_with_context<F, E>(mut self, type_name: impl Into<String>, fetcher: F) -> Self
    where
        F: Fn(&str, &Context<'_>) -> Result<Option<T>, E> + Send + Sync + 'static,
        E: Into<BoxError> + 'static,
    {
        let type_name = type_name.into();
        let missing = format!("fetcher for {type_name} needs a request context");
        let fetcher: Fetcher<T> = Box::new(move |id, ctx| match ctx {
            Some(ctx) => fetcher(id, ctx).map_err(Into::into),
            None => Err(missing.clone().into()),
        });
        self.fetchers.insert(type_name, fetcher);
        self
    }

    /// Register the fetcher for the entity type `N`
    pub fn register_type<N, F, E>(self, fetcher: F) -> Self
    where
        N: NodeType,
        F: Fn(&str) -> Result<Option<T>, E> + Send + Sync + 'static,
        E: Into<BoxError> + 'static,
    {
        self.register(N::TYPE_NAME, fetcher)
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.fetchers.contains_key(type_name)
    }

    /// Decode `token` and fetch the node it names
    ///
    /// Returns `Ok(None)` when no fetcher is registered for the decoded type
    /// or the fetcher found nothing.
    pub fn resolve(&self, token: &str) -> crate::Result<Option<ResolvedNode<T>>> {
        self.fetch(from_global_id(token)?, None)
    }

    /// Like [`NodeResolver::resolve`], handing `ctx` to context-aware fetchers
    pub fn resolve_with_context(
        &self,
        token: &str,
        ctx: &Context<'_>,
    ) -> crate::Result<Option<ResolvedNode<T>>> {
        self.fetch(from_global_id(token)?, Some(ctx))
    }

    /// Fetch the node named by an already decoded global ID
    pub fn resolve_global_id(&self, global_id: GlobalId) -> crate::Result<Option<ResolvedNode<T>>> {
        self.fetch(global_id, None)
    }

    fn fetch(
        &self,
        global_id: GlobalId,
        ctx: Option<&Context<'_>>,
    ) -> crate::Result<Option<ResolvedNode<T>>> {
        let GlobalId { type_name, id } = global_id;

        let Some(fetcher) = self.fetchers.get(&type_name) else {
            debug!(type_name = %type_name, "no node fetcher registered");
            return Ok(None);
        };

        let node = fetcher(&id, ctx).map_err(RelayError::LookupFailure)?;
        Ok(node.map(|node| ResolvedNode { type_name, node }))
    }
}

impl<T: 'static> Default for NodeResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}
