//! Star Wars schema built from the dynamic descriptors

use std::convert::Infallible;
use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, Object, Schema, TypeRef};
use async_graphql::{Context, Value};
use graphql_relay_helpers::{
    connection_args, connection_definitions, connection_from_array, global_id_field,
    node_definitions, page_info_type, to_global_id, ConnectionArguments, ConnectionDefinitions,
    NodeDefinitions, NodeResolver, NodeType, ResolvedNode, TypeResolveFn,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Debug, Clone)]
struct Ship {
    id: String,
    name: String,
}

impl NodeType for Ship {
    const TYPE_NAME: &'static str = "Ship";

    fn local_id(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone)]
struct Faction {
    id: String,
    name: String,
    ships: Vec<String>,
}

impl NodeType for Faction {
    const TYPE_NAME: &'static str = "Faction";

    fn local_id(&self) -> String {
        self.id.clone()
    }
}

enum StarWarsNode {
    Ship(Ship),
    Faction(Faction),
}

impl<'a> From<StarWarsNode> for FieldValue<'a> {
    fn from(node: StarWarsNode) -> Self {
        match node {
            StarWarsNode::Ship(ship) => FieldValue::owned_any(ship),
            StarWarsNode::Faction(faction) => FieldValue::owned_any(faction),
        }
    }
}

const SHIPS: [(&str, &str); 8] = [
    ("1", "X-Wing"),
    ("2", "Y-Wing"),
    ("3", "A-Wing"),
    ("4", "Millenium Falcon"),
    ("5", "Home One"),
    ("6", "TIE Fighter"),
    ("7", "TIE Interceptor"),
    ("8", "Executor"),
];

fn ship(id: &str) -> Option<Ship> {
    SHIPS
        .iter()
        .find(|(ship_id, _)| *ship_id == id)
        .map(|(id, name)| Ship {
            id: id.to_string(),
            name: name.to_string(),
        })
}

fn faction(id: &str) -> Option<Faction> {
    let (name, ships) = match id {
        "1" => ("Alliance to Restore the Republic", ["1", "2", "3", "4", "5"].as_slice()),
        "2" => ("Galactic Empire", ["6", "7", "8"].as_slice()),
        _ => return None,
    };
    Some(Faction {
        id: id.to_string(),
        name: name.to_string(),
        ships: ships.iter().map(|s| s.to_string()).collect(),
    })
}

fn name_field<T: Send + Sync + 'static>(name: fn(&T) -> &str) -> Field {
    Field::new("name", TypeRef::named(TypeRef::STRING), move |ctx| {
        FieldFuture::new(async move {
            let parent = ctx.parent_value.try_downcast_ref::<T>()?;
            Ok(Some(Value::from(name(parent))))
        })
    })
}

fn faction_field(field_name: &str, id: &'static str) -> Field {
    Field::new(field_name, TypeRef::named("Faction"), move |_| {
        FieldFuture::new(async move { Ok(faction(id).map(FieldValue::owned_any)) })
    })
}

fn star_wars_resolver() -> NodeResolver<StarWarsNode> {
    NodeResolver::new()
        .register_type::<Ship, _, _>(|id: &str| {
            Ok::<_, Infallible>(ship(id).map(StarWarsNode::Ship))
        })
        .register_type::<Faction, _, _>(|id: &str| {
            Ok::<_, Infallible>(faction(id).map(StarWarsNode::Faction))
        })
}

fn schema() -> Schema {
    build_schema(node_definitions(Arc::new(star_wars_resolver()), None), None)
}

/// Allegiance of the caller, put in the request data
struct Viewer {
    faction_id: &'static str,
}

fn build_schema(nodes: NodeDefinitions, viewer: Option<Viewer>) -> Schema {
    let NodeDefinitions {
        interface,
        field: node_field,
    } = nodes;
    let ConnectionDefinitions { connection, edge } = connection_definitions::<Ship>("Ship");

    let ship_type = Object::new("Ship")
        .description("A ship in the Star Wars saga")
        .implement("Node")
        .field(global_id_field::<Ship>())
        .field(name_field::<Ship>(|ship| ship.name.as_str()));

    let ships = Field::new("ships", TypeRef::named("ShipConnection"), |ctx| {
        FieldFuture::new(async move {
            let faction = ctx.parent_value.try_downcast_ref::<Faction>()?;
            let args = ConnectionArguments::from_accessor(&ctx.args)?;
            let ships: Vec<Ship> = faction.ships.iter().filter_map(|id| ship(id)).collect();
            Ok(Some(FieldValue::owned_any(connection_from_array(ships, &args))))
        })
    });

    let faction_type = Object::new("Faction")
        .description("A faction in the Star Wars saga")
        .implement("Node")
        .field(global_id_field::<Faction>())
        .field(name_field::<Faction>(|faction| faction.name.as_str()))
        .field(connection_args(ships));

    let query = Object::new("Query")
        .field(faction_field("rebels", "1"))
        .field(faction_field("empire", "2"))
        .field(node_field);

    let mut builder = Schema::build("Query", None, None)
        .register(interface)
        .register(page_info_type())
        .register(edge)
        .register(connection)
        .register(ship_type)
        .register(faction_type)
        .register(query);
    if let Some(viewer) = viewer {
        builder = builder.data(viewer);
    }
    builder.finish().unwrap()
}

async fn run(query: &str) -> serde_json::Value {
    let response = schema().execute(query).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    response.data.into_json().unwrap()
}

#[tokio::test]
async fn fetches_the_first_ship_of_the_rebels() {
    let data = run("{ rebels { name ships(first: 1) { edges { node { name } } } } }").await;
    assert_eq!(
        data,
        json!({
            "rebels": {
                "name": "Alliance to Restore the Republic",
                "ships": { "edges": [{ "node": { "name": "X-Wing" } }] }
            }
        })
    );
}

#[tokio::test]
async fn fetches_the_first_two_ships_with_cursors() {
    let data = run("{ rebels { ships(first: 2) { edges { cursor node { name } } } } }").await;
    assert_eq!(
        data,
        json!({
            "rebels": {
                "ships": {
                    "edges": [
                        { "cursor": "YXJyYXljb25uZWN0aW9uOjA=", "node": { "name": "X-Wing" } },
                        { "cursor": "YXJyYXljb25uZWN0aW9uOjE=", "node": { "name": "Y-Wing" } }
                    ]
                }
            }
        })
    );
}

#[tokio::test]
async fn fetches_the_next_three_ships_after_a_cursor() {
    let data = run(
        r#"{ rebels { ships(first: 3, after: "YXJyYXljb25uZWN0aW9uOjE=") { edges { cursor node { name } } } } }"#,
    )
    .await;
    assert_eq!(
        data,
        json!({
            "rebels": {
                "ships": {
                    "edges": [
                        { "cursor": "YXJyYXljb25uZWN0aW9uOjI=", "node": { "name": "A-Wing" } },
                        { "cursor": "YXJyYXljb25uZWN0aW9uOjM=", "node": { "name": "Millenium Falcon" } },
                        { "cursor": "YXJyYXljb25uZWN0aW9uOjQ=", "node": { "name": "Home One" } }
                    ]
                }
            }
        })
    );
}

#[tokio::test]
async fn fetches_no_ships_at_the_end_of_the_connection() {
    let data = run(
        r#"{ rebels { ships(first: 3, after: "YXJyYXljb25uZWN0aW9uOjQ=") { edges { cursor } pageInfo { hasNextPage } } } }"#,
    )
    .await;
    assert_eq!(
        data,
        json!({ "rebels": { "ships": { "edges": [], "pageInfo": { "hasNextPage": false } } } })
    );
}

#[tokio::test]
async fn identifies_the_end_of_the_list() {
    let data = run(
        r#"{
            rebels {
                originalShips: ships(first: 2) { edges { node { name } } pageInfo { hasNextPage } }
                moreShips: ships(first: 3, after: "YXJyYXljb25uZWN0aW9uOjE=") {
                    edges { node { name } }
                    pageInfo { hasNextPage }
                }
            }
        }"#,
    )
    .await;
    assert_eq!(
        data,
        json!({
            "rebels": {
                "originalShips": {
                    "edges": [{ "node": { "name": "X-Wing" } }, { "node": { "name": "Y-Wing" } }],
                    "pageInfo": { "hasNextPage": true }
                },
                "moreShips": {
                    "edges": [
                        { "node": { "name": "A-Wing" } },
                        { "node": { "name": "Millenium Falcon" } },
                        { "node": { "name": "Home One" } }
                    ],
                    "pageInfo": { "hasNextPage": false }
                }
            }
        })
    );
}

#[tokio::test]
async fn fetches_the_last_empire_ship_with_page_info() {
    let data = run(
        "{ empire { ships(last: 1) { edges { node { name } } pageInfo { hasPreviousPage hasNextPage startCursor endCursor } } } }",
    )
    .await;
    assert_eq!(
        data,
        json!({
            "empire": {
                "ships": {
                    "edges": [{ "node": { "name": "Executor" } }],
                    "pageInfo": {
                        "hasPreviousPage": true,
                        "hasNextPage": false,
                        "startCursor": "YXJyYXljb25uZWN0aW9uOjI=",
                        "endCursor": "YXJyYXljb25uZWN0aW9uOjI="
                    }
                }
            }
        })
    );
}

#[tokio::test]
async fn refetches_nodes_by_global_id() {
    let data = run(
        r#"{
            rebels { id }
            ship: node(id: "U2hpcDox") { id ... on Ship { name } }
            faction: node(id: "RmFjdGlvbjoy") { id ... on Faction { name } }
        }"#,
    )
    .await;
    assert_eq!(
        data,
        json!({
            "rebels": { "id": "RmFjdGlvbjox" },
            "ship": { "id": "U2hpcDox", "name": "X-Wing" },
            "faction": { "id": "RmFjdGlvbjoy", "name": "Galactic Empire" }
        })
    );
}

#[tokio::test]
async fn unknown_type_resolves_to_null() {
    let data = run(r#"{ node(id: "VW5rbm93bjox") { id } }"#).await;
    assert_eq!(data, json!({ "node": null }));
}

#[test]
fn malformed_global_id_resolves_to_null() {
    let response =
        tokio_test::block_on(schema().execute(r#"{ node(id: "not a global id") { id } }"#));
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), json!({ "node": null }));
}

fn viewer_schema(viewer: Option<Viewer>) -> Schema {
    let resolver = star_wars_resolver().register_with_context(
        Faction::TYPE_NAME,
        |id: &str, ctx: &Context<'_>| -> Result<Option<StarWarsNode>, &'static str> {
            let viewer = ctx
                .data_opt::<Viewer>()
                .ok_or("no viewer in the request")?;
            Ok(faction(id)
                .filter(|faction| faction.id == viewer.faction_id)
                .map(StarWarsNode::Faction))
        },
    );
    build_schema(node_definitions(Arc::new(resolver), None), viewer)
}

#[tokio::test]
async fn context_aware_fetcher_reads_request_data() {
    let schema = viewer_schema(Some(Viewer { faction_id: "1" }));
    let response = schema
        .execute(
            r#"{
                own: node(id: "RmFjdGlvbjox") { ... on Faction { name } }
                other: node(id: "RmFjdGlvbjoy") { ... on Faction { name } }
            }"#,
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "own": { "name": "Alliance to Restore the Republic" }, "other": null })
    );
}

#[tokio::test]
async fn failed_lookup_is_a_field_error() {
    let response = viewer_schema(None)
        .execute(r#"{ node(id: "RmFjdGlvbjox") { id } }"#)
        .await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "Node lookup failed: no viewer in the request"
    );
}

#[tokio::test]
async fn type_resolver_picks_the_concrete_type() {
    // Legacy "Starship" IDs resolve to the `Ship` object type.
    let resolver = star_wars_resolver().register("Starship", |id: &str| {
        Ok::<_, Infallible>(ship(id).map(StarWarsNode::Ship))
    });
    let type_resolve: TypeResolveFn<StarWarsNode> =
        Arc::new(|resolved: &ResolvedNode<StarWarsNode>| match resolved.node {
            StarWarsNode::Ship(_) => Ship::TYPE_NAME.to_string(),
            StarWarsNode::Faction(_) => Faction::TYPE_NAME.to_string(),
        });
    let schema = build_schema(
        node_definitions(Arc::new(resolver), Some(type_resolve)),
        None,
    );
    let legacy_id = to_global_id("Starship", "3");
    let response = schema
        .execute(format!(r#"{{ node(id: "{legacy_id}") {{ id ... on Ship {{ name }} }} }}"#))
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "node": { "id": "U2hpcDoz", "name": "A-Wing" } })
    );
}
