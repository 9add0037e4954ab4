//! # Resource Dispatcher
//!
//! Maps (verb, path shape) onto one store operation and renders the result.
//!
//! ## Route Table
//!
//! | Verb | Path                         | Operation                    |
//! |------|------------------------------|------------------------------|
//! | GET  | `/<Type>/<id>`               | read node                    |
//! | GET  | `/<Type>/<id>/<prop>`        | read one property            |
//! | PUT  | `/<Type>/<id>/<prop>`        | write one property           |
//! | GET  | `/<Type>/<id>/traverse`      | walk a relation              |
//! | POST | `/<Type>`                    | create node                  |
//! | POST | `/<Type>/<id>/<relation>`    | create relationship          |
//! | GET  | `/Relations/<id>`            | read relationship            |
//!
//! Anything else is 404. The table is closed: there is no way to register
//! further routes at runtime.
//!
//! Reads run under the store's read lock and writes under its write lock,
//! so each request sees one consistent store state.

use super::error::ApiError;
use super::types::{RelationshipRequest, ResourceRequest, ResourceResponse, UriListResponse};
use axum::http::Method;
use graphrest_core::{
    Addressing, GraphError, GraphStore, NodeId, NodeRecord, PropertyCodec, RelationshipId,
    RelationshipManager, ResourcePath, Session, TraversalExecutor, TypeRegistry,
    primitives::{DEFAULT_TRAVERSAL_DEPTH, MAX_TRAVERSAL_DEPTH, SELF_URI_KEY, TRAVERSE_SEGMENT},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The store handle shared by every request.
pub type SharedStore = Arc<RwLock<Session>>;

/// Metadata keys embedded in a relationship representation.
pub const RELATION_TYPE_KEY: &str = "_type";
pub const RELATION_START_KEY: &str = "_start";
pub const RELATION_END_KEY: &str = "_end";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Everything the dispatcher needs, passed in at construction.
pub struct DispatcherConfig {
    pub store: SharedStore,
    pub addressing: Addressing,
    pub registry: TypeRegistry,
}

// =============================================================================
// ROUTES
// =============================================================================

/// One row of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    GetNode,
    GetProperty,
    PutProperty,
    Traverse,
    CreateNode,
    CreateRelationship,
    GetRelationship,
}

impl Route {
    /// Look up the route for a verb and a parsed path.
    pub fn resolve(method: &Method, path: &ResourcePath) -> Option<Self> {
        let sub_is_traverse =
            matches!(path, ResourcePath::SubResource { name, .. } if name == TRAVERSE_SEGMENT);

        match (method, path) {
            (&Method::GET, ResourcePath::Entity { .. }) => Some(Self::GetNode),
            (&Method::GET, ResourcePath::SubResource { .. }) if sub_is_traverse => {
                Some(Self::Traverse)
            }
            (&Method::GET, ResourcePath::SubResource { .. }) => Some(Self::GetProperty),
            (&Method::PUT, ResourcePath::SubResource { .. }) if !sub_is_traverse => {
                Some(Self::PutProperty)
            }
            (&Method::POST, ResourcePath::Collection { .. }) => Some(Self::CreateNode),
            (&Method::POST, ResourcePath::SubResource { .. }) if !sub_is_traverse => {
                Some(Self::CreateRelationship)
            }
            (&Method::GET, ResourcePath::Relationship { .. }) => Some(Self::GetRelationship),
            _ => None,
        }
    }

    /// Whether the route mutates the store.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Self::PutProperty | Self::CreateNode | Self::CreateRelationship
        )
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

/// Routes resource requests to the core components.
pub struct Dispatcher {
    store: SharedStore,
    addressing: Addressing,
    registry: TypeRegistry,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            store: config.store,
            addressing: config.addressing,
            registry: config.registry,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Serve one request against the shared store.
    pub async fn dispatch(&self, request: &ResourceRequest) -> ResourceResponse {
        let result = match self.plan(request) {
            Ok((route, path)) if route.is_write() => {
                let mut store = self.store.write().await;
                self.execute_write(&mut *store, route, &path, request)
            }
            Ok((route, path)) => {
                let store = self.store.read().await;
                self.execute_read(&*store, route, &path, request)
            }
            Err(err) => Err(err),
        };
        self.finish(request, result)
    }

    /// Serve one request against an explicit store, without locking.
    pub fn handle<G: GraphStore + ?Sized>(
        &self,
        store: &mut G,
        request: &ResourceRequest,
    ) -> ResourceResponse {
        let result = self.plan(request).and_then(|(route, path)| {
            if route.is_write() {
                self.execute_write(store, route, &path, request)
            } else {
                self.execute_read(&*store, route, &path, request)
            }
        });
        self.finish(request, result)
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    fn plan(&self, request: &ResourceRequest) -> Result<(Route, ResourcePath), ApiError> {
        let path = Addressing::parse_path(&request.path)?;
        if let Some(type_name) = path.type_name()
            && !self.registry.is_exposed(type_name)
        {
            return Err(ApiError::UnexposedType(type_name.to_string()));
        }
        let route = Route::resolve(&request.method, &path).ok_or_else(|| unknown(request))?;
        Ok((route, path))
    }

    fn execute_read<G: GraphStore + ?Sized>(
        &self,
        store: &G,
        route: Route,
        path: &ResourcePath,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, ApiError> {
        match (route, path) {
            (Route::GetNode, ResourcePath::Entity { type_name, id }) => {
                self.get_node(store, type_name, *id)
            }
            (
                Route::GetProperty,
                ResourcePath::SubResource {
                    type_name,
                    id,
                    name,
                },
            ) => self.get_property(store, type_name, *id, name),
            (Route::Traverse, ResourcePath::SubResource { type_name, id, .. }) => {
                self.traverse(store, type_name, *id, request)
            }
            (Route::GetRelationship, ResourcePath::Relationship { id }) => {
                self.get_relationship(store, *id)
            }
            _ => Err(unknown(request)),
        }
    }

    fn execute_write<G: GraphStore + ?Sized>(
        &self,
        store: &mut G,
        route: Route,
        path: &ResourcePath,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, ApiError> {
        match (route, path) {
            (
                Route::PutProperty,
                ResourcePath::SubResource {
                    type_name,
                    id,
                    name,
                },
            ) => self.put_property(store, type_name, *id, name, request),
            (Route::CreateNode, ResourcePath::Collection { type_name }) => {
                self.create_node(store, type_name, request)
            }
            (
                Route::CreateRelationship,
                ResourcePath::SubResource {
                    type_name,
                    id,
                    name,
                },
            ) => self.create_relationship(store, type_name, *id, name, request),
            _ => Err(unknown(request)),
        }
    }

    fn finish(
        &self,
        request: &ResourceRequest,
        result: Result<ResourceResponse, ApiError>,
    ) -> ResourceResponse {
        match result {
            Ok(response) => {
                if let Some(location) = &response.location {
                    tracing::info!(method = %request.method, %location, "Resource created");
                } else {
                    tracing::debug!(method = %request.method, path = %request.path, "Resource served");
                }
                response
            }
            Err(err) => {
                if err.status().is_server_error() {
                    tracing::warn!(method = %request.method, path = %request.path, error = %err, "Request failed");
                } else {
                    tracing::debug!(method = %request.method, path = %request.path, error = %err, "Request rejected");
                }
                err.into()
            }
        }
    }

    // =========================================================================
    // NODES
    // =========================================================================

    fn get_node<G: GraphStore + ?Sized>(
        &self,
        store: &G,
        type_name: &str,
        id: NodeId,
    ) -> Result<ResourceResponse, ApiError> {
        let node = load_node(store, type_name, id)?;
        let mut body = PropertyCodec::encode(&node.properties);
        body.insert(
            SELF_URI_KEY.to_string(),
            Value::String(self.addressing.uri_for(&node.type_name, node.id)),
        );
        Ok(ResourceResponse::ok(Value::Object(body)))
    }

    fn get_property<G: GraphStore + ?Sized>(
        &self,
        store: &G,
        type_name: &str,
        id: NodeId,
        name: &str,
    ) -> Result<ResourceResponse, ApiError> {
        let node = load_node(store, type_name, id)?;
        Ok(ResourceResponse::ok(PropertyCodec::encode_single(
            name,
            node.property(name),
        )))
    }

    fn put_property<G: GraphStore + ?Sized>(
        &self,
        store: &mut G,
        type_name: &str,
        id: NodeId,
        name: &str,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, ApiError> {
        load_node(&*store, type_name, id)?;
        let (key, value) = PropertyCodec::decode_single(&PropertyCodec::parse(&request.body)?)?;
        if key != name {
            return Err(GraphError::MalformedBody(format!(
                "body names property '{}', path names '{}'",
                key, name
            ))
            .into());
        }
        self.require_declared(type_name, name)?;

        store.set_property(id, name, value.clone())?;
        Ok(ResourceResponse::ok(PropertyCodec::encode_single(
            name,
            Some(&value),
        )))
    }

    fn create_node<G: GraphStore + ?Sized>(
        &self,
        store: &mut G,
        type_name: &str,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, ApiError> {
        let properties = PropertyCodec::decode(&parse_or_empty(request)?)?;
        for name in properties.keys() {
            self.require_declared(type_name, name)?;
        }

        let id = store.create_node(type_name, properties)?;
        Ok(ResourceResponse::created(Addressing::path_for(
            type_name, id,
        )))
    }

    fn require_declared(&self, type_name: &str, property: &str) -> Result<(), ApiError> {
        if self.registry.declares_property(type_name, property) {
            Ok(())
        } else {
            Err(GraphError::UndeclaredProperty {
                type_name: type_name.to_string(),
                property: property.to_string(),
            }
            .into())
        }
    }

    // =========================================================================
    // TRAVERSAL
    // =========================================================================

    fn traverse<G: GraphStore + ?Sized>(
        &self,
        store: &G,
        type_name: &str,
        id: NodeId,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, ApiError> {
        let relation = request
            .query
            .get("relation")
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ApiError::BadQuery("missing 'relation' parameter".to_string()))?;
        let depth = parse_depth(request.query.get("depth").map(String::as_str))?;

        let start = load_node(store, type_name, id)?;
        let reached = TraversalExecutor::traverse(store, &self.registry, &start, relation, depth)?;

        let response = UriListResponse {
            uri_list: reached
                .iter()
                .map(|node| self.addressing.uri_for(&node.type_name, node.id))
                .collect(),
        };
        let body = serde_json::to_value(response)
            .map_err(|e| GraphError::Serialization(e.to_string()))?;
        Ok(ResourceResponse::ok(body))
    }

    // =========================================================================
    // RELATIONSHIPS
    // =========================================================================

    fn create_relationship<G: GraphStore + ?Sized>(
        &self,
        store: &mut G,
        type_name: &str,
        id: NodeId,
        relation: &str,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, ApiError> {
        let body: RelationshipRequest = serde_json::from_value(PropertyCodec::parse(&request.body)?)
            .map_err(|e| GraphError::MalformedBody(e.to_string()))?;
        let properties = match &body.properties {
            Some(json) => PropertyCodec::decode(json)?,
            None => Default::default(),
        };
        if !self.registry.relation_exists(type_name, relation) {
            return Err(GraphError::UnknownRelation {
                type_name: type_name.to_string(),
                relation: relation.to_string(),
            }
            .into());
        }

        let (other_type, other_id) = match self.addressing.resolve_uri(&body.uri)? {
            ResourcePath::Entity { type_name, id } => (type_name, id),
            _ => {
                return Err(GraphError::Addressing(format!(
                    "'{}' does not address a node",
                    body.uri
                ))
                .into());
            }
        };
        if !self.registry.is_exposed(&other_type) {
            return Err(GraphError::NotFound(body.uri).into());
        }

        let node = load_node(&*store, type_name, id)?;
        let other = load_node(&*store, &other_type, other_id)?;
        let created =
            RelationshipManager::create(store, &self.registry, &node, relation, &other, properties)?;

        Ok(ResourceResponse::created(Addressing::relationship_path(
            created.id,
        )))
    }

    fn get_relationship<G: GraphStore + ?Sized>(
        &self,
        store: &G,
        id: RelationshipId,
    ) -> Result<ResourceResponse, ApiError> {
        let record = RelationshipManager::get(store, id)?;

        let mut body: Map<String, Value> = PropertyCodec::encode(&record.properties);
        body.insert(
            SELF_URI_KEY.to_string(),
            Value::String(self.addressing.uri_for_relationship(record.id)),
        );
        body.insert(
            RELATION_TYPE_KEY.to_string(),
            Value::String(record.relation.clone()),
        );
        for (key, node_id) in [
            (RELATION_START_KEY, record.start),
            (RELATION_END_KEY, record.end),
        ] {
            if let Some(node) = store.get_node(node_id)? {
                body.insert(
                    key.to_string(),
                    Value::String(self.addressing.uri_for(&node.type_name, node.id)),
                );
            }
        }
        Ok(ResourceResponse::ok(Value::Object(body)))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Fetch a node and check it is of the addressed type.
fn load_node<G: GraphStore + ?Sized>(
    store: &G,
    type_name: &str,
    id: NodeId,
) -> Result<NodeRecord, ApiError> {
    match store.get_node(id)? {
        Some(node) if node.type_name == type_name => Ok(node),
        _ => Err(GraphError::NotFound(Addressing::path_for(type_name, id)).into()),
    }
}

/// Parse the body, treating an empty body as `{}`.
fn parse_or_empty(request: &ResourceRequest) -> Result<Value, ApiError> {
    if request.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    Ok(PropertyCodec::parse(&request.body)?)
}

fn parse_depth(raw: Option<&str>) -> Result<usize, ApiError> {
    let depth = match raw {
        None => DEFAULT_TRAVERSAL_DEPTH,
        Some(text) => text
            .parse::<usize>()
            .map_err(|_| ApiError::BadQuery(format!("depth '{}' is not a number", text)))?,
    };
    if depth > MAX_TRAVERSAL_DEPTH {
        return Err(ApiError::BadQuery(format!(
            "depth {} exceeds maximum {}",
            depth, MAX_TRAVERSAL_DEPTH
        )));
    }
    Ok(depth)
}

fn unknown(request: &ResourceRequest) -> ApiError {
    ApiError::UnknownResource {
        method: request.method.to_string(),
        path: request.path.clone(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
