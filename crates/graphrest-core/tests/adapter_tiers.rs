//! # Adapter Tier Tests (T0-T3)
//!
//! The core components composed the way the dispatcher uses them, run
//! against both store backends.
//!
//! ## Tiers
//! - T0: Schema and addressing
//! - T1: Node create/read consistency
//! - T2: Relationship create/read consistency
//! - T3: Traversal over stored relationships

use graphrest_core::{
    Addressing, ExposedType, GraphError, GraphStore, NodeId, PropertyCodec, PropertyMap,
    PropertyValue, RelationDecl, RelationshipManager, ResourcePath, Session, TraversalExecutor,
    TypeRegistry,
};
use serde_json::json;
use tempfile::TempDir;

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            ExposedType::new("Person")
                .with_properties(["name"])
                .with_relation(RelationDecl::outgoing("friends").to_type("Person")),
        )
        .expect("register");
    registry
}

/// One in-memory and one redb session. The TempDir must outlive the session.
fn sessions() -> (TempDir, Vec<Session>) {
    let temp = tempfile::tempdir().expect("temp dir");
    let redb = Session::with_redb(temp.path().join("tiers.redb")).expect("open");
    (temp, vec![Session::new(), redb])
}

// =============================================================================
// TIER T0: SCHEMA AND ADDRESSING
// =============================================================================

mod t0_schema_and_addressing {
    use super::*;

    /// T0.1: Generated URIs are absolute and resolve back.
    #[test]
    fn generated_uri_resolves() {
        let addressing = Addressing::new("http://0.0.0.0:4567").expect("base");
        let uri = addressing.uri_for("Person", NodeId(1));

        assert_eq!(uri, "http://0.0.0.0:4567/Person/1");
        assert_eq!(
            addressing.resolve_uri(&uri).expect("resolve"),
            ResourcePath::Entity {
                type_name: "Person".into(),
                id: NodeId(1)
            }
        );
    }

    /// T0.2: Unregistered types are not exposed even if addressable.
    #[test]
    fn unregistered_type_not_exposed() {
        let path = Addressing::parse_path("/Company/1").expect("parse");
        let registry = registry();

        assert!(!registry.is_exposed(path.type_name().expect("type")));
    }
}

// =============================================================================
// TIER T1: NODE CONSISTENCY
// =============================================================================

mod t1_nodes {
    use super::*;

    /// T1.1: Properties decoded from a body read back identically.
    #[test]
    fn create_then_read() {
        let (_temp, sessions) = sessions();
        for mut session in sessions {
            let props = PropertyCodec::decode(&json!({"name": "kalle"})).expect("decode");
            let id = session.create_node("Person", props).expect("create");

            let node = session.get_node(id).expect("get").expect("present");
            assert_eq!(
                serde_json::Value::Object(PropertyCodec::encode(&node.properties)),
                json!({"name": "kalle"})
            );
        }
    }

    /// T1.2: A single-property write is visible to the next read.
    #[test]
    fn write_then_read_single() {
        let (_temp, sessions) = sessions();
        for mut session in sessions {
            let id = session
                .create_node("Person", PropertyMap::new())
                .expect("create");
            let (name, value) =
                PropertyCodec::decode_single(&json!({"name": "new-name"})).expect("decode");
            session.set_property(id, &name, value).expect("set");

            let node = session.get_node(id).expect("get").expect("present");
            assert_eq!(
                PropertyCodec::encode_single("name", node.property("name")),
                json!({"name": "new-name"})
            );
        }
    }
}

// =============================================================================
// TIER T2: RELATIONSHIP CONSISTENCY
// =============================================================================

mod t2_relationships {
    use super::*;

    /// T2.1: Created relationship reads back with its properties.
    #[test]
    fn create_then_read() {
        let (_temp, sessions) = sessions();
        let registry = registry();
        for mut session in sessions {
            let a = session.create_node("Person", PropertyMap::new()).expect("a");
            let b = session.create_node("Person", PropertyMap::new()).expect("b");
            let adam = session.get_node(a).expect("get").expect("present");
            let bertil = session.get_node(b).expect("get").expect("present");

            let mut props = PropertyMap::new();
            props.insert("foo".into(), PropertyValue::from("bar"));
            let rel = RelationshipManager::create(
                &mut session,
                &registry,
                &adam,
                "friends",
                &bertil,
                props,
            )
            .expect("create");

            let fetched = RelationshipManager::get(&session, rel.id).expect("get");
            assert_eq!(
                fetched.properties.get("foo"),
                Some(&PropertyValue::from("bar"))
            );
        }
    }

    /// T2.2: Undeclared relations never reach the store.
    #[test]
    fn undeclared_relation_not_stored() {
        let (_temp, sessions) = sessions();
        let registry = registry();
        for mut session in sessions {
            let a = session.create_node("Person", PropertyMap::new()).expect("a");
            let adam = session.get_node(a).expect("get").expect("present");

            let result = RelationshipManager::create(
                &mut session,
                &registry,
                &adam,
                "enemies",
                &adam.clone(),
                PropertyMap::new(),
            );
            assert!(matches!(result, Err(GraphError::UnknownRelation { .. })));
            assert_eq!(session.relationship_count().expect("count"), 0);
        }
    }
}

// =============================================================================
// TIER T3: TRAVERSAL
// =============================================================================

mod t3_traversal {
    use super::*;

    /// T3.1: adam -> friends -> [bertil, carl] at depth 1.
    #[test]
    fn friends_of_adam() {
        let (_temp, sessions) = sessions();
        let registry = registry();
        let addressing = Addressing::new("http://0.0.0.0:4567").expect("base");
        for mut session in sessions {
            let ids: Vec<NodeId> = ["adam", "bertil", "carl"]
                .iter()
                .map(|name| {
                    let mut props = PropertyMap::new();
                    props.insert("name".into(), PropertyValue::from(*name));
                    session.create_node("Person", props).expect("create")
                })
                .collect();
            for friend in &ids[1..] {
                session
                    .create_edge(ids[0], "friends", *friend, PropertyMap::new())
                    .expect("edge");
            }

            let adam = session.get_node(ids[0]).expect("get").expect("present");
            let uris: Vec<String> =
                TraversalExecutor::traverse(&session, &registry, &adam, "friends", 1)
                    .expect("traverse")
                    .iter()
                    .map(|n| addressing.uri_for(&n.type_name, n.id))
                    .collect();

            assert_eq!(
                uris,
                vec![
                    "http://0.0.0.0:4567/Person/2".to_string(),
                    "http://0.0.0.0:4567/Person/3".to_string(),
                ]
            );
        }
    }
}
