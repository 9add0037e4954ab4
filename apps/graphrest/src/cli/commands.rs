//! # CLI Command Implementations

use graphrest::{
    api,
    config::{GraphrestConfig, ServerConfig},
    error::AppError,
};
use graphrest_core::{GraphStore, Session, TypeRegistry};
use std::path::Path;

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Command-line values that take precedence over `[server]`.
#[derive(Debug, Default)]
pub struct ServerOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub public_base: Option<String>,
}

impl ServerOverrides {
    fn apply(self, server: &mut ServerConfig) {
        if let Some(host) = self.host {
            server.host = host;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
        if self.public_base.is_some() {
            server.public_base = self.public_base;
        }
    }
}

/// Start the HTTP server.
pub async fn cmd_serve(
    config_path: &Path,
    db_path: &Path,
    backend: &str,
    overrides: ServerOverrides,
) -> Result<(), AppError> {
    let mut config = GraphrestConfig::load(config_path)?;
    overrides.apply(&mut config.server);
    let registry = config.build_registry()?;
    if registry.types().next().is_none() {
        tracing::warn!("No types exposed; every resource request will return 404");
    }
    let session = open_session(db_path, backend)?;

    println!("graphrest server starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Exposed types:");
    for exposed in registry.types() {
        println!("  /{}", exposed.name);
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config.server, session, registry).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show node and relationship counts.
pub fn cmd_status(db_path: &Path, backend: &str, json_mode: bool) -> Result<(), AppError> {
    let session = open_session(db_path, backend)?;
    let nodes = session.node_count()?;
    let relationships = session.relationship_count()?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": backend,
            "node_count": nodes,
            "relationship_count": relationships,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("graphrest Store Status");
    println!("======================");
    println!("Database: {:?}", db_path);
    println!("Backend:  {}", backend);
    println!();
    println!("Nodes:         {}", nodes);
    println!("Relationships: {}", relationships);

    Ok(())
}

// =============================================================================
// SCHEMA COMMAND
// =============================================================================

/// Validate the configuration and list the exposed types.
pub fn cmd_schema(config_path: &Path, json_mode: bool) -> Result<(), AppError> {
    let registry = GraphrestConfig::load(config_path)?.build_registry()?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&schema_json(&registry)).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Exposed types ({:?})", config_path);
    for exposed in registry.types() {
        println!();
        println!("/{}", exposed.name);
        for property in &exposed.properties {
            println!("  property  {}", property);
        }
        for relation in exposed.relations.values() {
            let direction = match relation.direction {
                graphrest_core::Direction::Outgoing => "->",
                graphrest_core::Direction::Incoming => "<-",
            };
            println!(
                "  relation  {} {} {}",
                relation.name,
                direction,
                relation.target.as_deref().unwrap_or("*")
            );
        }
    }

    Ok(())
}

fn schema_json(registry: &TypeRegistry) -> serde_json::Value {
    let types: Vec<serde_json::Value> = registry
        .types()
        .map(|exposed| {
            let relations: Vec<serde_json::Value> = exposed
                .relations
                .values()
                .map(|r| {
                    serde_json::json!({
                        "name": r.name,
                        "direction": r.direction,
                        "target": r.target,
                    })
                })
                .collect();
            serde_json::json!({
                "name": exposed.name,
                "properties": exposed.properties,
                "relations": relations,
            })
        })
        .collect();
    serde_json::json!({ "types": types })
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(db_path: &Path, backend: &str, force: bool) -> Result<(), AppError> {
    if backend != "redb" {
        return Err(AppError::Config(format!(
            "init needs the redb backend, got '{}'",
            backend
        )));
    }
    if db_path.exists() {
        if !force {
            return Err(AppError::Config(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path)?;
    }

    let _session = Session::with_redb(db_path)?;
    println!("Initialized new redb database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// COMPACT COMMAND
// =============================================================================

/// Reclaim free space in the database file.
pub fn cmd_compact(db_path: &Path, backend: &str) -> Result<(), AppError> {
    let mut session = open_session(db_path, backend)?;
    session.compact()?;
    println!("Compacted {:?}", db_path);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the store for the selected backend.
pub fn open_session(db_path: &Path, backend: &str) -> Result<Session, AppError> {
    match backend {
        "redb" => Ok(Session::with_redb(db_path)?),
        "memory" => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            Ok(Session::new())
        }
        other => Err(AppError::Config(format!(
            "Unknown backend '{}'. Use: redb, memory",
            other
        ))),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use graphrest_core::PropertyMap;

    #[test]
    fn unknown_backend_rejected() {
        let result = open_session(Path::new("unused"), "sqlite");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("g.redb");

        cmd_init(&path, "redb", false).unwrap();
        assert!(cmd_init(&path, "redb", false).is_err());
        cmd_init(&path, "redb", true).unwrap();
    }

    #[test]
    fn force_init_empties_database() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("g.redb");
        {
            let mut session = open_session(&path, "redb").unwrap();
            session.create_node("Person", PropertyMap::new()).unwrap();
        }

        cmd_init(&path, "redb", true).unwrap();
        let session = open_session(&path, "redb").unwrap();
        assert_eq!(session.node_count().unwrap(), 0);
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut server = ServerConfig::default();
        ServerOverrides {
            host: None,
            port: Some(4567),
            public_base: Some("http://example.org".to_string()),
        }
        .apply(&mut server);

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 4567);
        assert_eq!(server.public_base.as_deref(), Some("http://example.org"));
    }

    #[test]
    fn schema_json_lists_relations() {
        let config = GraphrestConfig::from_toml_str(
            "[[types]]\nname = \"Person\"\n[[types.relations]]\nname = \"friends\"\n",
        )
        .unwrap();
        let json = schema_json(&config.build_registry().unwrap());

        assert_eq!(json["types"][0]["name"], "Person");
        assert_eq!(json["types"][0]["relations"][0]["direction"], "outgoing");
    }
}
