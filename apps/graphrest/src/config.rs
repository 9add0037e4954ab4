//! # Configuration
//!
//! The TOML file that tells the server where to listen and which entity
//! types to expose.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 4567
//!
//! [[types]]
//! name = "Person"
//! properties = ["name"]
//!
//! [[types.relations]]
//! name = "friends"
//! target = "Person"
//! ```

use crate::error::AppError;
use graphrest_core::{Direction, ExposedType, RelationDecl, TypeRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Path segment reserved for the health endpoint.
pub const HEALTH_SEGMENT: &str = "health";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// FILE LAYOUT
// =============================================================================

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphrestConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub types: Vec<TypeConfig>,
}

/// `[server]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URI used in generated links. Defaults to `http://<bound address>`.
    #[serde(default)]
    pub public_base: Option<String>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base: None,
        }
    }
}

/// One `[[types]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeConfig {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub relations: Vec<RelationConfig>,
}

/// One `[[types.relations]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationConfig {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub target: Option<String>,
}

// =============================================================================
// LOADING
// =============================================================================

impl GraphrestConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Render the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, AppError> {
        toml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Build the type registry described by the `[[types]]` entries.
    ///
    /// Fails if a type uses the reserved `health` name, declares the same
    /// relation twice, or is rejected by the registry itself.
    pub fn build_registry(&self) -> Result<TypeRegistry, AppError> {
        let mut registry = TypeRegistry::new();
        for entry in &self.types {
            registry.register(entry.to_exposed()?)?;
        }
        Ok(registry)
    }
}

impl TypeConfig {
    fn to_exposed(&self) -> Result<ExposedType, AppError> {
        if self.name == HEALTH_SEGMENT {
            return Err(AppError::Config(format!(
                "type name '{}' is reserved",
                self.name
            )));
        }

        let mut seen = BTreeSet::new();
        let mut exposed = ExposedType::new(&self.name).with_properties(self.properties.iter());
        for relation in &self.relations {
            if !seen.insert(relation.name.as_str()) {
                return Err(AppError::Config(format!(
                    "relation '{}' declared twice on type '{}'",
                    relation.name, self.name
                )));
            }
            exposed = exposed.with_relation(relation.to_decl());
        }
        Ok(exposed)
    }
}

impl RelationConfig {
    fn to_decl(&self) -> RelationDecl {
        let decl = match self.direction {
            Direction::Outgoing => RelationDecl::outgoing(&self.name),
            Direction::Incoming => RelationDecl::incoming(&self.name),
        };
        match &self.target {
            Some(target) => decl.to_type(target),
            None => decl,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
