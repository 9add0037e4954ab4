//! # Adapter Primitives
//!
//! Fixed constants shared by the adapter and the serving component.
//! They are compiled into the binary and immutable at runtime.

/// Path segment under which relationship resources live.
///
/// This name is reserved: no entity type may be registered under it.
pub const RELATIONS_SEGMENT: &str = "Relations";

/// Sub-resource name of the traversal endpoint.
///
/// A property with this name cannot be read or written through the
/// single-property endpoints.
pub const TRAVERSE_SEGMENT: &str = "traverse";

/// Prefix of keys reserved for adapter metadata in JSON bodies.
pub const RESERVED_KEY_PREFIX: char = '_';

/// Key of the embedded self-reference URI in GET responses.
pub const SELF_URI_KEY: &str = "_uri";

/// Maximum traversal depth accepted from a request.
///
/// - All traversals must be computationally bounded.
/// - Deeper requests are rejected instead of silently clamped.
pub const MAX_TRAVERSAL_DEPTH: usize = 100;

/// Depth used when a traversal request omits `depth`.
pub const DEFAULT_TRAVERSAL_DEPTH: usize = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length in bytes of a type, relation or property name.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum length in bytes of a string property value (64KB).
pub const MAX_TEXT_VALUE_LENGTH: usize = 65536;

/// Maximum accepted request body size (2MB).
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_depth_within_bounds() {
        assert!(DEFAULT_TRAVERSAL_DEPTH <= MAX_TRAVERSAL_DEPTH);
    }

    #[test]
    fn self_uri_key_is_reserved() {
        assert!(SELF_URI_KEY.starts_with(RESERVED_KEY_PREFIX));
    }
}
