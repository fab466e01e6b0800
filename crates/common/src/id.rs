//! ID generation utilities.

use ulid::Ulid;

/// Prefix carried by every complaint identifier.
pub const COMPLAINT_ID_PREFIX: &str = "ADU";

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a complaint ID.
    ///
    /// Students quote these to staff, so they keep the `ADU` prefix and
    /// the upper-case Crockford alphabet (no I, L, O or U).
    #[must_use]
    pub fn generate_complaint_id(&self) -> String {
        format!("{COMPLAINT_ID_PREFIX}{}", Ulid::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_complaint_id() {
        let id_gen = IdGenerator::new();
        let id = id_gen.generate_complaint_id();

        assert!(id.starts_with("ADU"));
        assert_eq!(id.len(), 29);
        assert_eq!(id, id.to_uppercase());
        assert_ne!(id, id_gen.generate_complaint_id());
    }
}
