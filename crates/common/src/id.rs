//! ID generation utilities.

use ulid::Ulid;

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

    /// Generate a new ULID-based ID, lowercased.
    ///
    /// ULIDs sort by creation time, so ordering by id approximates ordering
    /// by `created_at` for rows written by this process.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Whether `id` has the shape of an id produced by [`IdGenerator::generate`].
    #[must_use]
    pub fn is_valid(id: &str) -> bool {
        id.len() == 26 && Ulid::from_string(&id.to_uppercase()).is_ok()
    }
}
