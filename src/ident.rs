//! Opaque identifier generation for stored records.

use uuid::Uuid;

/// Generates an identifier that is unique with overwhelming probability across
/// the lifetime of the dataset.
///
/// There is no central counter and no collision check against the existing
/// collections; ids are unique within their own collection but not coordinated
/// across collections.
#[must_use]
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let first = generate_id();
        let second = generate_id();

        assert!(!first.is_empty());
        assert_ne!(first, second);
    }
}
