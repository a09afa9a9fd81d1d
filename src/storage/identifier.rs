//! Stored-name generation
//!
//! Uploaded content is persisted under a random name so display names can
//! change without touching disk.

use std::path::Path;
use uuid::Uuid;

/// Returns `<uuid-v4>` plus the original extension (case preserved).
///
/// Extensions with anything other than alphanumerics are dropped.
pub fn generate_stored_id(original_name: &str) -> String {
    let id = Uuid::new_v4();
    match Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(char::is_alphanumeric))
    {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keeps_extension() {
        let id = generate_stored_id("photo.JPG");
        assert!(id.ends_with(".JPG"));
        assert!(!id.contains("photo"));
    }

    #[test]
    fn test_no_extension() {
        let id = generate_stored_id("Makefile");
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_ignores_directory_components() {
        let id = generate_stored_id("../../etc/passwd.txt");
        assert!(!id.contains('/'));
        assert!(id.ends_with(".txt"));
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| generate_stored_id("a.txt")).collect();
        assert_eq!(ids.len(), 1000);
    }
}
