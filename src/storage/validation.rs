//! Path validation
//!
//! Turns a category plus a slash-delimited relative path into a physical
//! directory under the store root, refusing anything that would escape it.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Splits `relative_path` into plain segments.
///
/// Empty and `.` segments are dropped; `..`, backslashes and NUL bytes are
/// rejected.
pub fn path_segments(relative_path: &str) -> Result<Vec<&str>, StoreError> {
    let mut segments = Vec::new();
    for segment in relative_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(StoreError::InvalidPath(relative_path.to_string())),
            s if s.contains(['\\', '\0']) => {
                return Err(StoreError::InvalidPath(relative_path.to_string()));
            }
            s => segments.push(s),
        }
    }
    Ok(segments)
}

/// Canonical `a/b/c` form of a relative path (empty for the category root)
pub fn normalize_relative_path(relative_path: &str) -> Result<String, StoreError> {
    Ok(path_segments(relative_path)?.join("/"))
}

/// Resolve a category and relative path to a physical directory
pub fn resolve_directory(
    store_root: &Path,
    categories: &[String],
    category: &str,
    relative_path: &str,
    reserved_name: Option<&str>,
) -> Result<PathBuf, StoreError> {
    if !categories.iter().any(|c| c == category) {
        return Err(StoreError::UnknownCategory(category.to_string()));
    }

    let mut dir = store_root.join(category);
    for segment in path_segments(relative_path)? {
        if Some(segment) == reserved_name {
            return Err(StoreError::InvalidPath(relative_path.to_string()));
        }
        dir.push(segment);
    }
    Ok(dir)
}

/// Validate a folder name used as a single physical path segment
pub fn validate_folder_name(name: &str, reserved_name: Option<&str>) -> Result<(), StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || Some(name) == reserved_name
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Validate a display name for a file
pub fn validate_display_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() || name.contains('\0') {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<String> {
        vec!["images".into(), "videos".into(), "other".into()]
    }

    #[test]
    fn test_empty_path_is_category_root() {
        let dir = resolve_directory(Path::new("/srv"), &categories(), "images", "", None).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/images"));
    }

    #[test]
    fn test_nested_path() {
        let dir =
            resolve_directory(Path::new("/srv"), &categories(), "images", "/trip//day1/", None)
                .unwrap();
        assert_eq!(dir, PathBuf::from("/srv/images/trip/day1"));
    }

    #[test]
    fn test_rejects_parent_traversal() {
        let result = resolve_directory(
            Path::new("/srv"),
            &categories(),
            "images",
            "trip/../../etc",
            None,
        );
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_rejects_unknown_category() {
        let result = resolve_directory(Path::new("/srv"), &categories(), "music", "", None);
        assert!(matches!(result, Err(StoreError::UnknownCategory(_))));

        let result = resolve_directory(Path::new("/srv"), &categories(), "../images", "", None);
        assert!(matches!(result, Err(StoreError::UnknownCategory(_))));
    }

    #[test]
    fn test_rejects_reserved_segment() {
        let result = resolve_directory(
            Path::new("/srv"),
            &categories(),
            "images",
            "meta.json",
            Some("meta.json"),
        );
        assert!(matches!(result, Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_normalize_relative_path() {
        assert_eq!(normalize_relative_path("/a/./b/").unwrap(), "a/b");
        assert_eq!(normalize_relative_path("").unwrap(), "");
        assert!(normalize_relative_path("a\\..\\b").is_err());
    }

    #[test]
    fn test_folder_names() {
        assert!(validate_folder_name("trip", Some("meta.json")).is_ok());
        assert!(validate_folder_name("trip 2024", None).is_ok());
        assert!(validate_folder_name("", None).is_err());
        assert!(validate_folder_name("..", None).is_err());
        assert!(validate_folder_name("a/b", None).is_err());
        assert!(validate_folder_name(" padded ", None).is_err());
        assert!(validate_folder_name("meta.json", Some("meta.json")).is_err());
    }
}
