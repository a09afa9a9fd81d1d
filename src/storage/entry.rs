//! Directory entry model
//!
//! One `Entry` is one line of a directory's sidecar index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// Whether an entry is a stored file or a subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// A file or folder as the client sees it.
///
/// For files `stored_id` is the on-disk name and `display_name` is free to
/// change. For folders both are the physical directory name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub stored_id: String,
    pub display_name: String,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Entry {
    pub fn file(stored_id: String, original_name: &str) -> Self {
        Self {
            stored_id,
            display_name: original_name.to_string(),
            kind: EntryKind::File,
            created_at: Utc::now(),
            extension: lowercase_extension(original_name),
        }
    }

    pub fn folder(name: &str) -> Self {
        Self {
            stored_id: name.to_string(),
            display_name: name.to_string(),
            kind: EntryKind::Folder,
            created_at: Utc::now(),
            extension: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// Lowercase suffix of `name` without the leading dot
pub fn lowercase_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
}

/// Primary ordering for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Date,
}

impl SortKey {
    /// Anything other than `date` sorts by name
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("date") => SortKey::Date,
            _ => SortKey::Name,
        }
    }
}

/// Keeps entries whose display name contains `term`, ignoring case
pub fn filter_by_name(entries: &mut Vec<Entry>, term: &str) {
    if term.is_empty() {
        return;
    }
    let needle = term.to_lowercase();
    entries.retain(|entry| entry.display_name.to_lowercase().contains(&needle));
}

/// Sorts by the primary key, then stably moves every folder ahead of every file.
pub fn sort_entries(entries: &mut [Entry], key: SortKey) {
    match key {
        SortKey::Date => entries.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Name => entries.sort_by(|a, b| compare_names(&a.display_name, &b.display_name)),
    }
    entries.sort_by_key(|entry| !entry.is_folder());
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(mut entry: Entry, offset_secs: i64) -> Entry {
        entry.created_at = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(offset_secs);
        entry
    }

    #[test]
    fn test_extension_is_lowercased_without_dot() {
        assert_eq!(lowercase_extension("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(lowercase_extension("archive.tar.GZ").as_deref(), Some("gz"));
        assert_eq!(lowercase_extension("README"), None);
        assert_eq!(lowercase_extension(".bashrc"), None);
    }

    #[test]
    fn test_sort_by_name_puts_folders_first() {
        let mut entries = vec![
            Entry::file("1.txt".into(), "banana.txt"),
            Entry::folder("zeta"),
            Entry::file("2.txt".into(), "Apple.txt"),
            Entry::folder("Alpha"),
        ];
        sort_entries(&mut entries, SortKey::Name);
        let names: Vec<_> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["Alpha", "zeta", "Apple.txt", "banana.txt"]);
    }

    #[test]
    fn test_sort_by_date_is_newest_first_within_kind() {
        let mut entries = vec![
            at(Entry::file("a".into(), "old.txt"), 10),
            at(Entry::folder("old-dir"), 20),
            at(Entry::file("b".into(), "new.txt"), 40),
            at(Entry::folder("new-dir"), 30),
        ];
        sort_entries(&mut entries, SortKey::Date);
        let names: Vec<_> = entries.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["new-dir", "old-dir", "new.txt", "old.txt"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut entries = vec![
            Entry::file("a".into(), "Vacation.JPG"),
            Entry::file("b".into(), "notes.txt"),
            Entry::folder("vacations"),
        ];
        filter_by_name(&mut entries, "CATION");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.display_name.to_lowercase().contains("cation")));
    }

    #[test]
    fn test_sort_key_from_query() {
        assert_eq!(SortKey::from_query(Some("date")), SortKey::Date);
        assert_eq!(SortKey::from_query(Some("name")), SortKey::Name);
        assert_eq!(SortKey::from_query(Some("size")), SortKey::Name);
        assert_eq!(SortKey::from_query(None), SortKey::Name);
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = Entry::file("abc.JPG".into(), "photo.JPG");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["storedId"], "abc.JPG");
        assert_eq!(json["displayName"], "photo.JPG");
        assert_eq!(json["kind"], "file");
        assert_eq!(json["extension"], "jpg");

        let folder = serde_json::to_value(Entry::folder("trip")).unwrap();
        assert_eq!(folder["kind"], "folder");
        assert!(folder.get("extension").is_none());
    }
}
