//! Include/exclude filtering of source subdirectories.
//!
//! A pipeline may name the subdirectories it wants (`include` / `includes`)
//! or the ones it does not want (`exclude` / `excludes`), but never both.
//! [`FilterSpec::validate`] enforces that before anything touches the disk,
//! and [`FilterSpec::select`] applies the filter to a directory listing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which mutually exclusive filter fields were set together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterConflict {
    /// `include` and a non-empty `includes`
    #[error("include and includes properties cannot be set together")]
    IncludeAndIncludes,
    /// `exclude` and a non-empty `excludes`
    #[error("exclude and excludes properties cannot be set together")]
    ExcludeAndExcludes,
    /// Any include-family field with any exclude-family field
    #[error("include/includes properties cannot be combined with exclude/excludes properties")]
    IncludeAndExclude,
}

/// Order in which subdirectories are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingOrder {
    /// Sorted by name, reproducible across machines
    #[default]
    Lexical,
    /// Whatever order the filesystem returns
    Filesystem,
}

impl std::str::FromStr for ListingOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" => Ok(ListingOrder::Lexical),
            "filesystem" | "fs" => Ok(ListingOrder::Filesystem),
            _ => Err(format!("unknown listing order '{}' (expected lexical or filesystem)", s)),
        }
    }
}

/// One immediate child of a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Base name of the entry
    pub name: String,
    /// Full path of the entry
    pub path: PathBuf,
    /// Whether the entry is a directory (symlinks are followed)
    pub is_dir: bool,
}

impl SourceEntry {
    /// Create a directory entry under `parent`.
    pub fn dir(parent: &Path, name: &str) -> Self {
        Self { name: name.to_string(), path: parent.join(name), is_dir: true }
    }

    /// Create a non-directory entry under `parent`.
    pub fn file(parent: &Path, name: &str) -> Self {
        Self { name: name.to_string(), path: parent.join(name), is_dir: false }
    }
}

/// Include/exclude settings of one pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Single subdirectory to include
    pub include: Option<String>,
    /// Subdirectories to include
    pub includes: BTreeSet<String>,
    /// Single subdirectory to exclude
    pub exclude: Option<String>,
    /// Subdirectories to exclude
    pub excludes: BTreeSet<String>,
}

impl FilterSpec {
    /// Create an empty filter that lets every subdirectory through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single include name, if set to a non-blank value.
    pub fn include_name(&self) -> Option<&str> {
        non_blank(self.include.as_deref())
    }

    /// Single exclude name, if set to a non-blank value.
    pub fn exclude_name(&self) -> Option<&str> {
        non_blank(self.exclude.as_deref())
    }

    /// Whether any include-family field is set. Blank names count as unset.
    pub fn has_include(&self) -> bool {
        self.include_name().is_some() || !self.includes.is_empty()
    }

    /// Whether any exclude-family field is set. Blank names count as unset.
    pub fn has_exclude(&self) -> bool {
        self.exclude_name().is_some() || !self.excludes.is_empty()
    }

    /// Whether the filter selects everything.
    pub fn is_passthrough(&self) -> bool {
        !self.has_include() && !self.has_exclude()
    }

    /// Check the mutual-exclusion rules. Pure; touches nothing on disk.
    pub fn validate(&self) -> Result<(), FilterConflict> {
        if self.include_name().is_some() && !self.includes.is_empty() {
            return Err(FilterConflict::IncludeAndIncludes);
        }
        if self.exclude_name().is_some() && !self.excludes.is_empty() {
            return Err(FilterConflict::ExcludeAndExcludes);
        }
        if self.has_include() && self.has_exclude() {
            return Err(FilterConflict::IncludeAndExclude);
        }
        Ok(())
    }

    fn is_included(&self, name: &str) -> bool {
        self.include_name() == Some(name) || self.includes.contains(name)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude_name() == Some(name) || self.excludes.contains(name)
    }

    /// Whether a single entry qualifies.
    ///
    /// Non-directories never qualify. An include match wins over an exclude
    /// match. When an include-family field is set it acts as an allow list;
    /// otherwise everything not excluded qualifies.
    pub fn accepts(&self, entry: &SourceEntry) -> bool {
        if !entry.is_dir {
            return false;
        }
        if self.is_included(&entry.name) {
            return true;
        }
        if self.is_excluded(&entry.name) {
            return false;
        }
        !self.has_include()
    }

    /// Keep the qualifying entries, preserving their order.
    pub fn select<I>(&self, entries: I) -> Vec<SourceEntry>
    where
        I: IntoIterator<Item = SourceEntry>,
    {
        entries.into_iter().filter(|e| self.accepts(e)).collect()
    }
}

fn non_blank(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

/// List the immediate children of `dir`.
pub fn list_source_entries(dir: &Path, order: ListingOrder) -> io::Result<Vec<SourceEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        entries.push(SourceEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: path.is_dir(),
            path,
        });
    }

    if order == ListingOrder::Lexical {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn abc() -> Vec<SourceEntry> {
        let root = Path::new("/src");
        vec![SourceEntry::dir(root, "A"), SourceEntry::dir(root, "B"), SourceEntry::dir(root, "C")]
    }

    fn names(entries: &[SourceEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_empty_passes() {
        let filter = FilterSpec::new();
        assert!(filter.validate().is_ok());
        assert!(filter.is_passthrough());
    }

    #[test]
    fn test_validate_include_and_includes() {
        let filter = FilterSpec {
            include: Some("A".to_string()),
            includes: set(&["B"]),
            ..Default::default()
        };
        assert_eq!(filter.validate(), Err(FilterConflict::IncludeAndIncludes));
    }

    #[test]
    fn test_validate_include_with_empty_includes_passes() {
        let filter = FilterSpec { include: Some("A".to_string()), ..Default::default() };
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn test_validate_exclude_and_excludes() {
        let filter = FilterSpec {
            exclude: Some("A".to_string()),
            excludes: set(&["B"]),
            ..Default::default()
        };
        assert_eq!(filter.validate(), Err(FilterConflict::ExcludeAndExcludes));
    }

    #[test]
    fn test_validate_cross_family() {
        let cases = [
            FilterSpec {
                include: Some("A".to_string()),
                exclude: Some("B".to_string()),
                ..Default::default()
            },
            FilterSpec { include: Some("A".to_string()), excludes: set(&["B"]), ..Default::default() },
            FilterSpec { includes: set(&["A"]), exclude: Some("B".to_string()), ..Default::default() },
            FilterSpec { includes: set(&["A"]), excludes: set(&["B"]), ..Default::default() },
        ];
        for filter in cases {
            assert_eq!(filter.validate(), Err(FilterConflict::IncludeAndExclude));
        }
    }

    #[test]
    fn test_select_no_filter() {
        let selected = FilterSpec::new().select(abc());
        assert_eq!(names(&selected), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_select_includes() {
        let filter = FilterSpec { includes: set(&["A", "B"]), ..Default::default() };
        assert_eq!(names(&filter.select(abc())), vec!["A", "B"]);
    }

    #[test]
    fn test_select_single_include() {
        let filter = FilterSpec { include: Some("C".to_string()), ..Default::default() };
        assert_eq!(names(&filter.select(abc())), vec!["C"]);
    }

    #[test]
    fn test_select_excludes() {
        let filter = FilterSpec { excludes: set(&["B"]), ..Default::default() };
        assert_eq!(names(&filter.select(abc())), vec!["A", "C"]);
    }

    #[test]
    fn test_select_single_exclude() {
        let filter = FilterSpec { exclude: Some("A".to_string()), ..Default::default() };
        assert_eq!(names(&filter.select(abc())), vec!["B", "C"]);
    }

    #[test]
    fn test_select_skips_files() {
        let root = Path::new("/src");
        let entries = vec![SourceEntry::file(root, "A"), SourceEntry::dir(root, "B")];
        let filter = FilterSpec { include: Some("A".to_string()), ..Default::default() };
        assert!(filter.select(entries.clone()).is_empty());
        assert_eq!(names(&FilterSpec::new().select(entries)), vec!["B"]);
    }

    #[test]
    fn test_include_wins_over_exclude() {
        // Not a valid configuration, but selection order is still defined.
        let filter = FilterSpec {
            include: Some("A".to_string()),
            exclude: Some("A".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&filter.select(abc())), vec!["A"]);
    }

    #[test]
    fn test_select_preserves_input_order() {
        let root = Path::new("/src");
        let entries = vec![SourceEntry::dir(root, "z"), SourceEntry::dir(root, "a")];
        assert_eq!(names(&FilterSpec::new().select(entries)), vec!["z", "a"]);
    }

    #[test]
    fn test_list_source_entries_lexical() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("b")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::write(temp.path().join("c.txt"), b"x").unwrap();

        let entries = list_source_entries(temp.path(), ListingOrder::Lexical).unwrap();
        assert_eq!(names(&entries), vec!["a", "b", "c.txt"]);
        assert!(entries[0].is_dir);
        assert!(!entries[2].is_dir);
        assert_eq!(entries[1].path, temp.path().join("b"));
    }

    #[test]
    fn test_list_source_entries_filesystem_order_has_same_members() {
        let temp = TempDir::new().unwrap();
        for name in ["x", "y", "z"] {
            fs::create_dir(temp.path().join(name)).unwrap();
        }

        let mut entries = list_source_entries(temp.path(), ListingOrder::Filesystem).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(names(&entries), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_list_source_entries_missing_dir() {
        let temp = TempDir::new().unwrap();
        let err = list_source_entries(&temp.path().join("nope"), ListingOrder::Lexical).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_listing_order_from_str() {
        assert_eq!("lexical".parse::<ListingOrder>(), Ok(ListingOrder::Lexical));
        assert_eq!("Filesystem".parse::<ListingOrder>(), Ok(ListingOrder::Filesystem));
        assert!("random".parse::<ListingOrder>().is_err());
    }

    #[test]
    fn test_blank_single_names_are_unset() {
        let filter = FilterSpec { include: Some(String::new()), ..Default::default() };
        assert!(filter.is_passthrough());
        assert_eq!(filter.select(abc()), abc());

        let filter = FilterSpec { exclude: Some("  ".to_string()), ..Default::default() };
        assert_eq!(filter.select(abc()), abc());
    }

    #[test]
    fn test_blank_include_does_not_conflict() {
        let filter = FilterSpec {
            include: Some(String::new()),
            exclude: Some("B".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.validate(), Ok(()));
        let names: Vec<_> = filter.select(abc()).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["A", "C"]);

        let filter = FilterSpec {
            exclude: Some(String::new()),
            excludes: ["B".to_string()].into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(filter.validate(), Ok(()));
    }
}
