//! In-memory archive views.
//!
//! [`ArchiveView`] is the owned, mutable path-to-bytes container the
//! pipeline threads through by unique ownership: opened from raw zip
//! bytes, pruned and re-rooted in place, and serialized once at the end.
//! Serialization is deterministic — entries are written in sorted order
//! with one fixed modification timestamp and deflate compression — so the
//! same logical content always rebuilds to byte-identical output.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Result;

/// Timestamp stamped onto every rebuilt entry.
///
/// Any constant inside the DOS-time range works; reproducible output is
/// the requirement, not a meaningful date.
fn fixed_timestamp() -> zip::DateTime {
    zip::DateTime::from_date_and_time(2001, 1, 1, 0, 0, 0).expect("fixed timestamp is valid")
}

/// An owned, in-memory view of an archive's file entries.
#[derive(Debug, Default)]
pub struct ArchiveView {
    entries: BTreeMap<String, Vec<u8>>,
}

impl ArchiveView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe `bytes` as a zip archive and load every file entry.
    ///
    /// Returns `Ok(None)` when the bytes are not a valid zip — a routing
    /// signal for the caller, not an error. Failing to read an entry of a
    /// valid archive is an error.
    pub fn from_zip_bytes(bytes: &[u8]) -> Result<Option<Self>> {
        let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => archive,
            Err(_) => return Ok(None),
        };

        let mut entries = BTreeMap::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let path = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            entries.insert(path, data);
        }
        Ok(Some(Self { entries }))
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.entries.insert(path.into(), data);
    }

    /// Remove an entry, returning its content if it existed.
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.entries.remove(path)
    }

    /// Content of the entry at `path`.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Entry paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry whose path equals `name` or ends with `/name`.
    ///
    /// Generators wrap the project in a varying number of folders, so
    /// lookups match on the path suffix, not just the root. Sorted order
    /// makes the choice deterministic when several entries qualify.
    pub fn find(&self, name: &str) -> Option<&str> {
        let suffix = format!("/{name}");
        self.entries
            .keys()
            .find(|path| path.as_str() == name || path.ends_with(&suffix))
            .map(String::as_str)
    }

    /// Reduce the view to the folder containing `path`, stripping the
    /// folder prefix from every kept entry.
    pub fn into_folder_of(self, path: &str) -> Self {
        let Some((folder, _)) = path.rsplit_once('/') else {
            return self;
        };
        let prefix = format!("{folder}/");
        let entries = self
            .entries
            .into_iter()
            .filter_map(|(path, data)| {
                path.strip_prefix(&prefix)
                    .map(|stripped| (stripped.to_string(), data))
            })
            .collect();
        Self { entries }
    }

    /// Serialize the view into deflate-compressed zip bytes with
    /// normalized entry metadata.
    pub fn into_zip_bytes(self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(fixed_timestamp());

        for (path, data) in &self.entries {
            writer.start_file(path.as_str(), options)?;
            writer.write_all(data)?;
        }
        Ok(writer.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_not_an_archive() {
        assert!(ArchiveView::from_zip_bytes(b"not a zip").unwrap().is_none());
    }

    #[test]
    fn entries_survive_a_rebuild() {
        let mut view = ArchiveView::new();
        view.insert("project.json", b"{}".to_vec());
        view.insert("0.png", b"png bytes".to_vec());

        let bytes = view.into_zip_bytes().unwrap();
        let reopened = ArchiveView::from_zip_bytes(&bytes).unwrap().unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("project.json"), Some(b"{}".as_slice()));
        assert_eq!(reopened.get("0.png"), Some(b"png bytes".as_slice()));
    }

    #[test]
    fn rebuilds_are_byte_identical_regardless_of_insertion_order() {
        let mut first = ArchiveView::new();
        first.insert("project.json", b"{}".to_vec());
        first.insert("a.png", b"a".to_vec());
        first.insert("b.wav", b"b".to_vec());

        let mut second = ArchiveView::new();
        second.insert("b.wav", b"b".to_vec());
        second.insert("a.png", b"a".to_vec());
        second.insert("project.json", b"{}".to_vec());

        assert_eq!(
            first.into_zip_bytes().unwrap(),
            second.into_zip_bytes().unwrap()
        );
    }

    #[test]
    fn find_matches_exact_and_suffix_paths() {
        let mut view = ArchiveView::new();
        view.insert("resources/app/project.json", b"{}".to_vec());
        view.insert("resources/app/icon.png", b"i".to_vec());

        assert_eq!(view.find("project.json"), Some("resources/app/project.json"));
        assert_eq!(view.find("icon.png"), Some("resources/app/icon.png"));
        assert_eq!(view.find("missing.json"), None);
    }

    #[test]
    fn find_does_not_match_a_bare_suffix() {
        let mut view = ArchiveView::new();
        view.insert("myproject.json", b"{}".to_vec());
        assert_eq!(view.find("project.json"), None);
    }

    #[test]
    fn folder_view_strips_the_prefix_and_drops_outsiders() {
        let mut view = ArchiveView::new();
        view.insert("app/data/project.json", b"{}".to_vec());
        view.insert("app/data/0.png", b"p".to_vec());
        view.insert("app/launcher.exe", b"x".to_vec());

        let folder = view.into_folder_of("app/data/project.json");
        assert_eq!(folder.len(), 2);
        assert_eq!(folder.get("project.json"), Some(b"{}".as_slice()));
        assert_eq!(folder.get("0.png"), Some(b"p".as_slice()));
    }

    #[test]
    fn folder_view_of_a_root_path_is_the_whole_view() {
        let mut view = ArchiveView::new();
        view.insert("project.json", b"{}".to_vec());
        view.insert("0.png", b"p".to_vec());

        let folder = view.into_folder_of("project.json");
        assert_eq!(folder.len(), 2);
    }
}
