//! State stored as custom XML parts inside a zip package
//!
//! Office documents are zip packages; document-level custom data lives in
//! `customXml/itemN.xml` entries. [`PackageStore`] reads and rewrites those
//! entries in a package on disk, leaving every other entry untouched.
//!
//! In a workbook package (one with `xl/workbook.xml`) each state part is
//! also linked from the workbook relationships and given an item-properties
//! part, so the host keeps it when the document is next saved.

use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::opc;
use crate::part::{StatePart, DEFAULT_NAMESPACE};
use crate::store::StateStore;

const PART_PREFIX: &str = "customXml/item";
const PART_SUFFIX: &str = ".xml";

/// One entry of a package held in memory while it is rewritten
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// A [`StateStore`] backed by custom XML parts in a zip package file
#[derive(Debug, Clone)]
pub struct PackageStore {
    path: PathBuf,
    namespace: String,
}

impl PackageStore {
    /// Create a store for the package at `path`. The file need not exist yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Use a different namespace for state parts
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Path of the package file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Namespace of the state parts this store reads and writes
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Names of all state parts in the package belonging to this store's namespace
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let Some(entries) = self.read_entries()? else {
            return Ok(Vec::new());
        };

        let mut keys = Vec::new();
        for entry in &entries {
            if let Some(part) = self.decode_entry(entry)? {
                keys.push(part.key);
            }
        }
        Ok(keys)
    }

    /// Read every entry of the package, or `None` if the file does not exist
    fn read_entries(&self) -> StoreResult<Option<Vec<Entry>>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)?;
            }
            entries.push(Entry { name, data, is_dir });
        }

        Ok(Some(entries))
    }

    /// Write `entries` as a new package, replacing the file
    ///
    /// The package is written to a temporary file next to the target and
    /// renamed over it.
    fn write_entries(&self, entries: &[Entry]) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut zip = zip::ZipWriter::new(temp.as_file_mut());
            let options = zip::write::SimpleFileOptions::default();

            for entry in entries {
                if entry.is_dir {
                    zip.add_directory(entry.name.as_str(), options)?;
                } else {
                    zip.start_file(entry.name.as_str(), options)?;
                    zip.write_all(&entry.data)?;
                }
            }

            zip.finish()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Decode an entry if it is a state part in this store's namespace
    fn decode_entry(&self, entry: &Entry) -> StoreResult<Option<StatePart>> {
        if entry.is_dir || part_number(&entry.name).is_none() {
            return Ok(None);
        }

        let Ok(xml) = std::str::from_utf8(&entry.data) else {
            tracing::debug!(part = %entry.name, "skipping non UTF-8 custom XML part");
            return Ok(None);
        };

        StatePart::decode_in(xml, &self.namespace)
    }

    /// Find the entry index and decoded part holding `key`
    fn find(&self, entries: &[Entry], key: &str) -> StoreResult<Option<(usize, StatePart)>> {
        for (i, entry) in entries.iter().enumerate() {
            if let Some(part) = self.decode_entry(entry)? {
                if part.key == key {
                    return Ok(Some((i, part)));
                }
            }
        }
        Ok(None)
    }
}

/// The `N` of a `customXml/itemN.xml` entry name
fn part_number(name: &str) -> Option<u32> {
    name.strip_prefix(PART_PREFIX)?
        .strip_suffix(PART_SUFFIX)?
        .parse()
        .ok()
}

fn position(entries: &[Entry], name: &str) -> Option<usize> {
    entries.iter().position(|e| !e.is_dir && e.name == name)
}

fn read_text(entries: &[Entry], name: &str) -> StoreResult<Option<String>> {
    let Some(index) = position(entries, name) else {
        return Ok(None);
    };
    String::from_utf8(entries[index].data.clone())
        .map(Some)
        .map_err(|_| StoreError::InvalidPart(format!("{name} is not UTF-8")))
}

/// Replace the entry `name`, or append it if missing
fn upsert(entries: &mut Vec<Entry>, name: &str, text: String) {
    match position(entries, name) {
        Some(index) => entries[index].data = text.into_bytes(),
        None => entries.push(Entry {
            name: name.to_string(),
            data: text.into_bytes(),
            is_dir: false,
        }),
    }
}

fn remove(entries: &mut Vec<Entry>, name: &str) {
    entries.retain(|e| e.is_dir || e.name != name);
}

/// Link state part `n` into the workbook: item properties, item
/// relationships, a workbook relationship and a content-type override.
/// Parts that are already linked are left as they are.
fn link_part(entries: &mut Vec<Entry>, n: u32) -> StoreResult<()> {
    let props = opc::item_props_part(n);
    if position(entries, &props).is_none() {
        let item_id = uuid::Uuid::new_v4().to_string().to_uppercase();
        upsert(entries, &props, opc::item_props(&item_id));
    }

    let item_rels = opc::item_rels_part(n);
    if position(entries, &item_rels).is_none() {
        upsert(entries, &item_rels, opc::item_relationships(n));
    }

    let rels = read_text(entries, opc::WORKBOOK_RELS)?.unwrap_or_else(opc::empty_relationships);
    if !opc::has_relationship_to(&rels, "xl", &opc::item_part(n))? {
        let target = format!("../{}", opc::item_part(n));
        let rels = opc::add_relationship(&rels, opc::CUSTOM_XML_REL, &target)?;
        upsert(entries, opc::WORKBOOK_RELS, rels);
    }

    if let Some(types) = read_text(entries, opc::CONTENT_TYPES)? {
        let part_name = format!("/{props}");
        let types = opc::add_override(&types, &part_name, opc::CUSTOM_XML_PROPS_TYPE)?;
        upsert(entries, opc::CONTENT_TYPES, types);
    }
    Ok(())
}

/// Remove everything [`link_part`] adds for state part `n`
fn unlink_part(entries: &mut Vec<Entry>, n: u32) -> StoreResult<()> {
    let props = opc::item_props_part(n);
    remove(entries, &props);
    remove(entries, &opc::item_rels_part(n));

    if let Some(rels) = read_text(entries, opc::WORKBOOK_RELS)? {
        let rels = opc::remove_relationships_to(&rels, "xl", &opc::item_part(n))?;
        upsert(entries, opc::WORKBOOK_RELS, rels);
    }

    if let Some(types) = read_text(entries, opc::CONTENT_TYPES)? {
        let types = opc::remove_override(&types, &format!("/{props}"))?;
        upsert(entries, opc::CONTENT_TYPES, types);
    }
    Ok(())
}

impl StateStore for PackageStore {
    fn save(&mut self, key: &str, state: &str) -> StoreResult<()> {
        let mut entries = self.read_entries()?.unwrap_or_default();
        let data = StatePart::new(&self.namespace, key, state).encode().into_bytes();

        let number = match self.find(&entries, key)? {
            Some((index, _)) => {
                entries[index].data = data;
                part_number(&entries[index].name)
            }
            None => {
                let next = entries
                    .iter()
                    .filter_map(|e| part_number(&e.name))
                    .max()
                    .map_or(1, |n| n + 1);
                entries.push(Entry {
                    name: opc::item_part(next),
                    data,
                    is_dir: false,
                });
                Some(next)
            }
        };

        if let Some(n) = number {
            if position(&entries, opc::WORKBOOK_PART).is_some() {
                link_part(&mut entries, n)?;
            }
        }

        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), key, bytes = state.len(), "saved state part");
        Ok(())
    }

    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let Some(entries) = self.read_entries()? else {
            return Ok(None);
        };
        Ok(self.find(&entries, key)?.map(|(_, part)| part.payload))
    }

    fn clear(&mut self, key: &str) -> StoreResult<()> {
        let Some(mut entries) = self.read_entries()? else {
            return Ok(());
        };

        if let Some((index, _)) = self.find(&entries, key)? {
            let removed = entries.remove(index);
            if let Some(n) = part_number(&removed.name) {
                unlink_part(&mut entries, n)?;
            }
            self.write_entries(&entries)?;
            tracing::debug!(path = %self.path.display(), key, "cleared state part");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_number() {
        assert_eq!(part_number("customXml/item1.xml"), Some(1));
        assert_eq!(part_number("customXml/item12.xml"), Some(12));
        assert_eq!(part_number("customXml/itemProps1.xml"), None);
        assert_eq!(part_number("xl/workbook.xml"), None);
    }
}
