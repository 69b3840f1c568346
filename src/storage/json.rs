//! JSON file storage backend
//!
//! One pretty-printed snapshot file per graph under a root directory.
//! Graph ids are percent-encoded into file names so any id string maps to
//! a safe, reversible name. Writes go to a temporary sibling first and are
//! renamed into place.

use super::traits::{GraphStore, StorageError, StorageResult};
use crate::graph::{GraphId, GraphSnapshot};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

const EXTENSION: &str = "json";

/// Directory-backed graph store
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    /// Serializes writers so read-modify-write cycles do not interleave
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open or create a store rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened json store");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, id: &GraphId) -> PathBuf {
        self.root
            .join(format!("{}.{}", encode_file_stem(id.as_str()), EXTENSION))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_snapshot(&self, path: &Path) -> StorageResult<Option<GraphSnapshot>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_snapshot(&self, path: &Path, snapshot: &GraphSnapshot) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl GraphStore for JsonFileStore {
    #[instrument(skip(self, snapshot), fields(graph_id = %id))]
    fn save_graph(&self, id: &GraphId, snapshot: &GraphSnapshot) -> StorageResult<()> {
        let _guard = self.lock();
        self.write_snapshot(&self.path_for(id), snapshot)?;
        debug!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "saved graph"
        );
        Ok(())
    }

    fn load_graph(&self, id: &GraphId) -> StorageResult<Option<GraphSnapshot>> {
        self.read_snapshot(&self.path_for(id))
    }

    fn delete_graph(&self, id: &GraphId) -> StorageResult<bool> {
        let _guard = self.lock();
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_graphs(&self) -> StorageResult<Vec<GraphId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match decode_file_stem(stem) {
                Some(id) => ids.push(GraphId::from(id)),
                None => warn!(path = %path.display(), "skipping file with undecodable name"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn update_graph(
        &self,
        id: &GraphId,
        apply: &mut dyn FnMut(&mut GraphSnapshot) -> bool,
    ) -> StorageResult<bool> {
        let _guard = self.lock();
        let path = self.path_for(id);
        let mut snapshot = self
            .read_snapshot(&path)?
            .ok_or_else(|| StorageError::GraphNotFound(id.clone()))?;
        let changed = apply(&mut snapshot);
        if changed {
            self.write_snapshot(&path, &snapshot)?;
        }
        Ok(changed)
    }
}

fn is_plain(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

fn encode_file_stem(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if is_plain(byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Inverse of `encode_file_stem`
///
/// Only canonical stems decode: anything `encode_file_stem` would not have
/// produced (a lowercase or malformed escape, a raw unsafe byte) is
/// rejected, so each id maps to exactly one file.
fn decode_file_stem(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    let id = String::from_utf8(out).ok()?;
    (encode_file_stem(&id) == stem).then_some(id)
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeType, Graph, Node, NodeType};
    use tempfile::TempDir;

    fn sample_snapshot() -> GraphSnapshot {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new("A", NodeType::Task)).id().clone();
        let b = graph.add_node(Node::new("B", NodeType::Milestone)).id().clone();
        graph.add_edge(Edge::new(a, b, EdgeType::Dependency, 0.7));
        graph.snapshot()
    }

    #[test]
    fn test_file_stem_encoding_roundtrip() {
        for id in ["plain-id_1", "team/alpha:q3", "100%", "ünïcode", ""] {
            let stem = encode_file_stem(id);
            assert!(stem.bytes().all(|b| is_plain(b) || b == b'%'));
            assert_eq!(decode_file_stem(&stem).as_deref(), Some(id));
        }
        assert!(decode_file_stem("bad%2").is_none());
    }

    #[test]
    fn test_non_canonical_stems_are_rejected() {
        assert_eq!(decode_file_stem("g%01").as_deref(), Some("g\u{1}"));
        for stem in ["g%+1", "g%-1", "g%2f", "g%G1", "a b", "a.b"] {
            assert!(decode_file_stem(stem).is_none(), "{stem} should not decode");
        }
    }

    #[test]
    fn test_aliased_file_names_are_not_listed() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let id = GraphId::from("g\u{1}");
        store.save_graph(&id, &GraphSnapshot::default()).unwrap();
        fs::write(dir.path().join("g%+1.json"), "{}").unwrap();
        fs::write(dir.path().join("g%2B1.json.bak"), "{}").unwrap();

        assert_eq!(store.list_graphs().unwrap(), vec![id]);
    }

    #[test]
    fn test_save_load_list_delete() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let id = GraphId::from("team/alpha");
        let snapshot = sample_snapshot();

        store.save_graph(&id, &snapshot).unwrap();

        assert_eq!(store.load_graph(&id).unwrap(), Some(snapshot));
        assert_eq!(store.list_graphs().unwrap(), vec![id.clone()]);
        assert!(store.delete_graph(&id).unwrap());
        assert!(!store.delete_graph(&id).unwrap());
        assert!(store.load_graph(&id).unwrap().is_none());
    }

    #[test]
    fn test_reopen_sees_existing_graphs() {
        let dir = TempDir::new().unwrap();
        let id = GraphId::from("roadmap");
        JsonFileStore::open(dir.path())
            .unwrap()
            .save_graph(&id, &sample_snapshot())
            .unwrap();

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        let loaded = reopened.load_graph(&id).unwrap().unwrap();
        assert_eq!(loaded.nodes.len(), 2);
        assert_eq!(loaded.edges.len(), 1);
    }

    #[test]
    fn test_record_update_goes_through_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let id = GraphId::from("g");
        store.save_graph(&id, &GraphSnapshot::default()).unwrap();

        let node = Node::new("Solo", NodeType::Idea);
        store.save_node(&id, &node).unwrap();

        let loaded = store.load_graph(&id).unwrap().unwrap();
        assert_eq!(loaded.nodes, vec![node]);
        assert!(!dir.path().join("g.json.tmp").exists());
    }

    #[test]
    fn test_foreign_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.list_graphs().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        let err = store.load_graph(&GraphId::from("broken")).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
