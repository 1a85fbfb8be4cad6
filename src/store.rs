//! Draft persistence.
//!
//! A draft is a possibly unsaved game record kept by the player. The
//! [`DraftStore`] trait is the boundary between the game logic and whatever
//! keeps drafts; this module ships an in-memory adapter (tests, throwaway
//! sessions) and a directory of JSON files.

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TreeError;
use crate::tree::{MoveTree, SerializedMoveTree};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("draft storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored draft is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored draft holds a broken game tree: {0}")]
    Tree(#[from] TreeError),
    #[error("draft {0} does not exist")]
    NotFound(String),
    #[error("{0:?} is not a valid draft id")]
    InvalidId(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// What a draft listing shows. Timestamps are Unix milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMetadata {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub game_tree: SerializedMoveTree,
}

impl Draft {
    /// Snapshot `tree` into a draft. A missing or empty `id` mints a new one;
    /// `previous` carries the creation time of the draft being overwritten.
    fn snapshot(tree: &MoveTree, title: &str, id: Option<&str>, previous: Option<&Draft>) -> Self {
        let now = Utc::now().timestamp_millis();
        let id = id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Draft {
            id,
            title: title.to_string(),
            created_at: previous.map_or(now, |d| d.created_at),
            updated_at: now,
            game_tree: tree.to_serialized(),
        }
    }

    /// The listing entry for this draft.
    pub fn metadata(&self) -> DraftMetadata {
        DraftMetadata {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Validate and rebuild the stored tree.
    pub fn into_tree(self) -> Result<MoveTree> {
        Ok(MoveTree::from_serialized(self.game_tree)?)
    }
}

/// Storage for drafts, keyed by an opaque draft id.
pub trait DraftStore {
    /// Save `tree` under `id`, or under a fresh id when `id` is `None`.
    /// Returns the id the draft was stored under.
    fn save_draft(&self, tree: &MoveTree, title: &str, id: Option<&str>) -> Result<String>;

    /// Load the tree of draft `id`, or `None` if there is no such draft.
    fn load_draft(&self, id: &str) -> Result<Option<MoveTree>>;

    /// Metadata of every draft, most recently updated first.
    fn list_drafts(&self) -> Result<Vec<DraftMetadata>>;

    fn delete_draft(&self, id: &str) -> Result<()>;
}

fn newest_first(drafts: &mut [DraftMetadata]) {
    drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

/// Drafts kept in memory. Clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryDraftStore {
    drafts: Arc<Mutex<HashMap<String, Draft>>>,
}

impl InMemoryDraftStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drafts held.
    pub fn count(&self) -> usize {
        self.drafts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl DraftStore for InMemoryDraftStore {
    fn save_draft(&self, tree: &MoveTree, title: &str, id: Option<&str>) -> Result<String> {
        let mut drafts = self.drafts.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = id.and_then(|id| drafts.get(id));
        let draft = Draft::snapshot(tree, title, id, previous);
        let id = draft.id.clone();
        debug!("saving draft {id} ({} nodes) in memory", tree.len());
        drafts.insert(id.clone(), draft);
        Ok(id)
    }

    fn load_draft(&self, id: &str) -> Result<Option<MoveTree>> {
        let draft = self
            .drafts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned();
        draft.map(Draft::into_tree).transpose()
    }

    fn list_drafts(&self) -> Result<Vec<DraftMetadata>> {
        let mut list: Vec<DraftMetadata> = self
            .drafts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Draft::metadata)
            .collect();
        newest_first(&mut list);
        Ok(list)
    }

    fn delete_draft(&self, id: &str) -> Result<()> {
        self.drafts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Drafts stored as `<id>.json` files in one directory.
#[derive(Clone, Debug)]
pub struct JsonDraftStore {
    dir: PathBuf,
}

impl JsonDraftStore {
    /// Open (creating if needed) the draft directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory the draft files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    fn read_draft(path: &Path) -> Result<Draft> {
        let reader = BufReader::new(fs::File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn find(&self, id: &str) -> Result<Option<Draft>> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::read_draft(&path).map(Some)
    }
}

impl DraftStore for JsonDraftStore {
    fn save_draft(&self, tree: &MoveTree, title: &str, id: Option<&str>) -> Result<String> {
        let previous = match id {
            Some(id) if !id.is_empty() => self.find(id)?,
            _ => None,
        };
        let draft = Draft::snapshot(tree, title, id, previous.as_ref());
        let path = self.path_for(&draft.id)?;
        debug!("saving draft {} to {}", draft.id, path.display());
        let mut writer = BufWriter::new(fs::File::create(&path)?);
        serde_json::to_writer(&mut writer, &draft)?;
        writer.flush()?;
        Ok(draft.id)
    }

    fn load_draft(&self, id: &str) -> Result<Option<MoveTree>> {
        self.find(id)?.map(Draft::into_tree).transpose()
    }

    fn list_drafts(&self) -> Result<Vec<DraftMetadata>> {
        let mut list = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match Self::read_draft(&path) {
                Ok(draft) => list.push(draft.metadata()),
                Err(e) => warn!("skipping unreadable draft {}: {e}", path.display()),
            }
        }
        newest_first(&mut list);
        Ok(list)
    }

    fn delete_draft(&self, id: &str) -> Result<()> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Stone};

    fn sample_tree() -> MoveTree {
        let mut tree = MoveTree::new();
        tree.add_move(Stone::new(3, 3, Color::Black), Vec::new());
        tree.add_move(Stone::new(15, 15, Color::White), Vec::new());
        tree.previous_step();
        tree.add_move(Stone::new(16, 3, Color::White), Vec::new());
        tree
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("kifu-drafts-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_in_memory_save_and_load() {
        let store = InMemoryDraftStore::new();
        let tree = sample_tree();
        let id = store.save_draft(&tree, "opening study", None).unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.count(), 1);

        let loaded = store.load_draft(&id).unwrap().unwrap();
        assert_eq!(loaded, tree);
        assert!(store.load_draft("missing").unwrap().is_none());
    }

    #[test]
    fn test_in_memory_overwrite_keeps_created_at() {
        let store = InMemoryDraftStore::new();
        let mut tree = sample_tree();
        let id = store.save_draft(&tree, "first", None).unwrap();
        let created = store.list_drafts().unwrap()[0].created_at;

        tree.add_move(Stone::new(10, 10, Color::Black), Vec::new());
        let again = store.save_draft(&tree, "second", Some(&id)).unwrap();
        assert_eq!(again, id);

        let list = store.list_drafts().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "second");
        assert_eq!(list[0].created_at, created);
        assert!(list[0].updated_at >= created);
        assert_eq!(store.load_draft(&id).unwrap().unwrap(), tree);
    }

    #[test]
    fn test_in_memory_delete() {
        let store = InMemoryDraftStore::new();
        let id = store.save_draft(&sample_tree(), "t", None).unwrap();
        store.delete_draft(&id).unwrap();
        assert_eq!(store.count(), 0);
        assert!(matches!(
            store.delete_draft(&id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_clones_share_storage() {
        let store = InMemoryDraftStore::new();
        let other = store.clone();
        store.save_draft(&sample_tree(), "shared", None).unwrap();
        assert_eq!(other.count(), 1);
    }

    #[test]
    fn test_json_store_roundtrip() {
        let dir = temp_dir();
        let store = JsonDraftStore::open(&dir).unwrap();
        let tree = sample_tree();

        let id = store.save_draft(&tree, "on disk", None).unwrap();
        assert!(dir.join(format!("{id}.json")).exists());
        assert_eq!(store.load_draft(&id).unwrap().unwrap(), tree);

        let list = store.list_drafts().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "on disk");

        store.delete_draft(&id).unwrap();
        assert!(store.load_draft(&id).unwrap().is_none());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_json_store_lists_past_corrupt_files() {
        let dir = temp_dir();
        let store = JsonDraftStore::open(&dir).unwrap();
        let id = store.save_draft(&sample_tree(), "good", None).unwrap();
        fs::write(dir.join("broken.json"), "{ not a draft").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let list = store.list_drafts().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
        assert!(store.load_draft("broken").is_err());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_json_store_rejects_path_ids() {
        let dir = temp_dir();
        let store = JsonDraftStore::open(&dir).unwrap();
        assert!(matches!(
            store.load_draft("../escape"),
            Err(StoreError::InvalidId(_))
        ));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_draft_wire_shape() {
        let store = InMemoryDraftStore::new();
        let id = store.save_draft(&MoveTree::new(), "shape", None).unwrap();
        let draft = store
            .drafts
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap();
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["title"], "shape");
        assert!(json["createdAt"].is_i64());
        assert_eq!(json["gameTree"]["rootNodeId"], "0");
    }
}
