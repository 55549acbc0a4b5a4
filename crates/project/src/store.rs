//! The project store: single owner of the open project, its UI index and
//! the durable storage binding.
//! 專案儲存器：持有目前專案、介面索引與持久化後端。
//!
//! Structural mutations (create, delete, rename, move, import) persist in the
//! same call on a best-effort basis: a failed write is logged and the
//! in-memory state is kept. Content edits stay in memory until
//! [`ProjectStore::save_project`].

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::export::{export_project, ExportError, ImportedFile};
use crate::path::{file_name, is_within, join_path, parent_of, rebase, validate_name};
use crate::project::{Project, ProjectSettings, SCAFFOLD_SELECTION};
use crate::storage::{decode_state, encode_state, ProjectStorage, StorageError};
use crate::tree::{FileTree, Node, TreeError};
use crate::util::now_ms;

/// Handle returned by [`ProjectStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Rename,
    Move,
}

/// Notification delivered to subscribers after a successful mutation.
/// 成功變更後傳給訂閱者的通知。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOperation {
    pub kind: OperationKind,
    pub path: String,
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub timestamp_ms: i64,
}

impl FileOperation {
    fn at(kind: OperationKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            old_path: None,
            new_path: None,
            timestamp_ms: now_ms(),
        }
    }

    fn relocation(kind: OperationKind, old_path: &str, new_path: &str) -> Self {
        Self {
            old_path: Some(old_path.to_string()),
            new_path: Some(new_path.to_string()),
            ..Self::at(kind, new_path)
        }
    }
}

type Subscriber = Box<dyn FnMut(&FileOperation)>;

/// Owns the open project and mediates every change to it.
/// 管理目前開啟的專案並處理所有變更。
pub struct ProjectStore {
    config: StoreConfig,
    storage: Box<dyn ProjectStorage>,
    project: Option<Project>,
    expanded: BTreeSet<String>,
    selected: Option<String>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectStore")
            .field("config", &self.config)
            .field("project", &self.project.as_ref().map(|p| &p.name))
            .field("expanded", &self.expanded)
            .field("selected", &self.selected)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

fn no_project() -> TreeError {
    TreeError::NotFound(String::new())
}

impl ProjectStore {
    /// Creates a store with no open project.
    pub fn new(storage: impl ProjectStorage + 'static, config: StoreConfig) -> Self {
        Self {
            config,
            storage: Box::new(storage),
            project: None,
            expanded: BTreeSet::new(),
            selected: None,
            subscribers: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Creates a store and restores whatever was persisted under the
    /// configured key.
    /// 建立儲存器並還原先前保存的狀態。
    pub fn open(
        storage: impl ProjectStorage + 'static,
        config: StoreConfig,
    ) -> Result<Self, StorageError> {
        let mut store = Self::new(storage, config);
        let Some(payload) = store.storage.read(&store.config.project_key)? else {
            debug!(key = %store.config.project_key, "no persisted project state");
            return Ok(store);
        };
        let mut state = decode_state(&payload)?;
        if let Some(project) = state.project.as_mut() {
            project
                .validate()
                .map_err(|err| StorageError::Invalid(err.to_string()))?;
            info!(project = %project.name, nodes = project.node_count(), "restored project");
        }
        store.project = state.project;
        store.expanded = state.expanded_folders;
        store.selected = state.selected_file;
        Ok(store)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Replaces the open project with a freshly scaffolded one.
    pub fn create_project(&mut self, name: impl Into<String>) {
        let project = Project::scaffold(name, now_ms());
        info!(project = %project.name, "created project");
        self.expanded = project.expanded_hints().into_iter().collect();
        self.selected = Some(SCAFFOLD_SELECTION.to_string());
        self.project = Some(project);
        self.persist();
    }

    /// Opens an existing project. The tree is verified and the settings
    /// clamped first; the selection is cleared and the expanded set is seeded
    /// from the folders' expansion hints.
    pub fn load_project(&mut self, mut project: Project) -> Result<(), TreeError> {
        project.validate()?;
        info!(project = %project.name, nodes = project.node_count(), "loaded project");
        self.expanded = project.expanded_hints().into_iter().collect();
        self.selected = None;
        self.project = Some(project);
        self.persist();
        Ok(())
    }

    pub fn close_project(&mut self) {
        self.project = None;
        self.expanded.clear();
        self.selected = None;
        self.persist();
    }

    /// Explicit save: stamps the project, clears dirty flags and persists.
    pub fn save_project(&mut self) -> Result<(), TreeError> {
        let project = self.project.as_mut().ok_or_else(no_project)?;
        project.touch(now_ms());
        project.nodes.mark_all_clean();
        self.persist();
        Ok(())
    }

    /// Applies `mutate` to the project settings, sanitizes them and persists.
    pub fn update_settings<F>(&mut self, mutate: F) -> Result<(), TreeError>
    where
        F: FnOnce(&mut ProjectSettings),
    {
        let project = self.project.as_mut().ok_or_else(no_project)?;
        mutate(&mut project.settings);
        project.settings.sanitize();
        project.touch(now_ms());
        self.persist();
        Ok(())
    }

    /// Creates a file or folder under `parent` (empty for the root level).
    /// 在指定父路徑下建立檔案或資料夾。
    pub fn create(&mut self, parent: &str, name: &str, is_folder: bool) -> Result<Node, TreeError> {
        let project = self.project.as_mut().ok_or_else(no_project)?;
        let node = project.nodes.create(parent, name, is_folder, now_ms())?.clone();
        debug!(path = %node.path, folder = is_folder, "created node");
        self.commit(FileOperation::at(OperationKind::Create, node.path.clone()));
        Ok(node)
    }

    /// Deletes the node at `path` and its subtree, returning how many nodes
    /// were removed. The selection is always cleared.
    /// 刪除節點及其子樹，並清除目前選取。
    pub fn delete(&mut self, path: &str) -> Result<usize, TreeError> {
        let project = self.project.as_mut().ok_or_else(no_project)?;
        let removed = project.nodes.remove(path)?;
        let count = 1 + removed.descendant_count();
        debug!(path, count, "deleted subtree");
        self.expanded.retain(|folder| !is_within(folder, path));
        self.selected = None;
        self.commit(FileOperation::at(OperationKind::Delete, path));
        Ok(count)
    }

    /// Renames the node at `path`; descendants, expanded entries and the
    /// selection follow. Returns the new path.
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<String, TreeError> {
        let project = self.project.as_mut().ok_or_else(no_project)?;
        let new_path = project.nodes.rename(path, new_name)?;
        if new_path != path {
            debug!(from = path, to = %new_path, "renamed node");
            self.rebase_ui(path, &new_path);
        }
        self.commit(FileOperation::relocation(
            OperationKind::Rename,
            path,
            &new_path,
        ));
        Ok(new_path)
    }

    /// Moves the subtree at `from` into folder `to` (empty for the root
    /// level). Returns the new path.
    pub fn move_node(&mut self, from: &str, to: &str) -> Result<String, TreeError> {
        let project = self.project.as_mut().ok_or_else(no_project)?;
        let new_path = project.nodes.move_node(from, to)?;
        if new_path != from {
            debug!(from, to = %new_path, "moved node");
            self.rebase_ui(from, &new_path);
        }
        self.commit(FileOperation::relocation(OperationKind::Move, from, &new_path));
        Ok(new_path)
    }

    /// Replaces a file's content in memory and marks it dirty. Not persisted
    /// until the next save.
    pub fn update_content(&mut self, path: &str, content: impl Into<String>) -> Result<(), TreeError> {
        let project = self.project.as_mut().ok_or_else(no_project)?;
        let op = FileOperation::at(OperationKind::Update, path);
        project
            .nodes
            .update_content(path, content.into(), op.timestamp_ms)?;
        self.notify(&op);
        Ok(())
    }

    /// Flips a folder's membership in the expanded set, returning the new
    /// state.
    pub fn toggle_expanded(&mut self, path: &str) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.to_string());
            true
        }
    }

    pub fn select_file(&mut self, path: &str) {
        self.selected = Some(path.to_string());
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn expanded_folders(&self) -> &BTreeSet<String> {
        &self.expanded
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Node behind the current selection, if it still exists.
    pub fn selected_node(&self) -> Option<&Node> {
        self.find(self.selected.as_deref()?)
    }

    pub fn find(&self, path: &str) -> Option<&Node> {
        self.project.as_ref()?.nodes.find(path)
    }

    pub fn find_children(&self, folder_path: &str) -> &[Node] {
        match &self.project {
            Some(project) => project.nodes.find_children(folder_path),
            None => &[],
        }
    }

    pub fn search(&self, query: &str) -> Vec<&Node> {
        match &self.project {
            Some(project) => project.nodes.search(query),
            None => Vec::new(),
        }
    }

    /// Serialises the open project for download.
    pub fn export(&self) -> Result<Vec<u8>, ExportError> {
        let project = self.project.as_ref().ok_or_else(no_project)?;
        export_project(project)
    }

    /// Merges files into the open project, creating intermediate folders.
    /// Existing files get their content replaced. Either every file is
    /// applied or none is. Returns the number of files written.
    /// 將外部檔案合併進目前專案；全部成功或全部不套用。
    pub fn import<I>(&mut self, files: I) -> Result<usize, TreeError>
    where
        I: IntoIterator<Item = ImportedFile>,
    {
        let project = self.project.as_ref().ok_or_else(no_project)?;
        let mut nodes = project.nodes.clone();
        let now = now_ms();
        let mut ops = Vec::new();
        for file in files {
            ops.push(import_one(&mut nodes, file, now)?);
        }
        if ops.is_empty() {
            return Ok(0);
        }
        let project = self.project.as_mut().ok_or_else(no_project)?;
        project.nodes = nodes;
        project.touch(now);
        debug!(files = ops.len(), "imported files");
        self.persist();
        for op in &ops {
            self.notify(op);
        }
        Ok(ops.len())
    }

    /// Registers a callback invoked synchronously, in subscription order,
    /// after every successful mutation.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&FileOperation) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Writes the current state to storage, surfacing any failure.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        let payload = encode_state(
            self.project.as_ref(),
            &self.expanded,
            self.selected.as_deref(),
        )?;
        self.storage.write(&self.config.project_key, &payload)
    }

    fn persist(&mut self) {
        if let Err(err) = self.flush() {
            warn!(key = %self.config.project_key, error = %err, "failed to persist project state");
        }
    }

    fn commit(&mut self, op: FileOperation) {
        if let Some(project) = self.project.as_mut() {
            project.touch(op.timestamp_ms);
        }
        self.persist();
        self.notify(&op);
    }

    fn notify(&mut self, op: &FileOperation) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(op);
        }
    }

    fn rebase_ui(&mut self, old_path: &str, new_path: &str) {
        self.expanded = std::mem::take(&mut self.expanded)
            .into_iter()
            .map(|folder| rebase(&folder, old_path, new_path).unwrap_or(folder))
            .collect();
        if let Some(rebased) = self
            .selected
            .as_deref()
            .and_then(|selected| rebase(selected, old_path, new_path))
        {
            self.selected = Some(rebased);
        }
    }
}

fn import_one(nodes: &mut FileTree, file: ImportedFile, now: i64) -> Result<FileOperation, TreeError> {
    let trimmed = file.path.trim_matches('/');
    let name = file_name(trimmed);
    validate_name(name)?;
    let folders: Vec<&str> = match parent_of(trimmed) {
        "" => Vec::new(),
        dir => dir.split('/').collect(),
    };
    for folder in &folders {
        validate_name(folder)?;
    }

    let mut parent = String::new();
    for folder in folders {
        let path = join_path(&parent, folder);
        match nodes.find(&path) {
            Some(node) if node.is_folder() => {}
            Some(_) => return Err(TreeError::NotAFolder(path)),
            None => {
                nodes.create(&parent, folder, true, now)?;
            }
        }
        parent = path;
    }

    let path = join_path(&parent, name);
    if nodes.find(&path).is_some() {
        nodes.update_content(&path, file.content, now)?;
        Ok(FileOperation::at(OperationKind::Update, path))
    } else {
        nodes.insert(&parent, Node::file(&parent, name, file.content, now))?;
        Ok(FileOperation::at(OperationKind::Create, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::NameError;
    use crate::storage::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store_with(storage: &MemoryStorage) -> ProjectStore {
        ProjectStore::new(storage.clone(), StoreConfig::default())
    }

    fn empty_project_store(storage: &MemoryStorage) -> ProjectStore {
        let mut store = store_with(storage);
        store.load_project(Project::new("Empty", 0)).unwrap();
        store
    }

    struct FailingStorage;

    impl ProjectStorage for FailingStorage {
        fn read(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(None)
        }

        fn write(&mut self, _key: &str, _payload: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
    }

    #[test]
    fn operations_without_project_fail_cleanly() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        assert_eq!(
            store.create("", "a", true).unwrap_err(),
            TreeError::NotFound(String::new())
        );
        assert!(store.search("a").is_empty());
        assert!(store.find_children("").is_empty());
        assert!(store.export().is_err());
        assert!(!storage.contains("vibestudio-filesystem"));
    }

    #[test]
    fn create_project_selects_app_and_expands_src() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        assert_eq!(store.selected_file(), Some("src/App.tsx"));
        assert!(store.is_expanded("src"));
        assert_eq!(
            store.selected_node().and_then(Node::language),
            Some("typescriptreact")
        );
        assert!(storage.contains("vibestudio-filesystem"));
    }

    #[test]
    fn structural_changes_persist_but_content_edits_do_not() {
        let storage = MemoryStorage::new();
        let mut store = empty_project_store(&storage);
        store.create("", "notes.md", false).unwrap();
        let after_create = storage.get("vibestudio-filesystem").unwrap();

        store.update_content("notes.md", "draft").unwrap();
        assert_eq!(storage.get("vibestudio-filesystem").unwrap(), after_create);
        assert!(store.find("notes.md").unwrap().is_dirty);

        store.save_project().unwrap();
        assert!(!store.find("notes.md").unwrap().is_dirty);
        let restored = ProjectStore::open(storage.clone(), StoreConfig::default()).unwrap();
        assert_eq!(restored.find("notes.md").unwrap().content(), Some("draft"));
    }

    #[test]
    fn delete_clears_unrelated_selection() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        store.select_file("README.md");
        assert_eq!(store.delete("public").unwrap(), 2);
        assert_eq!(store.selected_file(), None);
        assert!(store.find("README.md").is_some());
    }

    #[test]
    fn delete_drops_expanded_entries_inside_subtree() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        store.create("src", "components", true).unwrap();
        store.toggle_expanded("src/components");
        store.toggle_expanded("public");
        store.delete("src").unwrap();
        let expanded: Vec<_> = store.expanded_folders().iter().cloned().collect();
        assert_eq!(expanded, vec!["public".to_string()]);
    }

    #[test]
    fn delete_missing_path_is_a_noop_failure() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        store.select_file("README.md");
        let before = store.project().cloned();
        assert_eq!(
            store.delete("ghost").unwrap_err(),
            TreeError::NotFound("ghost".into())
        );
        assert_eq!(store.project().cloned(), before);
        assert_eq!(store.selected_file(), Some("README.md"));
    }

    #[test]
    fn rename_and_move_carry_ui_index() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        store.create("src", "lib", true).unwrap();
        store.create("src/lib", "util.ts", false).unwrap();
        store.toggle_expanded("src/lib");
        store.select_file("src/lib/util.ts");

        assert_eq!(store.rename("src", "app").unwrap(), "app");
        assert!(store.is_expanded("app"));
        assert!(store.is_expanded("app/lib"));
        assert_eq!(store.selected_file(), Some("app/lib/util.ts"));

        assert_eq!(store.move_node("app/lib", "public").unwrap(), "public/lib");
        assert!(store.is_expanded("public/lib"));
        assert_eq!(store.selected_file(), Some("public/lib/util.ts"));
        assert_eq!(
            store.selected_node().and_then(Node::content).map(|c| c.is_empty()),
            Some(false)
        );
    }

    #[test]
    fn toggle_and_select_touch_only_ui_index() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        let tree_before = store.project().cloned();
        let persisted_before = storage.get("vibestudio-filesystem");

        assert!(!store.toggle_expanded("src"));
        assert!(store.toggle_expanded("src"));
        store.select_file("package.json");

        assert_eq!(store.project().cloned(), tree_before);
        assert_eq!(storage.get("vibestudio-filesystem"), persisted_before);

        store.flush().unwrap();
        let restored = ProjectStore::open(storage.clone(), StoreConfig::default()).unwrap();
        assert_eq!(restored.selected_file(), Some("package.json"));
        assert!(restored.is_expanded("src"));
    }

    #[test]
    fn subscribers_see_operations_in_order() {
        let storage = MemoryStorage::new();
        let mut store = empty_project_store(&storage);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |op| sink.borrow_mut().push((op.kind, op.path.clone())));

        store.create("", "a", true).unwrap();
        store.create("a", "x.ts", false).unwrap();
        store.update_content("a/x.ts", "1").unwrap();
        store.rename("a", "b").unwrap();
        assert!(store.create("", "b", true).is_err());
        store.delete("b").unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                (OperationKind::Create, "a".to_string()),
                (OperationKind::Create, "a/x.ts".to_string()),
                (OperationKind::Update, "a/x.ts".to_string()),
                (OperationKind::Rename, "b".to_string()),
                (OperationKind::Delete, "b".to_string()),
            ]
        );

        assert!(store.unsubscribe(id));
        store.create("", "c", true).unwrap();
        assert_eq!(seen.borrow().len(), 5);
    }

    #[test]
    fn failed_writes_keep_memory_state() {
        let mut store = ProjectStore::new(FailingStorage, StoreConfig::default());
        store.load_project(Project::new("Volatile", 0)).unwrap();
        store.create("", "kept.txt", false).unwrap();
        assert!(store.find("kept.txt").is_some());
        assert!(store.flush().is_err());
    }

    #[test]
    fn import_creates_folders_and_overwrites_files() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        let written = store
            .import(vec![
                ImportedFile::new("src/App.tsx", "replaced"),
                ImportedFile::new("docs/guide/intro.md", "# Intro"),
            ])
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.find("src/App.tsx").unwrap().content(), Some("replaced"));
        assert!(store.find("src/App.tsx").unwrap().is_dirty);
        assert!(store.find("docs/guide").unwrap().is_folder());
        assert_eq!(
            store.find("docs/guide/intro.md").unwrap().language(),
            Some("markdown")
        );
        store.project().unwrap().nodes.verify().unwrap();
    }

    #[test]
    fn import_is_all_or_nothing() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        let before = store.project().cloned();
        let err = store
            .import(vec![
                ImportedFile::new("fresh/ok.txt", "fine"),
                ImportedFile::new("package.json/nested.txt", "bad"),
            ])
            .unwrap_err();
        assert_eq!(err, TreeError::NotAFolder("package.json".into()));
        assert_eq!(store.project().cloned(), before);
        assert_eq!(store.import(Vec::<ImportedFile>::new()).unwrap(), 0);
    }

    #[test]
    fn dot_names_are_rejected() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        let before = store.project().cloned();

        for name in [".", ".."] {
            assert_eq!(
                store.create("", name, true).unwrap_err(),
                TreeError::NameInvalid(NameError::Reserved(name.to_string()))
            );
        }
        for path in ["./x.txt", "src/../x.txt", "lib/.."] {
            assert!(
                matches!(
                    store.import(vec![ImportedFile::new(path, "hi")]),
                    Err(TreeError::NameInvalid(NameError::Reserved(_)))
                ),
                "{path}"
            );
        }
        assert_eq!(store.project().cloned(), before);
    }

    #[test]
    fn close_project_clears_state_and_persists() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        store.toggle_expanded("public");
        store.close_project();

        assert!(store.project().is_none());
        assert!(store.expanded_folders().is_empty());
        assert_eq!(store.selected_file(), None);
        assert!(store.create("", "a", true).is_err());

        let reopened = ProjectStore::open(storage.clone(), StoreConfig::default()).unwrap();
        assert!(reopened.project().is_none());
        assert!(reopened.expanded_folders().is_empty());
        assert_eq!(reopened.selected_file(), None);
    }

    #[test]
    fn load_project_rejects_inconsistent_tree() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        let mut project = Project::scaffold("Broken", 0);
        project.settings.font_size = 500;
        store.load_project(project.clone()).unwrap();
        assert_eq!(store.project().unwrap().settings.font_size, 72);

        let mut text = serde_json::to_string(&project).unwrap();
        text = text.replacen("\"path\":\"src/App.tsx\"", "\"path\":\"lib/App.tsx\"", 1);
        let tampered: Project = serde_json::from_str(&text).unwrap();
        store.close_project();
        assert!(matches!(
            store.load_project(tampered),
            Err(TreeError::Inconsistent { .. })
        ));
        assert!(store.project().is_none());
    }

    #[test]
    fn open_clamps_persisted_settings() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        store.flush().unwrap();

        let key = StoreConfig::default().project_key;
        let text = String::from_utf8(storage.get(&key).unwrap()).unwrap();
        let mut raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        raw["project"]["settings"]["tab_size"] = serde_json::json!(0);
        let mut writer = storage.clone();
        writer
            .write(&key, &serde_json::to_vec(&raw).unwrap())
            .unwrap();

        let reopened = ProjectStore::open(storage.clone(), StoreConfig::default()).unwrap();
        assert_eq!(reopened.project().unwrap().settings.tab_size, 1);
    }

    #[test]
    fn update_settings_sanitizes() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_project("Demo");
        store
            .update_settings(|settings| settings.tab_size = 99)
            .unwrap();
        assert_eq!(store.project().unwrap().settings.tab_size, 16);
    }
}
