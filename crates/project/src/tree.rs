//! In-memory project tree: an ordered forest of file and folder nodes.
//! 記憶體中的專案樹：由檔案與資料夾節點組成的有序樹林。
//!
//! Ownership only flows downward (folders own their children), so a cycle
//! cannot be represented. Every node's `path` equals its parent's path joined
//! with its `name`, and `id` always equals `path`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::language_for_filename;
use crate::path::{is_within, join_path, parent_of, validate_name, NameError};
use crate::template::create_default_content;

/// Payload that differs between files and folders.
/// 檔案與資料夾各自的內容。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeKind {
    File {
        content: String,
        language: String,
    },
    Folder {
        #[serde(default)]
        children: Vec<Node>,
        /// Expansion hint used to seed the UI index when a project is loaded
        /// without persisted UI state.
        #[serde(default)]
        is_expanded: bool,
    },
}

/// A file or folder entry in the tree.
/// 專案樹中的檔案或資料夾節點。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub kind: NodeKind,
    #[serde(default)]
    pub is_dirty: bool,
    #[serde(default)]
    pub last_modified_ms: i64,
}

impl Node {
    /// Builds a file under `parent` with the given content.
    pub fn file(parent: &str, name: &str, content: String, now_ms: i64) -> Self {
        let path = join_path(parent, name);
        Self {
            id: path.clone(),
            name: name.to_string(),
            path,
            parent_id: parent_id_for(parent),
            kind: NodeKind::File {
                content,
                language: language_for_filename(name).to_string(),
            },
            is_dirty: false,
            last_modified_ms: now_ms,
        }
    }

    /// Builds an empty, collapsed folder under `parent`.
    pub fn folder(parent: &str, name: &str, now_ms: i64) -> Self {
        let path = join_path(parent, name);
        Self {
            id: path.clone(),
            name: name.to_string(),
            path,
            parent_id: parent_id_for(parent),
            kind: NodeKind::Folder {
                children: Vec::new(),
                is_expanded: false,
            },
            is_dirty: false,
            last_modified_ms: now_ms,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn is_file(&self) -> bool {
        !self.is_folder()
    }

    /// Direct children; always empty for files.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Folder { children, .. } => children,
            NodeKind::File { .. } => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Folder { children, .. } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content, .. } => Some(content),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { language, .. } => Some(language),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Pre-order iterator over this node and everything beneath it.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Number of nodes strictly beneath this one.
    pub fn descendant_count(&self) -> usize {
        self.iter().count() - 1
    }

    /// Returns `true` when `path` names this node or one of its descendants,
    /// found by walking children rather than comparing prefixes.
    pub fn subtree_contains(&self, path: &str) -> bool {
        self.iter().any(|node| node.path == path)
    }

    /// Re-derives `path`, `id` and `parent_id` for this subtree from `parent`.
    fn relabel(&mut self, parent: &str) {
        self.path = join_path(parent, &self.name);
        self.id = self.path.clone();
        self.parent_id = parent_id_for(parent);
        let path = self.path.clone();
        if let Some(children) = self.children_mut() {
            for child in children {
                child.relabel(&path);
            }
        }
    }

    fn for_each_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.for_each_mut(f);
            }
        }
    }
}

fn parent_id_for(parent: &str) -> Option<String> {
    if parent.is_empty() {
        None
    } else {
        Some(parent.to_string())
    }
}

/// Pre-order, depth-first traversal.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Tree-manipulation errors.
/// 專案樹操作錯誤類型。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("invalid name: {0}")]
    NameInvalid(#[from] NameError),
    #[error("a node already exists at {0:?}")]
    PathCollision(String),
    #[error("no node at {0:?}")]
    NotFound(String),
    #[error("cannot move {from:?} into its own subtree at {to:?}")]
    CycleViolation { from: String, to: String },
    #[error("{0:?} is not a folder")]
    NotAFolder(String),
    #[error("{0:?} is not a file")]
    NotAFile(String),
    #[error("node at {path:?} should be at {expected:?}")]
    Inconsistent { path: String, expected: String },
}

/// Ordered forest of root-level nodes.
/// 根層級節點的有序集合。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FileTree {
    roots: Vec<Node>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps pre-built root nodes. Call [`FileTree::verify`] when the nodes
    /// come from an untrusted source.
    pub fn from_roots(roots: Vec<Node>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order traversal of the whole forest.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Finds a node by exact path.
    /// 依完整路徑尋找節點。
    pub fn find(&self, path: &str) -> Option<&Node> {
        find_in(&self.roots, path)
    }

    /// Direct children of `folder_path` (the roots for an empty path).
    /// Files and unknown paths yield an empty slice.
    pub fn find_children(&self, folder_path: &str) -> &[Node] {
        if folder_path.is_empty() {
            return &self.roots;
        }
        self.find(folder_path).map(Node::children).unwrap_or(&[])
    }

    /// Every node whose name contains `query`, ignoring case, in pre-order.
    /// 以不分大小寫方式搜尋名稱包含 `query` 的節點。
    pub fn search(&self, query: &str) -> Vec<&Node> {
        let needle = query.to_lowercase();
        self.iter()
            .filter(|node| node.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Creates a file (with templated content) or an empty folder.
    /// 在父節點下建立檔案或資料夾。
    pub fn create(
        &mut self,
        parent: &str,
        name: &str,
        is_folder: bool,
        now_ms: i64,
    ) -> Result<&Node, TreeError> {
        validate_name(name)?;
        let path = join_path(parent, name);
        if self.find(&path).is_some() {
            return Err(TreeError::PathCollision(path));
        }
        let node = if is_folder {
            Node::folder(parent, name, now_ms)
        } else {
            Node::file(parent, name, create_default_content(name), now_ms)
        };
        let siblings = self.siblings_mut(parent)?;
        siblings.push(node);
        Ok(&siblings[siblings.len() - 1])
    }

    /// Inserts a pre-built node under `parent`, relabelling its subtree.
    pub fn insert(&mut self, parent: &str, mut node: Node) -> Result<&Node, TreeError> {
        validate_name(&node.name)?;
        let path = join_path(parent, &node.name);
        if self.find(&path).is_some() {
            return Err(TreeError::PathCollision(path));
        }
        node.relabel(parent);
        let siblings = self.siblings_mut(parent)?;
        siblings.push(node);
        Ok(&siblings[siblings.len() - 1])
    }

    /// Removes the node at `path` together with its subtree.
    pub fn remove(&mut self, path: &str) -> Result<Node, TreeError> {
        self.detach(path).map(|(node, _)| node)
    }

    /// Renames the node at `path`, rewriting every descendant path.
    /// Returns the new path.
    /// 重新命名節點並同步更新所有子孫路徑。
    pub fn rename(&mut self, path: &str, new_name: &str) -> Result<String, TreeError> {
        validate_name(new_name)?;
        if self.find(path).is_none() {
            return Err(TreeError::NotFound(path.to_string()));
        }
        let parent = parent_of(path);
        let new_path = join_path(parent, new_name);
        if new_path == path {
            return Ok(new_path);
        }
        if self.find(&new_path).is_some() {
            return Err(TreeError::PathCollision(new_path));
        }
        let node = find_in_mut(&mut self.roots, path)
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?;
        node.name = new_name.to_string();
        node.relabel(parent);
        Ok(new_path)
    }

    /// Moves the subtree at `from` into the folder `to` (empty for the root
    /// level), keeping its name. Returns the new path.
    /// 將子樹搬移至目標資料夾。
    pub fn move_node(&mut self, from: &str, to: &str) -> Result<String, TreeError> {
        let node = self
            .find(from)
            .ok_or_else(|| TreeError::NotFound(from.to_string()))?;
        if !to.is_empty() && node.subtree_contains(to) {
            return Err(TreeError::CycleViolation {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let new_path = join_path(to, &node.name);
        if !to.is_empty() {
            let target = self
                .find(to)
                .ok_or_else(|| TreeError::NotFound(to.to_string()))?;
            if !target.is_folder() {
                return Err(TreeError::NotAFolder(to.to_string()));
            }
        }
        if parent_of(from) == to {
            return Ok(new_path);
        }
        if self.find(&new_path).is_some() {
            return Err(TreeError::PathCollision(new_path));
        }

        let (mut node, index) = self.detach(from)?;
        node.relabel(to);
        match self.siblings_mut(to) {
            Ok(siblings) => {
                siblings.push(node);
                Ok(new_path)
            }
            Err(err) => {
                let old_parent = parent_of(from);
                node.relabel(old_parent);
                self.siblings_mut(old_parent)?.insert(index, node);
                Err(err)
            }
        }
    }

    /// Replaces a file's content, marking it dirty.
    pub fn update_content(
        &mut self,
        path: &str,
        new_content: String,
        now_ms: i64,
    ) -> Result<(), TreeError> {
        let node = find_in_mut(&mut self.roots, path)
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?;
        match &mut node.kind {
            NodeKind::File { content, .. } => *content = new_content,
            NodeKind::Folder { .. } => return Err(TreeError::NotAFile(path.to_string())),
        }
        node.is_dirty = true;
        node.last_modified_ms = now_ms;
        Ok(())
    }

    /// Clears the dirty flag on every node.
    pub fn mark_all_clean(&mut self) {
        for root in &mut self.roots {
            root.for_each_mut(&mut |node: &mut Node| node.is_dirty = false);
        }
    }

    /// Checks the structural invariants: names valid, sibling names unique,
    /// `path`/`id`/`parent_id` derived from position, file/folder payloads.
    /// 檢查樹狀結構的不變條件。
    pub fn verify(&self) -> Result<(), TreeError> {
        verify_level(&self.roots, "")
    }

    fn siblings_mut(&mut self, parent: &str) -> Result<&mut Vec<Node>, TreeError> {
        if parent.is_empty() {
            return Ok(&mut self.roots);
        }
        let node = find_in_mut(&mut self.roots, parent)
            .ok_or_else(|| TreeError::NotFound(parent.to_string()))?;
        node.children_mut()
            .ok_or_else(|| TreeError::NotAFolder(parent.to_string()))
    }

    fn detach(&mut self, path: &str) -> Result<(Node, usize), TreeError> {
        let not_found = || TreeError::NotFound(path.to_string());
        let siblings = self
            .siblings_mut(parent_of(path))
            .map_err(|_| not_found())?;
        let index = siblings
            .iter()
            .position(|node| node.path == path)
            .ok_or_else(not_found)?;
        Ok((siblings.remove(index), index))
    }
}

fn find_in<'a>(nodes: &'a [Node], path: &str) -> Option<&'a Node> {
    for node in nodes {
        if node.path == path {
            return Some(node);
        }
        if is_within(path, &node.path) {
            return find_in(node.children(), path);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [Node], path: &str) -> Option<&'a mut Node> {
    for node in nodes.iter_mut() {
        if node.path == path {
            return Some(node);
        }
        if is_within(path, &node.path) {
            return node
                .children_mut()
                .and_then(|children| find_in_mut(children, path));
        }
    }
    None
}

fn verify_level(nodes: &[Node], parent: &str) -> Result<(), TreeError> {
    let mut names = HashSet::with_capacity(nodes.len());
    for node in nodes {
        validate_name(&node.name)?;
        let expected = join_path(parent, &node.name);
        if node.path != expected || node.id != expected || node.parent_id != parent_id_for(parent)
        {
            return Err(TreeError::Inconsistent {
                path: node.path.clone(),
                expected,
            });
        }
        if !names.insert(node.name.as_str()) {
            return Err(TreeError::PathCollision(expected));
        }
        verify_level(node.children(), &node.path)?;
    }
    Ok(())
}
