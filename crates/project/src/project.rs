//! Project envelope: metadata bound to a file tree.
//! 專案外殼：綁定檔案樹與其中繼資料。

use serde::{Deserialize, Serialize};

use crate::template::{create_default_content, readme_content};
use crate::tree::{FileTree, Node, NodeKind, TreeError};

/// Path selected when a project is first scaffolded.
pub const SCAFFOLD_SELECTION: &str = "src/App.tsx";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// Per-project editor settings.
/// 專案層級的編輯器設定。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectSettings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_tab_size")]
    pub tab_size: u32,
    #[serde(default = "default_true")]
    pub word_wrap: bool,
    #[serde(default = "default_true")]
    pub minimap: bool,
    #[serde(default)]
    pub auto_save: bool,
    #[serde(default)]
    pub format_on_save: bool,
}

fn default_font_size() -> u32 {
    14
}

fn default_tab_size() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_size: default_font_size(),
            tab_size: default_tab_size(),
            word_wrap: true,
            minimap: true,
            auto_save: false,
            format_on_save: false,
        }
    }
}

impl ProjectSettings {
    pub fn sanitize(&mut self) {
        self.font_size = self.font_size.clamp(8, 72);
        self.tab_size = self.tab_size.clamp(1, 16);
    }
}

/// A named project and its tree.
/// 具名專案及其檔案樹。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub root_path: String,
    #[serde(default)]
    pub last_modified_ms: i64,
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub nodes: FileTree,
}

impl Project {
    /// Creates an empty project.
    pub fn new(name: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: now_ms.to_string(),
            name: name.into(),
            root_path: String::new(),
            last_modified_ms: now_ms,
            settings: ProjectSettings::default(),
            nodes: FileTree::new(),
        }
    }

    /// Creates a project holding the starter layout: `src/` with an app
    /// entry point and stylesheet, `public/index.html`, `package.json` and a
    /// `README.md`.
    /// 建立含預設起始結構的新專案。
    pub fn scaffold(name: impl Into<String>, now_ms: i64) -> Self {
        let mut project = Self::new(name, now_ms);

        let starter_file = |parent: &str, file_name: &str| {
            Node::file(parent, file_name, create_default_content(file_name), now_ms)
        };

        let mut src = Node::folder("", "src", now_ms);
        src.kind = NodeKind::Folder {
            children: vec![
                starter_file("src", "App.tsx"),
                starter_file("src", "main.tsx"),
                starter_file("src", "index.css"),
            ],
            is_expanded: true,
        };

        let mut public = Node::folder("", "public", now_ms);
        public.kind = NodeKind::Folder {
            children: vec![starter_file("public", "index.html")],
            is_expanded: false,
        };

        let readme = Node::file("", "README.md", readme_content(&project.name), now_ms);

        project.nodes = FileTree::from_roots(vec![
            src,
            public,
            starter_file("", "package.json"),
            readme,
        ]);
        project
    }

    /// Stamps the modification time.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_modified_ms = now_ms;
    }

    /// Checks a project that came from outside the store: every node must sit
    /// at the path its position implies, and settings are clamped.
    pub fn validate(&mut self) -> Result<(), TreeError> {
        self.nodes.verify()?;
        self.settings.sanitize();
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn file_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_file()).count()
    }

    pub fn folder_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_folder()).count()
    }

    /// Folder paths whose node carries the expansion hint.
    pub fn expanded_hints(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Folder { is_expanded: true, .. }))
            .map(|node| node.path.clone())
            .collect()
    }
}
