//! Virtual project file tree for VibeStudio: path algebra, starter content,
//! the tree itself, the project envelope and its durable storage.
//! VibeStudio 虛擬專案檔案樹：路徑運算、範本內容、樹狀結構、專案外殼與持久化。

mod util;

pub mod config;
pub mod export;
pub mod language;
pub mod path;
pub mod project;
pub mod storage;
pub mod store;
pub mod template;
pub mod tree;

pub use config::{ConfigError, StoreConfig, CONFIG_FILE, DEFAULT_PROJECT_KEY};
pub use export::{
    export_data_url, export_file_name, export_project, import_snapshot, ExportError,
    ImportedFile, EXPORT_EXTENSION,
};
pub use language::language_for_filename;
pub use path::{join_path, parent_of, validate_name, NameError};
pub use project::{Project, ProjectSettings, Theme};
pub use storage::{
    JsonFileStorage, MemoryStorage, PersistedState, ProjectStorage, StorageError,
};
pub use store::{FileOperation, OperationKind, ProjectStore, SubscriptionId};
pub use template::create_default_content;
pub use tree::{FileTree, Node, NodeKind, TreeError};
