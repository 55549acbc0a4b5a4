//! Project snapshots for download and re-import.
//! 專案快照的匯出與匯入。

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::project::Project;
use crate::tree::TreeError;

/// File extension used for exported projects.
pub const EXPORT_EXTENSION: &str = "vibestudio";

const EXPORT_MIME: &str = "application/json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize project: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("invalid project snapshot: {0}")]
    Invalid(#[source] serde_json::Error),
    #[error("snapshot tree is inconsistent: {0}")]
    Tree(#[from] TreeError),
}

/// Serialises the project as pretty-printed JSON.
/// 將專案序列化為格式化 JSON。
pub fn export_project(project: &Project) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec_pretty(project).map_err(ExportError::Serialize)
}

/// Suggested download name, `<project name>.vibestudio`.
pub fn export_file_name(project: &Project) -> String {
    format!("{}.{EXPORT_EXTENSION}", project.name)
}

/// Encodes the snapshot as a `data:` URL usable as a download link target.
pub fn export_data_url(project: &Project) -> Result<String, ExportError> {
    let bytes = export_project(project)?;
    Ok(format!("data:{EXPORT_MIME};base64,{}", BASE64.encode(bytes)))
}

/// Parses a snapshot produced by [`export_project`] and checks its tree.
/// 解析匯出的快照並驗證樹狀結構。
pub fn import_snapshot(bytes: &[u8]) -> Result<Project, ExportError> {
    let mut project: Project = serde_json::from_slice(bytes).map_err(ExportError::Invalid)?;
    project.validate()?;
    Ok(project)
}

/// A file to merge into an open project, addressed by a `/`-separated path
/// relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    pub path: String,
    pub content: String,
}

impl ImportedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}
