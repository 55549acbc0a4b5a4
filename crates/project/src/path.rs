//! Path algebra for the virtual project tree.
//! 虛擬專案樹的路徑運算。
//!
//! Paths are `/`-joined node names with no leading separator; root-level
//! nodes have a path equal to their name.

use thiserror::Error;

/// Separator used between path segments.
pub const SEPARATOR: char = '/';

/// Longest accepted node name, in characters.
pub const MAX_NAME_LEN: usize = 255;

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Reasons a candidate node name is rejected.
/// 節點名稱不合法的原因。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name cannot be empty")]
    Empty,
    #[error("name too long ({len} characters, max {MAX_NAME_LEN})")]
    TooLong { len: usize },
    #[error("name contains invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("reserved name {0:?} not allowed")]
    Reserved(String),
}

/// Joins a parent path and a child name.
/// 組合父路徑與子節點名稱。
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Returns the parent path, or an empty string for root-level paths.
/// 取得父路徑；根層級節點回傳空字串。
pub fn parent_of(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Returns the last segment of a path.
pub fn file_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Returns `true` when `path` is `ancestor` itself or lives underneath it.
/// 判斷 `path` 是否位於 `ancestor` 之下（含自身）。
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Rebases `path` from under `old_prefix` to under `new_prefix`.
///
/// Returns `None` when `path` is not within `old_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if !is_within(path, old_prefix) {
        return None;
    }
    let rest = path[old_prefix.len()..].trim_start_matches(SEPARATOR);
    if rest.is_empty() {
        Some(new_prefix.to_string())
    } else {
        Some(join_path(new_prefix, rest))
    }
}

/// Validates a candidate file or folder name.
///
/// The rules are the portable intersection of common filesystems so an
/// exported project can later be written to a real disk.
/// 以跨檔案系統可攜的規則驗證名稱。
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong { len });
    }
    if let Some(ch) = name.chars().find(|ch| FORBIDDEN_CHARS.contains(ch)) {
        return Err(NameError::InvalidCharacter(ch));
    }
    if name == "." || name == ".." {
        return Err(NameError::Reserved(name.to_string()));
    }
    let upper = name.to_ascii_uppercase();
    if RESERVED_NAMES.contains(&upper.as_str()) {
        return Err(NameError::Reserved(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_handles_root_and_nested_parents() {
        assert_eq!(join_path("", "src"), "src");
        assert_eq!(join_path("src", "App.tsx"), "src/App.tsx");
        assert_eq!(join_path("a/b", "c.ts"), "a/b/c.ts");
    }

    #[test]
    fn parent_of_drops_last_segment() {
        assert_eq!(parent_of("a/b/c.ts"), "a/b");
        assert_eq!(parent_of("src"), "");
        assert_eq!(parent_of(""), "");
        assert_eq!(file_name("a/b/c.ts"), "c.ts");
        assert_eq!(file_name("README.md"), "README.md");
    }

    #[test]
    fn is_within_respects_segment_boundaries() {
        assert!(is_within("src/app", "src"));
        assert!(is_within("src", "src"));
        assert!(!is_within("srcs/app", "src"));
        assert!(!is_within("sr", "src"));
        assert!(is_within("anything", ""));
    }

    #[test]
    fn rebase_swaps_prefix() {
        assert_eq!(rebase("a/b/c.ts", "a", "z").as_deref(), Some("z/b/c.ts"));
        assert_eq!(rebase("a", "a", "z").as_deref(), Some("z"));
        assert_eq!(rebase("a/b", "a/b", "").as_deref(), Some(""));
        assert_eq!(rebase("ab/c", "a", "z"), None);
    }

    #[test]
    fn validate_name_rules() {
        assert!(validate_name("main.rs").is_ok());
        assert!(validate_name(".gitignore").is_ok());
        assert_eq!(validate_name("   "), Err(NameError::Empty));
        assert_eq!(validate_name(""), Err(NameError::Empty));
        assert_eq!(
            validate_name("a/b"),
            Err(NameError::InvalidCharacter('/'))
        );
        assert_eq!(
            validate_name("what?"),
            Err(NameError::InvalidCharacter('?'))
        );
        assert_eq!(
            validate_name("con"),
            Err(NameError::Reserved("con".to_string()))
        );
        assert_eq!(
            validate_name("Lpt9"),
            Err(NameError::Reserved("Lpt9".to_string()))
        );
        assert!(validate_name("COM10").is_ok());
        assert!(validate_name("con.txt").is_ok());
        assert_eq!(
            validate_name("."),
            Err(NameError::Reserved(".".to_string()))
        );
        assert_eq!(
            validate_name(".."),
            Err(NameError::Reserved("..".to_string()))
        );
        assert!(validate_name("...").is_ok());

        let long = "x".repeat(MAX_NAME_LEN);
        assert!(validate_name(&long).is_ok());
        let too_long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            validate_name(&too_long),
            Err(NameError::TooLong { len: 256 })
        );
    }
}
