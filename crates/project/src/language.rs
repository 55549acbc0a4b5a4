//! Filename classification: editor language ids and coarse file categories.
//! 依檔名判斷編輯器語言與檔案類別。

/// Returns the lowercased text after the last `.`; a name without a dot is
/// returned whole (lowercased).
pub fn extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => name.to_ascii_lowercase(),
    }
}

/// Returns the name without its last extension.
pub fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Maps a filename to the language id understood by the editor.
/// 將檔名對應至編輯器的語言代號。
pub fn language_for_filename(name: &str) -> &'static str {
    match extension(name).as_str() {
        "js" | "mjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" => "typescript",
        "tsx" => "typescriptreact",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "json" => "json",
        "md" | "markdown" => "markdown",
        "py" => "python",
        "java" => "java",
        "cpp" | "cc" | "cxx" => "cpp",
        "c" => "c",
        "go" => "go",
        "rs" => "rust",
        "php" => "php",
        "rb" => "ruby",
        "swift" => "swift",
        "kt" => "kotlin",
        "xml" => "xml",
        "yaml" | "yml" => "yaml",
        "sql" => "sql",
        "sh" | "bash" => "shellscript",
        "ps1" => "powershell",
        "dockerfile" => "dockerfile",
        "vue" => "vue",
        "svelte" => "svelte",
        "r" => "r",
        "pl" => "perl",
        "lua" => "lua",
        "dart" => "dart",
        "elm" => "elm",
        "clj" | "cljs" => "clojure",
        "fs" | "fsx" => "fsharp",
        "vb" => "vb",
        "cs" => "csharp",
        "ini" | "cfg" | "conf" => "ini",
        "toml" => "toml",
        _ => "plaintext",
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "tar", "gz", "7z", "bz2", "xz"];
const CODE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "html", "htm", "css", "scss", "sass", "json", "py", "java", "cpp",
    "c", "go", "rs", "php", "rb", "swift", "kt", "xml", "yaml", "yml", "sql", "sh", "bash", "ps1",
    "vue", "svelte", "r", "pl", "lua", "dart", "elm", "clj", "cljs", "fs", "fsx", "vb", "cs",
];

fn has_extension_in(name: &str, set: &[&str]) -> bool {
    let ext = extension(name);
    set.contains(&ext.as_str())
}

pub fn is_image(name: &str) -> bool {
    has_extension_in(name, IMAGE_EXTENSIONS)
}

pub fn is_video(name: &str) -> bool {
    has_extension_in(name, VIDEO_EXTENSIONS)
}

pub fn is_audio(name: &str) -> bool {
    has_extension_in(name, AUDIO_EXTENSIONS)
}

pub fn is_archive(name: &str) -> bool {
    has_extension_in(name, ARCHIVE_EXTENSIONS)
}

pub fn is_code(name: &str) -> bool {
    has_extension_in(name, CODE_EXTENSIONS)
}

/// Formats a byte count with binary units (`B`, `KB`, ... `TB`).
/// 以二進位單位格式化位元組數。
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
