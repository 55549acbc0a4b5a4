use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use vibestudio_project::{
    export_file_name, ImportedFile, JsonFileStorage, Node, Project, ProjectStore, StoreConfig,
};
use walkdir::{DirEntry, WalkDir};

/// Directory, relative to the workspace, holding persisted state and config.
const STATE_DIR: &str = ".vibestudio";

#[derive(Parser)]
#[command(
    name = "vibestudio-cli",
    about = "Manage the VibeStudio virtual project tree",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 建立新專案（覆寫目前專案）。 / Create a new starter project, replacing the current one.
    New(NewArgs),
    /// 顯示專案樹。 / Print the project tree.
    Tree,
    /// 新增檔案或資料夾。 / Create a file or folder.
    Create(CreateArgs),
    /// 刪除節點及其子樹。 / Delete a node and its subtree.
    Rm(PathArg),
    /// 重新命名節點。 / Rename a node.
    Rename(RenameArgs),
    /// 搬移節點至資料夾。 / Move a node into a folder.
    Mv(MoveArgs),
    /// 輸出檔案內容。 / Print a file's content.
    Cat(PathArg),
    /// 寫入檔案內容並儲存專案。 / Replace a file's content and save the project.
    Write(WriteArgs),
    /// 依名稱搜尋節點。 / Search nodes by name.
    Search(SearchArgs),
    /// 匯出專案快照。 / Export a project snapshot.
    Export(ExportArgs),
    /// 從磁碟資料夾匯入檔案。 / Import files from a directory on disk.
    Import(ImportArgs),
    /// 選取檔案。 / Select a file.
    Select(PathArg),
    /// 切換資料夾展開狀態。 / Toggle a folder's expanded state.
    Toggle(PathArg),
}

impl Commands {
    fn mutates(&self) -> bool {
        !matches!(
            self,
            Commands::Tree | Commands::Cat(_) | Commands::Search(_) | Commands::Export(_)
        )
    }
}

#[derive(Args)]
struct NewArgs {
    /// 專案名稱。 / Project name.
    name: String,
}

#[derive(Args)]
struct PathArg {
    /// 專案內路徑。 / Path inside the project.
    #[arg(value_name = "PATH")]
    path: String,
}

#[derive(Args)]
struct CreateArgs {
    /// 父資料夾路徑；根層級使用 "" 或 "/"。 / Parent folder ("" or "/" for the root level).
    #[arg(value_name = "PARENT")]
    parent: String,
    /// 新節點名稱。 / Name of the new node.
    #[arg(value_name = "NAME")]
    name: String,
    /// 建立資料夾而非檔案。 / Create a folder instead of a file.
    #[arg(long)]
    folder: bool,
}

#[derive(Args)]
struct RenameArgs {
    #[arg(value_name = "PATH")]
    path: String,
    #[arg(value_name = "NEW_NAME")]
    new_name: String,
}

#[derive(Args)]
struct MoveArgs {
    #[arg(value_name = "FROM")]
    from: String,
    /// 目標資料夾；根層級使用 "" 或 "/"。 / Destination folder ("" or "/" for the root level).
    #[arg(value_name = "TO")]
    to: String,
}

#[derive(Args)]
struct WriteArgs {
    #[arg(value_name = "PATH")]
    path: String,
    /// 直接提供內容。 / Content given inline.
    #[arg(long, conflicts_with = "from_file", required_unless_present = "from_file")]
    content: Option<String>,
    /// 從檔案讀取內容。 / Read content from a file.
    #[arg(long, value_name = "FILE")]
    from_file: Option<PathBuf>,
}

#[derive(Args)]
struct SearchArgs {
    /// 不分大小寫的名稱片段。 / Case-insensitive name fragment.
    query: String,
}

#[derive(Args)]
struct ExportArgs {
    /// 輸出檔案；省略時輸出到標準輸出。 / Destination file; stdout when omitted.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ImportArgs {
    /// 來源資料夾。 / Source directory.
    #[arg(value_name = "DIR")]
    source: PathBuf,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

fn run() -> Result<()> {
    let Cli { workspace, command } = Cli::parse();
    let workspace_root = resolve_workspace(workspace)?;
    let mut store = open_store(&workspace_root)?;
    let mutates = command.mutates();

    match command {
        Commands::New(args) => {
            store.create_project(args.name.as_str());
            let project = require_project(&store)?;
            println!(
                "Created project '{}' ({} files, {} folders)",
                project.name,
                project.file_count(),
                project.folder_count()
            );
        }
        Commands::Tree => print_tree(&store)?,
        Commands::Create(args) => {
            require_project(&store)?;
            let node = store.create(&normalize(&args.parent), &args.name, args.folder)?;
            let kind = if node.is_folder() { "folder" } else { "file" };
            println!("Created {kind} {}", node.path);
        }
        Commands::Rm(args) => {
            require_project(&store)?;
            let removed = store.delete(&normalize(&args.path))?;
            println!("Deleted {removed} node(s)");
        }
        Commands::Rename(args) => {
            require_project(&store)?;
            let path = normalize(&args.path);
            let new_path = store.rename(&path, &args.new_name)?;
            println!("Renamed {path} -> {new_path}");
        }
        Commands::Mv(args) => {
            require_project(&store)?;
            let from = normalize(&args.from);
            let new_path = store.move_node(&from, &normalize(&args.to))?;
            println!("Moved {from} -> {new_path}");
        }
        Commands::Cat(args) => {
            require_project(&store)?;
            let path = normalize(&args.path);
            let Some(node) = store.find(&path) else {
                bail!("no node at '{path}'");
            };
            match node.content() {
                Some(content) => print!("{content}"),
                None => bail!("'{path}' is a folder"),
            }
        }
        Commands::Write(args) => execute_write(&mut store, args)?,
        Commands::Search(args) => execute_search(&store, &args.query)?,
        Commands::Export(args) => execute_export(&store, args)?,
        Commands::Import(args) => execute_import(&mut store, &args.source)?,
        Commands::Select(args) => {
            require_project(&store)?;
            let path = normalize(&args.path);
            if store.find(&path).is_none() {
                bail!("no node at '{path}'");
            }
            store.select_file(&path);
            println!("Selected {path}");
        }
        Commands::Toggle(args) => {
            require_project(&store)?;
            let path = normalize(&args.path);
            match store.find(&path) {
                Some(node) if node.is_folder() => {}
                Some(_) => bail!("'{path}' is not a folder"),
                None => bail!("no node at '{path}'"),
            }
            let expanded = store.toggle_expanded(&path);
            let state = if expanded { "expanded" } else { "collapsed" };
            println!("{path} {state}");
        }
    }

    // Store writes are best effort; flush reports failures.
    if mutates {
        store.flush().context("failed to persist project state")?;
    }
    Ok(())
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => {
            if path.is_absolute() {
                Ok(path)
            } else {
                Ok(std::env::current_dir()
                    .context("determine current directory")?
                    .join(path))
            }
        }
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn open_store(workspace_root: &Path) -> Result<ProjectStore> {
    let state_dir = workspace_root.join(STATE_DIR);
    let config = StoreConfig::load(&state_dir)?;
    ProjectStore::open(JsonFileStorage::new(&state_dir), config)
        .with_context(|| format!("failed to open project state in {}", state_dir.display()))
}

fn require_project(store: &ProjectStore) -> Result<&Project> {
    match store.project() {
        Some(project) => Ok(project),
        None => bail!("no project found; run `vibestudio-cli new <NAME>` first"),
    }
}

/// Accepts `""`, `"/"` and `"."` for the root level and strips stray slashes.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn print_tree(store: &ProjectStore) -> Result<()> {
    let project = require_project(store)?;
    println!("{}", project.name);
    for node in project.nodes.roots() {
        print_node(store, node, 1);
    }
    Ok(())
}

fn print_node(store: &ProjectStore, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = if store.selected_file() == Some(node.path.as_str()) {
        " *"
    } else {
        ""
    };
    if node.is_folder() {
        println!("{indent}{}/{marker}", node.name);
        if store.is_expanded(&node.path) {
            for child in node.children() {
                print_node(store, child, depth + 1);
            }
        } else if !node.children().is_empty() {
            println!("{indent}  ...");
        }
    } else {
        let dirty = if node.is_dirty { " (modified)" } else { "" };
        println!("{indent}{}{dirty}{marker}", node.name);
    }
}

fn execute_write(store: &mut ProjectStore, args: WriteArgs) -> Result<()> {
    require_project(store)?;
    let content = match (args.content, args.from_file) {
        (Some(content), _) => content,
        (None, Some(file)) => fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?,
        (None, None) => bail!("either --content or --from-file is required"),
    };
    let path = normalize(&args.path);
    store.update_content(&path, content)?;
    store.save_project()?;
    println!("Saved {path}");
    Ok(())
}

fn execute_search(store: &ProjectStore, query: &str) -> Result<()> {
    require_project(store)?;
    let results = store.search(query);
    if results.is_empty() {
        println!("No matches found.");
        return Ok(());
    }
    println!("Search \"{query}\" ({} matches)", results.len());
    for node in results {
        let suffix = if node.is_folder() { "/" } else { "" };
        println!("  {}{suffix}", node.path);
    }
    Ok(())
}

fn execute_export(store: &ProjectStore, args: ExportArgs) -> Result<()> {
    let project = require_project(store)?;
    let bytes = store.export()?;
    match args.output {
        Some(output) => {
            let output = if output.is_dir() {
                output.join(export_file_name(project))
            } else {
                output
            };
            fs::write(&output, &bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Exported '{}' to {}", project.name, output.display());
        }
        None => println!("{}", String::from_utf8_lossy(&bytes)),
    }
    Ok(())
}

fn execute_import(store: &mut ProjectStore, source: &Path) -> Result<()> {
    require_project(store)?;
    if !source.is_dir() {
        bail!("import source '{}' is not a directory", source.display());
    }
    let files = collect_import_files(source)?;
    debug!(source = %source.display(), files = files.len(), "collected import files");
    if files.is_empty() {
        println!("No files to import.");
        return Ok(());
    }
    let written = store.import(files)?;
    println!("Imported {written} file(s) from {}", source.display());
    Ok(())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn collect_import_files(source: &Path) -> Result<Vec<ImportedFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(source = %source.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("{} is outside {}", entry.path().display(), source.display()))?;
        let project_path = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        match fs::read_to_string(entry.path()) {
            Ok(content) => files.push(ImportedFile::new(project_path, content)),
            Err(err) => warn!(path = %entry.path().display(), error = %err, "skipping non-text file"),
        }
    }
    Ok(files)
}
