use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use syntax_cursor::commands::ESCAPE;
use syntax_cursor::hints::{collect_targets, Alphabet};
use syntax_cursor::ts::lang;
use syntax_cursor::{
    logging, vertical_step, Buffer, ByteSpan, Config, Direction, DocumentParser, Engine,
    RecordingHost, SupportLang, VerticalPolicy,
};
use tracing::debug;
use tree_sitter::{Node, Point};

#[derive(Parser)]
#[command(name = "syntax-cursor")]
#[command(about = "Navigate and edit source files by syntax node", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults apply without one)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Language name, overriding detection by file extension
    #[arg(short, long, global = true)]
    lang: Option<String>,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the named nodes of a file as an indented tree
    Outline {
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the labeled hint targets of a jump kind
    Hints {
        file: PathBuf,

        /// Jump kind key, as bound in the configuration
        #[arg(short, long)]
        kind: char,

        /// Cursor position as row:col (0-based); targets are ranked by
        /// distance from it
        #[arg(long, value_parser = parse_point)]
        cursor: Option<Point>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print where a vertical step lands
    Step {
        file: PathBuf,

        /// Byte offset; the step starts from the outermost node starting here
        #[arg(long)]
        at: usize,

        /// Step backward instead of forward
        #[arg(long)]
        up: bool,

        /// Traversal policy (defaults to the configured one)
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
    },

    /// Replay a keystroke script and print the resulting document
    Run {
        file: PathBuf,

        /// Keys to replay; `<esc>` stands for Escape
        #[arg(short, long)]
        keys: String,

        /// Byte offset of the initial focus
        #[arg(long, default_value_t = 0)]
        at: usize,

        /// Save the result back to the file
        #[arg(short, long)]
        write: bool,

        /// Show a unified diff instead of the whole document
        #[arg(short, long)]
        diff: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Plain,
    Line,
}

impl From<PolicyArg> for VerticalPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Plain => VerticalPolicy::Plain,
            PolicyArg::Line => VerticalPolicy::Line,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let config = load_config(cli.config.as_deref())?;
    let lang = cli.lang.as_deref();

    match cli.command {
        Commands::Outline { file, json } => cmd_outline(&file, lang, json),

        Commands::Hints {
            file,
            kind,
            cursor,
            json,
        } => cmd_hints(&file, lang, &config, kind, cursor, json),

        Commands::Step {
            file,
            at,
            up,
            policy,
        } => {
            let policy = policy.map_or(config.navigation.vertical, VerticalPolicy::from);
            cmd_step(&file, lang, at, up, policy)
        }

        Commands::Run {
            file,
            keys,
            at,
            write,
            diff,
        } => cmd_run(&file, lang, config, &keys, at, write, diff),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(syntax_cursor::load_from_path(path)?),
        None => Ok(Config::default()),
    }
}

/// Read a source file and pick its grammar.
fn open(file: &Path, lang_name: Option<&str>) -> Result<(String, SupportLang)> {
    let text =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let lang = match lang_name {
        Some(name) => lang::from_name(name)?,
        None => lang::from_path(file)?,
    };
    debug!(file = %file.display(), ?lang, "opened");
    Ok((text, lang))
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (row, column) = value
        .split_once(':')
        .ok_or_else(|| format!("expected row:col, got '{value}'"))?;
    let row = row.trim().parse().map_err(|_| format!("bad row '{row}'"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|_| format!("bad column '{column}'"))?;
    Ok(Point { row, column })
}

#[derive(Serialize)]
struct OutlineEntry {
    kind: String,
    depth: usize,
    span: ByteSpan,
    row: usize,
    column: usize,
}

fn collect_outline(node: Node<'_>, depth: usize, out: &mut Vec<OutlineEntry>) {
    out.push(OutlineEntry {
        kind: node.kind().to_string(),
        depth,
        span: ByteSpan::of(node),
        row: node.start_position().row,
        column: node.start_position().column,
    });
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_outline(child, depth + 1, out);
    }
}

fn cmd_outline(file: &Path, lang: Option<&str>, json: bool) -> Result<()> {
    let (text, lang) = open(file, lang)?;
    let tree = DocumentParser::new(lang)?.parse(&text)?;

    let mut entries = Vec::new();
    collect_outline(tree.root_node(), 0, &mut entries);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{}{} {}",
            "  ".repeat(entry.depth),
            entry.kind,
            format!("[{}]", entry.span).dimmed()
        );
    }
    if tree.has_errors() {
        eprintln!(
            "{}",
            format!("Warning: {} has syntax errors", file.display()).yellow()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct HintEntry {
    label: String,
    kind: String,
    span: ByteSpan,
    text: String,
}

fn cmd_hints(
    file: &Path,
    lang: Option<&str>,
    config: &Config,
    key: char,
    cursor: Option<Point>,
    json: bool,
) -> Result<()> {
    let (text, lang) = open(file, lang)?;
    let tree = DocumentParser::new(lang)?.parse(&text)?;

    let jump = config
        .jump_for(key)
        .with_context(|| format!("No jump kind bound to '{key}'"))?;
    let source = jump
        .source()
        .with_context(|| format!("Jump kind '{key}' has no single target source"))?;
    let alphabet = Alphabet::new(&config.hints.alphabet)?;

    let mut host = RecordingHost::new(text.as_str());
    if let Some(cursor) = cursor {
        host = host.with_cursor(cursor);
    }

    let targets = collect_targets(&host, &tree, &text, lang, &source, None, &alphabet)?;
    let entries: Vec<HintEntry> = targets
        .iter()
        .map(|target| HintEntry {
            label: target.label.clone(),
            kind: target.node.kind().to_string(),
            span: target.span(),
            text: text[target.node.byte_range()].to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No targets".dimmed());
        return Ok(());
    }
    for entry in &entries {
        let first_line = entry.text.lines().next().unwrap_or("");
        println!(
            "{:<3} {} {} {}",
            entry.label.bold(),
            entry.kind,
            format!("[{}]", entry.span).dimmed(),
            first_line
        );
    }
    Ok(())
}

fn cmd_step(
    file: &Path,
    lang: Option<&str>,
    at: usize,
    up: bool,
    policy: VerticalPolicy,
) -> Result<()> {
    let (text, lang) = open(file, lang)?;
    let buffer = Buffer::new(lang, text)?;

    let origin = buffer
        .outermost_node_at(at)
        .with_context(|| format!("No named node starts at byte {at}"))?;
    let direction = if up {
        Direction::Backward
    } else {
        Direction::Forward
    };

    match vertical_step(direction, origin, policy) {
        Some(target) => println!("{} [{}]", target.kind(), ByteSpan::of(target)),
        None => println!("{}", "No target".dimmed()),
    }
    Ok(())
}

fn cmd_run(
    file: &Path,
    lang: Option<&str>,
    config: Config,
    keys: &str,
    at: usize,
    write: bool,
    show_diff: bool,
) -> Result<()> {
    let (original, lang) = open(file, lang)?;
    let buffer = Buffer::new(lang, original.as_str())?;
    let mut engine = Engine::new(buffer, RecordingHost::new(original.as_str()), config)?;

    if !engine.focus_at(at) {
        anyhow::bail!("No named node starts at byte {at}");
    }

    let keys = keys.replace("<esc>", &ESCAPE.to_string());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start runtime")?;
    let exit = runtime.block_on(engine.replay(&keys));
    debug!(?exit, "replay finished");

    let modified = engine.buffer().text();

    if show_diff {
        display_diff(file, &original, modified);
    } else if !write {
        print!("{modified}");
    }

    if write && modified != original {
        atomic_write(file, modified.as_bytes())
            .with_context(|| format!("Failed to write {}", file.display()))?;
        eprintln!("{} {}", "Wrote".green(), file.display());
    }
    Ok(())
}

/// Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

/// Tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
