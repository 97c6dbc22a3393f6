//! `locview`: inspect game localization assets from the command line.
//!
//! Every subcommand prints one JSON document on stdout; logs go to stderr.

pub mod bridge;
pub mod config;
pub mod discover;
pub mod loading;
pub mod orchestrate;
pub mod session;
pub mod workspace_state;

pub use bridge::BridgeProcess;
pub use config::{AppConfig, ConfigStore, CONFIG_ENV};
pub use loading::{LoadKind, LoadingFlags, LoadingGuard};
pub use orchestrate::MdbTable;
pub use session::Session;
pub use workspace_state::{WorkspaceState, WorkspaceStore};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use locview_protocol::{serialize_json_pretty, TreeNode};
use locview_tree::navigate::{self, NodeRef};
use serde::Serialize;
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    print_stdout(&serialize_json_pretty(value)?)
}

#[derive(Parser)]
#[command(name = "locview")]
#[command(about = "Inspect game localization assets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (overrides LOCVIEW_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or update the stored configuration
    Config(ConfigArgs),

    /// Look for a Steam install of the game
    Detect(DetectArgs),

    /// Resolve a logical asset name to its storage location
    Locate(LocateArgs),

    /// Extract a story timeline (and optionally its voice lines)
    Story(StoryArgs),

    /// List stories from the master database and extracted files
    Stories(StoriesArgs),

    /// Song lyrics
    Lyrics {
        #[command(subcommand)]
        action: AssetAction,
    },

    /// Race stories
    Race {
        #[command(subcommand)]
        action: AssetAction,
    },

    /// Build the tree of a master database table
    Mdb(MdbArgs),

    /// Build the tree of the localization dictionary
    Dict(DictArgs),

    /// Walk entries of a tree, remembering the position between runs
    Nav(NavArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Game install root
    #[arg(long)]
    game_path: Option<String>,

    /// Directory holding translation dumps
    #[arg(long)]
    translation_path: Option<String>,

    /// Helper process command line
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    bridge: Option<Vec<String>>,

    /// Label a master text category, as ID=LABEL
    #[arg(long = "category-label", value_parser = parse_label)]
    category_labels: Vec<(String, String)>,
}

fn parse_label(raw: &str) -> std::result::Result<(String, String), String> {
    let (id, label) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=LABEL, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("empty category id in '{raw}'"));
    }
    Ok((id.to_string(), label.trim().to_string()))
}

#[derive(Args)]
struct DetectArgs {
    /// Store the detected path as the game path
    #[arg(long)]
    save: bool,
}

#[derive(Args)]
struct LocateArgs {
    /// Logical asset name
    name: String,

    /// Match names ending with NAME instead of the exact name
    #[arg(long)]
    suffix: bool,
}

#[derive(Args)]
struct StoryArgs {
    /// Story id, e.g. 020001004
    id: String,

    /// Also extract the voice cues referenced by the story
    #[arg(long)]
    voice: bool,
}

#[derive(Args)]
struct StoriesArgs {
    /// Story data directory (defaults to the one under the game path)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Group the listing into a tree
    #[arg(long)]
    tree: bool,
}

#[derive(Subcommand)]
enum AssetAction {
    /// List available assets
    List,
    /// Extract one asset by its logical path
    Open { path: String },
}

#[derive(Args)]
struct MdbArgs {
    #[arg(value_enum)]
    table: MdbTable,
}

#[derive(Args)]
struct DictArgs {
    /// Dictionary file (defaults to localize_dump.json in the translation path)
    #[arg(long)]
    path: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum TreeSource {
    Dict,
    TextData,
    CharacterSystemText,
    RaceJikkyoComment,
    RaceJikkyoMessage,
}

impl TreeSource {
    fn as_str(self) -> &'static str {
        match self {
            Self::Dict => "dict",
            Self::TextData => "text_data",
            Self::CharacterSystemText => "character_system_text",
            Self::RaceJikkyoComment => "race_jikkyo_comment",
            Self::RaceJikkyoMessage => "race_jikkyo_message",
        }
    }

    fn table(self) -> Option<MdbTable> {
        match self {
            Self::Dict => None,
            Self::TextData => Some(MdbTable::TextData),
            Self::CharacterSystemText => Some(MdbTable::CharacterSystemText),
            Self::RaceJikkyoComment => Some(MdbTable::RaceJikkyoComment),
            Self::RaceJikkyoMessage => Some(MdbTable::RaceJikkyoMessage),
        }
    }
}

#[derive(Args)]
struct NavArgs {
    #[arg(value_enum)]
    source: TreeSource,

    /// Entry to show, as CATEGORY/ENTRY (or ENTRY for flat tables)
    #[arg(long)]
    path: Option<String>,

    /// Step to the previous entry instead of the next one
    #[arg(long, conflicts_with = "path")]
    back: bool,

    /// Dictionary file when SOURCE is dict
    #[arg(long)]
    dict: Option<PathBuf>,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let store = ConfigStore::resolve(cli.config);
    let config = store.load().await?;
    log::debug!("Using config {}", store.path().display());

    let session = Session::with_bridge(config);
    dispatch(&store, &session, cli.command).await
}

async fn dispatch(store: &ConfigStore, session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Config(args) => run_config(store, session.config().clone(), args).await,
        Commands::Detect(args) => run_detect(store, session.config().clone(), args).await,
        Commands::Locate(args) => run_locate(session, args).await,
        Commands::Story(args) => run_story(session, args).await,
        Commands::Stories(args) => run_stories(session, args).await,
        Commands::Lyrics { action } => match action {
            AssetAction::List => print_json(&session.list_lyrics().await?),
            AssetAction::Open { path } => {
                let csv = session.open_lyrics(&path).await?;
                print_json(&json!({ "path": path, "csv": csv }))
            }
        },
        Commands::Race { action } => match action {
            AssetAction::List => print_json(&session.list_race_stories().await?),
            AssetAction::Open { path } => print_json(&session.open_race_story(&path).await?),
        },
        Commands::Mdb(args) => print_json(&session.load_mdb_table(args.table).await?),
        Commands::Dict(args) => print_json(&session.load_localize_dict(args.path.as_deref()).await?),
        Commands::Nav(args) => run_nav(store, session, args).await,
    }
}

async fn run_config(store: &ConfigStore, mut config: AppConfig, args: ConfigArgs) -> Result<()> {
    let mut changed = false;
    if let Some(game_path) = args.game_path {
        config.game_path = game_path;
        changed = true;
    }
    if let Some(translation_path) = args.translation_path {
        config.translation_path = translation_path;
        changed = true;
    }
    if let Some(bridge) = args.bridge {
        config.bridge_command = bridge;
        changed = true;
    }
    for (id, label) in args.category_labels {
        if label.is_empty() {
            config.text_data_categories.remove(&id);
        } else {
            config.text_data_categories.insert(id, label);
        }
        changed = true;
    }

    if changed {
        store.save(&config).await?;
        log::info!("Saved config to {}", store.path().display());
    }
    print_json(&config)
}

async fn run_detect(store: &ConfigStore, mut config: AppConfig, args: DetectArgs) -> Result<()> {
    let found = discover::find_game_install_path();
    let story_dir = found.as_deref().and_then(discover::find_story_data_dir);
    match &found {
        Some(path) => log::info!("Found game install at {}", path.display()),
        None => log::warn!("No game install found under the Steam libraries"),
    }

    if args.save {
        let path = found
            .as_ref()
            .context("nothing to save: no game install found")?;
        config.game_path = path.to_string_lossy().into_owned();
        store.save(&config).await?;
    }

    print_json(&json!({
        "gamePath": found,
        "storyDataDir": story_dir,
    }))
}

async fn run_locate(session: &Session, args: LocateArgs) -> Result<()> {
    session.require_game()?;
    let asset = if args.suffix {
        let pattern = locview_resolver::LikePattern::suffix(&args.name);
        session.locator().locate_matching(&pattern).await?
    } else {
        session.locator().locate(&args.name).await?
    };

    print_json(&json!({
        "logicalName": asset.logical_name,
        "hash": asset.hash,
        "name": asset.name,
        "shardPath": asset.shard_path(),
        "storagePath": session.locator().storage_path(&asset),
    }))
}

async fn run_story(session: &Session, args: StoryArgs) -> Result<()> {
    let view = session.open_story(&args.id).await?;
    let voice = if args.voice {
        session.load_voice(&view.story_id, &view.data).await?
    } else {
        None
    };
    print_json(&json!({ "story": view, "voice": voice }))
}

async fn run_stories(session: &Session, args: StoriesArgs) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => {
            let game = session.config().game_path()?;
            discover::find_story_data_dir(game)
                .with_context(|| format!("No story data under {}", game.display()))?
        }
    };

    let stories = session.list_stories(&dir).await;
    if args.tree {
        print_json(&discover::story_tree(&stories))
    } else {
        print_json(&stories)
    }
}

async fn load_source(
    session: &Session,
    source: TreeSource,
    dict: Option<&Path>,
) -> Result<Vec<TreeNode>> {
    match source.table() {
        Some(table) => session.load_mdb_table(table).await,
        None => session.load_localize_dict(dict).await,
    }
}

/// Stored positions are `[source, ..path]`.
fn stored_path(state: &WorkspaceState, source: TreeSource) -> Option<Vec<String>> {
    match state.current_path.split_first() {
        Some((head, rest)) if head == source.as_str() && !rest.is_empty() => Some(rest.to_vec()),
        _ => None,
    }
}

async fn run_nav(store: &ConfigStore, session: &Session, args: NavArgs) -> Result<()> {
    let forest = load_source(session, args.source, args.dict.as_deref()).await?;
    let workspace = WorkspaceStore::in_dir(store.dir());
    let mut state = workspace.restore().await;

    let path = match (&args.path, stored_path(&state, args.source)) {
        (Some(raw), _) => navigate::parse_path(&forest, raw)
            .with_context(|| format!("no entry at '{raw}' in {}", args.source.as_str()))?,
        (None, Some(current)) => {
            navigate::step(&forest, &current, !args.back).unwrap_or(current)
        }
        (None, None) => navigate::first_entry(&forest).context("tree has no entries")?,
    };

    let Some(NodeRef::Entry(entry)) = navigate::find(&forest, &path) else {
        anyhow::bail!("no entry at '{}' in {}", path.join("/"), args.source.as_str());
    };

    state.current_path = std::iter::once(args.source.as_str().to_string())
        .chain(path.iter().cloned())
        .collect();
    workspace.save(&state).await?;

    print_json(&json!({ "path": path, "entry": entry }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn labels_parse_as_id_and_text() {
        assert_eq!(
            parse_label("16=Song titles").unwrap(),
            ("16".to_string(), "Song titles".to_string())
        );
        assert_eq!(parse_label("16=").unwrap(), ("16".to_string(), String::new()));
        assert!(parse_label("16").is_err());
        assert!(parse_label("=x").is_err());
    }

    #[test]
    fn stored_path_is_scoped_by_source() {
        let state = WorkspaceState {
            current_path: vec!["dict".to_string(), "foo".to_string(), "foo1".to_string()],
            ..WorkspaceState::default()
        };
        assert_eq!(
            stored_path(&state, TreeSource::Dict),
            Some(vec!["foo".to_string(), "foo1".to_string()])
        );
        assert_eq!(stored_path(&state, TreeSource::TextData), None);
        assert_eq!(stored_path(&WorkspaceState::default(), TreeSource::Dict), None);
    }
}
