use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use texspell::checker::dictionary::DictionaryOracle;
use texspell::cli::interactive;
use texspell::cli::output::{print_check_summary, print_report, OutputFormat, ReportingSink};
use texspell::cli::workspace::Workspace;
use texspell::config::Overrides;
use texspell::host::memory::{DiagnosticStore, MemoryDocuments};
use texspell::host::regions::RegionMap;
use texspell::host::DiagnosticSink;
use texspell::session::Host;
use texspell::{dict, Config, Session, TriggerEvent};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const TEX_EXTENSIONS: [&str; 4] = ["tex", "sty", "cls", "bib"];

#[derive(Parser, Debug)]
#[command(name = "texspell")]
#[command(version, about = "Spell checking for LaTeX sources", long_about = None)]
struct Cli {
    /// Files or directories to check
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if errors are found
    #[arg(long)]
    no_fail: bool,

    /// Language/dictionary to use (e.g., en_US, en_GB)
    #[arg(short, long)]
    language: Option<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Add words to personal dictionary
    #[arg(long)]
    add_to_dict: Vec<String>,

    /// Personal dictionary file
    #[arg(long)]
    personal_dict: Option<PathBuf>,

    /// Quiet period before a document is checked, in milliseconds
    #[arg(long, value_name = "MS")]
    debounce: Option<u64>,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Read editor-style commands from stdin and report diagnostics as they change
    Session,
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Download a dictionary
    Download {
        /// Language code (e.g., en_US, en_GB)
        language: String,
    },
    /// Update all dictionaries
    Update,
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TEXSPELL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "texspell", &mut io::stdout());
        return Ok(());
    }

    let (config, errors) = Config::load(Overrides {
        language: cli.language.clone(),
        personal_dictionary: cli.personal_dict.clone(),
        debounce_interval_ms: cli.debounce,
    })?;
    for error in &errors {
        tracing::warn!(%error, "ignoring config option");
    }

    if !cli.add_to_dict.is_empty() {
        dict::manager::add_personal_words(&config, &cli.add_to_dict)?;
        if cli.files.is_empty() && cli.command.is_none() {
            return Ok(());
        }
    }

    match cli.command {
        Some(Commands::Dict { action }) => handle_dict(action),
        Some(Commands::Session) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(run_session(config, cli.format, !cli.no_color))
        }
        None => {
            if cli.files.is_empty() {
                anyhow::bail!("No files specified. Use --help for usage information.");
            }
            let mut config = config;
            // A one-shot run checks every file it is given, right away.
            config.enabled = true;
            config.trigger_events.insert(TriggerEvent::DocumentOpened);
            if cli.debounce.is_none() {
                config.debounce_interval_ms = 0;
            }

            let runtime = tokio::runtime::Runtime::new()?;
            let total_errors =
                runtime.block_on(run_check(config, &cli.files, cli.format, !cli.no_color))?;

            if total_errors > 0 && !cli.no_fail {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn build_workspace(config: Config, sink: Arc<dyn DiagnosticSink>) -> Result<Workspace> {
    let oracle = DictionaryOracle::load(&config.language, config.personal_dictionary.as_deref())?;
    let documents = Arc::new(MemoryDocuments::new());
    let regions = Arc::new(RegionMap::new());

    let session = Session::setup(
        config,
        Host {
            documents: documents.clone(),
            stacks: regions.clone(),
            oracle: Arc::new(oracle),
            sink,
        },
    );

    Ok(Workspace {
        session,
        documents,
        regions,
    })
}

fn is_tex_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEX_EXTENSIONS.contains(&ext))
}

/// Expand directories into the TeX sources below them, each file once.
fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut add = |path: PathBuf| {
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            files.push(path);
        }
    };

    for input in inputs {
        if input.is_dir() {
            let found = WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unreadable entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && is_tex_source(entry.path()))
                .map(|entry| entry.into_path());
            found.for_each(&mut add);
        } else {
            add(input.clone());
        }
    }
    files
}

async fn run_check(
    config: Config,
    inputs: &[PathBuf],
    format: OutputFormat,
    colored: bool,
) -> Result<usize> {
    let store = Arc::new(DiagnosticStore::new());
    let workspace = build_workspace(config, store.clone())?;

    let mut docs = Vec::new();
    for path in collect_files(inputs) {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            continue;
        }
        match workspace.open(&path) {
            Ok(doc) => docs.push(doc),
            Err(e) => eprintln!("Error: {:#}", e),
        }
    }

    workspace.session.idle().await;

    print_report(&docs, &store, colored, format);
    let total_errors = store.total(texspell::SOURCE);
    if format == OutputFormat::Text {
        print_check_summary(total_errors, docs.len(), colored);
    }

    Ok(total_errors)
}

async fn run_session(config: Config, format: OutputFormat, colored: bool) -> Result<()> {
    let sink = Arc::new(ReportingSink::new(colored, format));
    let workspace = build_workspace(config, sink.clone())?;

    interactive::run(&workspace, &sink, colored).await
}

fn handle_dict(action: DictCommands) -> Result<()> {
    match action {
        DictCommands::List => dict::manager::list_dictionaries(),
        DictCommands::Download { language } => dict::manager::download_dictionary(&language),
        DictCommands::Update => dict::manager::update_dictionaries(),
        DictCommands::Info { language } => dict::manager::show_info(&language),
    }
}
