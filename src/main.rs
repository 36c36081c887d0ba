//! Repolens CLI - Ask questions about a source repository

use anyhow::Context;
use clap::{Parser, Subcommand};
use repolens::config::{self, RepolensConfig};
use repolens::services::{embedder_from_config, generator_from_config, GithubHost, LocalHost, RepositoryHost};
use repolens::storage::{GraphStore, SqliteStore};
use repolens::ui::{self, Icons, ProgressManager, Spinner};
use repolens::{IngestRequest, IngestionPipeline, RetrievalEngine};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "repolens")]
#[command(version)]
#[command(about = "Repository knowledge base - ask questions about a codebase")]
#[command(long_about = r#"
Repolens turns a repository into a queryable knowledge base:
  • Overlapping token-window chunks with embeddings
  • A file dependency graph from Python and JavaScript/TypeScript imports
  • Answers grounded in the best-matching chunks and their dependencies

Example usage:
  repolens init
  repolens ingest --owner tiangolo --repo fastapi --branch master
  repolens ingest --path ./my-project
  repolens ask <REPO_ID> "Which web framework does this use?"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default repolens.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Ingest a GitHub repository or a local directory
    Ingest {
        /// Repository owner on GitHub
        #[arg(long, required_unless_present = "path")]
        owner: Option<String>,

        /// Repository name (defaults to the directory name with --path)
        #[arg(long, required_unless_present = "path")]
        repo: Option<String>,

        /// Branch to ingest
        #[arg(short, long, default_value = "main")]
        branch: String,

        /// Owning user recorded on the repository
        #[arg(short, long)]
        user: Option<String>,

        /// Ingest a directory on disk instead of GitHub
        #[arg(short, long, conflicts_with = "owner")]
        path: Option<PathBuf>,
    },

    /// Answer a question about an ingested repository
    Ask {
        /// Repository id printed by `ingest`
        repo_id: Uuid,

        /// The question
        question: String,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Show the chunks and dependencies a question would retrieve
    Search {
        /// Repository id printed by `ingest`
        repo_id: Uuid,

        /// The question
        question: String,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// List the files a file depends on
    Neighbors {
        /// Repository id printed by `ingest`
        repo_id: Uuid,

        /// Repository-relative file path
        path: String,

        /// Maximum number of dependency hops
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Show statistics about the knowledge base
    Stats {
        /// Limit the counts to one repository
        repo_id: Option<Uuid>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        ui::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.database = Some(database.to_string_lossy().into_owned());
    }

    match cli.command {
        Commands::Init { force } => run_init(cli.config.as_deref(), &config, force, cli.json),
        Commands::Ingest { owner, repo, branch, user, path } => {
            run_ingest(&config, owner, repo, branch, user, path, cli.json)
        }
        Commands::Ask { repo_id, question, top_k } => run_ask(&config, repo_id, &question, top_k, cli.json),
        Commands::Search { repo_id, question, top_k } => run_search(&config, repo_id, &question, top_k, cli.json),
        Commands::Neighbors { repo_id, path, depth } => run_neighbors(&config, repo_id, &path, depth, cli.json),
        Commands::Stats { repo_id } => run_stats(&config, repo_id, cli.json),
    }
}

fn open_store(config: &RepolensConfig) -> anyhow::Result<SqliteStore> {
    let database = config.database_path();
    config::ensure_db_dir(&database)?;
    SqliteStore::open(&database).with_context(|| format!("failed to open database {}", database.display()))
}

fn host_timeout(config: &RepolensConfig) -> Duration {
    Duration::from_secs(config.host.timeout_secs)
}

fn run_init(config_path: Option<&Path>, config: &RepolensConfig, force: bool, json: bool) -> anyhow::Result<()> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
    config::write_config(&path, config, force)?;

    let project_root = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    config::ensure_gitignore(project_root)?;

    if json {
        return ui::json(&serde_json::json!({ "config": path, "database": config.database_path() }));
    }
    ui::success("Initialized repolens");
    ui::status(Icons::GEAR, "Config", &path.display().to_string());
    ui::info("Database", &config.database_path().display().to_string());
    Ok(())
}

fn run_ingest(
    config: &RepolensConfig,
    owner: Option<String>,
    repo: Option<String>,
    branch: String,
    user: Option<String>,
    path: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let embedder = embedder_from_config(&config.embedding, host_timeout(config))?;

    let (host, request): (Box<dyn RepositoryHost>, IngestRequest) = match path {
        Some(root) => {
            let name = repo
                .or_else(|| {
                    root.canonicalize()
                        .ok()
                        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                })
                .unwrap_or_else(|| "local".to_string());
            let request = IngestRequest::new("local", &name, &branch);
            (Box::new(LocalHost::new(root)), request)
        }
        None => {
            let owner = owner.context("--owner is required without --path")?;
            let repo = repo.context("--repo is required without --path")?;
            let request = IngestRequest::new(&owner, &repo, &branch);
            (Box::new(GithubHost::new(&config.host)?), request)
        }
    };
    let request = match user {
        Some(user) => request.with_user(&user),
        None => request,
    };

    if !json {
        ui::header(&format!("Ingesting {}/{}@{}", request.owner, request.repo, request.branch));
        ui::status(Icons::DATABASE, "Database", &config.database_path().display().to_string());
    }

    let start = Instant::now();
    let pipeline = IngestionPipeline::from_config(host.as_ref(), embedder.as_ref(), &store, config)?;

    let report = if json {
        pipeline.run(&request)?
    } else {
        let (progress, tx) = ProgressManager::new();
        let result = pipeline.with_progress(tx).run(&request);
        match &result {
            Ok(report) => progress.finish_with_summary(start.elapsed(), report.retained, report.chunks, report.edges),
            Err(_) => progress.clear(),
        }
        result?
    };

    if json {
        return ui::json(&report);
    }

    ui::summary_row("Files", &format!("{} retained of {} listed", report.retained, report.listed));
    ui::summary_row("Chunks", &format!("{} from {} files", report.chunks, report.embedded_files));
    ui::summary_row("Edges", &report.edges.to_string());
    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        ui::section(&format!(" Skipped {} ", failures.len()));
        for skipped in failures {
            ui::skipped(&skipped.path, &skipped.reason.to_string());
        }
    }
    println!();
    ui::success(&format!("Repository id: {}", report.repo_id));
    Ok(())
}

fn run_ask(config: &RepolensConfig, repo_id: Uuid, question: &str, top_k: Option<usize>, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let embedder = embedder_from_config(&config.embedding, host_timeout(config))?;
    let generator = generator_from_config(&config.generation, host_timeout(config))?;
    let engine = RetrievalEngine::new(&store, embedder.as_ref(), config.retrieval).with_generator(generator.as_ref());
    let k = top_k.unwrap_or(config.retrieval.top_k);

    let start = Instant::now();
    let spinner = Spinner::new("Thinking...");
    let answer = engine.answer(repo_id, question, k);
    spinner.finish_and_clear();
    let answer = answer?;

    if json {
        return ui::json(&serde_json::json!({ "repo_id": repo_id, "question": question, "answer": answer }));
    }
    println!("{} {}", Icons::BRAIN, ui::dim(question));
    println!();
    println!("{}", answer);
    println!();
    ui::timing(&format!("{:.2?}", start.elapsed()));
    Ok(())
}

fn run_search(config: &RepolensConfig, repo_id: Uuid, question: &str, top_k: Option<usize>, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let embedder = embedder_from_config(&config.embedding, host_timeout(config))?;
    let engine = RetrievalEngine::new(&store, embedder.as_ref(), config.retrieval);
    let k = top_k.unwrap_or(config.retrieval.top_k);

    let start = Instant::now();
    let retrieval = engine.retrieve(repo_id, question, k)?;

    if json {
        return ui::json(&retrieval);
    }
    ui::status(Icons::SEARCH, "Query", question);
    if retrieval.chunks.is_empty() {
        ui::warn("No chunks scored for this repository");
        return Ok(());
    }
    ui::section(" Chunks ");
    for (rank, scored) in retrieval.chunks.iter().enumerate() {
        let chunk = &scored.chunk;
        ui::chunk(rank + 1, &chunk.file_path, chunk.chunk_index, scored.score, &chunk.content);
    }
    ui::section(" Dependencies ");
    for entry in &retrieval.graph {
        ui::dependency(&entry.path, &entry.neighbors);
    }
    println!();
    ui::timing(&format!("{:.2?}", start.elapsed()));
    Ok(())
}

fn run_neighbors(config: &RepolensConfig, repo_id: Uuid, path: &str, depth: Option<usize>, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    if store.get_repository(repo_id)?.is_none() {
        return Err(repolens::Error::RepositoryNotFound(repo_id).into());
    }

    let depth = depth.unwrap_or(config.retrieval.neighbor_depth);
    let neighbors: Vec<String> = store.read_neighbors(repo_id, path, depth)?.into_iter().collect();

    if json {
        return ui::json(&serde_json::json!({ "path": path, "depth": depth, "neighbors": neighbors }));
    }
    ui::dependency(path, &neighbors);
    Ok(())
}

fn run_stats(config: &RepolensConfig, repo_id: Option<Uuid>, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;

    let repos = match repo_id {
        Some(id) => vec![store.get_repository(id)?.ok_or(repolens::Error::RepositoryNotFound(id))?],
        None => store.list_repositories()?,
    };
    let mut per_repo = Vec::with_capacity(repos.len());
    for repo in repos {
        let stats = store.stats(Some(repo.id))?;
        per_repo.push((repo, stats));
    }
    let totals = store.stats(repo_id)?;

    if json {
        let repositories: Vec<_> = per_repo
            .iter()
            .map(|(repo, stats)| serde_json::json!({ "repository": repo, "stats": stats }))
            .collect();
        return ui::json(&serde_json::json!({ "totals": totals, "repositories": repositories }));
    }

    println!("{} Knowledge base", Icons::STATS);
    println!("{}", ui::stats_table(&totals));
    if !per_repo.is_empty() {
        println!("{}", ui::repositories_table(&per_repo));
    }
    Ok(())
}
