use anyhow::Result;
use clap::{Parser, Subcommand};
use pm_mirror::api::HttpClient;
use pm_mirror::config::AppConfig;
use pm_mirror::logic::{SyncRunner, SyncSummary};
use pm_mirror::model::catalog;
use pm_mirror::store::{MemoryStore, MirrorStore, PostgresStore};

#[derive(Parser)]
#[command(name = "pm-mirror")]
#[command(about = "Mirror project-management SaaS resources into PostgreSQL")]
struct Cli {
    /// Sync into an in-memory store instead of PostgreSQL
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync every resource type in dependency order
    Run,
    /// Sync a single resource type by catalog name
    Resource { name: String },
    /// Sync projects and their dependencies, resolving custom fields
    Projects,
    /// Sync deals and their dependencies, resolving custom fields
    Deals,
    /// List the configured resource types
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    let cli = Cli::parse();

    if let Command::Catalog = cli.command {
        for config in catalog() {
            let markers = match (config.custom_fields, config.sort) {
                (true, Some(sort)) => format!(" [custom fields, sort={}]", sort),
                (true, None) => " [custom fields]".to_string(),
                (false, Some(sort)) => format!(" [sort={}]", sort),
                (false, None) => String::new(),
            };
            println!("{:<24} {}{}", config.name, config.path, markers);
        }
        return Ok(());
    }

    let config = AppConfig::load()?;
    let api = HttpClient::new(config.api.base_url.as_str(), config.api_token()?);

    let summary = if cli.dry_run {
        println!("Dry run: syncing into in-memory store");
        let store = MemoryStore::new();
        run_command(&cli.command, &api, &store, config.api.page_size).await?
    } else {
        println!("Connecting to PostgreSQL...");
        let store = PostgresStore::new(&config.database_url()?).await?;
        store.migrate().await?;
        run_command(&cli.command, &api, &store, config.api.page_size).await?
    };

    println!(
        "Sync complete: {} records across {} resource types in {:.2?}",
        summary.total_fetched(),
        summary.outcomes.len(),
        summary.elapsed
    );
    if summary.total_entities_failed() > 0 {
        println!(
            "Warning: {} entities failed custom field resolution (see log)",
            summary.total_entities_failed()
        );
    }

    Ok(())
}

async fn run_command<S: MirrorStore + ?Sized>(
    command: &Command,
    api: &HttpClient,
    store: &S,
    page_size: usize,
) -> Result<SyncSummary> {
    let runner = SyncRunner::new(api, store).with_page_size(page_size);

    match command {
        Command::Run => runner.sync_all().await,
        Command::Resource { name } => runner.sync_named(&[name.as_str()]).await,
        Command::Projects => runner.sync_projects().await,
        Command::Deals => runner.sync_deals().await,
        Command::Catalog => unreachable!("handled before store setup"),
    }
}
