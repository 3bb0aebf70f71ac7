use clap::{Parser, Subcommand};
use grocery_catalog_mcp::pipeline::{
    apply_updates, import_offers, import_products, load_product_batches, load_update_batches,
    prepare_catalog, run_pipeline, translate_catalog,
};
use grocery_catalog_mcp::{
    analyze_catalog, AppConfig, AppState, CatalogServer, CatalogStore, Language, MemoryStore,
    MongoStore,
};
use rmcp::{transport::stdio, ServiceExt};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "grocery-catalog", version, about = "Hebrew grocery catalog → MongoDB products, offers and translations")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use an in-memory store instead of MongoDB
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarise a catalog spreadsheet
    Analyze {
        file: Option<PathBuf>,
        #[arg(long, default_value_t = 5)]
        sample_rows: usize,
    },
    /// Build product and offer batches from the catalog
    Prepare { file: Option<PathBuf> },
    /// Translate prepared products and write update batches
    Translate {
        /// en or ar (default: both)
        language: Option<Language>,
    },
    /// Insert the product batches
    ImportProducts {
        #[arg(long)]
        resume: Option<String>,
    },
    /// Link offers to imported products and insert them
    LinkOffers {
        #[arg(long)]
        resume: Option<String>,
    },
    /// Apply translation update batches
    ApplyUpdates {
        language: Language,
        #[arg(long)]
        resume: Option<String>,
    },
    /// Every stage in order
    Run,
    /// Show import and update runs
    Status { run_id: Option<String> },
    /// Serve the MCP tools on stdio
    Serve,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = AppConfig::load_or_default(&cli.config);

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(format!("grocery_catalog_mcp={}", level).parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(e) = load_error {
        tracing::warn!(path = %cli.config, error = %e, "Falling back to default configuration");
    }
    config.validate()?;
    tracing::info!(server = %config.server.name, "Loaded configuration");

    let state = AppState::open(config)?;

    match cli.command {
        Command::Analyze { file, sample_rows } => {
            let file = file.unwrap_or_else(|| state.config.catalog.input_file.clone());
            let path = state.layout.resolve(&file);
            let analysis = analyze_catalog(
                &path.to_string_lossy(),
                state.config.catalog.sheet.clone(),
                sample_rows,
            )?;
            print_json(&analysis)?;
        }
        Command::Prepare { file } => {
            let report = prepare_catalog(&state.config, &state.layout, file.as_deref(), chrono::Utc::now())?;
            print_json(&report)?;
        }
        Command::Translate { language } => {
            let languages = match language {
                Some(language) => vec![language],
                None => Language::ALL.to_vec(),
            };
            for language in languages {
                let report = translate_catalog(&state.config, &state.layout, language)?;
                print_json(&report)?;
            }
        }
        Command::Status { run_id } => match run_id {
            Some(run_id) => print_json(&state.checkpoints.require_run(&run_id)?)?,
            None => print_json(&state.checkpoints.list_runs()?)?,
        },
        Command::Serve => {
            tracing::info!("Starting MCP Server on stdio");
            let server = CatalogServer::new(state);
            let service = server.serve(stdio()).await?;
            service.waiting().await?;
            tracing::info!("MCP Server shutting down");
        }
        command if cli.dry_run => {
            tracing::info!("Dry run: using in-memory store");
            run_against(&MemoryStore::new(), &state, command).await?;
        }
        command => {
            let store = MongoStore::connect(state.config.mongodb_uri()?, &state.config.database).await?;
            run_against(&store, &state, command).await?;
        }
    }

    Ok(())
}

async fn run_against<S: CatalogStore>(store: &S, state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::ImportProducts { resume } => {
            let batches = load_product_batches(&state.layout)?;
            let report = import_products(store, &batches, &state.checkpoints, resume.as_deref()).await?;
            print_json(&report)?;
        }
        Command::LinkOffers { resume } => {
            let report = import_offers(
                store,
                &state.layout,
                &state.mappings,
                &state.checkpoints,
                state.config.batching.offer_batch_size,
                resume.as_deref(),
            )
            .await?;
            print_json(&report)?;
        }
        Command::ApplyUpdates { language, resume } => {
            let batches = load_update_batches(&state.layout, language)?;
            let report =
                apply_updates(store, &batches, &state.checkpoints, language, resume.as_deref()).await?;
            print_json(&report)?;
        }
        Command::Run => {
            let report = run_pipeline(store, state, chrono::Utc::now()).await?;
            print_json(&report)?;
        }
        _ => anyhow::bail!("command does not use the catalog store"),
    }
    Ok(())
}
