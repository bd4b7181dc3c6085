use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use coleta::{ingest, normalize, server, Config, TableStore};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "coleta", about = "Waste-collection spreadsheet normalizer and data service")]
struct Cli {
    /// YAML config file (defaults to ./coleta.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize one spreadsheet and print the rows as JSON
    Normalize {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Normalize spreadsheets and append them to the table
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Tag every row with this year (`ano` column)
        #[arg(long)]
        ano: Option<i32>,
    },
    /// Delete every row of the table
    Reset,
    /// Run the HTTP service
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load(cli.config.as_deref())?;

    // ─── init logging ────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Normalize { file, pretty } => {
            let ds = normalize(ingest::load_dataset(&file)?);
            let records = ds.to_records();
            let out = if pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            println!("{}", out);
        }
        Command::Ingest { files, ano } => {
            let store = TableStore::open(&cfg.data_dir, &cfg.table)?;
            let mut failed = 0usize;
            for file in &files {
                match ingest::ingest_file(&store, file, ano) {
                    Ok(summary) => info!(
                        file = %summary.file.display(),
                        rows = summary.rows,
                        columns = ?summary.columns,
                        "ingested"
                    ),
                    Err(e) => {
                        error!("{} failed: {:?}", file.display(), e);
                        failed += 1;
                    }
                }
            }
            info!(ok = files.len() - failed, failed, "ingest finished");
            if failed > 0 {
                bail!("{} of {} files failed to ingest", failed, files.len());
            }
        }
        Command::Reset => {
            let store = TableStore::open(&cfg.data_dir, &cfg.table)?;
            let removed = store.truncate().context("truncating table")?;
            info!(table = store.table(), removed, "reset");
        }
        Command::Serve { port } => {
            let store = TableStore::open(&cfg.data_dir, &cfg.table)?;
            server::serve(Arc::new(store), port.unwrap_or(cfg.port)).await;
        }
    }

    Ok(())
}
