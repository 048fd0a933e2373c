use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use sanctuary_bingo::board_renderer::render_card_to_png;
use sanctuary_bingo::store::read_record;
use sanctuary_bingo::{
    BingoCard, BingoError, BingoRecord, DirectoryStore, ParsedConfig, compute_live_data, server,
    winning_lines,
};

/// Sanctuary bingo - card generation and live win detection
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the live data (called values and winning cards) for a record file
    Live {
        /// Path to a bingo record JSON file
        record: PathBuf,
    },
    /// Print one card of a record as JSON
    Card {
        record: PathBuf,
        #[arg(short, long)]
        index: u32,
    },
    /// Render one card of a record to a PNG sheet
    Render {
        record: PathBuf,
        #[arg(short, long)]
        index: u32,
        #[arg(short, long, default_value = "bingo_card.png")]
        out: PathBuf,
    },
    /// Serve live data over HTTP from a directory of record files
    Serve {
        /// Directory containing bingo record JSON files
        #[arg(short, long)]
        records: PathBuf,
        /// Port to bind the server to
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

fn load_card(record: &BingoRecord, config: &ParsedConfig, index: u32) -> Result<BingoCard, BingoError> {
    config.cards.card(index).ok_or_else(|| {
        BingoError::NotFound(format!(
            "card {index} of '{}' ({} cards)",
            record.id, config.number_of_cards
        ))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // stdout carries JSON output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Live { record } => {
            let record = read_record(&record)?;
            let live = compute_live_data(&record)?;
            println!("{}", serde_json::to_string_pretty(&live)?);
        }
        Command::Card { record, index } => {
            let record = read_record(&record)?;
            let config = record.parsed_config()?;
            let card = load_card(&record, &config, index)?;
            let called = record.called_values()?;
            let rows: Vec<&[u32]> = card.rows().collect();
            let out = json!({
                "seed": config.cards.seed(),
                "index": card.index(),
                "gridSize": card.grid_size(),
                "rows": rows,
                "winningLines": winning_lines(&card, &called, config.rules),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Render { record, index, out } => {
            let record = read_record(&record)?;
            let config = record.parsed_config()?;
            let card = load_card(&record, &config, index)?;
            let called = record.called_values()?;
            render_card_to_png(&card, &called, config.rules, &out)?;
            println!("Bingo card image written to {}", out.display());
        }
        Command::Serve { records, port } => {
            info!("Initializing sanctuary bingo server");
            let store = DirectoryStore::open(&records)?;
            info!("Reading bingo records from {}", store.root().display());
            let addr: SocketAddr = format!("127.0.0.1:{port}").parse()?;
            server::serve(Arc::new(store), addr).await?;
        }
    }

    Ok(())
}
