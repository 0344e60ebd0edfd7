mod logging;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tpsblocks::collision::{find_identical_blocks_bucketed, CollisionSummary};
use tpsblocks::pattern::{is_filler_block, is_sequence_block};
use tpsblocks::{collect_known_pairs, header_index_end_block, load_file, Block};
use tracing::info;

#[derive(Parser)]
#[command(name = "tpsblocks", about = "Known-plaintext block analysis for encrypted TPS files")]
struct Cli {
    /// Log at debug level unless RUST_LOG or TPSBLOCKS_LOG_LEVEL say otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump a file as 64-byte blocks
    Blocks {
        input: PathBuf,
        /// Treat the input as already decrypted
        #[arg(long)]
        plain: bool,
    },
    /// List blocks with identical ciphertext
    Collisions {
        input: PathBuf,
    },
    /// Show the header index end block
    Header {
        input: PathBuf,
        /// Print the computed plaintext instead of the stored ciphertext
        #[arg(long)]
        plain: bool,
    },
    /// Emit known plaintext pairs as JSON
    Pairs {
        input: PathBuf,
        /// Decrypted (or partially decrypted) copy of the same file
        #[arg(long)]
        plain: Option<PathBuf>,
        /// Write the JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {

        // ── Blocks ───────────────────────────────────────────────────────────
        Commands::Blocks { input, plain } => {
            let blocks = read_blocks(&input, !plain)?;
            for block in &blocks {
                println!("{}{}", block, marker(block));
            }
        }

        // ── Collisions ───────────────────────────────────────────────────────
        Commands::Collisions { input } => {
            let blocks = read_blocks(&input, true)?;
            let same = find_identical_blocks_bucketed(&blocks);
            for (rep, dups) in &same {
                let offsets: Vec<String> = dups.iter().map(|b| format!("{:08x}", b.offset())).collect();
                println!("{:08x} x{:<5} {}", rep.offset(), dups.len() + 1, offsets.join(" "));
            }
            let summary = CollisionSummary::of(&same);
            println!("{} class(es), {} duplicate block(s), largest class {}",
                summary.classes, summary.duplicates, summary.largest_class);
            if let Some(rep) = CollisionSummary::largest(&same) {
                println!("Likely filler: {}", rep);
            }
        }

        // ── Header ───────────────────────────────────────────────────────────
        Commands::Header { input, plain } => {
            let blocks = read_blocks(&input, true)?;
            println!("{}", header_index_end_block(&blocks, !plain)?);
        }

        // ── Pairs ────────────────────────────────────────────────────────────
        Commands::Pairs { input, plain, output } => {
            let cipher = read_blocks(&input, true)?;
            let plain = plain.map(|p| read_blocks(&p, false)).transpose()?;
            let pairs = collect_known_pairs(&cipher, plain.as_deref())?;
            let json = serde_json::to_string_pretty(&pairs)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    info!(path = %path.display(), pairs = pairs.len(), "wrote pairs");
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn read_blocks(path: &Path, encrypted: bool) -> Result<Vec<Block>, Box<dyn std::error::Error>> {
    let data = std::fs::read(path)?;
    Ok(load_file(&data, encrypted)?)
}

fn marker(block: &Block) -> &'static str {
    if block.is_encrypted() {
        ""
    } else if is_filler_block(block) {
        "  [filler]"
    } else if is_sequence_block(block) {
        "  [sequence]"
    } else {
        ""
    }
}
