//! Command-line interface for tsl-solver.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **evaluate**: Score transcript annotations against aligned RNA
//!   evidence and report transcription-support verdicts
//! - **inspect**: Build and dump the feature tree of each input record
//!
//! ## Usage
//!
//! ```text
//! # Evaluate annotations against one mRNA evidence set
//! tsl-solver evaluate annots.gp --evidence mrnas=mrna.psl
//!
//! # Several evidence sets, with splice motifs from an indexed genome
//! tsl-solver evaluate annots.gp \
//!     --evidence mrnas=mrna.psl --evidence ests=est.psl \
//!     --genome genome.fa
//!
//! # Detail rows as TSV for scripting
//! tsl-solver evaluate annots.gp --evidence mrnas=mrna.psl \
//!     --details --format tsv
//!
//! # Look at the trees a PSL produces
//! tsl-solver inspect mrna.psl --format json
//! ```

use clap::{Parser, Subcommand};

pub mod evaluate;
pub mod inspect;

#[derive(Parser)]
#[command(name = "tsl-solver")]
#[command(version)]
#[command(about = "Evaluate transcription support of gene annotations from RNA alignments")]
#[command(
    long_about = "tsl-solver compares gene annotations (genePred) against aligned RNA evidence (PSL) and reports, per transcript and evidence set, how well the evidence corroborates the annotated exon structure.\n\nEvidence is graded from clean agreement through polymorphism and exon extension down to structural disagreement; per-verdict summaries aggregate the evidence counts and boundary offsets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate annotations against evidence alignments
    Evaluate(evaluate::EvaluateArgs),

    /// Build and print feature trees from a genePred or PSL file
    Inspect(inspect::InspectArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
