use std::path::{Path, PathBuf};

use clap::Args;

use crate::build::{BuildConfig, BuildError, FeatureBuilder, DEFAULT_MIN_INTRON_SIZE};
use crate::cli::OutputFormat;
use crate::core::feature::TransFeature;
use crate::core::transcript::TranscriptFeatures;
use crate::parsing;
use crate::seq::fasta::FastaSeqSource;
use crate::seq::CachedSeqSource;

#[derive(Args)]
pub struct InspectArgs {
    /// genePred or PSL file; `.psl` extensions are treated as alignments,
    /// everything else as annotations
    #[arg(required = true)]
    pub input: PathBuf,

    /// Indexed genome FASTA for splice-motif classification (.fai required)
    #[arg(long)]
    pub genome: Option<PathBuf>,

    /// Smallest chromosomal gap treated as an intron
    #[arg(long, default_value_t = DEFAULT_MIN_INTRON_SIZE)]
    pub min_intron_size: u64,
}

fn is_psl(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".psl") || path_str.ends_with(".psl.gz") || path_str.ends_with(".psl.bgz")
}

pub fn run(args: InspectArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let genome = match &args.genome {
        Some(path) => Some(FastaSeqSource::open(path)?),
        None => None,
    };
    let cached = genome.as_ref().map(|g| CachedSeqSource::new(g));
    let mut builder = FeatureBuilder::new(BuildConfig {
        min_intron_size: args.min_intron_size,
    });
    if let Some(seqs) = &cached {
        builder = builder.with_seq_source(seqs);
    }

    let mut trees = Vec::new();
    if is_psl(&args.input) {
        for src in parsing::parse_psl_file(&args.input)? {
            match builder.build_alignment(&src) {
                Ok(tree) => trees.push(tree),
                Err(BuildError::MalformedInput { id, reason }) => {
                    tracing::warn!(%id, %reason, "skipping malformed alignment");
                }
                Err(err) => return Err(err.into()),
            }
        }
    } else {
        for src in parsing::parse_genepred_file(&args.input)? {
            match builder.build_annotation(&src) {
                Ok(tree) => trees.push(tree),
                Err(BuildError::MalformedInput { id, reason }) => {
                    tracing::warn!(%id, %reason, "skipping malformed annotation");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    if verbose {
        eprintln!("Built {} feature trees from {}", trees.len(), args.input.display());
    }

    match format {
        OutputFormat::Text => print_text(&trees),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trees)?),
        OutputFormat::Tsv => print_tsv(&trees),
    }

    Ok(())
}

fn print_text(trees: &[TranscriptFeatures]) {
    for trans in trees {
        println!("{trans}");
        for feat in &trans.features {
            match feat {
                TransFeature::Exon(exon) => {
                    println!("  exon {} rna {}", exon.chrom, exon.rna);
                }
                TransFeature::Intron(intron) => {
                    let motif = intron
                        .donor_seq
                        .as_deref()
                        .zip(intron.acceptor_seq.as_deref())
                        .map_or_else(
                            || intron.motif.to_string(),
                            |(d, a)| format!("{d}..{a}"),
                        );
                    println!("  intron {} splice {}", intron.chrom, motif);
                }
            }
        }
    }
}

fn print_tsv(trees: &[TranscriptFeatures]) {
    println!("id\tfeature\tchrom\tchromStart\tchromEnd\trnaStart\trnaEnd\tstrand");
    for trans in trees {
        for feat in &trans.features {
            let kind = match feat {
                TransFeature::Exon(_) => "exon",
                TransFeature::Intron(_) => "intron",
            };
            let chrom = feat.chrom();
            let rna = feat.rna();
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                trans.id,
                kind,
                chrom.name,
                chrom.start,
                chrom.end,
                rna.start,
                rna.end,
                trans.transcription_strand
            );
        }
    }
}
