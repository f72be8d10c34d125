use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::build::{AnnotSource, BuildConfig, BuildError, FeatureBuilder, DEFAULT_MIN_INTRON_SIZE};
use crate::cli::OutputFormat;
use crate::core::coords::Strand;
use crate::core::gene::GeneAnnotation;
use crate::parsing;
use crate::seq::fasta::FastaSeqSource;
use crate::seq::CachedSeqSource;
use crate::support::{
    evaluate_transcript_support, EvalConfig, IgnoreSet, QualityLimits, SupportEvalResult,
    SupportEvidEvalResult, GENE_ID_ATTR,
};

#[derive(Args)]
pub struct EvaluateArgs {
    /// genePred annotation file (plain or gzipped)
    #[arg(required = true)]
    pub annotations: PathBuf,

    /// Evidence set as SETID=PSL (repeatable); a bare path uses the file
    /// stem as the set id
    #[arg(long = "evidence", required = true, value_name = "SETID=PSL")]
    pub evidence: Vec<String>,

    /// Indexed genome FASTA for splice-motif classification (.fai required)
    #[arg(long)]
    pub genome: Option<PathBuf>,

    /// File of gene ids to skip, one per line
    #[arg(long)]
    pub ignore_genes: Option<PathBuf>,

    /// File of transcript ids to skip, one per line
    #[arg(long)]
    pub ignore_transcripts: Option<PathBuf>,

    /// Smallest chromosomal gap treated as an intron
    #[arg(long, default_value_t = DEFAULT_MIN_INTRON_SIZE)]
    pub min_intron_size: u64,

    /// Largest single indel tolerated inside an evidence exon
    #[arg(long, default_value_t = QualityLimits::default().max_single_indel)]
    pub max_single_indel: u64,

    /// Largest total indel content of an exon, as a fraction of its length
    #[arg(long, default_value_t = QualityLimits::default().max_indel_fraction)]
    pub max_indel_fraction: f64,

    /// Require matching exon counts; evidence may not extend the annotation
    #[arg(long)]
    pub no_extension: bool,

    /// Print per-evidence detail rows instead of per-verdict summaries
    #[arg(long)]
    pub details: bool,
}

pub fn run(args: EvaluateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let build_config = BuildConfig {
        min_intron_size: args.min_intron_size,
    };
    let eval_config = EvalConfig {
        allow_extension: !args.no_extension,
        limits: QualityLimits {
            max_single_indel: args.max_single_indel,
            max_indel_fraction: args.max_indel_fraction,
        },
    };

    let mut ignore = IgnoreSet::new();
    if let Some(path) = &args.ignore_genes {
        for id in parsing::parse_id_list_file(path)? {
            ignore.add_gene(id);
        }
    }
    if let Some(path) = &args.ignore_transcripts {
        for id in parsing::parse_id_list_file(path)? {
            ignore.add_transcript(id);
        }
    }

    let genome = match &args.genome {
        Some(path) => Some(FastaSeqSource::open(path)?),
        None => None,
    };
    let cached = genome.as_ref().map(|g| CachedSeqSource::new(g));
    let mut builder = FeatureBuilder::new(build_config);
    if let Some(seqs) = &cached {
        builder = builder.with_seq_source(seqs);
    }

    let annot_sources = parsing::parse_genepred_file(&args.annotations)?;
    let genes = build_genes(&builder, &annot_sources);
    if verbose {
        let n_trans: usize = genes.iter().map(|g| g.transcripts.len()).sum();
        eprintln!(
            "Annotations: {} transcripts in {} genes",
            n_trans,
            genes.len()
        );
    }

    let mut evidence_sets = Vec::new();
    for spec in &args.evidence {
        let (set_id, path) = parse_evidence_spec(spec);
        let mut trees = Vec::new();
        for src in parsing::parse_psl_file(&path)? {
            match builder.build_alignment(&src) {
                Ok(tree) => trees.push(tree),
                Err(BuildError::MalformedInput { id, reason }) => {
                    tracing::warn!(%id, %reason, "skipping malformed alignment");
                }
                Err(err) => return Err(err.into()),
            }
        }
        if verbose {
            eprintln!("Evidence set {set_id}: {} alignments", trees.len());
        }
        evidence_sets.push((set_id, trees));
    }

    let mut details: Vec<SupportEvidEvalResult> = Vec::new();
    let mut summaries: Vec<SupportEvalResult> = Vec::new();
    for gene in &genes {
        let Some(bounds) = gene.bounds() else {
            continue;
        };
        for (set_id, trees) in &evidence_sets {
            if !trees.iter().any(|t| t.chrom.overlaps(&bounds)) {
                continue;
            }
            for trans in &gene.transcripts {
                if let Some(result) =
                    evaluate_transcript_support(trans, set_id, trees, &eval_config, &ignore)
                {
                    details.extend(result.details);
                    summaries.extend(result.summaries);
                }
            }
        }
    }

    match format {
        OutputFormat::Text => print_text(&details, &summaries, args.details),
        OutputFormat::Json => print_json(&details, &summaries, args.details)?,
        OutputFormat::Tsv => print_tsv(&details, &summaries, args.details),
    }

    Ok(())
}

/// Build annotation trees and group them into genes. Transcripts without a
/// gene id attribute form a singleton gene under their own id.
fn build_genes(builder: &FeatureBuilder<'_>, sources: &[AnnotSource]) -> Vec<GeneAnnotation> {
    let mut order: Vec<(String, String, Strand)> = Vec::new();
    let mut genes: HashMap<(String, String, Strand), GeneAnnotation> = HashMap::new();
    for src in sources {
        let trans = match builder.build_annotation(src) {
            Ok(trans) => trans,
            Err(err) => {
                tracing::warn!(id = %src.id, %err, "skipping malformed annotation");
                continue;
            }
        };
        let gene_id = trans.attr(GENE_ID_ATTR).unwrap_or(&trans.id).to_string();
        let chrom_name = trans.chrom.name.clone();
        let strand = trans.transcription_strand;
        let key = (gene_id.clone(), chrom_name.clone(), strand);
        genes
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                GeneAnnotation::new(gene_id, chrom_name, strand)
            })
            .add(trans);
    }
    order
        .into_iter()
        .filter_map(|key| genes.remove(&key))
        .collect()
}

fn parse_evidence_spec(spec: &str) -> (String, PathBuf) {
    match spec.split_once('=') {
        Some((set_id, path)) => (set_id.to_string(), PathBuf::from(path)),
        None => {
            let path = PathBuf::from(spec);
            let set_id = Path::new(spec)
                .file_stem()
                .map_or_else(|| spec.to_string(), |s| s.to_string_lossy().into_owned());
            (set_id, path)
        }
    }
}

fn print_text(
    details: &[SupportEvidEvalResult],
    summaries: &[SupportEvalResult],
    with_details: bool,
) {
    if with_details {
        for row in details {
            println!(
                "{}\t{}\t{}\t{}\toff5={} off3={} ext5={} ext3={}",
                row.transcript_id,
                row.evid_set_id,
                row.evid_id,
                row.support,
                row.offset5,
                row.offset3,
                row.extend5_exons,
                row.extend3_exons
            );
        }
    } else {
        for row in summaries {
            println!(
                "{}\t{}\t{}\tn={} off5={} off3={} ext5={} ext3={}",
                row.transcript_id,
                row.evid_set_id,
                row.support,
                row.evid_count,
                row.offset5,
                row.offset3,
                row.extend5_exons,
                row.extend3_exons
            );
        }
    }
}

fn print_json(
    details: &[SupportEvidEvalResult],
    summaries: &[SupportEvalResult],
    with_details: bool,
) -> anyhow::Result<()> {
    let output = if with_details {
        serde_json::to_string_pretty(details)?
    } else {
        serde_json::to_string_pretty(summaries)?
    };
    println!("{output}");
    Ok(())
}

fn print_tsv(
    details: &[SupportEvidEvalResult],
    summaries: &[SupportEvalResult],
    with_details: bool,
) {
    if with_details {
        println!(
            "transcriptId\tevidSetId\tevidId\tsupport\toffset5\toffset3\textend5Exons\textend3Exons"
        );
        for row in details {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.transcript_id,
                row.evid_set_id,
                row.evid_id,
                row.support,
                row.offset5,
                row.offset3,
                row.extend5_exons,
                row.extend3_exons
            );
        }
    } else {
        println!(
            "transcriptId\tevidSetId\tsupport\tevidCount\toffset5\toffset3\textend5Exons\textend3Exons"
        );
        for row in summaries {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.transcript_id,
                row.evid_set_id,
                row.support,
                row.evid_count,
                row.offset5,
                row.offset3,
                row.extend5_exons,
                row.extend3_exons
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_spec_parsing() {
        let (id, path) = parse_evidence_spec("mrnas=/data/mrna.psl");
        assert_eq!(id, "mrnas");
        assert_eq!(path, PathBuf::from("/data/mrna.psl"));

        let (id, path) = parse_evidence_spec("/data/est.psl");
        assert_eq!(id, "est");
        assert_eq!(path, PathBuf::from("/data/est.psl"));
    }
}
