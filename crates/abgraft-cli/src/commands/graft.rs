use crate::cli::GraftArgs;
use crate::config::{GraftConfig, PartialGraftConfig};
use crate::error::{CliError, Result};
use crate::fasta::{self, InputRecord, OutputRecord};
use crate::utils::progress::BatchProgress;
use abgraft::core::germlines::registry::GermlineSet;
use abgraft::core::numbering::engine::AnchorNumberer;
use abgraft::engine::assemble::HumanizationResult;
use abgraft::engine::error::{ChainRole, PipelineError};
use abgraft::engine::progress::ProgressReporter;
use abgraft::workflows::humanize::Humanizer;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use tracing::{error, info, warn};

const HUMANIZED_FASTA: &str = "humanized.fa";
const ALIGNMENTS_FILE: &str = "alignments.txt";
const PAIR_NAME: &str = "Input";

/// Everything one batch produced, in input order.
#[derive(Default)]
pub struct BatchOutput {
    pub fasta: Vec<OutputRecord>,
    pub alignments: Vec<String>,
    pub failures: Vec<(String, PipelineError)>,
}

pub fn run(args: GraftArgs) -> Result<()> {
    run_with(args, std::io::stdin().lock(), std::io::stdout().lock())
}

/// Status lines go to stderr; `stdout` only ever receives FASTA or, for a
/// pair read from `stdin`, the alignment.
fn run_with(args: GraftArgs, stdin: impl BufRead, mut stdout: impl Write) -> Result<()> {
    let partial = match &args.config {
        Some(path) => PartialGraftConfig::from_file(path)?,
        None => PartialGraftConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let GraftConfig {
        params,
        germlines_path,
    } = partial.merge_with_cli(&args)?;

    let numberer = AnchorNumberer::new();
    let germlines = match &germlines_path {
        Some(path) => {
            info!("Loading germline reference set from {:?}", path);
            GermlineSet::load(path, &numberer)?
        }
        None => GermlineSet::builtin(&numberer)?,
    };
    info!(count = germlines.len(), "Germline reference set ready.");

    let humanizer = Humanizer::new(&germlines, &numberer, params, None)?;

    if args.inputs.is_empty() {
        return run_pair(&humanizer, stdin, stdout);
    }

    let records = fasta::read_records(&args.inputs, args.limit)?;
    if records.is_empty() {
        warn!("No FASTA records found in the inputs.");
        eprintln!("Warning: no FASTA records found in the inputs.");
        return Ok(());
    }
    info!("Read {} record(s).", records.len());

    let progress = BatchProgress::new();
    let output = humanize_records(&humanizer, &records, &progress)?;
    let tally = progress.finish();

    for (id, e) in &output.failures {
        error!(record = %id, "{e}");
        eprintln!("✗ {id}: {e}");
    }

    match &args.output {
        Some(path) if args.fasta_only => write_fasta_file(path, &output)?,
        Some(dir) => write_report(dir, &output)?,
        None => fasta::write_records(&mut stdout, &output.fasta)?,
    }

    let succeeded = records.len() - tally.failed;
    eprintln!(
        "Humanized {succeeded} of {} record(s) ({}).",
        records.len(),
        tally.summary()
    );
    if succeeded == 0 {
        return Err(CliError::RecordsFailed {
            failed: tally.failed,
            total: records.len(),
        });
    }
    Ok(())
}

/// Humanizes each record as a single heavy or light chain.
///
/// Records are processed in parallel and collected back in input order. A
/// failing record is kept in [`BatchOutput::failures`], except for
/// configuration errors, which end the batch.
pub fn humanize_records(
    humanizer: &Humanizer,
    records: &[InputRecord],
    progress: &BatchProgress,
) -> Result<BatchOutput> {
    progress.start(records.len());
    let results: Vec<std::result::Result<HumanizationResult, PipelineError>> = records
        .par_iter()
        .map(|record| {
            let result = humanize_record(humanizer, &record.sequence);
            progress.record(&result);
            result
        })
        .collect();

    let mut output = BatchOutput::default();
    for (record, result) in records.iter().zip(results) {
        match result {
            Ok(result) => {
                for chain in result.chains() {
                    output.fasta.push(OutputRecord {
                        id: format!("{}_{}", record.id, chain.chain_type.domain_name()),
                        description: chain.fasta_description(&record.id, &result.provenance),
                        sequence: chain.sequence.clone(),
                    });
                }
                output.alignments.push(result.alignment_string(&record.id));
            }
            Err(e) if e.category().aborts_run() => return Err(e.into()),
            Err(e) => output.failures.push((record.id.clone(), e)),
        }
    }
    Ok(output)
}

fn humanize_record(
    humanizer: &Humanizer,
    sequence: &str,
) -> std::result::Result<HumanizationResult, PipelineError> {
    let silent = ProgressReporter::new();
    match humanizer.detect_role(sequence)? {
        ChainRole::Heavy => humanizer.humanize(Some(sequence), None, &silent),
        ChainRole::Light => humanizer.humanize(None, Some(sequence), &silent),
    }
}

/// Humanizes one VH and/or VL read from `input` as a single antibody and
/// prints the alignment.
fn run_pair(humanizer: &Humanizer, input: impl BufRead, mut stdout: impl Write) -> Result<()> {
    eprintln!("Paste VH and/or VL sequences, then an empty line:");
    let (heavy, light) = read_pair(humanizer, input)?;
    if heavy.is_none() && light.is_none() {
        warn!("No antibody sequence could be read from stdin.");
        eprintln!("Warning: no antibody sequence could be read from stdin.");
        return Ok(());
    }

    let progress = BatchProgress::new();
    let reporter = ProgressReporter::with_callback(progress.pipeline_callback());
    let result = humanizer.humanize(heavy.as_deref(), light.as_deref(), &reporter);
    progress.clear();
    let result = result?;

    writeln!(stdout, "{}", result.alignment(PAIR_NAME))?;
    stdout.flush()?;
    Ok(())
}

/// Collects lines until the first empty line after any content. FASTA headers
/// are skipped. A later chain of the same class replaces an earlier one.
fn read_pair(humanizer: &Humanizer, input: impl BufRead) -> Result<(Option<String>, Option<String>)> {
    let mut heavy = None;
    let mut light = None;
    let mut seen_content = false;
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            if seen_content {
                break;
            }
            continue;
        }
        seen_content = true;
        if line.starts_with('>') {
            continue;
        }
        match humanizer.detect_role(line) {
            Ok(ChainRole::Heavy) => heavy = Some(line.to_string()),
            Ok(ChainRole::Light) => light = Some(line.to_string()),
            Err(e) => warn!("Skipping unreadable sequence: {e}"),
        }
    }
    Ok((heavy, light))
}

fn write_fasta_file(path: &Path, output: &BatchOutput) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fasta::write_records(BufWriter::new(File::create(path)?), &output.fasta)?;
    eprintln!("✓ Humanized sequences written to: {}", path.display());
    Ok(())
}

fn write_report(dir: &Path, output: &BatchOutput) -> Result<()> {
    fs::create_dir_all(dir)?;

    let fasta_path = dir.join(HUMANIZED_FASTA);
    fasta::write_records(BufWriter::new(File::create(&fasta_path)?), &output.fasta)?;
    eprintln!("✓ Humanized sequences written to: {}", fasta_path.display());

    let alignments_path = dir.join(ALIGNMENTS_FILE);
    let mut writer = BufWriter::new(File::create(&alignments_path)?);
    writer.write_all(output.alignments.join("\n").as_bytes())?;
    writer.flush()?;
    eprintln!("✓ Alignments written to: {}", alignments_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use abgraft::core::models::scheme::{CdrDefinition, Scheme};
    use abgraft::engine::config::{GermlineChoice, HumanizationParams, HumanizationParamsBuilder};
    use abgraft::engine::error::{HumanizationError, Stage};
    use bio::io::fasta::Reader;
    use clap::Parser;
    use std::io::Cursor;
    use tempfile::tempdir;

    const HEAVY: &str = "QVQLVESGGGLVQPGGSLRLSCAASGFTFSSYAMSWVRQAPGKGLEWVSAISGSGGSTYYADSVKGRFTISRDNSKNTLYLQMNSLRAEDTAVYYCAKDRLSITIRPRYYGMDVWGQGTTVTVSS";
    const KAPPA: &str = "DIQMTQSPSSLSASVGDRVTITCRASQSISSYLNWYQQKPGKAPKLLIYAASSLQSGVPSRFSGSGSGTDFTLTISSLQPEDFATYYCQQSYSTPLTFGQGTKVEIK";
    const LAMBDA: &str = "QSVLTQPPSASGTPGQRVTISCSGSSSNIGSNTVNWYQQLPGTAPKLLIYSNNQRPSGVPDRFSGSKSGTSASLAISGLQSEDEADYYCAAWDDSLNGVVFGGGTKLTVL";

    fn record(id: &str, sequence: &str) -> InputRecord {
        InputRecord {
            id: id.to_string(),
            sequence: sequence.to_string(),
        }
    }

    fn graft_args(argv: &[&str]) -> GraftArgs {
        match Cli::parse_from(argv).command {
            Commands::Graft(args) => args,
            _ => panic!("Expected 'graft' subcommand"),
        }
    }

    /// Runs `graft` with `stdin` as standard input and returns the stdout bytes.
    fn run_captured(argv: &[&str], stdin: &str) -> (Result<()>, Vec<u8>) {
        let mut stdout = Vec::new();
        let result = run_with(graft_args(argv), Cursor::new(stdin.to_string()), &mut stdout);
        (result, stdout)
    }

    #[test]
    fn records_are_routed_by_chain_class_and_failures_are_kept() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let humanizer =
            Humanizer::new(&set, &AnchorNumberer, HumanizationParams::default(), None).unwrap();
        let records = [
            record("mAb1", HEAVY),
            record("junk", "NOTANANTIBODY"),
            record("mAb2", KAPPA),
        ];

        let output = humanize_records(&humanizer, &records, &BatchProgress::hidden()).unwrap();

        let ids: Vec<&str> = output.fasta.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["mAb1_VH", "mAb2_VL"]);
        assert!(output.fasta[0].sequence.starts_with("EVQLLESGG"));
        assert_eq!(
            output.fasta[0].description,
            "mAb1 VH (Humanized mAb1 CDR_Grafted_kabat_IGHV3-23*01)"
        );
        assert_eq!(output.alignments.len(), 2);
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].0, "junk");
        assert_eq!(output.failures[0].1.stage, Stage::Numbering);
    }

    #[test]
    fn kappa_germline_in_a_mixed_light_batch_only_fails_the_lambda_record() {
        let set = GermlineSet::builtin(&AnchorNumberer).unwrap();
        let params = HumanizationParamsBuilder::new()
            .scheme(Scheme::Kabat)
            .cdr_definition(CdrDefinition::Kabat)
            .light_v_germline(GermlineChoice::Explicit("IGKV1-39*01".to_string()))
            .build()
            .unwrap();
        let humanizer = Humanizer::new(&set, &AnchorNumberer, params, None).unwrap();
        let records = [
            record("k1", KAPPA),
            record("l1", LAMBDA),
            record("k2", KAPPA),
        ];

        let output = humanize_records(&humanizer, &records, &BatchProgress::hidden()).unwrap();

        let ids: Vec<&str> = output.fasta.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["k1_VL", "k2_VL"]);
        assert_eq!(output.failures.len(), 1);
        let (id, e) = &output.failures[0];
        assert_eq!(id, "l1");
        assert_eq!(e.stage, Stage::GermlineSelection);
        assert!(matches!(
            e.source,
            HumanizationError::GermlineChainMismatch { .. }
        ));
    }

    #[test]
    fn mixed_light_batch_still_writes_the_report() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("mix.fa");
        fs::write(&input, format!(">k1\n{KAPPA}\n>l1\n{LAMBDA}\n>k2\n{KAPPA}\n")).unwrap();
        let out = dir.path().join("out");

        let (result, _) = run_captured(
            &[
                "abgraft",
                "graft",
                input.to_str().unwrap(),
                "--light-v-germline",
                "IGKV1-39*01",
                "--output",
                out.to_str().unwrap(),
            ],
            "",
        );
        result.unwrap();

        let fasta = fs::read_to_string(out.join(HUMANIZED_FASTA)).unwrap();
        assert_eq!(fasta.matches('>').count(), 2);
        assert!(fasta.contains(">k1_VL "));
        assert!(fasta.contains(">k2_VL "));
    }

    #[test]
    fn stdout_carries_only_fasta_records() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.fa");
        fs::write(&input, format!(">mAb1\n{HEAVY}\n>junk\nQVQLVESGG\n>mAb2\n{KAPPA}\n")).unwrap();

        let (result, stdout) = run_captured(&["abgraft", "graft", input.to_str().unwrap()], "");
        result.unwrap();

        let text = String::from_utf8(stdout.clone()).unwrap();
        assert!(text.starts_with(">mAb1_VH "));
        assert!(text.ends_with('\n'));
        let records: Vec<_> = Reader::new(&stdout[..])
            .records()
            .map(|r| r.unwrap())
            .collect();
        let ids: Vec<&str> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["mAb1_VH", "mAb2_VL"]);
        for r in &records {
            assert!(r.seq().iter().all(u8::is_ascii_uppercase));
        }
        assert!(records[1].seq().ends_with(b"KVEIK"));
    }

    #[test]
    fn empty_inputs_leave_stdout_empty() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.fa");
        fs::write(&input, "").unwrap();

        let (result, stdout) = run_captured(&["abgraft", "graft", input.to_str().unwrap()], "");
        result.unwrap();
        assert!(stdout.is_empty());
    }

    #[test]
    fn run_writes_fasta_and_alignments() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.fa");
        fs::write(&input, format!(">mAb1\n{HEAVY}\n>mAb1\n{KAPPA}\n")).unwrap();
        let out = dir.path().join("out");

        let (result, stdout) = run_captured(
            &[
                "abgraft",
                "graft",
                input.to_str().unwrap(),
                "--output",
                out.to_str().unwrap(),
                "--backmutate-vernier",
            ],
            "",
        );
        result.unwrap();
        assert!(stdout.is_empty());

        let fasta = fs::read_to_string(out.join(HUMANIZED_FASTA)).unwrap();
        assert!(fasta.starts_with(
            ">mAb1_VH mAb1 VH (Humanized mAb1 CDR_Grafted_kabat_Vernier_IGHV3-23*01)\n"
        ));
        assert!(fasta.contains(">mAb1_VL mAb1 VL (Humanized mAb1 CDR_Grafted_kabat_Vernier_IGKV1-39*01)\n"));

        let alignments = fs::read_to_string(out.join(ALIGNMENTS_FILE)).unwrap();
        assert!(alignments.starts_with("mAb1 VH\n"));
        assert!(alignments.contains("\nmAb1 VL\n"));
        assert!(alignments.contains("IGHV3-23*01 + IGHJ6*02"));
    }

    #[test]
    fn fasta_only_output_is_a_file_path() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.fa");
        fs::write(&input, format!(">mAb1\n{HEAVY}\n>mAb2\n{KAPPA}\n")).unwrap();
        let target = dir.path().join("results").join("humanized.fa");

        let (result, _) = run_captured(
            &[
                "abgraft",
                "graft",
                input.to_str().unwrap(),
                "--output",
                target.to_str().unwrap(),
                "--fasta-only",
                "--limit",
                "1",
            ],
            "",
        );
        result.unwrap();

        assert!(target.is_file());
        let fasta = fs::read_to_string(&target).unwrap();
        assert_eq!(fasta.matches('>').count(), 1);
        assert!(!dir.path().join("results").join(ALIGNMENTS_FILE).exists());
    }

    #[test]
    fn a_batch_with_no_successes_is_an_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.fa");
        fs::write(&input, ">junk\nQVQLVESGG\n").unwrap();

        let (result, _) = run_captured(
            &[
                "abgraft",
                "graft",
                input.to_str().unwrap(),
                "--output",
                dir.path().join("out").to_str().unwrap(),
            ],
            "",
        );
        assert!(matches!(
            result,
            Err(CliError::RecordsFailed { failed: 1, total: 1 })
        ));
    }

    #[test]
    fn unsupported_pair_aborts_before_reading_inputs() {
        let (result, _) = run_captured(
            &["abgraft", "graft", "/no/such/input.fa", "--scheme", "aho"],
            "",
        );
        assert!(matches!(result, Err(CliError::Pipeline(e)) if e.stage == Stage::Configuration));
    }

    #[test]
    fn stdin_pair_is_humanized_as_one_antibody() {
        let stdin = format!("\n>VH\n{HEAVY}\n{KAPPA}\n\n{LAMBDA}\n");
        let (result, stdout) = run_captured(&["abgraft", "graft"], &stdin);
        result.unwrap();

        let text = String::from_utf8(stdout).unwrap();
        let blocks: Vec<&str> = text.trim_end().split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("Input VH\n"));
        assert!(blocks[0].contains("IGHV3-23*01 + IGHJ6*02"));
        // Reading stops at the first empty line after content, so the lambda chain is ignored.
        assert!(blocks[1].starts_with("Input VL\n"));
        assert!(blocks[1].contains("IGKV1-39*01"));
    }

    #[test]
    fn stdin_without_antibodies_prints_nothing() {
        let (result, stdout) = run_captured(&["abgraft", "graft"], "NOTANANTIBODY\n\n");
        result.unwrap();
        assert!(stdout.is_empty());
    }
}
