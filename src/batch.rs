//! Batch evaluation against precomputed reference scores.
//!
//! Inputs:
//! - A JSON configuration mapping a dataset name to its penalties and the
//!   path of its solution file:
//!   `{"affine": {"penalties": {"m": 0, "x": 4, "o": 6, "e": 2}, "solutions": "affine.tsv"}}`.
//!   Solution paths are relative to the configuration file.
//! - A sequence corpus of alternating `>SEQ1` / `<SEQ2` lines.
//! - Per dataset, one `score\tCIGAR` line per pair, where the reference
//!   score is the negated alignment cost.

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Deserialize;

use crate::{
    align::Aligner, cigar::Cigar, config::AlignConfig, penalty::Penalties, task::AlignTask,
};

/// Penalties as written in the configuration.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyConfig {
    /// Match penalty. Accepted for compatibility, must be 0.
    #[serde(default)]
    pub m: i64,
    /// Mismatch.
    pub x: i64,
    /// Gap open.
    pub o: i64,
    /// Gap extend.
    pub e: i64,
}

impl PenaltyConfig {
    /// Validate into a [`Penalties`].
    pub fn to_penalties(&self) -> anyhow::Result<Penalties> {
        if self.m != 0 {
            bail!("match penalty must be 0, got {}", self.m);
        }
        Ok(Penalties::new(self.x, self.o, self.e)?)
    }
}

/// One dataset of the configuration.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Penalties the reference scores were computed with.
    pub penalties: PenaltyConfig,
    /// Solution file.
    pub solutions: PathBuf,
}

/// Parsed configuration with solution paths resolved.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Datasets by name, in name order.
    pub cases: BTreeMap<String, TestCase>,
}

impl BatchConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch configuration {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json(&json, base_dir)
            .with_context(|| format!("Invalid batch configuration {}", path.display()))
    }

    /// Parse a configuration, resolving relative solution paths against `base_dir`.
    pub fn from_json(json: &str, base_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut cases: BTreeMap<String, TestCase> = serde_json::from_str(json)?;
        for case in cases.values_mut() {
            if case.solutions.is_relative() {
                case.solutions = base_dir.as_ref().join(&case.solutions);
            }
        }
        Ok(BatchConfig { cases })
    }
}

/// One pair of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// First sequence, without its `>` marker.
    pub seq1: Vec<u8>,
    /// Second sequence, without its `<` marker.
    pub seq2: Vec<u8>,
}

/// Read a `>`/`<` corpus from disk.
pub fn read_corpus(path: impl AsRef<Path>) -> anyhow::Result<Vec<SequenceRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sequences {}", path.display()))?;
    parse_corpus(&text).with_context(|| format!("Invalid sequences {}", path.display()))
}

/// Parse alternating `>SEQ1` / `<SEQ2` lines. Blank lines are skipped.
pub fn parse_corpus(text: &str) -> anyhow::Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    let mut pending: Option<Vec<u8>> = None;
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        match (line.strip_prefix('>'), line.strip_prefix('<'), pending.take()) {
            (Some(seq1), _, None) => pending = Some(seq1.as_bytes().to_vec()),
            (_, Some(seq2), Some(seq1)) => records.push(SequenceRecord {
                seq1,
                seq2: seq2.as_bytes().to_vec(),
            }),
            (Some(_), _, Some(_)) => bail!("line {}: expected '<' after a '>' line", idx + 1),
            (_, Some(_), None) => bail!("line {}: '<' line without a preceding '>'", idx + 1),
            _ => bail!("line {}: expected a line starting with '>' or '<'", idx + 1),
        }
    }
    if pending.is_some() {
        bail!("corpus ends with an unpaired '>' line");
    }
    Ok(records)
}

/// Reference result for one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Negated optimal cost.
    pub score: i64,
    /// Reference script, if given.
    pub cigar: Option<String>,
}

/// Parse `score\tCIGAR` lines. Blank lines are skipped.
pub fn parse_solutions(text: &str) -> anyhow::Result<Vec<Solution>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let mut fields = line.trim_end().split('\t');
            let score = fields
                .next()
                .unwrap_or_default()
                .trim()
                .parse()
                .with_context(|| format!("line {}: invalid score", idx + 1))?;
            let cigar = fields.next().map(str::to_string);
            Ok(Solution { score, cigar })
        })
        .collect()
}

/// Knobs for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Evaluate at most this many pairs per dataset.
    pub limit: Option<usize>,
    /// Draw a progress bar on stderr.
    pub progress: bool,
    /// Also compute each CIGAR and check it against the sequences and the score.
    pub verify_cigars: bool,
}

/// Accuracy and speed on one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetReport {
    /// Dataset name.
    pub name: String,
    /// Pairs evaluated.
    pub total: usize,
    /// Pairs whose score matched the reference.
    pub correct: usize,
    /// Pairs whose CIGAR failed verification. Always 0 unless verifying.
    pub invalid_cigars: usize,
    /// Mean alignment time per input symbol, in seconds.
    pub secs_per_char: f64,
}

impl DatasetReport {
    /// Fraction of pairs scored correctly. 1.0 for an empty dataset.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

impl fmt::Display for DatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "test: {}", self.name)?;
        writeln!(f, "correct: {}", self.correct)?;
        writeln!(f, "total: {}", self.total)?;
        writeln!(f, "accuracy: {:.4}", self.accuracy())?;
        if self.invalid_cigars > 0 {
            writeln!(f, "invalid CIGARs: {}", self.invalid_cigars)?;
        }
        write!(
            f,
            "average time per character (ms): {:.6}",
            self.secs_per_char * 1000.0
        )
    }
}

struct PairOutcome {
    correct: bool,
    valid_cigar: bool,
    secs: f64,
    chars: usize,
}

/// Evaluate one dataset. Pairs are aligned in parallel; each alignment is independent.
pub fn run_dataset(
    name: &str,
    case: &TestCase,
    corpus: &[SequenceRecord],
    options: &BatchOptions,
) -> anyhow::Result<DatasetReport> {
    let penalties = case
        .penalties
        .to_penalties()
        .with_context(|| format!("Invalid penalties for {name}"))?;
    let text = fs::read_to_string(&case.solutions)
        .with_context(|| format!("Failed to read solutions {}", case.solutions.display()))?;
    let solutions = parse_solutions(&text)
        .with_context(|| format!("Invalid solutions {}", case.solutions.display()))?;
    if solutions.len() != corpus.len() {
        log::warn!(
            "{name}: {} solutions for {} sequence pairs, evaluating the common prefix",
            solutions.len(),
            corpus.len()
        );
    }

    let total = corpus
        .len()
        .min(solutions.len())
        .min(options.limit.unwrap_or(usize::MAX));
    let task = if options.verify_cigars {
        AlignTask::Path
    } else {
        AlignTask::Score
    };
    let aligner = Aligner::new(penalties, AlignConfig::with_task(task))?;

    let bar = if options.progress {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?);
        bar.set_message(name.to_string());
        bar
    } else {
        ProgressBar::hidden()
    };

    let outcomes = corpus[..total]
        .par_iter()
        .zip(solutions[..total].par_iter())
        .enumerate()
        .map(|(idx, (record, solution))| -> anyhow::Result<PairOutcome> {
            let start = Instant::now();
            let alignment = aligner.align(&record.seq1, &record.seq2)?;
            let secs = start.elapsed().as_secs_f64();

            let correct = i64::from(alignment.score) == -solution.score;
            if !correct {
                log::warn!(
                    "{name}#{idx}: got score {}, expected {}",
                    alignment.score,
                    -solution.score
                );
            }
            let valid_cigar = match &alignment.cigar {
                Some(cigar) => verify(cigar, record, &aligner, alignment.score)
                    .map_err(|err| log::warn!("{name}#{idx}: {err:#}"))
                    .is_ok(),
                None => true,
            };
            bar.inc(1);
            Ok(PairOutcome {
                correct,
                valid_cigar,
                secs,
                chars: record.seq1.len() + record.seq2.len(),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    bar.finish_and_clear();

    let per_char: Vec<f64> = outcomes
        .iter()
        .filter(|outcome| outcome.chars > 0)
        .map(|outcome| outcome.secs / outcome.chars as f64)
        .collect();
    let secs_per_char = if per_char.is_empty() {
        0.0
    } else {
        per_char.iter().sum::<f64>() / per_char.len() as f64
    };

    Ok(DatasetReport {
        name: name.to_string(),
        total,
        correct: outcomes.iter().filter(|outcome| outcome.correct).count(),
        invalid_cigars: outcomes
            .iter()
            .filter(|outcome| !outcome.valid_cigar)
            .count(),
        secs_per_char,
    })
}

/// The script must cover both sequences and cost exactly the reported score.
fn verify(
    cigar: &Cigar,
    record: &SequenceRecord,
    aligner: &Aligner,
    score: u32,
) -> anyhow::Result<()> {
    cigar.check(&record.seq1, &record.seq2, aligner.equality())?;
    let rescored = cigar.score(aligner.penalties());
    if rescored != u64::from(score) {
        bail!("CIGAR {cigar} costs {rescored}, alignment reported {score}");
    }
    Ok(())
}

/// Evaluate every dataset of `config`, in name order.
pub fn run_batch(
    config: &BatchConfig,
    corpus: &[SequenceRecord],
    options: &BatchOptions,
) -> anyhow::Result<Vec<DatasetReport>> {
    config
        .cases
        .iter()
        .map(|(name, case)| {
            log::info!("running {name} on {} pairs", corpus.len());
            run_dataset(name, case, corpus, options)
        })
        .collect()
}
