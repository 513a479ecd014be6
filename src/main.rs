use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use rs_wfa::{
    align::Aligner,
    batch::{self, BatchConfig, BatchOptions},
    cigar::CigarFormat,
    config::AlignConfig,
    equal::EqualityPair,
    heuristic::BandHeuristic,
    mode::MemoryMode,
    penalty::Penalties,
    task::AlignTask,
};

#[derive(Parser)]
#[command(name = "rs_wfa")]
#[command(about = "Gap-affine wavefront alignment of sequence pairs")]
struct Cli {
    /// Logging verbosity. RUST_LOG refines it per module.
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// M for matches, X for mismatches.
    Wfa,
    /// = for matches, X for mismatches.
    Extended,
    /// M for both matches and mismatches.
    Standard,
}

impl From<Format> for CigarFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Wfa => CigarFormat::Wfa,
            Format::Extended => CigarFormat::Extended,
            Format::Standard => CigarFormat::Standard,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Align two sequences and print the score and CIGAR.
    Align(AlignArgs),
    /// Score a sequence corpus against reference solutions.
    Batch {
        /// JSON file mapping dataset names to penalties and solution files.
        config: String,
        /// Corpus of alternating '>SEQ1' and '<SEQ2' lines.
        sequences: String,
        /// Evaluate at most this many pairs per dataset.
        #[arg(long)]
        limit: Option<usize>,
        /// Also compute CIGARs and check them against sequences and scores.
        #[arg(long)]
        verify_cigars: bool,
        /// Hide the progress bar.
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Args)]
struct AlignArgs {
    /// First sequence. Deletions remove its symbols.
    seq1: String,
    /// Second sequence. Insertions add its symbols.
    seq2: String,
    /// Mismatch penalty.
    #[arg(short = 'x', long, default_value_t = 4)]
    mismatch: i64,
    /// Gap open penalty.
    #[arg(short = 'o', long, default_value_t = 6)]
    gap_open: i64,
    /// Gap extend penalty.
    #[arg(short = 'e', long, default_value_t = 2)]
    gap_extend: i64,
    /// Print the score only.
    #[arg(long)]
    score_only: bool,
    /// CIGAR letters.
    #[arg(long, value_enum, default_value = "wfa")]
    format: Format,
    /// Keep checkpoints every N score levels and re-derive the rest during backtrace.
    #[arg(long)]
    checkpoint_interval: Option<usize>,
    /// Prune lagging diagonals. The score is then an upper bound.
    #[arg(long)]
    band: bool,
    /// Narrowest wavefront the band prunes.
    #[arg(long, default_value_t = 10, requires = "band")]
    min_wavefront_length: usize,
    /// Largest tolerated lag behind the leading diagonal.
    #[arg(long, default_value_t = 50, requires = "band")]
    max_distance: usize,
    /// Give up once the score would exceed this.
    #[arg(long)]
    max_score: Option<u32>,
    /// Treat upper and lower case letters as equal.
    #[arg(long)]
    ignore_case: bool,
}

impl AlignArgs {
    fn config(&self) -> AlignConfig {
        AlignConfig {
            task: AlignTask::from_compute_cigar(!self.score_only),
            memory: self
                .checkpoint_interval
                .map_or(MemoryMode::Full, |interval| MemoryMode::Checkpointed {
                    interval,
                }),
            heuristic: self.band.then_some(BandHeuristic {
                min_wavefront_length: self.min_wavefront_length,
                max_distance: self.max_distance,
            }),
            max_score: self.max_score,
            added_equalities: if self.ignore_case {
                EqualityPair::ascii_case()
            } else {
                Vec::new()
            },
        }
    }
}

fn run_align(args: &AlignArgs) -> anyhow::Result<()> {
    let penalties = Penalties::new(args.mismatch, args.gap_open, args.gap_extend)?;
    let aligner = Aligner::new(penalties, args.config())?;
    let alignment = aligner.align(&args.seq1, &args.seq2)?;

    println!("score: {}", alignment.score);
    if let Some(cigar) = &alignment.cigar {
        println!("cigar: {}", cigar.to_string_as(args.format.into()));
    }
    if !alignment.guaranteed_optimal {
        println!("optimal: not guaranteed");
    }
    Ok(())
}

fn run_batch(
    config: &str,
    sequences: &str,
    options: &BatchOptions,
) -> anyhow::Result<()> {
    let config = BatchConfig::load(config)?;
    let corpus = batch::read_corpus(sequences)?;
    info!(
        "loaded {} datasets and {} sequence pairs",
        config.cases.len(),
        corpus.len()
    );

    let reports = batch::run_batch(&config, &corpus, options)?;
    let mut failed = 0;
    for report in &reports {
        println!("{report}\n");
        if report.correct < report.total || report.invalid_cigars > 0 {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} datasets did not match their solutions", reports.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level.to_level_filter())
        .format_module_path(false)
        .init();

    match &cli.command {
        Commands::Align(args) => run_align(args),
        Commands::Batch {
            config,
            sequences,
            limit,
            verify_cigars,
            quiet,
        } => run_batch(
            config,
            sequences,
            &BatchOptions {
                limit: *limit,
                progress: !quiet,
                verify_cigars: *verify_cigars,
            },
        ),
    }
}
