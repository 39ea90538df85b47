use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser as Clap_parser;
use collagenrs::config::{self, AnalysisConfig};
use collagenrs::error::Result;
use collagenrs::pipeline::{run_batch, BatchOptions, BatchOutcome};
use collagenrs::prompt;
use log::{error, info, log_enabled, Level, LevelFilter};

#[derive(Clap_parser, Debug, Clone)]
#[command(author, version, about = "White balance histology slides and measure collagen area", long_about = None)]
struct Args {
    /// Directory containing the slide images
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Thresholds and options, TOML
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Where Results.csv and Results/ are written [default: INPUT_DIR]
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Write corrected images, white samples, overlays and whitespace masks here for review
    #[arg(short, long, value_name = "PREVIEW_DIR")]
    preview_dir: Option<PathBuf>,

    /// Fail on files that are not decodable images instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Answer yes to every prompt
    #[arg(short, long)]
    yes: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn run(args: Args) -> Result<()> {
    let mut analysis_config = match &args.config {
        Some(path) => config::parse_config(path)?,
        None => AnalysisConfig::default(),
    };
    analysis_config.strict |= args.strict;

    let mut options = BatchOptions::new(args.input_dir);
    if let Some(output_dir) = args.output_dir {
        options.output_dir = output_dir;
    }
    options.preview_dir = args.preview_dir;

    let yes = args.yes;
    let now = Instant::now();
    let outcome = run_batch(&options, &analysis_config, |stage| yes || prompt::ask_stdin(stage))?;

    match outcome {
        BatchOutcome::Declined => info!("white balance rejected, nothing written"),
        BatchOutcome::Completed { results, saved: None } => {
            info!("analysed {} images, results not saved", results.len())
        }
        BatchOutcome::Completed { results, saved: Some(saved) } => {
            info!("analysed {} images, results in {}", results.len(), saved.csv.display())
        }
    }
    info!("total time: {:.2?}", now.elapsed());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // RUST_LOG=off must not hide why the run failed
            if log_enabled!(Level::Error) {
                error!("{}", e);
            } else {
                eprintln!("error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
