use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use tourney_rs::corpus;
use tourney_rs::dot::Exporter;
use tourney_rs::report;
use tourney_rs::TourneyTree;

#[derive(Parser, Debug)]
#[command(
    name = "tourney",
    about = "Rank the words of a corpus by frequency, most frequent first.",
    version
)]
struct Cli {
    /// Render the tree to insertion_N.pdf / suppression_N.pdf after every
    /// change (needs graphviz `dot`).
    #[arg(short = 'g', long = "graph")]
    graph: bool,

    /// Stop starting new frequency tiers once this many words are written.
    ///
    /// A tier of tied words is never cut, so the list can be longer.
    #[arg(short = 'n', long = "max-words", value_name = "N")]
    max_words: Option<usize>,

    /// File receiving one `word percentage%` line per word.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Text files to read. Unreadable files are skipped.
    #[arg(value_name = "CORPUS", required = true)]
    corpus: Vec<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut tree = TourneyTree::new();
    let mut exporter = cli.graph.then(|| Exporter::new("."));

    let stats = corpus::load_all(&mut tree, &cli.corpus, |tree| {
        if let Some(exporter) = exporter.as_mut() {
            exporter.after_insert(tree);
        }
    })
    .context("building the frequency tree")?;
    info!("words inserted: {}", stats.words);
    info!(
        "distinct words: {}, tree height: {}",
        tree.len(),
        tree.height()
    );
    info!("total occurrences: {}", tree.total_occurrences());

    let out = File::create(&cli.output)
        .with_context(|| format!("cannot open {}", cli.output.display()))?;
    let summary = report::write_ranking(&mut tree, BufWriter::new(out), cli.max_words, |tree| {
        if let Some(exporter) = exporter.as_mut() {
            exporter.after_extract(tree);
        }
    })
    .with_context(|| format!("writing {}", cli.output.display()))?;

    info!("words written: {}", summary.words_written);
    info!("results written to {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(1);
        }
        Err(e) => e.exit(),
    };

    let _r = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .try_init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
