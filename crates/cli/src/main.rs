use clap::{Parser, Subcommand};
use dragonfly_search_core::config;
use dragonfly_search_core::stop_words::{generate_stop_words, load_stop_words, save_stop_words};
use dragonfly_search_core::{tsv, IndexManager, SearchResults};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dragonfly-search",
    about = "Local search index for tokenized TSV annotation corpora"
)]
struct Args {
    /// Corpus directory of tokenized TSV files
    data_dir: PathBuf,

    /// Directory for the index and other corpus metadata (default: <data_dir>/.dragonfly)
    #[arg(long)]
    metadata_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the index in the background and wait for it to finish
    Build,
    /// Look up a term, building the index first if none exists
    Query {
        term: String,
        /// Treat the term as a shell-style pattern (*, ?, [...])
        #[arg(short, long, default_value_t = false)]
        wildcards: bool,
        /// Maximum number of refs to print
        #[arg(long, default_value_t = config::MAX_ENTRIES)]
        limit: usize,
    },
    /// Rank the words of one corpus file by TF-IDF
    TopWords {
        file: PathBuf,
        #[arg(short, default_value_t = config::DEFAULT_TOP_WORDS)]
        n: usize,
        /// Leave out words in the saved stop word list
        #[arg(long, default_value_t = false)]
        skip_stop_words: bool,
    },
    /// Save the corpus's most frequent tokens as its stop word list
    StopWords {
        #[arg(short, default_value_t = config::DEFAULT_STOP_WORDS)]
        n: usize,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::from_default_env()
        .add_directive(
            "dragonfly_search=info"
                .parse()
                .expect("valid directive literal"),
        )
        .add_directive(
            "dragonfly_search_core=info"
                .parse()
                .expect("valid directive literal"),
        );
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn print_results(results: &SearchResults, limit: usize) {
    let terms: Vec<&str> = results.terms.iter().map(String::as_str).collect();
    println!("terms: {}", terms.join(", "));
    println!("count: {}", results.count);
    for r in results.refs.iter().take(limit) {
        println!("  {}:{}\t{}", r.doc, r.sentence_index, r.text.join(" "));
        if let Some(translit) = &r.translit {
            println!("  {:>width$}\t{}", "", translit.join(" "), width = r.doc.len() + 2);
        }
    }
    if results.refs.len() > limit {
        println!("  ... {} more", results.refs.len() - limit);
    }
}

fn run(args: Args, metadata_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Build => {
            let manager = IndexManager::new(&args.data_dir, metadata_dir)?;
            let start = Instant::now();
            manager.build_index(true)?;
            println!("Index build queued for {}", manager.data_dir().display());
            manager.wait_idle()?;
            if !manager.is_loaded() {
                return Err("index build failed; see log for details".into());
            }
            let index = manager.index();
            println!(
                "Indexed {} documents, {} terms in {:.2?} -> {}",
                index.num_documents(),
                index.num_terms(),
                start.elapsed(),
                manager.index_path().display()
            );
        }
        Command::Query {
            term,
            wildcards,
            limit,
        } => {
            let manager = IndexManager::new(&args.data_dir, metadata_dir)?;
            manager.load_index(false, true)?;
            let results = manager.retrieve(&term, wildcards)?;
            print_results(&results, limit);
        }
        Command::TopWords {
            file,
            n,
            skip_stop_words,
        } => {
            let manager = IndexManager::new(&args.data_dir, metadata_dir)?;
            manager.load_index(false, true)?;
            let document = tsv::read_document(&file)?;
            let stats = match manager.document_stats(&document) {
                Some(stats) => stats?,
                None => return Err("no search index available".into()),
            };
            let top = if skip_stop_words {
                let stop: HashSet<String> =
                    load_stop_words(manager.metadata_dir())?.into_iter().collect();
                stats.top_words_excluding(n, &stop)
            } else {
                stats.top_words(n)
            };
            println!(
                "{}: top {} of {} distinct words",
                document.id,
                top.len(),
                stats.num_words()
            );
            for (word, score) in top {
                println!("{score:>10.4}  {word}");
            }
        }
        Command::StopWords { n } => {
            let words = generate_stop_words(&args.data_dir, n)?;
            save_stop_words(metadata_dir, &words)?;
            println!(
                "Saved {} stop words to {}",
                words.len(),
                metadata_dir.join(config::STOP_WORDS_FILENAME).display()
            );
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.json);

    if !args.data_dir.is_dir() {
        eprintln!(
            "Error: data_dir '{}' does not exist or is not a directory",
            args.data_dir.display()
        );
        std::process::exit(1);
    }
    let metadata_dir = args
        .metadata_dir
        .clone()
        .unwrap_or_else(|| args.data_dir.join(config::METADATA_DIR_NAME));

    if let Err(e) = run(args, &metadata_dir) {
        tracing::error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
