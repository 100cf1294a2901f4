use clap::Parser;
use clap::error::ErrorKind;
use infocalc::error::{EXIT_INVALID_INVOCATION, EXIT_OK};
use infocalc::{AlphabetModel, AlphabetSource, InfoError, init_tracing};
use std::path::PathBuf;

/// Summarize an alphabet's distribution and entropy.
#[derive(Debug, Parser)]
#[command(name = "infocalc-entropy", version)]
struct Args {
    /// Alphabet file; defaults to the English alphabet.
    #[arg(env = "INFOCALC_ALPHABET")]
    alphabet: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let status = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_INVALID_INVOCATION,
            };
            let _ = err.print();
            std::process::exit(status);
        }
    };
    init_tracing(args.verbose);
    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run(args: Args) -> Result<(), InfoError> {
    let source = AlphabetSource::resolve(args.alphabet);
    let model = AlphabetModel::build(&source)?;

    println!("Alphabet: {source}");
    println!("Symbols: {}", model.len());
    println!(
        "Distribution: {}",
        if model.is_uniform() { "uniform" } else { "weighted" }
    );
    println!("Entropy: {:.4} bits/symbol", model.entropy_bits());
    println!("Maximum entropy: {:.4} bits/symbol", (model.len() as f64).log2());

    Ok(())
}
