use clap::Parser;
use clap::error::ErrorKind;
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use infocalc::error::{EXIT_INVALID_INVOCATION, EXIT_OK};
use infocalc::{
    AlphabetModel, AlphabetSource, CalculationResult, CodeTable, InfoError, InfoResult,
    InformationCalculator, init_tracing, read_word_list,
};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info, warn};

const PROGRESS_THRESHOLD: usize = 10_000;

/// Compute the Shannon information content of words over an alphabet.
#[derive(Debug, Parser)]
#[command(name = "infocalc", version)]
struct Cli {
    /// Word to score, one character per symbol.
    word: Option<String>,

    /// Alphabet file, one symbol (or `symbol,weight`) per line. Defaults to English.
    /// Only read after a WORD; without a word, pass the alphabet with `--alphabet`.
    #[arg(value_name = "ALPHABET")]
    alphabet_path: Option<PathBuf>,

    /// Alphabet file given as a flag; the positional form wins when both are present.
    #[arg(short, long, value_name = "PATH", env = "INFOCALC_ALPHABET")]
    alphabet: Option<PathBuf>,

    /// Score every word in FILE, one per line.
    #[arg(short, long, value_name = "FILE")]
    words: Option<PathBuf>,

    /// Print the entropy of the alphabet.
    #[arg(short, long)]
    entropy: bool,

    /// Print the average codeword length of a `symbol,codeword` table.
    #[arg(short = 'L', long, value_name = "FILE")]
    acwl: Option<PathBuf>,

    /// Log progress and per-symbol detail to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Emit the report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let status = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_INVALID_INVOCATION,
            };
            let _ = err.print();
            process::exit(status);
        }
    };

    init_tracing(cli.verbose);
    match run(cli) {
        Ok(status) => process::exit(status),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(err.exit_code());
        }
    }
}

fn run(cli: Cli) -> InfoResult<i32> {
    if cli.word.is_none() && cli.words.is_none() && !cli.entropy && cli.acwl.is_none() {
        return Err(InfoError::InvalidInvocation(String::from(
            "missing word; usage: infocalc <word> [alphabet-source]",
        )));
    }

    if let (Some(word), None) = (&cli.word, &cli.alphabet_path) {
        let other_mode = cli.entropy || cli.acwl.is_some() || cli.words.is_some();
        if other_mode && Path::new(word).is_file() {
            return Err(InfoError::InvalidInvocation(format!(
                "{word:?} is a file, not a word; pass an alphabet with --alphabet"
            )));
        }
    }

    let source = AlphabetSource::resolve(cli.alphabet_path.or(cli.alphabet));
    info!(%source, "loading alphabet");
    let model = AlphabetModel::build(&source)?;
    let calculator = InformationCalculator::new(&model);
    let mut report = Report {
        alphabet: source.to_string(),
        symbols: model.len(),
        words: Vec::new(),
        entropy_bits: None,
        code: None,
    };
    let mut status = EXIT_OK;

    if let Some(word) = &cli.word {
        let result = calculator.information_content(word)?;
        log_contributions(&result);
        report.words.push(WordReport::scored(&result));
    }

    if let Some(path) = &cli.words {
        let words = read_word_list(path)?;
        for (word, result) in words.iter().zip(score_with_progress(&calculator, &words)) {
            match result {
                Ok(result) => {
                    log_contributions(&result);
                    report.words.push(WordReport::scored(&result));
                }
                Err(err) => {
                    status = err.exit_code();
                    report.words.push(WordReport::failed(word, &err));
                }
            }
        }
    }

    if cli.entropy {
        report.entropy_bits = Some(model.entropy_bits());
    }

    if let Some(path) = &cli.acwl {
        let code = CodeTable::from_path(path)?;
        let (expected_length, expected_length_error) =
            match code.expected_codeword_length(&model) {
                Ok(length) => (Some(length), None),
                Err(err) => {
                    warn!(%err, "skipping expected codeword length");
                    (None, Some(err.to_string()))
                }
            };
        report.code = Some(CodeReport {
            path: path.display().to_string(),
            codewords: code.len(),
            average_length: code.average_codeword_length(),
            expected_length,
            expected_length_error,
        });
    }

    if cli.json {
        serde_json::to_writer_pretty(io::stdout().lock(), &report)?;
        println!();
    } else {
        print_report(&report);
    }
    Ok(status)
}

fn score_with_progress(
    calculator: &InformationCalculator<'_>,
    words: &[String],
) -> Vec<InfoResult<CalculationResult>> {
    let bar = if words.len() >= PROGRESS_THRESHOLD {
        ProgressBar::new(words.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    bar.set_message("Scoring words");
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:<16} {bar:40.cyan/blue} {pos:>7}/{len:<7} [{elapsed_precise}]")
            .expect("valid template"),
    );

    let results =
        calculator.score_words(words.iter().map(String::as_str).progress_with(bar.clone()));
    bar.finish_and_clear();
    results
}

fn log_contributions(result: &CalculationResult) {
    for contribution in result.contributions() {
        debug!(
            symbol = %contribution.symbol,
            position = contribution.position,
            probability = contribution.probability,
            bits = contribution.bits,
            "symbol contribution"
        );
    }
}

fn print_report(report: &Report) {
    for word in &report.words {
        match (&word.bits, &word.error) {
            (Some(bits), _) => println!("{}: {:.6} bits", word.word, bits),
            (None, Some(error)) => eprintln!("error: {:?}: {error}", word.word),
            (None, None) => {}
        }
    }

    if let Some(entropy) = report.entropy_bits {
        println!("Entropy of {}: {entropy:.6} bits/symbol", report.alphabet);
    }

    if let Some(code) = &report.code {
        println!("ACWL of {}: {:.6}", code.path, code.average_length);
        if let Some(expected) = code.expected_length {
            println!(
                "Expected codeword length under {}: {expected:.6}",
                report.alphabet
            );
        }
        if let Some(error) = &code.expected_length_error {
            eprintln!("note: expected codeword length skipped: {error}");
        }
    }
}

#[derive(Serialize)]
struct Report {
    alphabet: String,
    symbols: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    words: Vec<WordReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entropy_bits: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<CodeReport>,
}

#[derive(Serialize)]
struct WordReport {
    word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bits: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl WordReport {
    fn scored(result: &CalculationResult) -> Self {
        Self {
            word: result.word().to_string(),
            bits: Some(result.bits()),
            error: None,
        }
    }

    fn failed(word: &str, err: &InfoError) -> Self {
        Self {
            word: word.to_string(),
            bits: None,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct CodeReport {
    path: String,
    codewords: usize,
    average_length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_length_error: Option<String>,
}
