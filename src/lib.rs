//! Shannon information content of words over a symbol alphabet.
//!
//! An [`AlphabetModel`] assigns a probability to each symbol; the
//! [`InformationCalculator`] sums `-log2(p)` over the characters of a word.

pub mod alphabet;
pub mod calculator;
pub mod code;
pub mod config;
pub mod error;

use tracing_subscriber::EnvFilter;

pub use alphabet::AlphabetModel;
pub use calculator::{
    CalculationResult, InformationCalculator, SymbolContribution, information_content,
    read_word_list,
};
pub use code::CodeTable;
pub use config::AlphabetSource;
pub use error::{InfoError, InfoResult};

/// Installs a stderr log subscriber. `RUST_LOG` wins over the verbosity flag.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
