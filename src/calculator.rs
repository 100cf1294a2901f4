use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::alphabet::AlphabetModel;
use crate::error::{InfoError, InfoResult};

/// Decimal digits shown when a result is displayed; accumulation keeps full precision.
pub const DISPLAY_PRECISION: usize = 6;

/// Scores words against a borrowed alphabet model.
#[derive(Debug, Clone, Copy)]
pub struct InformationCalculator<'a> {
    model: &'a AlphabetModel,
}

impl<'a> InformationCalculator<'a> {
    /// Wraps a model; the calculator holds no other state.
    pub fn new(model: &'a AlphabetModel) -> Self {
        Self { model }
    }

    /// The alphabet words are scored against.
    pub fn model(&self) -> &'a AlphabetModel {
        self.model
    }

    /// Total self-information of `word`, failing on the first symbol outside the alphabet.
    pub fn information_content(&self, word: &str) -> InfoResult<CalculationResult> {
        information_content(self.model, word)
    }

    /// Scores each word independently; one failing word does not stop the others.
    pub fn score_words<'w>(
        &self,
        words: impl IntoIterator<Item = &'w str>,
    ) -> Vec<InfoResult<CalculationResult>> {
        words
            .into_iter()
            .map(|word| {
                let result = self.information_content(word);
                if let Err(err) = &result {
                    warn!(word, %err, "word could not be scored");
                }
                result
            })
            .collect()
    }
}

/// Bits contributed by one character of a word.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SymbolContribution {
    pub symbol: char,
    pub position: usize,
    pub probability: f64,
    pub bits: f64,
}

/// The information content of one word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    word: String,
    bits: f64,
    contributions: Vec<SymbolContribution>,
}

impl CalculationResult {
    /// The word as given, unnormalized.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Total bits at full floating precision.
    pub fn bits(&self) -> f64 {
        self.bits
    }

    /// Total bits rounded to [`DISPLAY_PRECISION`] decimal digits.
    pub fn rounded_bits(&self) -> f64 {
        let scale = 10f64.powi(DISPLAY_PRECISION as i32);
        (self.bits * scale).round() / scale
    }

    /// Number of characters scored.
    pub fn symbol_count(&self) -> usize {
        self.contributions.len()
    }

    /// Per-character breakdown in word order.
    pub fn contributions(&self) -> &[SymbolContribution] {
        &self.contributions
    }
}

impl fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.*} bits",
            self.word, DISPLAY_PRECISION, self.bits
        )
    }
}

/// Sums `-log2(p)` over every character of `word`, each occurrence counted independently.
///
/// The empty word carries zero bits. A character missing from the alphabet aborts the
/// calculation with [`InfoError::UnknownSymbol`] carrying its 0-based character position.
pub fn information_content(model: &AlphabetModel, word: &str) -> InfoResult<CalculationResult> {
    let mut bits = 0.0;
    let mut contributions = Vec::with_capacity(word.len());

    for (position, symbol) in word.chars().enumerate() {
        let probability = model
            .probability_of(symbol)
            .map_err(|_| InfoError::UnknownSymbol { symbol, position })?;
        let symbol_bits = -probability.log2();
        bits += symbol_bits;
        contributions.push(SymbolContribution {
            symbol,
            position,
            probability,
            bits: symbol_bits,
        });
    }

    debug!(word, bits, "computed information content");
    Ok(CalculationResult {
        word: word.to_string(),
        bits,
        contributions,
    })
}

/// Reads a word list, one word per non-empty line.
pub fn read_word_list(path: impl AsRef<Path>) -> InfoResult<Vec<String>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading word list");
    let text = fs::read_to_string(path).map_err(|err| InfoError::unreadable(path, err))?;
    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
