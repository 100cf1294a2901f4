use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::config::AlphabetSource;
use crate::error::{InfoError, InfoResult};

/// Tolerance used when checking that a distribution sums to one.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

static ENGLISH_ALPHABET: Lazy<AlphabetModel> = Lazy::new(|| {
    AlphabetModel::parse(include_str!("../data/english_alphabet.txt"))
        .expect("bundled English alphabet is well-formed")
});

/// A set of distinct symbols together with the probability of each one.
///
/// Symbols are case-sensitive single characters kept in first-seen order. The
/// distribution is fixed at construction and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphabetModel {
    symbols: Vec<char>,
    probabilities: HashMap<char, f64>,
}

enum Entry {
    Plain(char),
    Weighted(char, f64),
}

impl AlphabetModel {
    /// Builds a model from a resolved alphabet source.
    pub fn build(source: &AlphabetSource) -> InfoResult<Self> {
        match source {
            AlphabetSource::Bundled => Ok(Self::english().clone()),
            AlphabetSource::File(path) => Self::from_path(path),
        }
    }

    /// Reads an alphabet file. The file is closed before this returns, on success or failure.
    pub fn from_path(path: impl AsRef<Path>) -> InfoResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading alphabet");
        let file = File::open(path).map_err(|err| InfoError::unreadable(path, err))?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Reads an alphabet from any reader; `origin` names the source in errors.
    pub fn from_reader(mut reader: impl Read, origin: impl AsRef<Path>) -> InfoResult<Self> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|err| InfoError::unreadable(origin.as_ref(), err))?;
        Self::parse(&text).map_err(|err| err.in_source(origin.as_ref()))
    }

    /// Parses alphabet text: one symbol per non-empty line, optionally `symbol,weight`.
    ///
    /// A source is either entirely plain (uniform distribution) or entirely
    /// weighted (weights normalized to sum to one). Duplicates are rejected rather
    /// than merged.
    pub fn parse(text: &str) -> InfoResult<Self> {
        let mut symbols = Vec::new();
        let mut weights = Vec::new();
        let mut line_numbers = Vec::new();
        let mut weighted: Option<bool> = None;

        for (idx, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let (symbol, weight) = match parse_line(line_no, line)? {
                Entry::Plain(symbol) => (symbol, None),
                Entry::Weighted(symbol, weight) => (symbol, Some(weight)),
            };

            match weighted {
                None => weighted = Some(weight.is_some()),
                Some(expected) if expected != weight.is_some() => {
                    return Err(InfoError::MixedWeights { line: line_no });
                }
                Some(_) => {}
            }

            if symbols.contains(&symbol) {
                return Err(InfoError::DuplicateSymbol {
                    symbol,
                    line: line_no,
                });
            }
            symbols.push(symbol);
            weights.push(weight.unwrap_or(1.0));
            line_numbers.push(line_no);
        }

        if symbols.is_empty() {
            return Err(InfoError::EmptyAlphabet);
        }

        let probabilities = if weighted == Some(true) {
            normalize_weights(&symbols, &weights, &line_numbers)?
        } else {
            let uniform = 1.0 / symbols.len() as f64;
            symbols.iter().map(|symbol| (*symbol, uniform)).collect()
        };

        debug!(
            symbols = symbols.len(),
            weighted = weighted == Some(true),
            "built alphabet model"
        );
        Ok(Self {
            symbols,
            probabilities,
        })
    }

    /// The bundled 26-letter uppercase English alphabet with a uniform distribution.
    pub fn english() -> &'static AlphabetModel {
        &ENGLISH_ALPHABET
    }

    /// Returns the probability assigned to `symbol`.
    pub fn probability_of(&self, symbol: char) -> InfoResult<f64> {
        self.probabilities
            .get(&symbol)
            .copied()
            .ok_or(InfoError::SymbolNotFound(symbol))
    }

    /// Symbols in first-seen order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; construction rejects empty alphabets.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Whether `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.probabilities.contains_key(&symbol)
    }

    /// Whether every symbol carries the same probability.
    pub fn is_uniform(&self) -> bool {
        let uniform = 1.0 / self.len() as f64;
        self.probabilities
            .values()
            .all(|p| (p - uniform).abs() <= PROBABILITY_TOLERANCE)
    }

    /// Shannon entropy of the distribution, in bits per symbol.
    pub fn entropy_bits(&self) -> f64 {
        self.symbols.iter().fold(0.0, |acc, symbol| {
            let probability = self.probabilities[symbol];
            acc - probability * probability.log2()
        })
    }
}

fn parse_line(line_no: usize, line: &str) -> InfoResult<Entry> {
    if let Some(symbol) = single_char(line) {
        return Ok(Entry::Plain(symbol));
    }

    let invalid_symbol = || InfoError::InvalidSymbol {
        line: line_no,
        text: line.to_string(),
    };
    let (symbol, weight) = line.rsplit_once(',').ok_or_else(invalid_symbol)?;
    let symbol = single_char(symbol).ok_or_else(invalid_symbol)?;

    let invalid_weight = || InfoError::InvalidWeight {
        line: line_no,
        text: weight.to_string(),
    };
    let weight: f64 = weight.trim().parse().map_err(|_| invalid_weight())?;
    if !weight.is_finite() || weight <= 0.0 {
        return Err(invalid_weight());
    }
    Ok(Entry::Weighted(symbol, weight))
}

/// Every normalized probability must stay strictly positive, so a weight that
/// vanishes against the total (or a total that overflows) rejects the source.
fn normalize_weights(
    symbols: &[char],
    weights: &[f64],
    line_numbers: &[usize],
) -> InfoResult<HashMap<char, f64>> {
    let unusable = |line: usize, weight: f64| InfoError::InvalidWeight {
        line,
        text: weight.to_string(),
    };

    let mut total = 0.0;
    for (weight, line) in weights.iter().zip(line_numbers) {
        total += weight;
        if !total.is_finite() {
            return Err(unusable(*line, *weight));
        }
    }

    symbols
        .iter()
        .zip(weights)
        .zip(line_numbers)
        .map(|((symbol, weight), line)| {
            let probability = weight / total;
            if probability > 0.0 && probability.is_finite() {
                Ok((*symbol, probability))
            } else {
                Err(unusable(*line, *weight))
            }
        })
        .collect()
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    #[test]
    fn uniform_probabilities_for_plain_source() {
        let model = AlphabetModel::parse("A\nB\nC\nD\n").unwrap();
        assert_eq!(model.symbols(), &['A', 'B', 'C', 'D']);
        for symbol in ['A', 'B', 'C', 'D'] {
            assert_eq!(model.probability_of(symbol).unwrap(), 0.25);
        }
        assert!(model.is_uniform());
    }

    #[test]
    fn preserves_first_seen_order_and_skips_blank_lines() {
        let model = AlphabetModel::parse("z\n\na\r\nm\n\n").unwrap();
        assert_eq!(model.symbols(), &['z', 'a', 'm']);
    }

    #[test]
    fn symbols_are_case_sensitive() {
        let model = AlphabetModel::parse("a\nA\n").unwrap();
        assert_eq!(model.len(), 2);
        assert!(matches!(
            model.probability_of('b'),
            Err(InfoError::SymbolNotFound('b'))
        ));
    }

    #[test]
    fn space_and_comma_are_legal_symbols() {
        let model = AlphabetModel::parse(" \n,\nx\n").unwrap();
        assert!(model.contains(' '));
        assert!(model.contains(','));
    }

    #[test]
    fn rejects_empty_source() {
        assert!(matches!(
            AlphabetModel::parse(""),
            Err(InfoError::EmptyAlphabet)
        ));
        assert!(matches!(
            AlphabetModel::parse("\n\n"),
            Err(InfoError::EmptyAlphabet)
        ));
    }

    #[test]
    fn rejects_duplicate_symbol() {
        match AlphabetModel::parse("A\nB\nA\n") {
            Err(InfoError::DuplicateSymbol { symbol, line }) => {
                assert_eq!(symbol, 'A');
                assert_eq!(line, 3);
            }
            other => panic!("expected duplicate symbol error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_multi_character_lines() {
        assert!(matches!(
            AlphabetModel::parse("A\nBC\n"),
            Err(InfoError::InvalidSymbol { line: 2, .. })
        ));
    }

    #[test]
    fn weighted_source_is_normalized() {
        let model = AlphabetModel::parse("a,3\nb,1\n").unwrap();
        assert!((model.probability_of('a').unwrap() - 0.75).abs() < 1e-12);
        assert!((model.probability_of('b').unwrap() - 0.25).abs() < 1e-12);
        assert!(!model.is_uniform());
    }

    #[test]
    fn weighted_comma_symbol() {
        let model = AlphabetModel::parse(",,0.5\nx,0.5\n").unwrap();
        assert_eq!(model.probability_of(',').unwrap(), 0.5);
    }

    #[test]
    fn rejects_zero_and_negative_weights() {
        assert!(matches!(
            AlphabetModel::parse("a,0.5\nb,0\n"),
            Err(InfoError::InvalidWeight { line: 2, .. })
        ));
        assert!(matches!(
            AlphabetModel::parse("a,-1\n"),
            Err(InfoError::InvalidWeight { line: 1, .. })
        ));
        assert!(matches!(
            AlphabetModel::parse("a,heavy\n"),
            Err(InfoError::InvalidWeight { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_weight_that_vanishes_against_total() {
        match AlphabetModel::parse("a,1e-300\nb,1e300\n") {
            Err(InfoError::InvalidWeight { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected invalid weight, got {other:?}"),
        }
    }

    #[test]
    fn rejects_weights_whose_total_overflows() {
        match AlphabetModel::parse("a,1e308\nb,1e308\n") {
            Err(InfoError::InvalidWeight { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected invalid weight, got {other:?}"),
        }
    }

    #[test]
    fn widely_spread_weights_stay_finite() {
        let model = AlphabetModel::parse("a,1e-10\nb,1e10\n").unwrap();
        assert!(model.probability_of('a').unwrap() > 0.0);
        assert!(model.entropy_bits().is_finite());
    }

    #[test]
    fn rejects_mixed_weighting() {
        assert!(matches!(
            AlphabetModel::parse("a,0.5\nb\n"),
            Err(InfoError::MixedWeights { line: 2 })
        ));
    }

    #[test]
    fn english_alphabet_is_uniform_over_26_letters() {
        let model = AlphabetModel::english();
        assert_eq!(model.len(), 26);
        assert_eq!(model.symbols().first(), Some(&'A'));
        assert_eq!(model.symbols().last(), Some(&'Z'));
        assert!((model.entropy_bits() - 26f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn reads_alphabet_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0\n1").unwrap();
        let model = AlphabetModel::from_path(file.path()).unwrap();
        assert_eq!(model.probability_of('1').unwrap(), 0.5);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        match AlphabetModel::from_path(&path) {
            Err(InfoError::SourceUnreadable { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected unreadable source, got {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_unreadable() {
        let bytes: &[u8] = &[0x41, 0x0a, 0xff, 0xfe, 0x0a];
        assert!(matches!(
            AlphabetModel::from_reader(bytes, "bytes"),
            Err(InfoError::SourceUnreadable { .. })
        ));
    }

    #[test]
    fn file_parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.txt");
        std::fs::write(&path, "A\nA\n").unwrap();
        let err = AlphabetModel::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("dup.txt"), "{err}");
        assert!(matches!(
            err.root(),
            InfoError::DuplicateSymbol {
                symbol: 'A',
                line: 2
            }
        ));
    }

    #[test]
    fn entropy_of_skewed_distribution() {
        let model = AlphabetModel::parse("a,0.5\nb,0.25\nc,0.25\n").unwrap();
        assert!((model.entropy_bits() - 1.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn uniform_model_assigns_one_over_n(symbols in proptest::collection::hash_set(proptest::char::range('!', '~'), 1..60)) {
            let text: String = symbols.iter().map(|ch| format!("{ch}\n")).collect();
            let model = AlphabetModel::parse(&text).unwrap();
            let n = symbols.len() as f64;
            prop_assert_eq!(model.len(), symbols.len());
            for symbol in &symbols {
                prop_assert_eq!(model.probability_of(*symbol).unwrap(), 1.0 / n);
            }
            let total: f64 = symbols.iter().map(|s| model.probability_of(*s).unwrap()).sum();
            prop_assert!((total - 1.0).abs() <= PROBABILITY_TOLERANCE);
        }

        #[test]
        fn weighted_model_sums_to_one(weights in proptest::collection::vec(0.001f64..1000.0, 1..26)) {
            let text: String = weights
                .iter()
                .enumerate()
                .map(|(idx, weight)| format!("{},{weight}\n", char::from(b'a' + idx as u8)))
                .collect();
            let model = AlphabetModel::parse(&text).unwrap();
            let total: f64 = model.symbols().iter().map(|s| model.probability_of(*s).unwrap()).sum();
            prop_assert!((total - 1.0).abs() <= PROBABILITY_TOLERANCE);
        }
    }
}
