use std::fs;
use std::path::Path;
use tracing::debug;

use crate::alphabet::AlphabetModel;
use crate::error::{InfoError, InfoResult};

/// A symbol-to-codeword table read from `symbol,codeword` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<(char, String)>,
}

impl CodeTable {
    /// Reads a code table file; parse errors carry the file path.
    pub fn from_path(path: impl AsRef<Path>) -> InfoResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading code table");
        let text = fs::read_to_string(path).map_err(|err| InfoError::unreadable(path, err))?;
        Self::parse(&text).map_err(|err| err.in_source(path))
    }

    /// Parses `symbol,codeword` lines. The split is at the first comma so `,,01` maps the
    /// comma symbol.
    pub fn parse(text: &str) -> InfoResult<Self> {
        let mut entries: Vec<(char, String)> = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let malformed = || InfoError::MalformedCode {
                line: line_no,
                text: line.to_string(),
            };

            let mut chars = line.chars();
            let symbol = chars.next().ok_or_else(malformed)?;
            let codeword = chars.as_str().strip_prefix(',').ok_or_else(malformed)?;
            if codeword.is_empty() {
                return Err(malformed());
            }
            if entries.iter().any(|(existing, _)| *existing == symbol) {
                return Err(InfoError::DuplicateSymbol {
                    symbol,
                    line: line_no,
                });
            }
            entries.push((symbol, codeword.to_string()));
        }

        if entries.is_empty() {
            return Err(InfoError::EmptyCode);
        }
        Ok(Self { entries })
    }

    /// Number of codewords.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The codeword assigned to `symbol`, if any.
    pub fn codeword(&self, symbol: char) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == symbol)
            .map(|(_, codeword)| codeword.as_str())
    }

    /// Mean codeword length in characters, every codeword weighted equally.
    pub fn average_codeword_length(&self) -> f64 {
        let total: usize = self
            .entries
            .iter()
            .map(|(_, codeword)| codeword.chars().count())
            .sum();
        total as f64 / self.entries.len() as f64
    }

    /// Codeword length expected under the alphabet's distribution.
    pub fn expected_codeword_length(&self, model: &AlphabetModel) -> InfoResult<f64> {
        model
            .symbols()
            .iter()
            .try_fold(0.0, |acc: f64, symbol| -> InfoResult<f64> {
                let codeword = self
                    .codeword(*symbol)
                    .ok_or(InfoError::MissingCodeword(*symbol))?;
                Ok(acc + model.probability_of(*symbol)? * codeword.chars().count() as f64)
            })
    }
}
