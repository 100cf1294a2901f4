use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type InfoResult<T> = Result<T, InfoError>;

/// Exit status for a successful run.
pub const EXIT_OK: i32 = 0;
/// Exit status when an input source cannot be read or is malformed.
pub const EXIT_BAD_SOURCE: i32 = 1;
/// Exit status when a word holds a symbol outside the alphabet.
pub const EXIT_UNKNOWN_SYMBOL: i32 = 2;
/// Exit status for a malformed command line.
pub const EXIT_INVALID_INVOCATION: i32 = 3;

/// Errors raised while loading alphabets and code tables or scoring words.
#[derive(Debug, Error)]
pub enum InfoError {
    #[error("could not read {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("alphabet source contains no symbols")]
    EmptyAlphabet,

    #[error("symbol {symbol:?} appears more than once (line {line})")]
    DuplicateSymbol { symbol: char, line: usize },

    #[error("line {line} must hold exactly one symbol, found {text:?}")]
    InvalidSymbol { line: usize, text: String },

    #[error(
        "line {line} has an unusable weight {text:?}; weights must be positive, finite and not vanish against their total"
    )]
    InvalidWeight { line: usize, text: String },

    #[error("line {line} mixes weighted and unweighted symbols")]
    MixedWeights { line: usize },

    #[error("symbol {0:?} is not in the alphabet")]
    SymbolNotFound(char),

    #[error("symbol {symbol:?} at position {position} is not in the alphabet")]
    UnknownSymbol { symbol: char, position: usize },

    #[error("line {line} is not a `symbol,codeword` pair: {text:?}")]
    MalformedCode { line: usize, text: String },

    #[error("code table contains no codewords")]
    EmptyCode,

    #[error("no codeword for alphabet symbol {0:?}")]
    MissingCodeword(char),

    #[error("{0}")]
    InvalidInvocation(String),

    /// A parse error tagged with the file it came from.
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<InfoError>,
    },

    #[error("could not write report: {0}")]
    Report(#[from] serde_json::Error),
}

impl InfoError {
    /// Maps the error onto the process exit status the CLI reports.
    pub fn exit_code(&self) -> i32 {
        match self {
            InfoError::InFile { source, .. } => source.exit_code(),
            InfoError::UnknownSymbol { .. } | InfoError::SymbolNotFound(_) => EXIT_UNKNOWN_SYMBOL,
            InfoError::InvalidInvocation(_) => EXIT_INVALID_INVOCATION,
            _ => EXIT_BAD_SOURCE,
        }
    }

    /// The underlying error with any file context stripped.
    pub fn root(&self) -> &InfoError {
        match self {
            InfoError::InFile { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn in_source(self, path: impl Into<PathBuf>) -> Self {
        InfoError::InFile {
            path: path.into(),
            source: Box::new(self),
        }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        InfoError::SourceUnreadable {
            path: path.into(),
            source,
        }
    }
}
