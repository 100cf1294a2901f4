use dirs::config_dir;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an alphabet file to use when none is given.
pub const ALPHABET_ENV_VAR: &str = "INFOCALC_ALPHABET";
const CONFIG_SUBDIR: &str = "infocalc";
const USER_ALPHABET_FILE: &str = "alphabet.txt";

/// Where the alphabet comes from, resolved once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlphabetSource {
    /// The 26-letter English alphabet compiled into the binary.
    Bundled,
    File(PathBuf),
}

impl AlphabetSource {
    /// Picks the explicit path if given, else the user's config file, else the bundled alphabet.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        Self::resolve_with(explicit, config_dir().as_deref())
    }

    /// Same as [`AlphabetSource::resolve`] with the config directory supplied by the caller.
    pub fn resolve_with(explicit: Option<PathBuf>, config_root: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return AlphabetSource::File(path);
        }

        if let Some(path) = config_root.map(user_alphabet_path) {
            if path.is_file() {
                debug!(path = %path.display(), "using alphabet from user config");
                return AlphabetSource::File(path);
            }
        }

        AlphabetSource::Bundled
    }
}

impl fmt::Display for AlphabetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphabetSource::Bundled => write!(f, "English alphabet"),
            AlphabetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn user_alphabet_path(root: &Path) -> PathBuf {
    root.join(CONFIG_SUBDIR).join(USER_ALPHABET_FILE)
}
