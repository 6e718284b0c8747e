#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Client configuration: where to send submissions, who is submitting, and
//! which scoring backend to use.

use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use typed_builder::TypedBuilder;
use url::Url;

/// Grading service used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.thedataincubator.com";

/// Grading service used in `local_gae` mode.
pub const LOCAL_GAE_BASE_URL: &str = "http://localhost:8080";

/// API key sent when the user has no key of their own. Scores are returned
/// but not recorded.
pub const NO_USER_KEY: &str = "nosession::nouser";

/// Environment variable selecting the client mode.
pub const MODE_ENV: &str = "GRADER_CLIENT_MODE";

/// Environment variable overriding the local test case directory.
pub const LOCAL_DIR_ENV: &str = "GRADER_LOCAL_DIR";

/// Environment variable overriding the external solution timeout.
pub const SOLUTION_TIMEOUT_ENV: &str = "GRADER_SOLUTION_TIMEOUT_SECS";

/// File under the home directory holding the base URL.
const BASE_URL_FILE: &str = ".ssh/.grader_url";

/// File under the home directory holding the API key.
const API_KEY_FILE: &str = ".ssh/.grader_secret";

/// Default directory for local test cases.
const DEFAULT_LOCAL_DIR: &str = "grader_cases";

/// Default timeout for external solutions in seconds.
const DEFAULT_SOLUTION_TIMEOUT_SECS: u64 = 60;

/// Which scoring backend grades submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The remote grading service.
    #[default]
    Remote,
    /// Test cases and reference answers read from local files.
    Local,
}

/// A configuration problem that does not stop grading.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No base URL file was found.
    #[error(
        "You are missing a base URL ({}). Submissions will go to {}.",
        path.display(),
        DEFAULT_BASE_URL
    )]
    MissingBaseUrl {
        /// Where the base URL was looked for.
        path: PathBuf,
    },
    /// The base URL file does not hold a usable URL.
    #[error("Ignoring base URL `{value}` ({reason}). Submissions will go to {}.", DEFAULT_BASE_URL)]
    InvalidBaseUrl {
        /// The rejected contents.
        value:  String,
        /// Why it was rejected.
        reason: String,
    },
    /// No API key file was found.
    #[error(
        "You are missing a unique key ({}). A score will be returned to you, but it will not be \
         saved. Please show this message to a staff member.",
        path.display()
    )]
    MissingApiKey {
        /// Where the key was looked for.
        path: PathBuf,
    },
    /// The mode variable holds an unknown value.
    #[error("Unknown {var} `{0}`; grading remotely.", var = MODE_ENV)]
    UnknownMode(String),
    /// The timeout variable is not a positive number of seconds.
    #[error(
        "Ignoring {} `{value}`; external programs get {} seconds.",
        SOLUTION_TIMEOUT_ENV,
        DEFAULT_SOLUTION_TIMEOUT_SECS
    )]
    InvalidTimeout {
        /// The rejected contents.
        value: String,
    },
}

/// Immutable settings for one grading client.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ClientConfig {
    /// Base URL of the grading service.
    #[builder(default = default_base_url())]
    base_url:         Url,
    /// Opaque key identifying the user to the service.
    #[builder(default = NO_USER_KEY.to_string(), setter(into))]
    api_key:          String,
    /// Scoring backend selection.
    #[builder(default)]
    mode:             Mode,
    /// Directory holding local test case files.
    #[builder(default = PathBuf::from(DEFAULT_LOCAL_DIR), setter(into))]
    local_dir:        PathBuf,
    /// How long an external solution may run per test case.
    #[builder(default = Duration::from_secs(DEFAULT_SOLUTION_TIMEOUT_SECS))]
    solution_timeout: Duration,
    /// Problems met while loading.
    #[builder(default)]
    warnings:         Vec<ConfigWarning>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientConfig {
    /// Loads the configuration from the user's home directory and the process
    /// environment.
    pub fn load() -> Self {
        let home = dirs::home_dir();
        Self::from_sources(home.as_deref(), |name| std::env::var(name).ok())
    }

    /// Loads the configuration from `home` and the variables `env` returns.
    pub fn from_sources(home: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut warnings = Vec::new();
        let locate = |file: &str| match home {
            Some(home) => home.join(file),
            None => Path::new("~").join(file),
        };

        let url_path = locate(BASE_URL_FILE);
        let mut base_url = match read_trimmed(home, BASE_URL_FILE) {
            Some(text) => match Url::parse(&text) {
                Ok(url) => url,
                Err(e) => {
                    warnings.push(ConfigWarning::InvalidBaseUrl {
                        value:  text,
                        reason: e.to_string(),
                    });
                    default_base_url()
                }
            },
            None => {
                warnings.push(ConfigWarning::MissingBaseUrl { path: url_path });
                default_base_url()
            }
        };

        let api_key = read_trimmed(home, API_KEY_FILE).unwrap_or_else(|| {
            warnings.push(ConfigWarning::MissingApiKey {
                path: locate(API_KEY_FILE),
            });
            NO_USER_KEY.to_string()
        });

        let mode = match env(MODE_ENV).as_deref().map(str::trim) {
            None | Some("") | Some("remote") => Mode::Remote,
            Some("local") => Mode::Local,
            Some("local_gae") => {
                base_url = local_gae_base_url();
                Mode::Remote
            }
            Some(other) => {
                warnings.push(ConfigWarning::UnknownMode(other.to_string()));
                Mode::Remote
            }
        };

        let local_dir = env(LOCAL_DIR_ENV)
            .map(|dir| dir.trim().to_owned())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_DIR));

        let solution_timeout = match env(SOLUTION_TIMEOUT_ENV) {
            None => Duration::from_secs(DEFAULT_SOLUTION_TIMEOUT_SECS),
            Some(value) => read_timeout_secs(&value).unwrap_or_else(|| {
                warnings.push(ConfigWarning::InvalidTimeout { value });
                Duration::from_secs(DEFAULT_SOLUTION_TIMEOUT_SECS)
            }),
        };

        Self {
            base_url,
            api_key,
            mode,
            local_dir,
            solution_timeout,
            warnings,
        }
    }

    /// Returns a copy pointing at a different grading service. Warnings about
    /// the base URL file no longer apply and are dropped.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self.warnings.retain(|warning| {
            !matches!(
                warning,
                ConfigWarning::MissingBaseUrl { .. } | ConfigWarning::InvalidBaseUrl { .. }
            )
        });
        self
    }

    /// Returns the base URL of the grading service.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether the user has a key of their own.
    pub fn has_user_key(&self) -> bool {
        self.api_key != NO_USER_KEY
    }

    /// Returns the backend selection.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the local test case directory.
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Returns the per-test-case timeout for external solutions.
    pub fn solution_timeout(&self) -> Duration {
        self.solution_timeout
    }

    /// Returns the problems met while loading.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Remote => f.write_str("remote"),
            Mode::Local => f.write_str("local"),
        }
    }
}

/// The parsed [`DEFAULT_BASE_URL`].
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

/// The parsed [`LOCAL_GAE_BASE_URL`].
fn local_gae_base_url() -> Url {
    Url::parse(LOCAL_GAE_BASE_URL).expect("local base URL is valid")
}

/// Reads `file` under `home`, returning its trimmed contents if non-empty.
fn read_trimmed(home: Option<&Path>, file: &str) -> Option<String> {
    let text = fs::read_to_string(home?.join(file)).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

/// Parses a positive number of seconds.
fn read_timeout_secs(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use uuid::Uuid;

    use super::*;

    fn temp_home() -> PathBuf {
        let root = std::env::temp_dir().join(format!("grader-home-{}", Uuid::new_v4()));
        fs::create_dir_all(root.join(".ssh")).expect("create temp home");
        root
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_files_fall_back_with_warnings() {
        let home = temp_home();
        let config = ClientConfig::from_sources(Some(&home), env_of(&[]));

        assert_eq!(config.base_url().as_str(), "https://www.thedataincubator.com/");
        assert_eq!(config.api_key(), NO_USER_KEY);
        assert!(!config.has_user_key());
        assert_eq!(config.mode(), Mode::Remote);
        assert_eq!(config.warnings().len(), 2);
        assert!(matches!(config.warnings()[0], ConfigWarning::MissingBaseUrl { .. }));
        assert!(matches!(config.warnings()[1], ConfigWarning::MissingApiKey { .. }));

        let _ = fs::remove_dir_all(home);
    }

    #[test]
    fn files_are_read_and_trimmed() {
        let home = temp_home();
        fs::write(home.join(BASE_URL_FILE), "https://grader.example.org/api/\n").unwrap();
        fs::write(home.join(API_KEY_FILE), "  secret-key \n").unwrap();

        let config = ClientConfig::from_sources(Some(&home), env_of(&[]));
        assert_eq!(config.base_url().as_str(), "https://grader.example.org/api/");
        assert_eq!(config.api_key(), "secret-key");
        assert!(config.warnings().is_empty());

        let _ = fs::remove_dir_all(home);
    }

    #[test]
    fn invalid_url_keeps_default() {
        let home = temp_home();
        fs::write(home.join(BASE_URL_FILE), "not a url").unwrap();
        fs::write(home.join(API_KEY_FILE), "k").unwrap();

        let config = ClientConfig::from_sources(Some(&home), env_of(&[]));
        assert_eq!(config.base_url().as_str(), "https://www.thedataincubator.com/");
        assert!(matches!(config.warnings(), [ConfigWarning::InvalidBaseUrl { .. }]));

        let _ = fs::remove_dir_all(home);
    }

    #[test]
    fn mode_variable_selects_backend() {
        let local = ClientConfig::from_sources(
            None,
            env_of(&[(MODE_ENV, "local"), (LOCAL_DIR_ENV, "cases")]),
        );
        assert_eq!(local.mode(), Mode::Local);
        assert_eq!(local.local_dir(), Path::new("cases"));

        let gae = ClientConfig::from_sources(None, env_of(&[(MODE_ENV, "local_gae")]));
        assert_eq!(gae.mode(), Mode::Remote);
        assert_eq!(gae.base_url().as_str(), "http://localhost:8080/");

        let odd = ClientConfig::from_sources(None, env_of(&[(MODE_ENV, "sideways")]));
        assert_eq!(odd.mode(), Mode::Remote);
        assert!(
            odd.warnings()
                .contains(&ConfigWarning::UnknownMode("sideways".into()))
        );
    }

    #[test]
    fn overriding_base_url_clears_its_warning() {
        let config = ClientConfig::from_sources(None, env_of(&[]))
            .with_base_url(Url::parse("https://grader.example.org/").unwrap());
        assert_eq!(config.base_url().as_str(), "https://grader.example.org/");
        assert!(matches!(config.warnings(), [ConfigWarning::MissingApiKey { .. }]));
    }

    #[test]
    fn timeout_falls_back_on_garbage() {
        let config =
            ClientConfig::from_sources(None, env_of(&[(SOLUTION_TIMEOUT_ENV, "soon")]));
        assert_eq!(config.solution_timeout(), Duration::from_secs(60));

        let config = ClientConfig::from_sources(None, env_of(&[(SOLUTION_TIMEOUT_ENV, "5")]));
        assert_eq!(config.solution_timeout(), Duration::from_secs(5));
        assert!(
            !config
                .warnings()
                .iter()
                .any(|w| matches!(w, ConfigWarning::InvalidTimeout { .. }))
        );
    }

    #[test]
    fn zero_timeout_is_rejected_with_a_warning() {
        let config = ClientConfig::from_sources(None, env_of(&[(SOLUTION_TIMEOUT_ENV, " 0 ")]));
        assert_eq!(config.solution_timeout(), Duration::from_secs(60));
        let warning = ConfigWarning::InvalidTimeout {
            value: " 0 ".into(),
        };
        assert!(config.warnings().contains(&warning));
        assert_eq!(
            warning.to_string(),
            "Ignoring GRADER_SOLUTION_TIMEOUT_SECS ` 0 `; external programs get 60 seconds."
        );
    }

    #[test]
    fn unknown_mode_message_names_the_variable() {
        let warning = ConfigWarning::UnknownMode("sideways".into());
        assert_eq!(
            warning.to_string(),
            "Unknown GRADER_CLIENT_MODE `sideways`; grading remotely."
        );
    }
}
