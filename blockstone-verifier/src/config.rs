//! Configuration for the ledger-data providers used by the verifier.

use std::{collections::HashMap, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

pub use config::ConfigError;

/// The prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "BLOCKSTONE";

/// The default primary provider endpoint.
pub const DEFAULT_ESPLORA_URL: &str = "https://blockstream.info/api";

/// The default fallback provider endpoint.
pub const DEFAULT_BLOCKCYPHER_URL: &str = "https://api.blockcypher.com/v1/btc/main";

/// Returns true if a leaf key name should be considered sensitive and blocked
/// from environment variable overrides.
fn is_sensitive_leaf_key(leaf_key: &str) -> bool {
    let lower = leaf_key.to_ascii_lowercase();

    lower.ends_with("password") || lower.ends_with("secret") || lower.ends_with("token")
}

/// Configuration for the proof verifier.
///
/// The config is a TOML-encoded version of this structure:
///
/// ```toml
/// [primary]
/// url = "https://blockstream.info/api"
///
/// [secondary]
/// url = "https://api.blockcypher.com/v1/btc/main"
/// token = "..."
///
/// [http]
/// user_agent = "blockstone-verifier/1.0.0"
/// ```
///
/// The provider order is fixed: `primary` is always queried first, and
/// `secondary` is only queried if `primary` fails.
#[derive(Clone, Default, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The primary provider: an Esplora-compatible API.
    pub primary: EsploraConfig,

    /// The fallback provider: a BlockCypher-compatible API.
    pub secondary: BlockCypherConfig,

    /// Settings shared by all provider HTTP clients.
    pub http: HttpConfig,
}

/// Esplora provider configuration.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct EsploraConfig {
    /// The API base URL, without a trailing `/`.
    pub url: String,
}

impl Default for EsploraConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ESPLORA_URL.to_string(),
        }
    }
}

/// BlockCypher provider configuration.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct BlockCypherConfig {
    /// The API base URL, including the chain path, without a trailing `/`.
    pub url: String,

    /// The API token sent with each request.
    ///
    /// # Security
    ///
    /// This token must only be set in the server-side config file.
    /// Setting it with an environment variable is an error.
    pub token: Option<ApiToken>,
}

impl Default for BlockCypherConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BLOCKCYPHER_URL.to_string(),
            token: None,
        }
    }
}

/// HTTP client configuration.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct HttpConfig {
    /// The `User-Agent` header sent to providers.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("blockstone-verifier/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A provider API token, which is hidden from debug output.
#[derive(Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a provider API token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the secret token, for use in provider requests.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

impl Config {
    /// Loads the configuration from the conventional sources.
    ///
    /// Configuration is loaded from three sources, in order of precedence:
    /// 1. Hard-coded defaults (lowest precedence)
    /// 2. TOML configuration file (if provided)
    /// 3. Environment variables with the `BLOCKSTONE_` prefix (highest precedence)
    ///
    /// Environment variables use the format `BLOCKSTONE_SECTION__KEY`, for example
    /// `BLOCKSTONE_PRIMARY__URL=http://127.0.0.1:3000/api` sets `primary.url`.
    ///
    /// # Security
    ///
    /// Environment variables whose leaf key names end with `password`, `secret`, or
    /// `token` (case-insensitive) make loading fail, so that secrets don't appear in
    /// the process table.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let prefix = format!("{ENV_PREFIX}_");
        let mut filtered_env: HashMap<String, String> = HashMap::new();

        for (key, value) in std::env::vars() {
            let Some(without_prefix) = key.strip_prefix(&prefix) else {
                continue;
            };

            if let Some(leaf) = without_prefix.split("__").last() {
                if is_sensitive_leaf_key(leaf) {
                    return Err(ConfigError::Message(format!(
                        "Environment variable '{key}' contains sensitive key '{leaf}' which cannot be \
                         overridden via environment variables. Use the configuration file instead."
                    )));
                }
            }

            filtered_env.insert(key, value);
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(filtered_env)),
        );

        let config = builder.build()?;

        config.try_deserialize()
    }
}
