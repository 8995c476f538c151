//! Service configuration.

use std::path::{Path, PathBuf};

use btpay_core::{CustomerMatchPolicy, MerchantAccountId, PlanId};
use btpay_gateway::{
    BraintreeClient, BraintreeCredentials, ClientOptions, Environment, GatewayError,
};

/// Variable naming the env file to load (default: `.env`).
pub const ENV_FILE_VAR: &str = "BTPAY_ENV";

/// Env file loaded when `BTPAY_ENV` is unset.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Plan used by the checkout flow when `BTPAY_PLAN_ID` is unset.
pub const DEFAULT_PLAN_ID: &str = "subscriptionED";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable has an unusable value.
    #[error("invalid value for {var}: {message}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// What was wrong.
        message: String,
    },

    /// The env file exists but could not be read.
    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: dotenvy::Error,
    },

    /// The gateway client could not be built.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Braintree environment (default: sandbox).
    pub environment: Environment,

    /// Braintree merchant ID.
    pub merchant_id: Option<String>,

    /// Braintree public key.
    pub public_key: Option<String>,

    /// Braintree private key.
    pub private_key: Option<String>,

    /// Endpoint override for the Braintree API.
    pub api_url: Option<String>,

    /// Merchant account used to scope customer client tokens.
    pub merchant_account_id: Option<MerchantAccountId>,

    /// Plan the checkout flow subscribes customers to.
    pub plan_id: PlanId,

    /// How to pick among several customers sharing an email.
    pub customer_match: CustomerMatchPolicy,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            listen_addr: var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            environment: parse_var(&var, "BRAINTREE_ENVIRONMENT", |s| s.parse())?
                .unwrap_or(defaults.environment),
            merchant_id: var("BRAINTREE_MERCHANT_ID"),
            public_key: var("BRAINTREE_PUBLIC_KEY"),
            private_key: var("BRAINTREE_PRIVATE_KEY"),
            api_url: var("BRAINTREE_API_URL"),
            merchant_account_id: parse_var(&var, "BRAINTREE_MERCHANT_ACCOUNT_ID", |s| s.parse())?,
            plan_id: parse_var(&var, "BTPAY_PLAN_ID", |s| s.parse())?.unwrap_or(defaults.plan_id),
            customer_match: parse_var(&var, "BTPAY_CUSTOMER_MATCH", |s| s.parse())?
                .unwrap_or(defaults.customer_match),
            max_body_bytes: parse_var(&var, "MAX_BODY_BYTES", |s| s.parse())?
                .unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parse_var(&var, "REQUEST_TIMEOUT_SECONDS", |s| s.parse())?
                .unwrap_or(defaults.request_timeout_seconds),
        })
    }

    /// The Braintree credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent credential.
    pub fn credentials(&self) -> Result<BraintreeCredentials, ConfigError> {
        let merchant_id = self
            .merchant_id
            .clone()
            .ok_or(ConfigError::Missing("BRAINTREE_MERCHANT_ID"))?;
        let public_key = self
            .public_key
            .clone()
            .ok_or(ConfigError::Missing("BRAINTREE_PUBLIC_KEY"))?;
        let private_key = self
            .private_key
            .clone()
            .ok_or(ConfigError::Missing("BRAINTREE_PRIVATE_KEY"))?;
        Ok(BraintreeCredentials::new(merchant_id, public_key, private_key))
    }

    /// Build the Braintree client this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the client cannot be built.
    pub fn build_gateway(&self) -> Result<BraintreeClient, ConfigError> {
        let options = ClientOptions {
            endpoint: self.api_url.clone(),
            ..ClientOptions::default()
        };
        Ok(BraintreeClient::with_options(
            self.environment,
            self.credentials()?,
            options,
        )?)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            environment: Environment::Sandbox,
            merchant_id: None,
            public_key: None,
            private_key: None,
            api_url: None,
            merchant_account_id: None,
            plan_id: PlanId::from_static(DEFAULT_PLAN_ID),
            customer_match: CustomerMatchPolicy::First,
            max_body_bytes: 1024 * 1024, // 1MB
            request_timeout_seconds: 30,
        }
    }
}

fn parse_var<T, E, V, P>(var: &V, name: &'static str, parse: P) -> Result<Option<T>, ConfigError>
where
    V: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, E>,
    E: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            parse(raw.trim()).map_err(|e| ConfigError::Invalid {
                var: name,
                message: e.to_string(),
            })
        })
        .transpose()
}

/// Load the env file named by `BTPAY_ENV` (or `.env`) into the process environment.
///
/// Variables already set in the environment win. Returns the path loaded, or
/// `None` when the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_env_file() -> Result<Option<PathBuf>, ConfigError> {
    let path = std::env::var(ENV_FILE_VAR).unwrap_or_else(|_| DEFAULT_ENV_FILE.into());
    load_env_file_from(Path::new(&path))
}

/// Load a specific env file. See [`load_env_file`].
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_env_file_from(path: &Path) -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(Some(path.to_path_buf())),
        Err(e) if e.not_found() => Ok(None),
        Err(source) => Err(ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}
