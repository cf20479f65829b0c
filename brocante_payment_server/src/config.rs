use std::env;

use bpg_common::Secret;
use chrono::Duration;
use hosted_checkout::CheckoutConfig;
use log::*;
use rand::{thread_rng, RngCore};

use crate::errors::ServerError;

const DEFAULT_BPG_HOST: &str = "127.0.0.1";
const DEFAULT_BPG_PORT: u16 = 4000;
const DEFAULT_BPG_DATABASE_URL: &str = "sqlite://data/brocante.db";
const DEFAULT_STOREFRONT_URL: &str = "http://localhost:3000";
const DEFAULT_TOKEN_TTL: Duration = Duration::seconds(43_200);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Base URL of the storefront. The success and cancel redirect targets handed to the hosted checkout are built
    /// from this.
    pub storefront_url: String,
    pub auth: AuthConfig,
    /// Connection settings for the hosted payment processor API.
    pub payment: CheckoutConfig,
    /// Shared key for verifying the `X-Payment-Signature` header on incoming webhooks.
    pub webhook_secret: Secret<String>,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BPG_HOST.to_string(),
            port: DEFAULT_BPG_PORT,
            database_url: DEFAULT_BPG_DATABASE_URL.to_string(),
            storefront_url: DEFAULT_STOREFRONT_URL.to_string(),
            auth: AuthConfig::default(),
            payment: CheckoutConfig::default(),
            webhook_secret: Secret::new(String::default()),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BPG_HOST").ok().unwrap_or_else(|| DEFAULT_BPG_HOST.into());
        let port = env::var("BPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BPG_PORT. {e} Using the default, {DEFAULT_BPG_PORT}, instead."
                    );
                    DEFAULT_BPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BPG_PORT);
        let database_url = env::var("BPG_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ BPG_DATABASE_URL is not set. Using the default, {DEFAULT_BPG_DATABASE_URL}.");
            DEFAULT_BPG_DATABASE_URL.to_string()
        });
        let storefront_url = env::var("BPG_STOREFRONT_URL").ok().unwrap_or_else(|| {
            error!(
                "🪛️ BPG_STOREFRONT_URL is not set. Checkout redirects will point at {DEFAULT_STOREFRONT_URL}, which \
                 is almost certainly not what you want."
            );
            DEFAULT_STOREFRONT_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let payment = CheckoutConfig::new_from_env_or_default();
        let webhook_secret = match env::var("BPG_WEBHOOK_SECRET") {
            Ok(s) => Secret::new(s),
            Err(_) => {
                warn!(
                    "🚨️🚨️🚨️ BPG_WEBHOOK_SECRET is not set. I'm using a random value for this session, so EVERY \
                     incoming payment notification will fail signature verification. Set it to the signing key \
                     configured at the payment processor. 🚨️🚨️🚨️"
                );
                Secret::new(random_secret())
            },
        };
        let use_x_forwarded_for =
            env::var("BPG_USE_X_FORWARDED_FOR").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let use_forwarded = env::var("BPG_USE_FORWARDED").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        Self {
            host,
            port,
            database_url,
            storefront_url,
            auth,
            payment,
            webhook_secret,
            use_x_forwarded_for,
            use_forwarded,
        }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The passphrase admins exchange for a session token at the login endpoint.
    pub admin_password: Secret<String>,
    /// The key used to sign and verify admin session tokens.
    pub auth_secret: Secret<String>,
    /// How long an issued admin token stays valid.
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The admin password and/or token signing key have not been set. I'm using random values for this \
             session. Admin login will not work until BPG_ADMIN_PASSWORD and BPG_AUTH_SECRET are set, and any tokens \
             issued now will die with the process. 🚨️🚨️🚨️"
        );
        Self {
            admin_password: Secret::new(random_secret()),
            auth_secret: Secret::new(random_secret()),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let admin_password = env::var("BPG_ADMIN_PASSWORD")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [BPG_ADMIN_PASSWORD]")))?;
        let auth_secret =
            env::var("BPG_AUTH_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [BPG_AUTH_SECRET]")))?;
        let token_ttl = env::var("BPG_TOKEN_TTL")
            .map_err(|_| {
                info!(
                    "🪛️ BPG_TOKEN_TTL is not set. Using the default value of {} s.",
                    DEFAULT_TOKEN_TTL.num_seconds()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::seconds)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for BPG_TOKEN_TTL. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_TOKEN_TTL);
        Ok(Self { admin_password: Secret::new(admin_password), auth_secret: Secret::new(auth_secret), token_ttl })
    }
}

/// 32 bytes of OS randomness, base64-encoded so it survives a round trip through an environment variable.
fn random_secret() -> String {
    let mut key = [0u8; 32];
    thread_rng().fill_bytes(&mut key);
    base64::encode_config(key, base64::URL_SAFE_NO_PAD)
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------

/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep
/// this as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub storefront_url: String,
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            storefront_url: config.storefront_url.clone(),
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
        }
    }
}
