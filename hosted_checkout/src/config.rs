use bpg_common::Secret;
use log::*;

#[derive(Debug, Clone, Default)]
pub struct CheckoutConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
}

impl CheckoutConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("BPG_PAYMENT_API_URL").unwrap_or_else(|_| {
            warn!("BPG_PAYMENT_API_URL not set, using (probably useless) default");
            "https://api.checkout.example.com".to_string()
        });
        let api_key = Secret::new(std::env::var("BPG_PAYMENT_API_KEY").unwrap_or_else(|_| {
            warn!("BPG_PAYMENT_API_KEY not set, using (probably useless) default");
            "sk_00000000000000".to_string()
        }));
        Self { api_url, api_key }
    }

    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self { api_url: api_url.to_string(), api_key: Secret::new(api_key.to_string()) }
    }
}
