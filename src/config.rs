//! Shop credentials loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPEE_PARTNER_ID` - Open Platform partner id
//! - `SHOPEE_PARTNER_KEY` - Partner key used to sign requests
//! - `SHOPEE_SHOP_ID` - Shop id the orders belong to
//!
//! ## Required for sync commands
//! - `SHOPEE_ACCESS_TOKEN` - Shop-level access token
//!
//! ## Optional
//! - `SHOPEE_HOST` - API host (default: <https://partner.shopeemobile.com>)
//! - `SHOPEE_REDIRECT_URL` - Redirect target for the authorization flow

use crate::error::{Error, Result};

const DEFAULT_HOST: &str = "https://partner.shopeemobile.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub partner_id: i64,
    pub partner_key: String,
    pub shop_id: i64,
    /// Absent until the shop has completed the authorization flow.
    pub access_token: Option<String>,
    pub host: String,
    pub redirect_url: Option<String>,
}

impl Config {
    /// Load credentials from the environment. Reads a `.env` file first
    /// when one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let partner_id = parse_id(&required("SHOPEE_PARTNER_ID")?, "SHOPEE_PARTNER_ID")?;
        let partner_key = required("SHOPEE_PARTNER_KEY")?;
        let shop_id = parse_id(&required("SHOPEE_SHOP_ID")?, "SHOPEE_SHOP_ID")?;
        let access_token = optional("SHOPEE_ACCESS_TOKEN");
        let host = normalize_host(&optional("SHOPEE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()));
        let redirect_url = optional("SHOPEE_REDIRECT_URL");

        Ok(Self {
            partner_id,
            partner_key,
            shop_id,
            access_token,
            host,
            redirect_url,
        })
    }

    /// Access token, or a configuration error naming the missing variable.
    pub fn access_token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| Error::Config("SHOPEE_ACCESS_TOKEN is not set".to_string()))
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::Config(format!("{key} is not set")))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_id(value: &str, key: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{key} must be an integer, got {value:?}")))
}

/// API paths are appended verbatim, so the host must not end in a slash.
fn normalize_host(host: &str) -> String {
    host.trim_end_matches('/').to_string()
}
