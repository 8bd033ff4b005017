//! Shop authorization flow.
//!
//! A shop grants access by visiting the authorization URL. The redirect
//! back carries a one-time `code`, which `exchange_code` trades for an
//! access/refresh token pair.

use url::Url;

use crate::api::sign;
use crate::api::types::TokenResponse;
use crate::config::Config;
use crate::error::{Error, Result};

const AUTH_PARTNER_PATH: &str = "/api/v2/shop/auth_partner";
const TOKEN_GET_PATH: &str = "/api/v2/auth/token/get";

/// URL the shop owner visits to authorize this partner.
pub fn authorization_url(config: &Config) -> Result<String> {
    let redirect = config
        .redirect_url
        .as_deref()
        .ok_or_else(|| Error::Config("SHOPEE_REDIRECT_URL is not set".to_string()))?;
    authorization_url_at(config, redirect, chrono::Utc::now().timestamp())
}

fn authorization_url_at(config: &Config, redirect: &str, timestamp: i64) -> Result<String> {
    let sign = sign::public_sign(
        config.partner_id,
        &config.partner_key,
        AUTH_PARTNER_PATH,
        timestamp,
    );
    let mut url = Url::parse(&format!("{}{}", config.host, AUTH_PARTNER_PATH))?;
    url.query_pairs_mut()
        .append_pair("partner_id", &config.partner_id.to_string())
        .append_pair("timestamp", &timestamp.to_string())
        .append_pair("sign", &sign)
        .append_pair("redirect", redirect);
    Ok(url.to_string())
}

/// Trade the one-time authorization code for tokens.
pub async fn exchange_code(config: &Config, code: &str) -> Result<TokenResponse> {
    let timestamp = chrono::Utc::now().timestamp();
    let sign = sign::public_sign(
        config.partner_id,
        &config.partner_key,
        TOKEN_GET_PATH,
        timestamp,
    );
    let url = format!(
        "{}{}?partner_id={}&timestamp={}&sign={}",
        config.host, TOKEN_GET_PATH, config.partner_id, timestamp, sign
    );
    let body = serde_json::json!({
        "code": code,
        "shop_id": config.shop_id,
        "partner_id": config.partner_id,
    });
    let token: TokenResponse = reqwest::Client::new()
        .post(&url)
        .json(&body)
        .send()
        .await?
        .json()
        .await?;
    if !token.error.is_empty() {
        return Err(Error::Api {
            code: token.error,
            message: token.message,
        });
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            partner_id: 2011234,
            partner_key: "partnerkey".to_string(),
            shop_id: 226000,
            access_token: None,
            host: "https://partner.test-stable.shopeemobile.com".to_string(),
            redirect_url: Some("https://example.com/callback?step=done".to_string()),
        }
    }

    #[test]
    fn test_authorization_url_carries_signed_params() {
        let config = test_config();
        let raw = authorization_url_at(
            &config,
            config.redirect_url.as_deref().unwrap(),
            1700000000,
        )
        .unwrap();
        let url = Url::parse(&raw).unwrap();

        assert_eq!(url.path(), "/api/v2/shop/auth_partner");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("partner_id".to_string(), "2011234".to_string())));
        assert!(pairs.contains(&("timestamp".to_string(), "1700000000".to_string())));

        let sign = pairs.iter().find(|(k, _)| k == "sign").map(|(_, v)| v.clone());
        assert_eq!(sign.as_deref().map(str::len), Some(64));

        // The redirect URL round-trips through percent-encoding.
        let redirect = pairs.iter().find(|(k, _)| k == "redirect").map(|(_, v)| v.clone());
        assert_eq!(redirect.as_deref(), Some("https://example.com/callback?step=done"));
    }

    #[test]
    fn test_authorization_url_requires_redirect() {
        let mut config = test_config();
        config.redirect_url = None;
        assert!(authorization_url(&config).is_err());
    }
}
