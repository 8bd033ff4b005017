//! Request signing for Open Platform v2 calls.
//!
//! Every call carries a `sign` query parameter: the lowercase hex
//! HMAC-SHA256 of a concatenated base string, keyed by the partner key.
//! Shop-level calls include the access token and shop id in the base
//! string; public calls (authorization, token exchange) do not.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signature for a shop-level call such as `get_order_list`.
pub fn shop_sign(
    partner_id: i64,
    partner_key: &str,
    path: &str,
    timestamp: i64,
    access_token: &str,
    shop_id: i64,
) -> String {
    hmac_hex(
        partner_key,
        &shop_base_string(partner_id, path, timestamp, access_token, shop_id),
    )
}

/// Signature for a public call such as `auth_partner` or `token/get`.
pub fn public_sign(partner_id: i64, partner_key: &str, path: &str, timestamp: i64) -> String {
    hmac_hex(partner_key, &public_base_string(partner_id, path, timestamp))
}

fn shop_base_string(
    partner_id: i64,
    path: &str,
    timestamp: i64,
    access_token: &str,
    shop_id: i64,
) -> String {
    format!("{partner_id}{path}{timestamp}{access_token}{shop_id}")
}

fn public_base_string(partner_id: i64, path: &str, timestamp: i64) -> String {
    format!("{partner_id}{path}{timestamp}")
}

fn hmac_hex(key: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC-SHA256 accepts any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
