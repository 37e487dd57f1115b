//! Request signing for the Binance REST API

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::errors::{Result, TraderError};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key on every authenticated request
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Generate the HMAC-SHA256 signature of a query string
///
/// # Arguments
/// * `secret` - API secret (used as raw bytes)
/// * `query` - URL-encoded query string, including `timestamp`
///
/// # Returns
/// Lowercase hex digest to append as the `signature` parameter
pub fn sign_query(secret: &str, query: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| TraderError::Authentication(format!("Failed to create HMAC: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a signed query string from request parameters
///
/// Appends `recvWindow` and `timestamp`, then the signature over everything
/// before it.
pub fn signed_query(
    secret: &str,
    params: &[(&str, String)],
    recv_window_ms: u64,
    timestamp_ms: i64,
) -> Result<String> {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("recvWindow", &recv_window_ms.to_string());
    serializer.append_pair("timestamp", &timestamp_ms.to_string());
    let query = serializer.finish();

    let signature = sign_query(secret, &query)?;
    Ok(format!("{}&signature={}", query, signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from the Binance API documentation
    const DOC_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

    #[test]
    fn test_sign_query_matches_documented_example() {
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        let signature = sign_query(DOC_SECRET, query).unwrap();
        assert_eq!(
            signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signed_query_layout() {
        let params = vec![
            ("symbol", "LTCBTC".to_string()),
            ("side", "BUY".to_string()),
            ("type", "LIMIT".to_string()),
            ("timeInForce", "GTC".to_string()),
            ("quantity", "1".to_string()),
            ("price", "0.1".to_string()),
        ];
        let query = signed_query(DOC_SECRET, &params, 5000, 1499827319559).unwrap();
        assert_eq!(
            query,
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1\
             &recvWindow=5000&timestamp=1499827319559\
             &signature=c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }
}
