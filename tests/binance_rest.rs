//! Integration tests for the Binance REST client
//!
//! The API is served by a local wiremock server; no network access is needed.

use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use signal_trader::common::errors::TraderError;
use signal_trader::common::traits::Exchange;
use signal_trader::config::ApiCredentials;
use signal_trader::exchange::BinanceClient;

const API_KEY: &str = "test-api-key";

/// Helper function to create a signed client against the mock server
fn create_test_client(server: &MockServer) -> BinanceClient {
    BinanceClient::new(&server.uri(), "USDT")
        .expect("Failed to create REST client")
        .with_credentials(ApiCredentials::new(
            API_KEY.to_string(),
            "test-api-secret".to_string(),
        ))
}

// ============================================================================
// Public endpoints
// ============================================================================

#[tokio::test]
async fn test_fetch_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"symbol": "BTCUSDT", "price": "27123.45000000"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = BinanceClient::new(&server.uri(), "USDT").unwrap();
    let snapshot = client.fetch_snapshot("BTCUSDT").await.unwrap();

    assert_eq!(snapshot.symbol, "BTCUSDT");
    assert_eq!(snapshot.price, dec!(27123.45));
}

#[tokio::test]
async fn test_unparseable_price_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"symbol": "BTCUSDT", "price": "n/a"})),
        )
        .mount(&server)
        .await;

    let client = BinanceClient::new(&server.uri(), "USDT").unwrap();
    let err = client.fetch_snapshot("BTCUSDT").await.unwrap_err();

    assert!(matches!(err, TraderError::InvalidResponse(_)));
}

// ============================================================================
// Signed endpoints
// ============================================================================

#[tokio::test]
async fn test_balance_of_quote_asset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .and(header("X-MBX-APIKEY", API_KEY))
        .and(query_param("recvWindow", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balances": [
                {"asset": "BTC", "free": "0.01000000", "locked": "0.00000000"},
                {"asset": "USDT", "free": "250.75000000", "locked": "10.00000000"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);

    assert_eq!(client.get_balance().await.unwrap(), dec!(250.75));
}

#[tokio::test]
async fn test_missing_asset_has_zero_balance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balances": []})))
        .mount(&server)
        .await;

    let client = create_test_client(&server);

    assert_eq!(client.get_balance().await.unwrap(), dec!(0));
}

#[test_log::test(tokio::test)]
async fn test_submit_buy_places_limit_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/order"))
        .and(header("X-MBX-APIKEY", API_KEY))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("side", "BUY"))
        .and(query_param("type", "LIMIT"))
        .and(query_param("timeInForce", "GTC"))
        .and(query_param("quantity", "0.0123"))
        .and(query_param("price", "27000.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "BTCUSDT",
            "orderId": 28,
            "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP",
            "status": "NEW",
            "executedQty": "0.00000000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let order = client
        .submit_buy("BTCUSDT", dec!(27000.50), dec!(0.01230))
        .await
        .unwrap();

    assert_eq!(order.order_id, "28");
    assert_eq!(order.status, "NEW");
    assert_eq!(order.executed_quantity, dec!(0));
}

#[tokio::test]
async fn test_rejected_order_is_exchange_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/order"))
        .and(query_param("side", "SELL"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -2010,
            "msg": "Account has insufficient balance for requested action."
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client
        .submit_sell("BTCUSDT", dec!(30000), dec!(1))
        .await
        .unwrap_err();

    match &err {
        TraderError::Exchange(message) => {
            assert!(message.contains("insufficient balance"));
            assert!(message.contains("-2010"));
        }
        other => panic!("expected an exchange error, got {:?}", other),
    }
    assert!(err.is_exchange_failure());
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_string("Too many requests"),
        )
        .mount(&server)
        .await;

    let client = BinanceClient::new(&server.uri(), "USDT").unwrap();
    let err = client.fetch_snapshot("BTCUSDT").await.unwrap_err();

    match err {
        TraderError::RateLimit {
            retry_after_seconds,
            ..
        } => assert_eq!(retry_after_seconds, Some(7)),
        other => panic!("expected a rate limit error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_key_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": -2015,
            "msg": "Invalid API-key, IP, or permissions for action."
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.get_balance().await.unwrap_err();

    assert!(matches!(err, TraderError::Authentication(_)));
}

#[tokio::test]
async fn test_unexpected_error_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = BinanceClient::new(&server.uri(), "USDT").unwrap();
    let err = client.fetch_snapshot("BTCUSDT").await.unwrap_err();

    assert!(matches!(err, TraderError::InvalidResponse(_)));
}
