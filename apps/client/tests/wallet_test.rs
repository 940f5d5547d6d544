use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use gamelink_client::config::Config;
use gamelink_client::error::ClientError;
use gamelink_client::wallet::WalletClient;

/// Start an in-process stand-in for the wallet API and the price feed.
async fn start_api() -> SocketAddr {
    let app = Router::new()
        .route(
            "/api/wallet/main/balance",
            get(|| async {
                Json(json!({ "success": true, "balance": 1.5, "balanceUSD": 300.0 }))
            }),
        )
        .route(
            "/api/withdraw",
            post(|Json(body): Json<Value>| async move {
                let amount = body["amount"].as_f64().unwrap_or(0.0);
                if amount > 100.0 {
                    Json(json!({ "success": false, "message": "Insufficient balance" }))
                } else {
                    Json(json!({ "success": true, "withdrawnAmountUSD": amount * 200.0 }))
                }
            }),
        )
        .route(
            "/api/v3/simple/price",
            get(|| async { Json(json!({ "solana": { "usd": 200.0 } })) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn wallet_for(addr: SocketAddr) -> WalletClient {
    WalletClient::new(&Config {
        api_url: format!("http://{addr}"),
        price_url: format!("http://{addr}/api/v3/simple/price"),
        ..Config::default()
    })
}

#[tokio::test]
async fn balance_returns_parsed_amounts() {
    let addr = start_api().await;
    let wallet = wallet_for(addr);

    let balance = wallet.balance().await.unwrap();
    assert!(balance.success);
    assert_eq!(balance.balance, 1.5);
    assert_eq!(balance.balance_usd, 300.0);
}

#[tokio::test]
async fn withdraw_success_returns_receipt() {
    let addr = start_api().await;
    let wallet = wallet_for(addr);

    let receipt = wallet.withdraw("alice", "So1anaAddr", 0.5).await.unwrap();
    assert_eq!(receipt.withdrawn_usd, 100.0);
}

#[tokio::test]
async fn withdraw_rejection_surfaces_server_message() {
    let addr = start_api().await;
    let wallet = wallet_for(addr);

    let err = wallet.withdraw("alice", "So1anaAddr", 500.0).await.unwrap_err();
    match err {
        ClientError::RemoteRejection(message) => assert_eq!(message, "Insufficient balance"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn withdraw_validates_inputs_before_any_request() {
    // No server at all: validation must reject locally.
    let wallet = WalletClient::new(&Config {
        api_url: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    });

    let err = wallet.withdraw("alice", "   ", 1.0).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    let err = wallet.withdraw("alice", "So1anaAddr", 0.0).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn price_feed_parses_quote() {
    let addr = start_api().await;
    let wallet = wallet_for(addr);

    let price = wallet.sol_price_usd().await.unwrap();
    assert_eq!(price, 200.0);
}
