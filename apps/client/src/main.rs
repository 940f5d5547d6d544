use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamelink_client::config::Config;
use gamelink_client::error::ClientError;
use gamelink_client::relay::{
    ConnectionManager, FriendPresenceClient, GameInvite, GameTarget, Navigator, Notice, Notifier,
};
use gamelink_client::wallet::WalletClient;

/// Notifier that renders notices to the terminal and auto-accepts invites.
struct TerminalNotifier;

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info { message } => tracing::info!("{message}"),
            Notice::Error { message } => tracing::warn!("{message}"),
            Notice::FriendRequest { request, .. } => {
                tracing::info!(
                    id = %request.id,
                    from = %request.username,
                    "incoming friend request: `accept {}` or `decline {}`",
                    request.id,
                    request.id
                );
            }
        }
    }

    async fn confirm_invite(&self, invite: &GameInvite) -> bool {
        tracing::info!(from = %invite.from, "game invite received, joining");
        true
    }
}

struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: &GameTarget) {
        tracing::info!(path = %target.path(), "navigating to shared game room");
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(relay_url = %config.relay_url, region = %config.default_region, "gamelink-client configured");

    let wallet = WalletClient::new(&config);
    let manager = ConnectionManager::new();
    let client = manager.acquire(
        &config,
        std::env::var("GAMELINK_USERNAME").ok().filter(|s| !s.is_empty()),
        Arc::new(TerminalNotifier),
        Arc::new(TerminalNavigator),
    );
    if let Some(name) = client.username() {
        tracing::info!(username = %name, "session identity");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let line = line.trim();
                if line == "quit" {
                    break;
                }
                if let Err(e) = dispatch(&client, &wallet, line).await {
                    tracing::warn!(error = %e, "command failed");
                }
            }
        }
    }

    manager.shutdown();
    tracing::info!("gamelink-client stopped");
}

async fn dispatch(
    client: &FriendPresenceClient,
    wallet: &WalletClient,
    line: &str,
) -> Result<(), ClientError> {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or("");
    let rest = parts.next().map(str::trim);

    match (command, rest) {
        ("add", Some(name)) => client.add_friend(name).await,
        ("accept", Some(id)) => client.accept_friend_request(id).await,
        ("decline", Some(id)) => client.decline_friend_request(id).await,
        ("invite", Some(name)) => client.invite_friend(name).await,
        ("friends", _) => {
            for friend in client.friends() {
                let status = if friend.is_playing {
                    "playing"
                } else if friend.is_online {
                    "online"
                } else {
                    "offline"
                };
                println!("{} ({status})", friend.username);
            }
            Ok(())
        }
        ("requests", _) => {
            for request in client.pending_requests() {
                println!("{}: {} ({})", request.id, request.username, request.timestamp);
            }
            Ok(())
        }
        ("balance", _) => {
            let balance = wallet.balance().await?;
            println!("{} SOL (${:.2})", balance.balance, balance.balance_usd);
            Ok(())
        }
        ("price", _) => {
            let price = wallet.sol_price_usd().await?;
            println!("SOL/USD: {price:.2}");
            Ok(())
        }
        ("withdraw", Some(rest)) => {
            let mut args = rest.split_whitespace();
            let (Some(address), Some(amount)) = (args.next(), args.next()) else {
                println!("usage: withdraw <address> <amount>");
                return Ok(());
            };
            let amount: f64 = amount
                .parse()
                .map_err(|_| ClientError::Validation("amount must be a number".to_string()))?;
            let user_id = client.username().unwrap_or_default();
            let receipt = wallet.withdraw(&user_id, address, amount).await?;
            println!("withdrew ${:.2}", receipt.withdrawn_usd);
            Ok(())
        }
        ("", _) => Ok(()),
        (command, _) => {
            println!(
                "unknown command: {command} (try add/accept/decline/invite/friends/requests/balance/price/withdraw/quit)"
            );
            Ok(())
        }
    }
}
