use rand::Rng;
use ulid::Ulid;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = gamelink_common::id::prefixed_ulid("req");
/// assert!(id.starts_with("req_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}

/// Guest session identity used when no username has been established.
pub fn guest_username() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("player_{n}")
}

/// Numeric identifier for a freshly created game room.
pub fn room_id() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    n.to_string()
}

/// Idempotency key attached to outgoing friend requests so the relay can
/// drop rapid duplicate submissions.
pub fn request_key() -> String {
    prefixed_ulid("req")
}
