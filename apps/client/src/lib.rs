pub mod config;
pub mod error;
pub mod relay;
pub mod wallet;

pub use config::Config;
pub use error::ClientError;
