pub mod cache;
pub mod config;
pub mod error;
pub mod init;
pub mod models;
pub mod notifier;
pub mod prelude;

pub use twilight_gateway as gateway;
pub use twilight_http as http;
