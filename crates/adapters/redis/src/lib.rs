//! adapter-redis - Redis 适配器

mod config;
mod connection;
mod store;

pub use config::*;
pub use connection::*;
pub use store::*;
