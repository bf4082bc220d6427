//! Offline card data: MTGJSON parquet files cached on disk and queried with
//! DuckDB.

pub mod cache;
pub mod connection;
pub mod source;
pub mod sql_builder;

pub use cache::CacheManager;
pub use connection::Connection;
pub use source::MtgjsonStore;
pub use sql_builder::SqlBuilder;
