pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use app::CommandRunner;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpStoreApi;
pub use config::ClientConfig;
pub use core::{with_retry, RetryPolicy, StoreRepository};
pub use domain::ports::{ApiDialect, ConfigProvider, DownloadManager, Repository, StoreApi};
pub use utils::error::{Result, StoreError};
