pub mod repository;
pub mod retry;

pub use crate::domain::ports::{DownloadManager, Repository, StoreApi};
pub use crate::utils::error::Result;
pub use repository::StoreRepository;
pub use retry::{with_retry, RetryPolicy};
