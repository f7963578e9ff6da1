pub mod client;
pub mod endpoints;

pub use client::HttpStoreApi;
