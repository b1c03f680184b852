//! CRM API interaction module
//!
//! Everything that talks to the network lives here. The rest of the crate
//! only sees the [`client::Transport`] trait.
//!
//! # Module Structure
//!
//! - [`auth`] - API key resolution and masking
//! - [`client`] - The `Transport` trait and its REST implementation
//! - [`http`] - HTTP utilities and the `TransportError` type
//!
//! # Example
//!
//! ```ignore
//! use crmctl::api::{ApiClient, Credentials, Transport};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ApiClient::new("https://api.twenty.com", Credentials::from_key("key"))?;
//!     let task = client.get("tasks", "7b0c6a1e").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;

pub use auth::Credentials;
pub use client::{ApiClient, Transport, DEFAULT_BASE_URL};
pub use http::TransportError;
