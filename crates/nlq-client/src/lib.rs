//! NLQ Client - HTTP collaborators for the NLQ engine.
//!
//! Provides [`ODataClient`], a [`nlq_core::SourceClient`] speaking OData over
//! HTTP, and [`GeminiClient`], a [`nlq_core::TextGenerator`] backed by the
//! Gemini `generateContent` API.
//!
//! # Example
//!
//! ```ignore
//! use nlq_client::{ClientConfig, ODataClient};
//!
//! let config = ClientConfig::new("https://erp.example.com")
//!     .with_credentials("reporting", "secret");
//! let source = ODataClient::new(config)?;
//! ```

pub mod config;
pub mod error;
pub mod gemini;
pub mod odata;

pub use config::{
    ClientConfig, GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_GENERATION_TIMEOUT, DEFAULT_SERVICE_ROOT, DEFAULT_TIMEOUT,
};
pub use error::{ClientError, Result};
pub use gemini::GeminiClient;
pub use odata::ODataClient;
