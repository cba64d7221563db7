//! Neutron - Baidu speech API client
//!
//! Exchanges a client-credentials pair for an access token, then turns WAV
//! audio into text and text into MP3 files through Baidu's voice REST API.
//!
//! ## Quick Start
//!
//! ```no_run
//! use neutron::speech::{ClientSettings, Credentials, SpeechServiceClient};
//!
//! # async fn demo() -> neutron::Result<()> {
//! let client = SpeechServiceClient::connect(
//!     Credentials::new("api-key", "secret-key"),
//!     ClientSettings::new("return_audio"),
//! )
//! .await?;
//!
//! let text = client.recognize(std::fs::read("hello.wav")?).await?;
//! let saved = client.synthesize(&text).await?;
//! println!("{} -> {}", text, saved.file_name);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod speech;
pub mod utils;

// Re-export commonly used types
pub use error::{ErrorCode, Result, SpeechError};
pub use speech::SpeechServiceClient;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
