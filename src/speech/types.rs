//! Request/response types for the Baidu speech endpoints.

use crate::config::SecretString;
use crate::error::{Result, SpeechError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TOKEN_URL: &str = "https://openapi.baidu.com/oauth/2.0/token";
pub const DEFAULT_RECOGNITION_URL: &str = "http://vop.baidu.com/server_api";
pub const DEFAULT_SYNTHESIS_URL: &str = "http://tsn.baidu.com/text2audio";

/// Language sent with requests when the caller does not pick one
pub const DEFAULT_LANGUAGE: &str = "zh";

/// Content type the recognition endpoint expects for 8 kHz WAV
pub const RECOGNITION_CONTENT_TYPE: &str = "audio/wav;rate=8000";

/// `err_msg` value the recognition endpoint returns on success
pub(crate) const RECOGNITION_SUCCESS: &str = "success.";

/// Client-credentials pair
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<SecretString>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(SpeechError::InvalidInput("client_id is empty".to_string()));
        }
        if self.client_secret.expose_secret().trim().is_empty() {
            return Err(SpeechError::InvalidInput("client_secret is empty".to_string()));
        }
        Ok(())
    }
}

/// URLs of the three remote endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub token_url: String,
    pub recognition_url: String,
    pub synthesis_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            recognition_url: DEFAULT_RECOGNITION_URL.to_string(),
            synthesis_url: DEFAULT_SYNTHESIS_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point all three endpoints at one base URL, e.g. a local mock server.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            token_url: format!("{}/oauth/2.0/token", base),
            recognition_url: format!("{}/server_api", base),
            synthesis_url: format!("{}/text2audio", base),
        }
    }
}

/// Everything besides credentials the client needs at construction
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoints: Endpoints,
    /// Directory synthesized audio is written to
    pub output_dir: PathBuf,
    /// Per-request timeout applied by the HTTP transport
    pub timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            endpoints: Endpoints::default(),
            output_dir: output_dir.into(),
            timeout: None,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Voice and tone parameters for synthesis, passed through verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisOptions {
    /// `lan`
    pub language: String,
    /// `ctp`, client type
    pub voice_type: u32,
    /// `spd`
    pub speed: u32,
    /// `pit`
    pub pitch: u32,
    /// `vol`
    pub volume: u32,
    /// `per`, speaker voice
    pub personality: u32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            voice_type: 1,
            speed: 3,
            pitch: 3,
            volume: 9,
            personality: 0,
        }
    }
}

/// A synthesized audio file saved to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    /// Bare file name, e.g. `1700000000.mp3`
    pub file_name: String,
    /// Full path inside the output directory
    pub path: PathBuf,
    /// Bytes written
    pub size: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecognitionResponse {
    #[serde(default)]
    pub err_no: i64,
    pub err_msg: Option<String>,
    #[serde(default)]
    pub result: Vec<String>,
}

/// Strip surrounding ASCII spaces and full-width commas from a transcript.
pub(crate) fn clean_transcript(candidate: &str) -> &str {
    candidate.trim_matches(|c: char| c == ' ' || c == '，')
}
