//! Baidu speech client
//!
//! Exchanges client credentials for an access token once, then serves
//! speech-to-text (`server_api`) and text-to-speech (`text2audio`) calls with it.

use super::types::{
    clean_transcript, ClientSettings, Credentials, Endpoints, RecognitionResponse,
    SynthesisOptions, SynthesizedAudio, TokenResponse, DEFAULT_LANGUAGE,
    RECOGNITION_CONTENT_TYPE, RECOGNITION_SUCCESS,
};
use crate::error::{Result, SpeechError};
use crate::utils::truncate_str;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// Upper bound on `-N` suffixes tried when a timestamped file name is taken
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Token issued by the OAuth endpoint. Never refreshed.
#[derive(Clone)]
struct AccessToken {
    value: String,
    expires_in: Option<Duration>,
    scope: Option<String>,
}

#[derive(Serialize)]
struct RecognitionQuery<'a> {
    cuid: &'a str,
    token: &'a str,
    lan: &'a str,
}

#[derive(Serialize)]
struct SynthesisQuery<'a> {
    tex: &'a str,
    lan: &'a str,
    tok: &'a str,
    ctp: u32,
    cuid: &'a str,
    spd: u32,
    pit: u32,
    vol: u32,
    per: u32,
}

/// Client for the Baidu speech API.
///
/// The token and session id are fixed at construction, so a shared reference
/// can serve concurrent calls.
pub struct SpeechServiceClient {
    http: Client,
    credentials: Credentials,
    session_id: String,
    token: AccessToken,
    endpoints: Endpoints,
    output_dir: PathBuf,
}

impl std::fmt::Debug for SpeechServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechServiceClient")
            .field("client_id", &self.credentials.client_id)
            .field("session_id", &self.session_id)
            .field("endpoints", &self.endpoints)
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

impl SpeechServiceClient {
    /// Build a client and fetch its access token.
    ///
    /// Fails with [`SpeechError::InvalidInput`] on empty credentials and with
    /// [`SpeechError::Authentication`] when no usable token comes back.
    pub async fn connect(credentials: Credentials, settings: ClientSettings) -> Result<Self> {
        credentials.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let session_id = Uuid::new_v4().simple().to_string();
        let token = issue_token(&http, &settings.endpoints.token_url, &credentials).await?;

        tracing::info!(
            "Baidu token acquired (client_id={}, session={}, expires_in={:?})",
            credentials.client_id,
            session_id,
            token.expires_in,
        );

        Ok(Self {
            http,
            credentials,
            session_id,
            token,
            endpoints: settings.endpoints,
            output_dir: settings.output_dir,
        })
    }

    /// Session identifier sent as `cuid`
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Access token obtained at construction
    pub fn token(&self) -> &str {
        &self.token.value
    }

    /// Lifetime reported by the token endpoint, if any. Informational only.
    pub fn token_expires_in(&self) -> Option<Duration> {
        self.token.expires_in
    }

    pub fn token_scope(&self) -> Option<&str> {
        self.token.scope.as_deref()
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Recognize Mandarin speech from 8 kHz WAV bytes.
    pub async fn recognize(&self, audio: Vec<u8>) -> Result<String> {
        self.recognize_with_language(audio, DEFAULT_LANGUAGE).await
    }

    /// Recognize speech in `language` (two-letter code) from 8 kHz WAV bytes.
    ///
    /// Returns the first candidate with surrounding spaces and full-width
    /// commas removed.
    pub async fn recognize_with_language(&self, audio: Vec<u8>, language: &str) -> Result<String> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidInput("audio buffer is empty".to_string()));
        }

        let audio_len = audio.len();
        let query = RecognitionQuery {
            cuid: &self.session_id,
            token: &self.token.value,
            lan: language,
        };

        let response = self
            .http
            .post(&self.endpoints.recognition_url)
            .query(&query)
            .header(CONTENT_TYPE, RECOGNITION_CONTENT_TYPE)
            .body(audio)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let parsed: RecognitionResponse = serde_json::from_slice(&body).map_err(|e| {
            SpeechError::MalformedResponse(format!(
                "recognition response ({}) is not valid JSON: {}",
                status, e
            ))
        })?;

        if parsed.err_msg.as_deref() != Some(RECOGNITION_SUCCESS) {
            let err_msg = parsed.err_msg.unwrap_or_default();
            tracing::warn!("Baidu ASR rejected {} bytes: {} {}", audio_len, parsed.err_no, err_msg);
            return Err(SpeechError::Recognition {
                err_no: parsed.err_no,
                err_msg,
            });
        }

        let candidate = parsed.result.first().ok_or_else(|| {
            SpeechError::MalformedResponse("recognition succeeded without a result".to_string())
        })?;
        let text = clean_transcript(candidate).to_string();

        tracing::info!(
            "Baidu ASR: recognized {} chars from {} bytes (lan={})",
            text.chars().count(),
            audio_len,
            language,
        );

        Ok(text)
    }

    /// Synthesize `text` with the default voice and save it as an `.mp3`.
    pub async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
        self.synthesize_with_options(text, &SynthesisOptions::default())
            .await
    }

    /// Synthesize `text` and save the audio in the output directory.
    ///
    /// Only the HTTP status decides success; a 200 body is written as-is.
    pub async fn synthesize_with_options(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<SynthesizedAudio> {
        if text.trim().is_empty() {
            return Err(SpeechError::InvalidInput("text is empty".to_string()));
        }

        let query = SynthesisQuery {
            tex: text,
            lan: &options.language,
            tok: &self.token.value,
            ctp: options.voice_type,
            cuid: &self.session_id,
            spd: options.speed,
            pit: options.pitch,
            vol: options.volume,
            per: options.personality,
        };

        let response = self
            .http
            .get(&self.endpoints.synthesis_url)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Baidu TTS error ({}): {}", status, truncate_str(&body, 200));
            return Err(SpeechError::Synthesis {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?;
        let saved = save_audio(&self.output_dir, &audio).await?;

        tracing::info!(
            "Baidu TTS: wrote {} bytes to {} (text=\"{}\", per={})",
            saved.size,
            saved.path.display(),
            truncate_str(text, 60),
            options.personality,
        );

        Ok(saved)
    }
}

/// Exchange client credentials for an access token.
async fn issue_token(http: &Client, url: &str, credentials: &Credentials) -> Result<AccessToken> {
    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.expose_secret()),
    ];

    let response = http
        .post(url)
        .form(&form)
        .send()
        .await
        .map_err(|e| SpeechError::Authentication(format!("token endpoint unreachable: {}", e)))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        SpeechError::Authentication(format!("failed to read token response: {}", e))
    })?;

    let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        SpeechError::Authentication(format!("token response ({}) is not valid JSON: {}", status, e))
    })?;

    match parsed.access_token.filter(|token| !token.is_empty()) {
        Some(value) => Ok(AccessToken {
            value,
            expires_in: parsed.expires_in.map(Duration::from_secs),
            scope: parsed.scope,
        }),
        None => {
            let reason = match (parsed.error, parsed.error_description) {
                (Some(error), Some(description)) => format!("{}: {}", error, description),
                (Some(error), None) => error,
                (None, _) => "response has no access_token".to_string(),
            };
            Err(SpeechError::Authentication(format!(
                "token endpoint returned {}: {}",
                status, reason
            )))
        }
    }
}

/// Write `audio` to `<unix seconds>.mp3` in `dir`, adding `-N` if the name is taken.
async fn save_audio(dir: &Path, audio: &[u8]) -> Result<SynthesizedAudio> {
    tokio::fs::create_dir_all(dir).await?;

    let stamp = chrono::Utc::now().timestamp().to_string();
    let stamp = truncate_str(&stamp, 10);

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let file_name = if attempt == 0 {
            format!("{}.mp3", stamp)
        } else {
            format!("{}-{}.mp3", stamp, attempt)
        };
        let path = dir.join(&file_name);

        let file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };

        write_or_remove(file, &path, audio).await?;

        return Ok(SynthesizedAudio {
            file_name,
            path,
            size: audio.len(),
        });
    }

    Err(SpeechError::Io(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("no free file name for timestamp {} in {:?}", stamp, dir),
    )))
}

/// Write and flush `audio`, deleting `path` if either step fails.
async fn write_or_remove<W>(mut writer: W, path: &Path, audio: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let result = async {
        writer.write_all(audio).await?;
        writer.flush().await
    }
    .await;

    if result.is_err() {
        drop(writer);
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!("Failed to remove partial audio file {:?}: {}", path, e);
        }
    }

    result
}
