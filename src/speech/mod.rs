//! Speech Module
//!
//! Speech-to-text and text-to-speech over the Baidu voice REST API.

mod client;
mod types;

pub use client::SpeechServiceClient;
pub use types::{
    ClientSettings, Credentials, Endpoints, SynthesisOptions, SynthesizedAudio,
    DEFAULT_LANGUAGE, DEFAULT_RECOGNITION_URL, DEFAULT_SYNTHESIS_URL, DEFAULT_TOKEN_URL,
    RECOGNITION_CONTENT_TYPE,
};
