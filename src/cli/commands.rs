//! CLI subcommands: recognize, synthesize, token, init, config.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::speech::{SpeechServiceClient, SynthesisOptions, SynthesizedAudio};
use crate::utils::mask_secret;

/// Load configuration from file or defaults
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        tracing::info!("Loading configuration from custom path: {}", path);
        Config::load_from_path(path)?
    } else {
        tracing::debug!("Loading default configuration");
        Config::load()?
    };

    config.validate()?;

    Ok(config)
}

async fn connect(config: &Config, output_dir: Option<PathBuf>) -> Result<SpeechServiceClient> {
    let credentials = config.credentials()?;
    let mut settings = config.client_settings();
    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }

    SpeechServiceClient::connect(credentials, settings)
        .await
        .context("Failed to connect to Baidu speech API")
}

/// Read a WAV file and transcribe it
async fn recognize_file(config: &Config, file: &Path, lang: &str) -> Result<String> {
    let audio = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read audio file: {}", file.display()))?;

    let client = connect(config, None).await?;
    client
        .recognize_with_language(audio, lang)
        .await
        .with_context(|| format!("Recognition failed for {}", file.display()))
}

/// Transcribe a WAV file and print the text
pub(crate) async fn cmd_recognize(config: &Config, file: &Path, lang: &str) -> Result<()> {
    let text = recognize_file(config, file, lang).await?;
    println!("{}", text);
    Ok(())
}

async fn synthesize_text(
    config: &Config,
    text: &str,
    options: &SynthesisOptions,
    output_dir: Option<PathBuf>,
) -> Result<SynthesizedAudio> {
    let client = connect(config, output_dir).await?;
    client
        .synthesize_with_options(text, options)
        .await
        .context("Synthesis failed")
}

/// Synthesize text and print where the MP3 went
pub(crate) async fn cmd_synthesize(
    config: &Config,
    text: &str,
    options: &SynthesisOptions,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let saved = synthesize_text(config, text, options, output_dir).await?;
    println!("✅ Saved {} ({} bytes)", saved.path.display(), saved.size);
    Ok(())
}

/// Session summary with the token masked
fn token_report(client: &SpeechServiceClient) -> String {
    let mut lines = vec![
        format!("Client ID:  {}", client.client_id()),
        format!("Session:    {}", client.session_id()),
        format!("Token:      {}", mask_secret(client.token())),
    ];
    if let Some(expires_in) = client.token_expires_in() {
        lines.push(format!("Expires in: {} days", expires_in.as_secs() / 86_400));
    }
    if let Some(scope) = client.token_scope() {
        lines.push(format!("Scope:      {}", scope));
    }
    lines.join("\n")
}

/// Fetch a token and show the session without leaking the token
pub(crate) async fn cmd_token(config: &Config) -> Result<()> {
    let client = connect(config, None).await?;
    println!("{}", token_report(&client));
    Ok(())
}

/// Initialize configuration file
pub(crate) fn cmd_init(force: bool) -> Result<()> {
    println!("Neutron Configuration Initialization\n");

    let config_path =
        Config::system_config_path().context("Could not determine config directory")?;

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            config_path.display()
        );
    }

    Config::default().save(&config_path)?;

    println!("✅ Configuration initialized at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Add client_id and client_secret under [baidu]");
    println!("   2. Or set BAIDU_CLIENT_ID and BAIDU_CLIENT_SECRET");
    println!("   3. Run 'neutron token' to check the credentials");

    Ok(())
}

fn config_report(config: &Config, show_secrets: bool) -> Result<String> {
    if show_secrets {
        return toml::to_string_pretty(config).context("Failed to serialize config");
    }

    let mut lines = vec![
        format!(
            "Client ID:     {}",
            config.baidu.client_id.as_deref().unwrap_or("[NOT SET]")
        ),
        format!(
            "Client secret: {}",
            if config.baidu.client_secret.is_some() {
                "[SET]"
            } else {
                "[NOT SET]"
            }
        ),
        format!("Token URL:     {}", config.endpoints.token_url),
        format!("ASR URL:       {}", config.endpoints.recognition_url),
        format!("TTS URL:       {}", config.endpoints.synthesis_url),
        format!("Output dir:    {}", config.output.dir.display()),
        format!("Log level:     {}", config.logging.level),
    ];
    if let Some(dir) = &config.logging.dir {
        lines.push(format!("Log dir:       {}", dir.display()));
    }
    if let Some(timeout) = config.http.timeout_secs {
        lines.push(format!("HTTP timeout:  {}s", timeout));
    }
    Ok(lines.join("\n"))
}

/// Show configuration
pub(crate) fn cmd_config(config: &Config, show_secrets: bool) -> Result<()> {
    println!("Neutron Configuration\n");
    println!("{}", config_report(config, show_secrets)?);

    if !show_secrets {
        println!("\n💡 Use --show-secrets to display credentials");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::Endpoints;
    use mockito::{Matcher, Server, ServerGuard};
    use tempfile::TempDir;

    const TOKEN: &str = "24.6c5e1ff107f0e8bcef8c46d3424a0e78.2592000.1485516651.282335-8574074";

    fn test_config(server: &ServerGuard, output_dir: &Path) -> Config {
        let mut config = Config::default();
        config.baidu.client_id = Some("test-id".to_string());
        config.baidu.client_secret = Some("test-secret".into());
        config.endpoints = Endpoints::with_base_url(&server.url());
        config.output.dir = output_dir.to_path_buf();
        config
    }

    async fn mock_token(server: &mut ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/oauth/2.0/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"access_token":"{}","expires_in":2592000,"scope":"audio_tts_post"}}"#,
                TOKEN
            ))
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_token_report_masks_token() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let token_mock = mock_token(&mut server).await;

        let client = connect(&test_config(&server, dir.path()), None).await.unwrap();
        let report = token_report(&client);

        token_mock.assert_async().await;
        assert!(!report.contains(TOKEN));
        assert!(report.contains("Token:      24.6...4074"));
        assert!(report.contains("Client ID:  test-id"));
        assert!(report.contains(client.session_id()));
        assert!(report.contains("Expires in: 30 days"));
        assert!(report.contains("Scope:      audio_tts_post"));
    }

    #[tokio::test]
    async fn test_cmd_token_fails_without_credentials() {
        let server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&server, dir.path());
        config.baidu.client_secret = None;

        let err = cmd_token(&config).await.unwrap_err();
        assert!(err.to_string().contains("client_secret"));
    }

    #[tokio::test]
    async fn test_recognize_file_reads_audio_and_uses_language() {
        let mut server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let _token = mock_token(&mut server).await;
        let asr = server
            .mock("POST", "/server_api")
            .match_query(Matcher::UrlEncoded("lan".into(), "en".into()))
            .match_body(Matcher::Exact("RIFFfake".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"err_no":0,"err_msg":"success.","result":["hello world ，"]}"#)
            .create_async()
            .await;

        let wav = dir.path().join("sample.wav");
        std::fs::write(&wav, b"RIFFfake").unwrap();

        let config = test_config(&server, dir.path());
        let text = recognize_file(&config, &wav, "en").await.unwrap();
        assert_eq!(text, "hello world");
        asr.assert_async().await;

        assert!(cmd_recognize(&config, &wav, "en").await.is_ok());
    }

    #[tokio::test]
    async fn test_recognize_missing_file_skips_network() {
        let server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let config = test_config(&server, dir.path());

        let err = cmd_recognize(&config, &dir.path().join("missing.wav"), "zh")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read audio file"));
    }

    #[tokio::test]
    async fn test_synthesize_text_writes_into_override_dir() {
        let mut server = Server::new_async().await;
        let config_dir = TempDir::new().unwrap();
        let override_dir = TempDir::new().unwrap();
        let _token = mock_token(&mut server).await;
        let tts = server
            .mock("GET", "/text2audio")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("tex".into(), "你好".into()),
                Matcher::UrlEncoded("spd".into(), "5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "audio/mp3")
            .with_body(b"ID3mp3")
            .create_async()
            .await;

        let config = test_config(&server, config_dir.path());
        let options = SynthesisOptions {
            speed: 5,
            ..SynthesisOptions::default()
        };
        let saved = synthesize_text(&config, "你好", &options, Some(override_dir.path().to_path_buf()))
            .await
            .unwrap();

        tts.assert_async().await;
        assert!(saved.path.starts_with(override_dir.path()));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"ID3mp3");
        assert_eq!(std::fs::read_dir(config_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_config_report_hides_secret() {
        let mut config = Config::default();
        config.baidu.client_id = Some("my-id".to_string());
        config.baidu.client_secret = Some("very-secret-value".into());
        config.logging.dir = Some(PathBuf::from("/tmp/neutron-logs"));
        config.http.timeout_secs = Some(15);

        let report = config_report(&config, false).unwrap();
        assert!(report.contains("Client ID:     my-id"));
        assert!(report.contains("Client secret: [SET]"));
        assert!(report.contains("Log dir:       /tmp/neutron-logs"));
        assert!(report.contains("HTTP timeout:  15s"));
        assert!(!report.contains("very-secret-value"));

        let full = config_report(&config, true).unwrap();
        assert!(full.contains("very-secret-value"));
    }

    #[test]
    fn test_config_report_unset_credentials() {
        let report = config_report(&Config::default(), false).unwrap();
        assert!(report.contains("Client ID:     [NOT SET]"));
        assert!(report.contains("Client secret: [NOT SET]"));
    }
}
