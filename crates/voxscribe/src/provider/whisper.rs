//! OpenAI Whisper adapter.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{detect_language, ProviderError, ProviderErrorCode, Transcription, TranscriptionProvider};
use crate::config::ProviderConfig;
use crate::job::Language;
use crate::sanitize;

/// `verbose_json` response body; only the fields we use.
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default)]
    avg_logprob: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

pub struct WhisperProvider {
    client: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    temperature: f32,
}

impl WhisperProvider {
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        model: &str,
        temperature: f32,
        request_timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        })
    }

    pub fn from_config(config: &ProviderConfig, api_key: SecretString) -> Result<Self, ProviderError> {
        Self::new(
            api_key,
            &config.base_url,
            &config.model,
            config.temperature,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    async fn build_form(&self, path: &Path) -> Result<Form, ProviderError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ProviderError::new(format!("Failed to read audio file: {}", e))
                .with_code(ProviderErrorCode::InvalidFile)
        })?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = Part::bytes(bytes)
            .file_name(sanitize::redact_path(path))
            .mime_str(mime.as_ref())
            .map_err(map_transport_error)?;

        // Language is left to auto-detection; the hint only feeds our own fallback.
        Ok(Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("temperature", self.temperature.to_string()))
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperProvider {
    async fn transcribe(
        &self,
        path: &Path,
        _language_hint: Language,
    ) -> Result<Transcription, ProviderError> {
        let started = Instant::now();
        info!(file = %sanitize::redact_path(path), "Starting Whisper transcription");

        let form = self.build_form(path).await?;
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let err = parse_error_response(status.as_u16(), &body);
            warn!(
                status = status.as_u16(),
                code = err.code.as_ref().map(|c| c.as_str()).unwrap_or("none"),
                "Whisper request failed: {}",
                err.message
            );
            return Err(err);
        }

        let transcription = parse_success_response(&body, started.elapsed())?;
        info!(
            elapsed_ms = transcription.processing_time.as_millis() as u64,
            language = %transcription.language,
            "Whisper transcription completed"
        );
        Ok(transcription)
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    let mut err = ProviderError::new(format!("Whisper request error: {}", e));
    if e.is_timeout() {
        err = err.with_code(ProviderErrorCode::Timeout);
    } else if e.is_connect() || e.is_request() || e.is_body() || e.is_decode() {
        // Includes a connection dropped while the response body streams in.
        err = err.with_code(ProviderErrorCode::NetworkError);
    }
    if let Some(status) = e.status() {
        err = err.with_status(status.as_u16());
    }
    err
}

fn parse_success_response(body: &str, elapsed: Duration) -> Result<Transcription, ProviderError> {
    let parsed: VerboseTranscription = serde_json::from_str(body).map_err(|e| {
        ProviderError::new(format!("Failed to parse Whisper response: {}", e))
    })?;

    let transcript = parsed.text.unwrap_or_default().trim().to_string();
    let language = detect_language(&transcript);
    let confidence = parsed.segments.first().and_then(|s| s.avg_logprob);

    Ok(Transcription {
        transcript,
        language,
        confidence,
        processing_time: elapsed,
    })
}

fn parse_error_response(status: u16, body: &str) -> ProviderError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    if envelope.is_none() {
        debug!("Unstructured Whisper error body: {}", sanitize::truncate_body(body));
    }

    let (message, code) = match envelope {
        Some(ApiErrorEnvelope { error }) => {
            let message = error
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Whisper returned HTTP {}", status));
            let code = error
                .code
                .or(error.kind)
                .map(|c| ProviderErrorCode::parse(&c));
            (message, code)
        }
        None if body.trim().is_empty() => (format!("Whisper returned HTTP {}", status), None),
        None => (sanitize::truncate_body(body), None),
    };

    let code = match code {
        Some(ProviderErrorCode::Other(_)) | None if status == 429 => {
            Some(ProviderErrorCode::RateLimitExceeded)
        }
        other => other,
    };

    let mut err = ProviderError::new(message).with_status(status);
    err.code = code;
    err
}
