//! WiseASR pronunciation-scoring API client.
//!
//! Request body: `{"argument": {"language_code": ..., "audio": <base64>}}`
//! with the access key in the `Authorization` header. The response carries
//! its own application-level status independent of the HTTP status:
//! `result == 0` with a `return_object` on success, a nonzero `result` with a
//! `reason` on application failure.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::cancel::CancellationToken;

/// Everything one submission needs: endpoint, credential, language and the
/// explicit request timeout.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub endpoint: String,
    pub access_key: String,
    pub language_code: String,
    pub timeout: Duration,
}

/// The decoded score and transcript for one utterance.
///
/// The API scores on a 0-5 scale; the screen presents 0-100, so
/// [`scaled_score`](Self::scaled_score) applies the factor of 20.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub recognized_text: String,
    pub raw_score: f64,
}

impl ScoreResult {
    pub fn scaled_score(&self) -> f64 {
        self.raw_score * 20.0
    }
}

/// Terminal states of one submission. Cancellation is a benign outcome, not
/// an error; the caller still has to clear its loading indicator.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(ScoreResult),
    Cancelled,
}

/// Failures raised while scoring. All are surfaced as user-visible notices
/// and none are retried automatically.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// The endpoint answered with a non-2xx HTTP status.
    #[error("scoring service returned HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The endpoint answered 2xx but rejected the request (`result != 0`).
    #[error("scoring rejected (result {code}): {reason}")]
    Application { code: i64, reason: String },

    /// The request never produced a response (connect, timeout, ...).
    #[error("scoring request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not the documented shape.
    #[error("could not decode scoring response: {0}")]
    Decode(#[from] serde_json::Error),

    /// `result == 0` but the payload carried no `return_object`.
    #[error("scoring response missing return_object")]
    MalformedResponse,

    /// The recorded artifact could not be read from disk.
    #[error("failed to read recording: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    argument: ScoreArgument<'a>,
}

#[derive(Debug, Serialize)]
struct ScoreArgument<'a> {
    language_code: &'a str,
    audio: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    result: i64,
    #[serde(default)]
    return_object: Option<ReturnObject>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReturnObject {
    recognized: String,
    score: f64,
}

/// Reads an artifact from disk and submits it for scoring.
///
/// Convenience wrapper used by the commands; the read itself is part of the
/// cancellable operation.
pub async fn score_file(
    config: &ScoringConfig,
    path: &Path,
    token: CancellationToken,
) -> Result<ScoreOutcome, ScoringError> {
    let audio = tokio::fs::read(path).await?;
    if token.is_cancelled() {
        return Ok(ScoreOutcome::Cancelled);
    }
    submit(config, &audio, token).await
}

/// Submits one utterance for pronunciation scoring.
///
/// At most one submission should be in flight; callers obtain their token
/// from [`super::UploadSlot`]. A triggered token settles this future with
/// `ScoreOutcome::Cancelled` promptly, dropping the underlying request.
///
/// # Errors
/// - `Transport` for non-2xx HTTP responses, with status and body text
/// - `Application` for `result != 0` bodies, with the service's reason
/// - `Network` when no response arrives (includes the explicit timeout)
/// - `Decode`/`MalformedResponse` for bodies outside the contract
pub async fn submit(
    config: &ScoringConfig,
    audio: &[u8],
    token: CancellationToken,
) -> Result<ScoreOutcome, ScoringError> {
    let encoded = BASE64.encode(audio);
    let body = ScoreRequest {
        argument: ScoreArgument {
            language_code: &config.language_code,
            audio: encoded,
        },
    };

    tracing::debug!(
        "Scoring API call:\n  URL: {}\n  Method: POST\n  Headers:\n    Authorization: <redacted>\n    Content-Type: application/json\n  language_code: {}, audio: {} bytes before base64",
        config.endpoint,
        config.language_code,
        audio.len()
    );

    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()?;

    let request = client
        .post(&config.endpoint)
        .header(reqwest::header::AUTHORIZATION, &config.access_key)
        .json(&body)
        .send();

    let response = tokio::select! {
        _ = token.cancelled() => {
            tracing::info!("Scoring request cancelled before a response arrived");
            return Ok(ScoreOutcome::Cancelled);
        }
        response = request => response?,
    };

    let status = response.status();
    let text = tokio::select! {
        _ = token.cancelled() => {
            tracing::info!("Scoring request cancelled while reading the response");
            return Ok(ScoreOutcome::Cancelled);
        }
        text = response.text() => text?,
    };

    if !status.is_success() {
        tracing::error!("Scoring request failed: HTTP {} {}", status.as_u16(), text);
        return Err(ScoringError::Transport {
            status: status.as_u16(),
            body: text,
        });
    }

    let result = decode_response(&text)?;
    tracing::info!(
        "Scoring succeeded: score {} ({} scaled), recognized {} chars",
        result.raw_score,
        result.scaled_score(),
        result.recognized_text.chars().count()
    );
    Ok(ScoreOutcome::Scored(result))
}

/// Decodes a 2xx response body against the result/reason contract.
fn decode_response(body: &str) -> Result<ScoreResult, ScoringError> {
    let parsed: ApiResponse = serde_json::from_str(body)?;

    if parsed.result == 0 {
        let return_object = parsed
            .return_object
            .ok_or(ScoringError::MalformedResponse)?;
        Ok(ScoreResult {
            recognized_text: return_object.recognized,
            raw_score: return_object.score,
        })
    } else {
        Err(ScoringError::Application {
            code: parsed.result,
            reason: parsed
                .reason
                .unwrap_or_else(|| "no reason given".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_decodes_into_score_result() {
        let body = r#"{"result":0,"return_object":{"recognized":"안녕하세요","score":4.0}}"#;
        let result = decode_response(body).unwrap();
        assert_eq!(result.recognized_text, "안녕하세요");
        assert_eq!(result.raw_score, 4.0);
        assert_eq!(result.scaled_score(), 80.0);
    }

    #[test]
    fn application_failure_carries_the_reason() {
        let body = r#"{"result":-1,"reason":"Invalid access key"}"#;
        match decode_response(body) {
            Err(ScoringError::Application { code, reason }) => {
                assert_eq!(code, -1);
                assert_eq!(reason, "Invalid access key");
            }
            other => panic!("expected application failure, got {other:?}"),
        }
    }

    #[test]
    fn application_failure_without_reason_still_decodes() {
        let body = r#"{"result":7}"#;
        match decode_response(body) {
            Err(ScoringError::Application { code, reason }) => {
                assert_eq!(code, 7);
                assert_eq!(reason, "no reason given");
            }
            other => panic!("expected application failure, got {other:?}"),
        }
    }

    #[test]
    fn success_without_return_object_is_malformed() {
        let body = r#"{"result":0}"#;
        assert!(matches!(
            decode_response(body),
            Err(ScoringError::MalformedResponse)
        ));
    }

    #[test]
    fn transport_error_mentions_status_and_body() {
        let err = ScoringError::Transport {
            status: 500,
            body: "Internal Error".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("Internal Error"));
    }

    #[tokio::test]
    async fn submit_surfaces_non_2xx_as_transport_with_status_and_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Drain the full request (the JSON body ends with "}}") before
            // answering, so the client never sees a reset mid-write.
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(2).any(|w| w == b"}}") {
                    break;
                }
            }
            socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\n\
                      content-length: 14\r\n\
                      connection: close\r\n\r\n\
                      Internal Error",
                )
                .await
                .unwrap();
        });

        let config = ScoringConfig {
            endpoint: format!("http://{addr}/score"),
            access_key: "test-key".to_string(),
            language_code: "korean".to_string(),
            timeout: Duration::from_secs(5),
        };
        let token = CancellationToken::new();

        match submit(&config, b"audio", token).await {
            Err(ScoringError::Transport { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "Internal Error");
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_settles_with_cancelled_when_token_is_already_triggered() {
        // Unroutable endpoint; the pre-triggered token must win the select
        // before any network progress matters.
        let config = ScoringConfig {
            endpoint: "http://127.0.0.1:9/score".to_string(),
            access_key: "test-key".to_string(),
            language_code: "korean".to_string(),
            timeout: Duration::from_secs(5),
        };
        let token = CancellationToken::new();
        token.cancel();

        let outcome = submit(&config, b"audio", token).await.unwrap();
        assert_eq!(outcome, ScoreOutcome::Cancelled);
    }

    #[test]
    fn request_body_matches_the_wire_contract() {
        let body = ScoreRequest {
            argument: ScoreArgument {
                language_code: "korean",
                audio: BASE64.encode(b"pcm"),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["argument"]["language_code"], "korean");
        assert_eq!(json["argument"]["audio"], "cGNt");
    }
}
