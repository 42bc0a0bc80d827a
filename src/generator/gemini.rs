//! # Gemini Generator
//!
//! Calls the Gemini `generateContent` REST endpoint with a JSON response
//! schema, then reshapes the answer into a [`ContentPackage`] by turning each
//! segment's visual keywords into stock-media search links.
//!
//! Without any API key the generator returns [`mock_package`] instead of
//! failing.

use super::mock::mock_package;
use super::{
    ContentGenerator, ContentPackage, ContentType, GenerateError, GenerationRequest, MediaLink,
    ScriptSegment,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    api_key: Option<String>,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Whether a key is configured (a request may still bring its own)
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn call(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<ContentPackage, GenerateError> {
        let body = request_body(&build_prompt(&request.topic, request.content_type));

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        let model_text = extract_text(&text)?;
        parse_package(&model_text)
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ContentPackage, GenerateError> {
        let api_key = request
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .or(self.api_key.as_deref());

        let Some(api_key) = api_key else {
            tracing::warn!("No API key configured, returning mock package");
            return Ok(mock_package());
        };

        tracing::info!(
            model = %self.model,
            content_type = request.content_type.key(),
            "Requesting content package"
        );

        let result = self.call(api_key, request).await;
        if let Err(ref e) = result {
            tracing::error!(error = %e, "Content generation failed");
        }
        result
    }
}

fn build_prompt(topic: &str, content_type: ContentType) -> String {
    format!(
        r#"You are a creative assistant for content creators.
Based on the following topic and content type, generate a comprehensive content package.

Topic: "{topic}"
Content Type: "{content_type}"

Your response must be a JSON object that strictly follows the provided schema.
For each script segment, provide detailed talking points.
For each script segment, also provide 3-5 descriptive keywords for finding relevant royalty-free stock media (images or videos). These keywords should be simple and effective for searching on sites like Pexels or Pixabay."#,
        topic = topic,
        content_type = content_type.label(),
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "titles": {
                "type": "ARRAY",
                "description": "3 catchy and relevant title or hook suggestions.",
                "items": { "type": "STRING" }
            },
            "script": {
                "type": "ARRAY",
                "description": "An array of script segments, each with a title, talking points, and visual keywords.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "segmentTitle": {
                            "type": "STRING",
                            "description": "The title of this script segment (e.g., 'Introduction', 'Main Point 1', 'Conclusion')."
                        },
                        "talkingPoints": {
                            "type": "ARRAY",
                            "description": "A list of detailed talking points for this segment.",
                            "items": { "type": "STRING" }
                        },
                        "visualKeywords": {
                            "type": "ARRAY",
                            "description": "3-5 descriptive keywords for finding stock media for this segment.",
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["segmentTitle", "talkingPoints", "visualKeywords"]
                }
            }
        },
        "required": ["titles", "script"]
    })
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
            "temperature": TEMPERATURE
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate
fn extract_text(body: &str) -> Result<String, GenerateError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerateError::MalformedResponse(format!("invalid envelope: {}", e)))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerateError::MalformedResponse(
            "response has no text".to_string(),
        ));
    }

    Ok(text)
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    titles: Vec<String>,
    script: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSegment {
    segment_title: String,
    talking_points: Vec<String>,
    #[serde(default)]
    visual_keywords: Vec<String>,
}

/// Parse the model's JSON text and map visual keywords to media links
fn parse_package(text: &str) -> Result<ContentPackage, GenerateError> {
    let raw: RawPackage = serde_json::from_str(text.trim())
        .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;

    let script = raw
        .script
        .into_iter()
        .map(|segment| ScriptSegment {
            segment_title: segment.segment_title,
            talking_points: segment.talking_points,
            media_links: segment
                .visual_keywords
                .iter()
                .map(|kw| MediaLink::for_keyword(kw))
                .collect(),
        })
        .collect();

    Ok(ContentPackage {
        titles: raw.titles,
        script,
    })
}

/// Map an unsuccessful HTTP response to a [`GenerateError`]
fn classify_failure(status: StatusCode, body: &str) -> GenerateError {
    let invalid_key = status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("API_KEY_INVALID")
        || body.contains("API key not valid");

    if invalid_key {
        return GenerateError::InvalidCredential;
    }

    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect());

    GenerateError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(api_key: Option<&str>) -> GeminiGenerator {
        GeminiGenerator::new(
            api_key.map(str::to_string),
            DEFAULT_MODEL,
            // Nothing listens here; tests never reach the network
            "http://127.0.0.1:9/v1beta/",
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            generator(None).endpoint(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_blank_key_is_no_key() {
        assert!(!generator(Some("  ")).has_api_key());
        assert!(generator(Some("abc")).has_api_key());
    }

    #[tokio::test]
    async fn test_no_key_returns_mock_package() {
        let request = GenerationRequest {
            topic: "Rust".to_string(),
            content_type: ContentType::Blog,
            api_key: None,
        };

        let package = generator(None).generate(&request).await.unwrap();
        assert_eq!(package, mock_package());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let request = GenerationRequest {
            topic: "Rust".to_string(),
            content_type: ContentType::Blog,
            api_key: Some("override".to_string()),
        };

        let err = generator(None).generate(&request).await.unwrap_err();
        assert!(matches!(err, GenerateError::Request(_)));
    }

    #[test]
    fn test_prompt_mentions_topic_and_label() {
        let prompt = build_prompt("sourdough baking", ContentType::TikTok);
        assert!(prompt.contains(r#"Topic: "sourdough baking""#));
        assert!(prompt.contains(r#"Content Type: "TikTok/Reels Short (30-60 sec)""#));
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("hi");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(["titles", "script"])
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"titles\":"},{"text":"[]}"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), r#"{"titles":[]}"#);
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let err = extract_text(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, GenerateError::MalformedResponse(_)));

        let err = extract_text("<html>").unwrap_err();
        assert!(matches!(err, GenerateError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_package_maps_keywords() {
        let text = r#"
        {
          "titles": ["A", "B", "C"],
          "script": [
            {
              "segmentTitle": "Introduction",
              "talkingPoints": ["Hook the viewer"],
              "visualKeywords": ["coffee cup", "sunrise"]
            }
          ]
        }"#;

        let package = parse_package(text).unwrap();
        assert_eq!(package.titles, vec!["A", "B", "C"]);
        assert_eq!(package.script.len(), 1);

        let segment = &package.script[0];
        assert_eq!(segment.segment_title, "Introduction");
        assert_eq!(segment.talking_points, vec!["Hook the viewer"]);
        assert_eq!(
            segment.media_links,
            vec![
                MediaLink {
                    description: "Stock media: coffee cup".to_string(),
                    url: "https://www.pexels.com/search/coffee%20cup/".to_string(),
                },
                MediaLink {
                    description: "Stock media: sunrise".to_string(),
                    url: "https://www.pexels.com/search/sunrise/".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_package_rejects_wrong_shape() {
        let err = parse_package(r#"{"titles":["A"]}"#).unwrap_err();
        assert!(matches!(err, GenerateError::MalformedResponse(_)));
    }

    #[test]
    fn test_classify_invalid_key() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, body),
            GenerateError::InvalidCredential
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, ""),
            GenerateError::InvalidCredential
        ));
    }

    #[test]
    fn test_classify_overloaded() {
        let body = r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        match classify_failure(StatusCode::SERVICE_UNAVAILABLE, body) {
            GenerateError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "The model is overloaded.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
