//! # Content Generator
//!
//! Turns a topic and a [`ContentType`] into a [`ContentPackage`]: three title
//! suggestions plus an ordered script whose segments carry talking points and
//! stock-media search links.
//!
//! | Implementation | When |
//! |----------------|------|
//! | [`GeminiGenerator`] | a credential is configured or passed with the request |
//! | [`mock::mock_package`] | no credential anywhere (returned by [`GeminiGenerator`]) |

pub mod gemini;
pub mod mock;

pub use gemini::GeminiGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base URL for stock-media keyword searches
pub const MEDIA_SEARCH_URL: &str = "https://www.pexels.com/search/";

/// The formats a package can be written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    YouTube,
    TikTok,
    Podcast,
    Blog,
    Instagram,
}

impl ContentType {
    /// All content types in display order
    pub const ALL: [ContentType; 5] = [
        ContentType::YouTube,
        ContentType::TikTok,
        ContentType::Podcast,
        ContentType::Blog,
        ContentType::Instagram,
    ];

    /// Human-readable label, also sent verbatim to the model
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::YouTube => "YouTube Explainer Video (5-7 min)",
            ContentType::TikTok => "TikTok/Reels Short (30-60 sec)",
            ContentType::Podcast => "Podcast Episode (15-20 min)",
            ContentType::Blog => "Blog Post / Article Outline (Approx. 1000 words)",
            ContentType::Instagram => "Instagram Story Series (3-5 frames)",
        }
    }

    /// Short name accepted on the command line
    pub fn key(&self) -> &'static str {
        match self {
            ContentType::YouTube => "youtube",
            ContentType::TikTok => "tiktok",
            ContentType::Podcast => "podcast",
            ContentType::Blog => "blog",
            ContentType::Instagram => "instagram",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ContentType::ALL
            .iter()
            .copied()
            .find(|ct| ct.key().eq_ignore_ascii_case(needle) || ct.label() == needle)
            .ok_or_else(|| {
                let keys: Vec<&str> = ContentType::ALL.iter().map(ContentType::key).collect();
                format!(
                    "Unknown content type '{}' (expected one of: {})",
                    needle,
                    keys.join(", ")
                )
            })
    }
}

/// A stock-media search link for one keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLink {
    pub description: String,
    pub url: String,
}

impl MediaLink {
    /// Build the search link for a visual keyword
    pub fn for_keyword(keyword: &str) -> Self {
        Self {
            description: format!("Stock media: {}", keyword),
            url: format!("{}{}/", MEDIA_SEARCH_URL, urlencoding::encode(keyword)),
        }
    }
}

/// One section of the script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSegment {
    pub segment_title: String,
    pub talking_points: Vec<String>,
    pub media_links: Vec<MediaLink>,
}

/// Everything generated for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPackage {
    pub titles: Vec<String>,
    pub script: Vec<ScriptSegment>,
}

/// Input for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub topic: String,
    pub content_type: ContentType,
    /// Credential that overrides the configured one for this request
    pub api_key: Option<String>,
}

/// Why a generation failed
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("API key rejected by the model provider")]
    InvalidCredential,

    #[error("Request to the model provider failed: {0}")]
    Request(String),

    #[error("Model provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

impl GenerateError {
    /// The message shown to the user for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerateError::InvalidCredential => {
                "The provided API key is invalid. Please check it and try again."
            }
            _ => "Failed to generate content. The AI model may be overloaded. Please try again later.",
        }
    }
}

/// Something that can produce a [`ContentPackage`]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest)
        -> Result<ContentPackage, GenerateError>;
}
