use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::analyzer::{ClassificationError, SentimentAnalyzer};
use super::types::{Emotion, MoodSentiment};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_LABEL: &str = "Neutral";
const DEFAULT_GENRE: &str = "Pop";

/// Sentiment analyzer backed by the Gemini generateContent API.
///
/// The model is asked for a bare JSON object; since it sometimes wraps the
/// reply in markdown fences or prose, we extract the first balanced JSON
/// object from the text before deserializing.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// The model's JSON reply, with every field optional so a partial reply
/// still classifies with defaults instead of failing.
#[derive(Deserialize)]
struct RawReply {
    sentiment: Option<i64>,
    mood: Option<String>,
    emotion: Option<String>,
    genre: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: String, model: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model,
            api_key,
        }
    }

    fn build_prompt(text: &str) -> String {
        format!(
            "Analyze the sentiment of this mood description: \"{}\"\n\n\
             Respond with ONLY a JSON object in this exact format, no other text:\n\
             {{\n\
               \"sentiment\": <number from 0 to 100, where 0 is most negative and 100 is most positive>,\n\
               \"mood\": \"<a short human-readable mood description with an emoji>\",\n\
               \"emotion\": \"<exactly one of: Happy, Sad, Energetic, Chill, Angry, Romantic>\",\n\
               \"genre\": \"<a music genre that fits this mood, e.g. Pop, Rock, Jazz, Lo-fi>\"\n\
             }}",
            text
        )
    }

    fn parse_reply(reply_text: &str) -> Result<MoodSentiment, ClassificationError> {
        let json_text = extract_json_object(reply_text).ok_or_else(|| {
            ClassificationError::Decode(format!("no JSON object in reply: {}", reply_text))
        })?;
        let raw: RawReply = serde_json::from_str(json_text)
            .map_err(|e| ClassificationError::Decode(e.to_string()))?;

        Ok(MoodSentiment {
            score: raw.sentiment.unwrap_or(50).clamp(0, 100),
            label: raw.mood.unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            emotion: raw
                .emotion
                .as_deref()
                .and_then(Emotion::parse)
                .unwrap_or(Emotion::Happy),
            genre: raw.genre.unwrap_or_else(|| DEFAULT_GENRE.to_string()),
        })
    }
}

#[async_trait]
impl SentimentAnalyzer for GeminiClient {
    async fn classify(&self, text: &str) -> Result<MoodSentiment, ClassificationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{
                "parts": [{ "text": Self::build_prompt(text) }]
            }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassificationError::Timeout
                } else {
                    ClassificationError::Provider(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!("Gemini returned {}: {}", status, body_text);
            return Err(match status.as_u16() {
                401 | 403 => ClassificationError::Auth,
                429 => ClassificationError::RateLimited,
                _ => ClassificationError::Provider(format!("status {}", status)),
            });
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::Decode(e.to_string()))?;

        let reply_text = reply
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| if p.is_empty() { None } else { Some(p.remove(0)) })
            .and_then(|p| p.text)
            .ok_or_else(|| ClassificationError::Decode("reply has no text part".to_string()))?;

        Self::parse_reply(&reply_text)
    }
}

/// Returns the first balanced `{...}` object in `text`, ignoring braces
/// inside JSON strings.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
