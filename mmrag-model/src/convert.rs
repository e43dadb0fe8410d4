//! Wire types for OpenAI-compatible chat completions and image payloads.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::{Deserialize, Serialize};

/// Mime type used when the image header is not recognized.
pub const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

/// Chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: MessageContent::Text(text.into()) }
    }

    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self { role: "user".to_string(), content: MessageContent::Parts(parts) }
    }
}

/// Plain string content or a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A typed content part of a user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Image part for a base64 payload, data URI or remote URL.
    pub fn image(image: &str) -> Self {
        ContentPart::ImageUrl { image_url: ImageUrl { url: image_url(image) } }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Chat completion response. Only the fields the judge reads are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if it has any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// URL to send for an image value.
///
/// Data URIs and http(s) URLs pass through; anything else is treated as raw
/// base64 and wrapped in a data URI with a sniffed mime type.
pub fn image_url(image: &str) -> String {
    let image = image.trim();
    if image.starts_with("data:") || image.starts_with("http") {
        return image.to_string();
    }
    format!("data:{};base64,{}", sniff_image_mime(image), image)
}

/// Guess the mime type of a base64 encoded image from its magic bytes.
pub fn sniff_image_mime(encoded: &str) -> &'static str {
    // 16 base64 characters decode to 12 bytes, enough for every signature below
    let prefix: String = encoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .take(16)
        .collect();
    let usable = prefix.len() - prefix.len() % 4;
    let Ok(header) = BASE64_STANDARD.decode(&prefix[..usable]) else {
        return FALLBACK_IMAGE_MIME;
    };

    match header.as_slice() {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        _ => FALLBACK_IMAGE_MIME,
    }
}

/// Remove a surrounding markdown code fence, e.g. "```json ... ```".
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        // Single line: drop a language tag such as `json` in "```json {...}```"
        None => {
            let after_tag = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            if after_tag.starts_with(char::is_whitespace) { after_tag } else { rest }
        }
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8]) -> String {
        BASE64_STANDARD.encode(bytes)
    }

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff_image_mime(&encode(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR")), "image/png");
        assert_eq!(sniff_image_mime(&encode(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10])), "image/jpeg");
        assert_eq!(sniff_image_mime(&encode(b"GIF89a\x01\0\x01\0")), "image/gif");
        assert_eq!(sniff_image_mime(&encode(b"RIFF\x24\0\0\0WEBPVP8 ")), "image/webp");
    }

    #[test]
    fn test_sniff_falls_back() {
        assert_eq!(sniff_image_mime("not base64 at all!"), FALLBACK_IMAGE_MIME);
        assert_eq!(sniff_image_mime(&encode(b"plain text payload")), FALLBACK_IMAGE_MIME);
        assert_eq!(sniff_image_mime(""), FALLBACK_IMAGE_MIME);
    }

    #[test]
    fn test_image_url() {
        let png = encode(b"\x89PNG\r\n\x1a\n");
        assert_eq!(image_url(&png), format!("data:image/png;base64,{png}"));
        assert_eq!(image_url("data:image/gif;base64,R0lG"), "data:image/gif;base64,R0lG");
        assert_eq!(image_url("https://example.com/a.png"), "https://example.com/a.png");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"grade\": 3}\n```"), "{\"grade\": 3}");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fence("  {\"grade\": 1} "), "{\"grade\": 1}");
        assert_eq!(strip_code_fence("```json {\"grade\": 4}```"), "{\"grade\": 4}");
        assert_eq!(strip_code_fence("```{\"grade\": 2}```"), "{\"grade\": 2}");
        assert_eq!(strip_code_fence("```5```"), "5");
    }

    #[test]
    fn test_user_message_shape() {
        let message = Message::user(vec![ContentPart::text("hi"), ContentPart::image("aGk=")]);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert!(json["content"][1]["image_url"]["url"].as_str().unwrap().starts_with("data:"));

        let json = serde_json::to_value(Message::system("grade")).unwrap();
        assert_eq!(json["content"], "grade");
    }

    #[test]
    fn test_first_text_skips_blank() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "  "}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), None);

        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "ok"}}]}"#).unwrap();
        assert_eq!(response.first_text(), Some("ok"));
    }
}
