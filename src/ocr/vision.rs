//! Google Cloud Vision provider
//!
//! Calls the `images:annotate` REST endpoint with `TEXT_DETECTION`. The
//! first annotation carries the full page text, the rest are word boxes.

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::TextExtractionProvider;
use super::types::{ImageVariant, PositionedToken, ProviderError, ProviderKind, RecognizedText};

/// Cloud vision text detection provider
pub struct VisionProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    /// BCP-47 hints sent with each request
    language_hints: Vec<String>,
}

impl VisionProvider {
    pub fn new(endpoint: &str, api_key: &str, language_hints: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            language_hints,
        }
    }

    /// Map tesseract-style codes ("spa+eng") to the hints Vision expects (["es", "en"])
    pub fn hint_for(language: &str) -> Vec<String> {
        let mut hints: Vec<String> = Vec::new();
        for code in language.split('+').map(str::trim).filter(|c| !c.is_empty()) {
            let hint = match code {
                "spa" => "es".to_string(),
                "eng" => "en".to_string(),
                "por" => "pt".to_string(),
                other => other.chars().take(2).collect(),
            };
            if !hints.contains(&hint) {
                hints.push(hint);
            }
        }
        hints
    }

    fn annotate_request(&self, content: String) -> serde_json::Value {
        serde_json::json!({
            "requests": [{
                "image": { "content": content },
                "features": [{ "type": "TEXT_DETECTION" }],
                "imageContext": { "languageHints": self.language_hints }
            }]
        })
    }
}

#[async_trait]
impl TextExtractionProvider for VisionProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Vision
    }

    fn variant(&self) -> ImageVariant {
        ImageVariant::Natural
    }

    async fn extract(&self, image_data: &[u8]) -> Result<RecognizedText, ProviderError> {
        use base64::Engine;

        let content = base64::engine::general_purpose::STANDARD.encode(image_data);

        let request = self.annotate_request(content);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to call Vision: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => ProviderError::Auth(format!("Vision returned {}: {}", status, body)),
                429 => ProviderError::Quota(format!("Vision returned {}: {}", status, body)),
                _ => ProviderError::Api(format!("Vision returned {}: {}", status, body)),
            });
        }

        let payload: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("Failed to parse response: {}", e)))?;

        parse_annotate_response(payload)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Default, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

/// Vision omits zero coordinates
#[derive(Debug, Default, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

pub(crate) fn parse_annotate_response(
    payload: AnnotateResponse,
) -> Result<RecognizedText, ProviderError> {
    let Some(image) = payload.responses.into_iter().next() else {
        return Ok(RecognizedText::default());
    };

    if let Some(status) = image.error {
        if !status.message.is_empty() {
            return Err(ProviderError::Api(status.message));
        }
    }

    let mut annotations = image.text_annotations.into_iter();
    let full_text = annotations
        .next()
        .map(|first| first.description)
        .unwrap_or_default();

    let tokens = annotations
        .map(|annotation| {
            let vertices = annotation
                .bounding_poly
                .map(|poly| poly.vertices)
                .unwrap_or_default();
            let (left, right) = span(vertices.iter().map(|v| v.x));
            let (top, bottom) = span(vertices.iter().map(|v| v.y));
            PositionedToken::new(annotation.description, left, top, right - left, bottom - top)
        })
        .collect();

    Ok(RecognizedText { full_text, tokens })
}

/// (min, max) of a coordinate list, (0, 0) when empty
fn span(values: impl Iterator<Item = i32>) -> (i32, i32) {
    values.fold(None, |acc: Option<(i32, i32)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
    .unwrap_or((0, 0))
}
