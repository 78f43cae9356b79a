use base64::{engine::general_purpose, Engine};
use log::{error, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::LookupError;
use crate::models::{GeneratedImage, GenerationRequest, GenerationResponse};

pub const MAX_IMAGES_PER_REQUEST: u8 = 5;
const GENERATION_STEPS: u32 = 28;
const DEFAULT_IMAGE_SIZE: u32 = 1024;

/// Client for the Together AI image generation endpoint. The service only
/// forwards prompts and hands the base64 payloads back; the model itself is
/// somebody else's problem.
pub struct ImageGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl ImageGenerator {
    pub fn new(client: Client, api_key: String, base_url: String, default_model: String) -> Self {
        ImageGenerator {
            client,
            api_key,
            base_url,
            default_model,
        }
    }

    /// Generate `num_images` images for a prompt. A `source_url` (e.g. the
    /// thumbnail of a ranked video) is fetched and base64-encoded first so
    /// the endpoint can run image-to-image.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, LookupError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(LookupError::InvalidInput(
                "Prompt must not be empty".to_string(),
            ));
        }

        let num_images = request.num_images.unwrap_or(1);
        if num_images < 1 || num_images > MAX_IMAGES_PER_REQUEST {
            return Err(LookupError::InvalidInput(format!(
                "num_images must be between 1 and {}",
                MAX_IMAGES_PER_REQUEST
            )));
        }

        let input_image = match (&request.input_image, &request.source_url) {
            (Some(b64), _) => Some(b64.clone()),
            (None, Some(url)) => Some(self.fetch_image_as_base64(url).await?),
            (None, None) => None,
        };

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());
        let mut body = json!({
            "model": model,
            "prompt": prompt,
            "width": request.width.unwrap_or(DEFAULT_IMAGE_SIZE),
            "height": request.height.unwrap_or(DEFAULT_IMAGE_SIZE),
            "steps": GENERATION_STEPS,
            "n": num_images,
            "response_format": "b64_json",
        });
        if let Some(image) = input_image {
            body["input_image"] = Value::String(image);
        }

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Image generation request failed: {}", e.without_url());
                LookupError::SourceUnavailable("image generation request failed".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Image generation returned {}", status);
            return Err(LookupError::SourceUnavailable(format!(
                "image generation returned {}",
                status
            )));
        }

        let json: Value = response.json().await.map_err(|e| {
            error!(
                "Image generation response was not valid JSON: {}",
                e.without_url()
            );
            LookupError::SourceUnavailable(
                "image generation response was not valid JSON".to_string(),
            )
        })?;

        let images: Vec<GeneratedImage> = json["data"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["b64_json"].as_str())
                    .map(|b64| GeneratedImage {
                        b64_json: b64.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if images.is_empty() {
            return Err(LookupError::SourceUnavailable(
                "image generation returned no images".to_string(),
            ));
        }

        info!("Generated {} image(s) with {}", images.len(), model);
        Ok(GenerationResponse { model, images })
    }

    async fn fetch_image_as_base64(&self, url: &str) -> Result<String, LookupError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Source image fetch failed for {}: {}", url, e.without_url());
            LookupError::SourceUnavailable("source image fetch failed".to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Source image fetch for {} returned {}", url, status);
            return Err(LookupError::SourceUnavailable(format!(
                "source image fetch returned {}",
                status
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            error!("Source image read failed for {}: {}", url, e.without_url());
            LookupError::SourceUnavailable("source image read failed".to_string())
        })?;

        Ok(general_purpose::STANDARD.encode(&bytes))
    }
}
