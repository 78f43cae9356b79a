use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;

use crate::error::LookupError;
use crate::models::{ChannelStat, VideoSnippet, VideoStat};
use crate::services::ranking_service::VideoDataSource;

/// Client for the YouTube Data API v3. Key, base URL and timeout are fixed
/// at construction; tests point `base_url` at a mock server.
///
/// Documentation: https://developers.google.com/youtube/v3/docs
pub struct YoutubeDataApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YoutubeDataApi {
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        YoutubeDataApi {
            client,
            api_key,
            base_url,
        }
    }

    async fn get_json(&self, url: &str, what: &str) -> Result<Value, LookupError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            // Request URLs carry the API key, so log errors without them.
            error!("{} request failed: {}", what, e.without_url());
            LookupError::SourceUnavailable(format!("{} request failed", what))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("{} request returned {}", what, status);
            return Err(LookupError::SourceUnavailable(format!(
                "{} request returned {}",
                what, status
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            error!("{} response was not valid JSON: {}", what, e.without_url());
            LookupError::SourceUnavailable(format!("{} response was not valid JSON", what))
        })
    }
}

#[async_trait]
impl VideoDataSource for YoutubeDataApi {
    async fn search(
        &self,
        keyword: &str,
        max_results: u8,
    ) -> Result<Vec<VideoSnippet>, LookupError> {
        let url = format!(
            "{}/search?part=snippet&type=video&q={}&maxResults={}&key={}",
            self.base_url,
            urlencoding::encode(keyword),
            max_results,
            self.api_key
        );
        let json = self.get_json(&url, "YouTube search").await?;

        let mut snippets = Vec::new();
        if let Some(items) = json["items"].as_array() {
            for item in items {
                let video_id = item["id"]["videoId"].as_str().unwrap_or("");
                if video_id.is_empty() {
                    continue;
                }
                let snippet = &item["snippet"];
                snippets.push(VideoSnippet {
                    video_id: video_id.to_string(),
                    title: snippet["title"].as_str().unwrap_or("").to_string(),
                    channel_id: snippet["channelId"].as_str().unwrap_or("").to_string(),
                    channel_title: snippet["channelTitle"].as_str().unwrap_or("").to_string(),
                    thumbnail_url: best_thumbnail(snippet),
                });
            }
        }

        debug!(
            "YouTube search for '{}' returned {} videos",
            keyword,
            snippets.len()
        );
        Ok(snippets)
    }

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoStat>, LookupError> {
        let url = format!(
            "{}/videos?part=snippet,statistics&id={}&key={}",
            self.base_url,
            urlencoding::encode(video_id),
            self.api_key
        );
        let json = self.get_json(&url, "YouTube videos").await?;

        let item = match json["items"].as_array().and_then(|items| items.first()) {
            Some(item) => item,
            None => return Ok(None),
        };

        let snippet = &item["snippet"];
        let statistics = &item["statistics"];
        Ok(Some(VideoStat {
            video_id: item["id"].as_str().unwrap_or(video_id).to_string(),
            title: snippet["title"].as_str().unwrap_or("").to_string(),
            channel_id: snippet["channelId"].as_str().unwrap_or("").to_string(),
            channel_title: snippet["channelTitle"].as_str().unwrap_or("").to_string(),
            thumbnail_url: best_thumbnail(snippet),
            view_count: parse_count(&statistics["viewCount"]),
            like_count: statistics["likeCount"]
                .as_str()
                .and_then(|raw| raw.parse().ok()),
        }))
    }

    async fn channel_statistics(
        &self,
        channel_id: &str,
    ) -> Result<Option<ChannelStat>, LookupError> {
        let url = format!(
            "{}/channels?part=statistics&id={}&key={}",
            self.base_url,
            urlencoding::encode(channel_id),
            self.api_key
        );
        let json = self.get_json(&url, "YouTube channels").await?;

        let item = match json["items"].as_array().and_then(|items| items.first()) {
            Some(item) => item,
            None => return Ok(None),
        };

        let statistics = &item["statistics"];
        Ok(Some(ChannelStat {
            channel_id: channel_id.to_string(),
            total_views: parse_count(&statistics["viewCount"]),
            total_videos: parse_count(&statistics["videoCount"]),
        }))
    }
}

/// The Data API serializes counts as JSON strings.
fn parse_count(value: &Value) -> u64 {
    value.as_str().unwrap_or("0").parse().unwrap_or(0)
}

fn best_thumbnail(snippet: &Value) -> String {
    let thumbnails = &snippet["thumbnails"];
    for quality in ["high", "medium", "default"] {
        if let Some(url) = thumbnails[quality]["url"].as_str() {
            return url.to_string();
        }
    }
    String::new()
}
