use rocket::serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSnippet {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VideoStat {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub thumbnail_url: String,
    pub view_count: u64,
    pub like_count: Option<u64>,
}

impl VideoStat {
    /// Carries a snippet forward with zeroed statistics when the stats fetch
    /// for that one video failed.
    pub fn zeroed(snippet: VideoSnippet) -> Self {
        VideoStat {
            video_id: snippet.video_id,
            title: snippet.title,
            channel_id: snippet.channel_id,
            channel_title: snippet.channel_title,
            thumbnail_url: snippet.thumbnail_url,
            view_count: 0,
            like_count: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelStat {
    pub channel_id: String,
    pub total_views: u64,
    pub total_videos: u64,
}

impl ChannelStat {
    /// Lifetime views per upload. A channel reporting zero uploads counts as
    /// one so the division stays finite.
    pub fn average_views(&self) -> f64 {
        self.total_views as f64 / self.total_videos.max(1) as f64
    }
}

/// Score fields are rounded to two decimals when this record is built;
/// ordering happens on the raw values beforehand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedVideo {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub thumbnail_url: String,
    pub view_count: u64,
    pub like_count: Option<u64>,
    pub average_channel_views: f64,
    pub outlier_score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRankedResponse {
    pub query: String,
    pub total: usize,
    pub results: Vec<RankedVideo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Empty when omitted; blank prompts are rejected as invalid input.
    #[serde(default)]
    pub prompt: String,
    pub num_images: Option<u8>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub model: Option<String>,
    /// Base64-encoded source image for image-to-image generation.
    pub input_image: Option<String>,
    /// Remote image to fetch and encode server-side, e.g. a ranked video's
    /// thumbnail. Ignored when `input_image` is set.
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub b64_json: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub model: String,
    pub images: Vec<GeneratedImage>,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
