use async_trait::async_trait;
use log::{info, warn};
use std::cmp::Ordering;

use crate::error::LookupError;
use crate::models::{ChannelStat, RankedVideo, VideoSnippet, VideoStat};
use crate::utils::{extract_video_id, round2};

pub const MAX_RESULTS_LIMIT: u8 = 15;
pub const DEFAULT_MAX_RESULTS: u8 = 5;

/// The slice of the video platform the ranking flow needs. Production uses
/// the YouTube Data API client; tests substitute a stub source.
#[async_trait]
pub trait VideoDataSource: Send + Sync {
    /// Keyword search returning up to `max_results` snippets, statistics not
    /// included.
    async fn search(
        &self,
        keyword: &str,
        max_results: u8,
    ) -> Result<Vec<VideoSnippet>, LookupError>;

    /// Full record for one video, statistics included. `None` when the id
    /// does not resolve.
    async fn video_details(&self, video_id: &str) -> Result<Option<VideoStat>, LookupError>;

    /// Lifetime aggregates for one channel. `None` when the channel does not
    /// resolve.
    async fn channel_statistics(
        &self,
        channel_id: &str,
    ) -> Result<Option<ChannelStat>, LookupError>;
}

struct ScoredVideo {
    stat: VideoStat,
    average_channel_views: f64,
    raw_score: f64,
}

impl ScoredVideo {
    fn into_ranked(self) -> RankedVideo {
        RankedVideo {
            video_id: self.stat.video_id,
            title: self.stat.title,
            channel_id: self.stat.channel_id,
            channel_title: self.stat.channel_title,
            thumbnail_url: self.stat.thumbnail_url,
            view_count: self.stat.view_count,
            like_count: self.stat.like_count,
            average_channel_views: round2(self.average_channel_views),
            outlier_score: round2(self.raw_score),
        }
    }
}

/// Views relative to the channel's average. A channel with no usable average
/// scores 0 rather than poisoning the ranking with NaN or infinity.
fn outlier_score(view_count: u64, average_channel_views: f64) -> f64 {
    if average_channel_views == 0.0 {
        return 0.0;
    }
    view_count as f64 / average_channel_views
}

/// Search the source for `keyword` and rank the hits by outlier score,
/// descending. Videos whose statistics cannot be fetched stay in the list
/// with a score of 0; only a failure of the search call itself aborts.
pub async fn search_ranked(
    source: &dyn VideoDataSource,
    keyword: &str,
    max_results: u8,
) -> Result<Vec<RankedVideo>, LookupError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(LookupError::InvalidInput(
            "Search keyword must not be empty".to_string(),
        ));
    }
    if max_results < 1 || max_results > MAX_RESULTS_LIMIT {
        return Err(LookupError::InvalidInput(format!(
            "max_results must be between 1 and {}",
            MAX_RESULTS_LIMIT
        )));
    }

    let snippets = source.search(keyword, max_results).await?;

    let mut scored = Vec::with_capacity(snippets.len());
    for snippet in snippets {
        let video_id = snippet.video_id.clone();
        let mut stat = match source.video_details(&video_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                warn!("No statistics for video {}, scoring it 0", video_id);
                VideoStat::zeroed(snippet)
            }
            Err(e) => {
                warn!("Statistics fetch failed for video {}: {}", video_id, e);
                VideoStat::zeroed(snippet)
            }
        };
        // Likes are only surfaced on the single-video lookup.
        stat.like_count = None;

        let average = fetch_average_views(source, &stat.channel_id).await;
        let raw_score = outlier_score(stat.view_count, average);
        scored.push(ScoredVideo {
            stat,
            average_channel_views: average,
            raw_score,
        });
    }

    // Stable sort keeps the source order for equal scores.
    scored.sort_by(|a, b| b.raw_score.partial_cmp(&a.raw_score).unwrap_or(Ordering::Equal));

    info!("Ranked {} videos for '{}'", scored.len(), keyword);
    Ok(scored.into_iter().map(ScoredVideo::into_ranked).collect())
}

/// Resolve `input` (a bare video id or a pasted URL) to one ranked video.
pub async fn lookup_video(
    source: &dyn VideoDataSource,
    input: &str,
) -> Result<RankedVideo, LookupError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LookupError::InvalidInput(
            "Video id or URL must not be empty".to_string(),
        ));
    }

    let video_id = resolve_video_id(input)?;
    let stat = source
        .video_details(&video_id)
        .await?
        .ok_or_else(|| LookupError::NotFound(format!("Video {}", video_id)))?;

    let average = fetch_average_views(source, &stat.channel_id).await;
    let raw_score = outlier_score(stat.view_count, average);

    Ok(ScoredVideo {
        stat,
        average_channel_views: average,
        raw_score,
    }
    .into_ranked())
}

/// A failed or empty channel lookup yields 0, which in turn scores the video
/// 0 further up.
async fn fetch_average_views(source: &dyn VideoDataSource, channel_id: &str) -> f64 {
    match source.channel_statistics(channel_id).await {
        Ok(Some(channel)) => channel.average_views(),
        Ok(None) => {
            warn!("No statistics for channel {}", channel_id);
            0.0
        }
        Err(e) => {
            warn!("Channel statistics fetch failed for {}: {}", channel_id, e);
            0.0
        }
    }
}

fn resolve_video_id(input: &str) -> Result<String, LookupError> {
    if input.starts_with("http://") || input.starts_with("https://") {
        return extract_video_id(input)
            .ok_or_else(|| LookupError::NotFound(format!("Video id in '{}'", input)));
    }
    Ok(input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct StubSource {
        snippets: Vec<VideoSnippet>,
        details: HashMap<String, VideoStat>,
        channels: HashMap<String, ChannelStat>,
        fail_search: bool,
        fail_details_for: Vec<String>,
    }

    #[async_trait]
    impl VideoDataSource for StubSource {
        async fn search(
            &self,
            _keyword: &str,
            max_results: u8,
        ) -> Result<Vec<VideoSnippet>, LookupError> {
            if self.fail_search {
                return Err(LookupError::SourceUnavailable("stub offline".to_string()));
            }
            Ok(self
                .snippets
                .iter()
                .take(max_results as usize)
                .cloned()
                .collect())
        }

        async fn video_details(&self, video_id: &str) -> Result<Option<VideoStat>, LookupError> {
            if self.fail_details_for.iter().any(|id| id == video_id) {
                return Err(LookupError::SourceUnavailable("stub offline".to_string()));
            }
            Ok(self.details.get(video_id).cloned())
        }

        async fn channel_statistics(
            &self,
            channel_id: &str,
        ) -> Result<Option<ChannelStat>, LookupError> {
            Ok(self.channels.get(channel_id).cloned())
        }
    }

    fn snippet(id: &str, channel: &str) -> VideoSnippet {
        VideoSnippet {
            video_id: id.to_string(),
            title: format!("Video {}", id),
            channel_id: channel.to_string(),
            channel_title: format!("Channel {}", channel),
            thumbnail_url: format!("https://img.example/{}.jpg", id),
        }
    }

    fn details(id: &str, channel: &str, views: u64) -> VideoStat {
        VideoStat {
            video_id: id.to_string(),
            title: format!("Video {}", id),
            channel_id: channel.to_string(),
            channel_title: format!("Channel {}", channel),
            thumbnail_url: format!("https://img.example/{}.jpg", id),
            view_count: views,
            like_count: Some(views / 10),
        }
    }

    fn channel(id: &str, total_views: u64, total_videos: u64) -> ChannelStat {
        ChannelStat {
            channel_id: id.to_string(),
            total_views,
            total_videos,
        }
    }

    fn one_video_source(views: u64, total_views: u64, total_videos: u64) -> StubSource {
        StubSource {
            snippets: vec![snippet("v1", "c1")],
            details: HashMap::from([("v1".to_string(), details("v1", "c1", views))]),
            channels: HashMap::from([("c1".to_string(), channel("c1", total_views, total_videos))]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn scores_views_against_channel_average() {
        let source = one_video_source(100_000, 1_000_000, 100);

        let ranked = search_ranked(&source, "anything", 5).await.unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].average_channel_views, 10_000.0);
        assert_eq!(ranked[0].outlier_score, 10.0);
    }

    #[tokio::test]
    async fn zero_upload_channel_divides_by_one() {
        let source = one_video_source(500, 2_000, 0);

        let ranked = search_ranked(&source, "anything", 5).await.unwrap();

        assert_eq!(ranked[0].average_channel_views, 2_000.0);
        assert_eq!(ranked[0].outlier_score, 0.25);
    }

    #[tokio::test]
    async fn missing_channel_scores_zero() {
        let mut source = one_video_source(100_000, 0, 0);
        source.channels.clear();

        let ranked = search_ranked(&source, "anything", 5).await.unwrap();

        assert_eq!(ranked[0].average_channel_views, 0.0);
        assert_eq!(ranked[0].outlier_score, 0.0);
        assert!(ranked[0].outlier_score.is_finite());
    }

    #[tokio::test]
    async fn equal_scores_keep_source_order() {
        let source = StubSource {
            snippets: vec![snippet("a", "c1"), snippet("b", "c2"), snippet("c", "c3")],
            details: HashMap::from([
                ("a".to_string(), details("a", "c1", 500)),
                ("b".to_string(), details("b", "c2", 5_000)),
                ("c".to_string(), details("c", "c3", 200)),
            ]),
            channels: HashMap::from([
                ("c1".to_string(), channel("c1", 100, 1)),
                ("c2".to_string(), channel("c2", 1_000, 1)),
                ("c3".to_string(), channel("c3", 100, 1)),
            ]),
            ..Default::default()
        };

        let ranked = search_ranked(&source, "anything", 5).await.unwrap();

        let order: Vec<&str> = ranked.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(ranked[0].outlier_score, 5.0);
        assert_eq!(ranked[1].outlier_score, 5.0);
        assert_eq!(ranked[2].outlier_score, 2.0);
    }

    #[tokio::test]
    async fn rejects_out_of_range_max_results() {
        let source = one_video_source(1, 1, 1);

        for bad in [0, 16] {
            let err = search_ranked(&source, "anything", bad).await.unwrap_err();
            assert!(matches!(err, LookupError::InvalidInput(_)), "{}", bad);
        }
        for good in [1, MAX_RESULTS_LIMIT] {
            assert!(search_ranked(&source, "anything", good).await.is_ok());
        }
    }

    #[tokio::test]
    async fn rejects_blank_keyword() {
        let source = StubSource::default();

        for keyword in ["", "   "] {
            let err = search_ranked(&source, keyword, 5).await.unwrap_err();
            assert!(matches!(err, LookupError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn empty_search_is_an_empty_list() {
        let source = StubSource::default();

        let ranked = search_ranked(&source, "no hits", 5).await.unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn search_failure_is_source_unavailable() {
        let source = StubSource {
            fail_search: true,
            ..Default::default()
        };

        let err = search_ranked(&source, "anything", 5).await.unwrap_err();
        assert!(matches!(err, LookupError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn per_video_failure_scores_zero_and_keeps_siblings() {
        let mut source = StubSource {
            snippets: vec![snippet("good", "c1"), snippet("bad", "c1")],
            details: HashMap::from([("good".to_string(), details("good", "c1", 1_000))]),
            channels: HashMap::from([("c1".to_string(), channel("c1", 1_000, 10))]),
            ..Default::default()
        };
        source.fail_details_for.push("bad".to_string());

        let ranked = search_ranked(&source, "anything", 5).await.unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].video_id, "good");
        assert_eq!(ranked[0].outlier_score, 10.0);
        assert_eq!(ranked[1].video_id, "bad");
        assert_eq!(ranked[1].outlier_score, 0.0);
        assert_eq!(ranked[1].view_count, 0);
    }

    #[tokio::test]
    async fn batch_results_omit_like_count() {
        let source = one_video_source(100, 1_000, 10);

        let ranked = search_ranked(&source, "anything", 5).await.unwrap();
        assert_eq!(ranked[0].like_count, None);
    }

    #[tokio::test]
    async fn scores_are_rounded_to_two_decimals() {
        let source = one_video_source(1_000, 3_000, 10);

        let ranked = search_ranked(&source, "anything", 5).await.unwrap();

        assert_eq!(ranked[0].average_channel_views, 300.0);
        assert_eq!(ranked[0].outlier_score, 3.33);
    }

    #[tokio::test]
    async fn lookup_accepts_bare_id() {
        let source = one_video_source(100_000, 1_000_000, 100);

        let ranked = lookup_video(&source, "v1").await.unwrap();
        assert_eq!(ranked.video_id, "v1");
        assert_eq!(ranked.outlier_score, 10.0);
        assert_eq!(ranked.like_count, Some(10_000));
    }

    #[tokio::test]
    async fn lookup_accepts_both_url_shapes() {
        let source = one_video_source(100_000, 1_000_000, 100);

        for url in [
            "https://www.youtube.com/watch?v=v1",
            "https://youtu.be/v1",
        ] {
            let ranked = lookup_video(&source, url).await.unwrap();
            assert_eq!(ranked.video_id, "v1", "{}", url);
        }
    }

    #[tokio::test]
    async fn lookup_rejects_unrecognized_url() {
        let source = one_video_source(1, 1, 1);

        let err = lookup_video(&source, "https://example.com/x").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound(_)));
    }

    #[tokio::test]
    async fn lookup_rejects_empty_input() {
        let source = StubSource::default();

        let err = lookup_video(&source, "  ").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn lookup_unknown_id_is_not_found() {
        let source = StubSource::default();

        let err = lookup_video(&source, "missing").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound(_)));
    }

    #[tokio::test]
    async fn lookup_propagates_source_failure() {
        let source = StubSource {
            fail_details_for: vec!["v1".to_string()],
            ..Default::default()
        };

        let err = lookup_video(&source, "v1").await.unwrap_err();
        assert!(matches!(err, LookupError::SourceUnavailable(_)));
    }
}
