use url::Url;

/// Pull a video id out of a pasted URL. Recognizes the two shapes users
/// actually paste: `youtube.com/watch?v=ID` and `youtu.be/ID`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let parsed_url = Url::parse(input).ok()?;
    let host = parsed_url.host_str()?;

    match host {
        "www.youtube.com" | "youtube.com" | "m.youtube.com" => {
            if parsed_url.path() == "/watch" {
                parsed_url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.to_string())
            } else {
                None
            }
        }
        "youtu.be" => parsed_url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string()),
        _ => None,
    }
}

/// Round to two decimals for presentation. Ranking happens on the raw value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            extract_video_id("https://youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn extracts_id_from_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn rejects_other_urls() {
        assert_eq!(extract_video_id("https://example.com/x"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/embed/abc123"), None);
        assert_eq!(extract_video_id("https://youtu.be/"), None);
        assert_eq!(extract_video_id("not a url"), None);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(3.333_333), 3.33);
        assert_eq!(round2(3.336), 3.34);
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(0.0), 0.0);
    }
}
