//! Embedded players for the `video` tag.

use linked_hash_map::LinkedHashMap;
use url::Url;
use urlencoding::encode;

use crate::writer::{HtmlSink, WriterError};

/// The parts of a video url needed to build an embed.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoParameters {
    /// Lower-cased host without a leading `www.` or `m.`.
    pub host: String,
    pub path: String,
    /// First value of each query parameter, in url order.
    pub query: LinkedHashMap<String, String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl VideoParameters {
    /// `None` unless `href` is an absolute url with a host.
    pub fn from_url(href: &str) -> Option<Self> {
        let url = Url::parse(href.trim()).ok()?;
        let host = url.host_str()?.to_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(&host)
            .to_string();

        let mut query = LinkedHashMap::new();
        for (key, value) in url.query_pairs() {
            if !query.contains_key(&*key) {
                query.insert(key.into_owned(), value.into_owned());
            }
        }

        Some(VideoParameters {
            host,
            path: url.path().to_string(),
            query,
            width: None,
            height: None,
        })
    }

    fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Player url for the supported providers.
    pub fn embed_src(&self) -> Option<String> {
        let segments = self.segments();
        match self.host.as_str() {
            "youtube.com" | "youtube-nocookie.com" => {
                let id = match segments.as_slice() {
                    ["watch"] => self.query.get("v").map(|s| s.as_str()),
                    ["embed", id] | ["shorts", id] | ["live", id] => Some(*id),
                    ["playlist"] => {
                        return self.query.get("list").map(|list| {
                            format!(
                                "https://www.youtube.com/embed/videoseries?list={}",
                                encode(list)
                            )
                        })
                    }
                    _ => None,
                }?;
                Some(self.youtube_src(id))
            }
            "youtu.be" => match segments.as_slice() {
                [id] => Some(self.youtube_src(id)),
                _ => None,
            },
            "vimeo.com" => match segments.as_slice() {
                [id, ..] if id.chars().all(|c| c.is_ascii_digit()) => {
                    Some(format!("https://player.vimeo.com/video/{id}"))
                }
                _ => None,
            },
            "dailymotion.com" => match segments.as_slice() {
                ["video", id] => Some(dailymotion_src(id)),
                _ => None,
            },
            "dai.ly" => match segments.as_slice() {
                [id] => Some(dailymotion_src(id)),
                _ => None,
            },
            "nicovideo.jp" | "sp.nicovideo.jp" => match segments.as_slice() {
                ["watch", id] => Some(niconico_src(id)),
                _ => None,
            },
            "nico.ms" => match segments.as_slice() {
                [id] => Some(niconico_src(id)),
                _ => None,
            },
            "archive.org" => match segments.as_slice() {
                ["details", id, ..] => Some(format!("https://archive.org/embed/{}", encode(id))),
                _ => None,
            },
            _ => None,
        }
    }

    fn youtube_src(&self, id: &str) -> String {
        let mut src = format!("https://www.youtube.com/embed/{}", encode(id));
        let mut params = vec![];
        if let Some(list) = self.query.get("list") {
            params.push(format!("list={}", encode(list)));
        }
        if let Some(start) = self
            .query
            .get("t")
            .or_else(|| self.query.get("start"))
            .and_then(|t| parse_start(t))
        {
            params.push(format!("start={start}"));
        }
        if !params.is_empty() {
            src.push('?');
            src.push_str(&params.join("&"));
        }
        src
    }
}

fn dailymotion_src(id: &str) -> String {
    // slugs look like `x7tgad0_some-title`
    let id = id.split('_').next().unwrap_or(id);
    format!("https://www.dailymotion.com/embed/video/{}", encode(id))
}

fn niconico_src(id: &str) -> String {
    format!("https://embed.nicovideo.jp/watch/{}", encode(id))
}

/// Start offsets are either plain seconds or `1h2m3s` style.
fn parse_start(value: &str) -> Option<u64> {
    let value = value.trim().trim_end_matches('s');
    if let Ok(seconds) = value.parse() {
        return Some(seconds);
    }

    let mut total = 0u64;
    let mut number = String::new();
    for c in value.chars().chain(std::iter::once('s')) {
        match c {
            '0'..='9' => number.push(c),
            'h' | 'm' | 's' => {
                let n: u64 = number.parse().ok()?;
                let unit = match c {
                    'h' => 3600,
                    'm' => 60,
                    _ => 1,
                };
                total = total.checked_add(n.checked_mul(unit)?)?;
                number.clear();
            }
            _ => return None,
        }
    }
    Some(total)
}

/// Writes the player for a supported provider. Returns false and writes nothing otherwise.
pub fn write_embed(sink: &mut dyn HtmlSink, params: &VideoParameters) -> Result<bool, WriterError> {
    let Some(src) = params.embed_src() else {
        return Ok(false);
    };

    sink.open_tag("div")?;
    sink.attribute("class", "video-container")?;
    sink.open_tag("iframe")?;
    sink.attribute("src", &src)?;
    if let (Some(width), Some(height)) = (params.width, params.height) {
        sink.attribute("width", &width.to_string())?;
        sink.attribute("height", &height.to_string())?;
    }
    sink.attribute("allowfullscreen", "")?;
    sink.close_tag("iframe")?;
    sink.close_tag("div")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::HtmlWriter;

    macro_rules! embed_tests {
        ($($name:ident: $value:expr,)*) => {
        $(
            paste::item!{
            #[test]
            fn [<embed_ $name>]() {
                let (input, expected): (&str, Option<&str>) = $value;
                let params = VideoParameters::from_url(input).expect("absolute url");
                assert_eq!(expected.map(String::from), params.embed_src());
            }
            }
        )*
        }
    }

    embed_tests! {
        youtube_watch: ("https://www.youtube.com/watch?v=abc123&v=ignored", Some("https://www.youtube.com/embed/abc123")),
        youtube_short_link: ("https://youtu.be/abc123?t=1m5s", Some("https://www.youtube.com/embed/abc123?start=65")),
        youtube_start_overflow: ("https://youtu.be/abc?t=9999999999999999999h", Some("https://www.youtube.com/embed/abc")),
        youtube_start_seconds: ("http://m.youtube.com/watch?v=x&t=42", Some("https://www.youtube.com/embed/x?start=42")),
        youtube_playlist: ("https://www.youtube.com/playlist?list=PL1", Some("https://www.youtube.com/embed/videoseries?list=PL1")),
        youtube_video_in_playlist: ("https://www.youtube.com/watch?v=a&list=PL1", Some("https://www.youtube.com/embed/a?list=PL1")),
        youtube_channel: ("https://www.youtube.com/user/someone", None),
        vimeo: ("https://vimeo.com/123456", Some("https://player.vimeo.com/video/123456")),
        vimeo_not_numeric: ("https://vimeo.com/channels", None),
        dailymotion: ("https://www.dailymotion.com/video/x7tgad0_a-title", Some("https://www.dailymotion.com/embed/video/x7tgad0")),
        dailymotion_short: ("https://dai.ly/x7tgad0", Some("https://www.dailymotion.com/embed/video/x7tgad0")),
        niconico: ("https://www.nicovideo.jp/watch/sm9", Some("https://embed.nicovideo.jp/watch/sm9")),
        niconico_short: ("https://nico.ms/sm9", Some("https://embed.nicovideo.jp/watch/sm9")),
        archive: ("https://archive.org/details/some-run", Some("https://archive.org/embed/some-run")),
        unknown_host: ("https://example.com/video.mp4", None),
    }

    #[test]
    fn relative_urls_are_rejected() {
        assert_eq!(None, VideoParameters::from_url("/watch?v=abc"));
        assert_eq!(None, VideoParameters::from_url("not a url"));
    }

    #[test]
    fn writes_player() -> Result<(), WriterError> {
        let mut params = VideoParameters::from_url("https://vimeo.com/1").unwrap();
        params.width = Some(640);
        params.height = Some(480);

        let mut w = HtmlWriter::new();
        assert!(write_embed(&mut w, &params)?);
        assert_eq!(
            "<div class=\"video-container\"><iframe src=\"https://player.vimeo.com/video/1\" width=\"640\" height=\"480\" allowfullscreen=\"\"></iframe></div>",
            w.finish()?
        );
        Ok(())
    }

    #[test]
    fn start_offsets() {
        assert_eq!(Some(90), parse_start("90"));
        assert_eq!(Some(90), parse_start("90s"));
        assert_eq!(Some(3725), parse_start("1h2m5s"));
        assert_eq!(None, parse_start("soon"));
        assert_eq!(None, parse_start("9999999999999999999h"));
        assert_eq!(None, parse_start("18446744073709551615s1s"));
    }
}
