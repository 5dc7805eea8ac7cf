use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value as JsonValue};
use sluice_core::types::RssSource;
use sluice_core::TextNormalizer;

use super::{require, FetchFailure, FetchedPayload, Fetcher};

static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").expect("valid"));
static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*<!\[CDATA\[(.*?)\]\]>\s*$").expect("valid"));

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| tag_re("title"));
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| tag_re("description"));
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| tag_re("link"));
static PUB_DATE_RE: LazyLock<Regex> = LazyLock::new(|| tag_re("pubDate"));

fn tag_re(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}\b[^>]*>(.*?)</{tag}>")).expect("valid")
}

pub(super) async fn fetch(
    fetcher: &Fetcher,
    source: &RssSource,
) -> Result<FetchedPayload, FetchFailure> {
    let url = require(source.url.as_deref(), "url")?;
    let xml = fetcher.get_text(url).await?;

    let normalizer = source.normalize_text.then(TextNormalizer::default);
    let items = parse_rss_items(&xml, normalizer.as_ref());
    tracing::debug!(items = items.len(), "rss feed parsed");
    Ok(FetchedPayload::Json(json!({ "items": items })))
}

/// Lenient scan of `<item>` blocks. Tags that are missing are omitted from
/// the item rather than set to null.
pub fn parse_rss_items(xml: &str, normalizer: Option<&TextNormalizer>) -> Vec<JsonValue> {
    ITEM_RE
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|block| {
            let block = block.as_str();
            let mut item = Map::new();

            let mut text_field = |key: &str, re: &Regex, strip_cdata: bool| {
                if let Some(raw) = capture(re, block) {
                    let mut value = if strip_cdata {
                        unwrap_cdata(raw).to_string()
                    } else {
                        raw.trim().to_string()
                    };
                    if strip_cdata {
                        if let Some(n) = normalizer {
                            value = n.normalize(&value).into_owned();
                        }
                    }
                    item.insert(key.to_string(), JsonValue::String(value));
                }
            };
            text_field("title", &TITLE_RE, true);
            text_field("description", &DESCRIPTION_RE, true);
            text_field("link", &LINK_RE, false);
            text_field("pubDate", &PUB_DATE_RE, false);

            JsonValue::Object(item)
        })
        .collect()
}

fn capture<'a>(re: &Regex, block: &'a str) -> Option<&'a str> {
    re.captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn unwrap_cdata(raw: &str) -> &str {
    match CDATA_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Feed</title>
<item>
  <title><![CDATA[First & best]]></title>
  <description>Plain text</description>
  <link>https://example.com/1</link>
  <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
</item>
<item><title>Second</title></item>
</channel></rss>"#;

    #[test]
    fn extracts_items_and_strips_cdata() {
        let items = parse_rss_items(FEED, None);
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            json!({
                "title": "First & best",
                "description": "Plain text",
                "link": "https://example.com/1",
                "pubDate": "Mon, 01 Jan 2024 00:00:00 GMT",
            })
        );
        assert_eq!(items[1], json!({"title": "Second"}));
    }

    #[test]
    fn normalizes_text_when_asked() {
        let xml = "<item><title>It\u{2019}s</title><link>https://x/\u{2019}</link></item>";
        let normalizer = TextNormalizer::default();
        let items = parse_rss_items(xml, Some(&normalizer));
        assert_eq!(items[0]["title"], "It's");
        assert_eq!(items[0]["link"], "https://x/\u{2019}");
    }

    #[test]
    fn no_items_in_garbage() {
        assert!(parse_rss_items("not xml at all", None).is_empty());
    }
}
