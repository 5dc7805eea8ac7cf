use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde_json::Value as JsonValue;
use sluice_core::types::FeedMetadata;

use super::{escape_xml, scalar_text};

const DEFAULT_TITLE: &str = "Data Feed";
const DEFAULT_DESCRIPTION: &str = "Generated data feed";
const DEFAULT_LINK: &str = "http://localhost/";
/// 9999-12-31T23:59:59Z, the last instant an HTTP date can express.
const LATEST_HTTP_DATE_SECS: u64 = 253_402_300_799;

pub(super) fn generate_rss(data: &JsonValue, metadata: &FeedMetadata, now: SystemTime) -> String {
    let title = non_empty(metadata.title.as_deref()).unwrap_or(DEFAULT_TITLE);
    let description = non_empty(metadata.description.as_deref()).unwrap_or(DEFAULT_DESCRIPTION);
    let link = non_empty(metadata.link.as_deref()).unwrap_or(DEFAULT_LINK);
    let latest = UNIX_EPOCH + Duration::from_secs(LATEST_HTTP_DATE_SECS);
    let now = now.clamp(UNIX_EPOCH, latest);

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<rss version=\"2.0\">\n");
    out.push_str("  <channel>\n");
    push_tag(&mut out, 2, "title", title);
    push_tag(&mut out, 2, "description", description);
    push_tag(&mut out, 2, "link", link);
    push_tag(&mut out, 2, "lastBuildDate", &httpdate::fmt_http_date(now));

    if let JsonValue::Array(items) = data {
        for item in items {
            out.push_str("    <item>\n");
            push_tag(&mut out, 3, "title", &field_text(item, "title"));
            push_tag(&mut out, 3, "description", &field_text(item, "description"));
            let item_link = field_text(item, "link");
            if !item_link.trim().is_empty() {
                push_tag(&mut out, 3, "link", &item_link);
            }
            if let Some(date) = item.get("pubDate").and_then(render_pub_date) {
                push_tag(&mut out, 3, "pubDate", &date);
            }
            out.push_str("    </item>\n");
        }
    }

    out.push_str("  </channel>\n");
    out.push_str("</rss>\n");
    out
}

fn push_tag(out: &mut String, depth: usize, tag: &str, text: &str) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("<{tag}>{}</{tag}>\n", escape_xml(text)));
}

fn field_text(item: &JsonValue, key: &str) -> String {
    item.get(key).map(scalar_text).unwrap_or_default()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// RFC 3339, RFC 2822 and epoch-millisecond dates become RFC 1123; other
/// strings pass through unchanged.
pub(super) fn render_pub_date(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::Number(n) => {
            let parsed = n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .and_then(http_date);
            Some(parsed.unwrap_or_else(|| n.to_string()))
        }
        JsonValue::String(s) if s.trim().is_empty() => None,
        JsonValue::String(s) => {
            let trimmed = s.trim();
            let parsed = DateTime::parse_from_rfc3339(trimmed)
                .or_else(|_| DateTime::parse_from_rfc2822(trimmed))
                .ok()
                .and_then(|dt| http_date(dt.with_timezone(&Utc)));
            Some(parsed.unwrap_or_else(|| s.clone()))
        }
        other => Some(scalar_text(other)),
    }
}

fn http_date(dt: DateTime<Utc>) -> Option<String> {
    if dt.timestamp() < 0 || dt.year() > 9999 {
        return None;
    }
    Some(httpdate::fmt_http_date(SystemTime::from(dt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pub_dates_are_normalized() {
        assert_eq!(
            render_pub_date(&json!("2024-01-02T03:04:05Z")).as_deref(),
            Some("Tue, 02 Jan 2024 03:04:05 GMT")
        );
        assert_eq!(
            render_pub_date(&json!("Tue, 02 Jan 2024 05:04:05 +0200")).as_deref(),
            Some("Tue, 02 Jan 2024 03:04:05 GMT")
        );
        assert_eq!(
            render_pub_date(&json!(1704164645000i64)).as_deref(),
            Some("Tue, 02 Jan 2024 03:04:05 GMT")
        );
        assert_eq!(render_pub_date(&json!("next tuesday")).as_deref(), Some("next tuesday"));
        assert_eq!(render_pub_date(&json!(null)), None);
    }

    #[test]
    fn build_date_is_clamped_to_http_date_range() {
        let far_future = UNIX_EPOCH + Duration::from_secs(LATEST_HTTP_DATE_SECS * 2);
        let rss = generate_rss(&json!([]), &FeedMetadata::default(), far_future);
        assert!(rss.contains("<lastBuildDate>Fri, 31 Dec 9999 23:59:59 GMT</lastBuildDate>"));

        let before_epoch = UNIX_EPOCH - Duration::from_secs(60);
        let rss = generate_rss(&json!([]), &FeedMetadata::default(), before_epoch);
        assert!(rss.contains("<lastBuildDate>Thu, 01 Jan 1970 00:00:00 GMT</lastBuildDate>"));
    }
}
