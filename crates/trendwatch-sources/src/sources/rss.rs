//! Shared RSS feed parsing for the news sources.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::error::SourceError;
use crate::types::RawHit;

/// Parse an RSS feed XML body into raw hits.
///
/// Each `<item>` becomes one hit with `raw_count = 1`; the text is the
/// title plus the HTML-stripped description. Items without a link are
/// skipped.
///
/// # Errors
///
/// Returns [`SourceError::Xml`] if the XML is malformed.
pub(crate) fn parse_rss_feed(xml: &str, source_name: &'static str) -> Result<Vec<RawHit>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut hits = Vec::new();
    let mut current_title = String::new();
    let mut current_link = String::new();
    let mut current_description = String::new();
    let mut current_pub_date = String::new();
    let mut in_item = false;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                match name.as_str() {
                    "item" => {
                        in_item = true;
                        current_title.clear();
                        current_link.clear();
                        current_description.clear();
                        current_pub_date.clear();
                    }
                    _ => {
                        current_tag = name;
                    }
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    if !current_link.is_empty() {
                        let text = if current_description.is_empty() {
                            current_title.clone()
                        } else {
                            format!("{current_title} {current_description}")
                        };
                        hits.push(RawHit {
                            text,
                            url: current_link.clone(),
                            source_name,
                            published_at: parse_pub_date(&current_pub_date),
                            raw_count: 1,
                        });
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        &mut current_title,
                        &mut current_link,
                        &mut current_description,
                        &mut current_pub_date,
                    );
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        &mut current_title,
                        &mut current_link,
                        &mut current_description,
                        &mut current_pub_date,
                    );
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    Ok(hits)
}

fn assign_field(
    tag: &str,
    text: String,
    title: &mut String,
    link: &mut String,
    description: &mut String,
    pub_date: &mut String,
) {
    match tag {
        "title" => *title = text,
        "link" => *link = text,
        "description" => *description = strip_html(&text),
        "pubDate" => *pub_date = text,
        _ => {}
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Strip HTML tags from a string, returning trimmed plain text.
fn strip_html(html: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap_or_else(|_| unreachable!()));
    re.replace_all(html, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Google News</title>
    <item>
      <title>NewJeans Announce World Tour</title>
      <link>https://example.com/newjeans-tour</link>
      <description>&lt;b&gt;NewJeans&lt;/b&gt; confirmed tour dates today.</description>
      <pubDate>Mon, 24 Aug 2026 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title>K-pop Streaming Numbers Hit Record</title>
      <link>https://example.com/kpop-streaming</link>
      <description>Streaming totals climbed again this quarter.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_into_hits() {
        let hits = parse_rss_feed(SAMPLE_RSS, "google_news").expect("valid RSS");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source_name, "google_news");
        assert_eq!(hits[0].url, "https://example.com/newjeans-tour");
        assert_eq!(hits[0].raw_count, 1);
        assert!(hits[0].text.contains("confirmed tour dates"));
        assert!(!hits[0].text.contains('<'), "HTML not stripped: {}", hits[0].text);
        assert!(hits[0].published_at.is_some());
        assert!(hits[1].published_at.is_none());
    }

    #[test]
    fn empty_feed_returns_empty_vec() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        let hits = parse_rss_feed(xml, "bing_news").expect("empty RSS parses");
        assert!(hits.is_empty());
    }

    #[test]
    fn item_without_link_is_skipped() {
        let xml = r#"<rss version="2.0"><channel><item><title>no link</title></item></channel></rss>"#;
        let hits = parse_rss_feed(xml, "google_news").expect("parses");
        assert!(hits.is_empty());
    }

    #[test]
    fn malformed_xml_is_tolerated_or_errors() {
        let xml = "<rss><channel><item><title>Unclosed";
        // quick-xml reads until EOF so this may succeed with no complete items
        match parse_rss_feed(xml, "google_news") {
            Ok(hits) => assert!(hits.is_empty()),
            Err(SourceError::Xml(_)) => {}
            Err(e) => panic!("unexpected error type: {e}"),
        }
    }
}
