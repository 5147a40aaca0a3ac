//! RSS 2.0 and Atom feed parsing.
//!
//! The dialect is picked from the root element's local name, so namespaced
//! roots (`<atom:feed>`) and prefixed children (`<dc:creator>`) are handled
//! without a namespace resolver.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::dates::{parse_iso_date, parse_rss_date};
use crate::fetch::FetchClient;
use crate::types::FeedItem;

/// Fetches feed URLs and turns them into [`FeedItem`]s.
#[derive(Debug, Clone)]
pub struct FeedParser {
    fetch: FetchClient,
}

impl FeedParser {
    #[must_use]
    pub fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Fetch and parse one feed. A failed fetch or a broken document is an
    /// empty batch.
    pub async fn parse_feed(&self, url: &str) -> Vec<FeedItem> {
        let Some(body) = self.fetch.get(url).await else {
            tracing::warn!(url, "feed fetch returned no document");
            return Vec::new();
        };

        let items = parse_feed_document(&body);
        tracing::debug!(url, count = items.len(), "parsed feed");
        items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Rss,
    Atom,
}

impl Dialect {
    fn entry_name(self) -> &'static str {
        match self {
            Self::Rss => "item",
            Self::Atom => "entry",
        }
    }
}

/// One open element and the text gathered beneath it.
struct Frame {
    name: String,
    text: String,
}

#[derive(Default)]
struct EntryDraft {
    title: Option<String>,
    link: Option<String>,
    alternate_link: Option<String>,
    first_link: Option<String>,
    description: Option<String>,
    content: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    author: Option<String>,
    category: Option<String>,
}

impl EntryDraft {
    fn finish(self, dialect: Dialect) -> Option<FeedItem> {
        let title = non_empty(self.title);
        let link = match dialect {
            Dialect::Rss => non_empty(self.link),
            Dialect::Atom => non_empty(self.alternate_link.or(self.first_link)),
        };
        let (Some(title), Some(link)) = (title, link) else {
            tracing::debug!(?dialect, "skipping feed entry without title or link");
            return None;
        };

        let (description, published_at) = match dialect {
            Dialect::Rss => (
                non_empty(self.description),
                self.published.as_deref().and_then(parse_rss_date),
            ),
            Dialect::Atom => (
                non_empty(self.description).or_else(|| non_empty(self.content)),
                self.published
                    .as_deref()
                    .and_then(parse_iso_date)
                    .or_else(|| self.updated.as_deref().and_then(parse_iso_date)),
            ),
        };

        Some(FeedItem {
            title,
            link,
            description,
            published_at,
            author: non_empty(self.author),
            category: non_empty(self.category),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok().map(Cow::into_owned))
}

fn append_text(buf: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(text);
}

/// Parse a feed document already in memory.
///
/// Unknown roots and malformed XML both produce an empty batch with a
/// warning. Entries missing a title or a link are dropped.
#[must_use]
pub fn parse_feed_document(xml: &str) -> Vec<FeedItem> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut dialect: Option<Dialect> = None;
    let mut stack: Vec<Frame> = Vec::new();
    let mut entry: Option<(usize, EntryDraft)> = None;
    let mut items = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    position = reader.buffer_position(),
                    error = %e,
                    "malformed feed document"
                );
                return Vec::new();
            }
        };

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = local_name(e);
                let active = match dialect {
                    Some(d) => d,
                    None => match name.as_str() {
                        "rss" => *dialect.insert(Dialect::Rss),
                        "feed" => *dialect.insert(Dialect::Atom),
                        other => {
                            tracing::warn!(root = other, "unrecognized feed root element");
                            return Vec::new();
                        }
                    },
                };

                if let Some((depth, draft)) = entry.as_mut() {
                    if active == Dialect::Atom && stack.len() == *depth + 1 {
                        record_atom_attributes(&name, e, draft);
                    }
                }

                let is_empty = matches!(event, Event::Empty(_));
                if entry.is_none() && name == active.entry_name() && !is_empty {
                    entry = Some((stack.len(), EntryDraft::default()));
                }
                if !is_empty {
                    stack.push(Frame {
                        name,
                        text: String::new(),
                    });
                }
            }
            Event::Text(ref e) => {
                if let Some(frame) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(e).into_owned());
                    append_text(&mut frame.text, &text);
                }
            }
            Event::CData(ref e) => {
                if let Some(frame) = stack.last_mut() {
                    append_text(&mut frame.text, &String::from_utf8_lossy(e));
                }
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    continue;
                };
                let Some(active) = dialect else {
                    continue;
                };

                match entry.take() {
                    Some((depth, draft)) if stack.len() == depth => {
                        if let Some(item) = draft.finish(active) {
                            items.push(item);
                        }
                    }
                    Some((depth, mut draft)) => {
                        let parent = stack.last().map(|f| f.name.as_str());
                        let direct_child = stack.len() == depth + 1;
                        let consumed = record_field(
                            active,
                            &frame,
                            direct_child,
                            parent == Some("author") && stack.len() == depth + 2,
                            &mut draft,
                        );
                        if !consumed {
                            if let Some(parent) = stack.last_mut() {
                                append_text(&mut parent.text, &frame.text);
                            }
                        }
                        entry = Some((depth, draft));
                    }
                    None => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    items
}

/// Store a closed element's text on the draft. Returns `false` when the
/// element is not an entry field, so its text flows to the parent.
fn record_field(
    dialect: Dialect,
    frame: &Frame,
    direct_child: bool,
    inside_author: bool,
    draft: &mut EntryDraft,
) -> bool {
    let text = frame.text.clone();

    if inside_author {
        if dialect == Dialect::Atom && frame.name == "name" {
            draft.author.get_or_insert(text);
        }
        return true;
    }
    if !direct_child {
        return false;
    }

    match (dialect, frame.name.as_str()) {
        (_, "title") => draft.title = Some(text),
        (Dialect::Rss, "link") => draft.link = Some(text),
        (Dialect::Rss, "description") | (Dialect::Atom, "summary") => {
            draft.description = Some(text);
        }
        (Dialect::Atom, "content") => draft.content = Some(text),
        (Dialect::Rss, "pubDate") | (Dialect::Atom, "published") => draft.published = Some(text),
        (Dialect::Atom, "updated") => draft.updated = Some(text),
        (Dialect::Rss, "author" | "creator") => {
            draft.author.get_or_insert(text);
        }
        (Dialect::Rss, "category") => {
            draft.category.get_or_insert(text);
        }
        (Dialect::Atom, "author" | "link" | "category") => {}
        _ => return false,
    }
    true
}

fn record_atom_attributes(name: &str, e: &BytesStart<'_>, draft: &mut EntryDraft) {
    match name {
        "link" => {
            let Some(href) = attribute(e, "href") else {
                return;
            };
            let rel = attribute(e, "rel");
            if draft.alternate_link.is_none() && rel.as_deref().is_none_or(|r| r == "alternate") {
                draft.alternate_link = Some(href.clone());
            }
            draft.first_link.get_or_insert(href);
        }
        "category" => {
            if let Some(term) = attribute(e, "term") {
                draft.category.get_or_insert(term);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Business</title>
    <item>
      <title>Apple reports record quarter</title>
      <link>https://example.com/apple-record</link>
      <description><![CDATA[<p>Revenue rose</p>]]></description>
      <pubDate>Tue, 02 Jan 2024 10:30:00 GMT</pubDate>
      <dc:creator>Jane Doe</dc:creator>
      <category>Technology</category>
      <category>Markets</category>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example</title>
  <entry>
    <title>Microsoft expands Azure regions</title>
    <link rel="self" href="https://example.com/self"/>
    <link rel="alternate" href="https://example.com/azure"/>
    <content>Full content here</content>
    <author><name>John Roe</name></author>
    <category term="cloud"/>
    <updated>2024-03-05T08:00:00Z</updated>
  </entry>
  <entry>
    <title>Entry without any link element</title>
    <summary>Nothing to point at</summary>
  </entry>
  <entry>
    <title>Tesla deliveries beat estimates</title>
    <link href="https://example.com/tesla"/>
    <summary>Deliveries rose</summary>
    <published>not a timestamp</published>
  </entry>
</feed>"#;

    #[test]
    fn parses_minimal_rss_item() {
        let items = parse_feed_document(RSS);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Apple reports record quarter");
        assert_eq!(item.link, "https://example.com/apple-record");
        assert_eq!(item.description.as_deref(), Some("<p>Revenue rose</p>"));
        assert_eq!(
            item.published_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 10, 30, 0).unwrap())
        );
        assert_eq!(item.author.as_deref(), Some("Jane Doe"));
        assert_eq!(item.category.as_deref(), Some("Technology"));
    }

    #[test]
    fn parses_atom_and_skips_linkless_entry() {
        let items = parse_feed_document(ATOM);
        assert_eq!(items.len(), 2);

        let azure = &items[0];
        assert_eq!(azure.link, "https://example.com/azure");
        assert_eq!(azure.description.as_deref(), Some("Full content here"));
        assert_eq!(azure.author.as_deref(), Some("John Roe"));
        assert_eq!(azure.category.as_deref(), Some("cloud"));
        assert_eq!(
            azure.published_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap())
        );

        let tesla = &items[1];
        assert_eq!(tesla.link, "https://example.com/tesla");
        assert_eq!(tesla.description.as_deref(), Some("Deliveries rose"));
        assert_eq!(tesla.published_at, None);
    }

    #[test]
    fn channel_title_does_not_leak_into_items() {
        let xml = r"<rss><channel><title>Feed title</title>
            <item><link>https://example.com/x</link></item></channel></rss>";
        assert!(parse_feed_document(xml).is_empty());
    }

    #[test]
    fn unknown_root_is_empty() {
        assert!(parse_feed_document("<html><body>nope</body></html>").is_empty());
    }

    #[test]
    fn mismatched_tags_are_empty() {
        let xml = "<rss><channel><item><title>Broken item title</title></channel></rss>";
        assert!(parse_feed_document(xml).is_empty());
    }
}
