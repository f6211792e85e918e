//! Atom feed reading.
//!
//! Only a fixed set of elements is extracted:
//!
//! | Element | Where | Becomes |
//! |---------|-------|---------|
//! | `atom:title` | `feed` | [`FeedPage::title`] |
//! | `opensearch:totalResults` | `feed` | [`FeedPage::total_results`] |
//! | `atom:title` | `entry` | [`FeedEntry::title`] |
//! | `atom:author/atom:name` | `entry` | [`FeedEntry::authors`] |
//! | `arxiv:journal_ref` | `entry` | [`FeedEntry::journal_ref`] |
//!
//! Elements are matched by namespace URI, not prefix, so documents that bind
//! the namespaces to other prefixes read the same.

use paperlog_core::feed::FeedEntry;
use quick_xml::{
  NsReader,
  events::Event,
  name::{Namespace, ResolveResult},
};
use tracing::warn;

use crate::error::{Error, Result};

// ─── Namespaces ──────────────────────────────────────────────────────────────

pub const NS_ATOM: &[u8] = b"http://www.w3.org/2005/Atom";
pub const NS_OPENSEARCH: &[u8] = b"http://a9.com/-/spec/opensearch/1.1/";
pub const NS_ARXIV: &[u8] = b"http://arxiv.org/schemas/atom";

// ─── Parsed document ─────────────────────────────────────────────────────────

/// The parts of a feed document paperlog cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
  /// Feed title; arXiv echoes the query here.
  pub title:         Option<String>,
  /// `opensearch:totalResults`, `0` when absent or not a number.
  pub total_results: u32,
  pub entries:       Vec<FeedEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
  Feed,
  Entry,
  Author,
  Name,
  Title,
  TotalResults,
  JournalRef,
  Other,
}

fn classify(ns: &ResolveResult<'_>, local: &[u8]) -> Tag {
  let ResolveResult::Bound(Namespace(ns)) = ns else {
    return Tag::Other;
  };
  match (*ns, local) {
    (NS_ATOM, b"feed") => Tag::Feed,
    (NS_ATOM, b"entry") => Tag::Entry,
    (NS_ATOM, b"author") => Tag::Author,
    (NS_ATOM, b"name") => Tag::Name,
    (NS_ATOM, b"title") => Tag::Title,
    (NS_OPENSEARCH, b"totalResults") => Tag::TotalResults,
    (NS_ARXIV, b"journal_ref") => Tag::JournalRef,
    _ => Tag::Other,
  }
}

#[derive(Default)]
struct EntryBuilder {
  authors:     Vec<String>,
  title:       Option<String>,
  journal_ref: Option<String>,
}

impl EntryBuilder {
  fn finish(self) -> Option<FeedEntry> {
    let title = self.title.filter(|t| !t.is_empty())?;
    if self.authors.is_empty() {
      return None;
    }
    Some(FeedEntry {
      authors: self.authors,
      title,
      journal_ref: self.journal_ref.filter(|j| !j.is_empty()),
    })
  }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Parse an Atom document.
///
/// Entries without a title or without any author are skipped with a warning.
/// A document with no `atom:feed` element is an error.
pub fn parse(xml: &[u8]) -> Result<FeedPage> {
  let mut reader = NsReader::from_reader(xml);
  reader.config_mut().trim_text(true);

  let mut page = FeedPage::default();
  let mut saw_feed = false;
  let mut stack: Vec<Tag> = Vec::new();
  let mut entry: Option<EntryBuilder> = None;
  let mut text = String::new();
  let mut buf = Vec::new();

  loop {
    match reader.read_resolved_event_into(&mut buf)? {
      (ns, Event::Start(e)) => {
        let tag = classify(&ns, e.local_name().as_ref());
        match tag {
          Tag::Feed => saw_feed = true,
          Tag::Entry => entry = Some(EntryBuilder::default()),
          _ => {}
        }
        stack.push(tag);
        text.clear();
      }
      (_, Event::Text(t)) => text.push_str(&t.unescape()?),
      (_, Event::CData(c)) => text.push_str(&String::from_utf8_lossy(&c)),
      (_, Event::End(_)) => {
        let tag = stack.pop();
        let parent = stack.last().copied();
        let value = text.trim();

        match (tag, parent) {
          (Some(Tag::Title), Some(Tag::Feed)) => page.title = Some(value.to_owned()),
          (Some(Tag::TotalResults), Some(Tag::Feed)) => {
            page.total_results = value.parse().unwrap_or(0);
          }
          (Some(Tag::Title), Some(Tag::Entry)) => {
            if let Some(b) = entry.as_mut() {
              b.title = Some(value.to_owned());
            }
          }
          (Some(Tag::Name), Some(Tag::Author)) => {
            if let Some(b) = entry.as_mut() {
              b.authors.push(value.to_owned());
            }
          }
          (Some(Tag::JournalRef), Some(Tag::Entry)) => {
            if let Some(b) = entry.as_mut() {
              b.journal_ref = Some(value.to_owned());
            }
          }
          (Some(Tag::Entry), _) => {
            if let Some(b) = entry.take() {
              match b.finish() {
                Some(e) => page.entries.push(e),
                None => warn!("skipping feed entry without title or authors"),
              }
            }
          }
          _ => {}
        }
        text.clear();
      }
      (_, Event::Eof) => break,
      _ => {}
    }
    buf.clear();
  }

  if !saw_feed {
    return Err(Error::MissingFeed);
  }
  Ok(page)
}

#[cfg(test)]
mod tests {
  use super::*;

  const EINSTEIN: &str = include_str!("../testdata/einstein.atom");

  #[test]
  fn reads_total_and_entries() {
    let page = parse(EINSTEIN.as_bytes()).unwrap();
    assert_eq!(page.total_results, 137);
    assert_eq!(page.entries.len(), 2);
    assert_eq!(
      page.title.as_deref(),
      Some("ArXiv Query: search_query=au:Einstein&id_list=&start=0&max_results=2")
    );
  }

  #[test]
  fn entry_fields() {
    let page = parse(EINSTEIN.as_bytes()).unwrap();

    let epr = &page.entries[0];
    assert_eq!(epr.authors, ["A. Einstein", "B. Podolsky", "N. Rosen"]);
    assert!(epr.title.starts_with("Can Quantum-Mechanical Description"));
    assert!(epr.title.ends_with("Complete?"));
    assert_eq!(epr.journal_ref.as_deref(), Some("Phys. Rev. 47, 777 (1935)"));

    let sr = &page.entries[1];
    assert_eq!(sr.authors, ["Albert Einstein"]);
    assert_eq!(sr.title, "On the Electrodynamics of Moving Bodies");
    assert_eq!(sr.journal_ref, None);
  }

  #[test]
  fn namespaces_match_by_uri_not_prefix() {
    let xml = r#"<?xml version="1.0"?>
      <a:feed xmlns:a="http://www.w3.org/2005/Atom"
              xmlns:os="http://a9.com/-/spec/opensearch/1.1/"
              xmlns:x="http://arxiv.org/schemas/atom">
        <os:totalResults>4</os:totalResults>
        <a:entry>
          <a:title>Prefixed</a:title>
          <a:author><a:name>Someone</a:name></a:author>
          <x:journal_ref>J. Prefix 1 (2001)</x:journal_ref>
        </a:entry>
      </a:feed>"#;
    let page = parse(xml.as_bytes()).unwrap();
    assert_eq!(page.total_results, 4);
    assert_eq!(page.entries[0].journal_ref.as_deref(), Some("J. Prefix 1 (2001)"));
  }

  #[test]
  fn journal_ref_in_foreign_namespace_is_ignored() {
    let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:o="urn:other">
        <entry>
          <title>T</title>
          <author><name>A</name></author>
          <o:journal_ref>not arxiv</o:journal_ref>
        </entry>
      </feed>"#;
    let page = parse(xml.as_bytes()).unwrap();
    assert_eq!(page.entries[0].journal_ref, None);
  }

  #[test]
  fn missing_or_garbled_total_is_zero() {
    let missing = r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;
    assert_eq!(parse(missing.as_bytes()).unwrap().total_results, 0);

    let garbled = r#"<feed xmlns="http://www.w3.org/2005/Atom"
        xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">
        <opensearch:totalResults>lots</opensearch:totalResults>
      </feed>"#;
    assert_eq!(parse(garbled.as_bytes()).unwrap().total_results, 0);
  }

  #[test]
  fn incomplete_entries_are_skipped() {
    let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
        <entry><title>No authors</title></entry>
        <entry><author><name>No title</name></author></entry>
        <entry><title>Kept</title><author><name>B</name></author></entry>
      </feed>"#;
    let page = parse(xml.as_bytes()).unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].title, "Kept");
  }

  #[test]
  fn feed_level_author_is_not_an_entry_author() {
    let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
        <author><name>Feed Owner</name></author>
        <entry><title>T</title><author><name>Entry Author</name></author></entry>
      </feed>"#;
    let page = parse(xml.as_bytes()).unwrap();
    assert_eq!(page.entries[0].authors, ["Entry Author"]);
  }

  #[test]
  fn not_a_feed() {
    assert!(matches!(parse(b"<html><body/></html>"), Err(Error::MissingFeed)));
    assert!(matches!(parse(b"{\"feed\": {}}"), Err(Error::MissingFeed)));
  }

  #[test]
  fn broken_xml_is_an_error() {
    let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry></feed>"#;
    assert!(matches!(parse(xml.as_bytes()), Err(Error::Xml(_))));
  }
}
