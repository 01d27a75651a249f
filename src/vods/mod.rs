use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::common::VideoId;

pub mod prompt;
pub mod resolver;
pub mod table;

pub use prompt::{Console, StdioConsole, prompt_for_index};
pub use resolver::{VodOptions, VodResolver};

/// One past broadcast, as returned by the metadata API.
///
/// Immutable once constructed; identity is `id` equality.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastRecord {
    pub id: VideoId,
    /// Possibly empty; the API serves untitled broadcasts.
    pub title: String,
    pub game: String,
    /// `None` when the API timestamp was missing or unparsable. Such
    /// records sort as the oldest possible.
    pub published_at: Option<OffsetDateTime>,
    pub length_seconds: u64,
    pub viewable: bool,
}

impl BroadcastRecord {
    /// Build a record from one raw API node. `None` when the node has no
    /// usable `id`; every other field degrades to a default.
    pub fn from_json(data: &Value) -> Option<Self> {
        let id = data["id"].as_str()?;
        if id.is_empty() {
            return None;
        }

        let published_at = ["publishedAt", "createdAt"]
            .iter()
            .find_map(|key| data[*key].as_str())
            .and_then(parse_timestamp);

        Some(Self {
            id: VideoId(id.to_string()),
            title: data["title"].as_str().unwrap_or("").to_string(),
            game: data["game"]["name"]
                .as_str()
                .filter(|s| !s.is_empty())
                .unwrap_or("Unknown")
                .to_string(),
            published_at,
            length_seconds: data["lengthSeconds"].as_u64().unwrap_or(0),
            viewable: data["viewable"].as_bool().unwrap_or(true),
        })
    }

    /// Date column value, `yyyy-mm-dd` or `"unknown"`.
    pub fn published_date(&self) -> String {
        let format = time::macros::format_description!("[year]-[month]-[day]");
        self.published_at
            .and_then(|ts| ts.format(&format).ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Length column value, `h:mm:ss`.
    pub fn length_display(&self) -> String {
        let h = self.length_seconds / 3600;
        let m = (self.length_seconds % 3600) / 60;
        let s = self.length_seconds % 60;
        format!("{}:{:02}:{:02}", h, m, s)
    }
}

pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok()
}

/// An ordered collection of broadcasts with unique ids.
#[derive(Debug, Clone, Default)]
pub struct BroadcastList {
    records: Vec<BroadcastRecord>,
}

impl BroadcastList {
    /// Keeps API response order; a duplicate `id` keeps its first record.
    pub fn new(records: Vec<BroadcastRecord>) -> Self {
        let mut unique: Vec<BroadcastRecord> = Vec::with_capacity(records.len());
        for record in records {
            if unique.iter().any(|r| r.id == record.id) {
                continue;
            }
            unique.push(record);
        }
        Self { records: unique }
    }

    /// Reorders most-recent-first. Records without a parsable timestamp
    /// sink to the end; ties keep their relative order.
    pub fn sorted_by_recency(mut self) -> Self {
        self.records.sort_by_key(|r| {
            std::cmp::Reverse(r.published_at.unwrap_or(OffsetDateTime::UNIX_EPOCH))
        });
        self
    }

    pub fn records(&self) -> &[BroadcastRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 1-based lookup matching the rendered listing index.
    pub fn by_index(&self, index: usize) -> Option<&BroadcastRecord> {
        if index == 0 {
            return None;
        }
        self.records.get(index - 1)
    }
}
