//! Post model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_int, parse_time};

/// A post or reply.
///
/// A root post has an empty `parent`. Posts are immutable once written,
/// apart from `score`; `comments` is assembled on read and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub ts: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_string: String,
    #[serde(rename = "uptext", default)]
    pub text: String,
    #[serde(rename = "Media", default)]
    pub media: String,
    #[serde(default)]
    pub media_type: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub comments: Vec<Post>,
}

impl Post {
    /// True for the zero value returned when a post is missing.
    pub fn is_missing(&self) -> bool {
        self.id.is_empty()
    }

    pub fn is_reply(&self) -> bool {
        !self.parent.is_empty()
    }

    /// Hash fields for the content record.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        let mut fields = self.content_fields();
        fields.push(("score".to_string(), self.score.to_string()));
        fields
    }

    /// Hash fields excluding `score`, which only the like toggle writes.
    pub fn content_fields(&self) -> Vec<(String, String)> {
        vec![
            ("id".to_string(), self.id.clone()),
            ("parent".to_string(), self.parent.clone()),
            ("author".to_string(), self.author.clone()),
            (
                "ts".to_string(),
                self.ts.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ),
            ("time_string".to_string(), self.time_string.clone()),
            ("uptext".to_string(), self.text.clone()),
            ("Media".to_string(), self.media.clone()),
            ("media_type".to_string(), self.media_type.clone()),
            ("Type".to_string(), self.kind.clone()),
        ]
    }

    /// Rebuild a post from its stored hash. An empty map gives the zero value.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let text = |name: &str| fields.get(name).cloned().unwrap_or_default();
        Self {
            id: text("id"),
            parent: text("parent"),
            author: text("author"),
            ts: fields.get("ts").and_then(|s| parse_time(s)),
            time_string: text("time_string"),
            text: text("uptext"),
            media: text("Media"),
            media_type: text("media_type"),
            kind: text("Type"),
            score: fields.get("score").and_then(|s| parse_int(s)).unwrap_or(0),
            comments: Vec::new(),
        }
    }
}
