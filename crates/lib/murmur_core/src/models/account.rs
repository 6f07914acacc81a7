//! Account profile model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_int, parse_time};

/// Default avatar assigned at signup.
pub const DEFAULT_PROFILE_PIC: &str = "public/media/ndt.jpg";

/// Default profile background assigned at signup.
pub const DEFAULT_PROFILE_BG: &str = "public/media/hubble.jpg";

/// A user account.
///
/// Every profile field is optional: `None` means "not part of this value",
/// so writing a partially filled `Account` only touches the fields it
/// carries. Engagement lists are read from their sorted sets and are never
/// stored in the account hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Most recently issued session token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub posts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub likes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub friends: Vec<String>,
}

impl Account {
    /// An account value carrying only its id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Hash fields for a field-level upsert. Absent fields are skipped.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("id".to_string(), self.id.clone())];
        let mut push = |name: &str, value: Option<String>| {
            if let Some(v) = value {
                fields.push((name.to_string(), v));
            }
        };
        push("email", self.email.clone());
        push("token", self.token.clone());
        push("score", self.score.map(|s| s.to_string()));
        push("joined", self.joined.map(|t| t.to_rfc3339()));
        push("last_seen", self.last_seen.map(|t| t.to_rfc3339()));
        push("about", self.about.clone());
        push("work", self.work.clone());
        push("location", self.location.clone());
        push("profile_bg", self.profile_bg.clone());
        push("profile_pic", self.profile_pic.clone());
        fields
    }

    /// Rebuild an account from its stored hash.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let text = |name: &str| fields.get(name).cloned();
        Self {
            id: fields.get("id").cloned().unwrap_or_default(),
            email: text("email"),
            token: text("token"),
            score: fields.get("score").and_then(|s| parse_int(s)),
            joined: fields.get("joined").and_then(|s| parse_time(s)),
            last_seen: fields.get("last_seen").and_then(|s| parse_time(s)),
            about: text("about"),
            work: text("work"),
            location: text("location"),
            profile_bg: text("profile_bg"),
            profile_pic: text("profile_pic"),
            posts: Vec::new(),
            likes: Vec::new(),
            friends: Vec::new(),
        }
    }

    /// Fill in the default avatar and background where none is set.
    pub fn apply_profile_defaults(&mut self) {
        if self.profile_pic.as_deref().is_none_or(str::is_empty) {
            self.profile_pic = Some(DEFAULT_PROFILE_PIC.to_string());
        }
        if self.profile_bg.as_deref().is_none_or(str::is_empty) {
            self.profile_bg = Some(DEFAULT_PROFILE_BG.to_string());
        }
    }
}
