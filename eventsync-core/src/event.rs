//! Community events as delivered by the listing API.
//!
//! The listing payload is loosely typed: `eventId` is sometimes a number,
//! `category` is sometimes missing or not an object at all. Everything here
//! deserializes leniently and exposes `&str` accessors that treat anything
//! absent or malformed as an empty string.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level body of the listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub data: Vec<Event>,
}

/// A single community event. Immutable once fetched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Stable identifier, reused verbatim as the calendar entry id
    #[serde(default, deserialize_with = "id_as_string")]
    pub event_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// e.g. "2024-06-01T00:00:00"; only the date part is meaningful
    #[serde(default)]
    pub event_date: Option<String>,
    /// e.g. "9:00 AM"
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub name: Option<String>,
}

impl Event {
    pub fn id(&self) -> &str {
        &self.event_id
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or_default()
    }

    pub fn event_date(&self) -> &str {
        self.event_date.as_deref().unwrap_or_default()
    }

    pub fn start_time(&self) -> &str {
        self.start_time.as_deref().unwrap_or_default()
    }

    pub fn end_time(&self) -> &str {
        self.end_time.as_deref().unwrap_or_default()
    }

    pub fn category_name(&self) -> &str {
        self.category.name.as_deref().unwrap_or_default()
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(|tag| tag.name.as_deref().unwrap_or_default())
    }
}

/// Pull a string `name` out of an arbitrary JSON value.
fn name_of(value: &Value) -> Option<String> {
    value
        .as_object()
        .and_then(|obj| obj.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Category {
        name: name_of(&value),
    })
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<Tag>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let tags = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| Tag {
                name: name_of(item),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}
