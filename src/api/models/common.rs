use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Paging metadata attached to paged list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(rename = "@pageNumber")]
    pub page_number: usize,
    #[serde(rename = "@pageSize")]
    pub page_size: usize,
    #[serde(rename = "@totalAvailable")]
    pub total_available: usize,
}

/// Wire form of an error: `<error code="404002"><summary/><detail/></error>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorType {
    #[serde(rename = "@code")]
    pub code: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detail: String,
}

/// Shallow reference to another entity (`<owner id="..." name="..."/>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceType {
    #[serde(rename = "@id")]
    pub id: Uuid,
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ReferenceType {
    pub fn new(id: Uuid) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }
}

pub type OwnerType = ReferenceType;
pub type ProjectReferenceType = ReferenceType;
pub type WorkbookReferenceType = ReferenceType;
pub type ViewReferenceType = ReferenceType;
pub type UserReferenceType = ReferenceType;

/// Request-side reference: the id may be missing, which builders report as 400.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdReference {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl IdReference {
    pub fn new(id: Uuid) -> Self {
        Self { id: Some(id) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagType {
    #[serde(rename = "@label")]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsType {
    #[serde(rename = "tag", default)]
    pub tags: Vec<TagType>,
}

impl TagsType {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: labels
                .into_iter()
                .map(|label| TagType {
                    label: label.into(),
                })
                .collect(),
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.tags.iter().map(|tag| tag.label.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainType {
    #[serde(rename = "@name")]
    pub name: String,
}

impl DomainType {
    pub const LOCAL: &'static str = "local";

    pub fn local() -> Self {
        Self {
            name: Self::LOCAL.to_string(),
        }
    }
}

impl Default for DomainType {
    fn default() -> Self {
        Self::local()
    }
}

/// Current time truncated to whole seconds, the precision the wire format carries.
pub fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

/// Lowercase, dash-separated URL segment derived from a display name.
pub fn content_url_for(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("content");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_url_for() {
        assert_eq!(content_url_for("Sales Overview"), "sales-overview");
        assert_eq!(content_url_for("  Q3 -- Revenue!! "), "q3-revenue");
        assert_eq!(content_url_for("***"), "content");
    }

    #[test]
    fn test_tags_from_labels() {
        let tags = TagsType::from_labels(["finance", "weekly"]);
        assert_eq!(tags.labels(), vec!["finance", "weekly"]);
        assert!(!tags.is_empty());
        assert!(TagsType::default().is_empty());
    }

    #[test]
    fn test_timestamp_now_has_no_subseconds() {
        assert_eq!(timestamp_now().timestamp_subsec_nanos(), 0);
    }
}
