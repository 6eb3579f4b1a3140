use super::common::{IdReference, ReferenceType};
use crate::api::traits::ResponseItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kinds of content a user can mark as favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FavoriteContentType {
    Project,
    Workbook,
    View,
    DataSource,
}

impl FavoriteContentType {
    pub const ALL: [FavoriteContentType; 4] = [
        FavoriteContentType::Project,
        FavoriteContentType::Workbook,
        FavoriteContentType::View,
        FavoriteContentType::DataSource,
    ];

    /// Plural path segment used by the delete-favorite route.
    pub fn path_segment(&self) -> &'static str {
        match self {
            FavoriteContentType::Project => "projects",
            FavoriteContentType::Workbook => "workbooks",
            FavoriteContentType::View => "views",
            FavoriteContentType::DataSource => "datasources",
        }
    }

    pub fn element(&self) -> &'static str {
        match self {
            FavoriteContentType::Project => "project",
            FavoriteContentType::Workbook => "workbook",
            FavoriteContentType::View => "view",
            FavoriteContentType::DataSource => "datasource",
        }
    }
}

impl fmt::Display for FavoriteContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element())
    }
}

impl FromStr for FavoriteContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.path_segment() == s || kind.element() == s)
            .ok_or_else(|| format!("Unknown favorite content type '{}'", s))
    }
}

/// A favorite is identified per user by its content type and content id.
pub type FavoriteKey = (FavoriteContentType, Uuid);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteType {
    #[serde(rename = "@label")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<ReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<ReferenceType>,
}

impl FavoriteType {
    pub fn new(label: impl Into<String>, kind: FavoriteContentType, content: ReferenceType) -> Self {
        let mut favorite = Self {
            label: label.into(),
            project: None,
            workbook: None,
            view: None,
            datasource: None,
        };
        let slot = match kind {
            FavoriteContentType::Project => &mut favorite.project,
            FavoriteContentType::Workbook => &mut favorite.workbook,
            FavoriteContentType::View => &mut favorite.view,
            FavoriteContentType::DataSource => &mut favorite.datasource,
        };
        *slot = Some(content);
        favorite
    }

    pub fn key(&self) -> Option<FavoriteKey> {
        [
            (FavoriteContentType::Project, &self.project),
            (FavoriteContentType::Workbook, &self.workbook),
            (FavoriteContentType::View, &self.view),
            (FavoriteContentType::DataSource, &self.datasource),
        ]
        .into_iter()
        .find_map(|(kind, reference)| reference.as_ref().map(|r| (kind, r.id)))
    }
}

impl ResponseItem for FavoriteType {
    const ELEMENT: &'static str = "favorite";
    const COLLECTION: &'static str = "favorites";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRequestType {
    #[serde(rename = "@label", default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<IdReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<IdReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<IdReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<IdReference>,
}

impl FavoriteRequestType {
    /// Every content reference present in the request, in element order.
    pub fn references(&self) -> Vec<(FavoriteContentType, Option<Uuid>)> {
        [
            (FavoriteContentType::Project, &self.project),
            (FavoriteContentType::Workbook, &self.workbook),
            (FavoriteContentType::View, &self.view),
            (FavoriteContentType::DataSource, &self.datasource),
        ]
        .into_iter()
        .filter_map(|(kind, reference)| reference.as_ref().map(|r| (kind, r.id)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct AddFavoriteRequest {
    #[serde(default)]
    pub favorite: FavoriteRequestType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parsing() {
        assert_eq!(
            "datasources".parse::<FavoriteContentType>(),
            Ok(FavoriteContentType::DataSource)
        );
        assert_eq!(
            "view".parse::<FavoriteContentType>(),
            Ok(FavoriteContentType::View)
        );
        assert!("flows".parse::<FavoriteContentType>().is_err());
    }

    #[test]
    fn test_favorite_key() {
        let id = Uuid::new_v4();
        let favorite = FavoriteType::new(
            "My workbook",
            FavoriteContentType::Workbook,
            ReferenceType::new(id),
        );
        assert_eq!(favorite.key(), Some((FavoriteContentType::Workbook, id)));
        assert!(favorite.view.is_none());
    }

    #[test]
    fn test_request_references() {
        let id = Uuid::new_v4();
        let request = FavoriteRequestType {
            label: Some("x".to_string()),
            view: Some(IdReference::new(id)),
            datasource: Some(IdReference::default()),
            ..Default::default()
        };
        assert_eq!(
            request.references(),
            vec![
                (FavoriteContentType::View, Some(id)),
                (FavoriteContentType::DataSource, None)
            ]
        );
    }
}
