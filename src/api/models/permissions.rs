use super::common::ReferenceType;
use crate::api::traits::ResponseItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityMode {
    Allow,
    Deny,
}

impl CapabilityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityMode::Allow => "Allow",
            CapabilityMode::Deny => "Deny",
        }
    }
}

impl fmt::Display for CapabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" => Ok(CapabilityMode::Allow),
            "Deny" => Ok(CapabilityMode::Deny),
            other => Err(format!("Invalid capability mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GranteeKind {
    User,
    Group,
}

impl GranteeKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            GranteeKind::User => "users",
            GranteeKind::Group => "groups",
        }
    }
}

impl FromStr for GranteeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" | "user" => Ok(GranteeKind::User),
            "groups" | "group" => Ok(GranteeKind::Group),
            other => Err(format!("Unknown grantee type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityType {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@mode")]
    pub mode: String,
}

impl CapabilityType {
    pub fn new(name: impl Into<String>, mode: CapabilityMode) -> Self {
        Self {
            name: name.into(),
            mode: mode.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesType {
    #[serde(rename = "capability", default)]
    pub capabilities: Vec<CapabilityType>,
}

/// Capabilities granted to one user or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GranteeCapabilitiesType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<ReferenceType>,
    #[serde(default)]
    pub capabilities: CapabilitiesType,
}

impl GranteeCapabilitiesType {
    pub fn new(kind: GranteeKind, id: Uuid) -> Self {
        let reference = Some(ReferenceType::new(id));
        let (user, group) = match kind {
            GranteeKind::User => (reference, None),
            GranteeKind::Group => (None, reference),
        };
        Self {
            user,
            group,
            capabilities: CapabilitiesType::default(),
        }
    }

    pub fn grantee(&self) -> Option<(GranteeKind, Uuid)> {
        match (&self.user, &self.group) {
            (Some(user), None) => Some((GranteeKind::User, user.id)),
            (None, Some(group)) => Some((GranteeKind::Group, group.id)),
            _ => None,
        }
    }

    /// Adds or replaces the capability with the same name.
    pub fn set_capability(&mut self, capability: CapabilityType) {
        let list = &mut self.capabilities.capabilities;
        match list.iter_mut().find(|existing| existing.name == capability.name) {
            Some(existing) => *existing = capability,
            None => list.push(capability),
        }
    }

    pub fn remove_capability(&mut self, name: &str, mode: &str) -> bool {
        let list = &mut self.capabilities.capabilities;
        let before = list.len();
        list.retain(|capability| !(capability.name == name && capability.mode == mode));
        list.len() != before
    }
}

/// Permissions of one content item, or the default permissions of a project
/// for one content type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workbook: Option<ReferenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<ReferenceType>,
    #[serde(rename = "granteeCapabilities", default)]
    pub grantee_capabilities: Vec<GranteeCapabilitiesType>,
}

impl PermissionsType {
    pub fn for_grantee_mut(&mut self, kind: GranteeKind, id: Uuid) -> &mut GranteeCapabilitiesType {
        let position = self
            .grantee_capabilities
            .iter()
            .position(|entry| entry.grantee() == Some((kind, id)));
        match position {
            Some(index) => &mut self.grantee_capabilities[index],
            None => {
                self.grantee_capabilities
                    .push(GranteeCapabilitiesType::new(kind, id));
                let last = self.grantee_capabilities.len() - 1;
                &mut self.grantee_capabilities[last]
            }
        }
    }

    /// Drops grantees left without capabilities.
    pub fn prune(&mut self) {
        self.grantee_capabilities
            .retain(|entry| !entry.capabilities.capabilities.is_empty());
    }
}

impl ResponseItem for PermissionsType {
    const ELEMENT: &'static str = "permissions";
    const COLLECTION: &'static str = "permissions";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "tsRequest")]
pub struct PermissionsRequest {
    #[serde(default)]
    pub permissions: PermissionsType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_capability_replaces_same_name() {
        let mut entry = GranteeCapabilitiesType::new(GranteeKind::User, Uuid::new_v4());
        entry.set_capability(CapabilityType::new("Read", CapabilityMode::Allow));
        entry.set_capability(CapabilityType::new("Read", CapabilityMode::Deny));
        entry.set_capability(CapabilityType::new("Write", CapabilityMode::Allow));

        let capabilities = &entry.capabilities.capabilities;
        assert_eq!(capabilities.len(), 2);
        assert_eq!(capabilities[0].mode, "Deny");
    }

    #[test]
    fn test_for_grantee_mut_reuses_entry() {
        let group = Uuid::new_v4();
        let mut permissions = PermissionsType::default();
        permissions
            .for_grantee_mut(GranteeKind::Group, group)
            .set_capability(CapabilityType::new("Read", CapabilityMode::Allow));
        permissions
            .for_grantee_mut(GranteeKind::Group, group)
            .set_capability(CapabilityType::new("Filter", CapabilityMode::Allow));

        assert_eq!(permissions.grantee_capabilities.len(), 1);
        assert_eq!(
            permissions.grantee_capabilities[0].grantee(),
            Some((GranteeKind::Group, group))
        );
    }

    #[test]
    fn test_remove_and_prune() {
        let user = Uuid::new_v4();
        let mut permissions = PermissionsType::default();
        permissions
            .for_grantee_mut(GranteeKind::User, user)
            .set_capability(CapabilityType::new("Read", CapabilityMode::Allow));

        let entry = permissions.for_grantee_mut(GranteeKind::User, user);
        assert!(!entry.remove_capability("Read", "Deny"));
        assert!(entry.remove_capability("Read", "Allow"));
        permissions.prune();
        assert!(permissions.grantee_capabilities.is_empty());
    }

    #[test]
    fn test_capability_mode_parsing() {
        assert_eq!("Allow".parse(), Ok(CapabilityMode::Allow));
        assert!("allow".parse::<CapabilityMode>().is_err());
    }
}
