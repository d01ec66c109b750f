//! User records

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cursor::Cursor;
use crate::serde_util::lenient_string;

/// User privilege level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    User,
    Manager,
    Admin,
    /// Level reported by the device that this driver does not know
    #[serde(other)]
    Other,
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Manager => "manager",
            Self::Admin => "admin",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// User record
///
/// Used both for reading (`GetUserInfo`) and writing (`SetUserInfo`).
/// When writing, only fields that are set are sent, so an update touches
/// exactly the fields the caller provided.
///
/// # Examples
///
/// ```
/// use bioterm_types::{Privilege, UserInfo};
///
/// let user = UserInfo::new("999")
///     .name("Test User")
///     .department("Engineering")
///     .privilege(Privilege::User);
///
/// let json = serde_json::to_value(&user).unwrap();
/// assert_eq!(json["depart"], "Engineering");
/// assert!(json.get("card").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(deserialize_with = "lenient_string::deserialize")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "depart", default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privilege: Option<Privilege>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,

    /// Base64 fingerprint templates
    #[serde(rename = "fp", default, skip_serializing_if = "Option::is_none")]
    pub fingerprints: Option<Vec<String>>,

    /// Base64 face template
    #[serde(rename = "face", default, skip_serializing_if = "Option::is_none")]
    pub face: Option<String>,

    /// Base64 palm templates
    #[serde(rename = "palm", default, skip_serializing_if = "Option::is_none")]
    pub palms: Option<Vec<String>>,

    /// Fields this driver does not model, kept as the device sent them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    /// Start a record for the given user id with no other fields set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn privilege(mut self, privilege: Privilege) -> Self {
        self.privilege = Some(privilege);
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn card(mut self, card: impl Into<String>) -> Self {
        self.card = Some(card.into());
        self
    }

    pub fn fingerprints(mut self, templates: Vec<String>) -> Self {
        self.fingerprints = Some(templates);
        self
    }

    pub fn face(mut self, template: impl Into<String>) -> Self {
        self.face = Some(template.into());
        self
    }

    pub fn palms(mut self, templates: Vec<String>) -> Self {
        self.palms = Some(templates);
        self
    }

    /// Check if any biometric template is present
    pub fn has_biometrics(&self) -> bool {
        self.fingerprints.as_ref().is_some_and(|t| !t.is_empty())
            || self.face.is_some()
            || self.palms.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// One page of `GetUserIdList`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserIdPage {
    #[serde(rename = "user_id", default, deserialize_with = "lenient_string::deserialize_vec")]
    pub user_ids: Vec<String>,

    /// Position of the next page; absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_pos: Option<Cursor>,
}
