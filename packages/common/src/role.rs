#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform role of a user. Exactly one per account, fixed at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "student"))]
    Student,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "mentor"))]
    Mentor,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "organizer"))]
    Organizer,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "admin"))]
    Admin,
}

impl Role {
    pub const ALL: &'static [Role] = &[Self::Student, Self::Mentor, Self::Organizer, Self::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Mentor => "mentor",
            Self::Organizer => "organizer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role '{0}'. Valid values: student, mentor, organizer, admin")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "mentor" => Ok(Self::Mentor),
            "organizer" => Ok(Self::Organizer),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Position of a student inside a team, as recorded on their profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "leader"))]
    Leader,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "member"))]
    Member,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Member => "member",
        }
    }
}

/// Student-only profile fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StudentProfile {
    #[schema(example = "Tsinghua University")]
    pub institution: String,
    #[schema(example = "Computer Science")]
    pub course: String,
    /// Year of study, starting at 1.
    #[schema(example = 2)]
    pub year: u8,
    #[schema(example = "2023011234")]
    pub student_id: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

/// Mentor-only profile fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MentorProfile {
    pub organization: String,
    pub designation: String,
    /// Free-form availability, e.g. "weekends".
    pub availability: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    /// Upper bound on teams this mentor is willing to guide.
    #[schema(example = 3)]
    pub max_teams: u32,
}

/// Organizer-only profile fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrganizerProfile {
    pub organization: String,
    pub designation: String,
    pub contact_number: String,
    #[serde(default)]
    pub previous_events: Vec<String>,
}

/// Role-specific profile, tagged by `role`.
///
/// Each role carries only its own fields, so a mentor can never hold a
/// `student_id` and a student can never omit one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Student(StudentProfile),
    Mentor(MentorProfile),
    Organizer(OrganizerProfile),
    Admin,
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Mentor(_) => Role::Mentor,
            Self::Organizer(_) => Role::Organizer,
            Self::Admin => Role::Admin,
        }
    }
}
