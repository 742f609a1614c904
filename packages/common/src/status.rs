#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error when parsing a status string that is not in the entity's allowed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {entity} status '{invalid}'. Valid values: {valid}")]
pub struct ParseStatusError {
    pub entity: &'static str,
    pub invalid: String,
    pub valid: String,
}

/// Declares a lowercase status enum with string conversions.
///
/// Every status enum starts in `Pending`, so that variant is the default.
/// When the `sea-orm` feature is enabled, the enum can be used directly as
/// an entity column.
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($entity:tt) {
            $( $(#[$doc:meta])* $variant:ident => $value:tt, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
        #[cfg_attr(
            feature = "sea-orm",
            derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
            sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
        )]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $(
                $(#[$doc])*
                #[cfg_attr(feature = "sea-orm", sea_orm(string_value = $value))]
                $variant,
            )+
        }

        impl $name {
            /// All allowed values, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Pending
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError {
                        entity: $entity,
                        invalid: s.to_string(),
                        valid: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }
    };
}

status_enum! {
    /// Approval state of a team.
    TeamStatus("team") {
        /// Awaiting admin review. Nobody can join yet.
        Pending => "pending",
        /// Open for members to join.
        Approved => "approved",
        Rejected => "rejected",
    }
}

status_enum! {
    /// Lifecycle state of a competition.
    CompetitionStatus("competition") {
        /// Awaiting admin review.
        Pending => "pending",
        /// Open for registration until the deadline.
        Approved => "approved",
        Rejected => "rejected",
        /// Running.
        Active => "active",
        Completed => "completed",
    }
}

status_enum! {
    /// Review state of a submission.
    SubmissionStatus("submission") {
        Pending => "pending",
        Reviewed => "reviewed",
        Approved => "approved",
        Rejected => "rejected",
    }
}

status_enum! {
    /// Account state of a user, managed by admins.
    UserStatus("user") {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}
