//! Typed ids for versions and everything a version owns
//!
//! Ids are stored as bare UUIDs. On screen they are shortened to a kind
//! prefix plus the first eight hex digits (`ver-1a2b3c4d`), and anything a
//! user types back is resolved through `matches`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the UUID fragment shown after the prefix
const SHORT_LEN: usize = 8;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Prefix used in the short display form
            pub const PREFIX: &'static str = $prefix;

            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// True when `identifier` names this id: the full UUID (with or
            /// without the prefix) or the short display form
            pub fn matches(&self, identifier: &str) -> bool {
                let identifier = identifier.trim();
                match identifier.parse::<Self>() {
                    Ok(parsed) => parsed == *self,
                    Err(_) => identifier.eq_ignore_ascii_case(&self.to_string()),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let simple = self.0.simple().to_string();
                write!(f, "{}{}", Self::PREFIX, &simple[..SHORT_LEN])
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let bare = s.strip_prefix(Self::PREFIX).unwrap_or(s);
                Uuid::parse_str(bare).map(Self)
            }
        }
    };
}

define_id!(
    /// Budget version
    VersionId,
    "ver-"
);
define_id!(
    /// Line item within a version
    LineItemId,
    "li-"
);
define_id!(TransactionId, "txn-");
define_id!(
    /// Payroll entry (one person in one role)
    PayrollItemId,
    "pr-"
);
define_id!(PayPeriodId, "pp-");
define_id!(RateCardId, "rc-");
