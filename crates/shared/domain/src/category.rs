use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Top-level failure taxonomy shared by the classifier, journal and presentation layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorCategory {
    Network,
    Payment,
    Auth,
    Validation,
    System,
}

impl ErrorCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
