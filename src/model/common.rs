use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Which team a goal or player belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// How much a field value can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    /// Read from the page.
    Extracted,
    /// Every strategy failed; the value is a placeholder.
    Defaulted,
}

/// A value paired with the confidence of its extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub confidence: Confidence,
}

impl<T> Sourced<T> {
    pub fn extracted(value: T) -> Self {
        Self {
            value,
            confidence: Confidence::Extracted,
        }
    }

    pub fn defaulted(value: T) -> Self {
        Self {
            value,
            confidence: Confidence::Defaulted,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        self.confidence == Confidence::Defaulted
    }
}
