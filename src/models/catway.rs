//! Represents a catway — a numbered mooring berth, the bookable resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Size category of a catway. Fixed vocabulary, stored lowercase.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CatwayCategory {
    Small,
    Medium,
    Large,
}

impl CatwayCategory {
    /// Parse a category from its wire form. Returns `None` for anything
    /// outside the fixed vocabulary.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for CatwayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative state of a catway. Only field that may change after
/// creation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CatwayStatus {
    Free,
    Occupied,
    Unavailable,
}

impl CatwayStatus {
    /// Parse a status from its wire form. Returns `None` for anything
    /// outside the fixed vocabulary.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "free" => Some(Self::Free),
            "occupied" => Some(Self::Occupied),
            "unavailable" => Some(Self::Unavailable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Occupied => "occupied",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for CatwayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mooring berth.
///
/// The number is the natural key: positive, globally unique, and immutable
/// after creation. Reservations reference catways by this number.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Catway {
    /// Berth number, the natural key.
    pub number: i64,

    /// Size category, immutable after creation.
    pub category: CatwayCategory,

    /// Current administrative state.
    pub status: CatwayStatus,

    /// When this catway was registered.
    pub created_at: DateTime<Utc>,

    /// When this catway was last modified.
    pub updated_at: DateTime<Utc>,
}
