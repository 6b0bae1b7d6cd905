//! What we get back from a source: a position and maybe a named place.
//!

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use proximity_common::Coordinate;

/// Kind of named place, as tagged by the tracking server.
///
/// Anything the server sends that we do not know about is `Other`.
///
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum::Display, strum::EnumString,
)]
#[serde(from = "String", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlaceKind {
    Home,
    Work,
    Other,
}

impl From<String> for PlaceKind {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(PlaceKind::Other)
    }
}

/// Named place the sample falls into.
///
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlaceMetadata {
    pub name: String,
    pub kind: PlaceKind,
}

impl PlaceMetadata {
    pub fn new(name: &str, kind: PlaceKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
        }
    }
}

/// One observation from a source.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LocationSample {
    pub position: Coordinate,
    pub place: Option<PlaceMetadata>,
}

impl LocationSample {
    pub fn new(position: Coordinate, place: Option<PlaceMetadata>) -> Self {
        Self { position, place }
    }

    /// Placeholder used before anything has been displayed: (0, 0), no place.
    ///
    pub fn sentinel() -> Self {
        Self::default()
    }

    /// Same position, exact comparison.
    ///
    #[inline]
    pub fn same_position(&self, other: &LocationSample) -> bool {
        self.position == other.position
    }

    /// Same position and same place identity (kind and name).
    ///
    #[inline]
    pub fn same_place(&self, other: &LocationSample) -> bool {
        self.same_position(other) && self.place == other.place
    }
}

impl Display for LocationSample {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.place {
            Some(place) => write!(f, "{} in {} ({})", self.position, place.name, place.kind),
            None => write!(f, "{}", self.position),
        }
    }
}
