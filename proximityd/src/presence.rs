//! Where is our mate?
//!

use std::fmt::{Display, Formatter};

use serde::Serialize;

use proximity_common::{distance, Coordinate};
use proximity_sources::{LocationSample, PlaceKind};

/// What the panel should convey.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum PresenceState {
    /// Tracker says we are in the place of kind `home`
    AtHome,
    /// Any other named place
    AtNamedPlace { name: String, kind: PlaceKind },
    /// Nowhere known, distance to home in km
    Away(f64),
}

impl Display for PresenceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PresenceState::AtHome => write!(f, "at home"),
            PresenceState::AtNamedPlace { name, kind } => write!(f, "at {name} ({kind})"),
            PresenceState::Away(d) => write!(f, "away, {d:.3} km from home"),
        }
    }
}

/// Named place first, home kind wins, distance only when nothing is known.
///
#[tracing::instrument]
pub fn classify(sample: &LocationSample, home: Coordinate) -> PresenceState {
    match &sample.place {
        Some(place) if place.kind == PlaceKind::Home => PresenceState::AtHome,
        Some(place) => PresenceState::AtNamedPlace {
            name: place.name.clone(),
            kind: place.kind,
        },
        None => PresenceState::Away(distance(sample.position, home)),
    }
}
