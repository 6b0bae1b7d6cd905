//! From a `PresenceState` to what goes on the panel.
//!
//! Three lines at most, always starting with the headline.  Positions come from the `layout`
//! configuration block.
//!

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use proximity_display::{Background, TextLine};
use proximity_sources::PlaceKind;

use crate::PresenceState;

const DEF_X: i32 = 120;
const DEF_Y_FIRST: i32 = 20;
const DEF_Y_SECOND: i32 = 50;
const DEF_Y_THIRD: i32 = 80;
const DEF_HEADLINE: &str = "Mate is";

/// Text placement, the `layout` block of the configuration file.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Layout {
    /// Left edge of every line
    pub x: i32,
    /// Top of each line
    pub y_first: i32,
    pub y_second: i32,
    pub y_third: i32,
    /// First line, always there
    pub headline: String,
    /// Add "at <name>" for named places
    pub show_place_name: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            x: DEF_X,
            y_first: DEF_Y_FIRST,
            y_second: DEF_Y_SECOND,
            y_third: DEF_Y_THIRD,
            headline: DEF_HEADLINE.to_string(),
            show_place_name: true,
        }
    }
}

/// One frame worth of decisions.
///
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RenderCommand {
    pub background: Background,
    pub line1: String,
    pub line2: String,
    pub line3: Option<String>,
}

impl RenderCommand {
    /// Put each line where the layout says.
    ///
    pub fn lines(&self, layout: &Layout) -> Vec<TextLine> {
        let mut lines = vec![
            TextLine::new(&self.line1, layout.x, layout.y_first),
            TextLine::new(&self.line2, layout.x, layout.y_second),
        ];
        if let Some(line3) = &self.line3 {
            lines.push(TextLine::new(line3, layout.x, layout.y_third));
        }
        lines
    }
}

impl Display for RenderCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} / {}", self.background, self.line1, self.line2)?;
        if let Some(line3) = &self.line3 {
            write!(f, " / {line3}")?;
        }
        Ok(())
    }
}

/// Distance for humans: metres under 1 km, kilometres otherwise, never any decimal.
///
pub fn format_distance(km: f64) -> String {
    if km < 1. {
        format!("{:.0}m away", km * 1_000.)
    } else {
        format!("{:.0}km away", km)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Planner {
    layout: Layout,
}

impl Planner {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[tracing::instrument(skip(self))]
    pub fn plan(&self, state: &PresenceState) -> RenderCommand {
        let line1 = self.layout.headline.clone();
        let at_name = |name: &str| {
            if self.layout.show_place_name {
                Some(format!("at {name}"))
            } else {
                None
            }
        };

        let (background, line2, line3) = match state {
            PresenceState::AtHome => (Background::Home, "home".to_string(), None),
            PresenceState::AtNamedPlace { name, kind } => {
                let line2 = match kind {
                    PlaceKind::Other => format!("in {name}"),
                    _ => "at work".to_string(),
                };
                (Background::Work, line2, at_name(name))
            }
            PresenceState::Away(d) => (Background::Away, format_distance(*d), None),
        };

        RenderCommand {
            background,
            line1,
            line2,
            line3,
        }
    }
}
