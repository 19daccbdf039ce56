//! Flight-event tags and the trigger tags parachutes match against.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTag {
    None,
    Liftoff,
    Burnout,
    Apogee,
    ParachuteDeploy,
    Land,
}

impl EventTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTag::None => "None",
            EventTag::Liftoff => "Liftoff",
            EventTag::Burnout => "Burnout",
            EventTag::Apogee => "Apogee",
            EventTag::ParachuteDeploy => "ParachuteDeploy",
            EventTag::Land => "Land",
        }
    }
}

impl Default for EventTag {
    fn default() -> Self {
        EventTag::None
    }
}
