//! Room configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{GameSettings, ValidationError};

/// Full room configuration: game rules plus the actor's timing knobs.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoomConfig {
    /// Blinds, stacks, seat count, reveal rules.
    pub settings: GameSettings,

    /// How long the acting player has before a check/fold is applied for
    /// them.
    #[serde(with = "duration_secs")]
    pub action_timeout: Duration,

    /// Pause between a hand settling and the next hand being dealt.
    #[serde(with = "duration_secs")]
    pub auto_advance_delay: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            settings: GameSettings::default(),
            action_timeout: Duration::from_secs(30),
            auto_advance_delay: Duration::from_secs(5),
        }
    }
}

impl RoomConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.settings
            .validate()
            .map_err(ValidationError::InvalidAction)?;
        if self.action_timeout.is_zero() {
            return Err(ValidationError::InvalidAction(
                "action timeout must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

/// Durations serialize as whole seconds so configs stay hand-editable.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        value.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
