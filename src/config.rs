use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use crate::error::{KickerError, Result};
use crate::model::Side;
use crate::normalize::team_display_name;
use crate::resolve::Rosters;

pub(crate) const BASE_URL: &str = "https://www.kicker.de";

const BUNDLED_TEAM_NAMES: &str = include_str!("../data/team_names.json");

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings consumed by the transport, the extractors and the orchestrator.
///
/// All durations are plain seconds so the struct can be loaded from the
/// settings file of the embedding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    /// Minimum pause between two requests, in seconds.
    pub request_delay_secs: f64,
    pub request_timeout_secs: f64,
    pub connect_timeout_secs: f64,
    pub user_agent: String,
    /// Side assigned to goals whose team cannot be determined.
    pub default_side: Side,
    pub team_names: TeamNames,
    pub rosters: Rosters,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            request_delay_secs: SpeedProfile::Standard.delay_secs(),
            request_timeout_secs: 30.0,
            connect_timeout_secs: 60.0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_side: Side::Home,
            team_names: TeamNames::bundled().unwrap_or_default(),
            rosters: Rosters::bundled().unwrap_or_default(),
        }
    }
}

impl ScraperConfig {
    pub fn with_speed_profile(mut self, profile: SpeedProfile) -> Self {
        self.request_delay_secs = profile.delay_secs();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay_secs = delay.as_secs_f64();
        self
    }

    pub fn with_timeouts(mut self, request: Duration, connect: Duration) -> Self {
        self.request_timeout_secs = request.as_secs_f64();
        self.connect_timeout_secs = connect.as_secs_f64();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.connect_timeout_secs)
    }

    /// Reject values the transport cannot work with.
    pub fn validate(&self) -> Result<()> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        if !positive(self.request_delay_secs) {
            return Err(KickerError::InvalidConfig(format!(
                "request delay must be > 0, got {}",
                self.request_delay_secs
            )));
        }
        if !positive(self.request_timeout_secs) || !positive(self.connect_timeout_secs) {
            return Err(KickerError::InvalidConfig(
                "timeouts must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Preset request delays.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SpeedProfile {
    VeryFast,
    Fast,
    #[default]
    Standard,
    Slow,
}

impl SpeedProfile {
    pub fn delay_secs(self) -> f64 {
        match self {
            SpeedProfile::VeryFast => 0.2,
            SpeedProfile::Fast => 0.5,
            SpeedProfile::Standard => 1.0,
            SpeedProfile::Slow => 2.0,
        }
    }
}

/// Mapping from URL slugs (`leverkusen`) to display names (`Bayer 04 Leverkusen`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamNames(HashMap<String, String>);

impl TeamNames {
    /// The table shipped in `data/team_names.json`.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_TEAM_NAMES)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, slug: impl Into<String>, name: impl Into<String>) {
        self.0.insert(slug.into().to_lowercase(), name.into());
    }

    /// Entry for exactly this slug.
    pub fn get(&self, slug: &str) -> Option<&str> {
        self.0.get(&slug.to_lowercase()).map(String::as_str)
    }

    /// See [`team_display_name`].
    pub fn display_name(&self, slug: &str) -> String {
        team_display_name(slug, self)
    }
}
