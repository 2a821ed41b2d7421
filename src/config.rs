//! # Configuration
//!
//! Two layers of configuration:
//! - [`GeneratorConfig`] - the exact parameters one passage is generated from
//! - [`TrainerOptions`] - the menu presets a player picks from, loaded from YAML
//!   (CLI) or JSON (browser)
//!
//! ## Options File
//! ```yaml
//! range: c4-a5
//! keys: common
//! durations: mixed
//! voices: 2
//! ```
//! Every field is optional; missing fields take the first menu choice.

use crate::error::NotesyError;
use crate::music::Key;
use serde::{Deserialize, Serialize};

/// Rejection-sampling cap used when a config doesn't name one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Widest window that stays inside the notated octaves (pitches 7 through 34).
pub const MAX_PITCH_RANGE: u32 = 28;

/// Parameters for generating one passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Number of diatonic steps in the playable window.
    pub pitch_range: u32,
    pub key: Key,
    /// Durations in beats. Repeated values weight the uniform draw.
    pub durations: Vec<f64>,
    pub max_voices: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl GeneratorConfig {
    pub fn new(pitch_range: u32, key: Key, durations: Vec<f64>, max_voices: u32) -> Self {
        Self {
            pitch_range,
            key,
            durations,
            max_voices,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Reject configurations that are invalid regardless of random choices.
    pub fn validate(&self) -> Result<(), NotesyError> {
        if self.pitch_range < 1 {
            return Err(NotesyError::ConfigError(
                "pitch range must contain at least one pitch".to_string(),
            ));
        }
        if self.pitch_range > MAX_PITCH_RANGE {
            return Err(NotesyError::ConfigError(format!(
                "pitch range {} is wider than the {} notated steps",
                self.pitch_range, MAX_PITCH_RANGE
            )));
        }
        if self.durations.is_empty() {
            return Err(NotesyError::ConfigError(
                "at least one note duration is required".to_string(),
            ));
        }
        if let Some(d) = self.durations.iter().find(|d| !d.is_finite() || **d <= 0.0) {
            return Err(NotesyError::ConfigError(format!(
                "note duration {} is not a positive number of beats",
                d
            )));
        }
        if self.max_voices < 1 {
            return Err(NotesyError::ConfigError(
                "at least one voice is required".to_string(),
            ));
        }
        if self.max_attempts < 1 {
            return Err(NotesyError::ConfigError(
                "max attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Playable window presets, named by their lowest and highest note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangeOption {
    #[default]
    E4F5,
    C4A5,
    A3C6,
}

impl RangeOption {
    pub fn title(self) -> &'static str {
        match self {
            RangeOption::E4F5 => "E4-F5",
            RangeOption::C4A5 => "C4-A5",
            RangeOption::A3C6 => "A3-C6",
        }
    }

    pub fn size(self) -> u32 {
        match self {
            RangeOption::E4F5 => 9,
            RangeOption::C4A5 => 13,
            RangeOption::A3C6 => 17,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyPool {
    #[default]
    COnly,
    Common,
    All,
}

impl KeyPool {
    pub fn title(self) -> &'static str {
        match self {
            KeyPool::COnly => "C",
            KeyPool::Common => "F, C, G, D, A",
            KeyPool::All => "All keys",
        }
    }

    pub fn keys(self) -> &'static [Key] {
        match self {
            KeyPool::COnly => &[Key::C],
            KeyPool::Common => &[Key::F, Key::C, Key::G, Key::D, Key::A],
            KeyPool::All => &Key::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationSet {
    #[default]
    Quarters,
    Mixed,
    All,
}

impl DurationSet {
    pub fn title(self) -> &'static str {
        match self {
            DurationSet::Quarters => "1/4",
            DurationSet::Mixed => "1, 1/4, 1/2, 1/8",
            DurationSet::All => "All",
        }
    }

    pub fn durations(self) -> &'static [f64] {
        match self {
            DurationSet::Quarters => &[1.0],
            DurationSet::Mixed => &[0.5, 0.5, 1.0, 1.0, 1.0, 1.0, 2.0, 4.0],
            DurationSet::All => &[0.5, 0.5, 1.0, 1.0, 1.0, 1.0, 1.5, 2.0, 4.0],
        }
    }
}

/// The player's menu choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerOptions {
    pub range: RangeOption,
    pub keys: KeyPool,
    pub durations: DurationSet,
    pub voices: u32,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            range: RangeOption::default(),
            keys: KeyPool::default(),
            durations: DurationSet::default(),
            voices: 1,
        }
    }
}

impl TrainerOptions {
    pub const MAX_VOICES: u32 = 3;

    /// Parse options from a YAML document.
    ///
    /// # Example
    /// ```
    /// use notesy::{KeyPool, TrainerOptions};
    ///
    /// let options = TrainerOptions::from_yaml("keys: all\nvoices: 3\n").unwrap();
    /// assert_eq!(options.keys, KeyPool::All);
    /// assert_eq!(options.voices, 3);
    /// ```
    pub fn from_yaml(source: &str) -> Result<Self, NotesyError> {
        let options: TrainerOptions = serde_yaml::from_str(source)
            .map_err(|e| NotesyError::ConfigError(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), NotesyError> {
        if !(1..=Self::MAX_VOICES).contains(&self.voices) {
            return Err(NotesyError::ConfigError(format!(
                "voices must be between 1 and {}, got {}",
                Self::MAX_VOICES,
                self.voices
            )));
        }
        Ok(())
    }

    /// Generator parameters for a passage in `key`.
    pub fn generator_config(&self, key: Key) -> GeneratorConfig {
        GeneratorConfig::new(
            self.range.size(),
            key,
            self.durations.durations().to_vec(),
            self.voices,
        )
    }
}
