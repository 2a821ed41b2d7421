//! # Training Sessions
//!
//! A [`Session`] is one pass through one generated passage. A [`Trainer`]
//! owns the player's options and the random source, and replaces its session
//! on every restart.
//!
//! ## Lifecycle
//! ```text
//! Trainer::new ──► restart ──► Session (key + sequence + matcher)
//!                    ▲              │ handle_event / handle_raw
//!                    │              ▼
//!              set_options     cursor advances ... Completed ──► summary()
//! ```
//! Restarting discards the running session outright; nothing carries over.
//!
//! Timestamps are milliseconds from whatever clock the caller uses, as long
//! as restart times and event timestamps share it.

use crate::abc::to_abc;
use crate::config::{GeneratorConfig, TrainerOptions};
use crate::error::NotesyError;
use crate::generator::generate;
use crate::matcher::{MatchOutcome, Matcher};
use crate::midi::NoteEvent;
use crate::music::{Key, Sequence};
use crate::random::RandomSource;
use crate::score::Summary;
use log::info;

#[derive(Debug, Clone)]
pub struct Session {
    key: Key,
    sequence: Sequence,
    matcher: Matcher,
}

impl Session {
    /// Generate a passage for `config` and start matching at `started_at`.
    pub fn start<R: RandomSource + ?Sized>(
        config: &GeneratorConfig,
        rng: &mut R,
        started_at: f64,
    ) -> Result<Self, NotesyError> {
        let sequence = generate(config, rng)?;
        Self::from_sequence(config.key, sequence, started_at)
    }

    /// Start matching a prepared passage.
    pub fn from_sequence(
        key: Key,
        sequence: Sequence,
        started_at: f64,
    ) -> Result<Self, NotesyError> {
        let matcher = Matcher::new(&sequence, started_at)?;
        Ok(Self {
            key,
            sequence,
            matcher,
        })
    }

    pub fn handle_event(&mut self, event: &NoteEvent) -> MatchOutcome {
        self.matcher.handle_event(event)
    }

    /// Feed a raw MIDI message. Returns `None` for messages that aren't key events.
    pub fn handle_raw(&mut self, data: &[u8], timestamp: f64) -> Option<MatchOutcome> {
        let event = NoteEvent::from_bytes(data, timestamp)?;
        Some(self.handle_event(&event))
    }

    /// ABC notation for the passage, with the cursor marked while in progress.
    pub fn notation(&self) -> Result<String, NotesyError> {
        let cursor = if self.matcher.is_finished() {
            None
        } else {
            Some(self.matcher.cursor())
        };
        to_abc(&self.sequence, self.key, cursor)
    }

    pub fn summary(&self) -> Option<Summary> {
        Summary::from_matcher(&self.matcher)
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn is_finished(&self) -> bool {
        self.matcher.is_finished()
    }
}

pub struct Trainer<R> {
    options: TrainerOptions,
    rng: R,
    session: Session,
}

impl<R: RandomSource> Trainer<R> {
    /// Validate `options` and start the first session.
    pub fn new(options: TrainerOptions, mut rng: R, now: f64) -> Result<Self, NotesyError> {
        options.validate()?;
        let session = Self::fresh_session(&options, &mut rng, now)?;
        Ok(Self {
            options,
            rng,
            session,
        })
    }

    fn fresh_session(
        options: &TrainerOptions,
        rng: &mut R,
        now: f64,
    ) -> Result<Session, NotesyError> {
        let key = rng
            .choose(options.keys.keys())
            .copied()
            .ok_or_else(|| NotesyError::ConfigError("key pool is empty".to_string()))?;
        let session = Session::start(&options.generator_config(key), rng, now)?;
        info!(
            "new passage in {}: {} clusters, range {}, up to {} voices",
            key,
            session.sequence.len(),
            options.range.title(),
            options.voices
        );
        Ok(session)
    }

    /// Throw away the current session and generate a new passage.
    ///
    /// On error the previous session is kept.
    pub fn restart(&mut self, now: f64) -> Result<(), NotesyError> {
        self.session = Self::fresh_session(&self.options, &mut self.rng, now)?;
        Ok(())
    }

    /// Change options and restart.
    pub fn set_options(&mut self, options: TrainerOptions, now: f64) -> Result<(), NotesyError> {
        options.validate()?;
        self.session = Self::fresh_session(&options, &mut self.rng, now)?;
        self.options = options;
        Ok(())
    }

    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
