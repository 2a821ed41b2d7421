//! # Passage Generator
//!
//! Builds a [`Sequence`] of note clusters filling [`PIECE_LENGTH`] beats of 4/4.
//!
//! ## Algorithm
//! 1. The playable window is `size` diatonic steps centered on B4 (pitch 20)
//! 2. The first cluster draws a voice count biased toward 1 and samples that many
//!    distinct pitches from the window
//! 3. Every later cluster moves each voice of the previous cluster by -2..=+2 steps,
//!    and sometimes adds a fresh voice
//! 4. A cluster that would cross a barline is thrown away and redrawn from the
//!    same previous cluster
//!
//! Within a cluster no two pitches are more than an octave (7 steps) apart, and
//! every pitch carries its key's default accidental.
//!
//! ## Attempt Caps
//! Each rejection-sampling loop gives up after `max_attempts` tries and returns
//! [`NotesyError::GenerationError`] instead of spinning on an unsatisfiable config.

use crate::config::GeneratorConfig;
use crate::error::NotesyError;
use crate::music::{Key, Note, NoteCluster, Pitch, Sequence};
use crate::random::RandomSource;
use log::{debug, trace};
use std::collections::BTreeSet;

/// Length of every generated passage, in beats.
pub const PIECE_LENGTH: f64 = 32.0;

pub const BEATS_PER_MEASURE: f64 = 4.0;

/// Center of the playable window (B4).
pub const REFERENCE_PITCH: i32 = 20;

/// Widest allowed spread between two pitches of one cluster.
const MAX_SPREAD: i32 = 7;

/// Chance of adding a voice to a cluster that has room for one.
const NEW_VOICE_CHANCE: f64 = 0.2;

/// Exponent skewing the voice count toward one.
const VOICE_BIAS: f64 = 0.4;

/// The half-open window `[bottom, bottom + size)` of playable pitches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRange {
    bottom: i32,
    size: i32,
}

impl NoteRange {
    pub fn centered(size: u32) -> Self {
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        Self {
            bottom: REFERENCE_PITCH - (size - 1) / 2,
            size,
        }
    }

    pub fn bottom(&self) -> Pitch {
        Pitch(self.bottom)
    }

    /// Highest playable pitch (inclusive).
    pub fn top(&self) -> Pitch {
        Pitch(self.bottom + self.size - 1)
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        pitch.0 >= self.bottom && pitch.0 < self.bottom + self.size
    }

    pub fn random<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Pitch {
        Pitch(self.bottom + rng.below(self.size as usize) as i32)
    }
}

/// Whether `pitch` stays within an octave of every pitch already chosen.
fn within_spread(pitch: Pitch, chosen: &BTreeSet<Pitch>) -> bool {
    match (chosen.first(), chosen.last()) {
        (Some(lowest), Some(highest)) => {
            pitch.0 >= highest.0 - MAX_SPREAD && pitch.0 <= lowest.0 + MAX_SPREAD
        }
        _ => true,
    }
}

fn in_key_notes(pitches: &BTreeSet<Pitch>, key: Key) -> Vec<Note> {
    pitches.iter().map(|&p| Note::in_key(p, key)).collect()
}

/// Generate a passage for `config`.
///
/// # Example
/// ```
/// use notesy::{generate, GeneratorConfig, Key};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let config = GeneratorConfig::new(9, Key::C, vec![1.0], 1);
/// let sequence = generate(&config, &mut StdRng::seed_from_u64(1)).unwrap();
/// assert_eq!(sequence.len(), 32);
/// ```
pub fn generate<R: RandomSource + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Sequence, NotesyError> {
    config.validate()?;
    Generator::new(config).run(rng)
}

struct Generator<'a> {
    config: &'a GeneratorConfig,
    range: NoteRange,
}

impl<'a> Generator<'a> {
    fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            range: NoteRange::centered(config.pitch_range),
        }
    }

    fn run<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<Sequence, NotesyError> {
        let mut sequence = Sequence::default();
        let mut elapsed = 0.0;
        let mut previous: Option<NoteCluster> = None;

        while elapsed < PIECE_LENGTH {
            let room = BEATS_PER_MEASURE - elapsed % BEATS_PER_MEASURE;
            let cluster = self.fitting_cluster(previous.as_ref(), room, rng)?;
            elapsed += cluster.duration;
            sequence.push(cluster.clone());
            previous = Some(cluster);
        }

        debug!(
            "generated {} clusters in {} over {} beats",
            sequence.len(),
            self.config.key,
            elapsed
        );
        Ok(sequence)
    }

    /// Draw candidates until one fits in the `room` left in the current measure.
    fn fitting_cluster<R: RandomSource + ?Sized>(
        &self,
        previous: Option<&NoteCluster>,
        room: f64,
        rng: &mut R,
    ) -> Result<NoteCluster, NotesyError> {
        for _ in 0..self.config.max_attempts {
            let candidate = match previous {
                Some(prev) => self.next_cluster(prev, rng)?,
                None => self.first_cluster(rng)?,
            };
            if candidate.duration <= room {
                return Ok(candidate);
            }
            trace!(
                "rejected {}-beat cluster with {} beats left in the measure",
                candidate.duration,
                room
            );
        }

        Err(NotesyError::GenerationError {
            attempts: self.config.max_attempts,
            message: format!("no allowed duration fits the {} beats left in the measure", room),
        })
    }

    fn duration<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        // validate() guarantees durations is non-empty
        rng.choose(&self.config.durations).copied().unwrap_or(1.0)
    }

    fn voice_count<R: RandomSource + ?Sized>(&self, rng: &mut R) -> usize {
        let draw = rng.next_f64().powf(VOICE_BIAS) * self.config.max_voices as f64;
        (draw.ceil() as usize).max(1)
    }

    fn first_cluster<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<NoteCluster, NotesyError> {
        let voices = self.voice_count(rng);
        let mut pitches = BTreeSet::new();
        let mut attempts = 0;

        while pitches.len() < voices {
            if attempts == self.config.max_attempts {
                return Err(NotesyError::GenerationError {
                    attempts,
                    message: format!(
                        "could not place {} voices within an octave in a range of {}",
                        voices, self.config.pitch_range
                    ),
                });
            }
            attempts += 1;

            let pitch = self.range.random(rng);
            if within_spread(pitch, &pitches) {
                pitches.insert(pitch);
            }
        }

        Ok(NoteCluster::new(
            self.duration(rng),
            in_key_notes(&pitches, self.config.key),
        ))
    }

    fn next_cluster<R: RandomSource + ?Sized>(
        &self,
        previous: &NoteCluster,
        rng: &mut R,
    ) -> Result<NoteCluster, NotesyError> {
        let mut pitches = BTreeSet::new();

        for note in &previous.notes {
            match self.step_voice(note.pitch, &pitches, rng) {
                Some(pitch) => {
                    pitches.insert(pitch);
                }
                None => debug!("dropped voice at pitch {}", note.pitch.0),
            }
        }

        let has_room = pitches.len() < self.config.max_voices as usize;
        if pitches.is_empty() || (has_room && rng.next_f64() < NEW_VOICE_CHANCE) {
            let pitch = self.new_voice(&pitches, rng)?;
            pitches.insert(pitch);
        }

        Ok(NoteCluster::new(
            self.duration(rng),
            in_key_notes(&pitches, self.config.key),
        ))
    }

    /// Move one voice by up to two steps, staying in range and in spread.
    fn step_voice<R: RandomSource + ?Sized>(
        &self,
        from: Pitch,
        chosen: &BTreeSet<Pitch>,
        rng: &mut R,
    ) -> Option<Pitch> {
        (0..self.config.max_attempts)
            .map(|_| from.offset(rng.below(5) as i32 - 2))
            .find(|&p| self.range.contains(p) && within_spread(p, chosen))
    }

    fn new_voice<R: RandomSource + ?Sized>(
        &self,
        chosen: &BTreeSet<Pitch>,
        rng: &mut R,
    ) -> Result<Pitch, NotesyError> {
        (0..self.config.max_attempts)
            .map(|_| self.range.random(rng))
            .find(|&p| within_spread(p, chosen))
            .ok_or_else(|| NotesyError::GenerationError {
                attempts: self.config.max_attempts,
                message: "could not add a voice within an octave of the others".to_string(),
            })
    }
}
