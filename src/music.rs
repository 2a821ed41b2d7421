//! # Music Model
//!
//! Types shared by the generator, the matcher and the ABC encoder.
//!
//! ## Type Hierarchy
//! ```text
//! Sequence
//!   └── Vec<NoteCluster>
//!         ├── duration: f64 (beats, quarter note = 1)
//!         └── Vec<Note>
//!               ├── pitch: Pitch (diatonic step index)
//!               └── accidental: Accidental (natural, sharp, flat)
//!
//! Key (Db Ab Eb Bb F C G D A E B)
//!   └── [Accidental; 7] per scale degree
//! ```
//!
//! ## Pitch System
//! - A `Pitch` counts diatonic steps, not semitones: `+1` is the next letter name
//! - Degree 0 is C, so `pitch % 7` indexes `C D E F G A B`
//! - Pitch 0 is C2, pitch 14 is middle C (C4), pitch 20 is B4
//! - Semitones only appear when a note is resolved with [`Note::performable`]

use crate::error::NotesyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Semitone offset of each scale degree above C.
pub const MAJOR_SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Letter names indexed by scale degree.
pub const NOTE_NAMES: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

/// A diatonic step index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pitch(pub i32);

impl Pitch {
    /// Scale degree class (0 = C ... 6 = B).
    pub fn degree(self) -> usize {
        self.0.rem_euclid(7) as usize
    }

    /// Number of whole diatonic octaves above pitch 0.
    pub fn octave(self) -> i32 {
        self.0.div_euclid(7)
    }

    pub fn offset(self, steps: i32) -> Pitch {
        Pitch(self.0 + steps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Semitone shift applied to the natural pitch.
    pub fn shift(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub accidental: Accidental,
}

impl Note {
    pub fn new(pitch: Pitch, accidental: Accidental) -> Self {
        Self { pitch, accidental }
    }

    /// A note carrying the accidental `key` assigns to its degree.
    pub fn in_key(pitch: Pitch, key: Key) -> Self {
        Self::new(pitch, key.accidental_for(pitch))
    }

    /// Resolve to the MIDI note number a keyboard sends for this note.
    ///
    /// Returns `None` when the result falls outside `0..=127`.
    ///
    /// # Example
    /// ```
    /// # use notesy::{Accidental, Note, Pitch};
    /// assert_eq!(Note::new(Pitch(14), Accidental::Natural).performable(), Some(60));
    /// assert_eq!(Note::new(Pitch(17), Accidental::Sharp).performable(), Some(66));
    /// ```
    pub fn performable(&self) -> Option<u8> {
        let octave = self.pitch.octave() + 3;
        let midi = octave * 12 + MAJOR_SCALE[self.pitch.degree()] + self.accidental.shift();
        u8::try_from(midi).ok().filter(|m| *m <= 127)
    }
}

/// One or more notes sounded together for a shared duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteCluster {
    pub duration: f64,
    pub notes: Vec<Note>,
}

impl NoteCluster {
    pub fn new(duration: f64, notes: Vec<Note>) -> Self {
        Self { duration, notes }
    }

    pub fn is_chord(&self) -> bool {
        self.notes.len() > 1
    }

    /// The set of MIDI numbers a performer must hold to play this cluster.
    ///
    /// `index` is only used to locate the cluster in error messages.
    pub fn performable_pitches(&self, index: usize) -> Result<BTreeSet<u8>, NotesyError> {
        if self.notes.is_empty() {
            return Err(NotesyError::SequenceError {
                cluster: index,
                message: "cluster has no notes".to_string(),
            });
        }

        let mut pitches = BTreeSet::new();
        for note in &self.notes {
            let midi = note.performable().ok_or_else(|| NotesyError::SequenceError {
                cluster: index,
                message: format!("pitch {} is outside the MIDI range", note.pitch.0),
            })?;
            if !pitches.insert(midi) {
                return Err(NotesyError::SequenceError {
                    cluster: index,
                    message: format!("MIDI note {} appears twice", midi),
                });
            }
        }
        Ok(pitches)
    }
}

/// An ordered passage of clusters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    clusters: Vec<NoteCluster>,
}

impl Sequence {
    pub fn new(clusters: Vec<NoteCluster>) -> Self {
        Self { clusters }
    }

    pub fn clusters(&self) -> &[NoteCluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn total_beats(&self) -> f64 {
        self.clusters.iter().map(|c| c.duration).sum()
    }

    pub(crate) fn push(&mut self, cluster: NoteCluster) {
        self.clusters.push(cluster);
    }
}

/// The keys a passage can be generated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Db,
    Ab,
    Eb,
    Bb,
    F,
    C,
    G,
    D,
    A,
    E,
    B,
}

impl Key {
    /// Every playable key, flattest first.
    pub const ALL: [Key; 11] = [
        Key::Db,
        Key::Ab,
        Key::Eb,
        Key::Bb,
        Key::F,
        Key::C,
        Key::G,
        Key::D,
        Key::A,
        Key::E,
        Key::B,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Key::Db => "Db",
            Key::Ab => "Ab",
            Key::Eb => "Eb",
            Key::Bb => "Bb",
            Key::F => "F",
            Key::C => "C",
            Key::G => "G",
            Key::D => "D",
            Key::A => "A",
            Key::E => "E",
            Key::B => "B",
        }
    }

    /// Parse a key name like "C" or "Bb".
    pub fn from_name(s: &str) -> Option<Self> {
        Key::ALL.iter().copied().find(|k| k.name() == s.trim())
    }

    /// Default accidental for each scale degree, C first.
    pub fn accidentals(self) -> [Accidental; 7] {
        use Accidental::{Flat as b, Natural as n, Sharp as s};
        match self {
            Key::Db => [n, b, b, n, b, b, b],
            Key::Ab => [n, b, b, n, n, b, b],
            Key::Eb => [n, n, b, n, n, b, b],
            Key::Bb => [n, n, b, n, n, n, b],
            Key::F => [n, n, n, n, n, n, b],
            Key::C => [n, n, n, n, n, n, n],
            Key::G => [n, n, n, s, n, n, n],
            Key::D => [s, n, n, s, n, n, n],
            Key::A => [s, n, n, s, s, n, n],
            Key::E => [s, s, n, s, s, n, n],
            Key::B => [s, s, n, s, s, s, n],
        }
    }

    pub fn accidental_for(self, pitch: Pitch) -> Accidental {
        self.accidentals()[pitch.degree()]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
