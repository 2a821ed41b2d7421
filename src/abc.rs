//! # ABC Notation Output
//!
//! Renders a passage as ABC text for the sheet-music renderer.
//!
//! ## Layout
//! ```text
//! X:1
//! T:Notesy
//! M:4/4
//! L:1/4
//! K:G
//! |B A2 G|[DB]3/2 c/2 d2| ...
//! ```
//! - A `|` follows every full measure; a line break follows every four measures
//! - `!wedge!` marks the cluster the performer is on
//! - Chords are bracketed; each note in a chord carries the duration suffix
//!
//! ## Note Spelling
//! An accidental is written only when it differs from the key signature
//! (`^` sharp, `_` flat, `=` natural). Octaves are spelled relative to C:
//!
//! | `pitch / 7 + 2` | spelling |
//! |-----------------|----------|
//! | 3               | `C,`     |
//! | 4               | `C`      |
//! | 5               | `c`      |
//! | 6               | `c'`     |

use crate::error::NotesyError;
use crate::generator::BEATS_PER_MEASURE;
use crate::music::{Accidental, Key, Note, NoteCluster, Pitch, Sequence, NOTE_NAMES};

const CURSOR_MARKER: &str = "!wedge!";
const BEATS_PER_LINE: f64 = 16.0;

/// ABC duration suffixes, with the unit length set to one beat.
const DURATIONS: [(f64, &str); 6] = [
    (0.5, "/2"),
    (1.0, ""),
    (1.5, "3/2"),
    (2.0, "2"),
    (2.5, "5/2"),
    (4.0, "4"),
];

fn duration_suffix(duration: f64) -> Result<&'static str, NotesyError> {
    DURATIONS
        .iter()
        .find(|(beats, _)| *beats == duration)
        .map(|(_, suffix)| *suffix)
        .ok_or_else(|| {
            NotesyError::NotationError(format!("no ABC spelling for a {}-beat note", duration))
        })
}

fn accidental_glyph(accidental: Accidental) -> &'static str {
    match accidental {
        Accidental::Sharp => "^",
        Accidental::Flat => "_",
        Accidental::Natural => "=",
    }
}

fn octave_band(pitch: Pitch) -> i32 {
    pitch.octave() + 2
}

/// Spell one note (without duration) in `key`.
pub fn encode_note(note: &Note, key: Key) -> Result<String, NotesyError> {
    let mut out = String::new();

    if note.accidental != key.accidental_for(note.pitch) {
        out.push_str(accidental_glyph(note.accidental));
    }

    let name = NOTE_NAMES[note.pitch.degree()];
    match octave_band(note.pitch) {
        3 => {
            out.push(name);
            out.push(',');
        }
        4 => out.push(name),
        5 => out.push(name.to_ascii_lowercase()),
        6 => {
            out.push(name.to_ascii_lowercase());
            out.push('\'');
        }
        _ => {
            return Err(NotesyError::NotationError(format!(
                "pitch {} is outside the notated octaves",
                note.pitch.0
            )))
        }
    }

    Ok(out)
}

/// Spell one cluster: each note with its duration, bracketed if a chord.
///
/// # Example
/// ```
/// use notesy::{encode_cluster, Key, Note, NoteCluster, Pitch};
///
/// let chord = NoteCluster::new(2.0, vec![
///     Note::in_key(Pitch(14), Key::D),
///     Note::in_key(Pitch(21), Key::D),
/// ]);
/// assert_eq!(encode_cluster(&chord, Key::D).unwrap(), "[C2c2]");
/// ```
pub fn encode_cluster(cluster: &NoteCluster, key: Key) -> Result<String, NotesyError> {
    let suffix = duration_suffix(cluster.duration)?;
    let mut out = String::new();

    for note in &cluster.notes {
        out.push_str(&encode_note(note, key)?);
        out.push_str(suffix);
    }

    if cluster.is_chord() {
        out = format!("[{}]", out);
    }
    Ok(out)
}

/// Render a whole passage in `key`, marking the cluster at `cursor`.
///
/// Pass `None` (or an index past the end) to omit the marker.
pub fn to_abc(sequence: &Sequence, key: Key, cursor: Option<usize>) -> Result<String, NotesyError> {
    let mut abc = format!("X:1\nT:Notesy\nM:4/4\nL:1/4\nK:{}\n|", key);
    let mut elapsed = 0.0;

    for (i, cluster) in sequence.clusters().iter().enumerate() {
        if cursor == Some(i) {
            abc.push_str(CURSOR_MARKER);
        }
        abc.push_str(&encode_cluster(cluster, key)?);

        elapsed += cluster.duration;
        if elapsed % BEATS_PER_MEASURE == 0.0 {
            abc.push('|');
        }
        if elapsed % BEATS_PER_LINE == 0.0 {
            abc.push_str(" \n");
            if i + 1 < sequence.len() {
                abc.push('|');
            }
        }
    }

    Ok(abc)
}

/// Read back one note token produced by [`encode_note`] plus an optional duration suffix.
///
/// Returns the note and its duration in beats.
pub fn decode_note(token: &str, key: Key) -> Result<(Note, f64), NotesyError> {
    let bad = || NotesyError::NotationError(format!("cannot read note '{}'", token));

    let mut chars = token.chars().peekable();
    let accidental = match chars.peek() {
        Some('^') => Some(Accidental::Sharp),
        Some('_') => Some(Accidental::Flat),
        Some('=') => Some(Accidental::Natural),
        _ => None,
    };
    if accidental.is_some() {
        chars.next();
    }

    let letter = chars.next().ok_or_else(bad)?;
    let degree = NOTE_NAMES
        .iter()
        .position(|&n| n == letter.to_ascii_uppercase())
        .ok_or_else(bad)? as i32;

    let band = match (letter.is_ascii_uppercase(), chars.peek()) {
        (true, Some(',')) => {
            chars.next();
            3
        }
        (true, _) => 4,
        (false, Some('\'')) => {
            chars.next();
            6
        }
        (false, _) => 5,
    };

    let suffix: String = chars.collect();
    let duration = DURATIONS
        .iter()
        .find(|(_, s)| *s == suffix)
        .map(|(beats, _)| *beats)
        .ok_or_else(bad)?;

    let pitch = Pitch((band - 2) * 7 + degree);
    let accidental = accidental.unwrap_or_else(|| key.accidental_for(pitch));
    Ok((Note::new(pitch, accidental), duration))
}
