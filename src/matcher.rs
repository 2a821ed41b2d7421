//! # Input Matcher
//!
//! Follows a performer through a [`Sequence`], one key event at a time.
//!
//! ## State
//! - `cursor` - index of the cluster the performer should play next
//! - `held` - MIDI notes currently down, as far as the matcher knows
//! - `total_presses` / `correct_presses` - counters for the final score
//!
//! ## Matching Rule
//! After every event the held set is compared with the cluster at the cursor.
//! When they are equal (no extra notes, none missing) the cursor advances and
//! the held set is cleared. Keys still physically down at that moment are
//! forgotten, so they have to be pressed again to count toward the next cluster.
//!
//! A release can complete a match: holding `{C, E}` against an expected `{C}`
//! and letting go of `E` advances the cursor.
//!
//! Once the cursor passes the last cluster the matcher is finished and ignores
//! every further event.

use crate::error::NotesyError;
use crate::midi::{EventKind, NoteEvent};
use crate::music::Sequence;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeSet;

/// What a single event did to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    /// The held set does not match; nothing advanced.
    Pending,
    /// The cursor moved to the next cluster.
    Advanced,
    /// The cursor moved past the last cluster; the session is over.
    Completed,
    /// The session was already over; the event was discarded.
    Ignored,
}

impl MatchOutcome {
    pub fn advanced(self) -> bool {
        matches!(self, MatchOutcome::Advanced | MatchOutcome::Completed)
    }

    pub fn completed(self) -> bool {
        self == MatchOutcome::Completed
    }
}

#[derive(Debug, Clone)]
pub struct Matcher {
    expected: Vec<BTreeSet<u8>>,
    cursor: usize,
    held: BTreeSet<u8>,
    total_presses: u32,
    correct_presses: u32,
    started_at: f64,
    finished_at: Option<f64>,
}

impl Matcher {
    /// Start matching `sequence`, with the session clock starting at `started_at` ms.
    ///
    /// Fails if any cluster is empty, leaves the MIDI range, or contains two
    /// notes on the same key.
    pub fn new(sequence: &Sequence, started_at: f64) -> Result<Self, NotesyError> {
        let expected = sequence
            .clusters()
            .iter()
            .enumerate()
            .map(|(i, cluster)| cluster.performable_pitches(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            expected,
            cursor: 0,
            held: BTreeSet::new(),
            total_presses: 0,
            correct_presses: 0,
            started_at,
            finished_at: if sequence.is_empty() { Some(started_at) } else { None },
        })
    }

    /// Apply one event and report whether the cursor moved.
    pub fn handle_event(&mut self, event: &NoteEvent) -> MatchOutcome {
        if self.is_finished() {
            return MatchOutcome::Ignored;
        }

        match event.kind {
            EventKind::NoteOn => {
                self.total_presses += 1;
                self.held.insert(event.pitch);
            }
            EventKind::NoteOff => {
                self.held.remove(&event.pitch);
            }
        }

        let expected = &self.expected[self.cursor];
        if self.held != *expected {
            return MatchOutcome::Pending;
        }

        self.correct_presses += expected.len() as u32;
        self.cursor += 1;
        self.held.clear();
        debug!("matched cluster {} of {}", self.cursor, self.expected.len());

        if self.cursor == self.expected.len() {
            self.finished_at = Some(event.timestamp);
            info!(
                "passage complete: {}/{} correct presses in {} ms",
                self.correct_presses,
                self.total_presses,
                event.timestamp - self.started_at
            );
            MatchOutcome::Completed
        } else {
            MatchOutcome::Advanced
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn held(&self) -> &BTreeSet<u8> {
        &self.held
    }

    /// MIDI notes the performer has to hold next, or `None` once finished.
    pub fn expected(&self) -> Option<&BTreeSet<u8>> {
        self.expected.get(self.cursor)
    }

    pub fn total_presses(&self) -> u32 {
        self.total_presses
    }

    pub fn correct_presses(&self) -> u32 {
        self.correct_presses
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<f64> {
        self.finished_at
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{Accidental, Note, NoteCluster, Pitch};

    fn single(pitch: i32) -> NoteCluster {
        NoteCluster::new(1.0, vec![Note::new(Pitch(pitch), Accidental::Natural)])
    }

    fn chord(pitches: &[i32]) -> NoteCluster {
        let notes = pitches
            .iter()
            .map(|&p| Note::new(Pitch(p), Accidental::Natural))
            .collect();
        NoteCluster::new(1.0, notes)
    }

    // Pitch 14 = C4 = 60, 16 = E4 = 64, 18 = G4 = 67, 15 = D4 = 62
    const C4: u8 = 60;
    const D4: u8 = 62;
    const E4: u8 = 64;
    const G4: u8 = 67;

    #[test]
    fn test_single_note_completes_session() {
        let sequence = Sequence::new(vec![single(0)]);
        let mut matcher = Matcher::new(&sequence, 1000.0).unwrap();

        let outcome = matcher.handle_event(&NoteEvent::note_on(36, 1500.0));
        assert_eq!(outcome, MatchOutcome::Completed);
        assert!(outcome.advanced() && outcome.completed());
        assert_eq!(matcher.cursor(), 1);
        assert_eq!(matcher.finished_at(), Some(1500.0));
        assert_eq!(matcher.expected(), None);
    }

    #[test]
    fn test_press_and_release_advances_once() {
        let sequence = Sequence::new(vec![single(14), single(14), single(15)]);
        let mut matcher = Matcher::new(&sequence, 0.0).unwrap();

        assert_eq!(matcher.handle_event(&NoteEvent::note_on(C4, 1.0)), MatchOutcome::Advanced);
        assert_eq!(matcher.handle_event(&NoteEvent::note_off(C4, 2.0)), MatchOutcome::Pending);
        assert_eq!(matcher.cursor(), 1);
        assert!(matcher.held().is_empty());
    }

    #[test]
    fn test_advancing_clears_held_notes() {
        let sequence = Sequence::new(vec![single(14), single(16)]);
        let mut matcher = Matcher::new(&sequence, 0.0).unwrap();

        matcher.handle_event(&NoteEvent::note_on(C4, 1.0));
        assert!(matcher.held().is_empty());
        // C4 is still physically down but no longer tracked
        assert_eq!(matcher.handle_event(&NoteEvent::note_on(E4, 2.0)), MatchOutcome::Completed);
    }

    #[test]
    fn test_superset_does_not_match_until_released() {
        let sequence = Sequence::new(vec![single(14), single(15)]);
        let mut matcher = Matcher::new(&sequence, 0.0).unwrap();

        assert_eq!(matcher.handle_event(&NoteEvent::note_on(G4, 1.0)), MatchOutcome::Pending);
        assert_eq!(matcher.handle_event(&NoteEvent::note_on(C4, 2.0)), MatchOutcome::Pending);
        assert_eq!(matcher.cursor(), 0);

        // Releasing the wrong note leaves exactly the expected one held
        assert_eq!(matcher.handle_event(&NoteEvent::note_off(G4, 3.0)), MatchOutcome::Advanced);
        assert_eq!(matcher.cursor(), 1);
        assert_eq!(matcher.total_presses(), 2);
        assert_eq!(matcher.correct_presses(), 1);
    }

    #[test]
    fn test_chord_builds_up_note_by_note() {
        let sequence = Sequence::new(vec![chord(&[14, 16, 18]), single(15)]);
        let mut matcher = Matcher::new(&sequence, 0.0).unwrap();

        assert_eq!(matcher.handle_event(&NoteEvent::note_on(G4, 1.0)), MatchOutcome::Pending);
        assert_eq!(matcher.handle_event(&NoteEvent::note_on(C4, 2.0)), MatchOutcome::Pending);
        assert_eq!(matcher.handle_event(&NoteEvent::note_on(E4, 3.0)), MatchOutcome::Advanced);
        assert_eq!(matcher.correct_presses(), 3);
        let next: BTreeSet<u8> = [D4].into_iter().collect();
        assert_eq!(matcher.expected(), Some(&next));
    }

    #[test]
    fn test_wrong_notes_count_as_presses() {
        let sequence = Sequence::new(vec![single(15)]);
        let mut matcher = Matcher::new(&sequence, 0.0).unwrap();

        matcher.handle_event(&NoteEvent::note_on(C4, 1.0));
        matcher.handle_event(&NoteEvent::note_off(C4, 2.0));
        matcher.handle_event(&NoteEvent::note_on(E4, 3.0));
        matcher.handle_event(&NoteEvent::note_off(E4, 4.0));
        assert_eq!(matcher.handle_event(&NoteEvent::note_on(D4, 5.0)), MatchOutcome::Completed);
        assert_eq!(matcher.total_presses(), 3);
        assert_eq!(matcher.correct_presses(), 1);
    }

    #[test]
    fn test_release_of_unheld_note_is_harmless() {
        let sequence = Sequence::new(vec![single(14)]);
        let mut matcher = Matcher::new(&sequence, 0.0).unwrap();

        assert_eq!(matcher.handle_event(&NoteEvent::note_off(D4, 1.0)), MatchOutcome::Pending);
        assert!(matcher.held().is_empty());
    }

    #[test]
    fn test_events_after_completion_are_ignored() {
        let sequence = Sequence::new(vec![single(14)]);
        let mut matcher = Matcher::new(&sequence, 0.0).unwrap();
        matcher.handle_event(&NoteEvent::note_on(C4, 10.0));

        assert_eq!(matcher.handle_event(&NoteEvent::note_on(D4, 20.0)), MatchOutcome::Ignored);
        assert_eq!(matcher.total_presses(), 1);
        assert_eq!(matcher.finished_at(), Some(10.0));
        assert!(matcher.held().is_empty());
    }

    #[test]
    fn test_invalid_sequence_is_rejected() {
        let sequence = Sequence::new(vec![single(14), chord(&[])]);
        let err = Matcher::new(&sequence, 0.0).unwrap_err();
        assert!(matches!(err, NotesyError::SequenceError { cluster: 1, .. }));
    }
}
