//! Normalization of raw MIDI messages into key events.
//!
//! Only the two channel-1 key messages are recognized: `0x90` (note on) and
//! `0x80` (note off). Everything else a device sends (clock, control change,
//! sysex, other channels) is dropped.

use serde::{Deserialize, Serialize};

pub const NOTE_ON_STATUS: u8 = 144;
pub const NOTE_OFF_STATUS: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    NoteOn,
    NoteOff,
}

impl EventKind {
    pub fn from_status(status: u8) -> Option<Self> {
        match status {
            NOTE_ON_STATUS => Some(EventKind::NoteOn),
            NOTE_OFF_STATUS => Some(EventKind::NoteOff),
            _ => None,
        }
    }
}

/// A key press or release from the performer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub kind: EventKind,
    /// MIDI note number as sent by the device.
    pub pitch: u8,
    /// Forwarded for display only; matching ignores it.
    pub velocity: u8,
    /// Arrival time in milliseconds.
    pub timestamp: f64,
}

impl NoteEvent {
    pub fn note_on(pitch: u8, timestamp: f64) -> Self {
        Self {
            kind: EventKind::NoteOn,
            pitch,
            velocity: 64,
            timestamp,
        }
    }

    pub fn note_off(pitch: u8, timestamp: f64) -> Self {
        Self {
            kind: EventKind::NoteOff,
            pitch,
            velocity: 0,
            timestamp,
        }
    }

    /// Interpret a raw message: a status byte followed by pitch and velocity.
    ///
    /// A missing velocity byte reads as zero; a missing pitch drops the message.
    ///
    /// # Example
    /// ```
    /// use notesy::{EventKind, NoteEvent};
    ///
    /// let event = NoteEvent::from_bytes(&[144, 60, 100], 12.0).unwrap();
    /// assert_eq!(event.kind, EventKind::NoteOn);
    /// assert_eq!(event.pitch, 60);
    ///
    /// // Control change is not a key event
    /// assert!(NoteEvent::from_bytes(&[176, 64, 127], 12.0).is_none());
    /// ```
    pub fn from_bytes(data: &[u8], timestamp: f64) -> Option<Self> {
        let (&status, payload) = data.split_first()?;
        let kind = EventKind::from_status(status)?;
        let (pitch, velocity) = match payload {
            [pitch, velocity, ..] => (*pitch, *velocity),
            [pitch] => (*pitch, 0),
            [] => return None,
        };
        Some(Self {
            kind,
            pitch,
            velocity,
            timestamp: timestamp.floor(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_off_message() {
        let event = NoteEvent::from_bytes(&[128, 62, 40], 99.7).unwrap();
        assert_eq!(event.kind, EventKind::NoteOff);
        assert_eq!(event.pitch, 62);
        assert_eq!(event.velocity, 40);
        assert_eq!(event.timestamp, 99.0);
    }

    #[test]
    fn test_other_statuses_are_dropped() {
        // note on channel 2, aftertouch, pitch bend, clock
        for status in [145, 160, 224, 248] {
            assert!(NoteEvent::from_bytes(&[status, 60, 100], 0.0).is_none());
        }
    }

    #[test]
    fn test_truncated_messages() {
        assert!(NoteEvent::from_bytes(&[], 0.0).is_none());
        assert!(NoteEvent::from_bytes(&[144], 0.0).is_none());

        let event = NoteEvent::from_bytes(&[144, 60], 0.0).unwrap();
        assert_eq!((event.pitch, event.velocity), (60, 0));
    }
}
