//! # Error Types
//!
//! Every fallible operation in the trainer returns [`NotesyError`].
//!
//! ## Error Types
//! - `ConfigError` - Options or generator configuration that is invalid on its face
//! - `GenerationError` - A configuration the generator could not satisfy within its attempt cap
//! - `NotationError` - A note or duration with no ABC spelling, or an unreadable ABC token
//! - `SequenceError` - A sequence handed to the matcher that breaks a cluster invariant
//!
//! Malformed MIDI input is not an error: unrecognized messages are filtered out
//! by [`NoteEvent::from_bytes`](crate::midi::NoteEvent::from_bytes).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotesyError {
    /// Invalid options or generator configuration.
    ///
    /// # Example
    /// ```
    /// # use notesy::NotesyError;
    /// let err = NotesyError::ConfigError("voices must be between 1 and 3".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: voices must be between 1 and 3");
    /// ```
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A rejection-sampling loop ran out of attempts.
    ///
    /// # Example
    /// ```
    /// # use notesy::NotesyError;
    /// let err = NotesyError::GenerationError {
    ///     attempts: 100,
    ///     message: "no allowed duration fits the measure".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Ungenerable configuration after 100 attempts: no allowed duration fits the measure"
    /// );
    /// ```
    #[error("Ungenerable configuration after {attempts} attempts: {message}")]
    GenerationError { attempts: u32, message: String },

    /// Notation encoding or decoding failure.
    #[error("Notation error: {0}")]
    NotationError(String),

    /// A cluster in a sequence violates a matching invariant.
    #[error("Sequence error at cluster {cluster}: {message}")]
    SequenceError { cluster: usize, message: String },
}
