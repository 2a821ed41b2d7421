pub mod abc;
pub mod config;
pub mod error;
pub mod generator;
pub mod matcher;
pub mod midi;
pub mod music;
pub mod random;
pub mod score;
pub mod session;

pub use abc::{decode_note, encode_cluster, encode_note, to_abc};
pub use config::*;
pub use error::*;
pub use generator::{generate, NoteRange, BEATS_PER_MEASURE, PIECE_LENGTH};
pub use matcher::{MatchOutcome, Matcher};
pub use midi::{EventKind, NoteEvent};
pub use music::*;
pub use random::{RandomSource, ScriptedSource};
pub use score::Summary;
pub use session::{Session, Trainer};
