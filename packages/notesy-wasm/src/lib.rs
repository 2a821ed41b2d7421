use notesy::{
    DurationSet, KeyPool, MatchOutcome, NotesyError, RangeOption, Trainer, TrainerOptions,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct TrainerError {
    message: String,
    cluster: Option<usize>,
}

fn error_to_trainer_error(e: NotesyError) -> TrainerError {
    match e {
        NotesyError::SequenceError { cluster, message } => TrainerError {
            message,
            cluster: Some(cluster),
        },
        other => TrainerError {
            message: other.to_string(),
            cluster: None,
        },
    }
}

fn to_js_error(e: NotesyError) -> JsValue {
    JsValue::from_str(&to_json(&error_to_trainer_error(e)))
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

fn parse_options(options_json: &str) -> Result<TrainerOptions, NotesyError> {
    if options_json.trim().is_empty() {
        return Ok(TrainerOptions::default());
    }
    let options: TrainerOptions = serde_json::from_str(options_json)
        .map_err(|e| NotesyError::ConfigError(e.to_string()))?;
    options.validate()?;
    Ok(options)
}

#[derive(Serialize)]
struct EventReport {
    outcome: MatchOutcome,
    cursor: usize,
    held: Vec<u8>,
    velocity: u8,
}

#[derive(Serialize)]
struct MenuOption {
    title: &'static str,
    value: serde_json::Value,
}

#[derive(Serialize)]
struct MenuInfo {
    title: &'static str,
    field: &'static str,
    options: Vec<MenuOption>,
}

fn option<T: Serialize>(title: &'static str, value: T) -> MenuOption {
    MenuOption {
        title,
        value: serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
    }
}

fn menu_info() -> Vec<MenuInfo> {
    vec![
        MenuInfo {
            title: "Note Range",
            field: "range",
            options: [RangeOption::E4F5, RangeOption::C4A5, RangeOption::A3C6]
                .into_iter()
                .map(|r| option(r.title(), r))
                .collect(),
        },
        MenuInfo {
            title: "Available Keys",
            field: "keys",
            options: [KeyPool::COnly, KeyPool::Common, KeyPool::All]
                .into_iter()
                .map(|k| option(k.title(), k))
                .collect(),
        },
        MenuInfo {
            title: "Available Note Types",
            field: "durations",
            options: [DurationSet::Quarters, DurationSet::Mixed, DurationSet::All]
                .into_iter()
                .map(|d| option(d.title(), d))
                .collect(),
        },
        MenuInfo {
            title: "Maximum Voices",
            field: "voices",
            options: vec![option("1", 1), option("2", 2), option("3", 3)],
        },
    ]
}

const MIDI_ACCESS_HELP: &str = "Notesy can't gain access to your MIDI inputs right now. \
Make sure you are using Google Chrome and connecting to Notesy over an HTTPS connection.";

/// Message to show when the browser refuses MIDI access
#[wasm_bindgen]
pub fn midi_access_help() -> String {
    MIDI_ACCESS_HELP.to_string()
}

/// Options menu as JSON, for building the chooser widgets
#[wasm_bindgen]
pub fn menu() -> String {
    to_json(&menu_info())
}

/// A training session driven from the browser.
///
/// Timestamps are milliseconds; pass `performance.now()`-style values
/// consistently for restarts and MIDI messages.
#[wasm_bindgen]
pub struct WebTrainer {
    trainer: Trainer<StdRng>,
}

impl WebTrainer {
    fn build(options_json: &str, rng: StdRng, now: f64) -> Result<WebTrainer, NotesyError> {
        let options = parse_options(options_json)?;
        Ok(WebTrainer {
            trainer: Trainer::new(options, rng, now)?,
        })
    }
}

#[wasm_bindgen]
impl WebTrainer {
    /// Start a trainer from JSON options (empty string for defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: &str, now: f64) -> Result<WebTrainer, JsValue> {
        Self::build(options_json, StdRng::from_entropy(), now).map_err(to_js_error)
    }

    /// Start a trainer with a fixed seed, for reproducible passages
    pub fn with_seed(options_json: &str, seed: u32, now: f64) -> Result<WebTrainer, JsValue> {
        Self::build(options_json, StdRng::seed_from_u64(seed as u64), now).map_err(to_js_error)
    }

    pub fn restart(&mut self, now: f64) -> Result<(), JsValue> {
        self.trainer.restart(now).map_err(to_js_error)
    }

    pub fn set_options(&mut self, options_json: &str, now: f64) -> Result<(), JsValue> {
        let options = parse_options(options_json).map_err(to_js_error)?;
        self.trainer.set_options(options, now).map_err(to_js_error)
    }

    /// Feed a raw MIDI message. Returns a JSON report, or `null` for messages
    /// that aren't key presses or releases.
    pub fn on_midi_message(&mut self, data: &[u8], timestamp: f64) -> String {
        let velocity = data.get(2).copied().unwrap_or(0);
        let session = self.trainer.session_mut();
        match session.handle_raw(data, timestamp) {
            Some(outcome) => to_json(&EventReport {
                outcome,
                cursor: session.matcher().cursor(),
                held: session.matcher().held().iter().copied().collect(),
                velocity,
            }),
            None => "null".to_string(),
        }
    }

    /// ABC notation for the current passage
    pub fn notation(&self) -> Result<String, JsValue> {
        self.trainer.session().notation().map_err(to_js_error)
    }

    /// JSON results once the passage is complete, otherwise `null`
    pub fn summary(&self) -> String {
        match self.trainer.session().summary() {
            Some(summary) => to_json(&summary),
            None => "null".to_string(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.trainer.session().is_finished()
    }

    pub fn key(&self) -> String {
        self.trainer.session().key().to_string()
    }

    pub fn options(&self) -> String {
        to_json(self.trainer.options())
    }
}
