//! Integration tests for the trainer
//!
//! Drives generation, matching and notation together through the public API.

use notesy::{
    generate, to_abc, Accidental, DurationSet, GeneratorConfig, Key, KeyPool, MatchOutcome, Note,
    NoteCluster, NoteEvent, Pitch, RangeOption, Sequence, Session, Trainer, TrainerOptions,
    BEATS_PER_MEASURE, PIECE_LENGTH,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// Press every expected cluster cleanly, one beat apart, releasing in between.
fn play_perfectly(session: &mut Session, start: f64, beat_ms: f64) -> f64 {
    let mut now = start;
    while let Some(expected) = session.matcher().expected().cloned() {
        now += beat_ms;
        let mut last = MatchOutcome::Pending;
        for &pitch in &expected {
            last = session.handle_event(&NoteEvent::note_on(pitch, now));
        }
        assert!(last.advanced(), "full chord should advance");
        for &pitch in &expected {
            assert_eq!(
                session.handle_event(&NoteEvent::note_off(pitch, now + 1.0)),
                if session.is_finished() { MatchOutcome::Ignored } else { MatchOutcome::Pending }
            );
        }
    }
    now
}

#[test]
fn test_quarter_notes_in_c() {
    let config = GeneratorConfig::new(9, Key::C, vec![1.0], 1);
    let sequence = generate(&config, &mut StdRng::seed_from_u64(42)).unwrap();

    assert_eq!(sequence.len(), 32);
    for cluster in sequence.clusters() {
        assert_eq!(cluster.notes.len(), 1);
        assert_eq!(cluster.duration, 1.0);
        assert_eq!(cluster.notes[0].accidental, Accidental::Natural);
    }
}

#[test]
fn test_generated_passages_fill_exactly_and_respect_barlines() {
    for seed in 0..50 {
        let config = GeneratorConfig::new(17, Key::Eb, DurationSet::All.durations().to_vec(), 3);
        let sequence = generate(&config, &mut StdRng::seed_from_u64(seed)).unwrap();

        let mut elapsed = 0.0;
        for cluster in sequence.clusters() {
            assert!(cluster.duration <= BEATS_PER_MEASURE - elapsed % BEATS_PER_MEASURE);
            let unique: BTreeSet<u8> =
                cluster.notes.iter().filter_map(|n| n.performable()).collect();
            assert_eq!(unique.len(), cluster.notes.len());
            elapsed += cluster.duration;
        }
        assert_eq!(elapsed, PIECE_LENGTH);
        assert_eq!(sequence.total_beats(), PIECE_LENGTH);
    }
}

#[test]
fn test_generated_passages_always_render() {
    for keys in [KeyPool::COnly, KeyPool::Common, KeyPool::All] {
        for range in [RangeOption::E4F5, RangeOption::C4A5, RangeOption::A3C6] {
            let options = TrainerOptions {
                range,
                keys,
                durations: DurationSet::All,
                voices: 3,
            };
            let trainer = Trainer::new(options, StdRng::seed_from_u64(11), 0.0).unwrap();
            let abc = trainer.session().notation().unwrap();
            assert!(abc.starts_with("X:1\nT:Notesy\nM:4/4\nL:1/4\nK:"));
            assert_eq!(abc.matches("!wedge!").count(), 1);
            // 8 measures, 2 lines
            assert_eq!(abc.matches(" \n").count(), 2);
        }
    }
}

#[test]
fn test_single_cluster_session() {
    let sequence = Sequence::new(vec![NoteCluster::new(
        1.0,
        vec![Note::new(Pitch(0), Accidental::Natural)],
    )]);
    let mut session = Session::from_sequence(Key::C, sequence, 0.0).unwrap();

    let outcome = session.handle_event(&NoteEvent::note_on(36, 500.0));
    assert!(outcome.advanced());
    assert!(outcome.completed());
    assert_eq!(session.matcher().cursor(), 1);
    assert!(session.is_finished());
}

#[test]
fn test_extra_note_blocks_match_until_released() {
    let p = Note::new(Pitch(14), Accidental::Natural);
    let sequence = Sequence::new(vec![
        NoteCluster::new(1.0, vec![p]),
        NoteCluster::new(1.0, vec![Note::new(Pitch(15), Accidental::Natural)]),
    ]);
    let mut session = Session::from_sequence(Key::C, sequence, 0.0).unwrap();

    // Q lands first, then P: held {P, Q} is not {P}
    assert_eq!(session.handle_event(&NoteEvent::note_on(65, 1.0)), MatchOutcome::Pending);
    assert_eq!(session.handle_event(&NoteEvent::note_on(60, 2.0)), MatchOutcome::Pending);
    assert_eq!(session.matcher().cursor(), 0);

    assert_eq!(session.handle_event(&NoteEvent::note_off(65, 3.0)), MatchOutcome::Advanced);
    assert_eq!(session.matcher().cursor(), 1);
    assert!(session.matcher().held().is_empty());
}

#[test]
fn test_perfect_performance_scores() {
    let options = TrainerOptions {
        range: RangeOption::C4A5,
        keys: KeyPool::All,
        durations: DurationSet::Mixed,
        voices: 2,
    };
    let mut trainer = Trainer::new(options, StdRng::seed_from_u64(3), 1_000.0).unwrap();
    let finished = play_perfectly(trainer.session_mut(), 1_000.0, 500.0);

    let session = trainer.session();
    let summary = session.summary().unwrap();
    assert_eq!(summary.correct_presses, summary.total_presses);
    assert_eq!(summary.accuracy, 1.0);
    assert_eq!(summary.elapsed_ms, finished - 1_000.0);
    assert!(summary.score.is_some());

    // A finished session renders without a cursor
    assert!(!session.notation().unwrap().contains("!wedge!"));
}

#[test]
fn test_restart_gives_new_passage() {
    let mut trainer =
        Trainer::new(TrainerOptions::default(), StdRng::seed_from_u64(8), 0.0).unwrap();
    let first = trainer.session().sequence().clone();
    play_perfectly(trainer.session_mut(), 0.0, 400.0);
    assert!(trainer.session().is_finished());

    trainer.restart(20_000.0).unwrap();
    assert!(!trainer.session().is_finished());
    assert_eq!(trainer.session().matcher().cursor(), 0);
    assert_ne!(trainer.session().sequence(), &first);
}

#[test]
fn test_notation_matches_session_key() {
    let config = GeneratorConfig::new(13, Key::B, vec![1.0, 2.0], 2);
    let sequence = generate(&config, &mut StdRng::seed_from_u64(21)).unwrap();
    let abc = to_abc(&sequence, Key::B, None).unwrap();

    assert!(abc.contains("K:B\n"));
    // Generated notes are always in key, so no explicit accidentals appear
    let body = abc.split_once("K:B\n").unwrap().1;
    assert!(!body.contains('^') && !body.contains('_') && !body.contains('='));
}

#[test]
fn test_options_from_yaml_drive_the_trainer() {
    let options = TrainerOptions::from_yaml("range: a3-c6\nkeys: c-only\nvoices: 2\n").unwrap();
    let trainer = Trainer::new(options, StdRng::seed_from_u64(4), 0.0).unwrap();
    assert_eq!(trainer.session().key(), Key::C);
    for cluster in trainer.session().sequence().clusters() {
        assert!(cluster.notes.len() <= 2);
        for note in &cluster.notes {
            assert!((12..=28).contains(&note.pitch.0));
        }
    }
}
