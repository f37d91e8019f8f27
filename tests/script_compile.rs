// tests/script_compile.rs

mod common;
use crate::common::builders::{play_line, takepic_line, utc, EventTableBuilder};
use crate::common::init_tracing;

use std::error::Error;

use chrono::TimeDelta;
use eclipse_sequencer::errors::{CompileError, ResolutionError};
use eclipse_sequencer::script::parser::MAX_LOOP_ITERATIONS;
use eclipse_sequencer::script::{compile_script, Command, LeafCommand};
use eclipse_sequencer::sequence::Action;
use eclipse_sequencer::types::LoopDirection;

type TestResult = Result<(), Box<dyn Error>>;

fn script(lines: &[String]) -> String {
    lines.join("\n")
}

#[test]
fn endfor_without_open_loop_is_rejected() {
    let text = script(&[takepic_line("C2", "+", "00:00", "1/1000", "a"), "ENDFOR".to_string()]);

    match compile_script(&text) {
        Err(CompileError::UnmatchedEndFor { line }) => assert_eq!(line, 2),
        other => panic!("expected UnmatchedEndFor, got {other:?}"),
    }
}

#[test]
fn nested_loops_are_rejected() {
    let text = script(&[
        "FOR,(VAR),0,10,50".to_string(),
        "FOR,(INTERVALOMETER),1,5,3".to_string(),
        "ENDFOR".to_string(),
    ]);

    match compile_script(&text) {
        Err(CompileError::NestedLoop { line }) => assert_eq!(line, 2),
        other => panic!("expected NestedLoop, got {other:?}"),
    }
}

#[test]
fn unknown_command_and_loop_kind_are_rejected() {
    match compile_script("SNAP,C2,+,00:00") {
        Err(CompileError::UnknownCommand { line, command }) => {
            assert_eq!(line, 1);
            assert_eq!(command, "SNAP");
        }
        other => panic!("expected UnknownCommand, got {other:?}"),
    }

    match compile_script("FOR,(WHILE),0,1,2") {
        Err(CompileError::UnknownCommand { command, .. }) => assert_eq!(command, "FOR (WHILE)"),
        other => panic!("expected UnknownCommand, got {other:?}"),
    }
}

#[test]
fn wrong_field_count_reports_arity() {
    match compile_script("TAKEPIC,C2,+,00:00") {
        Err(CompileError::Arity {
            line,
            command,
            expected,
            found,
        }) => {
            assert_eq!(line, 1);
            assert_eq!(command, "TAKEPIC");
            assert_eq!(expected, 12);
            assert_eq!(found, 3);
        }
        other => panic!("expected Arity, got {other:?}"),
    }
}

#[test]
fn malformed_fields_name_the_field() {
    let text = takepic_line("C2", "+", "00:00", "fast", "bad shutter");
    match compile_script(&text) {
        Err(CompileError::InvalidField { field, value, .. }) => {
            assert_eq!(field, "shutter");
            assert_eq!(value, "fast");
        }
        other => panic!("expected InvalidField, got {other:?}"),
    }

    match compile_script("FOR,(VAR),0,0,5") {
        Err(CompileError::InvalidField { field, .. }) => assert_eq!(field, "step"),
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[test]
fn comments_and_blank_lines_are_skipped_but_counted() {
    let text = script(&[
        "# totality plan".to_string(),
        String::new(),
        "ENDFOR".to_string(),
    ]);

    match compile_script(&text) {
        Err(CompileError::UnmatchedEndFor { line }) => assert_eq!(line, 3),
        other => panic!("expected UnmatchedEndFor, got {other:?}"),
    }
}

#[test]
fn leaves_inside_a_loop_are_not_top_level() -> TestResult {
    let text = script(&[
        "FOR,(INTERVALOMETER),1,5,3".to_string(),
        takepic_line("C2", "+", "00:00", "1/1000", "burst"),
        "ENDFOR".to_string(),
        play_line("C2", "+", "00:00", "totality.wav", "announce"),
    ]);

    let compiled = compile_script(&text)?;
    let commands = compiled.commands();
    assert_eq!(commands.len(), 2);

    match &commands[0] {
        Command::LoopByCount(lp) => {
            assert_eq!(lp.direction, LoopDirection::Forward);
            assert_eq!(lp.iterations, 3);
            assert_eq!(lp.children.len(), 1);
        }
        other => panic!("expected LoopByCount, got {other:?}"),
    }

    match &commands[1] {
        Command::Leaf(LeafCommand::Play(play)) => {
            assert_eq!(play.sound_file, "totality.mp3");
            assert_eq!(play.comment, "announce");
        }
        other => panic!("expected PLAY leaf, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unclosed_loop_is_closed_at_end_of_script() -> TestResult {
    init_tracing();
    let text = script(&[
        "FOR,(VAR),0,1,2".to_string(),
        takepic_line("MAGPRE 0", "+", "00:00", "1/500", "partial"),
    ]);

    let compiled = compile_script(&text)?;
    assert_eq!(compiled.commands().len(), 1);
    assert_eq!(compiled.commands()[0].children().len(), 1);
    Ok(())
}

#[test]
fn offsets_and_shutter_fractions_are_applied() -> TestResult {
    let events = EventTableBuilder::contacts().build();
    let text = script(&[
        takepic_line("C2", "-", "01:30", "1/250", "before"),
        takepic_line("C2", "+", "00:01:00.5", "2", "after"),
    ]);

    let sequence = compile_script(&text)?.generate_sequence(&events)?;
    let actions = sequence.actions();
    assert_eq!(actions.len(), 2);

    let c2 = utc("2024/04/08 18:00:00.0");
    assert_eq!(actions[0].time(), c2 - TimeDelta::seconds(90));
    assert_eq!(actions[1].time(), c2 + TimeDelta::milliseconds(60_500));

    match &actions[0] {
        Action::Capture(c) => {
            assert!((c.shutter_seconds - 0.004).abs() < 1e-12);
            assert_eq!(c.aperture, 8.0);
            assert_eq!(c.iso, 100);
        }
        other => panic!("expected capture, got {other:?}"),
    }
    Ok(())
}

#[test]
fn variable_loop_substitutes_magnitude_and_excludes_end() -> TestResult {
    let t0 = utc("2024/04/08 17:00:00.0");
    let t1 = utc("2024/04/08 18:00:00.0");
    let events = EventTableBuilder::contacts().pre(0.0, t0).pre(1.0, t1).build();

    let text = script(&[
        "FOR,(VAR),0,1,3".to_string(),
        takepic_line("MAGPRE 0", "+", "00:00", "1/1000", "Partial"),
        "ENDFOR".to_string(),
    ]);

    let sequence = compile_script(&text)?.generate_sequence(&events)?;
    let actions = sequence.actions();
    assert_eq!(actions.len(), 3);

    assert_eq!(actions[0].time(), t0);
    assert_eq!(actions[1].time(), t0 + TimeDelta::seconds(36));
    assert_eq!(actions[2].time(), t0 + TimeDelta::seconds(72));

    let comments: Vec<&str> = actions.iter().map(Action::comment).collect();
    assert_eq!(
        comments,
        vec![
            "Partial (Mag. 00.0%)",
            "Partial (Mag. 01.0%)",
            "Partial (Mag. 02.0%)"
        ]
    );
    Ok(())
}

#[test]
fn intervalometer_forward_steps_by_delay_and_tags_iterations() -> TestResult {
    let events = EventTableBuilder::contacts().build();
    let text = script(&[
        "FOR,(INTERVALOMETER),1,5,3".to_string(),
        takepic_line("C2", "+", "00:00", "1/1000", "Burst"),
        "ENDFOR".to_string(),
    ]);

    let sequence = compile_script(&text)?.generate_sequence(&events)?;
    let t = utc("2024/04/08 18:00:00.0");

    let times: Vec<_> = sequence.actions().iter().map(Action::time).collect();
    assert_eq!(
        times,
        vec![t, t + TimeDelta::seconds(5), t + TimeDelta::seconds(10)]
    );

    let comments: Vec<&str> = sequence.actions().iter().map(Action::comment).collect();
    assert_eq!(
        comments,
        vec!["Burst (iter. 001)", "Burst (iter. 002)", "Burst (iter. 003)"]
    );
    Ok(())
}

#[test]
fn intervalometer_backward_and_centisecond_truncation() -> TestResult {
    let events = EventTableBuilder::contacts().build();
    let c3 = utc("2024/04/08 18:04:00.0");

    let backward = script(&[
        "FOR,(INTERVALOMETER),0,2,2".to_string(),
        takepic_line("C3", "+", "00:00", "1/1000", "Back"),
        "ENDFOR".to_string(),
    ]);
    let sequence = compile_script(&backward)?.generate_sequence(&events)?;
    let times: Vec<_> = sequence.actions().iter().map(Action::time).collect();
    assert_eq!(times, vec![c3 - TimeDelta::seconds(2), c3]);

    let fractional = script(&[
        "FOR,(INTERVALOMETER),1,0.333,4".to_string(),
        takepic_line("C3", "+", "00:00", "1/1000", "Fast"),
        "ENDFOR".to_string(),
    ]);
    let sequence = compile_script(&fractional)?.generate_sequence(&events)?;
    let offsets: Vec<i64> = sequence
        .actions()
        .iter()
        .map(|a| (a.time() - c3).num_milliseconds())
        .collect();
    assert_eq!(offsets, vec![0, 330, 660, 990]);
    Ok(())
}

#[test]
fn unknown_event_fails_generation() -> TestResult {
    init_tracing();
    let events = EventTableBuilder::contacts().build();
    let text = takepic_line("C5", "+", "00:00", "1/1000", "nope");

    match compile_script(&text)?.generate_sequence(&events) {
        Err(ResolutionError::UnknownEvent(name)) => assert_eq!(name, "C5"),
        other => panic!("expected UnknownEvent, got {other:?}"),
    }
    Ok(())
}

#[test]
fn generated_sequence_is_sorted_across_commands() -> TestResult {
    let events = EventTableBuilder::contacts().build();
    let text = script(&[
        takepic_line("C4", "+", "00:00", "1/1000", "fourth"),
        play_line("C1", "+", "00:00", "first", "first"),
        takepic_line("MAX", "+", "00:00", "1", "max"),
    ]);

    let sequence = compile_script(&text)?.generate_sequence(&events)?;
    let comments: Vec<&str> = sequence.actions().iter().map(Action::comment).collect();
    assert_eq!(comments, vec!["first", "max", "fourth"]);
    Ok(())
}

#[test]
fn offset_beyond_the_calendar_fails_generation() -> TestResult {
    let events = EventTableBuilder::contacts().build();
    let text = takepic_line("C2", "+", "999999999999:00:00", "1/1000", "far");

    match compile_script(&text)?.generate_sequence(&events) {
        Err(ResolutionError::OutOfRange(event)) => assert_eq!(event, "C2"),
        other => panic!("expected OutOfRange, got {other:?}"),
    }
    Ok(())
}

#[test]
fn intervalometer_delay_beyond_the_calendar_fails_generation() -> TestResult {
    let events = EventTableBuilder::contacts().build();
    let text = script(&[
        "FOR,(INTERVALOMETER),1,1e300,2".to_string(),
        takepic_line("C2", "+", "00:00", "1/1000", "burst"),
        "ENDFOR".to_string(),
    ]);

    match compile_script(&text)?.generate_sequence(&events) {
        Err(ResolutionError::OutOfRange(event)) => assert_eq!(event, "C2"),
        other => panic!("expected OutOfRange, got {other:?}"),
    }
    Ok(())
}

#[test]
fn variable_loop_step_lost_in_rounding_is_rejected() {
    let text = script(&[
        "FOR,(VAR),1e17,1,2e17".to_string(),
        takepic_line("MAGPRE 0", "+", "00:00", "1/1000", "stuck"),
        "ENDFOR".to_string(),
    ]);

    match compile_script(&text) {
        Err(CompileError::InvalidField { line, field, .. }) => {
            assert_eq!(line, 1);
            assert_eq!(field, "step");
        }
        other => panic!("expected InvalidField on step, got {other:?}"),
    }
}

#[test]
fn loops_with_too_many_iterations_are_rejected() {
    match compile_script("FOR,(VAR),0,0.0001,100") {
        Err(CompileError::InvalidField { field, .. }) => assert_eq!(field, "step"),
        other => panic!("expected InvalidField on step, got {other:?}"),
    }

    let count = format!("FOR,(INTERVALOMETER),1,1,{}", MAX_LOOP_ITERATIONS + 1);
    match compile_script(&count) {
        Err(CompileError::InvalidField { field, .. }) => assert_eq!(field, "iterations"),
        other => panic!("expected InvalidField on iterations, got {other:?}"),
    }

    let at_limit = format!("FOR,(INTERVALOMETER),1,1,{MAX_LOOP_ITERATIONS}");
    assert!(compile_script(&at_limit).is_ok());
}
