// Integration tests for the folymarket application
// These tests drive the session loop through the line-command interface

use folymarket::cli::CliInterface;
use folymarket::*;
use std::io::Cursor;

fn run(mode: ScoringMode, input: &str) -> (Session, String) {
    let mut session = Session::new(mode);
    let mut interface = CliInterface::with_writer(Cursor::new(input.to_string()), Vec::new());
    session_loop(&mut session, &mut interface);
    let output = String::from_utf8(interface.into_writer()).unwrap();
    (session, output)
}

#[test]
fn test_weighted_session_end_to_end() {
    let input = "\
title 1 Will the bill pass?
var 1
label 1 1 Public support
set 1 1 80
var 1
label 1 2 Committee votes
set 1 2 40
generate
exit
";
    let (session, output) = run(ScoringMode::Weighted, input);

    let results = session.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Will the bill pass?");
    assert_eq!(results[0].yes, 60);
    assert_eq!(results[0].no, 40);
    assert_eq!(results[0].pressure, 120);
    assert!(output.contains("Will the bill pass?: Yes 60% / No 40% (pressure 120)"));
    assert!(output.contains("Exiting."));
}

#[test]
fn test_additive_session_matches_original_weights() {
    // Activating "Public pressure" (+10) moves even odds to 60/40.
    let input = "toggle 1 1 active\ngenerate\n";
    let (session, output) = run(ScoringMode::Additive, input);

    let outcome = &session.results()[0];
    assert_eq!(outcome.pressure, 10);
    assert_eq!(outcome.yes, 60);
    assert_eq!(outcome.no, 40);
    let rationale = outcome.rationale.unwrap();
    assert!(RATIONALES.contains(&rationale));
    assert!(output.contains(rationale));
}

#[test]
fn test_additive_all_presets_active() {
    let input = "toggle 1 1 active\ntoggle 1 2 active\ntoggle 1 3 active\ngenerate\n";
    let (session, _) = run(ScoringMode::Additive, input);
    assert_eq!(session.results()[0].pressure, 30);
    assert_eq!(session.results()[0].yes, 80);
}

#[test]
fn test_additive_added_variable_weight_is_editable() {
    let (session, _) = run(ScoringMode::Additive, "var 1\ngenerate\n");
    assert_eq!(session.results()[0].pressure, 50);
    assert_eq!(session.results()[0].yes, 99);

    let (session, output) = run(ScoringMode::Additive, "var 1\nset 1 4 5\ngenerate\n");
    assert_eq!(session.scenarios()[0].variables[3].value, 5);
    assert_eq!(session.results()[0].pressure, 5);
    assert_eq!(session.results()[0].yes, 55);
    assert!(output.contains("Yes 55% / No 45%"));
}

#[test]
fn test_pressure_mode_ignores_impactful_flag() {
    let input = "var 1\nset 1 1 90\ntoggle 1 1 impact\nvar 1\nset 1 2 10\ngenerate\n";
    let (session, _) = run(ScoringMode::Pressure, input);
    assert_eq!(session.results()[0].yes, 50);
    assert_eq!(session.results()[0].pressure, 100);
}

#[test]
fn test_weighted_mode_excludes_non_impactful() {
    let input = "var 1\nset 1 1 90\ntoggle 1 1 impact\nvar 1\nset 1 2 10\ngenerate\n";
    let (session, _) = run(ScoringMode::Weighted, input);
    assert_eq!(session.results()[0].yes, 10);
    assert_eq!(session.results()[0].pressure, 10);
}

#[test]
fn test_empty_contributing_set_is_even_odds() {
    let input = "var 1\ntoggle 1 1 pressure\ngenerate\n";
    let (session, _) = run(ScoringMode::Weighted, input);
    assert_eq!(session.results()[0].yes, 50);
    assert_eq!(session.results()[0].no, 50);
    assert_eq!(session.results()[0].pressure, 0);
}

#[test]
fn test_malformed_values_coerce_to_zero() {
    let input = "var 1\nset 1 1 lots\ngenerate\n";
    let (session, _) = run(ScoringMode::Weighted, input);
    assert_eq!(session.scenarios()[0].variables[0].value, 0);
    assert_eq!(session.results()[0].yes, 1);
    assert_eq!(session.results()[0].no, 99);
}

#[test]
fn test_values_clamped_to_slider_range() {
    let input = "var 1\nset 1 1 400\ngenerate\n";
    let (session, _) = run(ScoringMode::Weighted, input);
    assert_eq!(session.scenarios()[0].variables[0].value, 100);
    assert_eq!(session.results()[0].yes, 99);
}

#[test]
fn test_undo_after_clear_restores_everything() {
    let input = "\
title 1 Rain tomorrow
var 1
label 1 1 Clouds
set 1 1 70
clear
undo
generate
";
    let (session, output) = run(ScoringMode::Weighted, input);

    assert_eq!(session.scenarios().len(), 1);
    let scenario = &session.scenarios()[0];
    assert_eq!(scenario.title, "Rain tomorrow");
    assert_eq!(scenario.variables.len(), 1);
    assert_eq!(scenario.variables[0].label, "Clouds");
    assert_eq!(scenario.variables[0].value, 70);
    assert_eq!(session.results()[0].yes, 70);
    assert!(output.contains("No scenarios. Type 'add' to create one."));
    assert!(output.contains("Undone."));
}

#[test]
fn test_undo_reverses_one_add_per_push() {
    let input = "add\nadd\nundo\n";
    let (session, _) = run(ScoringMode::Weighted, input);
    assert_eq!(session.scenarios().len(), 2);
    assert_eq!(session.history_depth(), 1);
}

#[test]
fn test_undo_with_empty_history_changes_nothing() {
    let input = "title 1 Untouched\nundo\n";
    let (session, output) = run(ScoringMode::Weighted, input);
    assert_eq!(session.scenarios().len(), 1);
    assert_eq!(session.scenarios()[0].title, "Untouched");
    assert!(output.contains("Nothing to undo."));
}

#[test]
fn test_edits_are_not_undoable() {
    let input = "title 1 First\ntitle 1 Second\nundo\n";
    let (session, _) = run(ScoringMode::Weighted, input);
    assert_eq!(session.scenarios()[0].title, "Second");
}

#[test]
fn test_generate_discards_previous_results() {
    let input = "add\nadd\ngenerate\nclear\nadd\ngenerate\n";
    let (session, _) = run(ScoringMode::Weighted, input);
    assert_eq!(session.results().len(), 1);
}

#[test]
fn test_bad_commands_do_not_stop_the_loop() {
    let input = "\
bogus
var 9
toggle 1 1 pressure
set 1
var 1
generate
";
    let (session, output) = run(ScoringMode::Weighted, input);
    assert!(output.contains("invalid command: unknown command 'bogus'"));
    assert!(output.contains("Error: no scenario #9"));
    assert!(output.contains("Error: scenario #1 has no variable #1"));
    assert!(output.contains("invalid command: missing variable"));
    assert_eq!(session.scenarios()[0].variables.len(), 1);
    assert_eq!(session.results()[0].yes, 50);
}

#[test]
fn test_end_of_input_exits_cleanly() {
    let (session, output) = run(ScoringMode::Weighted, "add\n");
    assert_eq!(session.scenarios().len(), 2);
    assert!(output.ends_with("Exiting.\n"));
}

#[test]
fn test_show_lists_variables_with_flags() {
    let input = "var 1\nlabel 1 1 Polls\ntoggle 1 1 impact\nshow\n";
    let (_, output) = run(ScoringMode::Weighted, input);
    assert!(output.contains("Scenario 1: Scenario #1"));
    assert!(output.contains("  1. Polls = 50  [x] pressure  [ ] impactful"));
}

#[test]
fn test_results_invariants_over_many_scenarios() {
    let mut session = Session::new(ScoringMode::Weighted);
    for i in 0..10 {
        if i > 0 {
            session.add_scenario().unwrap();
        }
        for j in 0..=i {
            let v = session.add_variable(i).unwrap();
            session
                .set_value(i, v, &((i * 37 + j * 11) % 101).to_string())
                .unwrap();
            if j % 3 == 0 {
                session.toggle_flag(i, v, Flag::Impactful).unwrap();
            }
        }
    }
    session.generate();
    assert_eq!(session.results().len(), 10);
    for outcome in session.results() {
        assert!((1..=99).contains(&outcome.yes));
        assert_eq!(u16::from(outcome.yes) + u16::from(outcome.no), 100);
    }
}
