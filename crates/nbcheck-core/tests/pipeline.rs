//! End-to-end checks of the notebook pipeline against temporary notebooks

use std::fs;
use std::path::PathBuf;

use nbcheck_core::check::run_check;
use nbcheck_core::config::{CheckConfig, REQUIRED_KEYS};
use nbcheck_core::error::NbError;
use nbcheck_core::literal::Value;
use nbcheck_core::locate::MatchPolicy;
use serde_json::json;
use tempfile::TempDir;

const SPEAKER_A: &str =
    r#"predefined_speakers = [{"speaker":"A","personality":"calm","accent":"US","voice":"v1"}]"#;

fn code(source: &str) -> serde_json::Value {
    json!({"cell_type": "code", "metadata": {}, "outputs": [], "source": [source]})
}

fn markdown(source: &str) -> serde_json::Value {
    json!({"cell_type": "markdown", "metadata": {}, "source": [source]})
}

fn write_notebook(dir: &TempDir, cells: Vec<serde_json::Value>) -> PathBuf {
    let path = dir.path().join("podcasts_with_gpt4o.ipynb");
    let doc = json!({"cells": cells, "metadata": {}, "nbformat": 4, "nbformat_minor": 5});
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    path
}

fn check(cells: Vec<serde_json::Value>) -> Result<nbcheck_core::check::CheckReport, NbError> {
    let dir = TempDir::new().unwrap();
    let path = write_notebook(&dir, cells);
    run_check(&CheckConfig::for_notebook(path))
}

#[test]
fn test_single_complete_speaker_passes() {
    let report = check(vec![code(SPEAKER_A)]).unwrap();
    assert_eq!(report.cell_index, 0);
    assert_eq!(report.cells_scanned, 1);
    assert_eq!(report.speakers.len(), 1);
    assert_eq!(
        report.speakers[0].speaker(),
        Some(&Value::Str("A".to_string()))
    );
}

#[test]
fn test_empty_list_is_rejected() {
    let err = check(vec![code("predefined_speakers = []")]).unwrap_err();
    assert!(matches!(err, NbError::EmptyList { .. }));
    assert_eq!(err.to_string(), "predefined_speakers list is empty");
}

#[test]
fn test_marker_only_in_markdown_is_not_found() {
    let err = check(vec![markdown(SPEAKER_A), code("speakers = []")]).unwrap_err();
    assert_eq!(err.to_string(), "Could not find predefined_speakers cell");
}

#[test]
fn test_first_missing_key_is_reported() {
    let err = check(vec![code(r#"predefined_speakers = [{"speaker":"A"}]"#)]).unwrap_err();
    match err {
        NbError::MissingKey { index, key, .. } => {
            assert_eq!(index, 0);
            assert_eq!(key, "personality");
        }
        other => panic!("expected missing key, got {other:?}"),
    }
}

#[test]
fn test_function_call_value_is_unsafe_literal() {
    let err = check(vec![code("predefined_speakers = get_speakers()\n# predefined_speakers = [")])
        .unwrap_err();
    assert!(matches!(err, NbError::UnsafeLiteral { .. }));
    assert!(!err.is_schema_violation());
}

#[test]
fn test_safety_call_is_never_treated_as_value() {
    let cell = "import os\npredefined_speakers = os.system(\"x\")  # predefined_speakers = [";
    let err = check(vec![code(cell)]).unwrap_err();
    assert!(err.to_string().contains("function call '.system()'"));
}

#[test]
fn test_first_match_policy_depends_on_order() {
    let good = code(SPEAKER_A);
    let empty = code("predefined_speakers = []");

    assert!(check(vec![good.clone(), empty.clone()]).is_ok());
    assert!(matches!(
        check(vec![empty, good]),
        Err(NbError::EmptyList { .. })
    ));
}

#[test]
fn test_check_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let path = write_notebook(&dir, vec![markdown("# Podcast"), code(SPEAKER_A)]);
    let config = CheckConfig::for_notebook(&path);

    let first = run_check(&config).unwrap();
    let second = run_check(&config).unwrap();
    assert_eq!(first.cell_index, second.cell_index);
    assert_eq!(first.speakers, second.speakers);
}

#[test]
fn test_every_speaker_has_required_keys() {
    let cell = r#"predefined_speakers = [
    {"speaker": "Nova", "personality": "warm host", "accent": "British", "voice": "nova", "pace": 1.1},
    {"speaker": "Onyx", "personality": "skeptical guest", "accent": "Australian", "voice": "onyx"},
    {"speaker": "Shimmer", "personality": "energetic", "accent": "Irish", "voice": "shimmer"},
]"#;
    let report = check(vec![code(cell)]).unwrap();
    assert_eq!(report.speakers.len(), 3);
    for speaker in &report.speakers {
        for key in REQUIRED_KEYS {
            assert!(speaker.get(key).is_some(), "missing {key}");
        }
    }
}

#[test]
fn test_source_as_single_string() {
    let cell = json!({"cell_type": "code", "source": SPEAKER_A});
    assert!(check(vec![cell]).is_ok());
}

#[test]
fn test_non_list_values_are_rejected() {
    let err = check(vec![code(
        r#"predefined_speakers = [{"speaker":"A","personality":"p","accent":"a","voice":"v"}][0], "#,
    )])
    .unwrap_err();
    // subscript is rejected before any shape check runs
    assert!(matches!(err, NbError::UnsafeLiteral { .. }));

    let err = check(vec![code(
        "predefined_speakers = [1]\npredefined_speakers = ({'speaker': 'A'},)",
    )])
    .unwrap_err();
    assert!(matches!(err, NbError::NotAList { ref found, .. } if found == "tuple"));
}

#[test]
fn test_integers_of_any_size_are_accepted() {
    let cell = r#"predefined_speakers = [{"speaker": "A", "personality": "calm", "accent": "US",
    "voice": "v1", "seed": 18446744073709551616, "n": -9223372036854775808}]"#;
    let report = check(vec![code(cell)]).unwrap();
    assert_eq!(report.speakers[0].field_text("seed"), "18446744073709551616");
    assert_eq!(report.speakers[0].field_text("n"), "-9223372036854775808");
}

#[test]
fn test_named_escape_elsewhere_in_cell_is_ignored() {
    let cell = format!("{}\nprint(\"Intro \\N{{EM DASH}} start\")", SPEAKER_A);
    assert!(check(vec![code(&cell)]).is_ok());
}

#[test]
fn test_cell_with_odd_cell_type_is_skipped() {
    let odd = json!({"cell_type": 5, "source": "predefined_speakers = []"});
    let report = check(vec![odd, code(SPEAKER_A)]).unwrap();
    assert_eq!(report.cell_index, 1);
}

#[test]
fn test_element_must_be_dict() {
    let err = check(vec![code("predefined_speakers = ['A', 'B']")]).unwrap_err();
    assert!(matches!(err, NbError::NotAMapping { index: 0, .. }));
}

#[test]
fn test_malformed_cell_is_syntax_error() {
    let err = check(vec![code("predefined_speakers = [\n  {'speaker': 'A',\n")]).unwrap_err();
    assert!(matches!(err, NbError::SourceSyntax { .. }));
}

#[test]
fn test_assignment_policy_skips_marker_in_comment() {
    let dir = TempDir::new().unwrap();
    let path = write_notebook(
        &dir,
        vec![
            code("# fill predefined_speakers = [ ... ] below\nx = 1"),
            code(SPEAKER_A),
        ],
    );

    let lenient = run_check(&CheckConfig::for_notebook(&path)).unwrap_err();
    assert!(matches!(lenient, NbError::AssignmentNotFound { .. }));

    let strict = CheckConfig {
        match_policy: MatchPolicy::Assignment,
        ..CheckConfig::for_notebook(&path)
    };
    assert_eq!(run_check(&strict).unwrap().cell_index, 1);
}

#[test]
fn test_missing_notebook_is_structural_error() {
    let dir = TempDir::new().unwrap();
    let err = run_check(&CheckConfig::for_notebook(dir.path().join("absent.ipynb"))).unwrap_err();
    assert!(matches!(err, NbError::NotebookRead { .. }));
}

#[test]
fn test_invalid_json_is_structural_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.ipynb");
    fs::write(&path, "{\"cells\": [").unwrap();
    let err = run_check(&CheckConfig::for_notebook(path)).unwrap_err();
    assert!(matches!(err, NbError::InvalidNotebook { .. }));
}
