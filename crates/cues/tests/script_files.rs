//! Loading cue scripts from disk.

use cuesync_cues::{demo, lookup, CueScript, ScriptError, Speaker};
use std::io::Write;
use tempfile::NamedTempFile;

const LEGACY_SCRIPT: &str = r#"{
    "title": "legacy export",
    "cues": [
        {"id": "1", "speaker": "amelia", "start_time": 6.3, "end_time": 12.0,
         "chunks": [{"t": 6.3, "text": "Hello, my name is Amelia,"},
                    {"t": 8.0, "text": "and I'm with Enera Support."}]},
        {"id": "2", "speaker": "driver", "start_time": 13.0, "end_time": 27.0,
         "chunks": [{"t": 13.0, "text": "Hi, I'm trying to use the charger"}]}
    ],
    "status_triggers": [{"time": 12.0, "status": "Listening to driver"}],
    "steps": [{"id": "1", "label": "Call connected"}],
    "step_triggers": [{"step_id": "1", "activate_at": 6.3, "complete_at": 13.0}],
    "duration": 30.0
}"#;

#[test]
fn test_load_script_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(LEGACY_SCRIPT.as_bytes()).unwrap();

    let script = CueScript::from_path(file.path()).unwrap();
    assert_eq!(script.title.as_deref(), Some("legacy export"));
    assert_eq!(script.cues[0].speaker, Speaker::Agent);
    assert_eq!(script.duration, Some(30.0));
    assert_eq!(script.complete_at, None);
    assert!(script.validate().is_empty());

    assert_eq!(lookup::resolve_status(&script.status_triggers, 12.5), "Listening to driver");
    let (index, cue) = lookup::find_active_cue(&script.cues, 9.0).unwrap();
    assert_eq!(index, 0);
    assert_eq!(lookup::visible_chunks(cue, 9.0).len(), 2);
}

#[test]
fn test_missing_file_reports_path() {
    let result = CueScript::from_path(std::path::Path::new("/nonexistent/script.json"));
    match result {
        Err(ScriptError::ReadFile { path, .. }) => {
            assert!(path.ends_with("script.json"));
        }
        other => panic!("expected ReadFile error, got {other:?}"),
    }
}

#[test]
fn test_exported_demo_reloads_identically() {
    let script = demo::charger_support_call();
    let json = script.to_json_pretty().unwrap();
    let reloaded = CueScript::from_json_str(&json).unwrap();
    assert_eq!(reloaded, script);
}
