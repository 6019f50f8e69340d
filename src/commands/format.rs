//! Shared output helpers for the records format

use nbcheck_core::format::escape_quotes;
use nbcheck_core::schema::SpeakerConfig;

/// Header line for records output
pub fn records_header(mode: &str, notebook: &str, extra: &[(&str, String)]) -> String {
    let mut line = format!("H nbcheck=1 records=1 mode={} notebook={}", mode, notebook);
    for (key, value) in extra {
        line.push_str(&format!(" {}={}", key, value));
    }
    line
}

/// One `S` line per speaker, listing the given keys as quoted fields
pub fn speaker_record(index: usize, speaker: &SpeakerConfig, keys: &[String]) -> String {
    let mut line = format!("S {}", index);
    for key in keys {
        line.push_str(&format!(
            " {}=\"{}\"",
            key,
            escape_quotes(&speaker.field_text(key))
        ));
    }
    line
}
