//! Session-level recording metadata (`metadata.xml`).

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use recast_common::error::{RecastError, RecastResult};

/// Element holding the server-recorded length in milliseconds.
pub const DURATION_FIELD: &str = "duration";

/// Element holding the human-readable meeting label.
pub const MEETING_NAME_FIELD: &str = "meetingName";

/// Authoritative facts about one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    /// Wall-clock length of the full recording as stored by the server.
    /// Validated by the reconciler, not here.
    pub total_duration_ms: f64,

    /// Base name of the composite output.
    pub meeting_name: String,
}

impl RecordingMetadata {
    pub fn new(total_duration_ms: f64, meeting_name: impl Into<String>) -> Self {
        Self {
            total_duration_ms,
            meeting_name: meeting_name.into(),
        }
    }
}

/// Parse `metadata.xml` bytes.
///
/// The first `<duration>` and the first `<meetingName>` at any depth win.
pub fn parse_metadata(bytes: &[u8]) -> RecastResult<RecordingMetadata> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| RecastError::malformed(format!("metadata is not valid UTF-8: {e}")))?;
    let mut fields = read_text_fields(xml, &[DURATION_FIELD, MEETING_NAME_FIELD])?;

    let duration = fields
        .remove(DURATION_FIELD)
        .ok_or_else(|| RecastError::missing_field(DURATION_FIELD))?;
    let meeting_name = fields
        .remove(MEETING_NAME_FIELD)
        .ok_or_else(|| RecastError::missing_field(MEETING_NAME_FIELD))?;

    let total_duration_ms = duration.parse::<f64>().map_err(|_| {
        RecastError::invalid_duration(format!("recording duration {duration:?} is not numeric"))
    })?;

    Ok(RecordingMetadata {
        total_duration_ms,
        meeting_name,
    })
}

/// Collect the trimmed text content of the first element named by each of
/// `wanted`, wherever it appears in the document.
fn read_text_fields(
    xml: &str,
    wanted: &[&'static str],
) -> RecastResult<HashMap<&'static str, String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut found: HashMap<&'static str, String> = HashMap::new();
    // (field, depth of its element, accumulated text)
    let mut capture: Option<(&'static str, usize, String)> = None;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                saw_root = true;
                if capture.is_none() {
                    let name = e.local_name();
                    if let Some(field) = wanted
                        .iter()
                        .find(|f| f.as_bytes() == name.as_ref() && !found.contains_key(**f))
                    {
                        capture = Some((*field, depth, String::new()));
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                saw_root = true;
                let name = e.local_name();
                if let Some(field) = wanted.iter().find(|f| f.as_bytes() == name.as_ref()) {
                    found.entry(*field).or_default();
                }
            }
            Ok(Event::Text(t)) => {
                if let Some((_, at, text)) = capture.as_mut() {
                    if *at == depth {
                        let unescaped = t.unescape().map_err(|e| {
                            RecastError::malformed(format!("bad text in metadata: {e}"))
                        })?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if let Some((_, at, text)) = capture.as_mut() {
                    if *at == depth {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let Some((field, at, text)) = capture.take() {
                    if at == depth {
                        found.insert(field, text.trim().to_string());
                    } else {
                        capture = Some((field, at, text));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(RecastError::malformed(format!(
                    "metadata is not well-formed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if !saw_root {
        return Err(RecastError::malformed("metadata document is empty"));
    }
    if depth != 0 {
        return Err(RecastError::malformed("metadata document ends inside an element"));
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<recording>
  <id>6e35e3b2778883f5db637d7a5dba0a427f692e91-1594211574213</id>
  <state>published</state>
  <published>true</published>
  <meta>
    <isBreakout>false</isBreakout>
    <meetingName>Algebra &amp; Geometry</meetingName>
  </meta>
  <playback>
    <format>presentation</format>
    <duration>7500</duration>
  </playback>
</recording>"#;

    #[test]
    fn test_parse_nested_fields() {
        let meta = parse_metadata(SAMPLE.as_bytes()).unwrap();
        assert_eq!(meta.meeting_name, "Algebra & Geometry");
        assert!((meta.total_duration_ms - 7500.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let xml = "<r><duration>100</duration><x><duration>200</duration></x><meetingName>a</meetingName></r>";
        let meta = parse_metadata(xml.as_bytes()).unwrap();
        assert!((meta.total_duration_ms - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_whitespace_and_cdata() {
        let xml = "<r><duration>\n  18000\n</duration><meetingName><![CDATA[Week <3>]]></meetingName></r>";
        let meta = parse_metadata(xml.as_bytes()).unwrap();
        assert!((meta.total_duration_ms - 18000.0).abs() < 1e-9);
        assert_eq!(meta.meeting_name, "Week <3>");
    }

    #[test]
    fn test_missing_field() {
        let xml = "<recording><playback><duration>10</duration></playback></recording>";
        let err = parse_metadata(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, RecastError::MissingField { ref field } if field == "meetingName"));
    }

    #[test]
    fn test_non_numeric_duration() {
        let xml = "<r><duration>ten</duration><meetingName>x</meetingName></r>";
        let err = parse_metadata(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, RecastError::InvalidDuration { .. }));
    }

    #[test]
    fn test_negative_duration_is_left_to_reconciler() {
        let xml = "<r><duration>-5</duration><meetingName>x</meetingName></r>";
        let meta = parse_metadata(xml.as_bytes()).unwrap();
        assert!(meta.total_duration_ms < 0.0);
    }

    #[test]
    fn test_malformed_markup() {
        let xml = "<r><duration>10</meetingName></r>";
        let err = parse_metadata(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, RecastError::MalformedDescriptor { .. }));

        let err = parse_metadata(b"").unwrap_err();
        assert!(matches!(err, RecastError::MalformedDescriptor { .. }));
    }

    #[test]
    fn test_empty_element_counts_as_present() {
        let xml = "<r><duration>10</duration><meetingName/></r>";
        let meta = parse_metadata(xml.as_bytes()).unwrap();
        assert_eq!(meta.meeting_name, "");
    }
}
