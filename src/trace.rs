//! Recorded touch traces.
//!
//! A trace is a JSON-lines file with one `TouchSample` object per line.
//! Blank lines and lines starting with `#` are skipped. Optional sample
//! fields (pressure, contact axes, tool, pointer count, edge flags) may be
//! omitted.
//!
//! ```text
//! # tablet capture, 2 taps
//! {"x":120,"y":300,"pressure":0.4,"size":0.2,"event_time_ms":0,"down_time_ms":0,"action":"down"}
//! {"x":121,"y":301,"pressure":0.5,"size":0.2,"event_time_ms":180,"down_time_ms":0,"action":"up"}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::TouchSample;

/// Parse a trace from any buffered reader.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TouchSample>> {
    let mut out = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let sample: TouchSample = serde_json::from_str(trimmed).map_err(|e| Error::Trace {
            line: line_no,
            message: e.to_string(),
        })?;
        out.push(sample);
    }
    Ok(out)
}

/// Read and parse a trace file.
pub fn read_trace(path: &Path) -> Result<Vec<TouchSample>> {
    let file = File::open(path)?;
    parse_trace(BufReader::new(file))
}

/// Write samples as a trace, one JSON object per line.
pub fn write_trace<W: Write>(mut writer: W, samples: &[TouchSample]) -> Result<()> {
    for sample in samples {
        serde_json::to_writer(&mut writer, sample)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToolType, TouchAction};
    use std::io::Cursor;

    const TRACE: &str = r#"
# two-sample tap
{"x":120,"y":300,"pressure":0.4,"size":0.2,"event_time_ms":0,"down_time_ms":0,"action":"down"}

{"x":121.5,"y":301,"event_time_ms":180,"down_time_ms":0,"action":"up","tool_type":"stylus"}
"#;

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let samples = parse_trace(Cursor::new(TRACE)).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].action, TouchAction::Down);
        assert_eq!(samples[0].pressure, 0.4);
        assert_eq!(samples[1].action, TouchAction::Up);
        assert_eq!(samples[1].x, 121.5);
    }

    #[test]
    fn test_optional_fields_default() {
        let samples = parse_trace(Cursor::new(TRACE)).unwrap();
        let up = &samples[1];
        assert_eq!(up.pressure, 0.0);
        assert_eq!(up.pointer_count, 1);
        assert_eq!(up.tool_type, ToolType::Stylus);
        assert_eq!(up.touch_major, 0.0);
    }

    #[test]
    fn test_error_reports_line_number() {
        let input = "# header\n{\"x\":1,\"y\":2,\"event_time_ms\":0,\"down_time_ms\":0,\"action\":\"down\"}\nnot json\n";
        match parse_trace(Cursor::new(input)) {
            Err(Error::Trace { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected trace error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_field() {
        let input = "{\"x\":1,\"y\":2,\"action\":\"down\"}\n";
        assert!(matches!(
            parse_trace(Cursor::new(input)),
            Err(Error::Trace { line: 1, .. })
        ));
    }

    #[test]
    fn test_write_then_read_file() {
        let samples = vec![
            TouchSample::new(TouchAction::Down, 1.0, 2.0, 0.5, 0.1, 10, 10),
            TouchSample::new(TouchAction::Other(5), 1.0, 2.0, 0.5, 0.1, 12, 10),
            TouchSample::new(TouchAction::Up, 3.0, 4.0, 0.5, 0.1, 20, 10),
        ];
        let file = tempfile::NamedTempFile::new().unwrap();
        write_trace(file.as_file(), &samples).unwrap();
        let read = read_trace(file.path()).unwrap();
        assert_eq!(read, samples);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_trace(Path::new("/nonexistent/trace.jsonl")),
            Err(Error::Io(_))
        ));
    }
}
