//! Subtitle File Import/Export
//!
//! Parses and serializes the plain-text dialogue format: blank-line
//! delimited blocks, each carrying an optional index number, an
//! arrow-separated time range, and one or more dialogue lines.
//!
//! Parsing is tolerant by design. A block with a missing or malformed time
//! range is skipped with a warning; it never aborts the rest of the file.
//! Both LF and CRLF line endings are accepted. The separator, hour-field,
//! and numbering conventions of the source file are detected and kept on the
//! returned document so exporting reproduces them losslessly.

use tracing::warn;

use crate::subtitles::SubtitleLine;
use crate::timecode::{format_timestamp, parse_timestamp, HourField};
use crate::TimeSec;

// =============================================================================
// Timestamp Style
// =============================================================================

/// Formatting conventions of a subtitle file, preserved for round-tripping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampStyle {
    /// Millisecond separator: `,` (SubRip) or `.`
    pub ms_separator: char,
    /// Hour-field convention: padded, bare, or omitted below one hour
    pub hour_field: HourField,
    /// Whether blocks carry sequential index numbers
    pub numbered: bool,
}

impl Default for TimestampStyle {
    fn default() -> Self {
        Self {
            ms_separator: ',',
            hour_field: HourField::Padded,
            numbered: true,
        }
    }
}

/// A parsed subtitle file: the lines plus the conventions it was written in.
#[derive(Clone, Debug, PartialEq)]
pub struct SubtitleDocument {
    pub lines: Vec<SubtitleLine>,
    pub style: TimestampStyle,
}

// =============================================================================
// Import
// =============================================================================

/// Parses plain-text subtitle content into a document.
///
/// Ids are assigned sequentially starting at 1, in file order. Inline markup
/// tags (`<i>...</i>`, `{\an8}`-style overrides) are stripped from the
/// dialogue text.
pub fn parse_subtitles(content: &str) -> SubtitleDocument {
    let mut lines = Vec::new();
    let mut style: Option<TimestampStyle> = None;
    let mut next_id = 1;

    // Line-based block splitting: any trimmed-empty line is a boundary, so
    // CRLF and LF files parse alike
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    for block_lines in blocks {
        let Some(arrow_index) = block_lines.iter().position(|l| l.contains("-->")) else {
            warn!(block = block_lines.first().copied().unwrap_or(""), "Block has no time range, skipping");
            continue;
        };

        let (start, end) = match parse_range_line(block_lines[arrow_index]) {
            Some(range) => range,
            None => {
                warn!(line = block_lines[arrow_index], "Malformed time range, skipping block");
                continue;
            }
        };

        if style.is_none() {
            style = Some(detect_style(block_lines[arrow_index], arrow_index > 0));
        }

        let text = block_lines[arrow_index + 1..]
            .iter()
            .map(|l| strip_markup(l))
            .collect::<Vec<_>>()
            .join("\n");

        lines.push(SubtitleLine::new(next_id, start, end, &text));
        next_id += 1;
    }

    SubtitleDocument {
        lines,
        style: style.unwrap_or_default(),
    }
}

/// Parses an arrow-separated time range line (`start --> end`).
fn parse_range_line(line: &str) -> Option<(TimeSec, TimeSec)> {
    let (start_str, end_str) = line.split_once("-->")?;
    // Cue settings after the end timestamp are ignored
    let end_str = end_str.trim().split_whitespace().next().unwrap_or("");

    let start = parse_timestamp(start_str.trim());
    let end = parse_timestamp(end_str);
    if start.is_nan() || end.is_nan() {
        return None;
    }
    Some((start, end))
}

/// Detects the separator/hour/numbering conventions from the first
/// well-formed time range line.
fn detect_style(range_line: &str, numbered: bool) -> TimestampStyle {
    let ms_separator = if range_line.contains(',') { ',' } else { '.' };
    let start_part = range_line.split("-->").next().unwrap_or("").trim();

    // One colon means MM:SS only; otherwise the width of the leading
    // component tells padded from bare
    let hour_field = if start_part.matches(':').count() < 2 {
        HourField::Omitted
    } else if start_part.split(':').next().unwrap_or("").len() >= 2 {
        HourField::Padded
    } else {
        HourField::Bare
    };

    TimestampStyle {
        ms_separator,
        hour_field,
        numbered,
    }
}

/// Strips `<...>` and `{...}` inline markup tags from dialogue text.
fn strip_markup(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut depth_angle = 0u32;
    let mut depth_brace = 0u32;

    for c in text.chars() {
        match c {
            '<' => depth_angle += 1,
            '>' => depth_angle = depth_angle.saturating_sub(1),
            '{' => depth_brace += 1,
            '}' => depth_brace = depth_brace.saturating_sub(1),
            _ if depth_angle == 0 && depth_brace == 0 => result.push(c),
            _ => {}
        }
    }

    result
}

// =============================================================================
// Export
// =============================================================================

/// Serializes lines back to the plain-text format in the given style.
///
/// Blank interior rows of a line's text are dropped: a blank row would read
/// back as a block boundary and cut the line in two on reparse.
pub fn export_subtitles(lines: &[SubtitleLine], style: TimestampStyle) -> String {
    let mut output = String::new();

    for (index, line) in lines.iter().enumerate() {
        if style.numbered {
            output.push_str(&format!("{}\n", index + 1));
        }

        let start = format_timestamp(line.start_time, style.ms_separator, style.hour_field);
        let end = format_timestamp(line.end_time, style.ms_separator, style.hour_field);
        output.push_str(&format!("{} --> {}\n", start, end));

        for row in line.text.lines().filter(|r| !r.trim().is_empty()) {
            output.push_str(row);
            output.push('\n');
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numbered_comma_file() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello\n\n2\n00:00:05,000 --> 00:00:08,000\nWorld\n";

        let doc = parse_subtitles(srt);
        assert_eq!(doc.lines.len(), 2);

        assert_eq!(doc.lines[0].id, 1);
        assert_eq!(doc.lines[0].start_time, 1.0);
        assert_eq!(doc.lines[0].end_time, 4.0);
        assert_eq!(doc.lines[0].text, "Hello");

        assert_eq!(doc.lines[1].id, 2);
        assert_eq!(doc.lines[1].text, "World");

        assert_eq!(doc.style.ms_separator, ',');
        assert_eq!(doc.style.hour_field, HourField::Padded);
        assert!(doc.style.numbered);
    }

    #[test]
    fn parse_unnumbered_dot_file() {
        let content = "0:00:01.000 --> 0:00:04.000\nFirst\n\n0:00:05.500 --> 0:00:08.000\nSecond\n";

        let doc = parse_subtitles(content);
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.lines[1].start_time, 5.5);

        assert_eq!(doc.style.ms_separator, '.');
        assert_eq!(doc.style.hour_field, HourField::Bare);
        assert!(!doc.style.numbered);
    }

    #[test]
    fn parse_crlf_file_keeps_all_blocks() {
        let srt = "1\r\n00:00:01,000 --> 00:00:04,000\r\nHello\r\n\r\n2\r\n00:00:05,000 --> 00:00:08,000\r\nWorld\r\n";

        let doc = parse_subtitles(srt);
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.lines[0].text, "Hello");
        assert_eq!(doc.lines[1].text, "World");
        assert_eq!(doc.lines[1].start_time, 5.0);
    }

    #[test]
    fn parse_multiline_text() {
        let srt = "1\n00:00:00,000 --> 00:00:05,000\nLine one\nLine two\n";
        let doc = parse_subtitles(srt);
        assert_eq!(doc.lines[0].text, "Line one\nLine two");
    }

    #[test]
    fn parse_strips_inline_markup() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\n<i>Italic</i> and {\\an8}positioned\n";
        let doc = parse_subtitles(srt);
        assert_eq!(doc.lines[0].text, "Italic and positioned");
    }

    #[test]
    fn malformed_block_is_skipped_not_fatal() {
        let srt = "1\n00:00:01,000 --> 00:bad:04,000\nBroken\n\n2\n00:00:05,000 --> 00:00:08,000\nGood\n";

        let doc = parse_subtitles(srt);
        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.lines[0].text, "Good");
        // Ids stay sequential over surviving blocks
        assert_eq!(doc.lines[0].id, 1);
    }

    #[test]
    fn block_without_time_range_is_skipped() {
        let srt = "just some text\nno timing here\n\n1\n00:00:01,000 --> 00:00:02,000\nKept\n";
        let doc = parse_subtitles(srt);
        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.lines[0].text, "Kept");
    }

    #[test]
    fn export_reproduces_comma_numbered_convention() {
        let lines = vec![
            SubtitleLine::new(1, 1.0, 4.0, "Hello"),
            SubtitleLine::new(2, 5.5, 8.0, "World"),
        ];
        let out = export_subtitles(&lines, TimestampStyle::default());
        assert!(out.starts_with("1\n00:00:01,000 --> 00:00:04,000\nHello"));
        assert!(out.contains("2\n00:00:05,500 --> 00:00:08,000\nWorld"));
    }

    #[test]
    fn round_trip_without_hour_field() {
        let original = "01:30.000 --> 02:00.000\nShort form";

        let doc = parse_subtitles(original);
        assert_eq!(doc.lines[0].start_time, 90.0);
        assert_eq!(doc.style.hour_field, HourField::Omitted);

        let exported = export_subtitles(&doc.lines, doc.style);
        assert_eq!(exported, original);
    }

    #[test]
    fn export_drops_blank_interior_rows() {
        // A merge with an empty-text line can leave a blank row inside
        let lines = vec![SubtitleLine::new(1, 1.0, 4.0, "above\n\nbelow")];

        let out = export_subtitles(&lines, TimestampStyle::default());
        let reparsed = parse_subtitles(&out);
        assert_eq!(reparsed.lines.len(), 1);
        assert_eq!(reparsed.lines[0].text, "above\nbelow");
    }

    #[test]
    fn round_trip_preserves_style_and_content() {
        let original = "0:00:01.000 --> 0:00:04.000\nFirst\n\n0:00:05.500 --> 0:00:08.000\nSecond line\nwith two rows";

        let doc = parse_subtitles(original);
        let exported = export_subtitles(&doc.lines, doc.style);
        assert_eq!(exported, original.trim_end());

        let reparsed = parse_subtitles(&exported);
        assert_eq!(reparsed.lines, doc.lines);
        assert_eq!(reparsed.style, doc.style);
    }
}
