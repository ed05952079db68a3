use crate::error::{IngestError, Result};
use crate::window::Window;

/// Decode UTF-8 text and keep the windowed lines, line endings included.
pub fn parse_text(bytes: &[u8], window: Window) -> Result<String> {
    let text = std::str::from_utf8(bytes).map_err(|e| IngestError::malformed("text", e))?;
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    Ok(window.apply(&lines, "line").concat())
}

/// Keep the windowed CSV rows; cells of a row are joined by single spaces.
pub fn parse_csv(bytes: &[u8], window: Window) -> Result<String> {
    let text = std::str::from_utf8(bytes).map_err(|e| IngestError::malformed("csv", e))?;
    let rows = split_records(text.strip_prefix('\u{feff}').unwrap_or(text))?;

    let selected = window.apply(&rows, "row");
    Ok(selected
        .iter()
        .map(|row| row.join(" "))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Split RFC 4180 records. Quoted cells may contain commas, doubled quotes
/// and line breaks.
fn split_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' if cell.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut cell));
                records.push(finish_record(std::mem::take(&mut record)));
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(IngestError::malformed("csv", "unterminated quoted cell"));
    }

    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        records.push(finish_record(record));
    }

    Ok(records)
}

// A blank line is a record with no cells
fn finish_record(record: Vec<String>) -> Vec<String> {
    if record.len() == 1 && record[0].is_empty() {
        Vec::new()
    } else {
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_window_keeps_line_endings() {
        let text = b"first\nsecond\nthird\nfourth\n";
        let out = parse_text(text, Window::new(1, 1)).unwrap();
        assert_eq!(out, "second\nthird\n");
    }

    #[test]
    fn test_text_without_trailing_newline() {
        let out = parse_text(b"a\nb", Window::default()).unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn test_text_empty_window_is_not_an_error() {
        let out = parse_text(b"only\n", Window::new(1, 0)).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        let err = parse_text(&[0xff, 0xfe, 0x00], Window::default()).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { format: "text", .. }));
    }

    #[test]
    fn test_csv_rows_joined_with_spaces() {
        let csv = b"name,role\nAda,engineer\nAlan,\"mathematician, logician\"\n";
        let out = parse_csv(csv, Window::new(1, 0)).unwrap();
        assert_eq!(out, "Ada engineer\nAlan mathematician, logician");
    }

    #[test]
    fn test_csv_quoted_newline_and_escaped_quote() {
        let csv = b"\"multi\nline\",\"say \"\"hi\"\"\"\r\nx,y";
        let out = parse_csv(csv, Window::default()).unwrap();
        assert_eq!(out, "multi\nline say \"hi\"\nx y");
    }

    #[test]
    fn test_csv_unterminated_quote() {
        let err = parse_csv(b"\"open,cell", Window::default()).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { format: "csv", .. }));
    }
}
