//! DOCX and PPTX text extraction.
//!
//! Both formats are zip archives of XML parts; the text runs are pulled out
//! with regular expressions rather than a full OOXML model.

use crate::error::{IngestError, Result};
use crate::window::Window;
use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::LazyLock;
use tracing::debug;

static DOCX_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p(?:\s[^>]*)?>(.*?)</w:p>").expect("valid regex"));
static DOCX_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").expect("valid regex"));
static PPTX_SLIDE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("valid regex"));
static PPTX_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p:sp(?:\s[^>]*)?>(.*?)</p:sp>").expect("valid regex"));
static PPTX_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a:p(?:\s[^>]*)?>(.*?)</a:p>").expect("valid regex"));
static PPTX_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a:t(?:\s[^>]*)?>(.*?)</a:t>").expect("valid regex"));

/// Windowed non-blank paragraphs of a Word document, one per line.
pub fn parse_docx(bytes: &[u8], window: Window) -> Result<String> {
    let mut archive = open_archive(bytes, "docx")?;
    let xml = read_part(&mut archive, "word/document.xml", "docx")?;

    let paragraphs: Vec<String> = DOCX_PARAGRAPH
        .captures_iter(&xml)
        .map(|p| collect_runs(&DOCX_RUN, &p[1]))
        .filter(|text| !text.trim().is_empty())
        .collect();

    debug!(paragraphs = paragraphs.len(), "Parsed docx");
    Ok(window.apply(&paragraphs, "paragraph").join("\n"))
}

/// Windowed slides of a presentation. Every text-bearing shape contributes
/// its paragraphs followed by a newline.
pub fn parse_pptx(bytes: &[u8], window: Window) -> Result<String> {
    let mut archive = open_archive(bytes, "pptx")?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = PPTX_SLIDE_PART.captures(name)?[1].parse().ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);

    let mut slide_texts = Vec::with_capacity(slides.len());
    for (_, name) in &slides {
        let xml = read_part(&mut archive, name, "pptx")?;
        slide_texts.push(slide_text(&xml));
    }

    debug!(slides = slide_texts.len(), "Parsed pptx");
    Ok(window.apply(&slide_texts, "slide").concat())
}

fn slide_text(xml: &str) -> String {
    let mut text = String::new();
    for shape in PPTX_SHAPE.captures_iter(xml) {
        let body = &shape[1];
        if !body.contains("<p:txBody") {
            continue;
        }
        let paragraphs: Vec<String> = PPTX_PARAGRAPH
            .captures_iter(body)
            .map(|p| collect_runs(&PPTX_RUN, &p[1]))
            .collect();
        text.push_str(&paragraphs.join("\n"));
        text.push('\n');
    }
    text
}

fn open_archive<'a>(
    bytes: &'a [u8],
    format: &'static str,
) -> Result<zip::ZipArchive<Cursor<&'a [u8]>>> {
    zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| IngestError::malformed(format, e))
}

fn read_part(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
    format: &'static str,
) -> Result<String> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| IngestError::malformed(format, format!("{name}: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)?;
    Ok(xml)
}

fn collect_runs(run: &Regex, paragraph: &str) -> String {
    run.captures_iter(paragraph)
        .map(|r| unescape_xml(&r[1]))
        .collect()
}

fn unescape_xml(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn archive(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:pPr/><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!("<w:document><w:body>{body}</w:body></w:document>");
        archive(&[("word/document.xml", &xml)])
    }

    fn slide(texts: &[&str]) -> String {
        let shapes: String = texts
            .iter()
            .map(|t| format!("<p:sp><p:nvSpPr/><p:txBody><a:p><a:r><a:t>{t}</a:t></a:r></a:p></p:txBody></p:sp>"))
            .collect();
        format!("<p:sld><p:cSld><p:spTree>{shapes}<p:sp><p:spPr/></p:sp></p:spTree></p:cSld></p:sld>")
    }

    #[test]
    fn test_docx_skips_blank_paragraphs() {
        let bytes = docx(&["Intro", "   ", "Ada &amp; Charles", "Outro"]);
        let text = parse_docx(&bytes, Window::default()).unwrap();
        assert_eq!(text, "Intro\nAda & Charles\nOutro");
    }

    #[test]
    fn test_docx_window() {
        let bytes = docx(&["cover", "body one", "body two", "appendix"]);
        let text = parse_docx(&bytes, Window::new(1, 1)).unwrap();
        assert_eq!(text, "body one\nbody two");

        let empty = parse_docx(&bytes, Window::new(2, 2)).unwrap();
        assert_eq!(empty, "");
    }

    #[test]
    fn test_docx_missing_document_part() {
        let bytes = archive(&[("other.xml", "<x/>")]);
        let err = parse_docx(&bytes, Window::default()).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { format: "docx", .. }));
    }

    #[test]
    fn test_not_a_zip() {
        let err = parse_pptx(b"plain bytes", Window::default()).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { format: "pptx", .. }));
    }

    #[test]
    fn test_pptx_slides_in_numeric_order() {
        let s1 = slide(&["Title"]);
        let s2 = slide(&["Second", "Notes"]);
        let s10 = slide(&["Tenth"]);
        let bytes = archive(&[
            ("ppt/slides/slide10.xml", &s10),
            ("ppt/slides/slide2.xml", &s2),
            ("ppt/slides/slide1.xml", &s1),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
        ]);

        let text = parse_pptx(&bytes, Window::default()).unwrap();
        assert_eq!(text, "Title\nSecond\nNotes\nTenth\n");

        let windowed = parse_pptx(&bytes, Window::new(1, 1)).unwrap();
        assert_eq!(windowed, "Second\nNotes\n");
    }
}
