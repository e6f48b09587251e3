//! Word and PowerPoint extraction. Both formats are zip containers of XML parts; the text lives
//! in run elements (`w:t` / `a:t`) grouped into paragraphs (`w:p` / `a:p`).

use super::{ExtractionError, TextExtractor};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const DOCX_BODY_PART: &str = "word/document.xml";
const PPTX_SLIDE_PREFIX: &str = "ppt/slides/slide";
const PPTX_PRESENTATION_PART: &str = "ppt/presentation.xml";
const PPTX_PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

/// Element names that carry text in one Open XML dialect.
struct Markup {
    run_text: &'static [u8],
    paragraph: &'static [u8],
    tab: &'static [u8],
    line_break: &'static [u8],
}

const WORDPROCESSING: Markup = Markup {
    run_text: b"w:t",
    paragraph: b"w:p",
    tab: b"w:tab",
    line_break: b"w:br",
};

const DRAWING: Markup = Markup {
    run_text: b"a:t",
    paragraph: b"a:p",
    tab: b"a:tab",
    line_break: b"a:br",
};

/// Extracts paragraph text from the main body of a `.docx` file.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let xml = read_part(&mut archive, DOCX_BODY_PART)?;
        collect_text(&xml, &WORDPROCESSING)
    }
}

/// Extracts shape text from every slide of a `.pptx` file, in slide order.
pub struct PptxExtractor;

impl TextExtractor for PptxExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut text = String::new();
        for part in slide_parts(&mut archive)? {
            let xml = read_part(&mut archive, &part)?;
            text.push_str(&collect_text(&xml, &DRAWING)?);
        }
        Ok(text)
    }
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, ExtractionError> {
    let mut xml = String::new();
    archive.by_name(name)?.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Slide parts in presentation order, falling back to slide numbering when the deck has no
/// usable slide list.
fn slide_parts<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<String>, ExtractionError> {
    match presentation_slide_parts(archive)? {
        Some(parts) if !parts.is_empty() => Ok(parts),
        _ => Ok(numbered_slide_parts(archive)),
    }
}

/// Resolve `p:sldIdLst` through the presentation relationships.
fn presentation_slide_parts<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Option<Vec<String>>, ExtractionError> {
    if archive.index_for_name(PPTX_PRESENTATION_PART).is_none()
        || archive.index_for_name(PPTX_PRESENTATION_RELS).is_none()
    {
        return Ok(None);
    }
    let presentation = read_part(archive, PPTX_PRESENTATION_PART)?;
    let relationships = read_part(archive, PPTX_PRESENTATION_RELS)?;

    let mut targets = HashMap::new();
    for_each_element(&relationships, |element| {
        if element.name().as_ref() == b"Relationship" {
            if let (Some(id), Some(target)) = (
                attribute(element, b"Id")?,
                attribute(element, b"Target")?,
            ) {
                targets.insert(id, target);
            }
        }
        Ok(())
    })?;

    let mut parts = Vec::new();
    for_each_element(&presentation, |element| {
        if element.name().as_ref() == b"p:sldId" {
            if let Some(target) = attribute(element, b"r:id")?.and_then(|id| targets.get(&id)) {
                parts.push(resolve_presentation_target(target));
            }
        }
        Ok(())
    })?;
    parts.retain(|part| archive.index_for_name(part).is_some());
    Ok(Some(parts))
}

/// Relationship targets are relative to `ppt/` unless rooted.
fn resolve_presentation_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(rooted) => rooted.to_string(),
        None => format!("ppt/{target}"),
    }
}

/// Slide parts ordered by slide number, so `slide10` follows `slide9`.
fn numbered_slide_parts<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix(PPTX_SLIDE_PREFIX)?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort();
    slides.into_iter().map(|(_, name)| name).collect()
}

fn for_each_element<F>(xml: &str, mut visit: F) -> Result<(), ExtractionError>
where
    F: FnMut(&BytesStart<'_>) -> Result<(), ExtractionError>,
{
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => visit(&element)?,
            Ok(Event::Eof) => return Ok(()),
            Err(error) => {
                return Err(ExtractionError::Xml(format!(
                    "at byte {}: {error}",
                    reader.buffer_position()
                )));
            }
            Ok(_) => {}
        }
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, ExtractionError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|error| ExtractionError::Xml(error.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|error| ExtractionError::Xml(error.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn collect_text(xml: &str, markup: &Markup) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                if element.name().as_ref() == markup.run_text {
                    in_run = true;
                }
            }
            Ok(Event::End(element)) => {
                let name = element.name();
                if name.as_ref() == markup.run_text {
                    in_run = false;
                } else if name.as_ref() == markup.paragraph {
                    text.push('\n');
                }
            }
            Ok(Event::Empty(element)) => {
                let name = element.name();
                if name.as_ref() == markup.tab {
                    text.push('\t');
                } else if name.as_ref() == markup.line_break {
                    text.push('\n');
                } else if name.as_ref() == markup.paragraph {
                    text.push('\n');
                }
            }
            Ok(Event::Text(run)) if in_run => {
                let unescaped = run
                    .unescape()
                    .map_err(|error| ExtractionError::Xml(error.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                return Err(ExtractionError::Xml(format!(
                    "at byte {}: {error}",
                    reader.buffer_position()
                )));
            }
            Ok(_) => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn write_archive(path: &Path, parts: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start part");
            writer.write_all(body.as_bytes()).expect("write part");
        }
        let bytes = writer.finish().expect("finish archive").into_inner();
        std::fs::write(path, bytes).expect("write archive");
    }

    fn slide(text: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#
        )
    }

    #[test]
    fn docx_paragraphs_become_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("contract.docx");
        write_archive(
            &path,
            &[(
                DOCX_BODY_PART,
                r#"<?xml version="1.0"?><w:document xmlns:w="w"><w:body><w:p><w:r><w:t>Contract</w:t></w:r><w:r><w:t xml:space="preserve"> terms &amp; conditions</w:t></w:r></w:p><w:p><w:r><w:t>Net</w:t><w:tab/><w:t>30</w:t></w:r></w:p><w:p/></w:body></w:document>"#,
            )],
        );

        let text = DocxExtractor.extract(&path).expect("docx text");
        assert_eq!(text, "Contract terms & conditions\nNet\t30\n\n");
    }

    #[test]
    fn docx_without_body_part_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.docx");
        write_archive(&path, &[("docProps/core.xml", "<core/>")]);

        let error = DocxExtractor.extract(&path).expect_err("no body");
        assert!(matches!(error, ExtractionError::Archive(_)));
    }

    #[test]
    fn pptx_slides_follow_presentation_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reordered.pptx");
        let opening = slide("Opening");
        let closing = slide("Closing");
        write_archive(
            &path,
            &[
                (
                    PPTX_PRESENTATION_PART,
                    r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst><p:sldId id="256" r:id="rId3"/><p:sldId id="257" r:id="rId2"/></p:sldIdLst></p:presentation>"#,
                ),
                (
                    PPTX_PRESENTATION_RELS,
                    r#"<Relationships xmlns="rels"><Relationship Id="rId1" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Target="slides/slide1.xml"/><Relationship Id="rId3" Target="/ppt/slides/slide2.xml"/></Relationships>"#,
                ),
                ("ppt/slides/slide1.xml", closing.as_str()),
                ("ppt/slides/slide2.xml", opening.as_str()),
            ],
        );

        let text = PptxExtractor.extract(&path).expect("pptx text");
        assert_eq!(text, "Opening\nClosing\n");
    }

    #[test]
    fn pptx_without_slide_list_uses_slide_numbers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("deck.pptx");
        let first = slide("First");
        let second = slide("Second");
        let tenth = slide("Tenth");
        write_archive(
            &path,
            &[
                ("ppt/slides/slide10.xml", tenth.as_str()),
                ("ppt/slides/slide2.xml", second.as_str()),
                ("ppt/slides/slide1.xml", first.as_str()),
                ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
            ],
        );

        let text = PptxExtractor.extract(&path).expect("pptx text");
        assert_eq!(text, "First\nSecond\nTenth\n");
    }

    #[test]
    fn malformed_xml_is_reported() {
        let error = collect_text("<w:p><w:t>open</w:p>", &WORDPROCESSING).expect_err("mismatch");
        assert!(matches!(error, ExtractionError::Xml(_)));
    }
}
