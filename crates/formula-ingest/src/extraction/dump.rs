//! Streaming extraction from a MediaWiki XML dump.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::record::{RawFormulaRecord, Source};

use super::normalize::math_fragments;
use super::{Extraction, FormulaExtractor};

/// The fields of one `<page>` that extraction needs.
#[derive(Debug, Default)]
struct PageBuffer {
    title: Option<String>,
    id: Option<String>,
    text: String,
}

#[derive(Debug, Clone, Copy)]
enum PageField {
    Title,
    Id,
    Text,
}

/// Which page field, if any, the element at the top of `stack` feeds.
fn page_field(stack: &[Vec<u8>]) -> Option<PageField> {
    match stack {
        [.., parent, leaf] if parent.as_slice() == b"page" => match leaf.as_slice() {
            b"title" => Some(PageField::Title),
            b"id" => Some(PageField::Id),
            _ => None,
        },
        [.., page, revision, leaf]
            if page.as_slice() == b"page"
                && revision.as_slice() == b"revision"
                && leaf.as_slice() == b"text" =>
        {
            Some(PageField::Text)
        }
        _ => None,
    }
}

/// Extracts formulas from a Wikipedia XML dump without loading it whole.
///
/// Only the page currently being read is buffered; its state is dropped as
/// soon as its records have been emitted.
pub struct DumpExtractor {
    path: PathBuf,
}

impl DumpExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream records to `sink` as each page closes. Returns pages seen.
    pub fn for_each_record(&self, mut sink: impl FnMut(RawFormulaRecord)) -> Result<usize> {
        let file = File::open(&self.path).map_err(|e| IngestError::io(&self.path, e))?;
        let mut reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut page: Option<PageBuffer> = None;
        let mut page_count = 0;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = e.local_name().as_ref().to_vec();
                    if name.as_slice() == b"page" {
                        page = Some(PageBuffer::default());
                    }
                    stack.push(name);

                    if let Some(current) = page.as_mut() {
                        match page_field(&stack) {
                            Some(PageField::Title) => {
                                current.title.get_or_insert_with(String::new);
                            }
                            Some(PageField::Id) => {
                                current.id.get_or_insert_with(String::new);
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(_)) => {
                    let closed = stack.pop();
                    if closed.as_deref() == Some(b"page".as_slice()) {
                        if let Some(finished) = page.take() {
                            page_count += 1;
                            emit_page(finished, &mut sink);
                        }
                    }
                }
                Ok(Event::Text(t)) => {
                    if let Some(current) = page.as_mut() {
                        if let Some(field) = page_field(&stack) {
                            let text = t.unescape().map_err(|e| self.xml_error(e))?;
                            append_field(current, field, &text);
                        }
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(current) = page.as_mut() {
                        if let Some(field) = page_field(&stack) {
                            let text = String::from_utf8_lossy(&c);
                            append_field(current, field, &text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(self.xml_error(e)),
                _ => {}
            }
            buf.clear();
        }

        info!(pages = page_count, path = %self.path.display(), "Dump scan complete");
        Ok(page_count)
    }

    fn xml_error(&self, e: quick_xml::Error) -> IngestError {
        IngestError::Xml {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

impl FormulaExtractor for DumpExtractor {
    fn extract(&self) -> Result<Extraction> {
        let mut records = Vec::new();
        let pages_processed = self.for_each_record(|record| records.push(record))?;
        Ok(Extraction {
            records,
            pages_processed,
        })
    }
}

fn append_field(page: &mut PageBuffer, field: PageField, text: &str) {
    match field {
        PageField::Title => page.title.get_or_insert_with(String::new).push_str(text),
        PageField::Id => page.id.get_or_insert_with(String::new).push_str(text),
        PageField::Text => page.text.push_str(text),
    }
}

fn emit_page(page: PageBuffer, sink: &mut impl FnMut(RawFormulaRecord)) {
    let mut emitted = 0;
    for latex in math_fragments(&page.text) {
        sink(
            RawFormulaRecord::new(latex, Source::Dump)
                .with_page(page.title.clone(), page.id.clone()),
        );
        emitted += 1;
    }
    if emitted > 0 {
        debug!(title = ?page.title, formulas = emitted, "Extracted page");
    }
}
