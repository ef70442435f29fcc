use std::fmt::Write as _;
use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use crate::filesystem::{FilterNode, ProjectNode, WalkedFilter};

pub const FILES_TAG: &str = "Files";
const FILTER_TAG: &str = "Filter";
const FILE_TAG: &str = "File";
const NAME_ATTRIBUTE: &str = "Name";
const PATH_ATTRIBUTE: &str = "RelativePath";

/// How attribute values of the generated section are turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeEncoding {
    /// Plain UTF-8, the XML default.
    #[default]
    Utf8,
    /// ASCII only: every other character becomes a numeric character
    /// reference, which reads the same whatever encoding the document declares.
    CharacterReferences,
}

impl AttributeEncoding {
    /// Picks the encoding matching the `encoding` of an XML declaration.
    pub fn from_declaration(decl: &BytesDecl<'_>) -> Self {
        match decl.encoding().and_then(Result::ok) {
            Some(name) if !is_utf8_label(&name) => AttributeEncoding::CharacterReferences,
            _ => AttributeEncoding::Utf8,
        }
    }

    fn encode(self, value: &str) -> Vec<u8> {
        let escaped = escape(value);
        match self {
            AttributeEncoding::Utf8 => escaped.into_owned().into_bytes(),
            AttributeEncoding::CharacterReferences => {
                let mut encoded = String::with_capacity(escaped.len());
                for c in escaped.chars() {
                    if c.is_ascii() {
                        encoded.push(c);
                    } else {
                        // writing into a String cannot fail
                        let _ = write!(encoded, "&#x{:X};", u32::from(c));
                    }
                }
                encoded.into_bytes()
            }
        }
    }
}

fn is_utf8_label(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"utf-8") || name.eq_ignore_ascii_case(b"utf8")
}

/// Replacement `Files` section: one top-level filter per input directory, in
/// the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesSection {
    filters: Vec<FilterNode>,
    file_count: usize,
}

impl FilesSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a walked directory. Top-level filters are kept even when the
    /// directory holds no files.
    pub fn push(&mut self, walked: WalkedFilter) {
        self.file_count += walked.file_count;
        self.filters.push(walked.filter);
    }

    pub fn filters(&self) -> &[FilterNode] {
        &self.filters
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn write_to<W: Write>(
        &self,
        writer: &mut Writer<W>,
        encoding: AttributeEncoding,
    ) -> io::Result<()> {
        writer.write_event(Event::Start(BytesStart::new(FILES_TAG)))?;
        for filter in &self.filters {
            write_filter(writer, filter, encoding)?;
        }
        writer.write_event(Event::End(BytesEnd::new(FILES_TAG)))
    }
}

fn write_filter<W: Write>(
    writer: &mut Writer<W>,
    filter: &FilterNode,
    encoding: AttributeEncoding,
) -> io::Result<()> {
    let name = encoding.encode(&filter.name);
    let start =
        BytesStart::new(FILTER_TAG).with_attributes([(NAME_ATTRIBUTE.as_bytes(), name.as_slice())]);

    if filter.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &filter.children {
        match child {
            ProjectNode::Filter(child_filter) => write_filter(writer, child_filter, encoding)?,
            ProjectNode::File { path } => {
                let path = encoding.encode(&path.to_string_lossy());
                let file = BytesStart::new(FILE_TAG)
                    .with_attributes([(PATH_ATTRIBUTE.as_bytes(), path.as_slice())]);
                writer.write_event(Event::Empty(file))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(FILTER_TAG)))
}
