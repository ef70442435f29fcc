use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use snafu::{ResultExt, Snafu, ensure};
use tracing::debug;

use crate::project::files_section::{AttributeEncoding, FILES_TAG, FilesSection};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A project file held in memory as raw bytes.
///
/// Patching streams the document through an XML reader and writer, so every
/// event outside of the replaced `Files` element is written back unchanged.
#[derive(Debug, Clone)]
pub struct ProjectDocument {
    path: PathBuf,
    content: Vec<u8>,
}

impl ProjectDocument {
    pub fn read(path: &Path) -> Result<Self, DocumentError> {
        debug!("Reading project document {}", path.display());
        let content = fs::read(path).context(ReadSnafu { path })?;
        debug!("Read {} bytes", content.len());
        Ok(Self::from_bytes(path, content))
    }

    pub fn from_bytes(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        ProjectDocument {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Replaces the first `Files` element of the document with `section`.
    ///
    /// Non-ASCII characters of the new section are written as character
    /// references when the declaration names an encoding other than UTF-8.
    ///
    /// The document is left untouched when it cannot be parsed or has no
    /// `Files` element.
    pub fn replace_files_section(&mut self, section: &FilesSection) -> Result<(), DocumentError> {
        let (bom, body) = match self.content.strip_prefix(UTF8_BOM) {
            Some(body) => (UTF8_BOM, body),
            None => (&[][..], self.content.as_slice()),
        };

        let mut reader = Reader::from_reader(body);
        let mut output = Vec::with_capacity(self.content.len());
        output.extend_from_slice(bom);
        let mut writer = Writer::new(output);
        let mut replaced = false;
        let mut encoding = AttributeEncoding::default();

        loop {
            let event = reader.read_event().context(ParseSnafu {
                path: &self.path,
                position: reader.error_position(),
            })?;

            match event {
                Event::Decl(decl) => {
                    encoding = AttributeEncoding::from_declaration(&decl);
                    debug!("Writing attribute values as {:?}", encoding);
                    writer
                        .write_event(Event::Decl(decl))
                        .context(SerializeSnafu)?;
                }
                Event::Start(start) if !replaced && start.name().as_ref() == FILES_TAG.as_bytes() => {
                    self.skip_files_section(&mut reader)?;
                    section
                        .write_to(&mut writer, encoding)
                        .context(SerializeSnafu)?;
                    replaced = true;
                }
                Event::Empty(empty) if !replaced && empty.name().as_ref() == FILES_TAG.as_bytes() => {
                    section
                        .write_to(&mut writer, encoding)
                        .context(SerializeSnafu)?;
                    replaced = true;
                }
                Event::Eof => break,
                event => writer.write_event(event).context(SerializeSnafu)?,
            }
        }

        ensure!(replaced, MissingFilesSectionSnafu { path: &self.path });

        debug!(
            "Replaced <{}> section with {} top-level filters",
            FILES_TAG,
            section.filters().len()
        );
        self.content = writer.into_inner();
        Ok(())
    }

    /// Consumes events up to and including the end tag of the `Files` element
    /// whose start tag was just read.
    fn skip_files_section(&self, reader: &mut Reader<&[u8]>) -> Result<(), DocumentError> {
        let mut depth = 0usize;
        loop {
            let event = reader.read_event().context(ParseSnafu {
                path: &self.path,
                position: reader.error_position(),
            })?;

            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => return Ok(()),
                Event::End(_) => depth -= 1,
                Event::Eof => {
                    return UnclosedFilesSectionSnafu { path: &self.path }.fail();
                }
                _ => {}
            }
        }
    }

    /// Overwrites the file the document was read from.
    pub fn save(&self) -> Result<(), DocumentError> {
        debug!(
            "Writing {} bytes to {}",
            self.content.len(),
            self.path.display()
        );
        fs::write(&self.path, self.content()).context(WriteSnafu { path: &self.path })
    }
}

#[derive(Debug, Snafu)]
pub enum DocumentError {
    #[snafu(display("Failed to read project document {}", path.display()))]
    ReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to parse {} as XML near byte {}", path.display(), position))]
    ParseError {
        path: PathBuf,
        position: u64,
        source: quick_xml::Error,
    },
    #[snafu(display("No <Files> section found in {}", path.display()))]
    MissingFilesSectionError { path: PathBuf },
    #[snafu(display("The <Files> section in {} is never closed", path.display()))]
    UnclosedFilesSectionError { path: PathBuf },
    #[snafu(display("Failed to serialize the project document"))]
    SerializeError { source: io::Error },
    #[snafu(display("Failed to write project document {}", path.display()))]
    WriteError { path: PathBuf, source: io::Error },
}
