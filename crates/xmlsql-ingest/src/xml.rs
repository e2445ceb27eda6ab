//! XML document loading into an [`XmlElement`] tree.
//!
//! Parsing resolves element namespaces, so a namespaced element is stored as `{uri}local`.
//! Comments, processing instructions and the doctype are dropped.

use std::path::Path;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::debug;

use xmlsql_model::{XmlElement, XmlNode};

use crate::error::{IngestError, Result};

/// Reads and parses an XML file.
///
/// Text is decoded with the encoding named in the XML declaration, UTF-8 when there is none.
/// Bytes that are not valid in that encoding make the document malformed.
pub fn read_document(path: &Path) -> Result<XmlElement> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let root = build_tree(NsReader::from_reader(bytes.as_slice()), path)?;
    debug!(
        path = %path.display(),
        root = %root.name,
        bytes = bytes.len(),
        "parsed document"
    );
    Ok(root)
}

/// Parses XML text; `path` is only used for error context.
pub fn parse_document(text: &str, path: &Path) -> Result<XmlElement> {
    build_tree(NsReader::from_str(text), path)
}

fn build_tree(mut reader: NsReader<&[u8]>, path: &Path) -> Result<XmlElement> {
    let mut buf = Vec::new();
    let mut builder = TreeBuilder::default();

    loop {
        // Reader errors carry their own position; decoding errors point past the event.
        let outcome = match reader.read_resolved_event_into(&mut buf) {
            Ok((resolved, event)) => builder
                .apply(&resolved, event)
                .map_err(|message| (message, reader.buffer_position())),
            Err(error) => Err((error.to_string(), reader.error_position())),
        };
        match outcome {
            Ok(Step::Continue) => {}
            Ok(Step::Finished) => break,
            Err((message, position)) => {
                return Err(IngestError::XmlParse {
                    path: path.to_path_buf(),
                    position,
                    message,
                });
            }
        }
        buf.clear();
    }

    builder.root.ok_or_else(|| IngestError::EmptyDocument {
        path: path.to_path_buf(),
    })
}

enum Step {
    Continue,
    Finished,
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<XmlElement>,
    root: Option<XmlElement>,
}

impl TreeBuilder {
    fn apply(&mut self, resolved: &ResolveResult<'_>, event: Event<'_>) -> std::result::Result<Step, String> {
        match event {
            Event::Start(start) => {
                let element = open_element(resolved, &start)?;
                self.stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(resolved, &start)?;
                self.close(element)?;
            }
            Event::End(_) => {
                let element = self
                    .stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                self.close(element)?;
            }
            Event::Text(text) => {
                let content = text.xml_content().map_err(|e| e.to_string())?;
                self.push_text(content.into_owned());
            }
            Event::CData(data) => {
                let content = data.xml_content().map_err(|e| e.to_string())?;
                self.push_text(content.into_owned());
            }
            Event::GeneralRef(reference) => {
                let name = reference.decode().map_err(|e| e.to_string())?;
                let resolved = resolve_reference(&name)
                    .ok_or_else(|| format!("unknown entity reference &{name};"))?;
                self.push_text(resolved);
            }
            Event::Eof => {
                if let Some(open) = self.stack.last() {
                    return Err(format!("unexpected end of document inside <{}>", open.name));
                }
                return Ok(Step::Finished);
            }
            _ => {}
        }
        Ok(Step::Continue)
    }

    fn close(&mut self, element: XmlElement) -> std::result::Result<(), String> {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(XmlNode::Element(element)),
            None if self.root.is_none() => self.root = Some(element),
            None => return Err(format!("second root element <{}>", element.name)),
        }
        Ok(())
    }

    fn push_text(&mut self, text: String) {
        // Text outside the root element is insignificant.
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        if let Some(XmlNode::Text(existing)) = parent.children.last_mut() {
            existing.push_str(&text);
        } else {
            parent.children.push(XmlNode::Text(text));
        }
    }
}

fn open_element(
    resolved: &ResolveResult<'_>,
    start: &BytesStart<'_>,
) -> std::result::Result<XmlElement, String> {
    let decoder = start.decoder();
    let decode = |bytes: &[u8]| {
        decoder
            .decode(bytes)
            .map(std::borrow::Cow::into_owned)
            .map_err(|e| e.to_string())
    };
    let local = decode(start.local_name().as_ref())?;
    let name = match resolved {
        ResolveResult::Bound(Namespace(uri)) => format!("{{{}}}{local}", decode(uri)?),
        ResolveResult::Unbound => local,
        ResolveResult::Unknown(prefix) => {
            return Err(format!(
                "undeclared namespace prefix '{}'",
                String::from_utf8_lossy(prefix)
            ));
        }
    };

    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let raw_key = attribute.key.as_ref();
        if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
            continue;
        }
        let key = decode(attribute.key.local_name().as_ref())?;
        let value = attribute
            .decode_and_unescape_value(decoder)
            .map_err(|e| e.to_string())?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Resolves `&name;` references: the predefined entities and numeric character references.
fn resolve_reference(name: &str) -> Option<String> {
    if let Some(value) = resolve_predefined_entity(name) {
        return Some(value.to_string());
    }
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code).map(String::from)
}
