// crates/arxml-rs/src/parser/mod.rs

//! Event-driven extraction of ARXML content.
//!
//! The parser walks the document once, depth-first, and classifies every
//! child of an `<AR-PACKAGE>/<ELEMENTS>` container into one of three tiers:
//!
//! - **typed**: the well-known AUTOSAR element kinds, extracted field by
//!   field into the structs in [`crate::types`] (see [`typed`]);
//! - **generic**: `<ECUC-MODULE-CONFIGURATION-VALUES>` subtrees, extracted
//!   recursively with no depth limit into [`ConfigNode`] trees (see
//!   [`config`]);
//! - **unknown**: anything else, captured as a raw byte-identical slice of
//!   the input for verbatim re-emission on save.
//!
//! A typed element without a mandatory `<SHORT-NAME>` is skipped with a
//! recorded warning; only byte-level XML breakage aborts the parse.

mod config;
mod typed;

use crate::error::ArxmlError;
use crate::store::ArxmlDocument;
use crate::types::{Composition, ConfigNode, DesignatorPath, PortInterface, SwComponentType, UnknownFragment};
use crate::version;
use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

/// Result of a successful parse: the populated document plus per-element
/// warnings for typed elements that had to be skipped.
#[derive(Debug)]
pub struct ParseOutput {
    pub document: ArxmlDocument,
    pub warnings: Vec<String>,
}

/// Everything extracted from one document before the store takes ownership.
#[derive(Debug, Default)]
struct ParsedParts {
    package_name: Option<String>,
    components: Vec<SwComponentType>,
    port_interfaces: Vec<PortInterface>,
    compositions: Vec<Composition>,
    config_trees: Vec<ConfigNode>,
    fragments: Vec<UnknownFragment>,
}

/// Parses an ARXML string into a document.
///
/// # Errors
/// Returns an `ArxmlError` when the XML is syntactically broken or the root
/// element is not `<AUTOSAR>`. Per-element problems degrade to warnings in
/// the returned [`ParseOutput`] instead.
pub fn load_arxml_from_str(xml: &str) -> Result<ParseOutput, ArxmlError> {
    let detected = version::resolve_version(xml);
    let mut reader = Reader::from_str(xml);
    let mut parts = ParsedParts::default();
    let mut warnings = Vec::new();
    let mut root_seen = false;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                if !root_seen {
                    if name != "AUTOSAR" {
                        return Err(ArxmlError::MalformedDocument(
                            "root element is not AUTOSAR",
                        ));
                    }
                    check_namespace(&e)?;
                    root_seen = true;
                    continue;
                }
                match name.as_str() {
                    // Package scaffolding: descend.
                    "AR-PACKAGES" | "AR-PACKAGE" => {}
                    // The first package short name becomes the document's
                    // package designator.
                    "SHORT-NAME" => {
                        let text = read_text_content(&mut reader, &e)?;
                        if parts.package_name.is_none() {
                            parts.package_name = Some(text);
                        }
                    }
                    "ELEMENTS" => {
                        parse_elements(&mut reader, xml, &mut parts, &mut warnings)?;
                    }
                    // Package-level metadata we do not model.
                    _ => skip_element(&mut reader, &e)?,
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
        }
    }

    if !root_seen {
        return Err(ArxmlError::MalformedDocument("document has no root element"));
    }

    log::debug!(
        "parsed {} components, {} interfaces, {} compositions, {} config modules, {} unknown fragments",
        parts.components.len(),
        parts.port_interfaces.len(),
        parts.compositions.len(),
        parts.config_trees.len(),
        parts.fragments.len()
    );

    let document = ArxmlDocument::from_parse(
        detected,
        parts.package_name,
        parts.components,
        parts.port_interfaces,
        parts.compositions,
        parts.config_trees,
        parts.fragments,
    );
    Ok(ParseOutput { document, warnings })
}

/// Parses an ARXML file into a document.
///
/// # Errors
/// Returns `ArxmlError::Io` when the file cannot be read, otherwise the
/// same errors as [`load_arxml_from_str`].
pub fn load_arxml_from_file(path: &Path) -> Result<ParseOutput, ArxmlError> {
    let content = fs::read_to_string(path)?;
    load_arxml_from_str(&content)
}

/// Consumes all children of an `<ELEMENTS>` container, classifying each one.
fn parse_elements(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    parts: &mut ParsedParts,
    warnings: &mut Vec<String>,
) -> Result<(), ArxmlError> {
    use crate::types::ComponentCategory;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "APPLICATION-SW-COMPONENT-TYPE" => {
                        match typed::parse_component(reader, ComponentCategory::Application, warnings)? {
                            Some(c) => parts.components.push(c),
                            None => warnings.push(skipped(&name)),
                        }
                    }
                    "ATOMIC-SW-COMPONENT-TYPE" => {
                        match typed::parse_component(reader, ComponentCategory::Atomic, warnings)? {
                            Some(c) => parts.components.push(c),
                            None => warnings.push(skipped(&name)),
                        }
                    }
                    "COMPOSITION-SW-COMPONENT-TYPE" => {
                        match typed::parse_component(reader, ComponentCategory::Composition, warnings)? {
                            Some(c) => parts.components.push(c),
                            None => warnings.push(skipped(&name)),
                        }
                    }
                    "SENDER-RECEIVER-INTERFACE" => {
                        match typed::parse_sender_receiver_interface(reader, warnings)? {
                            Some(i) => parts.port_interfaces.push(i),
                            None => warnings.push(skipped(&name)),
                        }
                    }
                    "CLIENT-SERVER-INTERFACE" => {
                        match typed::parse_client_server_interface(reader, warnings)? {
                            Some(i) => parts.port_interfaces.push(i),
                            None => warnings.push(skipped(&name)),
                        }
                    }
                    "COMPOSITION" => match typed::parse_composition(reader, warnings)? {
                        Some(c) => parts.compositions.push(c),
                        None => warnings.push(skipped(&name)),
                    },
                    "ECUC-MODULE-CONFIGURATION-VALUES" => {
                        let mut node = config::parse_config_node(reader, xml, &e)?;
                        node.assign_paths(&DesignatorPath::root());
                        parts.config_trees.push(node);
                    }
                    _ => {
                        // Unknown element kind: preserve the raw bytes.
                        skip_element(reader, &e)?;
                        let raw = raw_slice(xml, pos, reader.buffer_position() as usize);
                        parts.fragments.push(UnknownFragment {
                            short_name: first_short_name(&raw),
                            tag: name,
                            raw,
                        });
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e)?;
                let raw = raw_slice(xml, pos, reader.buffer_position() as usize);
                parts.fragments.push(UnknownFragment {
                    short_name: None,
                    tag: name,
                    raw,
                });
            }
            // First end tag at this level closes the ELEMENTS container:
            // every child parser consumes its own subtree.
            Ok(Event::End(_)) => return Ok(()),
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside ELEMENTS",
                ));
            }
            Ok(_) => {}
        }
    }
}

fn skipped(tag: &str) -> String {
    format!("Skipped {} without a SHORT-NAME", tag)
}

/// The root element must sit in an AUTOSAR namespace when it declares one.
fn check_namespace(root: &BytesStart<'_>) -> Result<(), ArxmlError> {
    if let Some(ns) = attr_value(root, "xmlns")? {
        if !ns.starts_with("http://autosar.org/schema/") {
            return Err(ArxmlError::MalformedDocument(
                "root namespace is not an AUTOSAR schema",
            ));
        }
    }
    Ok(())
}

// --- Shared event helpers (used by the typed and config submodules) ---

/// Element name with any namespace prefix stripped.
pub(crate) fn local_name(e: &BytesStart<'_>) -> Result<String, ArxmlError> {
    let name = e.name();
    let raw = std::str::from_utf8(name.as_ref())?;
    Ok(raw.rsplit(':').next().unwrap_or(raw).to_string())
}

/// Value of an attribute on a start element, when present.
pub(crate) fn attr_value(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, ArxmlError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Reads the text content of an element, consuming through its end tag.
/// Nested markup is descended into and its text concatenated.
pub(crate) fn read_text_content(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<String, ArxmlError> {
    let end = start.to_end().into_owned();
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Text(t)) => text.push_str(&t.decode()?),
            // Entity and character references arrive as separate events.
            Ok(Event::GeneralRef(r)) => {
                if let Some(ch) = r.resolve_char_ref()? {
                    text.push(ch);
                } else if let Some(resolved) = resolve_xml_entity(&r.decode()?) {
                    text.push_str(resolved);
                }
            }
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(e)) if depth == 0 && e.name() == end.name() => break,
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument("unexpected end of file"));
            }
            Ok(_) => {}
        }
    }
    Ok(text.trim().to_string())
}

/// Skips an element's entire subtree.
pub(crate) fn skip_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<(), ArxmlError> {
    let end = start.to_end().into_owned();
    reader
        .read_to_end(end.name())
        .map_err(|e| ArxmlError::syntax_at(e, reader.error_position()))?;
    Ok(())
}

/// Slice of the input covering one complete element, leading whitespace
/// stripped. The element text itself stays byte-identical.
pub(crate) fn raw_slice(xml: &str, start: usize, end: usize) -> String {
    xml[start..end].trim_start().to_string()
}

/// `<SHORT-NAME>` text directly under a raw fragment's root element, used by
/// the serializer's duplicate-suppression rule. Short names of nested
/// children do not name the fragment and are ignored.
fn first_short_name(raw: &str) -> Option<String> {
    let mut reader = Reader::from_str(raw);
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 1 && local_name(&e).ok()? == "SHORT-NAME" {
                    let mut text = String::new();
                    loop {
                        match reader.read_event() {
                            Ok(Event::Text(t)) => text.push_str(&t.decode().ok()?),
                            Ok(Event::End(_)) => return Some(text.trim().to_string()),
                            Ok(Event::Eof) | Err(_) => return None,
                            Ok(_) => {}
                        }
                    }
                }
                depth += 1;
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}
