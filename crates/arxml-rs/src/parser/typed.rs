// crates/arxml-rs/src/parser/typed.rs

//! Field-by-field extraction of the well-known AUTOSAR element kinds.
//!
//! Every function here is entered *after* the caller consumed the element's
//! start tag, and consumes events through the matching end tag. A missing
//! mandatory `<SHORT-NAME>` yields `Ok(None)` after the subtree has been
//! drained, so the caller can record a warning and keep going.

use super::{local_name, read_text_content, skip_element};
use crate::error::ArxmlError;
use crate::types::{
    ComponentCategory, Composition, DataElement, ElementDataType, PortConnection, PortDirection,
    PortInterface, PortPrototype, PortRef, ServiceElement, SwComponentType,
};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Parses one software component type element of the given category.
pub(super) fn parse_component(
    reader: &mut Reader<&[u8]>,
    category: ComponentCategory,
    warnings: &mut Vec<String>,
) -> Result<Option<SwComponentType>, ArxmlError> {
    let mut short_name = None;
    let mut desc = None;
    let mut ports = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "SHORT-NAME" if depth == 0 => {
                        short_name = Some(read_text_content(reader, &e)?);
                    }
                    "DESC" if depth == 0 => {
                        desc = non_empty(read_text_content(reader, &e)?);
                    }
                    // Ports may sit under a <PORTS> wrapper or directly on
                    // the component.
                    "P-PORT-PROTOTYPE" => {
                        push_port(parse_port(reader, PortDirection::Provider)?, &mut ports, warnings);
                    }
                    "R-PORT-PROTOTYPE" => {
                        push_port(parse_port(reader, PortDirection::Requirer)?, &mut ports, warnings);
                    }
                    "PR-PORT-PROTOTYPE" => {
                        push_port(
                            parse_port(reader, PortDirection::ProviderRequirer)?,
                            &mut ports,
                            warnings,
                        );
                    }
                    "PORTS" => depth += 1,
                    _ => skip_element(reader, &e)?,
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside a component type",
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(short_name.map(|name| SwComponentType {
        short_name: name,
        category,
        desc,
        ports,
    }))
}

fn push_port(port: Option<PortPrototype>, ports: &mut Vec<PortPrototype>, warnings: &mut Vec<String>) {
    match port {
        Some(p) => ports.push(p),
        None => warnings.push("Skipped port prototype without a SHORT-NAME".to_string()),
    }
}

/// Parses one port prototype element.
fn parse_port(
    reader: &mut Reader<&[u8]>,
    direction: PortDirection,
) -> Result<Option<PortPrototype>, ArxmlError> {
    let mut short_name = None;
    let mut desc = None;
    let mut interface_ref = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "SHORT-NAME" => short_name = Some(read_text_content(reader, &e)?),
                    "DESC" => desc = non_empty(read_text_content(reader, &e)?),
                    "PROVIDED-INTERFACE-TREF" | "REQUIRED-INTERFACE-TREF" => {
                        interface_ref = non_empty(read_text_content(reader, &e)?);
                    }
                    _ => skip_element(reader, &e)?,
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside a port prototype",
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(short_name.map(|name| PortPrototype {
        short_name: name,
        desc,
        direction,
        interface_ref,
        resolved_interface: None,
        connected_ports: Vec::new(),
    }))
}

/// Parses a `<SENDER-RECEIVER-INTERFACE>` element. Data element prototypes
/// are picked up at any depth, wrapper elements are descended into.
pub(super) fn parse_sender_receiver_interface(
    reader: &mut Reader<&[u8]>,
    warnings: &mut Vec<String>,
) -> Result<Option<PortInterface>, ArxmlError> {
    let mut interface = PortInterface::default();
    let mut short_name = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "SHORT-NAME" if depth == 0 => {
                        short_name = Some(read_text_content(reader, &e)?);
                    }
                    "DESC" if depth == 0 => {
                        interface.desc = non_empty(read_text_content(reader, &e)?);
                    }
                    "DATA-ELEMENT-PROTOTYPE" => match parse_data_element(reader)? {
                        Some(d) => interface.data_elements.push(d),
                        None => warnings
                            .push("Skipped DATA-ELEMENT-PROTOTYPE without a SHORT-NAME".to_string()),
                    },
                    _ => depth += 1,
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside an interface",
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(short_name.map(|name| {
        interface.short_name = name;
        interface
    }))
}

/// Parses one `<DATA-ELEMENT-PROTOTYPE>`. The primitive kind is derived
/// from the `<TYPE-TREF>` text by substring match.
fn parse_data_element(reader: &mut Reader<&[u8]>) -> Result<Option<DataElement>, ArxmlError> {
    let mut element = DataElement::default();
    let mut short_name = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "SHORT-NAME" => short_name = Some(read_text_content(reader, &e)?),
                    "DESC" => element.desc = non_empty(read_text_content(reader, &e)?),
                    "TYPE-TREF" => {
                        let type_ref = read_text_content(reader, &e)?;
                        element.data_type = ElementDataType::from_type_ref(&type_ref);
                        element.is_array = element.data_type == ElementDataType::Array;
                        element.type_ref = non_empty(type_ref);
                    }
                    _ => skip_element(reader, &e)?,
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside a data element",
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(short_name.map(|name| {
        element.short_name = name;
        element
    }))
}

/// Parses a `<CLIENT-SERVER-INTERFACE>` element. Operations are picked up
/// at any depth, wrapper elements are descended into.
pub(super) fn parse_client_server_interface(
    reader: &mut Reader<&[u8]>,
    warnings: &mut Vec<String>,
) -> Result<Option<PortInterface>, ArxmlError> {
    let mut interface = PortInterface {
        is_service: true,
        ..PortInterface::default()
    };
    let mut short_name = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "SHORT-NAME" if depth == 0 => {
                        short_name = Some(read_text_content(reader, &e)?);
                    }
                    "DESC" if depth == 0 => {
                        interface.desc = non_empty(read_text_content(reader, &e)?);
                    }
                    "OPERATION" => match parse_service_element(reader)? {
                        Some(s) => interface.service_elements.push(s),
                        None => {
                            warnings.push("Skipped OPERATION without a SHORT-NAME".to_string())
                        }
                    },
                    _ => depth += 1,
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside an interface",
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(short_name.map(|name| {
        interface.short_name = name;
        interface
    }))
}

/// Parses one `<OPERATION>` of a client-server interface.
fn parse_service_element(reader: &mut Reader<&[u8]>) -> Result<Option<ServiceElement>, ArxmlError> {
    let mut short_name = None;
    let mut desc = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "SHORT-NAME" => short_name = Some(read_text_content(reader, &e)?),
                    "DESC" => desc = non_empty(read_text_content(reader, &e)?),
                    _ => skip_element(reader, &e)?,
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside an operation",
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(short_name.map(|name| ServiceElement {
        short_name: name,
        desc,
        kind: "operation".to_string(),
    }))
}

/// Parses a `<COMPOSITION>` element: owned component types (under a
/// `<COMPONENTS>` wrapper or inline) plus assembly connectors.
pub(super) fn parse_composition(
    reader: &mut Reader<&[u8]>,
    warnings: &mut Vec<String>,
) -> Result<Option<Composition>, ArxmlError> {
    let mut composition = Composition::default();
    let mut short_name = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                match name.as_str() {
                    "SHORT-NAME" if depth == 0 => {
                        short_name = Some(read_text_content(reader, &e)?);
                    }
                    "DESC" if depth == 0 => {
                        composition.desc = non_empty(read_text_content(reader, &e)?);
                    }
                    "APPLICATION-SW-COMPONENT-TYPE" => {
                        match parse_component(reader, ComponentCategory::Application, warnings)? {
                            Some(c) => composition.components.push(c),
                            None => warnings.push(
                                "Skipped APPLICATION-SW-COMPONENT-TYPE without a SHORT-NAME"
                                    .to_string(),
                            ),
                        }
                    }
                    "ATOMIC-SW-COMPONENT-TYPE" => {
                        match parse_component(reader, ComponentCategory::Atomic, warnings)? {
                            Some(c) => composition.components.push(c),
                            None => warnings.push(
                                "Skipped ATOMIC-SW-COMPONENT-TYPE without a SHORT-NAME".to_string(),
                            ),
                        }
                    }
                    "COMPOSITION-SW-COMPONENT-TYPE" => {
                        match parse_component(reader, ComponentCategory::Composition, warnings)? {
                            Some(c) => composition.components.push(c),
                            None => warnings.push(
                                "Skipped COMPOSITION-SW-COMPONENT-TYPE without a SHORT-NAME"
                                    .to_string(),
                            ),
                        }
                    }
                    "ASSEMBLY-SW-CONNECTOR" => match parse_connector(reader)? {
                        Some(c) => composition.connections.push(c),
                        None => warnings
                            .push("Skipped ASSEMBLY-SW-CONNECTOR with incomplete refs".to_string()),
                    },
                    "COMPONENTS" | "CONNECTORS" => depth += 1,
                    _ => skip_element(reader, &e)?,
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside a composition",
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(short_name.map(|name| {
        composition.short_name = name;
        composition
    }))
}

/// Parses one `<ASSEMBLY-SW-CONNECTOR>`: a name plus a provider and a
/// requester instance ref, each naming a context component and a port.
fn parse_connector(reader: &mut Reader<&[u8]>) -> Result<Option<PortConnection>, ArxmlError> {
    let mut name = None;
    let mut source = None;
    let mut target = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let local = local_name(&e)?;
                match local.as_str() {
                    "SHORT-NAME" => name = Some(read_text_content(reader, &e)?),
                    "PROVIDER-IREF" => source = parse_instance_ref(reader)?,
                    "REQUESTER-IREF" => target = parse_instance_ref(reader)?,
                    _ => skip_element(reader, &e)?,
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside a connector",
                ));
            }
            Ok(_) => {}
        }
    }

    match (name, source, target) {
        (Some(name), Some(source), Some(target)) => Ok(Some(PortConnection {
            name,
            source,
            target,
        })),
        _ => Ok(None),
    }
}

/// Parses one instance ref: `<CONTEXT-COMPONENT-REF>` plus a
/// `TARGET-…-PORT-REF` child. Reference paths keep only their last segment.
fn parse_instance_ref(reader: &mut Reader<&[u8]>) -> Result<Option<PortRef>, ArxmlError> {
    let mut component = None;
    let mut port = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let local = local_name(&e)?;
                if local == "CONTEXT-COMPONENT-REF" {
                    component = Some(last_ref_segment(&read_text_content(reader, &e)?));
                } else if local.starts_with("TARGET-") && local.ends_with("-PORT-REF") {
                    port = Some(last_ref_segment(&read_text_content(reader, &e)?));
                } else {
                    skip_element(reader, &e)?;
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ArxmlError::MalformedDocument(
                    "unexpected end of file inside an instance ref",
                ));
            }
            Ok(_) => {}
        }
    }

    match (component, port) {
        (Some(component), Some(port)) => Ok(Some(PortRef { component, port })),
        _ => Ok(None),
    }
}

fn last_ref_segment(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
