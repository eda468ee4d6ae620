// crates/arxml-rs/src/builder.rs

//! Serializes an [`ArxmlDocument`] back into ARXML text.
//!
//! Emission order: XML declaration, the `AUTOSAR` root with namespace and
//! schema-location attributes derived from the document's version tag, one
//! `AR-PACKAGES/AR-PACKAGE/ELEMENTS` scaffold, then typed entities, then
//! the configuration forest in insertion order, then preserved-unknown
//! fragments. Typed entities and config nodes are rendered through the
//! indent writer; fragments (and captured `ADMIN-DATA` blocks) are injected
//! byte-identical to how they appeared in the input.
//!
//! A fragment is dropped when a config root with the same tag *and* short
//! name was already emitted, so re-parsing the output cannot duplicate a
//! module; a distinct fragment of an already-modeled kind survives.

use crate::error::ArxmlError;
use crate::store::ArxmlDocument;
use crate::types::{
    Composition, ConfigNode, ConfigRole, PortDirection, PortInterface, PortPrototype,
    SwComponentType,
};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::path::Path;

const INDENT_STEP: usize = 2;
// AUTOSAR > AR-PACKAGES > AR-PACKAGE > ELEMENTS
const ELEMENTS_DEPTH: usize = 4;

type XmlWriter = Writer<Vec<u8>>;

/// Serializes a document into ARXML text.
///
/// # Errors
/// Returns an `ArxmlError` when the writer fails; for a well-formed
/// document this does not happen.
pub fn save_arxml_to_string(document: &ArxmlDocument) -> Result<String, ArxmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_STEP);
    let version = document.version();

    let mut root = BytesStart::new("AUTOSAR");
    root.push_attribute(("xmlns", version.namespace()));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    root.push_attribute((
        "xsi:schemaLocation",
        format!("{} {}", version.namespace(), version.xsd_file_name()).as_str(),
    ));
    writer.write_event(Event::Start(root))?;
    start(&mut writer, "AR-PACKAGES")?;
    start(&mut writer, "AR-PACKAGE")?;
    text_element(&mut writer, "SHORT-NAME", document.package_name())?;
    start(&mut writer, "ELEMENTS")?;

    for component in document.components() {
        write_component(&mut writer, component)?;
    }
    for composition in document.compositions() {
        write_composition(&mut writer, composition)?;
    }
    for interface in document.port_interfaces() {
        write_interface(&mut writer, interface)?;
    }

    let config_roots = document.config_roots();
    for node in &config_roots {
        write_config_node(&mut writer, node, ELEMENTS_DEPTH)?;
    }
    for fragment in document.fragments() {
        let duplicate = config_roots.iter().any(|n| {
            n.kind == fragment.tag && n.short_name.as_deref() == fragment.short_name.as_deref()
        });
        if duplicate {
            log::debug!("dropping duplicate fragment <{}>", fragment.tag);
            continue;
        }
        write_raw(&mut writer, &fragment.raw, ELEMENTS_DEPTH)?;
    }

    end(&mut writer, "ELEMENTS")?;
    end(&mut writer, "AR-PACKAGE")?;
    end(&mut writer, "AR-PACKAGES")?;
    end(&mut writer, "AUTOSAR")?;

    let body = std::str::from_utf8(&writer.into_inner())?.to_string();
    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n",
        body
    ))
}

/// Serializes a document and writes it to `path`.
///
/// # Errors
/// Returns `ArxmlError::Io` when the file cannot be written.
pub fn save_arxml_to_file(document: &ArxmlDocument, path: &Path) -> Result<(), ArxmlError> {
    let content = save_arxml_to_string(document)?;
    fs::write(path, content)?;
    Ok(())
}

fn write_component(writer: &mut XmlWriter, component: &SwComponentType) -> Result<(), ArxmlError> {
    let tag = component.category.tag();
    start(writer, tag)?;
    text_element(writer, "SHORT-NAME", &component.short_name)?;
    write_desc(writer, component.desc.as_deref())?;
    if !component.ports.is_empty() {
        start(writer, "PORTS")?;
        for port in &component.ports {
            write_port(writer, port)?;
        }
        end(writer, "PORTS")?;
    }
    end(writer, tag)?;
    Ok(())
}

fn write_port(writer: &mut XmlWriter, port: &PortPrototype) -> Result<(), ArxmlError> {
    let tag = port.direction.tag();
    start(writer, tag)?;
    text_element(writer, "SHORT-NAME", &port.short_name)?;
    write_desc(writer, port.desc.as_deref())?;
    if let Some(interface_ref) = &port.interface_ref {
        let tref = match port.direction {
            PortDirection::Requirer => "REQUIRED-INTERFACE-TREF",
            _ => "PROVIDED-INTERFACE-TREF",
        };
        text_element(writer, tref, interface_ref)?;
    }
    end(writer, tag)?;
    Ok(())
}

fn write_interface(writer: &mut XmlWriter, interface: &PortInterface) -> Result<(), ArxmlError> {
    let tag = if interface.is_service {
        "CLIENT-SERVER-INTERFACE"
    } else {
        "SENDER-RECEIVER-INTERFACE"
    };
    start(writer, tag)?;
    text_element(writer, "SHORT-NAME", &interface.short_name)?;
    write_desc(writer, interface.desc.as_deref())?;

    if !interface.data_elements.is_empty() {
        start(writer, "DATA-ELEMENTS")?;
        for element in &interface.data_elements {
            start(writer, "DATA-ELEMENT-PROTOTYPE")?;
            text_element(writer, "SHORT-NAME", &element.short_name)?;
            write_desc(writer, element.desc.as_deref())?;
            let type_ref = element
                .type_ref
                .as_deref()
                .unwrap_or_else(|| element.data_type.as_type_ref());
            text_element(writer, "TYPE-TREF", type_ref)?;
            end(writer, "DATA-ELEMENT-PROTOTYPE")?;
        }
        end(writer, "DATA-ELEMENTS")?;
    }
    if !interface.service_elements.is_empty() {
        start(writer, "OPERATIONS")?;
        for element in &interface.service_elements {
            start(writer, "OPERATION")?;
            text_element(writer, "SHORT-NAME", &element.short_name)?;
            write_desc(writer, element.desc.as_deref())?;
            end(writer, "OPERATION")?;
        }
        end(writer, "OPERATIONS")?;
    }
    end(writer, tag)?;
    Ok(())
}

fn write_composition(writer: &mut XmlWriter, composition: &Composition) -> Result<(), ArxmlError> {
    start(writer, "COMPOSITION")?;
    text_element(writer, "SHORT-NAME", &composition.short_name)?;
    write_desc(writer, composition.desc.as_deref())?;

    if !composition.components.is_empty() {
        start(writer, "COMPONENTS")?;
        for component in &composition.components {
            write_component(writer, component)?;
        }
        end(writer, "COMPONENTS")?;
    }
    if !composition.connections.is_empty() {
        start(writer, "CONNECTORS")?;
        for connection in &composition.connections {
            start(writer, "ASSEMBLY-SW-CONNECTOR")?;
            text_element(writer, "SHORT-NAME", &connection.name)?;

            start(writer, "PROVIDER-IREF")?;
            text_element(writer, "CONTEXT-COMPONENT-REF", &connection.source.component)?;
            text_element(writer, "TARGET-P-PORT-REF", &connection.source.port)?;
            end(writer, "PROVIDER-IREF")?;

            start(writer, "REQUESTER-IREF")?;
            text_element(writer, "CONTEXT-COMPONENT-REF", &connection.target.component)?;
            text_element(writer, "TARGET-R-PORT-REF", &connection.target.port)?;
            end(writer, "REQUESTER-IREF")?;

            end(writer, "ASSEMBLY-SW-CONNECTOR")?;
        }
        end(writer, "CONNECTORS")?;
    }
    end(writer, "COMPOSITION")?;
    Ok(())
}

/// Renders one config subtree, preserving field and child order exactly as
/// stored. `depth` is the element nesting level of the node itself, used to
/// indent injected `ADMIN-DATA` bytes.
fn write_config_node(
    writer: &mut XmlWriter,
    node: &ConfigNode,
    depth: usize,
) -> Result<(), ArxmlError> {
    let mut open = BytesStart::new(node.kind.as_str());
    if let Some(uuid) = &node.uuid {
        open.push_attribute(("UUID", uuid.as_str()));
    }
    writer.write_event(Event::Start(open))?;

    if let Some(short_name) = &node.short_name {
        text_element(writer, "SHORT-NAME", short_name)?;
    }
    for field in &node.fields {
        let mut open = BytesStart::new(field.key.as_str());
        if let Some(dest) = &field.dest {
            open.push_attribute(("DEST", dest.as_str()));
        }
        writer.write_event(Event::Start(open))?;
        writer.write_event(Event::Text(BytesText::new(&field.value)))?;
        writer.write_event(Event::End(BytesEnd::new(field.key.as_str())))?;
    }
    if let Some(admin_data) = &node.admin_data {
        write_raw(writer, admin_data, depth + 1)?;
    }

    let parameters: Vec<&ConfigNode> = node
        .children
        .iter()
        .filter(|(role, _)| *role == ConfigRole::Parameter)
        .map(|(_, c)| c)
        .collect();
    let containers: Vec<&ConfigNode> = node
        .children
        .iter()
        .filter(|(role, _)| *role == ConfigRole::Container)
        .map(|(_, c)| c)
        .collect();

    if !parameters.is_empty() {
        start(writer, "PARAMETER-VALUES")?;
        for child in parameters {
            write_config_node(writer, child, depth + 2)?;
        }
        end(writer, "PARAMETER-VALUES")?;
    }
    if !containers.is_empty() {
        let wrapper = if node.kind == "ECUC-MODULE-CONFIGURATION-VALUES" {
            "CONTAINERS"
        } else {
            "SUB-CONTAINERS"
        };
        start(writer, wrapper)?;
        for child in containers {
            write_config_node(writer, child, depth + 2)?;
        }
        end(writer, wrapper)?;
    }

    writer.write_event(Event::End(BytesEnd::new(node.kind.as_str())))?;
    Ok(())
}

fn start(writer: &mut XmlWriter, tag: &str) -> Result<(), ArxmlError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    Ok(())
}

fn end(writer: &mut XmlWriter, tag: &str) -> Result<(), ArxmlError> {
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn text_element(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<(), ArxmlError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_desc(writer: &mut XmlWriter, desc: Option<&str>) -> Result<(), ArxmlError> {
    if let Some(desc) = desc {
        start(writer, "DESC")?;
        text_element(writer, "L-2", desc)?;
        end(writer, "DESC")?;
    }
    Ok(())
}

/// Injects preserved raw bytes into the output, bypassing the writer's
/// escaping so the fragment stays byte-identical to the input.
fn write_raw(writer: &mut XmlWriter, raw: &str, depth: usize) -> Result<(), ArxmlError> {
    let buffer = writer.get_mut();
    buffer.push(b'\n');
    buffer.extend(std::iter::repeat_n(b' ', depth * INDENT_STEP));
    buffer.extend_from_slice(raw.as_bytes());
    Ok(())
}
