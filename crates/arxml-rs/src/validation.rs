// crates/arxml-rs/src/validation.rs

//! Rule-based validation of a document.
//!
//! A pure read pass: `validate` never fails and never mutates, it only
//! collects [`Issue`]s. The rules are independent of each other; a finding
//! in one rule does not stop the others from running.

use crate::error::ArxmlError;
use crate::store::ArxmlDocument;
use crate::types::{Issue, PortInterface, SwComponentType};
use crate::version;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

const MAX_NAME_LEN: usize = 128;

/// Runs every validation rule over the document.
pub fn validate(document: &ArxmlDocument) -> Vec<Issue> {
    let mut issues = Vec::new();

    check_names(document, &mut issues);
    check_sibling_duplicates(document, &mut issues);
    check_connections(document, &mut issues);
    check_schema_compliance(document, &mut issues);

    log::debug!("validation produced {} issues", issues.len());
    issues
}

/// Short names must be non-empty and follow the naming convention: a
/// leading letter, then letters, digits or underscores, at most 128 chars.
fn check_names(document: &ArxmlDocument, issues: &mut Vec<Issue>) {
    for component in document.components() {
        check_designator(issues, "component", &component.short_name);
        for port in &component.ports {
            check_designator(issues, "port", &port.short_name);
        }
    }
    for interface in document.port_interfaces() {
        check_designator(issues, "port interface", &interface.short_name);
        for element in &interface.data_elements {
            check_designator(issues, "data element", &element.short_name);
        }
        for element in &interface.service_elements {
            check_designator(issues, "operation", &element.short_name);
        }
    }
    for composition in document.compositions() {
        check_designator(issues, "composition", &composition.short_name);
        for component in &composition.components {
            check_designator(issues, "component", &component.short_name);
            for port in &component.ports {
                check_designator(issues, "port", &port.short_name);
            }
        }
    }
}

fn check_designator(issues: &mut Vec<Issue>, kind: &str, name: &str) {
    if name.is_empty() {
        issues.push(Issue::error(format!("{} has an empty short name", kind), None));
        return;
    }
    if !valid_designator(name) {
        issues.push(Issue::warning(
            format!("{} name '{}' violates the naming convention", kind, name),
            Some(name.to_string()),
        ));
    }
}

fn valid_designator(name: &str) -> bool {
    if name.len() > MAX_NAME_LEN {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// No two sibling entities of the same kind may share a designator. One
/// issue is reported per duplicated name, not per occurrence.
fn check_sibling_duplicates(document: &ArxmlDocument, issues: &mut Vec<Issue>) {
    report_duplicates(
        issues,
        "component",
        document.components().iter().map(|c| c.short_name.as_str()),
    );
    report_duplicates(
        issues,
        "port interface",
        document.port_interfaces().iter().map(|i| i.short_name.as_str()),
    );
    report_duplicates(
        issues,
        "composition",
        document.compositions().iter().map(|c| c.short_name.as_str()),
    );
    for composition in document.compositions() {
        report_duplicates(
            issues,
            "component",
            composition.components.iter().map(|c| c.short_name.as_str()),
        );
        for component in &composition.components {
            check_intra_entity(issues, component);
        }
    }
    for component in document.components() {
        check_intra_entity(issues, component);
    }
    for interface in document.port_interfaces() {
        check_interface_elements(issues, interface);
    }
}

fn check_intra_entity(issues: &mut Vec<Issue>, component: &SwComponentType) {
    report_duplicates(
        issues,
        "port",
        component.ports.iter().map(|p| p.short_name.as_str()),
    );
}

fn check_interface_elements(issues: &mut Vec<Issue>, interface: &PortInterface) {
    report_duplicates(
        issues,
        "data element",
        interface.data_elements.iter().map(|d| d.short_name.as_str()),
    );
    report_duplicates(
        issues,
        "operation",
        interface.service_elements.iter().map(|s| s.short_name.as_str()),
    );
}

fn report_duplicates<'a>(
    issues: &mut Vec<Issue>,
    kind: &str,
    names: impl Iterator<Item = &'a str>,
) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for name in names {
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }
    for name in order {
        if counts[name] > 1 {
            issues.push(Issue::error(
                format!("duplicate {} short name '{}'", kind, name),
                Some(name.to_string()),
            ));
        }
    }
}

/// Every recorded connection must join ports with compatible directions;
/// when both ports carry resolved interfaces, those interfaces must have
/// the same shape.
fn check_connections(document: &ArxmlDocument, issues: &mut Vec<Issue>) {
    for composition in document.compositions() {
        for connection in &composition.connections {
            let source = document.find_port(&connection.source);
            let target = document.find_port(&connection.target);
            let (source, target) = match (source, target) {
                (Some(s), Some(t)) => (s, t),
                _ => {
                    issues.push(Issue::warning(
                        format!(
                            "connection '{}' references a missing port",
                            connection.name
                        ),
                        Some(connection.name.clone()),
                    ));
                    continue;
                }
            };

            if !source.direction.compatible_with(target.direction) {
                issues.push(Issue::error(
                    format!(
                        "connection '{}' joins incompatible port directions ({} to {})",
                        connection.name,
                        source.direction.tag(),
                        target.direction.tag()
                    ),
                    Some(connection.name.clone()),
                ));
            }

            let interfaces = document.port_interfaces();
            let source_if = source.resolved_interface.and_then(|i| interfaces.get(i));
            let target_if = target.resolved_interface.and_then(|i| interfaces.get(i));
            if let (Some(s), Some(t)) = (source_if, target_if) {
                if !same_shape(s, t) {
                    issues.push(Issue::warning(
                        format!(
                            "connection '{}' joins structurally incompatible interfaces ('{}' and '{}')",
                            connection.name, s.short_name, t.short_name
                        ),
                        Some(connection.name.clone()),
                    ));
                }
            }
        }
    }
}

/// Two interfaces are shape compatible when they are of the same kind and
/// declare the same element names with the same data types.
fn same_shape(a: &PortInterface, b: &PortInterface) -> bool {
    if a.is_service != b.is_service {
        return false;
    }
    if a.is_service {
        let mut a_ops: Vec<&str> = a.service_elements.iter().map(|s| s.short_name.as_str()).collect();
        let mut b_ops: Vec<&str> = b.service_elements.iter().map(|s| s.short_name.as_str()).collect();
        a_ops.sort_unstable();
        b_ops.sort_unstable();
        a_ops == b_ops
    } else {
        let mut a_data: Vec<(&str, _)> = a
            .data_elements
            .iter()
            .map(|d| (d.short_name.as_str(), d.data_type))
            .collect();
        let mut b_data: Vec<(&str, _)> = b
            .data_elements
            .iter()
            .map(|d| (d.short_name.as_str(), d.data_type))
            .collect();
        a_data.sort_unstable();
        b_data.sort_unstable();
        a_data == b_data
    }
}

/// When a schema asset exists for the detected version, the serialized form
/// is checked against it; without an asset the pass is silently skipped.
fn check_schema_compliance(document: &ArxmlDocument, issues: &mut Vec<Issue>) {
    if !version::schema_asset_available(document.version()) {
        log::debug!(
            "no schema asset for version {}, skipping schema pass",
            document.version()
        );
        return;
    }
    let serialized = match crate::builder::save_arxml_to_string(document) {
        Ok(s) => s,
        Err(e) => {
            issues.push(Issue::error(format!("serialization failed: {}", e), None));
            return;
        }
    };
    if let Err(e) = well_formed(&serialized) {
        issues.push(Issue::error(format!("schema compliance: {}", e), None));
    }
}

fn well_formed(xml: &str) -> Result<(), ArxmlError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
        }
    }
}
