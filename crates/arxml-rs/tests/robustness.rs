// crates/arxml-rs/tests/robustness.rs

//! Integration tests focused on error handling and edge cases.
//!
//! Byte-level XML breakage must surface as a hard error; per-element
//! problems (a typed element missing its short name) must degrade to a
//! recorded warning without aborting the parse.

use arxml_rs::{ArxmlError, load_arxml_from_str};

/// A minimal valid document used as a base for corrupted test cases.
const MINIMAL_VALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AUTOSAR xmlns="http://autosar.org/schema/r4.0">
  <AR-PACKAGES>
    <AR-PACKAGE>
      <SHORT-NAME>Pkg</SHORT-NAME>
      <ELEMENTS>
        <ATOMIC-SW-COMPONENT-TYPE>
          <SHORT-NAME>Comp</SHORT-NAME>
        </ATOMIC-SW-COMPONENT-TYPE>
      </ELEMENTS>
    </AR-PACKAGE>
  </AR-PACKAGES>
</AUTOSAR>"#;

#[test]
fn parses_the_minimal_document() {
    let output = load_arxml_from_str(MINIMAL_VALID_XML).unwrap();
    assert_eq!(output.document.components().len(), 1);
    assert!(output.warnings.is_empty());
}

#[test]
fn mismatched_tags_are_a_hard_error() {
    let corrupted = MINIMAL_VALID_XML.replace("</ATOMIC-SW-COMPONENT-TYPE>", "</WRONG-TAG>");
    let result = load_arxml_from_str(&corrupted);
    assert!(matches!(result, Err(ArxmlError::XmlSyntax { .. })));
}

#[test]
fn a_truncated_document_is_a_hard_error() {
    let truncated = &MINIMAL_VALID_XML[..MINIMAL_VALID_XML.len() / 2];
    assert!(load_arxml_from_str(truncated).is_err());
}

#[test]
fn a_wrong_root_element_is_rejected() {
    let wrong_root = MINIMAL_VALID_XML
        .replace("<AUTOSAR ", "<NOT-AUTOSAR ")
        .replace("</AUTOSAR>", "</NOT-AUTOSAR>");
    let result = load_arxml_from_str(&wrong_root);
    assert!(matches!(result, Err(ArxmlError::MalformedDocument(_))));
}

#[test]
fn a_non_autosar_namespace_is_rejected() {
    let foreign = MINIMAL_VALID_XML.replace(
        "http://autosar.org/schema/r4.0",
        "http://example.org/other-schema",
    );
    let result = load_arxml_from_str(&foreign);
    assert!(matches!(result, Err(ArxmlError::MalformedDocument(_))));
}

#[test]
fn content_without_any_element_is_rejected() {
    assert!(matches!(
        load_arxml_from_str("just some text"),
        Err(ArxmlError::MalformedDocument(_))
    ));
}

#[test]
fn a_component_without_a_short_name_degrades_to_a_warning() {
    let nameless = MINIMAL_VALID_XML.replace("<SHORT-NAME>Comp</SHORT-NAME>", "");
    let output = load_arxml_from_str(&nameless).unwrap();

    assert!(output.document.components().is_empty());
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].contains("ATOMIC-SW-COMPONENT-TYPE"));
}

#[test]
fn an_empty_elements_container_is_fine() {
    let empty = MINIMAL_VALID_XML.replace(
        "<ATOMIC-SW-COMPONENT-TYPE>\n          <SHORT-NAME>Comp</SHORT-NAME>\n        </ATOMIC-SW-COMPONENT-TYPE>",
        "",
    );
    let output = load_arxml_from_str(&empty).unwrap();
    assert!(output.document.components().is_empty());
    assert!(output.warnings.is_empty());
}

#[test]
fn a_missing_namespace_still_parses_with_the_default_version() {
    let bare = MINIMAL_VALID_XML.replace(" xmlns=\"http://autosar.org/schema/r4.0\"", "");
    let output = load_arxml_from_str(&bare).unwrap();
    assert_eq!(output.document.version().as_str(), arxml_rs::DEFAULT_VERSION);
}

#[test]
fn syntax_errors_carry_a_position() {
    let corrupted = MINIMAL_VALID_XML.replace("</ATOMIC-SW-COMPONENT-TYPE>", "</WRONG-TAG>");
    match load_arxml_from_str(&corrupted) {
        Err(ArxmlError::XmlSyntax { position, .. }) => assert!(position.is_some()),
        other => panic!("expected a syntax error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_files_surface_as_io_errors() {
    let result = arxml_rs::load_arxml_from_file(std::path::Path::new("/nonexistent/file.arxml"));
    assert!(matches!(result, Err(ArxmlError::Io(_))));
}
