// crates/arxml-rs/src/parser/config.rs

//! Recursive extraction of the ECUC configuration subtree.
//!
//! ECUC content is open-ended, so it is parsed generically: every element
//! whose name matches the `ECUC-…-VALUE`/`ECUC-…-VALUES` pattern becomes a
//! [`ConfigNode`], wrapper elements (`CONTAINERS`, `SUB-CONTAINERS`,
//! `PARAMETER-VALUES`, `REFERENCE-VALUES`) are transparent, and any other
//! child with text content becomes a scalar [`ConfigField`]. `<ADMIN-DATA>`
//! blocks are captured raw and re-emitted verbatim on save.

use super::{attr_value, local_name, raw_slice, read_text_content, skip_element};
use crate::error::ArxmlError;
use crate::types::{ConfigField, ConfigNode, ConfigRole};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Wrapper elements that group config children without contributing to the
/// designator path.
fn is_wrapper(name: &str) -> bool {
    matches!(
        name,
        "CONTAINERS" | "SUB-CONTAINERS" | "PARAMETER-VALUES" | "REFERENCE-VALUES"
    )
}

/// Whether an element name denotes a nested config node rather than a
/// scalar field of the current one.
fn is_config_child(name: &str) -> bool {
    name.starts_with("ECUC-") && (name.ends_with("-VALUE") || name.ends_with("-VALUES"))
}

/// Parses one config element whose start tag `start` has already been
/// consumed, recursing into nested config children with no depth limit.
pub(super) fn parse_config_node(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    start: &BytesStart<'_>,
) -> Result<ConfigNode, ArxmlError> {
    let mut node = ConfigNode::new(local_name(start)?);
    node.uuid = attr_value(start, "UUID")?;
    let mut depth = 0usize;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event() {
            Err(e) => return Err(ArxmlError::syntax_at(e, reader.error_position())),
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                if name == "SHORT-NAME" && depth == 0 && node.short_name.is_none() {
                    node.short_name = Some(read_text_content(reader, &e)?);
                } else if name == "ADMIN-DATA" && depth == 0 {
                    skip_element(reader, &e)?;
                    node.admin_data =
                        Some(raw_slice(xml, pos, reader.buffer_position() as usize));
                } else if is_config_child(&name) {
                    let child = parse_config_node(reader, xml, &e)?;
                    let role = ConfigRole::for_kind(&child.kind);
                    node.children.push((role, child));
                } else if is_wrapper(&name) {
                    depth += 1;
                } else {
                    let dest = attr_value(&e, "DEST")?;
                    let value = read_text_content(reader, &e)?;
                    node.fields.push(ConfigField {
                        key: name,
                        value,
                        dest,
                    });
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
                    "unexpected end of file inside a configuration element",
                ));
            }
            Ok(_) => {}
        }
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use crate::parser::load_arxml_from_str;
    use crate::types::ConfigRole;

    const ECUC_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AUTOSAR xmlns="http://autosar.org/schema/r4.0">
  <AR-PACKAGES>
    <AR-PACKAGE>
      <SHORT-NAME>Pkg</SHORT-NAME>
      <ELEMENTS>
        <ECUC-MODULE-CONFIGURATION-VALUES UUID="a-b-c">
          <SHORT-NAME>CanConfig</SHORT-NAME>
          <DEFINITION-REF DEST="ECUC-MODULE-DEF">/AUTOSAR/Can</DEFINITION-REF>
          <CONTAINERS>
            <ECUC-CONTAINER-VALUE>
              <SHORT-NAME>CanGeneral</SHORT-NAME>
              <PARAMETER-VALUES>
                <ECUC-NUMERICAL-PARAM-VALUE>
                  <DEFINITION-REF DEST="ECUC-INTEGER-PARAM-DEF">/AUTOSAR/Can/Timeout</DEFINITION-REF>
                  <VALUE>100</VALUE>
                </ECUC-NUMERICAL-PARAM-VALUE>
              </PARAMETER-VALUES>
            </ECUC-CONTAINER-VALUE>
          </CONTAINERS>
        </ECUC-MODULE-CONFIGURATION-VALUES>
      </ELEMENTS>
    </AR-PACKAGE>
  </AR-PACKAGES>
</AUTOSAR>"#;

    #[test]
    fn parses_nested_config_tree() {
        let output = load_arxml_from_str(ECUC_XML).unwrap();
        let roots = output.document.config_roots();
        assert_eq!(roots.len(), 1);

        let module = &roots[0];
        assert_eq!(module.kind, "ECUC-MODULE-CONFIGURATION-VALUES");
        assert_eq!(module.short_name.as_deref(), Some("CanConfig"));
        assert_eq!(module.uuid.as_deref(), Some("a-b-c"));
        assert_eq!(module.field("DEFINITION-REF"), Some("/AUTOSAR/Can"));

        let (role, container) = &module.children[0];
        assert_eq!(*role, ConfigRole::Container);
        assert_eq!(container.short_name.as_deref(), Some("CanGeneral"));

        let (role, param) = &container.children[0];
        assert_eq!(*role, ConfigRole::Parameter);
        assert_eq!(param.kind, "ECUC-NUMERICAL-PARAM-VALUE");
        assert_eq!(param.field("VALUE"), Some("100"));
        assert_eq!(
            param.fields[0].dest.as_deref(),
            Some("ECUC-INTEGER-PARAM-DEF")
        );
    }

    #[test]
    fn assigns_designator_paths_from_the_forest_root() {
        let output = load_arxml_from_str(ECUC_XML).unwrap();
        let roots = output.document.config_roots();
        let module = &roots[0];
        assert_eq!(
            module.path.to_string(),
            "/ECUC-MODULE-CONFIGURATION-VALUES:CanConfig"
        );
        let (_, container) = &module.children[0];
        assert_eq!(
            container.path.to_string(),
            "/ECUC-MODULE-CONFIGURATION-VALUES:CanConfig/ECUC-CONTAINER-VALUE:CanGeneral"
        );
    }
}
