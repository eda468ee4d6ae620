// crates/arxml-rs/tests/parsing.rs

//! Integration tests for extraction: typed entities, the ECUC config
//! forest and preserved-unknown fragments all coming out of one document.

use arxml_rs::{
    ComponentCategory, ConfigRole, ElementDataType, PortDirection, load_arxml_from_str,
};

/// A document exercising every extraction tier at once.
const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AUTOSAR xmlns="http://autosar.org/schema/r4.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://autosar.org/schema/r4.0 AUTOSAR_4-7-0.xsd">
  <AR-PACKAGES>
    <AR-PACKAGE>
      <SHORT-NAME>Demo</SHORT-NAME>
      <ELEMENTS>
        <APPLICATION-SW-COMPONENT-TYPE>
          <SHORT-NAME>EngineController</SHORT-NAME>
          <DESC>
            <L-2>Controls the engine.</L-2>
          </DESC>
          <PORTS>
            <P-PORT-PROTOTYPE>
              <SHORT-NAME>SpeedOut</SHORT-NAME>
              <PROVIDED-INTERFACE-TREF DEST="SENDER-RECEIVER-INTERFACE">/Demo/SpeedIf</PROVIDED-INTERFACE-TREF>
            </P-PORT-PROTOTYPE>
            <R-PORT-PROTOTYPE>
              <SHORT-NAME>FuelIn</SHORT-NAME>
              <REQUIRED-INTERFACE-TREF DEST="SENDER-RECEIVER-INTERFACE">/Demo/FuelIf</REQUIRED-INTERFACE-TREF>
            </R-PORT-PROTOTYPE>
          </PORTS>
        </APPLICATION-SW-COMPONENT-TYPE>
        <ATOMIC-SW-COMPONENT-TYPE>
          <SHORT-NAME>FuelSensor</SHORT-NAME>
        </ATOMIC-SW-COMPONENT-TYPE>
        <SENDER-RECEIVER-INTERFACE>
          <SHORT-NAME>SpeedIf</SHORT-NAME>
          <DATA-ELEMENTS>
            <DATA-ELEMENT-PROTOTYPE>
              <SHORT-NAME>Rpm</SHORT-NAME>
              <TYPE-TREF DEST="IMPLEMENTATION-DATA-TYPE">/DataTypes/uint16_integer</TYPE-TREF>
            </DATA-ELEMENT-PROTOTYPE>
            <DATA-ELEMENT-PROTOTYPE>
              <SHORT-NAME>Valid</SHORT-NAME>
              <TYPE-TREF DEST="IMPLEMENTATION-DATA-TYPE">/DataTypes/boolean</TYPE-TREF>
            </DATA-ELEMENT-PROTOTYPE>
          </DATA-ELEMENTS>
        </SENDER-RECEIVER-INTERFACE>
        <CLIENT-SERVER-INTERFACE>
          <SHORT-NAME>DiagnosticsIf</SHORT-NAME>
          <OPERATIONS>
            <OPERATION>
              <SHORT-NAME>ReadFault</SHORT-NAME>
            </OPERATION>
          </OPERATIONS>
        </CLIENT-SERVER-INTERFACE>
        <COMPOSITION>
          <SHORT-NAME>Powertrain</SHORT-NAME>
          <COMPONENTS>
            <APPLICATION-SW-COMPONENT-TYPE>
              <SHORT-NAME>Gearbox</SHORT-NAME>
            </APPLICATION-SW-COMPONENT-TYPE>
          </COMPONENTS>
        </COMPOSITION>
        <ECUC-MODULE-CONFIGURATION-VALUES UUID="0f3c-11aa">
          <SHORT-NAME>CanConfig</SHORT-NAME>
          <DEFINITION-REF DEST="ECUC-MODULE-DEF">/AUTOSAR/Can</DEFINITION-REF>
          <CONTAINERS>
            <ECUC-CONTAINER-VALUE>
              <SHORT-NAME>CanGeneral</SHORT-NAME>
              <PARAMETER-VALUES>
                <ECUC-NUMERICAL-PARAM-VALUE>
                  <DEFINITION-REF DEST="ECUC-INTEGER-PARAM-DEF">/AUTOSAR/Can/MainFunctionPeriod</DEFINITION-REF>
                  <VALUE>10</VALUE>
                </ECUC-NUMERICAL-PARAM-VALUE>
              </PARAMETER-VALUES>
            </ECUC-CONTAINER-VALUE>
          </CONTAINERS>
        </ECUC-MODULE-CONFIGURATION-VALUES>
        <BSW-MODULE-DESCRIPTION>
          <SHORT-NAME>CanDrv</SHORT-NAME>
          <CATEGORY>BSW_MODULE</CATEGORY>
        </BSW-MODULE-DESCRIPTION>
      </ELEMENTS>
    </AR-PACKAGE>
  </AR-PACKAGES>
</AUTOSAR>"#;

#[test]
fn extracts_components_with_ports_and_descriptions() {
    let output = load_arxml_from_str(SAMPLE).unwrap();
    let doc = &output.document;

    assert_eq!(doc.package_name(), "Demo");
    assert_eq!(doc.components().len(), 2);

    let engine = doc.component_by_name("EngineController").unwrap();
    assert_eq!(engine.category, ComponentCategory::Application);
    assert_eq!(engine.desc.as_deref(), Some("Controls the engine."));
    assert_eq!(engine.ports.len(), 2);

    let speed_out = engine.port("SpeedOut").unwrap();
    assert_eq!(speed_out.direction, PortDirection::Provider);
    assert_eq!(speed_out.interface_ref.as_deref(), Some("/Demo/SpeedIf"));
    // the reference resolves to the SpeedIf interface parsed below it
    assert_eq!(speed_out.resolved_interface, Some(0));

    let fuel_in = engine.port("FuelIn").unwrap();
    assert_eq!(fuel_in.direction, PortDirection::Requirer);
    // FuelIf is not declared in the document
    assert_eq!(fuel_in.resolved_interface, None);

    let sensor = doc.component_by_name("FuelSensor").unwrap();
    assert_eq!(sensor.category, ComponentCategory::Atomic);
    assert!(sensor.ports.is_empty());
}

#[test]
fn extracts_interfaces_with_typed_data_elements() {
    let output = load_arxml_from_str(SAMPLE).unwrap();
    let doc = &output.document;

    let speed_if = doc.interface_by_name("SpeedIf").unwrap();
    assert!(!speed_if.is_service);
    assert_eq!(speed_if.data_elements.len(), 2);
    assert_eq!(speed_if.data_elements[0].short_name, "Rpm");
    assert_eq!(speed_if.data_elements[0].data_type, ElementDataType::Integer);
    assert_eq!(speed_if.data_elements[1].data_type, ElementDataType::Boolean);

    let diag_if = doc.interface_by_name("DiagnosticsIf").unwrap();
    assert!(diag_if.is_service);
    assert_eq!(diag_if.service_elements.len(), 1);
    assert_eq!(diag_if.service_elements[0].short_name, "ReadFault");
    assert_eq!(diag_if.service_elements[0].kind, "operation");
}

#[test]
fn extracts_compositions_with_owned_components() {
    let output = load_arxml_from_str(SAMPLE).unwrap();
    let doc = &output.document;

    let powertrain = doc.composition_by_name("Powertrain").unwrap();
    assert_eq!(powertrain.components.len(), 1);
    assert_eq!(powertrain.components[0].short_name, "Gearbox");
    assert!(powertrain.connections.is_empty());
}

#[test]
fn extracts_the_config_forest_with_roles_and_paths() {
    let output = load_arxml_from_str(SAMPLE).unwrap();
    let roots = output.document.config_roots();

    assert_eq!(roots.len(), 1);
    let module = &roots[0];
    assert_eq!(module.short_name.as_deref(), Some("CanConfig"));
    assert_eq!(module.uuid.as_deref(), Some("0f3c-11aa"));

    let (role, container) = &module.children[0];
    assert_eq!(*role, ConfigRole::Container);
    let (role, param) = &container.children[0];
    assert_eq!(*role, ConfigRole::Parameter);
    assert_eq!(param.field("VALUE"), Some("10"));

    // module, container and parameter; wrappers contribute no nodes
    assert_eq!(output.document.config_node_count(), 3);
}

#[test]
fn preserves_unknown_elements_byte_identical() {
    let output = load_arxml_from_str(SAMPLE).unwrap();
    let fragments = output.document.fragments();

    assert_eq!(fragments.len(), 1);
    let fragment = &fragments[0];
    assert_eq!(fragment.tag, "BSW-MODULE-DESCRIPTION");
    assert_eq!(fragment.short_name.as_deref(), Some("CanDrv"));
    assert!(fragment.raw.starts_with("<BSW-MODULE-DESCRIPTION>"));
    assert!(fragment.raw.ends_with("</BSW-MODULE-DESCRIPTION>"));
    assert!(fragment.raw.contains("<CATEGORY>BSW_MODULE</CATEGORY>"));
}

/// A fragment with no short name of its own is not named by the short name
/// of a nested child, so it can never shadow a config root by accident.
#[test]
fn fragment_short_name_is_taken_from_the_root_level_only() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<AUTOSAR xmlns="http://autosar.org/schema/r4.0">
  <AR-PACKAGES>
    <AR-PACKAGE>
      <SHORT-NAME>Pkg</SHORT-NAME>
      <ELEMENTS>
        <TIMING-EXTENSION>
          <TIMING-REQUIREMENTS>
            <TIMING-REQUIREMENT>
              <SHORT-NAME>Latency</SHORT-NAME>
            </TIMING-REQUIREMENT>
          </TIMING-REQUIREMENTS>
        </TIMING-EXTENSION>
      </ELEMENTS>
    </AR-PACKAGE>
  </AR-PACKAGES>
</AUTOSAR>"#;

    let output = load_arxml_from_str(xml).unwrap();
    let fragments = output.document.fragments();
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].tag, "TIMING-EXTENSION");
    assert_eq!(fragments[0].short_name, None);
}

#[test]
fn detects_the_schema_version_during_load() {
    let output = load_arxml_from_str(SAMPLE).unwrap();
    assert_eq!(output.document.version().as_str(), "4.7.0");
    assert!(output.warnings.is_empty());
}

#[test]
fn elements_from_multiple_packages_are_all_collected() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<AUTOSAR xmlns="http://autosar.org/schema/r4.0">
  <AR-PACKAGES>
    <AR-PACKAGE>
      <SHORT-NAME>First</SHORT-NAME>
      <ELEMENTS>
        <ATOMIC-SW-COMPONENT-TYPE>
          <SHORT-NAME>A</SHORT-NAME>
        </ATOMIC-SW-COMPONENT-TYPE>
      </ELEMENTS>
    </AR-PACKAGE>
    <AR-PACKAGE>
      <SHORT-NAME>Second</SHORT-NAME>
      <ELEMENTS>
        <ATOMIC-SW-COMPONENT-TYPE>
          <SHORT-NAME>B</SHORT-NAME>
        </ATOMIC-SW-COMPONENT-TYPE>
      </ELEMENTS>
    </AR-PACKAGE>
  </AR-PACKAGES>
</AUTOSAR>"#;
    let output = load_arxml_from_str(xml).unwrap();
    assert_eq!(output.document.components().len(), 2);
    // the first package names the document
    assert_eq!(output.document.package_name(), "First");
}
