// crates/arxml-rs/tests/identity.rs

//! Integration tests for the canonical store: one live instance per
//! designator path, aliasing-safe edits through `resolve` + `mutate`, and
//! the end-to-end rename scenario.

use arxml_rs::{load_arxml_from_str, save_arxml_to_string};

/// One ECUC module with two nested containers.
const TWO_CONTAINERS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AUTOSAR xmlns="http://autosar.org/schema/r4.0">
  <AR-PACKAGES>
    <AR-PACKAGE>
      <SHORT-NAME>Ecu</SHORT-NAME>
      <ELEMENTS>
        <ECUC-MODULE-CONFIGURATION-VALUES>
          <SHORT-NAME>NvmConfig</SHORT-NAME>
          <DEFINITION-REF DEST="ECUC-MODULE-DEF">/AUTOSAR/NvM</DEFINITION-REF>
          <CONTAINERS>
            <ECUC-CONTAINER-VALUE>
              <SHORT-NAME>BlockA</SHORT-NAME>
              <PARAMETER-VALUES>
                <ECUC-NUMERICAL-PARAM-VALUE>
                  <DEFINITION-REF DEST="ECUC-INTEGER-PARAM-DEF">/AUTOSAR/NvM/BlockSize</DEFINITION-REF>
                  <VALUE>64</VALUE>
                </ECUC-NUMERICAL-PARAM-VALUE>
              </PARAMETER-VALUES>
            </ECUC-CONTAINER-VALUE>
            <ECUC-CONTAINER-VALUE>
              <SHORT-NAME>BlockB</SHORT-NAME>
            </ECUC-CONTAINER-VALUE>
          </CONTAINERS>
        </ECUC-MODULE-CONFIGURATION-VALUES>
      </ELEMENTS>
    </AR-PACKAGE>
  </AR-PACKAGES>
</AUTOSAR>"#;

const BLOCK_A_PATH: &str =
    "/ECUC-MODULE-CONFIGURATION-VALUES:NvmConfig/ECUC-CONTAINER-VALUE:BlockA";

#[test]
fn canonical_uniqueness_holds_after_resolve_and_mutate() {
    let mut doc = load_arxml_from_str(TWO_CONTAINERS).unwrap().document;
    let count = doc.config_node_count();

    // resolving existing snapshots must not create anything
    let roots = doc.config_roots();
    let (_, block_a) = &roots[0].children[0];
    let id = doc.resolve(block_a);
    assert_eq!(doc.config_node_count(), count);

    doc.mutate(id, "VALUE", "128").unwrap();
    assert_eq!(doc.config_node_count(), count);

    // exactly one node answers for the path
    assert_eq!(doc.resolve_path(BLOCK_A_PATH), Some(id));
}

/// Identically-named siblings arriving from the input file collapse into
/// one canonical node at load time, so a rename cannot leave a stale twin
/// behind in the serialized output.
#[test]
fn duplicate_siblings_from_input_collapse_on_load() {
    let doubled = TWO_CONTAINERS.replace("BlockB", "BlockA");
    let mut doc = load_arxml_from_str(&doubled).unwrap().document;

    let roots = doc.config_roots();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].children.len(), 1);

    let id = doc.resolve_path(BLOCK_A_PATH).unwrap();
    doc.mutate(id, "short_name", "Renamed").unwrap();

    let serialized = save_arxml_to_string(&doc).unwrap();
    assert!(!serialized.contains("BlockA"));
    assert_eq!(serialized.matches(">Renamed<").count(), 1);
}

/// Two references to the same path converge onto one instance: a write
/// through the first is visible through the second.
#[test]
fn edit_convergence_for_stale_references() {
    let mut doc = load_arxml_from_str(TWO_CONTAINERS).unwrap().document;

    let roots_before = doc.config_roots();
    let (_, r1) = &roots_before[0].children[0];
    let r2 = r1.clone(); // a copy an external caller kept around

    let id = doc.resolve(r1);
    doc.mutate(id, "short_name", "Renamed").unwrap();

    let converged_id = doc.resolve(&r2);
    let converged = doc.config_node(converged_id).unwrap();
    assert_eq!(converged.short_name.as_deref(), Some("Renamed"));
}

#[test]
fn resolve_inserts_genuinely_new_nodes_exactly_once() {
    let mut doc = load_arxml_from_str(TWO_CONTAINERS).unwrap().document;
    let count = doc.config_node_count();

    let mut fresh = arxml_rs::ConfigNode::new("ECUC-CONTAINER-VALUE");
    fresh.short_name = Some("BlockC".to_string());
    fresh.path = arxml_rs::DesignatorPath::root()
        .child("ECUC-MODULE-CONFIGURATION-VALUES", "NvmConfig")
        .child("ECUC-CONTAINER-VALUE", "BlockC");

    let id = doc.resolve(&fresh);
    assert_eq!(doc.config_node_count(), count + 1);
    // resolving the same candidate again finds the inserted instance
    assert_eq!(doc.resolve(&fresh), id);
    assert_eq!(doc.config_node_count(), count + 1);

    // it was attached under the module, not as a new root
    let roots = doc.config_roots();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].children.len(), 3);
}

#[test]
fn mutate_after_removal_reports_not_found() {
    let mut doc = load_arxml_from_str(TWO_CONTAINERS).unwrap().document;
    let id = doc.resolve_path(BLOCK_A_PATH).unwrap();

    assert!(doc.remove_config_node(id));
    assert!(matches!(
        doc.mutate(id, "VALUE", "1"),
        Err(arxml_rs::ArxmlError::ElementNotFound { .. })
    ));
}

/// The end-to-end scenario: rename a container through resolve + mutate,
/// serialize, re-parse, and check the new name appears exactly once with
/// the old name gone.
#[test]
fn rename_survives_a_save_load_cycle() {
    let mut doc = load_arxml_from_str(TWO_CONTAINERS).unwrap().document;

    let id = doc.resolve_path(BLOCK_A_PATH).unwrap();
    doc.mutate(id, "short_name", "BlockRenamed").unwrap();
    assert!(doc.is_modified());

    let serialized = save_arxml_to_string(&doc).unwrap();
    assert_eq!(serialized.matches("BlockRenamed").count(), 1);
    assert!(!serialized.contains(">BlockA<"));

    let reparsed = load_arxml_from_str(&serialized).unwrap().document;
    let renamed = reparsed
        .config_node_at("/ECUC-MODULE-CONFIGURATION-VALUES:NvmConfig/ECUC-CONTAINER-VALUE:BlockRenamed")
        .unwrap();
    // the container kept its parameter through the rename
    assert_eq!(renamed.children.len(), 1);
    assert!(reparsed
        .config_node_at(BLOCK_A_PATH)
        .is_none());
}
