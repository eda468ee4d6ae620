// crates/arxml-rs/src/version.rs

//! Schema version detection for ARXML files.
//!
//! Detection is a pure function over the file content. Several signals are
//! tried in strict priority order and the highest supported version is the
//! documented fallback, so resolution never fails:
//!
//! 1. the document's default namespace URI, via a fixed table;
//! 2. the XSD file name inside `xsi:schemaLocation`;
//! 3. version-specific marker elements;
//! 4. an explicit `AUTOSAR-VERSION` attribute on the root element;
//! 5. the default ([`DEFAULT_VERSION`]).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt;
use std::fs;
use std::path::Path;

/// The fallback tag: the highest supported schema version.
pub const DEFAULT_VERSION: &str = "4.7.0";

/// An AUTOSAR schema version tag, formatted `"major.minor.patch"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        VersionTag(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace URI to emit for this version. Versions outside the
    /// catalog fall back to the default version's namespace.
    pub fn namespace(&self) -> &'static str {
        version_info(self.as_str())
            .map(|info| info.namespace)
            .unwrap_or("http://autosar.org/schema/r4.0")
    }

    /// The XSD file name referenced from `xsi:schemaLocation`,
    /// e.g. `AUTOSAR_4-7-0.xsd`.
    pub fn xsd_file_name(&self) -> String {
        format!("AUTOSAR_{}.xsd", self.0.replace('.', "-"))
    }
}

impl Default for VersionTag {
    fn default() -> Self {
        VersionTag(DEFAULT_VERSION.to_string())
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry describing one supported schema version.
#[derive(Debug, Clone, Copy)]
pub struct SchemaVersionInfo {
    pub version: &'static str,
    pub display_name: &'static str,
    /// XSD asset looked up relative to the working directory.
    pub xsd_file: &'static str,
    pub namespace: &'static str,
    pub description: &'static str,
}

/// Supported schema versions, newest first.
pub const SUPPORTED_VERSIONS: &[SchemaVersionInfo] = &[
    SchemaVersionInfo {
        version: "4.7.0",
        display_name: "AUTOSAR 4.7.0",
        xsd_file: "schemas/autosar_4-7-0.xsd",
        namespace: "http://autosar.org/schema/r4.0",
        description: "AUTOSAR Classic Platform 4.7.0",
    },
    SchemaVersionInfo {
        version: "4.6.0",
        display_name: "AUTOSAR 4.6.0",
        xsd_file: "schemas/autosar_4-6-0.xsd",
        namespace: "http://autosar.org/schema/r4.1",
        description: "AUTOSAR Classic Platform 4.6.0",
    },
    SchemaVersionInfo {
        version: "4.5.0",
        display_name: "AUTOSAR 4.5.0",
        xsd_file: "schemas/autosar_4-5-0.xsd",
        namespace: "http://autosar.org/schema/r4.2",
        description: "AUTOSAR Classic Platform 4.5.0",
    },
    SchemaVersionInfo {
        version: "4.4.0",
        display_name: "AUTOSAR 4.4.0",
        xsd_file: "schemas/autosar_4-4-0.xsd",
        namespace: "http://autosar.org/schema/r4.3",
        description: "AUTOSAR Classic Platform 4.4.0",
    },
    SchemaVersionInfo {
        version: "4.3.0",
        display_name: "AUTOSAR 4.3.0",
        xsd_file: "schemas/autosar_4-3-0.xsd",
        namespace: "http://autosar.org/schema/r4.4",
        description: "AUTOSAR Classic Platform 4.3.0",
    },
];

/// Default-namespace URI to version tag.
const NAMESPACE_VERSION_MAP: &[(&str, &str)] = &[
    ("http://autosar.org/schema/r4.0", "4.7.0"),
    ("http://autosar.org/schema/r4.1", "4.6.0"),
    ("http://autosar.org/schema/r4.2", "4.5.0"),
    ("http://autosar.org/schema/r4.3", "4.4.0"),
    ("http://autosar.org/schema/r4.4", "4.3.0"),
];

/// Marker elements whose presence pins a specific version. Extensible;
/// no fingerprints are registered for the currently supported versions.
const VERSION_MARKERS: &[(&str, &str)] = &[];

/// Looks up catalog information for a version tag.
pub fn version_info(version: &str) -> Option<&'static SchemaVersionInfo> {
    SUPPORTED_VERSIONS.iter().find(|info| info.version == version)
}

/// Whether the XSD asset for a version is present on disk. When it is not,
/// schema validation is skipped rather than failing.
pub fn schema_asset_available(version: &VersionTag) -> bool {
    version_info(version.as_str())
        .map(|info| Path::new(info.xsd_file).exists())
        .unwrap_or(false)
}

/// Detects the schema version of ARXML content. Never fails; unparsable or
/// empty content yields the default tag.
pub fn resolve_version(content: &str) -> VersionTag {
    let Some(root) = read_root_element(content) else {
        return VersionTag::default();
    };

    // 1. Default namespace lookup.
    if let Some(ns) = attribute_value(&root, "xmlns") {
        if let Some((_, version)) = NAMESPACE_VERSION_MAP.iter().find(|(uri, _)| *uri == ns) {
            return VersionTag::new(*version);
        }
    }

    // 2. XSD file name inside xsi:schemaLocation.
    if let Some(location) = attribute_value(&root, "xsi:schemaLocation") {
        if let Some(version) = version_from_schema_location(&location) {
            return version;
        }
    }

    // 3. Version-specific marker elements.
    if let Some(version) = version_from_markers(content) {
        return version;
    }

    // 4. Explicit version attribute on the root element.
    if let Some(declared) = attribute_value(&root, "AUTOSAR-VERSION") {
        if let Some(version) = map_declared_version(&declared) {
            return version;
        }
    }

    VersionTag::default()
}

/// File-path variant of [`resolve_version`]. An unreadable file yields the
/// default tag, matching the never-fails contract.
pub fn resolve_version_from_path(path: &Path) -> VersionTag {
    match fs::read_to_string(path) {
        Ok(content) => resolve_version(&content),
        Err(e) => {
            log::debug!("version detection: cannot read {}: {}", path.display(), e);
            VersionTag::default()
        }
    }
}

/// Reads the first start element of the document, owned so the borrow on the
/// input does not outlive this function.
fn read_root_element(content: &str) -> Option<BytesStart<'static>> {
    let mut reader = Reader::from_str(content);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => return Some(e.into_owned()),
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

fn attribute_value(elem: &BytesStart<'_>, name: &str) -> Option<String> {
    for attr in elem.attributes() {
        let attr = attr.ok()?;
        if attr.key.as_ref() == name.as_bytes() {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

/// Extracts `(major, minor, patch)` from an XSD file name inside a
/// `schemaLocation` string. Three separator conventions occur in the wild:
/// `AUTOSAR_4-7-0.xsd`, `AUTOSAR_4.7.0.xsd` and `AUTOSAR_4_7_0.xsd`.
fn version_from_schema_location(location: &str) -> Option<VersionTag> {
    for token in location.split_whitespace() {
        let Some(idx) = token.find("AUTOSAR_") else {
            continue;
        };
        let rest = &token[idx + "AUTOSAR_".len()..];
        let Some(rest) = rest.strip_suffix(".xsd") else {
            continue;
        };
        for sep in ['-', '.', '_'] {
            if let Some(version) = parse_version_triple(rest, sep) {
                return Some(version);
            }
        }
    }
    None
}

/// Parses `major<sep>minor<sep>patch` where all three parts are integers.
fn parse_version_triple(s: &str, sep: char) -> Option<VersionTag> {
    let mut parts = s.split(sep);
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next()?.parse().ok()?;
    let patch: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(VersionTag::new(format!("{}.{}.{}", major, minor, patch)))
}

/// Scans the document for registered marker elements.
fn version_from_markers(content: &str) -> Option<VersionTag> {
    if VERSION_MARKERS.is_empty() {
        return None;
    }
    let mut reader = Reader::from_str(content);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.name();
                let tag = std::str::from_utf8(name.as_ref()).ok()?;
                if let Some((_, version)) = VERSION_MARKERS.iter().find(|(m, _)| *m == tag) {
                    return Some(VersionTag::new(*version));
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// Maps an explicit root-attribute version string through the supported set.
fn map_declared_version(declared: &str) -> Option<VersionTag> {
    let trimmed = declared.trim();
    if version_info(trimmed).is_some() {
        return Some(VersionTag::new(trimmed));
    }
    // Accept a dotted triple embedded in a longer string.
    for (start, byte) in trimmed.bytes().enumerate() {
        if !byte.is_ascii_digit() {
            continue;
        }
        let tail: String = trimmed[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if let Some(version) = parse_version_triple(&tail, '.') {
            if version_info(version.as_str()).is_some() {
                return Some(version);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_mapping() {
        let xml = r#"<AUTOSAR xmlns="http://autosar.org/schema/r4.0"/>"#;
        assert_eq!(resolve_version(xml).as_str(), "4.7.0");

        let xml = r#"<AUTOSAR xmlns="http://autosar.org/schema/r4.1"/>"#;
        assert_eq!(resolve_version(xml).as_str(), "4.6.0");
    }

    #[test]
    fn test_schema_location_dash_convention() {
        let xml = r#"<AUTOSAR xsi:schemaLocation="http://autosar.org/schema/r4.0 AUTOSAR_4-6-0.xsd"/>"#;
        assert_eq!(resolve_version(xml).as_str(), "4.6.0");
    }

    #[test]
    fn test_schema_location_dot_and_underscore_conventions() {
        let xml = r#"<AUTOSAR xsi:schemaLocation="x AUTOSAR_4.5.0.xsd"/>"#;
        assert_eq!(resolve_version(xml).as_str(), "4.5.0");

        let xml = r#"<AUTOSAR xsi:schemaLocation="x AUTOSAR_4_4_0.xsd"/>"#;
        assert_eq!(resolve_version(xml).as_str(), "4.4.0");
    }

    #[test]
    fn test_declared_version_attribute() {
        let xml = r#"<AUTOSAR AUTOSAR-VERSION="4.5.0"/>"#;
        assert_eq!(resolve_version(xml).as_str(), "4.5.0");
    }

    #[test]
    fn test_namespace_wins_over_schema_location() {
        let xml = r#"<AUTOSAR xmlns="http://autosar.org/schema/r4.1" xsi:schemaLocation="x AUTOSAR_4-3-0.xsd"/>"#;
        assert_eq!(resolve_version(xml).as_str(), "4.6.0");
    }

    #[test]
    fn test_unparsable_content_falls_back_to_default() {
        assert_eq!(resolve_version("").as_str(), DEFAULT_VERSION);
        assert_eq!(resolve_version("not xml at all").as_str(), DEFAULT_VERSION);
    }

    #[test]
    fn test_xsd_file_name_formatting() {
        let tag = VersionTag::new("4.6.0");
        assert_eq!(tag.xsd_file_name(), "AUTOSAR_4-6-0.xsd");
    }
}
