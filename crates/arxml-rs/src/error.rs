// crates/arxml-rs/src/error.rs

use quick_xml::encoding::EncodingError;
use quick_xml::events::attributes::AttrError;
use std::fmt;
use std::io;
use std::str::Utf8Error;

/// Errors that can occur while loading, editing or saving an ARXML document.
#[derive(Debug)]
pub enum ArxmlError {
    /// The file could not be read or written.
    Io(io::Error),

    /// The underlying XML was syntactically broken. Fatal to the parse.
    XmlSyntax {
        source: quick_xml::Error,
        /// Byte offset into the input, when the reader could report one.
        position: Option<u64>,
    },

    /// An XML attribute could not be decoded.
    InvalidAttribute(AttrError),

    /// Text content could not be decoded.
    Encoding(EncodingError),

    /// An element or attribute name was not valid UTF-8.
    Utf8(Utf8Error),

    /// The document was well-formed XML but not an ARXML document
    /// (e.g. the root element is not `AUTOSAR`).
    MalformedDocument(&'static str),

    /// A mutation target vanished: no element exists at the designator path.
    ElementNotFound { path: String },

    /// No schema asset is available for the detected version. Non-fatal;
    /// schema validation degrades to "skipped".
    SchemaUnavailable { version: String },
}

impl From<io::Error> for ArxmlError {
    fn from(e: io::Error) -> Self {
        ArxmlError::Io(e)
    }
}

impl From<quick_xml::Error> for ArxmlError {
    fn from(e: quick_xml::Error) -> Self {
        ArxmlError::XmlSyntax {
            source: e,
            position: None,
        }
    }
}

impl From<AttrError> for ArxmlError {
    fn from(e: AttrError) -> Self {
        ArxmlError::InvalidAttribute(e)
    }
}

impl From<EncodingError> for ArxmlError {
    fn from(e: EncodingError) -> Self {
        ArxmlError::Encoding(e)
    }
}

impl From<Utf8Error> for ArxmlError {
    fn from(e: Utf8Error) -> Self {
        ArxmlError::Utf8(e)
    }
}

impl ArxmlError {
    /// Attaches a byte position to an XML syntax error.
    pub(crate) fn syntax_at(source: quick_xml::Error, position: u64) -> Self {
        ArxmlError::XmlSyntax {
            source,
            position: Some(position),
        }
    }
}

impl fmt::Display for ArxmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArxmlError::Io(e) => write!(f, "I/O error: {}", e),
            ArxmlError::XmlSyntax {
                source,
                position: Some(pos),
            } => write!(f, "XML syntax error at byte {}: {}", pos, source),
            ArxmlError::XmlSyntax {
                source,
                position: None,
            } => write!(f, "XML syntax error: {}", source),
            ArxmlError::InvalidAttribute(e) => write!(f, "Invalid XML attribute: {}", e),
            ArxmlError::Encoding(e) => write!(f, "Encoding error: {}", e),
            ArxmlError::Utf8(e) => write!(f, "Invalid UTF-8: {}", e),
            ArxmlError::MalformedDocument(msg) => write!(f, "Malformed ARXML document: {}", msg),
            ArxmlError::ElementNotFound { path } => {
                write!(f, "No element exists at designator path {}", path)
            }
            ArxmlError::SchemaUnavailable { version } => {
                write!(f, "No schema asset available for version {}", version)
            }
        }
    }
}

impl std::error::Error for ArxmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArxmlError::Io(e) => Some(e),
            ArxmlError::XmlSyntax { source, .. } => Some(source),
            ArxmlError::InvalidAttribute(e) => Some(e),
            ArxmlError::Encoding(e) => Some(e),
            ArxmlError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ArxmlError;

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ArxmlError = io_err.into();
        assert!(matches!(err, ArxmlError::Io(_)));
    }

    #[test]
    fn test_from_xml_error() {
        let xml_err = quick_xml::Error::Syntax(quick_xml::errors::SyntaxError::UnclosedComment);
        let err: ArxmlError = xml_err.into();
        assert!(matches!(
            err,
            ArxmlError::XmlSyntax { position: None, .. }
        ));
    }

    #[test]
    fn test_syntax_at_carries_position() {
        let xml_err = quick_xml::Error::Syntax(quick_xml::errors::SyntaxError::UnclosedComment);
        let err = ArxmlError::syntax_at(xml_err, 42);
        match err {
            ArxmlError::XmlSyntax { position, .. } => assert_eq!(position, Some(42)),
            other => panic!("expected XmlSyntax, got {:?}", other),
        }
    }

    #[test]
    fn test_element_not_found_display() {
        let err = ArxmlError::ElementNotFound {
            path: "/ECUC-MODULE-CONFIGURATION-VALUES:EcuC".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("designator path"));
        assert!(msg.contains("EcuC"));
    }
}
