//! Custom XML part encoding
//!
//! State is stored as a JSON string inside a single namespaced element:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
//! <trackedState xmlns="urn:tracked-tables:state" key="TrackedTables">{"tables":[]}</trackedState>
//! ```

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{StoreError, StoreResult};

/// Namespace used for state parts unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "urn:tracked-tables:state";

/// Root element name of a state part
pub const ROOT_ELEMENT: &str = "trackedState";

/// A decoded state part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePart {
    pub namespace: String,
    pub key: String,
    pub payload: String,
}

impl StatePart {
    pub fn new(
        namespace: impl Into<String>,
        key: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            payload: payload.into(),
        }
    }

    /// Whether this part holds the value for `key` in `namespace`
    pub fn matches(&self, namespace: &str, key: &str) -> bool {
        self.namespace == namespace && self.key == key
    }

    /// Encode as an XML document
    pub fn encode(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<{root} xmlns="{ns}" key="{key}">{payload}</{root}>"#,
            root = ROOT_ELEMENT,
            ns = escape(&self.namespace),
            key = escape(&self.key),
            payload = escape(&self.payload),
        )
    }

    /// Decode an XML document.
    ///
    /// Returns `Ok(None)` for well-formed parts whose root is not a state
    /// element, so foreign custom XML parts can be skipped.
    pub fn decode(xml: &str) -> StoreResult<Option<Self>> {
        Self::decode_root(xml, None)
    }

    /// Decode an XML document, skipping state parts of other namespaces.
    ///
    /// Parts outside `namespace` are returned as `Ok(None)` before their
    /// content is validated.
    pub fn decode_in(xml: &str, namespace: &str) -> StoreResult<Option<Self>> {
        Self::decode_root(xml, Some(namespace))
    }

    fn decode_root(xml: &str, namespace: Option<&str>) -> StoreResult<Option<Self>> {
        let mut reader = Reader::from_str(xml);

        let mut part: Option<StatePart> = None;
        let mut in_root = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) if part.is_none() => {
                    if e.name().as_ref() != ROOT_ELEMENT.as_bytes() {
                        return Ok(None);
                    }
                    match Self::from_root(&e, namespace)? {
                        Some(root) => part = Some(root),
                        None => return Ok(None),
                    }
                    in_root = true;
                }
                Ok(Event::Empty(e)) if part.is_none() => {
                    if e.name().as_ref() != ROOT_ELEMENT.as_bytes() {
                        return Ok(None);
                    }
                    return Self::from_root(&e, namespace);
                }
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if in_root => {
                    return Err(StoreError::InvalidPart(format!(
                        "unexpected element <{}> in state part",
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                Ok(Event::Text(e)) if in_root => {
                    if let Some(part) = part.as_mut() {
                        part.payload.push_str(&e.unescape()?);
                    }
                }
                Ok(Event::CData(e)) if in_root => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|err| StoreError::InvalidPart(err.to_string()))?;
                    if let Some(part) = part.as_mut() {
                        part.payload.push_str(text);
                    }
                }
                Ok(Event::End(_)) if in_root => break,
                Ok(Event::Eof) => break,
                Err(e) => return Err(StoreError::Xml(e)),
                _ => {}
            }
        }

        Ok(part)
    }

    /// Read the root attributes; `None` when the root belongs to another namespace
    fn from_root(e: &BytesStart<'_>, wanted: Option<&str>) -> StoreResult<Option<Self>> {
        let mut namespace = String::new();
        let mut key = None;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"xmlns" => namespace = attr.unescape_value()?.into_owned(),
                b"key" => key = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }

        if wanted.is_some_and(|ns| ns != namespace) {
            return Ok(None);
        }

        let key =
            key.ok_or_else(|| StoreError::InvalidPart("state part has no key attribute".into()))?;

        Ok(Some(Self {
            namespace,
            key,
            payload: String::new(),
        }))
    }
}
