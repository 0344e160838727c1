use crate::shared::error::SbomError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Root element of an XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlRoot {
    pub local_name: String,
    pub namespace: Option<String>,
}

pub(crate) fn malformed(details: impl Into<String>) -> SbomError {
    SbomError::MalformedDocument {
        encoding: "XML".to_string(),
        details: details.into(),
    }
}

fn root_of(element: &BytesStart<'_>) -> Result<XmlRoot, SbomError> {
    let name = element.name();
    let local_name = String::from_utf8_lossy(name.local_name().as_ref()).into_owned();
    let namespace_key = match name.prefix() {
        Some(prefix) => format!("xmlns:{}", String::from_utf8_lossy(prefix.as_ref())),
        None => "xmlns".to_string(),
    };

    let mut namespace = None;
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| malformed(format!("invalid attribute: {}", e)))?;
        if attribute.key.as_ref() == namespace_key.as_bytes() {
            let value = attribute
                .unescape_value()
                .map_err(|e| malformed(format!("invalid namespace value: {}", e)))?;
            namespace = Some(value.into_owned());
        }
    }

    Ok(XmlRoot {
        local_name,
        namespace,
    })
}

/// Reads the whole document once, checking it is well-formed, and
/// returns its root element.
///
/// Entity declarations are never expanded by the reader.
pub fn inspect(content: &str) -> Result<XmlRoot, SbomError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = true;

    let mut root: Option<XmlRoot> = None;
    let mut depth = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(malformed(format!(
                    "at byte {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        };

        match event {
            Event::Start(element) => {
                if depth == 0 {
                    if root.is_some() {
                        return Err(malformed("document has more than one root element"));
                    }
                    root = Some(root_of(&element)?);
                }
                depth += 1;
            }
            Event::Empty(element) if depth == 0 => {
                if root.is_some() {
                    return Err(malformed("document has more than one root element"));
                }
                root = Some(root_of(&element)?);
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(malformed("unexpected end of document: unclosed elements"));
    }

    root.ok_or_else(|| malformed("document has no root element"))
}
