use crate::ports::outbound::ComponentExporter;
use crate::sbom_analysis::domain::Component;
use crate::shared::Result;
use std::borrow::Cow;

/// Fixed column order of the component export
const COMPONENT_HEADER: [&str; 6] = ["identifier", "name", "version", "license", "type", "supplier"];

/// Quotes a field when it holds a comma, a quote or a line break (RFC 4180)
pub(super) fn escape_csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Appends one escaped row terminated by a newline
pub(super) fn push_csv_row<'a>(output: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let row = fields
        .into_iter()
        .map(escape_csv_field)
        .collect::<Vec<_>>()
        .join(",");
    output.push_str(&row);
    output.push('\n');
}

/// CsvComponentExporter adapter for the flat component inventory
///
/// Rows are sorted by identifier so the file is reproducible.
pub struct CsvComponentExporter;

impl CsvComponentExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvComponentExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentExporter for CsvComponentExporter {
    fn export(&self, components: &[&Component]) -> Result<String> {
        let mut sorted = components.to_vec();
        sorted.sort_by(|a, b| a.id().cmp(b.id()));

        let mut output = String::new();
        push_csv_row(&mut output, COMPONENT_HEADER);

        for component in sorted {
            push_csv_row(
                &mut output,
                [
                    component.id().as_str(),
                    component.name(),
                    component.version().unwrap_or(""),
                    component.license().unwrap_or(""),
                    component.component_type().as_str(),
                    component.supplier().unwrap_or(""),
                ],
            );
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbom_analysis::domain::{ComponentId, ComponentType};

    fn component(id: &str, name: &str) -> Component {
        Component::new(ComponentId::new(id).unwrap(), name, ComponentType::Library)
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("MIT, Apache-2.0"), "\"MIT, Apache-2.0\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_csv_field(""), "");
    }

    #[test]
    fn test_export_empty_is_header_only() {
        let csv = CsvComponentExporter::new().export(&[]).unwrap();
        assert_eq!(csv, "identifier,name,version,license,type,supplier\n");
    }

    #[test]
    fn test_export_sorted_by_identifier() {
        let b = component("pkg:b", "b").with_version(Some("2.0".to_string()));
        let a = component("pkg:a", "a")
            .with_license(Some("MIT, BSD-3-Clause".to_string()))
            .with_supplier(Some("Acme \"Labs\"".to_string()));

        let csv = CsvComponentExporter::new().export(&[&b, &a]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "pkg:a,a,,\"MIT, BSD-3-Clause\",library,\"Acme \"\"Labs\"\"\""
        );
        assert_eq!(lines[2], "pkg:b,b,2.0,,library,");
    }
}
