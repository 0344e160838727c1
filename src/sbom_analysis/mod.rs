/// Domain layer - SBOM inventory model and graph analysis
///
/// Pure business logic with no I/O. Parsers, exporters and the advisory
/// client all live in the adapters layer and speak these types.
pub mod domain;
pub mod services;
