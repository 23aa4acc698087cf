//! Provider catalogs.
//!
//! A spreadsheet picks its locale, converter and formatter by name in its
//! metadata. The [`ProviderFactory`] owns the catalogs those names are
//! looked up in and turns a metadata snapshot into a resolved
//! [`SpreadsheetProvider`]. The same catalogs back the stateless
//! `/api/<feature>` routes.

mod locale;

pub use locale::{DateTimeSymbols, DecimalNumberSymbols, LocaleInfo};

use serde::Serialize;
use tabulon_persistence::model::SpreadsheetMetadata;
use thiserror::Error;

/// A named entry in a provider catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    /// The selector name used in metadata and URLs.
    pub name: &'static str,
    /// Human readable description.
    pub description: &'static str,
}

const fn info(name: &'static str, description: &'static str) -> ProviderInfo {
    ProviderInfo { name, description }
}

/// An ordered list of providers of one kind.
#[derive(Clone, Debug)]
pub struct Catalog {
    kind: &'static str,
    entries: Vec<ProviderInfo>,
}

impl Catalog {
    /// Creates a catalog of the given kind.
    pub fn new(kind: &'static str, entries: Vec<ProviderInfo>) -> Self {
        Self { kind, entries }
    }

    /// Returns the kind of provider this catalog lists.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns every entry in registration order.
    pub fn list(&self) -> &[ProviderInfo] {
        &self.entries
    }

    /// Finds an entry by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&ProviderInfo> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    fn require(&self, name: &str) -> Result<&ProviderInfo, ProviderError> {
        self.get(name).ok_or_else(|| ProviderError::Unknown {
            kind: self.kind,
            name: name.to_string(),
        })
    }
}

/// Errors produced while resolving provider selectors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// A selector names nothing in its catalog.
    #[error("unknown {kind} \"{name}\"")]
    Unknown {
        /// The catalog that was searched.
        kind: &'static str,
        /// The name that was not found.
        name: String,
    },
}

/// The stateless resources served under `/api/<feature>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Feature {
    Comparator,
    Converter,
    DateTimeSymbols,
    DecimalNumberSymbols,
    Exporter,
    Formatter,
    FormHandler,
    Function,
    Importer,
    Locale,
    Parser,
    Plugin,
    Validator,
}

impl Feature {
    /// Every feature, in URL order.
    pub const ALL: [Feature; 13] = [
        Feature::Comparator,
        Feature::Converter,
        Feature::DateTimeSymbols,
        Feature::DecimalNumberSymbols,
        Feature::Exporter,
        Feature::Formatter,
        Feature::FormHandler,
        Feature::Function,
        Feature::Importer,
        Feature::Locale,
        Feature::Parser,
        Feature::Plugin,
        Feature::Validator,
    ];

    /// The path segment naming this feature.
    pub fn path(&self) -> &'static str {
        match self {
            Feature::Comparator => "comparator",
            Feature::Converter => "converter",
            Feature::DateTimeSymbols => "date-time-symbols",
            Feature::DecimalNumberSymbols => "decimal-number-symbols",
            Feature::Exporter => "exporter",
            Feature::Formatter => "formatter",
            Feature::FormHandler => "form-handler",
            Feature::Function => "function",
            Feature::Importer => "importer",
            Feature::Locale => "locale",
            Feature::Parser => "parser",
            Feature::Plugin => "plugin",
            Feature::Validator => "validator",
        }
    }
}

/// The providers a spreadsheet's metadata selects.
#[derive(Clone, Debug)]
pub struct SpreadsheetProvider {
    /// The spreadsheet locale.
    pub locale: LocaleInfo,
    /// The selected converter.
    pub converter: ProviderInfo,
    /// The selected formatter.
    pub formatter: ProviderInfo,
}

/// Owns every provider catalog.
#[derive(Debug)]
pub struct ProviderFactory {
    comparators: Catalog,
    converters: Catalog,
    exporters: Catalog,
    formatters: Catalog,
    form_handlers: Catalog,
    importers: Catalog,
    parsers: Catalog,
    plugins: Catalog,
    validators: Catalog,
    locales: Vec<LocaleInfo>,
    functions: &'static [&'static str],
}

impl ProviderFactory {
    /// Creates the factory with the built-in catalogs and the function names
    /// the engine understands.
    pub fn builtin(functions: &'static [&'static str]) -> Self {
        Self {
            comparators: Catalog::new(
                "comparator",
                vec![
                    info("text", "Compares text values"),
                    info("text-case-insensitive", "Compares text ignoring case"),
                    info("number", "Compares numeric values"),
                    info("date", "Compares dates"),
                    info("date-time", "Compares date-times"),
                    info("time", "Compares times"),
                ],
            ),
            converters: Catalog::new(
                "converter",
                vec![
                    info("general", "Converts between every built-in value type"),
                    info("basic", "Identity and string conversions only"),
                    info("number-to-text", "Formats numbers as text"),
                    info("text-to-number", "Parses text as numbers"),
                ],
            ),
            exporters: Catalog::new(
                "exporter",
                vec![
                    info("json", "Exports cells as JSON"),
                    info("csv", "Exports cell values as CSV"),
                ],
            ),
            formatters: Catalog::new(
                "formatter",
                vec![
                    info("general", "Formats any value with locale defaults"),
                    info("number", "Formats numbers"),
                    info("percent", "Formats numbers as percentages"),
                    info("text", "Formats text"),
                    info("date", "Formats dates"),
                    info("date-time", "Formats date-times"),
                    info("time", "Formats times"),
                ],
            ),
            form_handlers: Catalog::new(
                "form-handler",
                vec![info("basic", "Copies form fields into cells")],
            ),
            importers: Catalog::new(
                "importer",
                vec![
                    info("json", "Imports cells from JSON"),
                    info("csv", "Imports cell values from CSV"),
                ],
            ),
            parsers: Catalog::new(
                "parser",
                vec![
                    info("general", "Parses any value with locale defaults"),
                    info("number", "Parses numbers"),
                    info("date", "Parses dates"),
                    info("date-time", "Parses date-times"),
                    info("time", "Parses times"),
                ],
            ),
            plugins: Catalog::new("plugin", Vec::new()),
            validators: Catalog::new(
                "validator",
                vec![
                    info("non-null", "Rejects empty cells"),
                    info("number", "Accepts numbers only"),
                    info("text-length", "Limits text length"),
                ],
            ),
            locales: locale::builtin(),
            functions,
        }
    }

    /// Returns the catalog serving `feature`, if it is a plain catalog.
    pub fn catalog(&self, feature: Feature) -> Option<&Catalog> {
        match feature {
            Feature::Comparator => Some(&self.comparators),
            Feature::Converter => Some(&self.converters),
            Feature::Exporter => Some(&self.exporters),
            Feature::Formatter => Some(&self.formatters),
            Feature::FormHandler => Some(&self.form_handlers),
            Feature::Importer => Some(&self.importers),
            Feature::Parser => Some(&self.parsers),
            Feature::Plugin => Some(&self.plugins),
            Feature::Validator => Some(&self.validators),
            Feature::DateTimeSymbols
            | Feature::DecimalNumberSymbols
            | Feature::Function
            | Feature::Locale => None,
        }
    }

    /// Returns every known locale.
    pub fn locales(&self) -> &[LocaleInfo] {
        &self.locales
    }

    /// Finds a locale by tag, ignoring ASCII case.
    pub fn locale(&self, tag: &str) -> Option<&LocaleInfo> {
        self.locales
            .iter()
            .find(|locale| locale.tag.eq_ignore_ascii_case(tag))
    }

    /// Returns the names of the functions formulas may call.
    pub fn functions(&self) -> &'static [&'static str] {
        self.functions
    }

    /// Resolves the selectors in `metadata`.
    pub fn provider_for(
        &self,
        metadata: &SpreadsheetMetadata,
    ) -> Result<SpreadsheetProvider, ProviderError> {
        let locale = self
            .locale(&metadata.locale)
            .cloned()
            .ok_or_else(|| ProviderError::Unknown {
                kind: "locale",
                name: metadata.locale.clone(),
            })?;

        Ok(SpreadsheetProvider {
            locale,
            converter: self.converters.require(&metadata.converter)?.clone(),
            formatter: self.formatters.require(&metadata.formatter)?.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ProviderFactory {
        ProviderFactory::builtin(&["SUM", "IF"])
    }

    #[test]
    fn test_default_metadata_resolves() {
        let provider = factory()
            .provider_for(&SpreadsheetMetadata::default())
            .unwrap();
        assert_eq!(provider.locale.tag, "en-AU");
        assert_eq!(provider.converter.name, "general");
        assert_eq!(provider.formatter.name, "general");
    }

    #[test]
    fn test_unknown_locale_rejected() {
        let metadata = SpreadsheetMetadata::new("Budget", "xx-YY");
        let err = factory().provider_for(&metadata).unwrap_err();
        assert_eq!(err.to_string(), "unknown locale \"xx-YY\"");
    }

    #[test]
    fn test_unknown_formatter_rejected() {
        let mut metadata = SpreadsheetMetadata::default();
        metadata.formatter = "sparkline".to_string();
        assert!(matches!(
            factory().provider_for(&metadata),
            Err(ProviderError::Unknown { kind: "formatter", .. })
        ));
    }

    #[test]
    fn test_catalog_lookup_ignores_case() {
        let factory = factory();
        let comparators = factory.catalog(Feature::Comparator).unwrap();
        assert_eq!(comparators.get("TEXT").unwrap().name, "text");
        assert!(comparators.get("missing").is_none());
        assert!(factory.catalog(Feature::Locale).is_none());
    }

    #[test]
    fn test_feature_paths_are_unique() {
        let mut paths: Vec<_> = Feature::ALL.iter().map(Feature::path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Feature::ALL.len());
    }
}
