use std::{fmt, sync::Arc};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{
    converter::{ConfigInfo, ConverterFlags, ConverterRegistry, ErasedConverter},
    field::{FieldDeclaration, FieldInfo},
};
use crate::error::MappingError;

/// Raw per-field CSV options, as written by whoever declares the record.
///
/// `required` and `optional_column` are the older names of
/// `must_not_be_blank` and `must_be_supplied` (the latter with inverted
/// polarity). Both pairs are folded into one value each when the column is
/// resolved; see [`ColumnInfo::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    converter: Option<String>,
    format: Option<String>,
    converter_flags: ConverterFlags,
    column_name: Option<String>,
    must_not_be_blank: bool,
    required: bool,
    trim_input: bool,
    default_value: Option<String>,
    must_be_supplied: bool,
    optional_column: bool,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            converter: None,
            format: None,
            converter_flags: ConverterFlags::default(),
            column_name: None,
            must_not_be_blank: false,
            required: false,
            trim_input: false,
            default_value: None,
            must_be_supplied: true,
            optional_column: false,
        }
    }
}

impl ColumnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a converter by its registry name instead of the one inferred
    /// from the field type.
    pub fn converter(mut self, name: impl Into<String>) -> Self {
        self.converter = Some(name.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn converter_flags(mut self, flags: ConverterFlags) -> Self {
        self.converter_flags = flags;
        self
    }

    /// Header name of the column; the field name when unset.
    pub fn column_name(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    pub fn must_not_be_blank(mut self, yes: bool) -> Self {
        self.must_not_be_blank = yes;
        self
    }

    /// Legacy alias of [`ColumnConfig::must_not_be_blank`].
    pub fn required(mut self, yes: bool) -> Self {
        self.required = yes;
        self
    }

    pub fn trim_input(mut self, yes: bool) -> Self {
        self.trim_input = yes;
        self
    }

    pub fn default_value(mut self, text: impl Into<String>) -> Self {
        self.default_value = Some(text.into());
        self
    }

    pub fn must_be_supplied(mut self, yes: bool) -> Self {
        self.must_be_supplied = yes;
        self
    }

    /// Legacy inverse of [`ColumnConfig::must_be_supplied`]. When set, the
    /// column is optional whatever `must_be_supplied` says.
    pub fn optional_column(mut self, yes: bool) -> Self {
        self.optional_column = yes;
        self
    }

    fn resolved_must_not_be_blank(&self) -> bool {
        self.must_not_be_blank || self.required
    }

    fn resolved_must_be_supplied(&self) -> bool {
        self.must_be_supplied && !self.optional_column
    }
}

/// Fully resolved, immutable description of one CSV column.
pub struct ColumnInfo {
    field: FieldInfo,
    converter: Arc<dyn ErasedConverter>,
    config_info: ConfigInfo,
    column_name: String,
    position: usize,
    must_not_be_blank: bool,
    trim_input: bool,
    needs_quotes: bool,
    default_value: Option<String>,
    must_be_supplied: bool,
}

impl ColumnInfo {
    /// Resolves a field declaration into a column at `position`.
    ///
    /// Returns `Ok(None)` when the declaration carries no CSV configuration:
    /// the field is simply not a column. The explicit converter named in the
    /// configuration wins over the one inferred from the field type.
    pub fn resolve(
        declaration: &FieldDeclaration,
        index: usize,
        registry: &ConverterRegistry,
        position: usize,
    ) -> Result<Option<ColumnInfo>, MappingError> {
        let Some(config) = &declaration.config else {
            return Ok(None);
        };

        let converter = match &config.converter {
            Some(name) => registry.named(name),
            None => registry.resolve(&declaration.field_type),
        }
        .ok_or_else(|| MappingError::NoConverterAvailable {
            field: declaration.name.clone(),
            field_type: match &config.converter {
                Some(name) => format!("{} (converter '{name}')", declaration.field_type),
                None => declaration.field_type.to_string(),
            },
        })?;

        let field = FieldInfo::new(declaration.name.clone(), declaration.field_type.clone(), index);
        let column_name = config
            .column_name
            .clone()
            .unwrap_or_else(|| declaration.name.clone());

        let config_info = converter
            .configure(config.format.as_deref(), &config.converter_flags, &field)
            .map_err(|source| MappingError::InvalidConfiguration {
                column: column_name.clone(),
                source,
            })?;
        let needs_quotes = converter.needs_quotes(&config_info);

        let column = ColumnInfo {
            field,
            converter,
            config_info,
            column_name,
            position,
            must_not_be_blank: config.resolved_must_not_be_blank(),
            trim_input: config.trim_input,
            needs_quotes,
            default_value: config.default_value.clone(),
            must_be_supplied: config.resolved_must_be_supplied(),
        };

        if column.must_not_be_blank && column.default_value.as_deref() == Some("") {
            warn!(
                "Column '{}' must not be blank but its default value is blank, blank input will reach the converter",
                column.column_name
            );
        }
        debug!(
            "Resolved column '{}' at position {} with converter {} (needs quotes: {})",
            column.column_name,
            column.position,
            column.converter.name(),
            column.needs_quotes
        );

        Ok(Some(column))
    }

    /// Resolves a whole declaration list. Positions follow declaration order
    /// and skip fields without configuration.
    pub fn resolve_all(
        declarations: &[FieldDeclaration],
        registry: &ConverterRegistry,
    ) -> Result<Vec<ColumnInfo>, MappingError> {
        let mut columns: Vec<ColumnInfo> = Vec::with_capacity(declarations.len());
        for (index, declaration) in declarations.iter().enumerate() {
            if let Some(column) = Self::resolve(declaration, index, registry, columns.len())? {
                if columns
                    .iter()
                    .any(|existing| existing.column_name == column.column_name)
                {
                    return Err(MappingError::InvalidConfiguration {
                        column: column.column_name.clone(),
                        source: super::converter::ConfigError::new("duplicate column name"),
                    });
                }
                columns.push(column);
            }
        }
        Ok(columns)
    }

    pub fn field(&self) -> &FieldInfo {
        &self.field
    }

    pub fn converter(&self) -> &dyn ErasedConverter {
        self.converter.as_ref()
    }

    pub fn config_info(&self) -> &ConfigInfo {
        &self.config_info
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Position of the column in the CSV line, starting at 0.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn must_not_be_blank(&self) -> bool {
        self.must_not_be_blank
    }

    pub fn trim_input(&self) -> bool {
        self.trim_input
    }

    pub fn needs_quotes(&self) -> bool {
        self.needs_quotes
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn must_be_supplied(&self) -> bool {
        self.must_be_supplied
    }
}

impl fmt::Debug for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnInfo")
            .field("field", &self.field)
            .field("converter", &self.converter.name())
            .field("column_name", &self.column_name)
            .field("position", &self.position)
            .field("must_not_be_blank", &self.must_not_be_blank)
            .field("trim_input", &self.trim_input)
            .field("needs_quotes", &self.needs_quotes)
            .field("default_value", &self.default_value)
            .field("must_be_supplied", &self.must_be_supplied)
            .finish()
    }
}
