//! Addressing types shared by the sheet cache and sheet adapters.
use thiserror::Error;

/// Physical location of a rectangular block of cells: spreadsheet plus A1 range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetAddress {
    source_id: String,
    range: String,
}

impl SheetAddress {
    /// Build an address after validating both halves.
    pub fn new(
        source_id: impl Into<String>,
        range: impl Into<String>,
    ) -> Result<Self, CacheKeyValidationError> {
        let source_id = validate_part(source_id.into())?;
        let range = validate_part(range.into())?;
        Ok(Self { source_id, range })
    }

    /// Spreadsheet identifier.
    pub fn source_id(&self) -> &str {
        self.source_id.as_str()
    }

    /// A1-notation range, including the sheet name (e.g. `AARs!A:A`).
    pub fn range(&self) -> &str {
        self.range.as_str()
    }

    /// Composite cache key in `sourceId:range` form.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey(format!("{}:{}", self.source_id, self.range))
    }
}

impl std::fmt::Display for SheetAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source_id, self.range)
    }
}

/// Key under which cached rows are stored: either a composite address or an alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a key after validating that it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        validate_part(value.into()).map(Self)
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

fn validate_part(raw: String) -> Result<String, CacheKeyValidationError> {
    if raw.trim().is_empty() {
        return Err(CacheKeyValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(CacheKeyValidationError::ContainsWhitespace);
    }
    Ok(raw)
}

/// Validation errors returned when constructing [`CacheKey`] or [`SheetAddress`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Value is empty after trimming whitespace.
    #[error("sheet cache key must not be empty")]
    Empty,
    /// Value has leading or trailing whitespace.
    #[error("sheet cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}
