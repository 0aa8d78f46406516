//! Operation parameters for the attachment operations.

/// Default subject identifier column.
pub const DEFAULT_ID_COLUMN: &str = "idp";

/// Default reference-date column for the diagnosis variant.
pub const DEFAULT_REFERENCE_COLUMN: &str = "t0";

/// Default output column for the diagnosis variant.
pub const DEFAULT_DIAGNOSIS_COLUMN: &str = "diagnosis";

/// Declared semantic type of the value column.
///
/// The tag decides whether the non-negative validity filter applies; the
/// engine never inspects the runtime dtype for this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Measurements where negative readings are sentinel/invalid values.
    Numeric,
    /// Status codes and labels, attached unchanged.
    Categorical,
}

/// When the non-negative filter runs relative to latest-record selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NegativeFilter {
    /// Filter the already-selected latest rows. A subject whose latest
    /// observation is negative gets a missing result; there is no fallback
    /// to an earlier valid observation.
    #[default]
    PostSelection,
    /// Remove negative values from candidacy before selection, so earlier
    /// valid observations can match.
    PreSelection,
}

/// Parameters for [`attach_latest_value`](crate::attach_latest_value).
#[derive(Debug, Clone)]
pub struct LatestValueSpec {
    /// Date column in the source table (8-digit YYYYMMDD values).
    pub source_date_col: String,
    /// Reference-date column in the cohort table (dtype `Date`).
    pub reference_date_col: String,
    /// Value column to attach.
    pub value_col: String,
    /// Name for the attached column; the value column name when `None`.
    pub output_col: Option<String>,
    /// Subject identifier column, present in both tables.
    pub id_col: String,
    /// Declared semantic type of the value column.
    pub value_kind: ValueKind,
    /// Ordering of the non-negative filter for numeric columns.
    pub negative_filter: NegativeFilter,
}

impl LatestValueSpec {
    pub fn new(
        source_date_col: impl Into<String>,
        reference_date_col: impl Into<String>,
        value_col: impl Into<String>,
        value_kind: ValueKind,
    ) -> Self {
        Self {
            source_date_col: source_date_col.into(),
            reference_date_col: reference_date_col.into(),
            value_col: value_col.into(),
            output_col: None,
            id_col: DEFAULT_ID_COLUMN.to_string(),
            value_kind,
            negative_filter: NegativeFilter::default(),
        }
    }

    /// Rename the attached column.
    #[must_use]
    pub fn with_output_col(mut self, name: impl Into<String>) -> Self {
        self.output_col = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_id_col(mut self, name: impl Into<String>) -> Self {
        self.id_col = name.into();
        self
    }

    #[must_use]
    pub fn with_negative_filter(mut self, filter: NegativeFilter) -> Self {
        self.negative_filter = filter;
        self
    }

    /// Name of the column the operation appends.
    pub fn result_column(&self) -> &str {
        self.output_col.as_deref().unwrap_or(&self.value_col)
    }
}

/// Parameters for [`attach_latest_diagnosis`](crate::attach_latest_diagnosis).
#[derive(Debug, Clone)]
pub struct LatestDiagnosisSpec {
    /// Diagnosis-code column in the diagnostics table.
    pub code_col: String,
    /// Date column in the diagnostics table (8-digit YYYYMMDD values).
    pub date_col: String,
    /// Exact codes to match.
    pub fixed_codes: Vec<String>,
    /// Hierarchical roots to match; a root covers itself and any subcode
    /// formed by appending a decimal point and digits.
    pub code_roots: Vec<String>,
    /// Reference-date column in the cohort table (dtype `Date`).
    pub reference_date_col: String,
    /// Name for the attached flag column.
    pub output_col: String,
    /// Subject identifier column, present in both tables.
    pub id_col: String,
}

impl LatestDiagnosisSpec {
    pub fn new(code_col: impl Into<String>, date_col: impl Into<String>) -> Self {
        Self {
            code_col: code_col.into(),
            date_col: date_col.into(),
            fixed_codes: Vec::new(),
            code_roots: Vec::new(),
            reference_date_col: DEFAULT_REFERENCE_COLUMN.to_string(),
            output_col: DEFAULT_DIAGNOSIS_COLUMN.to_string(),
            id_col: DEFAULT_ID_COLUMN.to_string(),
        }
    }

    #[must_use]
    pub fn with_fixed_codes(mut self, codes: Vec<String>) -> Self {
        self.fixed_codes = codes;
        self
    }

    #[must_use]
    pub fn with_code_roots(mut self, roots: Vec<String>) -> Self {
        self.code_roots = roots;
        self
    }

    #[must_use]
    pub fn with_reference_date_col(mut self, name: impl Into<String>) -> Self {
        self.reference_date_col = name.into();
        self
    }

    #[must_use]
    pub fn with_output_col(mut self, name: impl Into<String>) -> Self {
        self.output_col = name.into();
        self
    }

    #[must_use]
    pub fn with_id_col(mut self, name: impl Into<String>) -> Self {
        self.id_col = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_spec_defaults() {
        let spec = LatestValueSpec::new("dat", "t0", "hba1c", ValueKind::Numeric);
        assert_eq!(spec.id_col, DEFAULT_ID_COLUMN);
        assert_eq!(spec.result_column(), "hba1c");
        assert_eq!(spec.negative_filter, NegativeFilter::PostSelection);
    }

    #[test]
    fn value_spec_output_rename() {
        let spec = LatestValueSpec::new("dat", "t0", "hba1c", ValueKind::Numeric)
            .with_output_col("hba1c_baseline");
        assert_eq!(spec.result_column(), "hba1c_baseline");
    }

    #[test]
    fn diagnosis_spec_defaults() {
        let spec = LatestDiagnosisSpec::new("cod", "dat");
        assert_eq!(spec.reference_date_col, DEFAULT_REFERENCE_COLUMN);
        assert_eq!(spec.output_col, DEFAULT_DIAGNOSIS_COLUMN);
        assert_eq!(spec.id_col, DEFAULT_ID_COLUMN);
        assert!(spec.fixed_codes.is_empty());
        assert!(spec.code_roots.is_empty());
    }
}
