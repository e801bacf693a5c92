use serde::{Deserialize, Serialize};

/// A single literal rewrite: first occurrence of `from` becomes `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRule {
    pub from: String,
    pub to: String,
}

impl CorrectionRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Apply to `text`, replacing only the first occurrence
    pub fn apply(&self, text: String) -> String {
        if self.from.is_empty() || !text.contains(self.from.as_str()) {
            return text;
        }
        text.replacen(self.from.as_str(), &self.to, 1)
    }
}

/// Street-name corrections, keyed on the uppercased input.
///
/// Applied in this order; later entries see the output of earlier ones.
pub fn default_corrections() -> Vec<CorrectionRule> {
    [
        ("SAN MARTIN", "San Martin"),
        ("JUAN B. JUSTO", "Juan B. Justo"),
        ("JUAN B JUSTO", "Juan B. Justo"),
        ("PUEYRREDON", "Pueyrredón"),
        ("CORDOBA", "Córdoba"),
        ("CORRIENTES", "Corrientes"),
        ("RIVADAVIA", "Rivadavia"),
        ("SANTA FE", "Santa Fe"),
        ("CABILDO", "Cabildo"),
        ("TTE. ", "Teniente "),
        ("DR. ", "Doctor "),
    ]
    .into_iter()
    .map(|(from, to)| CorrectionRule::new(from, to))
    .collect()
}

/// Title abbreviations expanded after the leading "AV." rewrite.
pub(crate) const TITLE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("CNEL.", "Coronel"),
    ("GRAL.", "General"),
    ("PRES.", "Presidente"),
    ("PTE.", "Presidente"),
    ("ING.", "Ingeniero"),
];
