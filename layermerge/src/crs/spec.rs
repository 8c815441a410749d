//! Raw CRS specification strings.

use std::fmt;

/// A CRS as the user or a file spelled it.
///
/// This is deliberately just text: `EPSG:4326`, a PROJ string or the WKT
/// content of a `.prj` file. Use [`CrsDefinition::parse`] to interpret it.
///
/// [`CrsDefinition::parse`]: super::CrsDefinition::parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CrsSpec(String);

impl CrsSpec {
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the CRS text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Single-line, shortened form for log and status messages.
    pub fn summary(&self) -> String {
        const MAX: usize = 60;
        let flat: String = self.0.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= MAX {
            flat
        } else {
            let head: String = flat.chars().take(MAX).collect();
            format!("{}...", head)
        }
    }
}

impl fmt::Display for CrsSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CrsSpec {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CrsSpec {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank() {
        assert!(CrsSpec::new("").is_blank());
        assert!(CrsSpec::new("  \t").is_blank());
        assert!(!CrsSpec::new("EPSG:4326").is_blank());
    }

    #[test]
    fn test_summary_flattens_and_truncates() {
        let spec = CrsSpec::new(format!("GEOGCS[\"WGS 84\",\n  {}]", "X".repeat(100)));
        let summary = spec.summary();
        assert!(!summary.contains('\n'));
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 63);
    }
}
