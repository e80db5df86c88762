/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Multilingual text column: English, Arabic and Central Kurdish variants.
/// Stored as JSONB; every variant is always present, empty string when the
/// editor has not provided a translation yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    pub en: String,
    pub ar: String,
    pub ckb: String,
}

impl Localized {
    pub fn new(en: impl Into<String>, ar: impl Into<String>, ckb: impl Into<String>) -> Self {
        Self { en: en.into(), ar: ar.into(), ckb: ckb.into() }
    }

    /// True when no language variant carries text.
    pub fn is_empty(&self) -> bool {
        self.en.trim().is_empty() && self.ar.trim().is_empty() && self.ckb.trim().is_empty()
    }
}

/// Multilingual list column (quiz options, course learning points).
/// The lists are positional: index N in each language describes the same item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedList {
    pub en: Vec<String>,
    pub ar: Vec<String>,
    pub ckb: Vec<String>,
}

impl LocalizedList {
    /// Length of the longest language list; positional entries missing from a
    /// language render as blanks client-side.
    pub fn len(&self) -> usize {
        self.en.len().max(self.ar.len()).max(self.ckb.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localized_empty_detection() {
        assert!(Localized::default().is_empty());
        assert!(Localized::new("  ", "", "").is_empty());
        assert!(!Localized::new("", "تجارة", "").is_empty());
    }

    #[test]
    fn localized_list_uses_longest_language() {
        let list = LocalizedList {
            en: vec!["a".into(), "b".into()],
            ar: vec!["أ".into()],
            ckb: vec![],
        };
        assert_eq!(list.len(), 2);
        assert!(!list.is_empty());
    }

    #[test]
    fn localized_round_trips_as_json() {
        let v = serde_json::json!({"en": "Market update", "ar": "تحديث السوق", "ckb": "نوێکردنەوە"});
        let parsed: Localized = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), v);
    }
}
