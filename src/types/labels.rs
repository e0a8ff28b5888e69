// Copyright (c) 2024 Mike Tsao

use serde::{Deserialize, Serialize};
use std::collections::{btree_set, BTreeSet};
use thiserror::Error;

/// Reasons a [Labels] set can't be constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    /// Labels are opaque, but they can't be empty strings.
    #[error("labels may not be empty strings")]
    EmptyLabel,
}

/// The set of text tags attached to a partial. The core attaches no meaning to
/// them; classification and mixing code downstream does. A partial may have no
/// labels at all, but none of its labels may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeSet<String>", into = "BTreeSet<String>")]
pub struct Labels(BTreeSet<String>);
impl Labels {
    /// Creates a [Labels] from anything that yields strings.
    pub fn new_with<I, S>(labels: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_from(labels.into_iter().map(Into::into).collect::<BTreeSet<String>>())
    }

    #[allow(missing_docs)]
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the labels in lexical order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }
}
impl TryFrom<BTreeSet<String>> for Labels {
    type Error = LabelError;

    fn try_from(value: BTreeSet<String>) -> Result<Self, Self::Error> {
        if value.iter().any(String::is_empty) {
            Err(LabelError::EmptyLabel)
        } else {
            Ok(Self(value))
        }
    }
}
impl From<Labels> for BTreeSet<String> {
    fn from(value: Labels) -> Self {
        value.0
    }
}
impl<'a> IntoIterator for &'a Labels {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_mainline() {
        let labels = Labels::new_with(["violin", "fundamental", "violin"]).unwrap();
        assert_eq!(labels.len(), 2, "duplicates should collapse");
        assert!(labels.contains("violin"));
        assert!(!labels.contains("cello"));
        assert_eq!(
            labels.iter().cloned().collect::<Vec<_>>(),
            vec!["fundamental".to_string(), "violin".to_string()]
        );
    }

    #[test]
    fn no_labels_is_fine() {
        let labels = Labels::new_with(Vec::<String>::new()).unwrap();
        assert!(labels.is_empty());
        assert_eq!(labels, Labels::default());
    }

    #[test]
    fn empty_label_is_rejected() {
        assert_eq!(
            Labels::new_with(["ok", ""]).unwrap_err(),
            LabelError::EmptyLabel
        );
        assert!(serde_json::from_str::<Labels>(r#"["a", ""]"#).is_err());
        let labels: Labels = serde_json::from_str(r#"["b", "a"]"#).unwrap();
        assert!(labels.contains("a") && labels.contains("b"));
    }
}
