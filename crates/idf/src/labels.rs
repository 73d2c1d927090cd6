use folio_types::{Label, LabelKind};
use std::collections::HashMap;

/// Final number and anchor of a bound label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLabel {
    /// Kind of the element that bound the label.
    pub kind: LabelKind,
    /// Display number, e.g. `2.1`, `A.3` or `4b`.
    pub number: String,
    /// Identifier usable as a link target in any output format.
    pub anchor: String,
}

impl ResolvedLabel {
    pub fn new(kind: LabelKind, number: impl Into<String>) -> Self {
        let number = number.into();
        let anchor = format!("{}-{}", kind.prefix(), number.replace('.', "-"));
        Self {
            kind,
            number,
            anchor,
        }
    }

    /// Running-text form, e.g. `Table 3`.
    pub fn display(&self) -> String {
        format!("{} {}", self.kind.display_name(), self.number)
    }
}

/// Every label of a finished document with its final number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLabels {
    entries: HashMap<Label, ResolvedLabel>,
}

impl ResolvedLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: Label, resolved: ResolvedLabel) {
        self.entries.insert(label, resolved);
    }

    pub fn get(&self, label: &Label) -> Option<&ResolvedLabel> {
        self.entries.get(label)
    }

    pub fn anchor(&self, label: &Label) -> Option<&str> {
        self.entries.get(label).map(|r| r.anchor.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &ResolvedLabel)> {
        self.entries.iter()
    }
}
