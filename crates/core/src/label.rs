//! The per-document label registry.
//!
//! Labels are allocated up front (so they can be referenced before their
//! element exists) and bound exactly once, when an element consumes them.

use crate::error::DocumentError;
use folio_types::{DocumentId, Label, LabelKind, LabelRequest};
use log::trace;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct Entry {
    allocated: LabelKind,
    bound: Option<LabelKind>,
}

/// Allocation and binding state of every label of one document.
#[derive(Debug)]
pub struct LabelRegistry {
    document: DocumentId,
    entries: Mutex<Vec<Entry>>,
}

impl LabelRegistry {
    pub fn new(document: DocumentId) -> Self {
        Self {
            document,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Entry>>, DocumentError> {
        self.entries
            .lock()
            .map_err(|_| DocumentError::label("label registry lock poisoned"))
    }

    fn check_owner(&self, label: &Label) -> Result<(), DocumentError> {
        if label.document() == self.document {
            Ok(())
        } else {
            Err(DocumentError::label(format!(
                "label {} belongs to {}, not {}",
                label,
                label.document(),
                self.document
            )))
        }
    }

    /// Mints an unbound label.
    pub fn allocate(&self, kind: LabelKind) -> Result<Label, DocumentError> {
        let mut entries = self.lock()?;
        let index = u32::try_from(entries.len())
            .map_err(|_| DocumentError::label("label space exhausted"))?;
        entries.push(Entry {
            allocated: kind,
            bound: None,
        });
        let label = Label::new(self.document, index, kind);
        trace!("Allocated label {}", label);
        Ok(label)
    }

    /// Binds the label an element asked for.
    ///
    /// `Auto` mints and binds a fresh label; `Use` binds a pre-allocated
    /// one, which must be unbound and of a compatible kind.
    pub fn consume(
        &self,
        request: LabelRequest,
        element: LabelKind,
    ) -> Result<Option<Label>, DocumentError> {
        let label = match request {
            LabelRequest::None => return Ok(None),
            LabelRequest::Auto => self.allocate(element)?,
            LabelRequest::Use(label) => label,
        };
        self.check_owner(&label)?;
        let mut entries = self.lock()?;
        let entry = entries
            .get_mut(label.index() as usize)
            .ok_or_else(|| DocumentError::label(format!("label {} was never allocated", label)))?;
        if !entry.allocated.accepts(element) {
            return Err(DocumentError::label(format!(
                "label {} cannot mark a {} element",
                label,
                element.prefix()
            )));
        }
        if let Some(bound) = entry.bound {
            return Err(DocumentError::label(format!(
                "label {} is already bound to a {} element",
                label,
                bound.prefix()
            )));
        }
        entry.bound = Some(element);
        trace!("Bound label {} to {}", label, element.prefix());
        Ok(Some(label))
    }

    /// The kind `label` is bound to, `None` while unbound. Never changes state.
    pub fn peek(&self, label: &Label) -> Result<Option<LabelKind>, DocumentError> {
        self.check_owner(label)?;
        let entries = self.lock()?;
        entries
            .get(label.index() as usize)
            .map(|e| e.bound)
            .ok_or_else(|| DocumentError::label(format!("label {} was never allocated", label)))
    }

    /// The kind of the element bound to `label`.
    pub fn resolve(&self, label: &Label) -> Result<LabelKind, DocumentError> {
        self.peek(label)?
            .ok_or_else(|| DocumentError::label(format!("label {} is not bound", label)))
    }

    /// Accepts a non-empty set of labels of this document, bound or not.
    pub fn check_known(&self, labels: &[Label]) -> Result<(), DocumentError> {
        if labels.is_empty() {
            return Err(DocumentError::label("a reference needs at least one label"));
        }
        for label in labels {
            self.peek(label)?;
        }
        trace!("Referenced {} label(s)", labels.len());
        Ok(())
    }

    /// Labels allocated but never bound.
    pub fn unbound(&self) -> Result<Vec<Label>, DocumentError> {
        let entries = self.lock()?;
        Ok(entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.bound.is_none())
            .map(|(i, e)| Label::new(self.document, i as u32, e.allocated))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LabelRegistry {
        LabelRegistry::new(DocumentId::next())
    }

    #[test]
    fn test_preallocated_label_binds_once() {
        let reg = registry();
        let label = reg.allocate(LabelKind::Figure).unwrap();
        assert!(matches!(reg.resolve(&label), Err(DocumentError::Label(_))));
        assert_eq!(reg.peek(&label).unwrap(), None);

        let bound = reg
            .consume(LabelRequest::Use(label), LabelKind::Figure)
            .unwrap();
        assert_eq!(bound, Some(label));
        assert_eq!(reg.resolve(&label).unwrap(), LabelKind::Figure);

        assert!(matches!(
            reg.consume(LabelRequest::Use(label), LabelKind::Figure),
            Err(DocumentError::Label(_))
        ));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let reg = registry();
        let label = reg.allocate(LabelKind::Table).unwrap();
        assert!(reg.consume(label.into(), LabelKind::Figure).is_err());
        assert_eq!(reg.peek(&label).unwrap(), None);
    }

    #[test]
    fn test_auto_label_adopts_element_kind() {
        let reg = registry();
        let label = reg.allocate(LabelKind::Auto).unwrap();
        reg.consume(label.into(), LabelKind::Equation).unwrap();
        assert_eq!(reg.resolve(&label).unwrap(), LabelKind::Equation);

        let fresh = reg
            .consume(LabelRequest::Auto, LabelKind::Section)
            .unwrap()
            .unwrap();
        assert_eq!(fresh.kind(), LabelKind::Section);
        assert!(reg.consume(LabelRequest::None, LabelKind::Section).unwrap().is_none());
    }

    #[test]
    fn test_foreign_labels_are_rejected() {
        let a = registry();
        let b = registry();
        let foreign = b.allocate(LabelKind::Code).unwrap();
        assert!(a.check_known(&[foreign]).is_err());
        assert!(a.consume(foreign.into(), LabelKind::Code).is_err());
    }

    #[test]
    fn test_check_known_and_unbound() {
        let reg = registry();
        let x = reg.allocate(LabelKind::Section).unwrap();
        let y = reg.allocate(LabelKind::Table).unwrap();
        assert!(reg.check_known(&[]).is_err());
        reg.check_known(&[x, y]).unwrap();
        reg.consume(x.into(), LabelKind::Section).unwrap();
        assert_eq!(reg.unbound().unwrap(), vec![y]);
    }
}
