//! The scope state machine shared by every builder.
//!
//! Each structural element is a scope in the document's [`ScopeArena`].
//! A scope goes `Unopened -> Open -> Closed` exactly once, may only close
//! after all of its children have closed, and rejects every mutation once
//! closed. Builders hold a [`ScopeLink`] into the arena and consult it
//! before each operation.

use crate::context::DocumentContext;
use crate::error::DocumentError;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Unopened,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Document,
    Header,
    Body,
    Footer,
    Section,
    SectionBody,
    PlainText,
    ComplexText,
    List,
    ListItem,
    Table,
    TableSection,
    TableRow,
    Figure,
    FigureBody,
    FigureSeries,
    Math,
    Code,
    CodeBody,
}

impl ScopeKind {
    pub fn name(self) -> &'static str {
        match self {
            ScopeKind::Document => "document",
            ScopeKind::Header => "document header",
            ScopeKind::Body => "document body",
            ScopeKind::Footer => "document footer",
            ScopeKind::Section => "section",
            ScopeKind::SectionBody => "section body",
            ScopeKind::PlainText => "plain text",
            ScopeKind::ComplexText => "text span",
            ScopeKind::List => "list",
            ScopeKind::ListItem => "list item",
            ScopeKind::Table => "table",
            ScopeKind::TableSection => "table section",
            ScopeKind::TableRow => "table row",
            ScopeKind::Figure => "figure",
            ScopeKind::FigureBody => "figure body",
            ScopeKind::FigureSeries => "figure series",
            ScopeKind::Math => "math expression",
            ScopeKind::Code => "code block",
            ScopeKind::CodeBody => "code body",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct ScopeRecord {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub state: ScopeState,
    /// Children created and not yet closed, in creation order.
    pub open_children: Vec<ScopeId>,
}

/// All scopes of one document, indexed by [`ScopeId`].
#[derive(Debug, Default)]
pub struct ScopeArena {
    records: Vec<ScopeRecord>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: ScopeId) -> Result<&ScopeRecord, DocumentError> {
        self.records
            .get(id.0)
            .ok_or_else(|| DocumentError::structural(format!("unknown scope {}", id)))
    }

    fn record_mut(&mut self, id: ScopeId) -> Result<&mut ScopeRecord, DocumentError> {
        self.records
            .get_mut(id.0)
            .ok_or_else(|| DocumentError::structural(format!("unknown scope {}", id)))
    }

    /// Registers a new `Unopened` scope as an open child of `parent`.
    pub fn create(
        &mut self,
        parent: Option<ScopeId>,
        kind: ScopeKind,
    ) -> Result<ScopeId, DocumentError> {
        let id = ScopeId(self.records.len());
        if let Some(parent_id) = parent {
            let parent_record = self.record_mut(parent_id)?;
            if parent_record.state == ScopeState::Closed {
                return Err(DocumentError::ClosedScope(parent_record.kind.to_string()));
            }
            parent_record.open_children.push(id);
        }
        self.records.push(ScopeRecord {
            parent,
            kind,
            state: ScopeState::Unopened,
            open_children: Vec::new(),
        });
        Ok(id)
    }

    pub fn open(&mut self, id: ScopeId) -> Result<(), DocumentError> {
        let record = self.record_mut(id)?;
        match record.state {
            ScopeState::Unopened => {
                record.state = ScopeState::Open;
                Ok(())
            }
            ScopeState::Open => Err(DocumentError::structural(format!(
                "{} {} is already open",
                record.kind, id
            ))),
            ScopeState::Closed => Err(DocumentError::ClosedScope(record.kind.to_string())),
        }
    }

    /// Closes a scope and removes it from its parent's open children.
    ///
    /// A scope with open children stays open.
    pub fn close(&mut self, id: ScopeId) -> Result<(), DocumentError> {
        let record = self.record(id)?;
        if record.state == ScopeState::Closed {
            return Err(DocumentError::ClosedScope(record.kind.to_string()));
        }
        if let Some(child) = record.open_children.first() {
            let child_kind = self.record(*child)?.kind;
            return Err(DocumentError::structural(format!(
                "cannot close {} while its {} is still open",
                record.kind, child_kind
            )));
        }
        let parent = record.parent;
        self.record_mut(id)?.state = ScopeState::Closed;
        if let Some(parent_id) = parent {
            self.record_mut(parent_id)?
                .open_children
                .retain(|child| *child != id);
        }
        Ok(())
    }

    pub fn state(&self, id: ScopeId) -> Option<ScopeState> {
        self.records.get(id.0).map(|r| r.state)
    }

    pub fn kind(&self, id: ScopeId) -> Option<ScopeKind> {
        self.records.get(id.0).map(|r| r.kind)
    }

    pub fn open_children(&self, id: ScopeId) -> &[ScopeId] {
        self.records
            .get(id.0)
            .map(|r| r.open_children.as_slice())
            .unwrap_or(&[])
    }

    /// `Ok` only for an open scope.
    pub fn ensure_open(&self, id: ScopeId) -> Result<(), DocumentError> {
        let record = self.record(id)?;
        match record.state {
            ScopeState::Open => Ok(()),
            ScopeState::Closed => Err(DocumentError::ClosedScope(record.kind.to_string())),
            ScopeState::Unopened => Err(DocumentError::structural(format!(
                "{} {} has not been opened",
                record.kind, id
            ))),
        }
    }

    /// `Ok` for an open scope whose open children are all of an `allowed` kind.
    pub fn ensure_mutable(&self, id: ScopeId, allowed: &[ScopeKind]) -> Result<(), DocumentError> {
        self.ensure_open(id)?;
        let record = self.record(id)?;
        for child in &record.open_children {
            let child_kind = self.record(*child)?.kind;
            if !allowed.contains(&child_kind) {
                return Err(DocumentError::structural(format!(
                    "{} cannot be modified while its {} is open",
                    record.kind, child_kind
                )));
            }
        }
        Ok(())
    }

    /// Number of scopes not yet closed.
    pub fn open_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.state != ScopeState::Closed)
            .count()
    }

    /// Closes every scope still open, children before parents, and returns
    /// what was closed.
    pub fn force_close_all(&mut self) -> Vec<(ScopeId, ScopeKind)> {
        let mut closed = Vec::new();
        // Children are always created after their parents.
        for (index, record) in self.records.iter_mut().enumerate().rev() {
            if record.state != ScopeState::Closed {
                record.state = ScopeState::Closed;
                record.open_children.clear();
                closed.push((ScopeId(index), record.kind));
            }
        }
        closed
    }
}

/// A builder's handle on its scope.
pub(crate) struct ScopeLink {
    ctx: Arc<DocumentContext>,
    id: ScopeId,
    kind: ScopeKind,
}

impl ScopeLink {
    /// Creates and opens a scope below `parent`.
    pub(crate) fn open(
        ctx: &Arc<DocumentContext>,
        parent: Option<ScopeId>,
        kind: ScopeKind,
    ) -> Result<Self, DocumentError> {
        let id = ctx.with_scopes(|arena| {
            let id = arena.create(parent, kind)?;
            arena.open(id)?;
            Ok(id)
        })?;
        debug!("Opened {} {}", kind, id);
        Ok(Self {
            ctx: Arc::clone(ctx),
            id,
            kind,
        })
    }

    /// Creates and opens a child of this scope. The caller must have
    /// checked that this scope accepts a new child.
    pub(crate) fn child(&self, kind: ScopeKind) -> Result<ScopeLink, DocumentError> {
        ScopeLink::open(&self.ctx, Some(self.id), kind)
    }

    pub(crate) fn ctx(&self) -> &Arc<DocumentContext> {
        &self.ctx
    }

    pub(crate) fn id(&self) -> ScopeId {
        self.id
    }

    pub(crate) fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub(crate) fn ensure_open(&self) -> Result<(), DocumentError> {
        self.ctx.with_scopes(|arena| arena.ensure_open(self.id))
    }

    /// Open and no child open.
    pub(crate) fn ensure_mutable(&self) -> Result<(), DocumentError> {
        self.ctx.with_scopes(|arena| arena.ensure_mutable(self.id, &[]))
    }

    /// Open and only children of the `allowed` kinds open.
    pub(crate) fn ensure_mutable_allowing(&self, allowed: &[ScopeKind]) -> Result<(), DocumentError> {
        self.ctx
            .with_scopes(|arena| arena.ensure_mutable(self.id, allowed))
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.ctx
            .with_scopes(|arena| Ok(arena.state(self.id) == Some(ScopeState::Closed)))
            .unwrap_or(true)
    }

    pub(crate) fn close(&self) -> Result<(), DocumentError> {
        self.ctx.with_scopes(|arena| arena.close(self.id))?;
        debug!("Closed {} {}", self.kind, self.id);
        Ok(())
    }

    /// Closes the scope, then runs `finish` to assemble and hand over its
    /// content. A failing `finish` marks the document as incomplete.
    pub(crate) fn close_with<T>(
        &self,
        finish: impl FnOnce() -> Result<T, DocumentError>,
    ) -> Result<T, DocumentError> {
        self.close()?;
        finish().inspect_err(|err| self.record_failure(err))
    }

    /// Reports the outcome of a close performed by `Drop`.
    pub(crate) fn file_drop_result(&self, result: Result<(), DocumentError>) {
        if let Err(err) = result {
            warn!("Closing {} {} on drop failed: {}", self.kind, self.id, err);
            self.ctx.defer(err);
        }
    }

    /// Notes an error that leaves the document incomplete.
    pub(crate) fn record_failure(&self, err: &DocumentError) {
        self.ctx.record_failure(err);
    }
}

impl fmt::Debug for ScopeLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeLink")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Implements `Drop` for builders: a builder left open is closed and any
/// error from that close is filed with its document.
macro_rules! close_on_drop {
    ($ty:ty => $($field:ident).+) => {
        impl Drop for $ty {
            fn drop(&mut self) {
                if !self.$($field).+.is_closed() {
                    let result = self.close();
                    self.$($field).+.file_drop_result(result);
                }
            }
        }
    };
}

pub(crate) use close_on_drop;

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with_parent() -> (ScopeArena, ScopeId) {
        let mut arena = ScopeArena::new();
        let root = arena.create(None, ScopeKind::Document).unwrap();
        arena.open(root).unwrap();
        (arena, root)
    }

    #[test]
    fn test_lifecycle() {
        let (mut arena, root) = arena_with_parent();
        let child = arena.create(Some(root), ScopeKind::Section).unwrap();
        assert_eq!(arena.state(child), Some(ScopeState::Unopened));
        arena.open(child).unwrap();
        assert_eq!(arena.open_children(root), &[child]);
        arena.close(child).unwrap();
        assert!(arena.open_children(root).is_empty());
        assert_eq!(arena.state(child), Some(ScopeState::Closed));
    }

    #[test]
    fn test_double_open_is_structural() {
        let (mut arena, root) = arena_with_parent();
        assert!(matches!(
            arena.open(root),
            Err(DocumentError::StructuralViolation(_))
        ));
    }

    #[test]
    fn test_close_with_open_child_keeps_scope_open() {
        let (mut arena, root) = arena_with_parent();
        let child = arena.create(Some(root), ScopeKind::Table).unwrap();
        arena.open(child).unwrap();

        let err = arena.close(root).unwrap_err();
        assert!(matches!(err, DocumentError::StructuralViolation(_)));
        assert!(err.to_string().contains("table"));
        assert_eq!(arena.state(root), Some(ScopeState::Open));

        arena.close(child).unwrap();
        arena.close(root).unwrap();
    }

    #[test]
    fn test_closed_scope_rejects_everything() {
        let (mut arena, root) = arena_with_parent();
        arena.close(root).unwrap();
        assert!(matches!(arena.close(root), Err(DocumentError::ClosedScope(_))));
        assert!(matches!(
            arena.ensure_open(root),
            Err(DocumentError::ClosedScope(_))
        ));
        assert!(matches!(
            arena.create(Some(root), ScopeKind::Section),
            Err(DocumentError::ClosedScope(_))
        ));
    }

    #[test]
    fn test_mutable_allowing_kinds() {
        let (mut arena, root) = arena_with_parent();
        let section = arena.create(Some(root), ScopeKind::Section).unwrap();
        arena.open(section).unwrap();
        assert!(arena.ensure_mutable(root, &[ScopeKind::Section]).is_ok());
        assert!(matches!(
            arena.ensure_mutable(root, &[]),
            Err(DocumentError::StructuralViolation(_))
        ));
    }

    #[test]
    fn test_force_close_all_reports_leftovers() {
        let (mut arena, root) = arena_with_parent();
        let a = arena.create(Some(root), ScopeKind::List).unwrap();
        arena.open(a).unwrap();
        let b = arena.create(Some(a), ScopeKind::ListItem).unwrap();
        arena.open(b).unwrap();

        let closed = arena.force_close_all();
        assert_eq!(
            closed,
            vec![
                (b, ScopeKind::ListItem),
                (a, ScopeKind::List),
                (root, ScopeKind::Document)
            ]
        );
        assert_eq!(arena.open_count(), 0);
    }
}
