//! Enumerations and itemizations. Items hold paragraphs and nested lists.

use crate::error::DocumentError;
use crate::scope::{ScopeKind, ScopeLink, close_on_drop};
use crate::slot::{Outlet, Slot, reserve, resolve_all};
use crate::text::{BlockContent, ComplexHost, PlainHost, Sealed, TextCore, TextHost};
use folio_idf::{BodyNode, ListItemNode, ListNode};

pub struct List {
    link: ScopeLink,
    ordered: bool,
    items: Vec<Slot<ListItemNode>>,
    outlet: Outlet<ListNode>,
}

impl List {
    pub(crate) fn new(link: ScopeLink, ordered: bool, outlet: Outlet<ListNode>) -> Self {
        Self {
            link,
            ordered,
            items: Vec::new(),
            outlet,
        }
    }

    /// Opens a list in `content` as its next block.
    pub(crate) fn open_in(content: &mut BlockContent, ordered: bool) -> Result<List, DocumentError> {
        let (link, outlet) = content.open_block(ScopeKind::List, BodyNode::List)?;
        Ok(List::new(link, ordered, outlet))
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn item(&mut self) -> Result<ListItem, DocumentError> {
        self.link.ensure_mutable()?;
        let link = self.link.child(ScopeKind::ListItem)?;
        let outlet = reserve(&mut self.items, |item| item);
        Ok(ListItem {
            content: BlockContent::new(link),
            outlet,
        })
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        let ordered = self.ordered;
        self.link.close_with(|| {
            let items = resolve_all(std::mem::take(&mut self.items));
            self.outlet.deliver(ListNode { ordered, items });
            Ok(())
        })
    }
}

close_on_drop!(List => link);

/// One entry of a list: rich text paragraphs and nested lists.
pub struct ListItem {
    content: BlockContent,
    outlet: Outlet<ListItemNode>,
}

impl ListItem {
    pub fn enumeration(&mut self) -> Result<List, DocumentError> {
        List::open_in(&mut self.content, true)
    }

    pub fn itemization(&mut self) -> Result<List, DocumentError> {
        List::open_in(&mut self.content, false)
    }

    pub fn close(&mut self) -> Result<(), DocumentError> {
        let children = self.content.close()?;
        self.outlet.deliver(ListItemNode { children });
        Ok(())
    }
}

impl Sealed for ListItem {}

impl TextHost for ListItem {
    fn text_core(&mut self) -> &mut TextCore {
        &mut self.content.text
    }

    fn break_paragraph(&mut self) -> Result<(), DocumentError> {
        self.content.flush_paragraph();
        Ok(())
    }
}

impl PlainHost for ListItem {}
impl ComplexHost for ListItem {}

close_on_drop!(ListItem => content.text.link);
