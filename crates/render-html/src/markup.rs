use folio_render_core::RenderError;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// Bytes written before an `href` value: `<a href="`.
const LINK_VALUE_OFFSET: usize = 9;

/// An internal link, by the byte offset of its `href` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) offset: usize,
    pub(crate) anchor: String,
}

/// A thin event writer over an in-memory buffer.
pub(crate) struct Markup {
    writer: Writer<Vec<u8>>,
    links: Vec<Link>,
}

fn start<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    BytesStart::new(name).with_attributes(attrs.iter().copied())
}

impl Markup {
    pub(crate) fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            links: Vec::new(),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.writer
            .write_event(event)
            .map_err(|e| RenderError::Markup(e.to_string()))
    }

    pub(crate) fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        self.emit(Event::Start(start(name, attrs)))
    }

    pub(crate) fn close(&mut self, name: &str) -> Result<(), RenderError> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        self.emit(Event::Empty(start(name, attrs)))
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<(), RenderError> {
        self.emit(Event::Text(BytesText::new(text)))
    }

    /// Writes already escaped markup.
    pub(crate) fn raw(&mut self, markup: &str) -> Result<(), RenderError> {
        self.emit(Event::Text(BytesText::from_escaped(markup)))
    }

    /// `<name attrs>text</name>`
    pub(crate) fn element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), RenderError> {
        self.open(name, attrs)?;
        self.text(text)?;
        self.close(name)
    }

    /// `<a href="#anchor">text</a>`. The link is remembered so the file
    /// name of the anchor's unit can be filled in once all units exist.
    pub(crate) fn link(&mut self, anchor: &str, text: &str) -> Result<(), RenderError> {
        let offset = self.len() + LINK_VALUE_OFFSET;
        let target = format!("#{}", anchor);
        self.element("a", &[("href", target.as_str())], text)?;
        self.links.push(Link {
            offset,
            anchor: anchor.to_string(),
        });
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.writer.get_ref().len()
    }

    pub(crate) fn into_string(self) -> Result<String, RenderError> {
        Ok(String::from_utf8(self.writer.into_inner())?)
    }

    /// The written text and its links in writing order.
    pub(crate) fn into_parts(self) -> Result<(String, Vec<Link>), RenderError> {
        Ok((String::from_utf8(self.writer.into_inner())?, self.links))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_text_and_attributes() -> Result<(), RenderError> {
        let mut m = Markup::new();
        m.open("p", &[("title", "a\"b")])?;
        m.text("x < y & z")?;
        m.empty("br", &[])?;
        m.close("p")?;
        assert_eq!(
            m.into_string()?,
            "<p title=\"a&quot;b\">x &lt; y &amp; z<br/></p>"
        );
        Ok(())
    }

    #[test]
    fn test_link_offset_points_at_href_value() -> Result<(), RenderError> {
        let mut m = Markup::new();
        m.text("ab")?;
        m.link("sec-1", "1")?;
        let (text, links) = m.into_parts()?;
        assert_eq!(links.len(), 1);
        assert_eq!(&text[links[0].offset..], "#sec-1\">1</a>");
        Ok(())
    }
}
