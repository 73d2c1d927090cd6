use crate::markup::Link;
use folio_render_core::RenderError;
use std::collections::HashMap;

/// File name of the unit at `index`: `main.html`, `main_2.html`, ...
pub fn unit_name(main_name: &str, index: usize) -> String {
    if index == 0 {
        format!("{}.html", main_name)
    } else {
        format!("{}_{}.html", main_name, index + 1)
    }
}

/// Where every anchor ended up.
#[derive(Debug, Default)]
pub(crate) struct AnchorMap {
    units: HashMap<String, usize>,
}

impl AnchorMap {
    pub(crate) fn record(&mut self, anchor: &str, unit: usize) {
        self.units.insert(anchor.to_string(), unit);
    }

    /// Puts the owning unit's file name in front of every link of `body`
    /// whose target lives in another unit. `body` belongs to unit `current`.
    pub(crate) fn patch(
        &self,
        body: &str,
        links: &[Link],
        current: usize,
        main_name: &str,
    ) -> Result<String, RenderError> {
        let mut out = String::with_capacity(body.len());
        let mut from = 0;
        for link in links {
            let unit = *self
                .units
                .get(&link.anchor)
                .ok_or_else(|| RenderError::UnresolvedReference(link.anchor.clone()))?;
            if unit == current {
                continue;
            }
            let head = body
                .get(from..link.offset)
                .ok_or_else(|| RenderError::Markup(format!("link offset {} out of order", link.offset)))?;
            out.push_str(head);
            out.push_str(&unit_name(main_name, unit));
            from = link.offset;
        }
        out.push_str(body.get(from..).unwrap_or_default());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Markup;

    #[test]
    fn test_unit_names() {
        assert_eq!(unit_name("report", 0), "report.html");
        assert_eq!(unit_name("report", 1), "report_2.html");
    }

    #[test]
    fn test_patch_links_across_units() -> Result<(), RenderError> {
        let mut anchors = AnchorMap::default();
        anchors.record("fig-1", 0);
        anchors.record("sec-2", 1);
        let mut m = Markup::new();
        m.link("fig-1", "a")?;
        m.link("sec-2", "b")?;
        let (body, links) = m.into_parts()?;
        assert_eq!(
            anchors.patch(&body, &links, 0, "r")?,
            "<a href=\"#fig-1\">a</a><a href=\"r_2.html#sec-2\">b</a>"
        );
        assert_eq!(
            anchors.patch(&body, &links, 1, "r")?,
            "<a href=\"r.html#fig-1\">a</a><a href=\"#sec-2\">b</a>"
        );
        Ok(())
    }

    #[test]
    fn test_text_is_never_rewritten() -> Result<(), RenderError> {
        let mut anchors = AnchorMap::default();
        anchors.record("sec-1", 1);
        let mut m = Markup::new();
        m.text("mail @@UNIT: or #sec-1 ")?;
        m.link("sec-1", "1")?;
        let (body, links) = m.into_parts()?;
        assert_eq!(
            anchors.patch(&body, &links, 0, "r")?,
            "mail @@UNIT: or #sec-1 <a href=\"r_2.html#sec-1\">1</a>"
        );
        Ok(())
    }

    #[test]
    fn test_patch_unknown_anchor_fails() -> Result<(), RenderError> {
        let anchors = AnchorMap::default();
        let mut m = Markup::new();
        m.link("tab-9", "9")?;
        let (body, links) = m.into_parts()?;
        assert!(matches!(
            anchors.patch(&body, &links, 0, "r"),
            Err(RenderError::UnresolvedReference(_))
        ));
        Ok(())
    }
}
