use crate::markup::Markup;
use crate::mathml::write_math;
use crate::units::{AnchorMap, unit_name};
use folio_idf::{
    CodeNode, EquationNode, FigureNode, FigureSeriesNode, HeaderNode, Inline, ResolvedLabel,
    SectionNode, TableNode, TablePart, TableSectionNode, plain_text,
};
use folio_render_core::svg::{render_svg, svg_unit_path};
use folio_render_core::utils::{
    SeqPiece, alpha_index, citation_text, interleave, reference_prefix, resolve_all,
};
use folio_render_core::{
    DocumentPart, ElementRenderer, OutputSink, RenderContext, RenderDriver, RenderError,
};
use folio_traits::BibRecord;
use folio_types::{CellDef, CitationMode, FontFamily, Label, LabelKind, Style};
use itertools::Itertools;
use log::{debug, info};

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
const BIBLIOGRAPHY_ANCHOR: &str = "references";

const STYLESHEET: &str = "body{font-family:serif;max-width:50em;margin:auto}\
table{border-collapse:collapse;margin:1em auto}\
td,th{padding:0.2em 0.6em}\
td.sep-left,th.sep-left{border-left:1px solid}\
td.sep-right,th.sep-right{border-right:1px solid}\
figure{text-align:center}\
.figure-series figure{display:inline-block;vertical-align:top}\
.equation{display:flex;align-items:center;justify-content:space-between}\
nav{display:flex;justify-content:space-between;margin:1em 0}";

/// Writes documents as XHTML, split into linked units by size.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlDriver;

impl HtmlDriver {
    pub fn new() -> Self {
        Self
    }
}

impl RenderDriver for HtmlDriver {
    fn name(&self) -> &'static str {
        "xhtml"
    }

    fn main_extension(&self) -> &'static str {
        "html"
    }

    fn start(&self, context: RenderContext) -> Box<dyn ElementRenderer> {
        Box::new(HtmlRenderer {
            context,
            title: String::new(),
            units: vec![Markup::new()],
            anchors: AnchorMap::default(),
            sections: Vec::new(),
            part: DocumentPart::Body,
            counters: Counters::default(),
            figures: Vec::new(),
            cited: Vec::new(),
        })
    }
}

#[derive(Default)]
struct Counters {
    tables: usize,
    figures: usize,
    equations: usize,
    listings: usize,
}

struct HtmlRenderer {
    context: RenderContext,
    /// Plain document title, used as every unit's `<title>`.
    title: String,
    units: Vec<Markup>,
    anchors: AnchorMap,
    /// Section number components of the open sections.
    sections: Vec<usize>,
    part: DocumentPart,
    counters: Counters,
    figures: Vec<(String, Vec<u8>)>,
    cited: Vec<BibRecord>,
}

fn font_css(family: FontFamily, bold: bool, italic: bool) -> String {
    let family = match family {
        FontFamily::Serif => "serif",
        FontFamily::SansSerif => "sans-serif",
        FontFamily::Monospace => "monospace",
    };
    let mut css = format!("font-family:{}", family);
    if bold {
        css.push_str(";font-weight:bold");
    }
    if italic {
        css.push_str(";font-style:italic");
    }
    css
}

impl HtmlRenderer {
    fn out(&mut self) -> &mut Markup {
        let last = self.units.len() - 1;
        &mut self.units[last]
    }

    fn current_unit(&self) -> usize {
        self.units.len() - 1
    }

    /// Final number and anchor of an element. Labeled elements use their
    /// resolved label; the rest follow the same counting.
    fn resolve(&self, label: Option<Label>, kind: LabelKind, number: String) -> Result<ResolvedLabel, RenderError> {
        match label {
            Some(label) => self
                .context
                .labels
                .get(&label)
                .cloned()
                .ok_or_else(|| RenderError::UnresolvedReference(label.to_string())),
            None => Ok(ResolvedLabel::new(kind, number)),
        }
    }

    fn anchor(&mut self, anchor: &str) {
        let unit = self.current_unit();
        self.anchors.record(anchor, unit);
    }

    fn inlines(&mut self, content: &[Inline]) -> Result<(), RenderError> {
        for inline in content {
            self.inline_element(inline)?;
        }
        Ok(())
    }

    fn wrapped(&mut self, name: &str, attrs: &[(&str, &str)], children: &[Inline]) -> Result<(), RenderError> {
        self.out().open(name, attrs)?;
        self.inlines(children)?;
        self.out().close(name)
    }

    fn inline_element(&mut self, inline: &Inline) -> Result<(), RenderError> {
        match inline {
            Inline::Text(t) => self.out().text(t),
            Inline::LineBreak => self.out().empty("br", &[]),
            Inline::Styled { style, children } => match style {
                Style::Font(font) => {
                    let css = font_css(font.family, font.bold, font.italic);
                    self.wrapped("span", &[("style", css.as_str())], children)
                }
                Style::Color(color) => {
                    let css = format!("color:{}", color.color.to_hex());
                    self.wrapped("span", &[("style", css.as_str())], children)
                }
                Style::Stroke(_) => self.inlines(children),
            },
            Inline::Emphasis(children) => self.wrapped("em", &[], children),
            Inline::Code(children) => self.wrapped("code", &[], children),
            Inline::Subscript(children) => self.wrapped("sub", &[], children),
            Inline::Superscript(children) => self.wrapped("sup", &[], children),
            Inline::Braces(children) => {
                self.out().text("(")?;
                self.inlines(children)?;
                self.out().text(")")
            }
            Inline::Quotes(children) => {
                self.out().text("\u{201c}")?;
                self.inlines(children)?;
                self.out().text("\u{201d}")
            }
            Inline::Math(expr) => write_math(self.out(), expr, false),
            Inline::Citation {
                mode,
                sequence,
                records,
            } => {
                for record in records {
                    if !self.cited.iter().any(|r| r.key == record.key) {
                        self.cited.push(record.clone());
                    }
                }
                self.out().open("cite", &[])?;
                for piece in interleave(*sequence, records) {
                    match piece {
                        SeqPiece::Text(t) => self.out().text(&t)?,
                        SeqPiece::Item(record) => {
                            let text = citation_text(*mode, record);
                            if *mode == CitationMode::Title {
                                self.out().text(&text)?;
                            } else {
                                self.out().link(&format!("bib-{}", record.key), &text)?;
                            }
                        }
                    }
                }
                self.out().close("cite")
            }
            Inline::Reference { sequence, labels } => {
                let resolved: Vec<ResolvedLabel> = resolve_all(&self.context.labels, labels)?
                    .into_iter()
                    .cloned()
                    .collect();
                let refs: Vec<&ResolvedLabel> = resolved.iter().collect();
                let prefix = reference_prefix(&refs);
                if let Some(prefix) = &prefix {
                    self.out().text(&format!("{}\u{a0}", prefix))?;
                }
                for piece in interleave(*sequence, &resolved) {
                    match piece {
                        SeqPiece::Text(t) => self.out().text(&t)?,
                        SeqPiece::Item(r) => {
                            let text = if prefix.is_some() {
                                r.number.clone()
                            } else {
                                r.display()
                            };
                            self.out().link(&r.anchor, &text)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn caption(&mut self, name: &str, resolved: &ResolvedLabel, caption: &[Inline]) -> Result<(), RenderError> {
        self.out().open(name, &[])?;
        let lead = if caption.is_empty() {
            resolved.display()
        } else {
            format!("{}: ", resolved.display())
        };
        self.out().element("span", &[("class", "caption-number")], &lead)?;
        self.inlines(caption)?;
        self.out().close(name)
    }

    fn table_part(&mut self, section: &TableSectionNode, rules: &[(bool, bool)]) -> Result<(), RenderError> {
        let (group, cell) = match section.part {
            TablePart::Header => ("thead", "th"),
            TablePart::Body => ("tbody", "td"),
            TablePart::Footer => ("tfoot", "td"),
        };
        self.out().open(group, &[])?;
        for row in &section.rows {
            self.out().open("tr", &[])?;
            for c in &row.cells {
                let col_span = c.col_span.to_string();
                let row_span = c.row_span.to_string();
                let align = format!("text-align:{}", c.align.css_align().unwrap_or("left"));
                let last = c.column + c.col_span.max(1) - 1;
                let left = rules.get(c.column).is_some_and(|r| r.0);
                let right = rules.get(last).is_some_and(|r| r.1);
                let class = [(left, "sep-left"), (right, "sep-right")]
                    .into_iter()
                    .filter(|(on, _)| *on)
                    .map(|(_, name)| name)
                    .join(" ");
                let mut attrs: Vec<(&str, &str)> = vec![("style", align.as_str())];
                if c.col_span > 1 {
                    attrs.push(("colspan", col_span.as_str()));
                }
                if c.row_span > 1 {
                    attrs.push(("rowspan", row_span.as_str()));
                }
                if !class.is_empty() {
                    attrs.push(("class", class.as_str()));
                }
                self.out().open(cell, &attrs)?;
                self.inlines(&c.content)?;
                self.out().close(cell)?;
            }
            self.out().close("tr")?;
        }
        self.out().close(group)
    }

    fn figure_element(&mut self, figure: &FigureNode, resolved: &ResolvedLabel, sub: bool) -> Result<(), RenderError> {
        self.anchor(&resolved.anchor);
        let width = format!("width:{:.0}%", figure.size.width_fraction() * 100.0);
        let src = svg_unit_path(figure);
        let alt = plain_text(&figure.caption);
        self.out().open("figure", &[("id", resolved.anchor.as_str()), ("class", "figure")])?;
        self.out().empty("img", &[("src", src.as_str()), ("alt", alt.as_str()), ("style", width.as_str())])?;
        if sub {
            let number = resolved.number.chars().filter(|c| c.is_alphabetic()).collect::<String>();
            self.out().open("figcaption", &[])?;
            self.out().text(&format!("({}) ", number))?;
            self.inlines(&figure.caption)?;
            self.out().close("figcaption")?;
        } else {
            self.caption("figcaption", resolved, &figure.caption)?;
        }
        self.out().close("figure")?;
        self.figures.push((src, render_svg(figure)?));
        Ok(())
    }

    fn navigation(m: &mut Markup, main: &str, index: usize, count: usize) -> Result<(), RenderError> {
        if count < 2 {
            return Ok(());
        }
        m.open("nav", &[])?;
        if index > 0 {
            let prev = unit_name(main, index - 1);
            m.element("a", &[("href", prev.as_str()), ("rel", "prev")], "Previous")?;
        }
        if index + 1 < count {
            let next = unit_name(main, index + 1);
            m.element("a", &[("href", next.as_str()), ("rel", "next")], "Next")?;
        }
        m.close("nav")
    }

    fn bibliography(&mut self) -> Result<(), RenderError> {
        if self.cited.is_empty() {
            return Ok(());
        }
        self.anchor(BIBLIOGRAPHY_ANCHOR);
        let records = std::mem::take(&mut self.cited);
        self.out().open("section", &[("id", BIBLIOGRAPHY_ANCHOR), ("class", "references")])?;
        self.out().element("h2", &[], "References")?;
        self.out().open("ol", &[])?;
        for record in &records {
            let id = format!("bib-{}", record.key);
            self.anchor(&id);
            let mut text = String::new();
            if !record.authors.is_empty() {
                text.push_str(&record.authors.join(", "));
                text.push_str(". ");
            }
            self.out().open("li", &[("id", id.as_str())])?;
            self.out().text(&text)?;
            self.out().element("em", &[], &record.title)?;
            let mut tail = String::new();
            if let Some(venue) = &record.venue {
                tail.push_str(&format!(". {}", venue));
            }
            if let Some(year) = record.year {
                tail.push_str(&format!(", {}", year));
            }
            tail.push('.');
            self.out().text(&tail)?;
            self.out().close("li")?;
        }
        self.out().close("ol")?;
        self.out().close("section")
    }

    fn wrap_unit(&self, unit: Markup, index: usize, count: usize) -> Result<String, RenderError> {
        let (body, links) = unit.into_parts()?;
        let main = &self.context.main_name;
        let mut m = Markup::new();
        m.raw("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE html>\n")?;
        m.open("html", &[("xmlns", XHTML_NS), ("xml:lang", "en")])?;
        m.open("head", &[])?;
        m.empty("meta", &[("charset", "UTF-8")])?;
        m.element("title", &[], &self.title)?;
        m.element("style", &[], STYLESHEET)?;
        m.close("head")?;
        m.open("body", &[])?;
        Self::navigation(&mut m, main, index, count)?;
        m.raw(&self.anchors.patch(&body, &links, index, main)?)?;
        Self::navigation(&mut m, main, index, count)?;
        m.close("body")?;
        m.close("html")?;
        m.into_string()
    }
}

impl ElementRenderer for HtmlRenderer {
    fn begin_document(&mut self, header: &HeaderNode) -> Result<(), RenderError> {
        self.title = plain_text(&header.title);
        if header.is_empty() {
            return Ok(());
        }
        self.out().open("header", &[])?;
        self.out().open("h1", &[("class", "title")])?;
        self.inlines(&header.title)?;
        self.out().close("h1")?;
        if !header.authors.is_empty() {
            self.out().open("p", &[("class", "authors")])?;
            for (i, author) in header.authors.iter().enumerate() {
                if i > 0 {
                    self.out().text(", ")?;
                }
                self.inlines(author)?;
            }
            self.out().close("p")?;
        }
        if let Some(date) = header.date {
            self.out().element("p", &[("class", "date")], &date.to_string())?;
        }
        if !header.summary.is_empty() {
            self.out().open("section", &[("class", "abstract")])?;
            self.out().element("h2", &[], "Abstract")?;
            self.out().open("p", &[])?;
            self.inlines(&header.summary)?;
            self.out().close("p")?;
            self.out().close("section")?;
        }
        self.out().close("header")
    }

    fn begin_part(&mut self, part: DocumentPart) -> Result<(), RenderError> {
        self.part = part;
        self.sections.clear();
        if part == DocumentPart::Appendix {
            self.out().element("h1", &[("class", "part")], "Appendix")?;
        }
        Ok(())
    }

    fn end_part(&mut self, _part: DocumentPart) -> Result<(), RenderError> {
        Ok(())
    }

    fn begin_section(&mut self, section: &SectionNode, depth: usize) -> Result<(), RenderError> {
        if depth <= 1 {
            let len = self.out().len();
            if len > 0 && len >= self.context.split_budget {
                debug!(
                    "Unit {} reached {} bytes; starting unit {}",
                    self.current_unit() + 1,
                    len,
                    self.current_unit() + 2
                );
                self.units.push(Markup::new());
            }
        }
        self.sections.truncate(depth);
        while self.sections.len() < depth {
            self.sections.push(0);
        }
        self.sections[depth - 1] += 1;
        let number = self
            .sections
            .iter()
            .enumerate()
            .map(|(i, n)| match (i, self.part) {
                (0, DocumentPart::Appendix) => alpha_index(n - 1).to_uppercase(),
                _ => n.to_string(),
            })
            .join(".");
        let resolved = self.resolve(section.label, LabelKind::Section, number)?;
        self.anchor(&resolved.anchor);
        let heading = format!("h{}", (depth + 1).min(6));
        self.out().open("section", &[("id", resolved.anchor.as_str())])?;
        self.out().open(&heading, &[])?;
        self.out().element("span", &[("class", "section-number")], &format!("{} ", resolved.number))?;
        self.inlines(&section.title)?;
        self.out().close(&heading)
    }

    fn end_section(&mut self, depth: usize) -> Result<(), RenderError> {
        // Keep this level's counter for the next sibling.
        self.sections.truncate(depth);
        self.out().close("section")
    }

    fn inline(&mut self, content: &[Inline]) -> Result<(), RenderError> {
        self.out().open("p", &[])?;
        self.inlines(content)?;
        self.out().close("p")
    }

    fn begin_list(&mut self, ordered: bool) -> Result<(), RenderError> {
        self.out().open(if ordered { "ol" } else { "ul" }, &[])
    }

    fn begin_item(&mut self) -> Result<(), RenderError> {
        self.out().open("li", &[])
    }

    fn end_item(&mut self) -> Result<(), RenderError> {
        self.out().close("li")
    }

    fn end_list(&mut self, ordered: bool) -> Result<(), RenderError> {
        self.out().close(if ordered { "ol" } else { "ul" })
    }

    fn table(&mut self, table: &TableNode) -> Result<(), RenderError> {
        self.counters.tables += 1;
        let resolved = self.resolve(table.label, LabelKind::Table, self.counters.tables.to_string())?;
        self.anchor(&resolved.anchor);
        // (rule on the left, rule on the right) per pure column.
        let defs = &table.columns;
        let rules: Vec<(bool, bool)> = defs
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_pure())
            .map(|(i, _)| {
                let left = i > 0 && defs[i - 1] == CellDef::Separator;
                let right = defs.get(i + 1) == Some(&CellDef::Separator);
                (left, right)
            })
            .collect();
        let class = if table.spans_all_columns { "table wide" } else { "table" };
        self.out().open("table", &[("id", resolved.anchor.as_str()), ("class", class)])?;
        self.caption("caption", &resolved, &table.caption)?;
        for part in table.parts() {
            self.table_part(part, &rules)?;
        }
        self.out().close("table")
    }

    fn figure(&mut self, figure: &FigureNode) -> Result<(), RenderError> {
        self.counters.figures += 1;
        let resolved = self.resolve(figure.label, LabelKind::Figure, self.counters.figures.to_string())?;
        self.figure_element(figure, &resolved, false)
    }

    fn figure_series(&mut self, series: &FigureSeriesNode) -> Result<(), RenderError> {
        self.counters.figures += 1;
        let number = self.counters.figures.to_string();
        let resolved = self.resolve(series.label, LabelKind::Figure, number.clone())?;
        self.anchor(&resolved.anchor);
        self.out().open("figure", &[("id", resolved.anchor.as_str()), ("class", "figure-series")])?;
        for (i, figure) in series.figures.iter().enumerate() {
            let letter = alpha_index(i);
            let sub = self.resolve(figure.label, LabelKind::SubFigure, format!("{}{}", number, letter))?;
            self.figure_element(figure, &sub, true)?;
        }
        self.caption("figcaption", &resolved, &series.caption)?;
        self.out().close("figure")
    }

    fn equation(&mut self, equation: &EquationNode) -> Result<(), RenderError> {
        self.counters.equations += 1;
        let resolved = self.resolve(equation.label, LabelKind::Equation, self.counters.equations.to_string())?;
        self.anchor(&resolved.anchor);
        self.out().open("div", &[("id", resolved.anchor.as_str()), ("class", "equation")])?;
        write_math(self.out(), &equation.expr, true)?;
        self.out().element("span", &[("class", "equation-number")], &format!("({})", resolved.number))?;
        self.out().close("div")
    }

    fn code(&mut self, code: &CodeNode) -> Result<(), RenderError> {
        self.counters.listings += 1;
        let resolved = self.resolve(code.label, LabelKind::Code, self.counters.listings.to_string())?;
        self.anchor(&resolved.anchor);
        self.out().open("figure", &[("id", resolved.anchor.as_str()), ("class", "listing")])?;
        self.caption("figcaption", &resolved, &code.caption)?;
        self.out().open("pre", &[])?;
        self.out().element("code", &[], &code.body)?;
        self.out().close("pre")?;
        self.out().close("figure")
    }

    fn finish(mut self: Box<Self>, sink: &mut dyn OutputSink) -> Result<Vec<String>, RenderError> {
        self.bibliography()?;
        let units = std::mem::take(&mut self.units);
        let count = units.len();
        let mut written = Vec::with_capacity(count + self.figures.len());
        for (index, unit) in units.into_iter().enumerate() {
            let path = unit_name(&self.context.main_name, index);
            let text = self.wrap_unit(unit, index, count)?;
            sink.write_unit(&path, text.as_bytes())?;
            written.push(path);
        }
        for (path, bytes) in std::mem::take(&mut self.figures) {
            sink.write_unit(&path, &bytes)?;
            written.push(path);
        }
        info!("XHTML driver wrote {} page unit(s) and {} figure(s)", count, written.len() - count);
        Ok(written)
    }
}
