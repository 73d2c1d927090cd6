use crate::escape::escape;
use crate::math::math_to_latex;
use folio_idf::{
    CodeNode, EquationNode, FigureNode, FigureSeriesNode, HeaderNode, Inline, SectionNode,
    TableNode, TableSectionNode,
};
use folio_render_core::svg::{render_svg, svg_unit_path};
use folio_render_core::utils::{
    SeqPiece, citation_text, interleave, reference_prefix, resolve_all,
};
use folio_render_core::{
    DocumentPart, ElementRenderer, OutputSink, RenderContext, RenderDriver, RenderError,
};
use folio_traits::BibRecord;
use folio_types::{CitationMode, FigureSize, FontFamily, Label, Style};
use itertools::Itertools;
use log::{debug, info};
use std::fmt::Write as _;

const PREAMBLE: &[&str] = &[
    "\\documentclass{article}",
    "\\usepackage[utf8]{inputenc}",
    "\\usepackage[T1]{fontenc}",
    "\\usepackage{amsmath}",
    "\\usepackage{graphicx}",
    "\\usepackage{svg}",
    "\\usepackage{subcaption}",
    "\\usepackage{multirow}",
    "\\usepackage{listings}",
    "\\usepackage{xcolor}",
];

/// Writes documents as LaTeX `article` sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct LatexDriver;

impl LatexDriver {
    pub fn new() -> Self {
        Self
    }
}

impl RenderDriver for LatexDriver {
    fn name(&self) -> &'static str {
        "latex"
    }

    fn main_extension(&self) -> &'static str {
        "tex"
    }

    fn start(&self, context: RenderContext) -> Box<dyn ElementRenderer> {
        Box::new(LatexRenderer {
            context,
            out: String::new(),
            figures: Vec::new(),
            cited: Vec::new(),
        })
    }
}

struct LatexRenderer {
    context: RenderContext,
    out: String,
    /// SVG units to write at finish.
    figures: Vec<(String, Vec<u8>)>,
    /// Cited records in first-citation order.
    cited: Vec<BibRecord>,
}

fn heading_command(depth: usize) -> &'static str {
    match depth {
        0 | 1 => "section",
        2 => "subsection",
        3 => "subsubsection",
        4 => "paragraph",
        _ => "subparagraph",
    }
}

fn fmt(err: std::fmt::Error) -> RenderError {
    RenderError::Markup(err.to_string())
}

impl LatexRenderer {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn label(&mut self, label: Option<Label>) -> Result<(), RenderError> {
        if let Some(label) = label {
            let anchor = self
                .context
                .labels
                .anchor(&label)
                .ok_or_else(|| RenderError::UnresolvedReference(label.to_string()))?
                .to_string();
            self.line(&format!("\\label{{{}}}", anchor));
        }
        Ok(())
    }

    fn inlines(&mut self, content: &[Inline]) -> Result<String, RenderError> {
        let mut out = String::new();
        for inline in content {
            self.inline_into(inline, &mut out)?;
        }
        Ok(out)
    }

    fn inline_into(&mut self, inline: &Inline, out: &mut String) -> Result<(), RenderError> {
        match inline {
            Inline::Text(t) => out.push_str(&escape(t)),
            Inline::LineBreak => out.push_str("\\\\\n"),
            Inline::Styled { style, children } => {
                let inner = self.inlines(children)?;
                match style {
                    Style::Font(font) => {
                        let mut text = inner;
                        if font.bold {
                            text = format!("\\textbf{{{}}}", text);
                        }
                        if font.italic {
                            text = format!("\\textit{{{}}}", text);
                        }
                        let family = match font.family {
                            FontFamily::Serif => "textrm",
                            FontFamily::SansSerif => "textsf",
                            FontFamily::Monospace => "texttt",
                        };
                        write!(out, "\\{}{{{}}}", family, text).map_err(fmt)?;
                    }
                    Style::Color(color) => {
                        let c = &color.color;
                        write!(out, "\\textcolor[RGB]{{{},{},{}}}{{{}}}", c.r, c.g, c.b, inner)
                            .map_err(fmt)?;
                    }
                    Style::Stroke(_) => out.push_str(&inner),
                }
            }
            Inline::Emphasis(children) => {
                let inner = self.inlines(children)?;
                write!(out, "\\emph{{{}}}", inner).map_err(fmt)?;
            }
            Inline::Code(children) => {
                let inner = self.inlines(children)?;
                write!(out, "\\texttt{{{}}}", inner).map_err(fmt)?;
            }
            Inline::Subscript(children) => {
                let inner = self.inlines(children)?;
                write!(out, "\\textsubscript{{{}}}", inner).map_err(fmt)?;
            }
            Inline::Superscript(children) => {
                let inner = self.inlines(children)?;
                write!(out, "\\textsuperscript{{{}}}", inner).map_err(fmt)?;
            }
            Inline::Braces(children) => {
                let inner = self.inlines(children)?;
                write!(out, "({})", inner).map_err(fmt)?;
            }
            Inline::Quotes(children) => {
                let inner = self.inlines(children)?;
                write!(out, "``{}''", inner).map_err(fmt)?;
            }
            Inline::Math(expr) => write!(out, "${}$", math_to_latex(expr)).map_err(fmt)?,
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
                if *mode == CitationMode::Id {
                    write!(out, "\\cite{{{}}}", records.iter().map(|r| &r.key).join(","))
                        .map_err(fmt)?;
                } else {
                    let texts: Vec<String> = records
                        .iter()
                        .map(|r| escape(&citation_text(*mode, r)))
                        .collect();
                    out.push_str(&sequence.join(&texts));
                }
            }
            Inline::Reference { sequence, labels } => {
                let resolved = resolve_all(&self.context.labels, labels)?;
                let prefix = reference_prefix(&resolved);
                if let Some(prefix) = &prefix {
                    write!(out, "{}~", prefix).map_err(fmt)?;
                }
                for piece in interleave(*sequence, &resolved) {
                    match piece {
                        SeqPiece::Text(t) => out.push_str(&escape(&t)),
                        SeqPiece::Item(r) if prefix.is_some() => {
                            write!(out, "\\ref{{{}}}", r.anchor).map_err(fmt)?
                        }
                        SeqPiece::Item(r) => write!(
                            out,
                            "{}~\\ref{{{}}}",
                            r.kind.display_name(),
                            r.anchor
                        )
                        .map_err(fmt)?,
                    }
                }
            }
        }
        Ok(())
    }

    fn caption(&mut self, caption: &[Inline], label: Option<Label>) -> Result<(), RenderError> {
        if !caption.is_empty() {
            let text = self.inlines(caption)?;
            self.line(&format!("\\caption{{{}}}", text));
        }
        self.label(label)
    }

    fn table_rows(&mut self, section: &TableSectionNode, columns: usize) -> Result<(), RenderError> {
        // Per start column: rows still covered by a row span from above, and its width.
        let mut covered = vec![(0usize, 1usize); columns];
        for row in &section.rows {
            let mut cells = Vec::new();
            let mut col = 0;
            let mut anchored = row.cells.iter().peekable();
            while col < columns {
                if let Some(cell) = anchored.next_if(|c| c.column == col) {
                    let mut text = self.inlines(&cell.content)?;
                    if cell.row_span > 1 {
                        text = format!("\\multirow{{{}}}{{*}}{{{}}}", cell.row_span, text);
                        covered[col] = (cell.row_span - 1, cell.col_span);
                    }
                    if cell.col_span > 1 {
                        text = format!(
                            "\\multicolumn{{{}}}{{{}}}{{{}}}",
                            cell.col_span,
                            cell.align.latex_spec(),
                            text
                        );
                    }
                    cells.push(text);
                    col += cell.col_span.max(1);
                } else if covered[col].0 > 0 {
                    let (rows, span) = covered[col];
                    covered[col].0 = rows - 1;
                    cells.push(if span > 1 {
                        format!("\\multicolumn{{{}}}{{c}}{{}}", span)
                    } else {
                        String::new()
                    });
                    col += span.max(1);
                } else {
                    cells.push(String::new());
                    col += 1;
                }
            }
            self.line(&format!("{} \\\\", cells.join(" & ")));
        }
        Ok(())
    }

    fn include(&mut self, figure: &FigureNode) -> Result<(), RenderError> {
        let bytes = render_svg(figure)?;
        self.figures.push((svg_unit_path(figure), bytes));
        Ok(())
    }

    fn bibliography(&mut self) {
        if self.cited.is_empty() {
            return;
        }
        let width = self.cited.len().to_string();
        self.line(&format!("\\begin{{thebibliography}}{{{}}}", width));
        let items: Vec<String> = self
            .cited
            .iter()
            .map(|r| {
                let mut item = format!("\\bibitem{{{}}} ", r.key);
                if !r.authors.is_empty() {
                    item.push_str(&escape(&r.authors.join(", ")));
                    item.push_str(". ");
                }
                item.push_str(&format!("\\emph{{{}}}", escape(&r.title)));
                if let Some(venue) = &r.venue {
                    item.push_str(&format!(". {}", escape(venue)));
                }
                if let Some(year) = r.year {
                    item.push_str(&format!(", {}", year));
                }
                item.push('.');
                item
            })
            .collect();
        for item in items {
            self.line(&item);
        }
        self.line("\\end{thebibliography}");
    }
}

fn width(size: FigureSize) -> String {
    format!("{:.2}\\linewidth", size.width_fraction())
}

impl ElementRenderer for LatexRenderer {
    fn begin_document(&mut self, header: &HeaderNode) -> Result<(), RenderError> {
        for line in PREAMBLE {
            self.line(line);
        }
        let title = self.inlines(&header.title)?;
        self.line(&format!("\\title{{{}}}", title));
        let mut authors = Vec::new();
        for author in &header.authors {
            authors.push(self.inlines(author)?);
        }
        self.line(&format!("\\author{{{}}}", authors.join(" \\and ")));
        match header.date {
            Some(date) => self.line(&format!("\\date{{{}}}", date)),
            None => self.line("\\date{}"),
        }
        self.line("\\begin{document}");
        if !header.is_empty() {
            self.line("\\maketitle");
        }
        if !header.summary.is_empty() {
            let summary = self.inlines(&header.summary)?;
            self.line("\\begin{abstract}");
            self.line(&summary);
            self.line("\\end{abstract}");
        }
        Ok(())
    }

    fn begin_part(&mut self, part: DocumentPart) -> Result<(), RenderError> {
        if part == DocumentPart::Appendix {
            self.line("\\appendix");
        }
        Ok(())
    }

    fn end_part(&mut self, _part: DocumentPart) -> Result<(), RenderError> {
        Ok(())
    }

    fn begin_section(&mut self, section: &SectionNode, depth: usize) -> Result<(), RenderError> {
        let title = self.inlines(&section.title)?;
        self.line("");
        self.line(&format!("\\{}{{{}}}", heading_command(depth), title));
        self.label(section.label)
    }

    fn end_section(&mut self, _depth: usize) -> Result<(), RenderError> {
        Ok(())
    }

    fn inline(&mut self, content: &[Inline]) -> Result<(), RenderError> {
        let text = self.inlines(content)?;
        self.line(&text);
        self.line("");
        Ok(())
    }

    fn begin_list(&mut self, ordered: bool) -> Result<(), RenderError> {
        self.line(if ordered {
            "\\begin{enumerate}"
        } else {
            "\\begin{itemize}"
        });
        Ok(())
    }

    fn begin_item(&mut self) -> Result<(), RenderError> {
        self.out.push_str("\\item ");
        Ok(())
    }

    fn end_item(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn end_list(&mut self, ordered: bool) -> Result<(), RenderError> {
        self.line(if ordered {
            "\\end{enumerate}"
        } else {
            "\\end{itemize}"
        });
        Ok(())
    }

    fn table(&mut self, table: &TableNode) -> Result<(), RenderError> {
        let env = if table.spans_all_columns { "table*" } else { "table" };
        self.line(&format!("\\begin{{{}}}[htbp]", env));
        self.line("\\centering");
        self.caption(&table.caption, table.label)?;
        let spec: String = table.columns.iter().map(|c| c.latex_spec()).collect();
        self.line(&format!("\\begin{{tabular}}{{{}}}", spec));
        self.line("\\hline");
        let columns = table.pure_columns();
        for part in table.parts() {
            debug!("LaTeX table {} with {} row(s)", part.part.name(), part.rows.len());
            self.table_rows(part, columns)?;
            self.line("\\hline");
        }
        self.line("\\end{tabular}");
        self.line(&format!("\\end{{{}}}", env));
        Ok(())
    }

    fn figure(&mut self, figure: &FigureNode) -> Result<(), RenderError> {
        let env = if figure.size.spans_page() { "figure*" } else { "figure" };
        self.line(&format!("\\begin{{{}}}[htbp]", env));
        self.line("\\centering");
        self.line(&format!(
            "\\includesvg[width={}]{{{}}}",
            width(figure.size),
            figure.path
        ));
        self.caption(&figure.caption, figure.label)?;
        self.line(&format!("\\end{{{}}}", env));
        self.include(figure)
    }

    fn figure_series(&mut self, series: &FigureSeriesNode) -> Result<(), RenderError> {
        let env = if series.size.spans_page() { "figure*" } else { "figure" };
        let per_row = series.size.per_row().max(1);
        let share = format!("{:.2}\\linewidth", 0.95 / per_row as f32);
        self.line(&format!("\\begin{{{}}}[htbp]", env));
        self.line("\\centering");
        for (i, figure) in series.figures.iter().enumerate() {
            if i > 0 {
                self.line(if i % per_row == 0 { "\\\\" } else { "\\hfill" });
            }
            self.line(&format!("\\begin{{subfigure}}{{{}}}", share));
            self.line("\\centering");
            self.line(&format!(
                "\\includesvg[width=\\linewidth]{{{}}}",
                figure.path
            ));
            self.caption(&figure.caption, figure.label)?;
            self.line("\\end{subfigure}");
            self.include(figure)?;
        }
        self.caption(&series.caption, series.label)?;
        self.line(&format!("\\end{{{}}}", env));
        Ok(())
    }

    fn equation(&mut self, equation: &EquationNode) -> Result<(), RenderError> {
        self.line("\\begin{equation}");
        self.label(equation.label)?;
        self.line(&math_to_latex(&equation.expr));
        self.line("\\end{equation}");
        Ok(())
    }

    fn code(&mut self, code: &CodeNode) -> Result<(), RenderError> {
        let mut options = Vec::new();
        if !code.caption.is_empty() {
            options.push(format!("caption={{{}}}", self.inlines(&code.caption)?));
        }
        if let Some(label) = code.label {
            let anchor = self
                .context
                .labels
                .anchor(&label)
                .ok_or_else(|| RenderError::UnresolvedReference(label.to_string()))?;
            options.push(format!("label={{{}}}", anchor));
        }
        if options.is_empty() {
            self.line("\\begin{lstlisting}");
        } else {
            self.line(&format!("\\begin{{lstlisting}}[{}]", options.join(",")));
        }
        self.line(&code.body);
        self.line("\\end{lstlisting}");
        Ok(())
    }

    fn finish(mut self: Box<Self>, sink: &mut dyn OutputSink) -> Result<Vec<String>, RenderError> {
        self.bibliography();
        self.line("\\end{document}");
        let main = format!("{}.tex", self.context.main_name);
        sink.write_unit(&main, self.out.as_bytes())?;
        let mut units = vec![main];
        for (path, bytes) in std::mem::take(&mut self.figures) {
            sink.write_unit(&path, &bytes)?;
            units.push(path);
        }
        info!("LaTeX driver wrote {} unit(s)", units.len());
        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_idf::{
        BodyNode, Drawing, ResolvedLabel, ResolvedLabels, TableCellNode,
        TableRowNode, TablePart,
    };
    use folio_render_core::MemorySink;
    use folio_types::{CellDef, DocumentId, LabelKind, Rect, SequenceMode};
    use std::sync::Arc;

    fn text(t: &str) -> Vec<Inline> {
        vec![Inline::Text(t.into())]
    }

    fn cell(column: usize, col_span: usize, row_span: usize, t: &str) -> TableCellNode {
        TableCellNode {
            column,
            col_span,
            row_span,
            align: CellDef::Center,
            content: text(t),
            padding: false,
        }
    }

    fn render(
        labels: ResolvedLabels,
        build: impl FnOnce(&mut dyn ElementRenderer) -> Result<(), RenderError>,
    ) -> Result<MemorySink, RenderError> {
        let _ = env_logger::builder().is_test(true).try_init();
        let context = RenderContext::new("paper", Arc::new(labels));
        let mut renderer = LatexDriver::new().start(context);
        renderer.begin_document(&HeaderNode {
            title: text("On Things"),
            ..Default::default()
        })?;
        renderer.begin_part(DocumentPart::Body)?;
        build(renderer.as_mut())?;
        renderer.end_part(DocumentPart::Body)?;
        let mut sink = MemorySink::new();
        renderer.finish(&mut sink)?;
        Ok(sink)
    }

    #[test]
    fn test_sections_by_depth_with_labels() -> Result<(), RenderError> {
        let doc = DocumentId::next();
        let label = Label::new(doc, 0, LabelKind::Section);
        let mut labels = ResolvedLabels::new();
        labels.insert(label, ResolvedLabel::new(LabelKind::Section, "1.1"));
        let sink = render(labels, |r| {
            let outer = SectionNode {
                title: text("Intro & Scope"),
                ..Default::default()
            };
            r.begin_section(&outer, 1)?;
            let inner = SectionNode {
                label: Some(label),
                title: text("Details"),
                body: vec![BodyNode::Paragraph(text("x"))],
            };
            r.begin_section(&inner, 2)?;
            r.inline(&[
                Inline::Text("see ".into()),
                Inline::Reference {
                    sequence: SequenceMode::Comma,
                    labels: vec![label],
                },
            ])?;
            r.end_section(2)?;
            r.end_section(1)
        })?;
        let tex = sink.text("paper.tex").unwrap_or_default();
        assert!(tex.starts_with("\\documentclass{article}"));
        assert!(tex.contains("\\title{On Things}"));
        assert!(tex.contains("\\section{Intro \\& Scope}"));
        assert!(tex.contains("\\subsection{Details}\n\\label{sec-1-1}"));
        assert!(tex.contains("see Section~\\ref{sec-1-1}"));
        assert!(tex.trim_end().ends_with("\\end{document}"));
        Ok(())
    }

    #[test]
    fn test_table_spans() -> Result<(), RenderError> {
        let sink = render(ResolvedLabels::new(), |r| {
            r.table(&TableNode {
                label: None,
                spans_all_columns: false,
                columns: vec![CellDef::Left, CellDef::Separator, CellDef::Center, CellDef::Right],
                caption: Vec::new(),
                header: None,
                body: Some(TableSectionNode {
                    part: TablePart::Body,
                    rows: vec![
                        TableRowNode {
                            cells: vec![cell(0, 2, 2, "big"), cell(2, 1, 1, "a")],
                        },
                        TableRowNode {
                            cells: vec![cell(2, 1, 1, "b")],
                        },
                    ],
                }),
                footer: None,
            })
        })?;
        let tex = sink.text("paper.tex").unwrap_or_default();
        assert!(tex.contains("\\begin{tabular}{l|cr}"));
        assert!(tex.contains("\\multicolumn{2}{c}{\\multirow{2}{*}{big}} & a \\\\"));
        assert!(tex.contains("\\multicolumn{2}{c}{} & b \\\\"));
        Ok(())
    }

    #[test]
    fn test_figure_writes_svg_unit() -> Result<(), RenderError> {
        let doc = DocumentId::next();
        let label = Label::new(doc, 0, LabelKind::Figure);
        let mut labels = ResolvedLabels::new();
        labels.insert(label, ResolvedLabel::new(LabelKind::Figure, "1"));
        let sink = render(labels, |r| {
            r.figure(&FigureNode {
                label: Some(label),
                size: FigureSize::ColumnHalf,
                path: "figures/plot-1".into(),
                caption: text("A plot"),
                drawing: Drawing {
                    bounds: Rect::new(0.0, 0.0, 41.0, 41.0),
                    ops: Vec::new(),
                },
            })
        })?;
        let tex = sink.text("paper.tex").unwrap_or_default();
        assert!(tex.contains("\\includesvg[width=0.50\\linewidth]{figures/plot-1}"));
        assert!(tex.contains("\\caption{A plot}\n\\label{fig-1}"));
        assert!(sink.get("figures/plot-1.svg").is_some());
        assert_eq!(sink.paths().next(), Some("paper.tex"));
        Ok(())
    }

    #[test]
    fn test_citation_adds_bibliography() -> Result<(), RenderError> {
        let record = BibRecord::new("knuth84", "Literate Programming").with_year(1984);
        let sink = render(ResolvedLabels::new(), |r| {
            r.inline(&[Inline::Citation {
                mode: CitationMode::Id,
                sequence: SequenceMode::Comma,
                records: vec![record.clone()],
            }])
        })?;
        let tex = sink.text("paper.tex").unwrap_or_default();
        assert!(tex.contains("\\cite{knuth84}"));
        assert!(tex.contains("\\bibitem{knuth84} \\emph{Literate Programming}, 1984."));
        Ok(())
    }

    #[test]
    fn test_unresolved_label_fails() {
        let doc = DocumentId::next();
        let label = Label::new(doc, 3, LabelKind::Equation);
        let result = render(ResolvedLabels::new(), |r| {
            r.equation(&EquationNode {
                label: Some(label),
                expr: folio_idf::MathNode::Number("1".into()),
            })
        });
        assert!(matches!(result, Err(RenderError::UnresolvedReference(_))));
    }
}
