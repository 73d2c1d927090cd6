//! Test support: a driver that writes the render calls it receives as an
//! indented outline, one line per call.

use crate::document::{Document, DocumentEnvironment};
use folio_executor::ExecutorImpl;
use folio_idf::{
    CodeNode, EquationNode, FigureNode, FigureSeriesNode, HeaderNode, Inline, SectionNode,
    TableNode, plain_text,
};
use folio_render_core::{
    DocumentPart, ElementRenderer, OutputSink, RenderContext, RenderDriver, RenderError,
};
use std::sync::Arc;

#[derive(Debug, Default)]
pub(crate) struct OutlineDriver;

impl RenderDriver for OutlineDriver {
    fn name(&self) -> &'static str {
        "outline"
    }

    fn main_extension(&self) -> &'static str {
        "txt"
    }

    fn start(&self, context: RenderContext) -> Box<dyn ElementRenderer> {
        Box::new(OutlineRenderer {
            context,
            lines: Vec::new(),
            indent: 0,
        })
    }
}

struct OutlineRenderer {
    context: RenderContext,
    lines: Vec<String>,
    indent: usize,
}

impl OutlineRenderer {
    fn line(&mut self, text: String) -> Result<(), RenderError> {
        self.lines.push(format!("{}{}", "  ".repeat(self.indent), text));
        Ok(())
    }

    fn number(&self, label: Option<folio_types::Label>) -> String {
        label
            .and_then(|l| self.context.labels.get(&l))
            .map(|r| format!(" [{}]", r.number))
            .unwrap_or_default()
    }
}

impl ElementRenderer for OutlineRenderer {
    fn begin_document(&mut self, header: &HeaderNode) -> Result<(), RenderError> {
        self.line(format!("document: {}", plain_text(&header.title)))
    }

    fn begin_part(&mut self, part: DocumentPart) -> Result<(), RenderError> {
        self.line(format!("part: {:?}", part))
    }

    fn end_part(&mut self, _part: DocumentPart) -> Result<(), RenderError> {
        Ok(())
    }

    fn begin_section(&mut self, section: &SectionNode, depth: usize) -> Result<(), RenderError> {
        let number = self.number(section.label);
        self.line(format!("section {}{}: {}", depth, number, section.title_text()))?;
        self.indent += 1;
        Ok(())
    }

    fn end_section(&mut self, _depth: usize) -> Result<(), RenderError> {
        self.indent -= 1;
        Ok(())
    }

    fn inline(&mut self, content: &[Inline]) -> Result<(), RenderError> {
        self.line(format!("text: {}", plain_text(content)))
    }

    fn begin_list(&mut self, ordered: bool) -> Result<(), RenderError> {
        self.line(format!("list ordered={}", ordered))?;
        self.indent += 1;
        Ok(())
    }

    fn begin_item(&mut self) -> Result<(), RenderError> {
        self.line("item".to_string())
    }

    fn end_item(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn end_list(&mut self, _ordered: bool) -> Result<(), RenderError> {
        self.indent -= 1;
        Ok(())
    }

    fn table(&mut self, table: &TableNode) -> Result<(), RenderError> {
        let number = self.number(table.label);
        self.line(format!("table{}", number))
    }

    fn figure(&mut self, figure: &FigureNode) -> Result<(), RenderError> {
        let number = self.number(figure.label);
        self.line(format!("figure{} {}", number, figure.path))
    }

    fn figure_series(&mut self, series: &FigureSeriesNode) -> Result<(), RenderError> {
        let number = self.number(series.label);
        self.line(format!("series{} of {}", number, series.figures.len()))
    }

    fn equation(&mut self, equation: &EquationNode) -> Result<(), RenderError> {
        let number = self.number(equation.label);
        self.line(format!("equation{}", number))
    }

    fn code(&mut self, code: &CodeNode) -> Result<(), RenderError> {
        let number = self.number(code.label);
        self.line(format!("code{}: {}", number, code.body))
    }

    fn finish(self: Box<Self>, sink: &mut dyn OutputSink) -> Result<Vec<String>, RenderError> {
        let path = format!("{}.txt", self.context.main_name);
        sink.write_unit(&path, self.lines.join("\n").as_bytes())?;
        Ok(vec![path])
    }
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn environment(workers: usize) -> DocumentEnvironment {
    init_logger();
    let mut env = DocumentEnvironment::new(Arc::new(OutlineDriver));
    env.executor = ExecutorImpl::for_workers(workers).expect("executor");
    env
}

pub(crate) fn document() -> Document {
    Document::new(environment(1)).expect("document")
}
