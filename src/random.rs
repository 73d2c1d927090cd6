//! Seeded generator of random but well-formed documents.
//!
//! Every section draws from its own generator, seeded in declared order on
//! the calling thread, so the same seed yields the same structure no matter
//! how many workers build the sections.

use chrono::NaiveDate;
use folio_core::{
    CellDef, CitationMode, Comparison, ComplexTextOutput, Document, DocumentBody, DocumentError,
    DocumentFooter, DocumentOutput, FigureSize, Header, LabelKind, LabelRequest, List, Math,
    Section, SectionBody, SectionContainer, SequenceMode, TextOutput,
};
use folio_traits::{BibRecord, Canvas, InMemoryBibliography};
use folio_types::{Label, Point};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::sync::Arc;

const WORDS: &[&str] = &[
    "adaptive", "baseline", "cache", "latency", "throughput", "kernel", "sample", "variance",
    "model", "query", "index", "shard", "replica", "budget", "trace", "signal", "buffer",
    "protocol", "window", "estimate", "cluster", "vector", "policy", "workload", "median",
];

const NAMES: &[&str] = &[
    "Ada Lovelace", "Alan Turing", "Grace Hopper", "Edsger Dijkstra", "Barbara Liskov",
    "Donald Knuth", "Frances Allen", "John Backus",
];

const SNIPPETS: &[&str] = &[
    "fn main() {\n    println!(\"hello\");\n}",
    "let total: u64 = samples.iter().sum();",
    "for (i, x) in xs.iter().enumerate() {\n    acc[i % 4] += x;\n}",
];

/// Knobs of the generator. Every field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    pub seed: u64,
    /// Top-level body sections.
    pub sections: usize,
    pub appendices: usize,
    /// Deepest section nesting produced.
    pub max_depth: usize,
    /// Upper bound of blocks per section body.
    pub max_blocks: usize,
    /// Records placed in [`RandomDocument::bibliography`]; zero disables citations.
    pub citations: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            sections: 4,
            appendices: 1,
            max_depth: 3,
            max_blocks: 4,
            citations: 3,
        }
    }
}

/// Builds a random document into a [`Document`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDocument {
    config: GeneratorConfig,
}

fn words(rng: &mut StdRng, count: usize) -> String {
    (0..count)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn sentence(rng: &mut StdRng) -> String {
    let count = rng.random_range(4..10);
    let mut text = words(rng, count);
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    text
}

impl RandomDocument {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(GeneratorConfig {
            seed,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The records the generated citations point at, to install in the
    /// document environment.
    pub fn bibliography(&self) -> Arc<InMemoryBibliography> {
        let records = (0..self.config.citations)
            .map(|i| {
                let author = NAMES[i % NAMES.len()];
                BibRecord::new(format!("ref{}", i + 1), format!("On {} {}", WORDS[i % WORDS.len()], WORDS[(i * 7 + 3) % WORDS.len()]))
                    .with_author(author)
                    .with_year(1970 + (i as i32 * 7) % 50)
            })
            .collect();
        Arc::new(InMemoryBibliography::from_records(records))
    }

    /// Runs all three phases and closes the document.
    pub fn compose(&self, document: Document) -> Result<DocumentOutput, DocumentError> {
        let config = self.config;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let header_seed = rng.random::<u64>();
        let body_seed = rng.random::<u64>();
        let footer_seed = rng.random::<u64>();
        document.compose(
            |header| fill_header(header, header_seed),
            |body| fill_body(body, body_seed, config),
            |footer| fill_footer(footer, footer_seed, config),
        )
    }
}

fn fill_header(header: &mut Header, seed: u64) -> Result<(), DocumentError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut title = header.title()?;
    let count = rng.random_range(2..5);
    title.append(&sentence(&mut rng).split(' ').take(count).collect::<Vec<_>>().join(" "))?;
    title.close()?;
    for _ in 0..rng.random_range(1..4) {
        let mut author = header.author()?;
        author.append(NAMES.choose(&mut rng).copied().unwrap_or("Anonymous"))?;
        author.close()?;
    }
    let date = NaiveDate::from_ymd_opt(rng.random_range(2000..2030), rng.random_range(1..13), rng.random_range(1..29));
    if let Some(date) = date {
        header.date(date)?;
    }
    let mut summary = header.summary()?;
    summary.append(&sentence(&mut rng))?;
    summary.append(".")?;
    summary.close()
}

fn fill_body(body: &mut DocumentBody, seed: u64, config: GeneratorConfig) -> Result<(), DocumentError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let labels: Vec<Label> = (0..config.sections)
        .map(|_| body.allocate_label(LabelKind::Section))
        .collect::<Result<_, _>>()?;
    let targets: Arc<[Label]> = labels.clone().into();
    for label in labels {
        let seed = rng.random::<u64>();
        let targets = Arc::clone(&targets);
        body.section(label, move |section| fill_section(section, seed, targets, config))?;
    }
    Ok(())
}

fn fill_footer(footer: &mut DocumentFooter, seed: u64, config: GeneratorConfig) -> Result<(), DocumentError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let targets: Arc<[Label]> = Arc::from(Vec::new());
    for _ in 0..config.appendices {
        let seed = rng.random::<u64>();
        let targets = Arc::clone(&targets);
        footer.section(LabelRequest::Auto, move |section| fill_section(section, seed, targets, config))?;
    }
    Ok(())
}

fn fill_section(section: &mut Section, seed: u64, targets: Arc<[Label]>, config: GeneratorConfig) -> Result<(), DocumentError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut title = section.title()?;
    let count = rng.random_range(1..4);
    title.append(&words(&mut rng, count))?;
    title.close()?;

    let mut body = section.body()?;
    let blocks = rng.random_range(1..=config.max_blocks.max(1));
    for _ in 0..blocks {
        match rng.random_range(0..8) {
            0 => list(&mut body, &mut rng)?,
            1 => table(&mut body, &mut rng)?,
            2 => figure(&mut body, &mut rng)?,
            3 => figure_series(&mut body, &mut rng)?,
            4 => equation(&mut body, &mut rng)?,
            5 => code(&mut body, &mut rng)?,
            _ => paragraph(&mut body, &mut rng, &targets, config)?,
        }
    }
    if section.depth() < config.max_depth && rng.random_bool(0.5) {
        for _ in 0..rng.random_range(1..3) {
            let seed = rng.random::<u64>();
            let targets = Arc::clone(&targets);
            body.section(LabelRequest::Auto, move |child| fill_section(child, seed, targets, config))?;
        }
    }
    body.close()
}

fn paragraph(body: &mut SectionBody, rng: &mut StdRng, targets: &[Label], config: GeneratorConfig) -> Result<(), DocumentError> {
    body.append(&sentence(rng))?;
    match rng.random_range(0..4) {
        0 => {
            body.append(" ")?;
            let mut emphasis = body.emphasize()?;
            emphasis.append(&words(rng, 2))?;
            emphasis.close()?;
        }
        1 if !targets.is_empty() => {
            body.append(", see ")?;
            let target = targets[rng.random_range(0..targets.len())];
            body.reference(SequenceMode::Comma, &[target])?;
        }
        2 if config.citations > 0 => {
            body.append(" as reported by ")?;
            let record = rng.random_range(0..config.citations);
            body.cite(CitationMode::AuthorsAndId, SequenceMode::And, &[record])?;
        }
        _ => {
            body.append(" where ")?;
            let mut math = body.inline_math()?;
            let mut cmp = math.compare(Comparison::LessOrEqual)?;
            cmp.name("x")?;
            cmp.number(rng.random_range(1..100))?;
            cmp.close()?;
            math.close()?;
        }
    }
    body.append(".")?;
    body.paragraph_break()
}

fn items(list: &mut List, rng: &mut StdRng, nested: bool) -> Result<(), DocumentError> {
    for _ in 0..rng.random_range(2..5) {
        let mut item = list.item()?;
        item.append(&sentence(rng))?;
        if nested && rng.random_bool(0.3) {
            let mut inner = item.itemization()?;
            items(&mut inner, rng, false)?;
            inner.close()?;
        }
        item.close()?;
    }
    Ok(())
}

fn list(body: &mut SectionBody, rng: &mut StdRng) -> Result<(), DocumentError> {
    let mut list = if rng.random_bool(0.5) {
        body.enumeration()?
    } else {
        body.itemization()?
    };
    items(&mut list, rng, true)?;
    list.close()
}

fn table(body: &mut SectionBody, rng: &mut StdRng) -> Result<(), DocumentError> {
    let pure = rng.random_range(2..5);
    let mut columns = Vec::new();
    for i in 0..pure {
        if i > 0 && rng.random_bool(0.3) {
            columns.push(CellDef::Separator);
        }
        columns.push(*[CellDef::Left, CellDef::Center, CellDef::Right].choose(rng).unwrap_or(&CellDef::Left));
    }
    let mut table = body.table(LabelRequest::Auto, rng.random_bool(0.2), &columns)?;
    let mut caption = table.caption()?;
    caption.append(&sentence(rng))?;
    caption.close()?;

    let mut header = table.header()?;
    let mut row = header.row()?;
    for _ in 0..pure {
        let mut cell = row.cell()?;
        cell.append(&words(rng, 1))?;
        cell.close()?;
    }
    row.close()?;
    header.close()?;

    let mut rows = table.body()?;
    for r in 0..rng.random_range(1..5) {
        let mut row = rows.row()?;
        if r == 0 && rng.random_bool(0.25) {
            let mut cell = row.cell_spanning(pure, 1, CellDef::Center)?;
            cell.append(&words(rng, 2))?;
            cell.close()?;
        } else {
            for _ in 0..pure {
                let mut cell = row.cell()?;
                cell.append_display(rng.random_range(0..1000))?;
                cell.close()?;
            }
        }
        row.close()?;
    }
    rows.close()?;
    table.close()
}

fn draw(canvas: &mut dyn Canvas, rng: &mut StdRng) {
    let bounds = canvas.bounds();
    let points: Vec<Point> = (0..8)
        .map(|i| {
            Point::new(
                bounds.x + bounds.width * i as f32 / 7.0,
                bounds.y + bounds.height * rng.random_range(0.1..0.9),
            )
        })
        .collect();
    canvas.stroke_rect(bounds);
    canvas.polyline(&points);
    canvas.text(Point::new(bounds.x + 2.0, bounds.y + 4.0), "t");
}

fn figure(body: &mut SectionBody, rng: &mut StdRng) -> Result<(), DocumentError> {
    let size = *FigureSize::ALL.choose(rng).unwrap_or(&FigureSize::ColumnFull);
    let mut figure = body.figure(LabelRequest::Auto, size, "plot")?;
    let mut caption = figure.caption()?;
    caption.append(&sentence(rng))?;
    caption.close()?;
    let mut area = figure.body()?;
    let stroke = area.default_stroke();
    let color = area.default_color();
    let canvas = area.canvas()?;
    canvas.set_color(color);
    canvas.set_stroke(stroke);
    draw(canvas, rng);
    area.close()?;
    figure.close()
}

fn figure_series(body: &mut SectionBody, rng: &mut StdRng) -> Result<(), DocumentError> {
    let mut series = body.figure_series(LabelRequest::Auto, FigureSize::PageHalf, "series")?;
    let mut caption = series.caption()?;
    caption.append(&sentence(rng))?;
    caption.close()?;
    for _ in 0..2 {
        let mut figure = series.figure(LabelRequest::None, "panel")?;
        let mut sub = figure.caption()?;
        sub.append(&words(rng, 2))?;
        sub.close()?;
        let mut area = figure.body()?;
        draw(area.canvas()?, rng);
        area.close()?;
        figure.close()?;
    }
    series.close()
}

fn expression(math: &mut Math, rng: &mut StdRng) -> Result<(), DocumentError> {
    let mut sum = math.add()?;
    let mut fraction = sum.div()?;
    fraction.name("a")?;
    fraction.number(rng.random_range(2..10))?;
    fraction.close()?;
    let mut root = sum.sqrt()?;
    root.name("b")?;
    root.close()?;
    sum.close()
}

fn equation(body: &mut SectionBody, rng: &mut StdRng) -> Result<(), DocumentError> {
    let mut equation = body.equation(LabelRequest::Auto)?;
    let mut cmp = equation.compare(Comparison::Equal)?;
    cmp.name("y")?;
    expression(&mut cmp, rng)?;
    cmp.close()?;
    equation.close()
}

fn code(body: &mut SectionBody, rng: &mut StdRng) -> Result<(), DocumentError> {
    let mut code = body.code(LabelRequest::Auto)?;
    let mut caption = code.caption()?;
    caption.append(&words(rng, 3))?;
    caption.close()?;
    let mut text = code.body()?;
    text.append(SNIPPETS.choose(rng).copied().unwrap_or_default())?;
    text.close()?;
    code.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentBuilder, DocumentFormat};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn generate(seed: u64, workers: usize) -> Result<DocumentOutput, Box<dyn std::error::Error>> {
        let _ = env_logger::builder().is_test(true).try_init();
        let generator = RandomDocument::with_seed(seed);
        let doc = DocumentBuilder::new()
            .format(DocumentFormat::Xhtml)
            .workers(workers)
            .bibliography(generator.bibliography())
            .build()?;
        Ok(generator.compose(doc)?)
    }

    #[test]
    fn test_same_seed_same_document() -> TestResult {
        let a = generate(42, 1)?;
        let b = generate(42, 1)?;
        assert_eq!(a.tree.shape(), b.tree.shape());
        assert_eq!(a.tree.header, b.tree.header);
        assert_eq!(a.tree.all_sections().len(), b.tree.all_sections().len());
        Ok(())
    }

    #[test]
    fn test_worker_count_does_not_change_shape() -> TestResult {
        for seed in [1, 2, 3] {
            let sequential = generate(seed, 1)?;
            let parallel = generate(seed, 4)?;
            assert_eq!(sequential.tree.shape(), parallel.tree.shape());
        }
        Ok(())
    }

    #[test]
    fn test_generated_sections_respect_config() -> TestResult {
        let output = generate(9, 2)?;
        let config = GeneratorConfig::default();
        assert_eq!(output.tree.body.len(), config.sections);
        assert_eq!(output.tree.footer.len(), config.appendices);
        assert!(output.units.iter().any(|u| u == "report.html"));
        Ok(())
    }

    #[test]
    fn test_config_from_json() -> TestResult {
        let config: GeneratorConfig = serde_json::from_str(r#"{"seed":5,"sections":2}"#)?;
        assert_eq!(config.seed, 5);
        assert_eq!(config.sections, 2);
        assert_eq!(config.max_depth, GeneratorConfig::default().max_depth);
        Ok(())
    }
}
