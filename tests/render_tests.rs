mod common;

use chrono::NaiveDate;
use common::{TestResult, init_logger, latex_document};
use folio::{
    BibRecord, CitationMode, ComplexTextOutput, DocumentBuilder, DocumentConfig, DocumentFormat,
    DocumentOutput, FigureSize, InMemoryBibliography, LabelKind, LabelRequest, RandomDocument,
    SectionContainer, SequenceMode, TextOutput,
};
use std::sync::Arc;

fn report(format: DocumentFormat, config: DocumentConfig) -> Result<DocumentOutput, Box<dyn std::error::Error>> {
    init_logger();
    let bibliography = InMemoryBibliography::from_records(vec![
        BibRecord::new("knuth84", "Literate Programming")
            .with_author("Donald Knuth")
            .with_year(1984),
    ]);
    let doc = DocumentBuilder::new()
        .format(format)
        .workers(2)
        .config(config)
        .bibliography(Arc::new(bibliography))
        .build()?;
    let target = doc.allocate_label(LabelKind::Section)?;
    let output = doc.compose(
        |header| {
            let mut title = header.title()?;
            title.append("Field Notes")?;
            title.close()?;
            let mut author = header.author()?;
            author.append("A. Writer")?;
            author.close()?;
            header.date(NaiveDate::from_ymd_opt(2024, 3, 1).ok_or_else(|| folio::DocumentError::structural("date"))?)
        },
        move |body| {
            body.section(LabelRequest::None, move |section| {
                let mut title = section.title()?;
                title.append("Overview")?;
                title.close()?;
                let mut text = section.body()?;
                text.append("Details follow in ")?;
                text.reference(SequenceMode::Comma, &[target])?;
                text.append(", building on ")?;
                text.cite(CitationMode::Id, SequenceMode::Comma, &[0])?;
                text.append(".")?;
                text.close()
            })?;
            for name in ["Method", "Results"] {
                body.section(LabelRequest::None, move |section| {
                    let mut title = section.title()?;
                    title.append(name)?;
                    title.close()?;
                    let mut text = section.body()?;
                    for _ in 0..20 {
                        text.append("Filler text to grow the unit past its budget. ")?;
                    }
                    text.close()
                })?;
            }
            body.section(target, |section| {
                let mut title = section.title()?;
                title.append("Details")?;
                title.close()?;
                let mut content = section.body()?;
                let mut figure = content.figure(LabelRequest::Auto, FigureSize::ColumnHalf, "sketch")?;
                let mut caption = figure.caption()?;
                caption.append("A sketch")?;
                caption.close()?;
                figure.close()?;
                content.close()
            })
        },
        |footer| {
            footer.section(LabelRequest::Auto, |section| {
                let mut title = section.title()?;
                title.append("Raw data")?;
                title.close()?;
                let mut text = section.body()?;
                let mut em = text.emphasize()?;
                em.append("none")?;
                em.close()?;
                text.close()
            })
        },
    )?;
    Ok(output)
}

#[test]
fn test_latex_report() -> TestResult {
    let output = report(DocumentFormat::Latex, DocumentConfig::default())?;
    assert_eq!(output.main_unit(), Some("report.tex"));
    assert_eq!(output.units.len(), 2);
    let tex = output.unit_text("report.tex").ok_or("missing main unit")?;
    assert!(tex.starts_with("\\documentclass{article}"));
    assert!(tex.contains("\\title{Field Notes}"));
    assert!(tex.contains("\\section{Overview}"));
    assert!(tex.contains("Details follow in Section~\\ref{sec-4}"));
    assert!(tex.contains("\\cite{knuth84}"));
    assert!(tex.contains("\\appendix"));
    assert!(tex.contains("\\end{document}"));
    assert!(output.unit_text("figures/sketch-1.svg").is_some());
    Ok(())
}

#[test]
fn test_xhtml_report_splits_into_linked_units() -> TestResult {
    let config = DocumentConfig {
        html_split_budget: 512,
        ..Default::default()
    };
    let output = report(DocumentFormat::Xhtml, config)?;
    let pages: Vec<&String> = output.units.iter().filter(|u| u.ends_with(".html")).collect();
    assert!(pages.len() > 1, "expected a split, got {:?}", output.units);
    assert_eq!(pages[0], "report.html");
    assert_eq!(pages[1], "report_2.html");

    let main = output.unit_text("report.html").ok_or("missing main unit")?;
    assert!(main.contains("<nav>"));
    assert!(main.contains("<h1 class=\"title\">Field Notes</h1>"));
    // Details lives in a later unit, so the link carries its file name.
    let details_unit = pages
        .iter()
        .find(|p| output.unit_text(p).is_some_and(|t| t.contains("id=\"sec-4\"")))
        .ok_or("no unit holds the target section")?;
    assert_ne!(details_unit.as_str(), "report.html");
    assert!(main.contains(&format!("href=\"{}#sec-4\"", details_unit)));
    // The reference list closes the last unit.
    let last = pages.last().ok_or("no pages")?;
    assert!(main.contains(&format!("href=\"{}#bib-knuth84\"", last)));
    Ok(())
}

#[test]
fn test_xhtml_keeps_text_that_looks_like_markup_internals() -> TestResult {
    let mut doc = common::xhtml_document(1)?;
    let mut body = doc.body()?;
    body.section(LabelRequest::Auto, |section| {
        let mut text = section.body()?;
        text.append("contact me @@UNIT: today, or see #sec-1@@")?;
        text.close()
    })?;
    body.close()?;
    let output = doc.close()?;
    let main = output.unit_text("report.html").ok_or("missing main unit")?;
    assert!(main.contains("contact me @@UNIT: today, or see #sec-1@@"));
    Ok(())
}

#[test]
fn test_xhtml_without_budget_is_one_unit() -> TestResult {
    let output = report(DocumentFormat::Xhtml, DocumentConfig::default())?;
    let pages = output.units.iter().filter(|u| u.ends_with(".html")).count();
    assert_eq!(pages, 1);
    let main = output.unit_text("report.html").ok_or("missing main unit")?;
    assert!(main.contains("<a href=\"#sec-4\">4</a>"));
    assert!(main.contains("<li id=\"bib-knuth84\">"));
    assert!(!main.contains("<nav>"));
    Ok(())
}

#[test]
fn test_units_written_to_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = DocumentConfig {
        main_name: "paper".to_string(),
        base_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let output = report(DocumentFormat::Latex, config)?;
    assert!(output.memory.is_none());
    assert_eq!(output.main_unit(), Some("paper.tex"));
    let tex = std::fs::read_to_string(dir.path().join("paper.tex"))?;
    assert!(tex.contains("\\section{Details}"));
    assert!(dir.path().join("figures").join("sketch-1.svg").exists());
    Ok(())
}

#[test]
fn test_random_report_renders_in_both_formats() -> TestResult {
    init_logger();
    for format in [DocumentFormat::Latex, DocumentFormat::Xhtml] {
        let generator = RandomDocument::with_seed(11);
        let doc = DocumentBuilder::new()
            .format(format)
            .workers(3)
            .bibliography(generator.bibliography())
            .build()?;
        let output = generator.compose(doc)?;
        assert!(!output.units.is_empty());
        let main = output.main_unit().ok_or("no units")?;
        assert!(output.unit_text(main).is_some_and(|t| !t.is_empty()));
    }
    Ok(())
}

#[test]
fn test_empty_document_renders() -> TestResult {
    let doc = latex_document(1)?;
    let output = doc.close()?;
    assert!(output.tree.body.is_empty());
    assert_eq!(output.units, vec!["report.tex".to_string()]);
    Ok(())
}
