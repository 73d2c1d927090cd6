//! Text helpers shared by the concrete drivers.

use crate::error::RenderError;
use folio_idf::{ResolvedLabel, ResolvedLabels};
use folio_traits::BibRecord;
use folio_types::{CitationMode, Label, SequenceMode};

const MARK: char = '\u{0}';

/// One piece of a joined sequence: an item or the connecting text between items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeqPiece<'a, T> {
    Item(&'a T),
    Text(String),
}

/// Splits the joined form of `items` into items and connecting text, so a
/// driver can render each item as markup (a link, a `\ref`) while keeping
/// the wording of `mode`.
pub fn interleave<T>(mode: SequenceMode, items: &[T]) -> Vec<SeqPiece<'_, T>> {
    let markers: Vec<String> = (0..items.len())
        .map(|i| format!("{MARK}{i}{MARK}"))
        .collect();
    let joined = mode.join(&markers);
    let mut pieces = Vec::new();
    for (n, chunk) in joined.split(MARK).enumerate() {
        if n % 2 == 1 {
            if let Some(item) = chunk.parse::<usize>().ok().and_then(|i| items.get(i)) {
                pieces.push(SeqPiece::Item(item));
            }
        } else if !chunk.is_empty() {
            pieces.push(SeqPiece::Text(chunk.to_string()));
        }
    }
    pieces
}

/// Lower-case letter index: `0 -> a`, `25 -> z`, `26 -> aa`.
///
/// Sub-figures use it as is, appendices upper-cased.
pub fn alpha_index(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Looks up every label of a reference.
pub fn resolve_all<'a>(
    labels: &'a ResolvedLabels,
    refs: &[Label],
) -> Result<Vec<&'a ResolvedLabel>, RenderError> {
    refs.iter()
        .map(|l| {
            labels
                .get(l)
                .ok_or_else(|| RenderError::UnresolvedReference(l.to_string()))
        })
        .collect()
}

/// The word placed before a reference, e.g. `Figure` or `Tables`.
///
/// Returns `None` when the referenced elements are of mixed kinds; each
/// item then carries its own word.
pub fn reference_prefix(resolved: &[&ResolvedLabel]) -> Option<String> {
    let first = resolved.first()?.kind.display_name();
    if resolved.iter().any(|r| r.kind.display_name() != first) {
        return None;
    }
    Some(if resolved.len() > 1 {
        format!("{}s", first)
    } else {
        first.to_string()
    })
}

/// Text of a single cited record in the given mode.
pub fn citation_text(mode: CitationMode, record: &BibRecord) -> String {
    let authors = || {
        if record.authors.is_empty() {
            record.key.clone()
        } else {
            SequenceMode::EtAl.join(&record.authors)
        }
    };
    match mode {
        CitationMode::Id => format!("[{}]", record.key),
        CitationMode::Authors => authors(),
        CitationMode::AuthorsAndId => format!("{} [{}]", authors(), record.key),
        CitationMode::Title => format!("\u{201c}{}\u{201d}", record.title),
    }
}
