//! Destinations for rendered output units.

use crate::error::RenderError;
use log::info;
use std::fmt::Debug;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Receives named output units (main documents, split parts, figures).
pub trait OutputSink: Debug {
    /// Stores `bytes` under `relative_path`, replacing any previous unit.
    fn write_unit(&mut self, relative_path: &str, bytes: &[u8]) -> Result<(), RenderError>;
}

/// Keeps every unit in memory, in write order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    units: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.units
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, b)| b.as_slice())
    }

    /// The unit as UTF-8 text, if present and valid.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn into_units(self) -> Vec<(String, Vec<u8>)> {
        self.units
    }
}

impl OutputSink for MemorySink {
    fn write_unit(&mut self, relative_path: &str, bytes: &[u8]) -> Result<(), RenderError> {
        validate(relative_path)?;
        match self.units.iter_mut().find(|(p, _)| p == relative_path) {
            Some((_, existing)) => *existing = bytes.to_vec(),
            None => self.units.push((relative_path.to_string(), bytes.to_vec())),
        }
        Ok(())
    }
}

/// Writes units as files below a base directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    base: PathBuf,
}

impl DirectorySink {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl OutputSink for DirectorySink {
    fn write_unit(&mut self, relative_path: &str, bytes: &[u8]) -> Result<(), RenderError> {
        validate(relative_path)?;
        let target = self.base.join(relative_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| RenderError::Sink {
                path: relative_path.to_string(),
                message: e.to_string(),
            })?;
        }
        fs::write(&target, bytes).map_err(|e| RenderError::Sink {
            path: relative_path.to_string(),
            message: e.to_string(),
        })?;
        info!("Wrote {} ({} bytes)", target.display(), bytes.len());
        Ok(())
    }
}

/// Unit paths must stay below the sink root.
fn validate(relative_path: &str) -> Result<(), RenderError> {
    let path = Path::new(relative_path);
    let escapes = relative_path.is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(RenderError::Sink {
            path: relative_path.to_string(),
            message: "unit paths must be relative and stay inside the output directory".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_overwrites_in_place() {
        let mut sink = MemorySink::new();
        sink.write_unit("a.txt", b"one").unwrap();
        sink.write_unit("b.txt", b"two").unwrap();
        sink.write_unit("a.txt", b"three").unwrap();
        assert_eq!(sink.paths().collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);
        assert_eq!(sink.text("a.txt"), Some("three"));
    }

    #[test]
    fn test_paths_cannot_escape() {
        let mut sink = MemorySink::new();
        assert!(sink.write_unit("../x", b"").is_err());
        assert!(sink.write_unit("/etc/x", b"").is_err());
        assert!(sink.write_unit("", b"").is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_directory_sink_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.write_unit("figures/plot-1.svg", b"<svg/>").unwrap();
        let written = std::fs::read_to_string(dir.path().join("figures/plot-1.svg")).unwrap();
        assert_eq!(written, "<svg/>");
    }
}
