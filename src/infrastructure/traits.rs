//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Item for FZF-style selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in selector
    pub display: String,
    /// Actual value (e.g., a filter leaf path)
    pub value: String,
}

/// Interactive FZF-style multi-selector abstraction.
pub trait MultiSelector: Send + Sync {
    /// Present items to user and return the chosen ones.
    /// Returns None if user cancels (Esc/Ctrl-C).
    fn select_many(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<Vec<SelectionItem>>, String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Skim entry that remembers its position in the item list.
///
/// Entries are matched back by position, so equal display strings stay distinct.
struct IndexedItem {
    index: usize,
    display: String,
}

impl skim::SkimItem for IndexedItem {
    fn text(&self) -> std::borrow::Cow<str> {
        std::borrow::Cow::Borrowed(&self.display)
    }

    fn output(&self) -> std::borrow::Cow<str> {
        std::borrow::Cow::Owned(self.index.to_string())
    }
}

/// Real selector implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

impl MultiSelector for SkimSelector {
    fn select_many(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<Vec<SelectionItem>>, String> {
        use skim::prelude::*;

        if items.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(true)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let (tx, rx): (SkimItemSender, SkimItemReceiver) = unbounded();
        for (index, item) in items.iter().enumerate() {
            tx.send(std::sync::Arc::new(IndexedItem {
                index,
                display: item.display.clone(),
            }))
            .map_err(|e| format!("failed to queue selector item: {e}"))?;
        }
        drop(tx);

        match Skim::run_with(&options, Some(rx)) {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => Ok(Some(chosen_items(
                items,
                out.selected_items.iter().map(|selected| selected.output()),
            ))),
            None => Ok(None),
        }
    }
}

/// Map selector output lines (item positions) back to the offered items.
fn chosen_items<S: AsRef<str>>(
    items: &[SelectionItem],
    outputs: impl Iterator<Item = S>,
) -> Vec<SelectionItem> {
    outputs
        .filter_map(|output| output.as_ref().parse::<usize>().ok())
        .filter_map(|index| items.get(index).cloned())
        .collect()
}
