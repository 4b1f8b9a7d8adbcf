//! Per-language line totals and the sorted report rows built from them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::counter::count_newlines;
use crate::language::{posix_path, LanguageTable, TOTAL_LABEL};

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: &'static str,
    pub lines: u64,
}

impl Row {
    pub fn new(label: &'static str, lines: u64) -> Self {
        Row { label, lines }
    }
}

/// Accumulated newline counts per language label.
#[derive(Debug, Default, Clone)]
pub struct Tally {
    totals: HashMap<&'static str, u64>,
}

impl Tally {
    pub fn record(&mut self, label: &'static str, lines: u64) {
        *self.totals.entry(label).or_insert(0) += lines;
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, label: &str) -> Option<u64> {
        self.totals.get(label).copied()
    }

    /// Rows sorted by line count descending (label ascending on ties),
    /// followed by a `TOTAL` row summing the rows kept. With `code_only`,
    /// only labels the table considers code are kept.
    pub fn rows(&self, table: &LanguageTable, code_only: bool) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .totals
            .iter()
            .filter(|(label, _)| !code_only || table.is_code(label))
            .map(|(label, lines)| Row::new(*label, *lines))
            .collect();
        rows.sort_by(|a, b| b.lines.cmp(&a.lines).then_with(|| a.label.cmp(b.label)));
        let grand_total = rows.iter().map(|row| row.lines).sum();
        rows.push(Row::new(TOTAL_LABEL, grand_total));
        rows
    }
}

/// Settings for turning a file listing into a [`Tally`].
pub struct Scan<'a> {
    table: &'a LanguageTable,
    excluded: Vec<PathBuf>,
    filespec: Option<Pattern>,
}

impl<'a> Scan<'a> {
    pub fn new(table: &'a LanguageTable) -> Self {
        Scan {
            table,
            excluded: Vec::new(),
            filespec: None,
        }
    }

    /// Skip these files when counting. Paths are compared after resolving
    /// them, so only existing files can be excluded.
    pub fn exclude<I>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.excluded
            .extend(paths.into_iter().filter_map(|p| fs::canonicalize(p).ok()));
        self
    }

    pub fn filespec(mut self, pattern: Option<Pattern>) -> Self {
        self.filespec = pattern;
        self
    }

    /// Classify and count every listed path under `root`.
    pub fn tally(&self, root: &Path, paths: &[PathBuf]) -> Tally {
        let mut tally = Tally::default();
        for relative in paths {
            if !self.filespec_matches(relative) {
                debug!("filespec skips {}", relative.display());
                continue;
            }
            let Some(label) = self.table.classify(relative) else {
                continue;
            };
            let full_path = root.join(relative);
            if self.is_excluded(&full_path) {
                debug!("excluding own source {}", full_path.display());
                continue;
            }
            if !full_path.is_file() {
                debug!("not a regular file: {}", full_path.display());
                continue;
            }
            match count_newlines(&full_path) {
                Ok(lines) => {
                    debug!("{}: {} lines ({})", relative.display(), lines, label);
                    tally.record(label, lines);
                }
                Err(err) => debug!("skipping {}: {}", full_path.display(), err),
            }
        }
        tally
    }

    fn is_excluded(&self, full_path: &Path) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        fs::canonicalize(full_path)
            .map(|resolved| self.excluded.contains(&resolved))
            .unwrap_or(false)
    }

    fn filespec_matches(&self, relative: &Path) -> bool {
        let Some(pattern) = &self.filespec else {
            return true;
        };
        let name_matches = relative
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| pattern.matches(name))
            .unwrap_or(false);
        name_matches || pattern.matches(&posix_path(relative))
    }
}
