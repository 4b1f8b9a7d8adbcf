//! Language lookup tables and the path classifier.
//!
//! Classification never looks at file contents: a root-relative path is
//! matched first against exact filename overrides (case-sensitive), then by
//! its lower-cased extension.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Component, Path};

/// Label of the synthetic grand-total row.
pub const TOTAL_LABEL: &str = "TOTAL";

const EXTENSIONS: &[(&str, &str)] = &[
    (".py", "Python"),
    (".pyx", "Cython"),
    (".pxd", "Cython"),
    (".pxi", "Cython"),
    (".c", "C"),
    (".h", "C++"),
    (".hpp", "C++"),
    (".hh", "C++"),
    (".hxx", "C++"),
    (".cpp", "C++"),
    (".cc", "C++"),
    (".cxx", "C++"),
    (".f90", "Fortran"),
    (".f95", "Fortran"),
    (".f03", "Fortran"),
    (".f", "Fortran"),
    (".rs", "Rust"),
    (".sh", "Shell"),
    (".bash", "Shell"),
    (".ps1", "PowerShell"),
    (".rst", "reStructuredText"),
    (".md", "Markdown"),
    (".toml", "TOML"),
    (".yaml", "YAML"),
    (".yml", "YAML"),
    (".json", "JSON"),
    (".ini", "Config"),
    (".cfg", "Config"),
    (".conf", "Config"),
    (".cmake", "CMake"),
    (".mk", "Makefile"),
    (".ipynb", "Jupyter Notebook"),
    (".txt", "Text"),
];

// Build manifests with no distinguishing extension, matched only at the root.
const ROOT_FILENAMES: &[(&str, &str)] = &[("CMakeLists.txt", "CMake"), ("Makefile", "Makefile")];

const CODE_LANGUAGES: &[&str] = &["Python", "C++", "Cython", "C", "Fortran", "Rust"];

/// Immutable lookup data shared by the classifier and the aggregator.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    extensions: HashMap<String, &'static str>,
    overrides: HashMap<String, &'static str>,
    code_languages: HashSet<&'static str>,
}

/// One vocabulary entry as shown by `--languages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageInfo {
    pub label: &'static str,
    pub patterns: Vec<String>,
    pub is_code: bool,
}

impl LanguageTable {
    pub fn builtin() -> Self {
        Self::from_entries(EXTENSIONS, ROOT_FILENAMES, CODE_LANGUAGES)
    }

    /// Build a table from raw entries. Extension keys are stored lower-cased
    /// with their leading dot; a later duplicate key replaces an earlier one.
    pub fn from_entries(
        extensions: &[(&str, &'static str)],
        overrides: &[(&str, &'static str)],
        code_languages: &[&'static str],
    ) -> Self {
        let extensions = extensions
            .iter()
            .map(|(ext, label)| {
                let ext = ext.to_lowercase();
                let key = if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                };
                (key, *label)
            })
            .collect();
        let overrides = overrides
            .iter()
            .map(|(name, label)| (name.to_string(), *label))
            .collect();
        LanguageTable {
            extensions,
            overrides,
            code_languages: code_languages.iter().copied().collect(),
        }
    }

    /// Map a root-relative path to its language label, if any.
    pub fn classify(&self, relative: &Path) -> Option<&'static str> {
        if let Some(label) = self.overrides.get(posix_path(relative).as_str()) {
            return Some(*label);
        }
        let ext = relative.extension()?.to_str()?;
        self.extensions
            .get(&format!(".{}", ext.to_lowercase()))
            .copied()
    }

    pub fn is_code(&self, label: &str) -> bool {
        self.code_languages.contains(label)
    }

    /// Every label in the vocabulary, alphabetically, with the extensions and
    /// override filenames that select it.
    pub fn languages(&self) -> Vec<LanguageInfo> {
        let mut by_label: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for (ext, label) in &self.extensions {
            by_label.entry(*label).or_default().push(ext.clone());
        }
        for (name, label) in &self.overrides {
            by_label.entry(*label).or_default().push(name.clone());
        }
        by_label
            .into_iter()
            .map(|(label, mut patterns)| {
                patterns.sort();
                LanguageInfo {
                    label,
                    patterns,
                    is_code: self.is_code(label),
                }
            })
            .collect()
    }
}

/// Render a relative path with `/` separators, dropping `.` components.
pub fn posix_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::CurDir => continue,
            Component::Normal(part) => part.to_string_lossy(),
            other => other.as_os_str().to_string_lossy(),
        };
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}
