//! Plain-text rendering of report rows and of the language vocabulary.

use crate::language::LanguageInfo;
use crate::tally::Row;

/// Minimum width of the right-aligned count column.
const COUNT_WIDTH: usize = 8;

/// One formatted line per row: the label padded to the longest label, two
/// spaces, then the count right-aligned. No header, no borders.
pub fn format_table(rows: &[Row]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|row| {
            format!(
                "{:<width$}  {:>count$}",
                row.label,
                row.lines,
                width = width,
                count = COUNT_WIDTH
            )
        })
        .collect()
}

pub fn format_language_list(languages: &[LanguageInfo]) -> String {
    let width = languages
        .iter()
        .map(|info| info.label.chars().count())
        .max()
        .unwrap_or(0);
    let mut output = String::from("Supported languages:\n");
    for info in languages {
        let mut line = format!("  {:<width$}  {}", info.label, info.patterns.join(" "));
        if info.is_code {
            line.push_str("  (code)");
        }
        output.push_str(&line);
        output.push('\n');
    }
    output
}
