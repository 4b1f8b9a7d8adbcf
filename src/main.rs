//! Repository line counter grouped by language.
//!
//! Lists the files under a root (via `rg`, `git ls-files`, or a directory
//! walk), classifies each by filename or extension, counts newline bytes, and
//! prints per-language totals sorted by size with a closing TOTAL row.

mod counter;
mod error;
mod language;
mod lister;
mod report;
mod tally;

use std::env;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::*;
use glob::Pattern;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::LangLocError;
use crate::language::LanguageTable;
use crate::lister::FileLister;
use crate::report::{format_language_list, format_table};
use crate::tally::Scan;

// This tool's own sources, relative to the crate directory.
const OWN_SOURCES: &[&str] = &[
    "src/main.rs",
    "src/counter.rs",
    "src/error.rs",
    "src/language.rs",
    "src/lister.rs",
    "src/report.rs",
    "src/tally.rs",
];

const NO_MATCHES: &str = "No matching files found.";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Count repository lines by language",
    long_about = "Counts newline bytes (like `wc -l`) in every file under a root, grouped by language. \
                  Files are listed with `rg --files`, then `git ls-files`, then a plain directory walk."
)]
struct Args {
    /// Repository root to scan [default: the directory this tool was built from]
    #[arg(long)]
    root: Option<PathBuf>,

    /// Report only source-code languages
    #[arg(long)]
    code_only: bool,

    /// Count this tool's own sources when they are under the root
    #[arg(long)]
    include_self: bool,

    /// Only count files whose name or root-relative path matches this glob
    #[arg(short = 'f', long)]
    filespec: Option<String>,

    /// List the supported languages and exit
    #[arg(short = 'l', long)]
    languages: bool,

    /// Log listing and per-file decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Reported,
    NoMatches,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Reported => ExitCode::SUCCESS,
            Outcome::NoMatches => ExitCode::from(1),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&args, &FileLister::standard(), &mut out) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => ExitCode::from(report_failure(&mut out, &err)),
    }
}

/// Print a fatal error to stderr after flushing whatever reached `out`;
/// returns the process exit code.
fn report_failure<W: Write>(out: &mut W, err: &LangLocError) -> u8 {
    if let Err(flush_err) = out.flush() {
        debug!("failed to flush stdout before reporting error: {}", flush_err);
    }
    eprintln!("{}: {}", "error".red().bold(), err);
    err.exit_code()
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

fn run<W: Write>(args: &Args, lister: &FileLister, out: &mut W) -> Result<Outcome, LangLocError> {
    let table = LanguageTable::builtin();

    if args.languages {
        write!(out, "{}", format_language_list(&table.languages()))?;
        return Ok(Outcome::Reported);
    }

    let root = resolve_root(args.root.as_deref())?;
    let filespec = args
        .filespec
        .as_deref()
        .map(|spec| {
            Pattern::new(spec).map_err(|source| LangLocError::InvalidFilespec {
                pattern: spec.to_string(),
                source,
            })
        })
        .transpose()?;

    let mut scan = Scan::new(&table).filespec(filespec);
    if !args.include_self {
        scan = scan.exclude(own_sources());
    }

    let paths = lister.list(&root);
    let tally = scan.tally(&root, &paths);
    if tally.is_empty() {
        writeln!(out, "{}", NO_MATCHES)?;
        return Ok(Outcome::NoMatches);
    }

    let lines = format_table(&tally.rows(&table, args.code_only));
    if let Some((total, rows)) = lines.split_last() {
        for line in rows {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "{}", total.as_str().bold())?;
    }
    Ok(Outcome::Reported)
}

/// The root must exist; it is resolved to an absolute path.
fn resolve_root(root: Option<&Path>) -> Result<PathBuf, LangLocError> {
    let root = root.map(Path::to_path_buf).unwrap_or_else(default_root);
    fs::canonicalize(&root).map_err(|_| LangLocError::RootNotFound { root })
}

// `src/main.rs` sits one directory below the crate root.
fn default_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn own_sources() -> Vec<PathBuf> {
    let crate_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut paths: Vec<PathBuf> = OWN_SOURCES.iter().map(|rel| crate_dir.join(rel)).collect();
    if let Ok(exe) = env::current_exe() {
        paths.push(exe);
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::WalkSource;
    use colored::control;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn parse<I, T>(extra: I) -> Args
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut argv: Vec<OsString> = vec!["langloc".into()];
        argv.extend(extra.into_iter().map(Into::into));
        Args::parse_from(argv)
    }

    fn walk_only() -> FileLister {
        FileLister::new(vec![Box::new(WalkSource)])
    }

    fn run_capture(args: &Args) -> (Result<Outcome, LangLocError>, String) {
        control::set_override(false);
        let mut buffer = Vec::new();
        let result = run(args, &walk_only(), &mut buffer);
        (result, String::from_utf8_lossy(&buffer).into_owned())
    }

    fn create_test_file(dir: &Path, name: &str, content: &str) -> io::Result<()> {
        fs::write(dir.join(name), content)
    }

    fn scenario() -> io::Result<TempDir> {
        let temp_dir = TempDir::new()?;
        create_test_file(temp_dir.path(), "a.py", "a\nb\nc\n")?;
        create_test_file(temp_dir.path(), "b.cpp", "1\n2\n3\n4\n5\n")?;
        create_test_file(temp_dir.path(), "README.md", "# readme\n\n")?;
        create_test_file(temp_dir.path(), "notes.txt", "one line, no newline")?;
        Ok(temp_dir)
    }

    #[test]
    fn args_defaults() {
        let args = parse(Vec::<OsString>::new());
        assert!(args.root.is_none());
        assert!(!args.code_only);
        assert!(!args.include_self);
        assert!(!args.languages);
        assert!(!args.verbose);
        assert!(args.filespec.is_none());
    }

    #[test]
    fn full_report_for_scenario() -> io::Result<()> {
        let temp_dir = scenario()?;
        let args = parse([OsString::from("--root"), temp_dir.path().into()]);
        let (result, output) = run_capture(&args);
        assert_eq!(result.expect("run should succeed"), Outcome::Reported);
        assert_eq!(
            output,
            "C++              5\n\
             Python           3\n\
             Markdown         2\n\
             Text             0\n\
             TOTAL           10\n"
        );
        Ok(())
    }

    #[test]
    fn code_only_report_for_scenario() -> io::Result<()> {
        let temp_dir = scenario()?;
        let args = parse([
            OsString::from("--root"),
            temp_dir.path().into(),
            OsString::from("--code-only"),
        ]);
        let (result, output) = run_capture(&args);
        assert_eq!(result.expect("run should succeed"), Outcome::Reported);
        assert_eq!(output, "C++            5\nPython         3\nTOTAL          8\n");
        Ok(())
    }

    #[test]
    fn code_only_with_no_code_prints_zero_total() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        create_test_file(temp_dir.path(), "README.md", "hello\n")?;
        let args = parse([
            OsString::from("--root"),
            temp_dir.path().into(),
            OsString::from("--code-only"),
        ]);
        let (result, output) = run_capture(&args);
        assert_eq!(result.expect("run should succeed"), Outcome::Reported);
        assert_eq!(output, "TOTAL         0\n");
        Ok(())
    }

    #[test]
    fn empty_root_reports_no_matches() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        create_test_file(temp_dir.path(), "image.png", "not text\n")?;
        let args = parse([OsString::from("--root"), temp_dir.path().into()]);
        let (result, output) = run_capture(&args);
        assert_eq!(result.expect("run should succeed"), Outcome::NoMatches);
        assert_eq!(output, "No matching files found.\n");
        Ok(())
    }

    #[test]
    fn missing_root_is_a_configuration_error() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let missing = temp_dir.path().join("missing");
        let args = parse([OsString::from("--root"), missing.clone().into()]);
        let (result, output) = run_capture(&args);
        let err = result.expect_err("missing root must fail");
        assert!(matches!(err, LangLocError::RootNotFound { ref root } if *root == missing));
        assert_eq!(err.exit_code(), 2);
        assert!(output.is_empty(), "nothing should reach stdout: {output}");
        Ok(())
    }

    #[test]
    fn invalid_filespec_is_a_configuration_error() -> io::Result<()> {
        let temp_dir = scenario()?;
        let args = parse([
            OsString::from("--root"),
            temp_dir.path().into(),
            OsString::from("--filespec"),
            OsString::from("["),
        ]);
        let (result, _) = run_capture(&args);
        let err = result.expect_err("invalid pattern must fail");
        assert!(err.to_string().contains("Invalid filespec pattern"));
        assert_eq!(err.exit_code(), 2);
        Ok(())
    }

    #[test]
    fn filespec_limits_the_report() -> io::Result<()> {
        let temp_dir = scenario()?;
        let args = parse([
            OsString::from("--root"),
            temp_dir.path().into(),
            OsString::from("-f"),
            OsString::from("*.py"),
        ]);
        let (result, output) = run_capture(&args);
        assert_eq!(result.expect("run should succeed"), Outcome::Reported);
        assert_eq!(output, "Python         3\nTOTAL          3\n");
        Ok(())
    }

    #[test]
    fn own_sources_are_excluded_unless_requested() {
        let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");

        let args = parse([OsString::from("--root"), src_dir.clone().into()]);
        let (result, output) = run_capture(&args);
        assert_eq!(result.expect("run should succeed"), Outcome::NoMatches);
        assert_eq!(output, "No matching files found.\n");

        let args = parse([
            OsString::from("--root"),
            src_dir.into(),
            OsString::from("--include-self"),
        ]);
        let (result, output) = run_capture(&args);
        assert_eq!(result.expect("run should succeed"), Outcome::Reported);
        let first = output.lines().next().expect("at least one row");
        assert!(first.starts_with("Rust"), "output: {output}");
        assert!(output.lines().last().expect("total row").starts_with("TOTAL"));
    }

    #[test]
    fn own_sources_exist_on_disk() {
        for path in own_sources().iter().take(OWN_SOURCES.len()) {
            assert!(path.is_file(), "missing own source {}", path.display());
        }
    }

    #[test]
    fn languages_flag_skips_root_validation() {
        let args = parse([
            OsString::from("--languages"),
            OsString::from("--root"),
            OsString::from("/definitely/not/here"),
        ]);
        let (result, output) = run_capture(&args);
        assert_eq!(result.expect("run should succeed"), Outcome::Reported);
        assert!(output.starts_with("Supported languages:"));
        assert!(output.contains("Rust"));
    }

    #[test]
    fn failure_exit_code_survives_flush_error() {
        struct FailingFlush;

        impl Write for FailingFlush {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Err(io::Error::other("simulated flush failure"))
            }
        }

        let err = LangLocError::RootNotFound {
            root: PathBuf::from("/nonexistent"),
        };
        let code = report_failure(&mut FailingFlush, &err);
        assert_eq!(code, 2);
    }

    #[test]
    fn default_root_is_the_crate_directory() -> io::Result<()> {
        let resolved = resolve_root(None).expect("crate directory exists");
        assert_eq!(resolved, fs::canonicalize(env!("CARGO_MANIFEST_DIR"))?);
        Ok(())
    }
}
