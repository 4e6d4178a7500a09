//! Batch orchestration.
//!
//! Files are processed strictly one at a time, in order:
//!
//! ```text
//! load (size guard) ─► UTF-8 check ─► svg::extract ─► accumulate
//! ```
//!
//! A failing file contributes zero fragments and a report; it never aborts
//! the batch. Cancellation is checked between files only.

use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::debug;
use crate::icon::IconFragment;
use crate::svg::{self, ExtractError, IdSeed, ParseError, Strategy};
use crate::utils::plural_count;

/// One input file, loaded lazily.
#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    input: Input,
}

#[derive(Debug)]
enum Input {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl SourceFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            input: Input::Bytes(bytes),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            input: Input::Path(path),
        }
    }

    /// Read the content, refusing anything over `limit` bytes.
    fn load(self, limit: usize) -> Result<Vec<u8>, ExtractError> {
        let bytes = match self.input {
            Input::Bytes(bytes) => bytes,
            Input::Path(path) => {
                // Check metadata first so oversize files are never read.
                let size = fs::metadata(&path).map_err(ExtractError::Read)?.len();
                let size = usize::try_from(size).unwrap_or(usize::MAX);
                if size > limit {
                    return Err(ExtractError::Oversize { size, limit });
                }
                fs::read(&path).map_err(ExtractError::Read)?
            }
        };
        if bytes.len() > limit {
            return Err(ExtractError::Oversize {
                size: bytes.len(),
                limit,
            });
        }
        Ok(bytes)
    }
}

/// What happened to one file.
#[derive(Debug)]
pub enum FileOutcome {
    Extracted {
        icons: usize,
        strategy: Strategy,
        skipped: usize,
    },
    /// Parsed fine, but nothing drawable was found.
    Empty,
    Failed(ExtractError),
    /// Not processed: the batch was cancelled first.
    Cancelled,
}

#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    /// `file.svg: 3 icons (symbol)`, `bad.svg: 0 icons (parse error: ...)`
    pub fn summary(&self) -> String {
        let detail = match &self.outcome {
            FileOutcome::Extracted {
                icons,
                strategy,
                skipped: 0,
            } => format!("{} ({strategy})", plural_count(*icons, "icon")),
            FileOutcome::Extracted {
                icons,
                strategy,
                skipped,
            } => format!(
                "{} ({strategy}, {} skipped)",
                plural_count(*icons, "icon"),
                skipped
            ),
            FileOutcome::Empty => "0 icons (no drawable content)".to_string(),
            FileOutcome::Failed(e) => format!("0 icons ({e})"),
            FileOutcome::Cancelled => "cancelled".to_string(),
        };
        format!("{}: {}", self.name, detail)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed(_))
    }
}

/// Everything a batch produced, in file order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub fragments: Vec<IconFragment>,
    pub reports: Vec<FileReport>,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_failure()).count()
    }

    pub fn cancelled(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Cancelled))
            .count()
    }
}

/// Extract one file's bytes: size guard, UTF-8 check, then extraction.
pub fn extract_bytes(
    name: &str,
    bytes: &[u8],
    config: &Config,
    seed: IdSeed,
) -> Result<svg::Extraction, ExtractError> {
    let limit = config.limits.max_file_bytes();
    if bytes.len() > limit {
        return Err(ExtractError::Oversize {
            size: bytes.len(),
            limit,
        });
    }
    let text = std::str::from_utf8(bytes).map_err(ParseError::Encoding)?;
    // A UTF-8 byte order mark is not part of the document.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(svg::extract(name, text, config, seed)?)
}

/// Process `files` in order.
///
/// `is_cancelled` is polled before each file; once it returns true, every
/// remaining file is reported as cancelled without being loaded.
/// `on_file` sees each report as soon as its file is done.
pub fn run_batch(
    files: impl IntoIterator<Item = SourceFile>,
    config: &Config,
    is_cancelled: impl Fn() -> bool,
    mut on_file: impl FnMut(&FileReport),
) -> BatchResult {
    let stamp = IdSeed::now(0).stamp;
    let limit = config.limits.max_file_bytes();
    let mut result = BatchResult::default();
    let mut cancelled = false;

    for (file_index, file) in files.into_iter().enumerate() {
        cancelled = cancelled || is_cancelled();
        let name = file.name.clone();

        let outcome = if cancelled {
            FileOutcome::Cancelled
        } else {
            let seed = IdSeed { stamp, file_index };
            let extracted = file
                .load(limit)
                .and_then(|bytes| extract_bytes(&name, &bytes, config, seed));
            match extracted {
                Ok(extraction) => match extraction.strategy {
                    Some(strategy) => {
                        let outcome = FileOutcome::Extracted {
                            icons: extraction.fragments.len(),
                            strategy,
                            skipped: extraction.skipped,
                        };
                        result.fragments.extend(extraction.fragments);
                        outcome
                    }
                    None => FileOutcome::Empty,
                },
                Err(e) => {
                    debug!("extract"; "{}: {}", name, e.kind());
                    FileOutcome::Failed(e)
                }
            }
        };

        let report = FileReport { name, outcome };
        on_file(&report);
        result.reports.push(report);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::testing::assert_standalone;
    use std::cell::Cell;
    use tempfile::TempDir;

    const SYMBOLS: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <symbol id="a" viewBox="0 0 24 24"><path d="M2 2 L22 2 L22 22 Z"/></symbol>
        <symbol id="b" viewBox="0 0 24 24"><circle cx="12" cy="12" r="8"/></symbol>
    </svg>"#;

    fn run(files: Vec<SourceFile>, config: &Config) -> BatchResult {
        run_batch(files, config, || false, |_| {})
    }

    #[test]
    fn test_malformed_file_does_not_stop_batch() {
        let files = vec![
            SourceFile::from_bytes("one.svg", SYMBOLS.as_bytes().to_vec()),
            SourceFile::from_bytes("bad.svg", b"<svg><path d=".to_vec()),
            SourceFile::from_bytes("two.svg", SYMBOLS.as_bytes().to_vec()),
        ];
        let result = run(files, &Config::default());

        assert_eq!(result.fragments.len(), 4);
        assert_eq!(result.failed(), 1);
        assert!(matches!(
            result.reports[1].outcome,
            FileOutcome::Failed(ExtractError::Parse(ParseError::Xml(_)))
        ));
        assert!(result.reports[1].summary().starts_with("bad.svg: 0 icons (parse error:"));
        assert_eq!(result.reports[0].summary(), "one.svg: 2 icons (symbol)");

        // Same file name twice in one run still yields distinct ids.
        let mut ids: Vec<_> = result.fragments.iter().map(|f| f.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        for f in &result.fragments {
            assert_standalone(&f.svg_content);
        }
    }

    #[test]
    fn test_malformed_first_file_then_five_symbols() {
        let five: String = (0..5)
            .map(|i| format!(r#"<symbol id="s{i}" viewBox="0 0 24 24"><rect x="4" y="4" width="16" height="16"/></symbol>"#))
            .collect();
        let five = format!(r#"<svg xmlns="http://www.w3.org/2000/svg">{five}</svg>"#);
        let files = vec![
            SourceFile::from_bytes("bad.svg", b"<svg><g></svg>".to_vec()),
            SourceFile::from_bytes("sprite.svg", five.into_bytes()),
        ];
        let result = run(files, &Config::default());

        assert_eq!(result.fragments.len(), 5);
        assert_eq!(result.failed(), 1);
        assert!(result.reports[0].summary().starts_with("bad.svg: 0 icons (parse error"));
        assert_eq!(result.reports[1].summary(), "sprite.svg: 5 icons (symbol)");
        for f in &result.fragments {
            assert_standalone(&f.svg_content);
        }
    }

    #[test]
    fn test_size_and_encoding_guards() {
        let mut config = Config::default();
        config.limits.max_file_size = "100B".into();
        let files = vec![
            SourceFile::from_bytes("big.svg", vec![b' '; 101]),
            SourceFile::from_bytes("latin1.svg", b"<svg>\xe9</svg>".to_vec()),
            SourceFile::from_bytes("empty.svg", br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#.to_vec()),
        ];
        let result = run(files, &config);

        assert!(matches!(
            result.reports[0].outcome,
            FileOutcome::Failed(ExtractError::Oversize { size: 101, limit: 100 })
        ));
        assert!(matches!(
            result.reports[1].outcome,
            FileOutcome::Failed(ExtractError::Parse(ParseError::Encoding(_)))
        ));
        assert!(matches!(result.reports[2].outcome, FileOutcome::Empty));
        assert!(result.fragments.is_empty());
    }

    #[test]
    fn test_reads_paths_and_reports_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("icons.svg");
        fs::write(&path, SYMBOLS).unwrap();

        let files = vec![
            SourceFile::from_path(&path),
            SourceFile::from_path(tmp.path().join("missing.svg")),
        ];
        let result = run(files, &Config::default());
        assert_eq!(result.fragments.len(), 2);
        assert!(matches!(
            result.reports[1].outcome,
            FileOutcome::Failed(ExtractError::Read(_))
        ));
    }

    #[test]
    fn test_cancellation_between_files() {
        let seen = Cell::new(0);
        let files = (0..3)
            .map(|i| SourceFile::from_bytes(format!("f{i}.svg"), SYMBOLS.as_bytes().to_vec()))
            .collect::<Vec<_>>();
        let result = run_batch(files, &Config::default(), || seen.get() >= 1, |_| {
            seen.set(seen.get() + 1);
        });

        assert_eq!(result.fragments.len(), 2);
        assert_eq!(result.cancelled(), 2);
        assert_eq!(result.reports[2].summary(), "f2.svg: cancelled");
    }
}
