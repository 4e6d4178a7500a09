//! The `extract` command.
//!
//! Phases:
//! - **Collect** - Expand directories into `.svg` files (argument order kept)
//! - **Extract** - Run the batch, one file at a time, with a progress line
//! - **Write** - Optional icon files, record store, and JSON manifest

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use jwalk::WalkDir;
use serde::Serialize;

use crate::{
    batch::{self, BatchResult, FileOutcome, SourceFile},
    cli::ExtractArgs,
    config::Config,
    core::is_shutdown,
    icon::{IconFragment, IconRecord, IconStore},
    log,
    logger::ProgressLine,
    utils::{UniqueNames, plural_count},
};

/// Run `extract` for parsed CLI arguments.
pub fn extract_icons(args: &ExtractArgs, config: &Config) -> Result<BatchResult> {
    let files = collect_svg_files(&args.paths);
    if files.is_empty() {
        bail!("no SVG files found");
    }

    let progress = ProgressLine::new("extract", &[("files", files.len()), ("icons", 0)]);
    let result = batch::run_batch(
        files.iter().map(SourceFile::from_path),
        config,
        is_shutdown,
        |report| {
            progress.inc("files");
            if let FileOutcome::Extracted { icons, .. } = report.outcome {
                progress.add("icons", icons);
            }
            let module = if report.is_failure() { "error" } else { "extract" };
            log!(module; "{}", report.summary());
        },
    );
    progress.finish();

    if let Some(dir) = &args.output {
        let written = write_icons(dir, &result.fragments)?;
        log!("extract"; "wrote {} to {}", plural_count(written, "file"), dir.display());
    }

    if args.save {
        let mut store = IconStore::open(&config.store.path)?;
        let saved = store.save(result.fragments.iter().map(IconRecord::from))?;
        log!("store"; "saved {} to {}", plural_count(saved, "icon"), store.path().display());
    }

    if let Some(path) = &args.manifest {
        write_manifest(path, &result.fragments)?;
        log!("extract"; "manifest written to {}", path.display());
    }

    let failed = result.failed();
    let cancelled = result.cancelled();
    log!(
        "extract";
        "{} from {}{}{}",
        plural_count(result.fragments.len(), "icon"),
        plural_count(result.reports.len() - cancelled, "file"),
        if failed > 0 { format!(", {failed} failed") } else { String::new() },
        if cancelled > 0 { format!(", {cancelled} cancelled") } else { String::new() },
    );

    Ok(result)
}

/// Expand arguments into input files.
///
/// Directories are walked recursively (sorted, `.svg` only). Other paths are
/// kept as given, so a missing file shows up as a per-file read error.
fn collect_svg_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .sort(true)
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.path())
                    .filter(|p| is_svg_path(p)),
            );
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Write each fragment to `dir/{slug}.svg`. Returns the number written.
fn write_icons(dir: &Path, fragments: &[IconFragment]) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut names = UniqueNames::new(dir);
    for fragment in fragments {
        let path = names.reserve(&fragment.download_name());
        fs::write(&path, &fragment.svg_content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(fragments.len())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    total: usize,
    icons: &'a [IconFragment],
}

fn write_manifest(path: &Path, fragments: &[IconFragment]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let manifest = Manifest {
        total: fragments.len(),
        icons: fragments,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SHEET: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <symbol id="home" viewBox="0 0 24 24"><path d="M2 12 L12 2 L22 12 L22 22 L2 22 Z"/></symbol>
        <symbol id="home_" viewBox="0 0 24 24"><circle cx="12" cy="12" r="9"/></symbol>
    </svg>"#;

    fn setup() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("in/nested")).unwrap();
        fs::write(tmp.path().join("in/a.svg"), SHEET).unwrap();
        fs::write(tmp.path().join("in/nested/b.SVG"), SHEET).unwrap();
        fs::write(tmp.path().join("in/notes.txt"), "not an icon").unwrap();
        fs::write(tmp.path().join("broken.svg"), "<svg><g>").unwrap();

        let mut config = Config::default();
        config.store.path = tmp.path().join("store/icons.json");
        (tmp, config)
    }

    #[test]
    fn test_collect_svg_files() {
        let (tmp, _) = setup();
        let files = collect_svg_files(&[tmp.path().join("in"), tmp.path().join("broken.svg")]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.svg", "b.SVG", "broken.svg"]);
    }

    #[test]
    fn test_extract_writes_outputs() {
        let (tmp, config) = setup();
        let args = ExtractArgs {
            paths: vec![tmp.path().join("in"), tmp.path().join("broken.svg")],
            output: Some(tmp.path().join("out")),
            save: true,
            max_icons: None,
            manifest: Some(tmp.path().join("manifest.json")),
            verbose: false,
        };
        let result = extract_icons(&args, &config).unwrap();
        assert_eq!(result.fragments.len(), 4);
        assert_eq!(result.failed(), 1);

        // "Home" twice per file, all four written without clobbering.
        let mut written: Vec<_> = fs::read_dir(tmp.path().join("out"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        written.sort();
        assert_eq!(written, ["home-2.svg", "home-3.svg", "home-4.svg", "home.svg"]);

        let store = IconStore::open(&config.store.path).unwrap();
        assert_eq!(store.list().len(), 4);

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("manifest.json")).unwrap()).unwrap();
        assert_eq!(manifest["total"], 4);
        assert_eq!(manifest["icons"][0]["name"], "Home");
        assert!(manifest["icons"][0]["svgContent"].as_str().unwrap().starts_with("<svg"));
    }

    #[test]
    fn test_no_inputs() {
        let tmp = TempDir::new().unwrap();
        let args = ExtractArgs {
            paths: vec![tmp.path().to_path_buf()],
            ..ExtractArgs::default()
        };
        assert!(extract_icons(&args, &Config::default()).is_err());
    }
}
