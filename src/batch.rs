//! Directory batch processing: one JSON outline per input PDF

use crate::config::OutlineConfig;
use crate::model::DocumentOutline;
use crate::outline::OutlineSource;
use crate::{process_pdf_with_config, PdfError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Outcome of processing one input file
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source: OutlineSource,
    pub entries: usize,
    pub page_count: u32,
    pub elapsed: Duration,
}

/// List files with a `.pdf` extension in any letter case, sorted by name
pub fn collect_pdf_files(dir: &Path) -> Result<Vec<PathBuf>, PdfError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Output path for an input file: `<output_dir>/<stem>.json`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    output_dir.join(format!("{}.json", stem))
}

/// Write an outline as UTF-8 JSON, four-space indented when `pretty`
///
/// The JSON is serialized in memory first so a failure leaves no partial file.
pub fn write_outline_json(
    outline: &DocumentOutline,
    path: &Path,
    pretty: bool,
) -> Result<(), PdfError> {
    let mut buffer = Vec::new();
    if pretty {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        outline.serialize(&mut serializer)?;
    } else {
        serde_json::to_writer(&mut buffer, outline)?;
    }
    fs::write(path, buffer)?;
    Ok(())
}

/// Extract one PDF and write its JSON outline into `output_dir`
///
/// Nothing is written when the PDF cannot be opened.
pub fn process_file(
    input: &Path,
    output_dir: &Path,
    config: &OutlineConfig,
    pretty: bool,
) -> Result<FileReport, PdfError> {
    let start = Instant::now();
    let result = process_pdf_with_config(input, config)?;
    let output = output_path_for(input, output_dir);
    write_outline_json(&result.outline, &output, pretty)?;

    Ok(FileReport {
        input: input.to_path_buf(),
        output,
        source: result.source,
        entries: result.outline.outline.len(),
        page_count: result.page_count,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, OutlineEntry};

    #[test]
    fn test_collect_pdf_files_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PDF", "a.pdf", "c.Pdf", "notes.txt", "pdf"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let files = collect_pdf_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.PDF", "c.Pdf"]);
    }

    #[test]
    fn test_collect_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect_pdf_files(&dir.path().join("missing")),
            Err(PdfError::Io(_))
        ));
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("in/Annual Report.PDF"), Path::new("out")),
            PathBuf::from("out/Annual Report.json")
        );
    }

    #[test]
    fn test_write_outline_json_pretty_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let outline = DocumentOutline {
            title: "Résumé".into(),
            outline: vec![OutlineEntry::new(HeadingLevel::H1, "Éducation", 2)],
        };

        write_outline_json(&outline, &path, true).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"title\": \"Résumé\""));
        assert!(written.contains("\n    \"outline\": ["));
        assert!(written.contains("\"level\": \"H1\""));

        let parsed: DocumentOutline = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, outline);
    }

    #[test]
    fn test_write_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("doc.json");
        let outline = DocumentOutline {
            title: "Report".into(),
            outline: Vec::new(),
        };

        assert!(matches!(
            write_outline_json(&outline, &path, false),
            Err(PdfError::Io(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_compact_json_is_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let outline = DocumentOutline {
            title: "Report".into(),
            outline: vec![OutlineEntry::new(HeadingLevel::H2, "Scope", 4)],
        };

        write_outline_json(&outline, &path, false).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"title":"Report","outline":[{"level":"H2","text":"Scope","page":4}]}"#
        );
    }

    #[test]
    fn test_unreadable_pdf_writes_nothing() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let input = input_dir.path().join("broken.pdf");
        fs::write(&input, b"%PDF-1.4 truncated").unwrap();

        let result = process_file(&input, output_dir.path(), &OutlineConfig::default(), true);
        assert!(result.is_err());
        assert!(!output_dir.path().join("broken.json").exists());
    }
}
