//! Common test utilities for the Hyoshi crate.
//!
//! Provides temporary directories, dummy page images, `.cbz` fixtures, a
//! fixture-backed extractor double and helpers to inspect produced EPUB files.

use async_trait::async_trait;
use hyoshi::error::{Error, Result};
use hyoshi::extractor::Extractor;
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// A temporary test area: `root` receives archives and books, `fixtures` holds
/// the unpacked contents the extractor double serves.
#[allow(dead_code)]
pub struct TestDirs {
    _temp: TempDir,
    pub root: PathBuf,
    pub fixtures: PathBuf,
}

#[allow(dead_code)]
pub fn setup_test_dirs() -> TestDirs {
    let temp = tempfile::Builder::new()
        .prefix("hyoshi-test-")
        .tempdir()
        .unwrap();
    let root = temp.path().join("comics");
    let fixtures = temp.path().join("fixtures");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::create_dir_all(&fixtures).unwrap();
    TestDirs {
        _temp: temp,
        root,
        fixtures,
    }
}

/// Creates a small solid-color image, encoded according to the file extension.
#[allow(dead_code)]
pub fn create_dummy_image(path: &Path, color: Rgb<u8>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let img = RgbImage::from_pixel(16, 24, color);
    let format = ImageFormat::from_path(path).map_err(|e| Error::Other(e.to_string()))?;
    img.save_with_format(path, format)
        .map_err(|e| Error::Other(e.to_string()))?;
    Ok(())
}

/// Creates one page per name, each with a distinct color, and returns their paths.
#[allow(dead_code)]
pub fn create_pages(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let path = dir.join(name);
            let shade = (i as u8).wrapping_mul(37);
            create_dummy_image(&path, Rgb([shade, 255 - shade, 128])).unwrap();
            path
        })
        .collect()
}

/// Writes a `.cbz` archive containing the given `(entry name, bytes)` pairs.
#[allow(dead_code)]
pub fn write_cbz(archive: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = File::create(archive).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Names of every entry in a ZIP based file (EPUB or CBZ).
#[allow(dead_code)]
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(|n| n.to_string()).collect()
}

/// Bytes of the first entry whose name ends with `suffix`.
#[allow(dead_code)]
pub fn zip_entry_bytes(path: &Path, suffix: &str) -> Option<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let name = archive
        .file_names()
        .find(|n| n.ends_with(suffix))
        .map(|n| n.to_string())?;
    let mut entry = archive.by_name(&name).unwrap();
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).unwrap();
    Some(bytes)
}

/// Page documents (`text/NNNN.xhtml`) inside an EPUB, sorted by name.
#[allow(dead_code)]
pub fn page_documents(epub: &Path) -> Vec<String> {
    let mut documents: Vec<String> = zip_entry_names(epub)
        .into_iter()
        .filter(|n| n.contains("text/") && n.ends_with(".xhtml"))
        .collect();
    documents.sort();
    documents
}

/// Asserts that `path` is a ZIP file whose first entry is the EPUB mimetype.
#[allow(dead_code)]
pub fn assert_valid_epub(path: &Path) {
    assert!(path.is_file(), "EPUB does not exist: {:?}", path);
    let names = zip_entry_names(path);
    assert!(names.iter().any(|n| n == "mimetype"), "missing mimetype in {:?}", path);
    assert!(
        names.iter().any(|n| n.ends_with(".opf")),
        "missing package document in {:?}",
        path
    );
}

/// Whether any directory created with `prefix` is still present in the system temp dir.
#[allow(dead_code)]
pub fn temp_dirs_left(prefix: &str) -> usize {
    std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
        .count()
}

fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Extractor double: "extracts" an archive by copying the fixture directory
/// registered under the archive's file name. Unknown archives fail like a
/// corrupt archive would.
#[allow(dead_code)]
#[derive(Default)]
pub struct FixtureExtractor {
    fixtures: HashMap<String, PathBuf>,
}

#[allow(dead_code)]
impl FixtureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixture(mut self, archive_name: &str, contents: PathBuf) -> Self {
        self.fixtures.insert(archive_name.to_string(), contents);
        self
    }
}

#[async_trait]
impl Extractor for FixtureExtractor {
    async fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match self.fixtures.get(&name) {
            Some(contents) => copy_tree(contents, destination).map_err(|e| {
                Error::ExtractionFailed {
                    archive: archive.to_path_buf(),
                    diagnostic: e.to_string(),
                }
            }),
            None => Err(Error::ExtractionFailed {
                archive: archive.to_path_buf(),
                diagnostic: "ERROR: Can not open the file as archive".to_string(),
            }),
        }
    }
}

/// Creates an (empty) archive file so the batch runner can pick it up.
#[allow(dead_code)]
pub fn touch_archive(root: &Path, name: &str) -> PathBuf {
    let path = root.join(name);
    std::fs::write(&path, b"").unwrap();
    path
}
