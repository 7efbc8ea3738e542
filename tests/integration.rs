//! Integration tests for the Hyoshi crate.
//!
//! These run whole conversions (extraction, both assembly phases, cleanup) and
//! whole batches, then inspect the produced files.

use hyoshi::error::{Error, Result};
use hyoshi::prelude::*;

mod common;
use common::{
    FixtureExtractor, assert_valid_epub, create_pages, page_documents, setup_test_dirs,
    temp_dirs_left, touch_archive, write_cbz, zip_entry_bytes,
};

fn config(temp_prefix: &str, keep_intermediate: bool) -> HyoshiConfig {
    HyoshiConfig::builder()
        .temp_prefix(temp_prefix.to_string())
        .keep_intermediate(keep_intermediate)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_convert_archive_removes_intermediate() -> Result<()> {
    let dirs = setup_test_dirs();
    let contents = dirs.fixtures.join("Book");
    let paths = create_pages(&contents, &["01.png", "02.png", "03.png"]);
    let archive = touch_archive(&dirs.root, "Book.cbr");

    let prefix = "hyoshi_it_convert_";
    let extractor = FixtureExtractor::new().with_fixture("Book.cbr", contents);
    let converter = Converter::new(config(prefix, false), Arc::new(extractor));

    let output = converter.convert(&archive).await.unwrap();

    assert_eq!(output.epub_path, dirs.root.join("Book.epub"));
    assert_eq!(output.intermediate_path, None);
    assert_eq!(output.page_count, 3);
    assert_valid_epub(&output.epub_path);
    assert!(!dirs.root.join("Book._base.epub").exists());
    assert_eq!(
        zip_entry_bytes(&output.epub_path, "images/cover.png").unwrap(),
        std::fs::read(&paths[0])?
    );
    assert_eq!(page_documents(&output.epub_path).len(), 2);
    assert_eq!(temp_dirs_left(prefix), 0);
    Ok(())
}

#[tokio::test]
async fn test_convert_archive_keeps_intermediate() -> Result<()> {
    let dirs = setup_test_dirs();
    let contents = dirs.fixtures.join("Keep");
    let paths = create_pages(&contents, &["page1.jpg", "page2.jpg", "page10.jpg"]);
    let archive = touch_archive(&dirs.root, "Keep.cbr");

    let extractor = FixtureExtractor::new().with_fixture("Keep.cbr", contents);
    let converter = Converter::new(config("hyoshi_it_keep_", true), Arc::new(extractor));

    let output = converter.convert(&archive).await.unwrap();
    let intermediate = output.intermediate_path.clone().unwrap();

    assert_eq!(intermediate, dirs.root.join("Keep._base.epub"));
    assert_valid_epub(&intermediate);
    assert_valid_epub(&output.epub_path);

    // Full book: every page, no cover.
    assert_eq!(page_documents(&intermediate).len(), 3);
    assert!(zip_entry_bytes(&intermediate, "images/cover.jpg").is_none());
    assert_eq!(
        zip_entry_bytes(&intermediate, "images/0003.jpg").unwrap(),
        std::fs::read(&paths[2])?
    );

    // Final book: page1 is the cover, page2 and page10 are renumbered.
    assert_eq!(page_documents(&output.epub_path).len(), 2);
    assert_eq!(
        zip_entry_bytes(&output.epub_path, "images/cover.jpg").unwrap(),
        std::fs::read(&paths[0])?
    );
    assert_eq!(
        zip_entry_bytes(&output.epub_path, "images/0002.jpg").unwrap(),
        std::fs::read(&paths[2])?
    );
    Ok(())
}

#[tokio::test]
async fn test_convert_empty_archive_is_skipped() -> Result<()> {
    let dirs = setup_test_dirs();
    let contents = dirs.fixtures.join("Empty");
    std::fs::create_dir_all(&contents)?;
    std::fs::write(contents.join("info.txt"), "nothing to see")?;
    let archive = touch_archive(&dirs.root, "Empty.cbr");

    let prefix = "hyoshi_it_empty_";
    let extractor = FixtureExtractor::new().with_fixture("Empty.cbr", contents);
    let converter = Converter::new(config(prefix, true), Arc::new(extractor));

    let failure = converter.convert(&archive).await.unwrap_err();
    assert!(failure.is_skip());
    assert_eq!(failure.stage, ConversionStage::Scanning);
    assert!(matches!(failure.error, Error::EmptyPageSet(_)));
    assert!(!dirs.root.join("Empty.epub").exists());
    assert!(!dirs.root.join("Empty._base.epub").exists());
    assert_eq!(temp_dirs_left(prefix), 0);
    Ok(())
}

#[tokio::test]
async fn test_failed_extraction_leaves_nothing_behind() -> Result<()> {
    let dirs = setup_test_dirs();
    let archive = touch_archive(&dirs.root, "Corrupt.cbr");

    let prefix = "hyoshi_it_corrupt_";
    let converter = Converter::new(config(prefix, false), Arc::new(FixtureExtractor::new()));

    let failure = converter.convert(&archive).await.unwrap_err();
    assert!(!failure.is_skip());
    assert_eq!(failure.stage, ConversionStage::Extracting);
    match &failure.error {
        Error::ExtractionFailed { diagnostic, .. } => {
            assert!(diagnostic.contains("Can not open the file as archive"))
        }
        other => panic!("expected ExtractionFailed, got {:?}", other),
    }
    assert!(!dirs.root.join("Corrupt.epub").exists());
    assert_eq!(temp_dirs_left(prefix), 0);
    Ok(())
}

#[tokio::test]
async fn test_batch_isolates_failures() -> Result<()> {
    let dirs = setup_test_dirs();
    let first = dirs.fixtures.join("first");
    let third = dirs.fixtures.join("third");
    create_pages(&first, &["1.png", "2.png"]);
    create_pages(&third, &["1.png", "2.png", "3.png"]);

    touch_archive(&dirs.root, "Vol 1.cbr");
    touch_archive(&dirs.root, "Vol 2.cbr"); // no fixture: extraction fails
    touch_archive(&dirs.root, "Vol 10.cbr");
    std::fs::write(dirs.root.join("cover.jpg"), b"not an archive")?;

    let extractor = FixtureExtractor::new()
        .with_fixture("Vol 1.cbr", first)
        .with_fixture("Vol 10.cbr", third);
    let converter = Converter::new(config("hyoshi_it_batch_", false), Arc::new(extractor));

    let report = BatchRunner::new(converter).run(&dirs.root).await?;

    let order: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| o.archive().file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(order, vec!["Vol 1.cbr", "Vol 2.cbr", "Vol 10.cbr"]);
    assert!(report.outcomes[0].is_converted());
    assert!(matches!(report.outcomes[1], ArchiveOutcome::Failed(_)));
    assert!(report.outcomes[2].is_converted());
    assert_eq!(
        (report.converted(), report.skipped(), report.failed()),
        (2, 0, 1)
    );

    assert_valid_epub(&dirs.root.join("Vol 1.epub"));
    assert!(!dirs.root.join("Vol 2.epub").exists());
    assert_valid_epub(&dirs.root.join("Vol 10.epub"));
    assert_eq!(page_documents(&dirs.root.join("Vol 10.epub")).len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_batch_with_real_cbz() -> Result<()> {
    let dirs = setup_test_dirs();
    let paths = create_pages(&dirs.fixtures, &["p1.png", "p2.png", "p10.png"]);
    let bytes: Vec<Vec<u8>> = paths.iter().map(|p| std::fs::read(p).unwrap()).collect();

    // Stored out of order and below a wrapper folder, as real archives often are.
    write_cbz(
        &dirs.root.join("Real.cbz"),
        &[
            ("Real/p10.png", bytes[2].clone()),
            ("Real/p2.png", bytes[1].clone()),
            ("Real/p1.png", bytes[0].clone()),
            ("Real/ComicInfo.xml", b"<ComicInfo/>".to_vec()),
        ],
    );

    let config = config("hyoshi_it_cbz_", false);
    let extractor = config.extractor()?.shared();
    let report = BatchRunner::new(Converter::new(config, extractor))
        .run(&dirs.root)
        .await?;

    assert_eq!(report.converted(), 1);
    let epub = dirs.root.join("Real.epub");
    assert_valid_epub(&epub);
    assert_eq!(zip_entry_bytes(&epub, "images/cover.png").unwrap(), bytes[0]);
    assert_eq!(zip_entry_bytes(&epub, "images/0001.png").unwrap(), bytes[1]);
    assert_eq!(zip_entry_bytes(&epub, "images/0002.png").unwrap(), bytes[2]);
    Ok(())
}

#[tokio::test]
async fn test_batch_root_validation() -> Result<()> {
    let dirs = setup_test_dirs();
    let runner = BatchRunner::new(Converter::new(
        config("hyoshi_it_root_", false),
        Arc::new(FixtureExtractor::new()),
    ));

    let missing = runner.run(&dirs.root.join("missing")).await;
    assert!(matches!(missing, Err(Error::InvalidPath(_, _))));

    // No archives is a successful no-op.
    let report = runner.run(&dirs.root).await?;
    assert!(report.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_output_dir_override() -> Result<()> {
    let dirs = setup_test_dirs();
    let contents = dirs.fixtures.join("Out");
    create_pages(&contents, &["1.webp", "2.png"]);
    let archive = touch_archive(&dirs.root, "Out.cbr");
    let books = dirs.fixtures.join("books");
    std::fs::create_dir_all(&books)?;

    let config = HyoshiConfig::builder()
        .output_dir(books.clone())
        .temp_prefix("hyoshi_it_outdir_".to_string())
        .build()?;
    let extractor = FixtureExtractor::new().with_fixture("Out.cbr", contents);
    let output = Converter::new(config, Arc::new(extractor))
        .convert(&archive)
        .await
        .unwrap();

    assert_eq!(output.epub_path, books.join("Out.epub"));
    assert_valid_epub(&output.epub_path);
    assert!(zip_entry_bytes(&output.epub_path, "images/cover.webp").is_some());
    assert!(!dirs.root.join("Out.epub").exists());
    Ok(())
}

#[test]
fn test_missing_tool_is_fatal() {
    let config = HyoshiConfig::builder()
        .seven_zip_path(PathBuf::from("/definitely/not/here/7z"))
        .build()
        .unwrap();
    let error = Converter::from_config(config).unwrap_err();
    assert!(error.is_fatal());
}

#[test]
fn test_unresolved_tool_is_fatal_for_cbr() {
    let error = Converter::from_config(HyoshiConfig::builder().build().unwrap()).unwrap_err();
    assert!(error.is_fatal());
    assert!(error.to_string().contains("'.cbr'"));

    // Native .cbz extraction needs no external tool.
    let cbz_only = HyoshiConfig::builder()
        .archive_extensions(vec!["cbz".to_string()])
        .build()
        .unwrap();
    assert!(Converter::from_config(cbz_only).is_ok());
}

#[tokio::test]
async fn test_batch_rejects_archives_sharing_a_book_name() -> Result<()> {
    let dirs = setup_test_dirs();
    let cbr_pages = dirs.fixtures.join("cbr");
    let cbz_pages = dirs.fixtures.join("cbz");
    create_pages(&cbr_pages, &["1.png", "2.png"]);
    create_pages(&cbz_pages, &["1.png", "2.png", "3.png", "4.png"]);
    touch_archive(&dirs.root, "Dup.cbr");
    touch_archive(&dirs.root, "Dup.cbz");

    let extractor = FixtureExtractor::new()
        .with_fixture("Dup.cbr", cbr_pages)
        .with_fixture("Dup.cbz", cbz_pages);
    let converter = Converter::new(config("hyoshi_it_dup_", false), Arc::new(extractor));
    let report = BatchRunner::new(converter).run(&dirs.root).await?;

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes[0].is_converted());
    assert!(report.outcomes[0].archive().ends_with("Dup.cbr"));
    match &report.outcomes[1] {
        ArchiveOutcome::Failed(failure) => {
            assert!(failure.archive.ends_with("Dup.cbz"));
            assert_eq!(failure.stage, ConversionStage::Pending);
            assert!(matches!(failure.error, Error::InvalidPath(_, _)));
        }
        other => panic!("expected a rejected duplicate, got {:?}", other),
    }

    // The book still holds the first archive's pages.
    assert_eq!(page_documents(&dirs.root.join("Dup.epub")).len(), 1);
    Ok(())
}
