//! Integration tests for directory-level conversion.
//!
//! Tests cover:
//! - Destination creation and empty source directories
//! - Per-file failures not stopping the batch
//! - Counters and the on-disk verification count
//! - Progress observer events

mod common;

use common::*;

#[test]
fn test_empty_source_creates_destination_and_reports_zero() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = dir.path().join("train_annotations");
    std::fs::create_dir(&source)?;
    let destination = dir.path().join("labels").join("train");

    let split = Split::new("train", &source, &destination);
    let report = convert_batch(&split, &Taxonomy::neu_steel(), &mut SilentProgress)?;

    assert!(destination.is_dir());
    assert_eq!(report.discovered, 0);
    assert_eq!(report.converted, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.verified, 0);
    Ok(())
}

#[test]
fn test_missing_source_directory_is_treated_as_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let split = Split::new("valid", dir.path().join("nowhere"), dir.path().join("labels/val"));

    let report = convert_batch(&split, &Taxonomy::neu_steel(), &mut SilentProgress)?;

    assert_eq!(report.discovered, 0);
    assert!(dir.path().join("labels/val").is_dir());
    Ok(())
}

#[test]
fn test_mixed_batch_counts_and_continues_after_failures() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = dir.path().join("src");
    let destination = dir.path().join("dst");
    std::fs::create_dir(&source)?;

    write_file(&source, "a_good.xml", &voc_xml(200, 100, &[("crazing", 50.0, 20.0, 150.0, 80.0)]));
    write_file(&source, "b_broken.xml", &voc_xml_without_size());
    write_file(&source, "c_unknown.xml", &voc_xml(200, 100, &[("oxidation", 0.0, 0.0, 5.0, 5.0)]));
    write_file(&source, "d_good.xml", &voc_xml(100, 100, &[("patches", 0.0, 0.0, 100.0, 100.0)]));
    write_file(&source, "notes.txt", "not a descriptor");

    let mut progress = RecordingProgress::default();
    let split = Split::new("train", &source, &destination);
    let report = convert_batch(&split, &Taxonomy::neu_steel(), &mut progress)?;

    assert_eq!(report.discovered, 4);
    assert_eq!(report.converted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.verified, report.converted);
    assert_eq!(file_names(&destination), vec!["a_good.txt", "d_good.txt"]);
    assert_eq!(
        std::fs::read_to_string(destination.join("a_good.txt"))?,
        "0 0.500000 0.400000 0.500000 0.600000\n"
    );

    assert_eq!(progress.started, vec![("train".to_string(), 4)]);
    assert_eq!(progress.processed, vec![1, 2, 3, 4]);
    assert_eq!(progress.failed, vec![source.join("b_broken.xml")]);
    assert_eq!(progress.finished, vec![report]);
    Ok(())
}

#[test]
fn test_output_count_matches_converted_count() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = dir.path().join("src");
    let destination = dir.path().join("dst");
    std::fs::create_dir(&source)?;

    for i in 0..25 {
        let regions: Vec<TestRegion> = if i % 3 == 0 {
            vec![("oxidation", 0.0, 0.0, 10.0, 10.0)]
        } else {
            vec![("scratches", i as f64, 0.0, 100.0, 100.0)]
        };
        write_file(&source, &format!("img_{:03}.xml", i), &voc_xml(200, 200, &regions));
    }

    let split = Split::new("train", &source, &destination);
    let report = convert_batch(&split, &Taxonomy::neu_steel(), &mut SilentProgress)?;

    assert_eq!(report.discovered, 25);
    assert_eq!(report.converted, 16);
    assert_eq!(report.verified, 16);
    assert_eq!(file_names(&destination).len(), report.converted);
    Ok(())
}

#[test]
fn test_two_splits_are_independent() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let train_src = dir.path().join("train_annotations");
    let valid_src = dir.path().join("valid_annotations");
    std::fs::create_dir(&train_src)?;
    std::fs::create_dir(&valid_src)?;

    write_file(&train_src, "t1.xml", &voc_xml(100, 100, &[("crazing", 0.0, 0.0, 50.0, 50.0)]));
    write_file(&train_src, "t2.xml", &voc_xml(100, 100, &[("inclusion", 0.0, 0.0, 50.0, 50.0)]));
    write_file(&valid_src, "v1.xml", &voc_xml(100, 100, &[("scratches", 0.0, 0.0, 50.0, 50.0)]));

    let taxonomy = Taxonomy::neu_steel();
    let train = Split::new("train", &train_src, dir.path().join("labels/train"));
    let valid = Split::new("valid", &valid_src, dir.path().join("labels/val"));

    let train_report = convert_batch(&train, &taxonomy, &mut SilentProgress)?;
    let valid_report = convert_batch(&valid, &taxonomy, &mut SilentProgress)?;

    assert_eq!((train_report.discovered, train_report.converted, train_report.verified), (2, 2, 2));
    assert_eq!((valid_report.discovered, valid_report.converted, valid_report.verified), (1, 1, 1));
    assert_eq!(file_names(&dir.path().join("labels/val")), vec!["v1.txt"]);
    Ok(())
}

#[test]
fn test_rerun_produces_identical_outputs() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = dir.path().join("src");
    std::fs::create_dir(&source)?;
    write_file(&source, "x.xml", &voc_xml(640, 480, &[("crazing", 12.0, 34.0, 560.0, 470.0)]));

    let taxonomy = Taxonomy::neu_steel();
    convert_batch(&Split::new("a", &source, dir.path().join("a")), &taxonomy, &mut SilentProgress)?;
    convert_batch(&Split::new("b", &source, dir.path().join("b")), &taxonomy, &mut SilentProgress)?;

    assert_eq!(
        std::fs::read(dir.path().join("a/x.txt"))?,
        std::fs::read(dir.path().join("b/x.txt"))?
    );
    Ok(())
}

#[test]
fn test_destination_that_is_a_file_is_fatal() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = dir.path().join("src");
    std::fs::create_dir(&source)?;
    write_file(&source, "x.xml", &voc_xml(100, 100, &[("crazing", 0.0, 0.0, 10.0, 10.0)]));
    let blocker = write_file(dir.path(), "labels", "a file, not a directory");

    let mut progress = RecordingProgress::default();
    let split = Split::new("train", &source, blocker.join("train"));
    let result = convert_batch(&split, &Taxonomy::neu_steel(), &mut progress);

    assert!(matches!(result, Err(ConvertError::CreateDestination { .. })));
    assert!(progress.started.is_empty());
    Ok(())
}
