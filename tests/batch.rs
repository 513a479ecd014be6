use std::{fs, path::Path};

use rs_wfa::batch::{self, BatchConfig, BatchOptions};

const CORPUS: &str = "\
>TCTTTACTCGCGCGTTGGAGAAATACAATAGT
<TCTATACTGCGCGTTTGGAGAAATAAAATAGT

>ACGTACGT
<ACGTTACGT
>
<ACGT
>GATTACA
<GCATGCT
";

const CONFIG: &str = r#"{
    "affine": {"penalties": {"m": 0, "x": 4, "o": 6, "e": 2}, "solutions": "affine.tsv"},
    "edit": {"penalties": {"m": 0, "x": 1, "o": 0, "e": 1}, "solutions": "edit.tsv"}
}"#;

fn write_fixture(dir: &Path, edit_solutions: &str) {
    fs::write(dir.join("config.json"), CONFIG).unwrap();
    fs::write(dir.join("sequences.seq"), CORPUS).unwrap();
    fs::write(
        dir.join("affine.tsv"),
        "-24\t3M1X4M1D7M1I9M1X6M\n-8\t4M1I4M\n-14\t4I\n-16\n",
    )
    .unwrap();
    fs::write(dir.join("edit.tsv"), edit_solutions).unwrap();
}

#[test]
fn test_batch_all_correct() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-4\n-1\n-4\n-4\n");

    let config = BatchConfig::load(dir.path().join("config.json")).unwrap();
    let corpus = batch::read_corpus(dir.path().join("sequences.seq")).unwrap();
    assert_eq!(corpus.len(), 4);

    let options = BatchOptions {
        verify_cigars: true,
        ..Default::default()
    };
    let reports = batch::run_batch(&config, &corpus, &options).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].name, "affine");
    assert_eq!(reports[1].name, "edit");
    for report in &reports {
        assert_eq!(report.total, 4);
        assert_eq!(report.correct, 4, "{report}");
        assert_eq!(report.invalid_cigars, 0);
        assert_eq!(report.accuracy(), 1.0);
        assert!(report.secs_per_char >= 0.0);
    }
}

#[test]
fn test_batch_counts_wrong_solutions() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-4\n-2\n-4\n-5\n");

    let config = BatchConfig::load(dir.path().join("config.json")).unwrap();
    let corpus = batch::read_corpus(dir.path().join("sequences.seq")).unwrap();
    let reports = batch::run_batch(&config, &corpus, &BatchOptions::default()).unwrap();
    assert_eq!(reports[0].correct, 4);
    assert_eq!(reports[1].correct, 2);
    assert_eq!(reports[1].accuracy(), 0.5);
}

#[test]
fn test_batch_limit() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "-4\n-1\n-4\n-4\n");

    let config = BatchConfig::load(dir.path().join("config.json")).unwrap();
    let corpus = batch::read_corpus(dir.path().join("sequences.seq")).unwrap();
    let options = BatchOptions {
        limit: Some(2),
        ..Default::default()
    };
    let reports = batch::run_batch(&config, &corpus, &options).unwrap();
    assert!(reports.iter().all(|report| report.total == 2));
}

#[test]
fn test_batch_missing_solutions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.json"), CONFIG).unwrap();
    let config = BatchConfig::load(dir.path().join("config.json")).unwrap();
    let corpus = batch::parse_corpus(CORPUS).unwrap();
    assert!(batch::run_batch(&config, &corpus, &BatchOptions::default()).is_err());
}

#[test]
fn test_batch_rejects_match_penalty() {
    let config = BatchConfig::from_json(
        r#"{"bad": {"penalties": {"m": 1, "x": 4, "o": 6, "e": 2}, "solutions": "x.tsv"}}"#,
        ".",
    )
    .unwrap();
    let corpus = batch::parse_corpus(CORPUS).unwrap();
    assert!(batch::run_batch(&config, &corpus, &BatchOptions::default()).is_err());
}
