//! End-to-end tests of the subtitle pipeline with the real classifier.

use encoding_rs::{ISO_8859_2, WINDOWS_1250};
use importforged::subtitles::{
    check_extracted_subtitles, run_subtitle_tasks, SubtitleClassifier, SubtitlePolicy,
    TextClassifier,
};
use importforged_common::ConversionOutcome;
use tempfile::TempDir;

// Cedilla ş/ţ so the text survives the legacy code pages.
const ROMANIAN: &str = "1
00:00:01,000 --> 00:00:04,000
Bună seara şi bine aţi venit la ştirile de astăzi.

2
00:00:04,500 --> 00:00:08,000
Guvernul a anunţat că preţurile la pâine şi lapte vor creşte.

3
00:00:08,500 --> 00:00:12,000
Oamenii din ţară sunt îngrijoraţi, dar speră că situaţia se va îmbunătăţi.

4
00:00:12,500 --> 00:00:16,000
Mâine vremea va fi frumoasă, cu soare în toată ţara şi temperaturi plăcute.
";

const FRENCH: &str = "1
00:00:01,000 --> 00:00:04,000
Bonsoir et bienvenue aux informations d'aujourd'hui.

2
00:00:04,500 --> 00:00:08,000
Le gouvernement a annoncé que les prix du pain et du lait vont augmenter.

3
00:00:08,500 --> 00:00:12,000
Les gens sont inquiets, mais ils espèrent que la situation va s'améliorer.
";

fn policy() -> SubtitlePolicy {
    SubtitlePolicy::default()
}

#[test]
fn classifier_reports_legacy_romanian() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Film.srt");
    let (bytes, _, _) = ISO_8859_2.encode(ROMANIAN);
    std::fs::write(&path, &bytes).unwrap();

    let report = TextClassifier.detect(&path).unwrap();

    assert_eq!(report.language, "romanian");
    assert!(!report.is_utf8());
    assert!((0.0..=1.0).contains(&report.encoding_confidence));
}

#[tokio::test]
async fn legacy_sidecar_becomes_tagged_utf8_copy() {
    let dir = TempDir::new().unwrap();
    let video = dir.path().join("Film.2020.mkv");
    std::fs::write(&video, b"video").unwrap();
    let (bytes, _, _) = WINDOWS_1250.encode(ROMANIAN);
    std::fs::write(dir.path().join("Film.2020.srt"), &bytes).unwrap();

    let report = run_subtitle_tasks(&video, &policy(), &TextClassifier, None).await;

    let converted = dir.path().join("Film.2020.ro.srt");
    let (path, outcome) = report.external.expect("sidecar found");
    assert_eq!(path, dir.path().join("Film.2020.srt"));
    assert_eq!(outcome, ConversionOutcome::Converted(converted.clone()));
    assert_eq!(std::fs::read_to_string(&converted).unwrap(), ROMANIAN);
    assert!(!dir.path().join("Film.2020.srt").exists());
    assert!(dir.path().join("Film.2020.srt.archive").exists());
}

#[tokio::test]
async fn foreign_sidecar_is_left_untouched() {
    let dir = TempDir::new().unwrap();
    let video = dir.path().join("Film.mkv");
    std::fs::write(&video, b"video").unwrap();
    let sidecar = dir.path().join("Film.srt");
    std::fs::write(&sidecar, FRENCH).unwrap();

    let report = run_subtitle_tasks(&video, &policy(), &TextClassifier, None).await;

    assert!(!report.has_accepted());
    assert_eq!(std::fs::read_to_string(&sidecar).unwrap(), FRENCH);
    assert!(!dir.path().join("Film.ro.srt").exists());
    assert!(!dir.path().join("Film.srt.archive").exists());
}

#[test]
fn extracted_batch_keeps_first_romanian() {
    let dir = TempDir::new().unwrap();
    let french = dir.path().join("Film.2.fre.srt");
    let romanian = dir.path().join("Film.3.rum.srt");
    let trailing = dir.path().join("Film.4.fre.srt");
    std::fs::write(&french, FRENCH).unwrap();
    std::fs::write(&romanian, ROMANIAN).unwrap();
    std::fs::write(&trailing, FRENCH).unwrap();

    let results = check_extracted_subtitles(
        &[french.clone(), romanian.clone(), trailing.clone()],
        &TextClassifier,
        &policy(),
    );

    assert_eq!(results.len(), 2);
    assert!(!french.exists());
    assert_eq!(results[1], (romanian.clone(), ConversionOutcome::Kept(romanian.clone())));
    assert_eq!(std::fs::read_to_string(&romanian).unwrap(), ROMANIAN);
    assert!(trailing.exists());
}
