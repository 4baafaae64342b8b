//! End-to-end runs over a locale directory, with the mock translator as backend

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use locale_sync::{load_locale_set, load_override_document};
use locale_sync_mt::{
    ClientPool, MachineTranslator, MockCall, MockMode, MockTranslator, MtError, SyncOptions,
    Synchronizer,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

fn pool_over(mocks: &[Arc<MockTranslator>]) -> ClientPool {
    let clients = mocks
        .iter()
        .map(|m| Arc::clone(m) as Arc<dyn MachineTranslator>)
        .collect();
    ClientPool::new(clients, Duration::from_secs(5)).unwrap()
}

fn seed(dir: &Path) {
    write(
        dir,
        "en-US.json",
        r#"{
            "app": { "title": "Notes", "empty": "" },
            "menu": { "open": "Open", "save": "Save" },
            "greeting": "Hello"
        }"#,
    );
    write(
        dir,
        "fr.json",
        r#"{
            "menu": { "open": "Ouvrir", "save": "!fix me" },
            "greeting": "hello",
            "legacy": "Ancien"
        }"#,
    );
    write(dir, "de.json", r#"{ "app": { "title": "Notizen" } }"#);
    write(dir, "README.json", r#"{ "not": "a locale" }"#);
}

#[tokio::test]
async fn test_directory_sync_in_batches() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
    let pool = pool_over(&[Arc::clone(&mock)]);
    let mut set = load_locale_set(dir.path(), "en-US.json").unwrap();
    assert_eq!(set.skipped.len(), 1);

    let options = SyncOptions {
        batch_size: 2,
        ..Default::default()
    };
    let report = Synchronizer::new(&pool, options)
        .run(&set.source, &mut set.targets, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.succeeded(), 2);

    // de is processed first (sorted by file name): title kept, three keys missing
    // fr: title missing, save marked, greeting is a copy of the source
    assert_eq!(
        mock.calls(),
        vec![
            MockCall::Batch(vec!["Open".into(), "Save".into()]),
            MockCall::Batch(vec!["Hello".into()]),
            MockCall::Batch(vec!["Notes".into(), "Save".into()]),
            MockCall::Batch(vec!["Hello".into()]),
        ]
    );

    assert_eq!(
        read(dir.path(), "de.json"),
        r#"{
  "app": {
    "title": "Notizen"
  },
  "greeting": "Hello_Deutsch",
  "menu": {
    "open": "Open_Deutsch",
    "save": "Save_Deutsch"
  }
}
"#
    );
    assert_eq!(
        read(dir.path(), "fr.json"),
        r#"{
  "app": {
    "title": "Notes_français"
  },
  "greeting": "Hello_français",
  "legacy": "Ancien",
  "menu": {
    "open": "Ouvrir",
    "save": "Save_français"
  }
}
"#
    );
    // The source and unrelated files are never touched
    assert!(read(dir.path(), "en-US.json").contains("\"empty\": \"\""));
    assert_eq!(read(dir.path(), "README.json"), r#"{ "not": "a locale" }"#);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());

    let first_mock = Arc::new(MockTranslator::new(MockMode::Suffix));
    let pool = pool_over(&[first_mock]);
    let mut set = load_locale_set(dir.path(), "en-US.json").unwrap();
    Synchronizer::new(&pool, SyncOptions::default())
        .run(&set.source, &mut set.targets, &CancellationToken::new())
        .await
        .unwrap();
    let fr_after_first = read(dir.path(), "fr.json");
    let de_after_first = read(dir.path(), "de.json");

    let second_mock = Arc::new(MockTranslator::new(MockMode::Suffix));
    let pool = pool_over(&[Arc::clone(&second_mock)]);
    let mut set = load_locale_set(dir.path(), "en-US.json").unwrap();
    Synchronizer::new(&pool, SyncOptions::default())
        .run(&set.source, &mut set.targets, &CancellationToken::new())
        .await
        .unwrap();

    assert!(second_mock.calls().is_empty());
    assert_eq!(read(dir.path(), "fr.json"), fr_after_first);
    assert_eq!(read(dir.path(), "de.json"), de_after_first);
}

#[tokio::test]
async fn test_overrides_are_applied_to_every_target() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let pins = dir.path().join("pins");
    fs::create_dir(&pins).unwrap();
    write(&pins, "overrides.json", r#"{ "app": { "title": "Notes™" } }"#);

    let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
    let pool = pool_over(&[Arc::clone(&mock)]);
    let overrides = load_override_document(&pins.join("overrides.json")).unwrap();
    let mut set = load_locale_set(dir.path(), "en-US.json").unwrap();

    Synchronizer::new(&pool, SyncOptions::default())
        .with_overrides(&overrides)
        .run(&set.source, &mut set.targets, &CancellationToken::new())
        .await
        .unwrap();

    // de has the key, so the pin replaces the existing translation
    assert!(read(dir.path(), "de.json").contains("\"title\": \"Notes™\""));
    // fr lacks the key entirely, which is translated first
    assert!(read(dir.path(), "fr.json").contains("\"title\": \"Notes_français\""));
    // staleness checks are off for existing keys while overrides are in use
    assert!(read(dir.path(), "fr.json").contains("\"save\": \"!fix me\""));
}

#[tokio::test]
async fn test_failed_document_is_not_written() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let fr_before = read(dir.path(), "fr.json");
    let de_before = read(dir.path(), "de.json");

    let mock = Arc::new(MockTranslator::new(MockMode::Error("server error".into())));
    let pool = pool_over(&[mock]);
    let mut set = load_locale_set(dir.path(), "en-US.json").unwrap();

    let report = Synchronizer::new(&pool, SyncOptions::default())
        .run(&set.source, &mut set.targets, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.failed(), 2);
    assert_eq!(read(dir.path(), "fr.json"), fr_before);
    assert_eq!(read(dir.path(), "de.json"), de_before);
}

#[tokio::test]
async fn test_keys_rotate_across_clients() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "en.json", r#"{ "a": "A", "b": "B", "c": "C" }"#);
    write(dir.path(), "es.json", "{}");

    let mocks: Vec<Arc<MockTranslator>> = (0..2)
        .map(|_| Arc::new(MockTranslator::new(MockMode::Suffix)))
        .collect();
    let pool = pool_over(&mocks);
    let mut set = load_locale_set(dir.path(), "en.json").unwrap();

    Synchronizer::new(&pool, SyncOptions::default())
        .run(&set.source, &mut set.targets, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        mocks[0].calls(),
        vec![MockCall::Single("A".into()), MockCall::Single("C".into())]
    );
    assert_eq!(mocks[1].calls(), vec![MockCall::Single("B".into())]);
    assert_eq!(
        read(dir.path(), "es.json"),
        "{\n  \"a\": \"A_español\",\n  \"b\": \"B_español\",\n  \"c\": \"C_español\"\n}\n"
    );
}

#[tokio::test]
async fn test_cancel_during_request_writes_nothing() {
    let dir = TempDir::new().unwrap();
    seed(dir.path());
    let fr_before = read(dir.path(), "fr.json");
    let de_before = read(dir.path(), "de.json");

    let mock: Arc<dyn MachineTranslator> =
        Arc::new(MockTranslator::with_delay(MockMode::Suffix, 10_000));
    let pool = ClientPool::new(vec![mock], Duration::from_secs(60)).unwrap();
    let mut set = load_locale_set(dir.path(), "en-US.json").unwrap();
    let targets_before = set.targets.clone();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = Synchronizer::new(&pool, SyncOptions::default())
        .run(&set.source, &mut set.targets, &cancel)
        .await;

    assert!(matches!(result, Err(MtError::Cancelled)));
    assert_eq!(read(dir.path(), "de.json"), de_before);
    assert_eq!(read(dir.path(), "fr.json"), fr_before);
    assert_eq!(set.targets, targets_before);
}
