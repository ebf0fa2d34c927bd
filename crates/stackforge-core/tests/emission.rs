//! Writing generated projects to disk and into archives

use stackforge_core::{
    generate, ArchiveSink, BuiltinRenderer, Configuration, Database, EmailProvider, Feature,
    Framework, Frontend, FsSink, SinkError,
};
use std::collections::BTreeSet;
use std::io::Cursor;
use walkdir::WalkDir;

fn full_configuration(name: &str) -> Configuration {
    Configuration::new(name)
        .with_framework(Framework::Express)
        .with_database(Database::Postgres)
        .with_features(Feature::ALL)
        .with_email_provider(EmailProvider::Resend)
        .with_frontend(Frontend::React)
}

#[tokio::test]
async fn test_directory_matches_tree() {
    let dir = tempfile::tempdir().unwrap();
    let generation = generate(&full_configuration("acme-api"), &BuiltinRenderer).unwrap();

    let mut sink = FsSink::create(dir.path(), "acme-api").await.unwrap();
    let report = generation.emit(&mut sink).await.unwrap();
    assert_eq!(report.written, generation.tree.len());
    assert_eq!(report.bytes, generation.tree.total_bytes());

    let root = dir.path().join("acme-api");
    let on_disk: BTreeSet<String> = WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    let expected: BTreeSet<String> = generation.tree.paths().map(String::from).collect();
    assert_eq!(on_disk, expected);

    for (path, content) in generation.tree.iter() {
        assert_eq!(std::fs::read_to_string(root.join(path)).unwrap(), content);
    }
}

#[tokio::test]
async fn test_existing_project_directory_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("acme-api")).unwrap();
    std::fs::write(dir.path().join("acme-api/keep.txt"), "mine").unwrap();

    let err = FsSink::create(dir.path(), "acme-api").await.unwrap_err();
    assert!(matches!(err, SinkError::TargetExists(_)));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("acme-api/keep.txt")).unwrap(),
        "mine"
    );
}

#[tokio::test]
async fn test_second_emission_stops_at_first_file() {
    let dir = tempfile::tempdir().unwrap();
    let generation = generate(&full_configuration("svc"), &BuiltinRenderer).unwrap();

    let mut sink = FsSink::create(dir.path(), "svc").await.unwrap();
    generation.emit(&mut sink).await.unwrap();

    // Same sink again: the first write hits an existing file
    let err = generation.emit(&mut sink).await.unwrap_err();
    assert_eq!(err.written, 0);
    assert_eq!(err.path, generation.tree.paths().next().unwrap());
    assert!(matches!(err.source, SinkError::FileExists(_)));
}

#[tokio::test]
async fn test_archive_holds_every_file_under_project_prefix() {
    let generation = generate(&full_configuration("acme-api"), &BuiltinRenderer).unwrap();
    let mut sink = ArchiveSink::new("acme-api");
    generation.emit(&mut sink).await.unwrap();

    let bytes = sink.finish().unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: BTreeSet<String> = archive.file_names().map(String::from).collect();
    let expected: BTreeSet<String> = generation
        .tree
        .paths()
        .map(|p| format!("acme-api/{}", p))
        .collect();
    assert_eq!(names, expected);
}
