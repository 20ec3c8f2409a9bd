use ferry_core::archive::Archiver;
use ferry_core::config::ArchiveTools;
use ferry_core::{compress, extract, ArchiveType, Error, Resource};
use ferry_testing::fixtures::{create_dataset_dir, create_two_file_dir};
use ferry_testing::{assert_dirs_equal, TestDir};
use flate2::read::GzDecoder;
use std::fs;
use std::path::PathBuf;

fn archive_entries(path: &std::path::Path) -> Vec<PathBuf> {
    let file = fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut entries: Vec<PathBuf> = archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().into_owned())
        .map(|path| PathBuf::from(path.to_string_lossy().trim_end_matches('/')))
        .collect();
    entries.sort();
    entries
}

#[tokio::test]
async fn test_tar_gz_round_trip() {
    let test_dir = TestDir::new().unwrap();
    let payload = create_two_file_dir(&test_dir, "payload").unwrap();

    let archive = test_dir.resource("out/payload.tar.gz");
    let result = compress(&Resource::from_path(&payload), &archive).await.unwrap();
    assert_eq!(result.archive_type(), ArchiveType::TarGz);
    assert!(archive.as_path().is_file());

    let extracted = test_dir.resource("extracted");
    extract(&archive, &extracted).await.unwrap();

    assert_dirs_equal(&payload, &extracted.as_path().join("payload")).unwrap();
}

#[tokio::test]
async fn test_tar_archive_has_relative_entries() {
    let test_dir = TestDir::new().unwrap();
    let payload = create_two_file_dir(&test_dir, "payload").unwrap();
    let archive = test_dir.resource("payload.tar.gz");

    compress(&Resource::from_path(&payload), &archive).await.unwrap();

    assert_eq!(
        archive_entries(&archive.as_path()),
        vec![
            PathBuf::from("payload"),
            PathBuf::from("payload/a"),
            PathBuf::from("payload/b"),
        ]
    );
}

#[tokio::test]
async fn test_archive_inside_source_excludes_itself() {
    let test_dir = TestDir::new().unwrap();
    let payload = create_two_file_dir(&test_dir, "payload").unwrap();
    let archive = test_dir.resource("payload/self.tar.gz");

    compress(&Resource::from_path(&payload), &archive).await.unwrap();

    let entries = archive_entries(&archive.as_path());
    assert!(!entries.iter().any(|entry| entry.ends_with("self.tar.gz")));
    assert!(entries.contains(&PathBuf::from("payload/a")));
}

#[tokio::test]
async fn test_plain_tar_and_bzip_round_trip() {
    let test_dir = TestDir::new().unwrap();
    let dataset = create_dataset_dir(&test_dir, "dataset").unwrap();

    for name in ["dataset.tar", "dataset.tar.bz2"] {
        let archive = test_dir.resource(name);
        compress(&Resource::from_path(&dataset), &archive).await.unwrap();

        let extracted = test_dir.resource(&format!("from-{}", name));
        extract(&archive, &extracted).await.unwrap();
        assert_dirs_equal(&dataset, &extracted.as_path().join("dataset")).unwrap();
    }
}

#[tokio::test]
async fn test_same_type_is_copied_without_tools() {
    let test_dir = TestDir::new().unwrap();
    let source = test_dir
        .create_file("in.tar.gz", b"not really an archive, but never opened")
        .unwrap();
    let destination = test_dir.resource("nested/copy.tgz");

    let missing = "ferry-test-no-such-tool".to_string();
    let archiver = Archiver::new(ArchiveTools {
        tar: missing.clone(),
        gzip: missing.clone(),
        gunzip: missing.clone(),
        zip: missing.clone(),
        unzip: missing,
    });
    archiver
        .compress(&Resource::from_path(&source), &destination)
        .await
        .unwrap();

    assert_eq!(
        fs::read(&source).unwrap(),
        fs::read(destination.as_path()).unwrap()
    );
}

#[tokio::test]
async fn test_directory_with_archive_name_is_packed() {
    let test_dir = TestDir::new().unwrap();
    let payload = create_two_file_dir(&test_dir, "data.tar").unwrap();
    let source = Resource::from_path(&payload);
    assert_eq!(source.archive_type(), ArchiveType::TarPlain);

    let archive = test_dir.resource("out.tar");
    compress(&source, &archive).await.unwrap();
    assert!(archive.as_path().is_file());

    let extracted = test_dir.resource("extracted");
    extract(&archive, &extracted).await.unwrap();
    assert_dirs_equal(&payload, &extracted.as_path().join("data.tar")).unwrap();
}

#[tokio::test]
async fn test_zip_round_trip() {
    let test_dir = TestDir::new().unwrap();
    let dataset = create_dataset_dir(&test_dir, "dataset").unwrap();

    let archive = test_dir.resource("packed/dataset.zip");
    let result = compress(&Resource::from_path(&dataset), &archive).await.unwrap();
    assert_eq!(result.archive_type(), ArchiveType::Zip);
    assert!(archive.as_path().is_file());

    // extraction creates the missing destination
    let extracted = test_dir.resource("unpacked/nested");
    extract(&archive, &extracted).await.unwrap();
    assert_dirs_equal(&dataset, &extracted.as_path().join("dataset")).unwrap();
}

#[tokio::test]
async fn test_gzip_rejects_directories() {
    let test_dir = TestDir::new().unwrap();
    let payload = create_two_file_dir(&test_dir, "payload").unwrap();
    let source = Resource::from_path(&payload);

    let err = compress(&source, &test_dir.resource("out.gz")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "unexpected error: {}", err);
    assert!(err.to_string().contains("use .tar.gz extension instead"));

    compress(&source, &test_dir.resource("out.tar.gz")).await.unwrap();
}

#[tokio::test]
async fn test_gzip_round_trip_renames_into_place() {
    let test_dir = TestDir::new().unwrap();
    let original = test_dir.create_file("data.csv", b"id,value\n1,2\n").unwrap();
    let archive = test_dir.resource("packed/renamed.csv.gz");

    compress(&Resource::from_path(&original), &archive).await.unwrap();
    assert!(archive.as_path().is_file());
    assert!(!test_dir.join("packed/data.csv.gz").exists());

    let restored = test_dir.create_dir("restored").unwrap();
    let result = extract(&archive, &Resource::from_path(&restored)).await.unwrap();

    assert_eq!(result.as_path(), restored.join("renamed.csv"));
    assert_eq!(fs::read(result.as_path()).unwrap(), b"id,value\n1,2\n");
    // only the result is left behind, no staging directories
    assert_eq!(fs::read_dir(&restored).unwrap().count(), 1);
}

#[tokio::test]
async fn test_unknown_extension_lists_supported() {
    let test_dir = TestDir::new().unwrap();
    let payload = create_two_file_dir(&test_dir, "payload").unwrap();

    let err = compress(&Resource::from_path(&payload), &test_dir.resource("out.rar"))
        .await
        .unwrap_err();
    match err {
        Error::UnsupportedArchiveType { supported, .. } => {
            assert!(supported.contains(&".tar.gz"));
            assert!(supported.contains(&".zip"));
        }
        other => panic!("unexpected error: {}", other),
    }
}
