use chrono::NaiveDate;
use fragments::{
    CollectOptions, EntryFormat, Error, FragmentsConfig, collect_entries, create_entry,
    fragment_files,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn release_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 3).unwrap()
}

fn options(version: Option<&str>) -> CollectOptions {
    CollectOptions {
        version: version.map(str::to_string),
        keep: false,
        date: Some(release_day()),
    }
}

fn write_fragment(root: &Path, name: &str, text: &str) {
    let dir = root.join("changelog.d");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), text).unwrap();
}

fn create_markdown_project(root: &Path) {
    write_fragment(root, "20240101_1000_alice.md", "### Fixed\n\n- Fixed A.\n");
    write_fragment(
        root,
        "20240102_1000_bob_feature.md",
        "<!-- notes -->\n### Added\n\n- Added B.\n\n### Fixed\n\n- Fixed C.\n",
    );
    write_fragment(root, "README.md", "# Entries live here\n");
    fs::write(
        root.join("CHANGELOG.md"),
        "# Changelog\n\n<!-- fragments-insert-here -->\n\n# 1.0.0 - 2023-12-01\n\n## Fixed\n\n- Old fix.\n",
    )
    .unwrap();
}

#[test]
fn test_integration_collect_markdown() {
    let temp_dir = TempDir::new().unwrap();
    create_markdown_project(temp_dir.path());
    let config = FragmentsConfig::default();

    let report = collect_entries(&config, temp_dir.path(), &options(Some("v1.1.0"))).unwrap();

    assert_eq!(report.title, "v1.1.0 - 2024-02-03");
    assert_eq!(report.fragments.len(), 2);
    assert!(report.removed);
    assert!(!report.prerelease);
    assert_eq!(report.version.as_ref().unwrap().to_text(), "v1.1.0");

    let changelog = fs::read_to_string(temp_dir.path().join("CHANGELOG.md")).unwrap();
    assert_eq!(
        changelog,
        "# Changelog\n\n<!-- fragments-insert-here -->\n\n\
         # v1.1.0 - 2024-02-03\n\n\
         ## Added\n\n- Added B.\n\n\
         ## Fixed\n\n- Fixed A.\n- Fixed C.\n\n\n\
         # 1.0.0 - 2023-12-01\n\n## Fixed\n\n- Old fix.\n"
    );

    // collected fragments are gone, the readme stays
    let dir = temp_dir.path().join("changelog.d");
    assert!(!dir.join("20240101_1000_alice.md").exists());
    assert!(!dir.join("20240102_1000_bob_feature.md").exists());
    assert!(dir.join("README.md").exists());
}

#[test]
fn test_integration_collect_rejects_existing_version() {
    let temp_dir = TempDir::new().unwrap();
    create_markdown_project(temp_dir.path());
    let config = FragmentsConfig::default();

    // "v1.0.0" names the same version as the "1.0.0" heading
    let result = collect_entries(&config, temp_dir.path(), &options(Some("v1.0.0")));
    assert!(matches!(result, Err(Error::VersionExists { .. })));

    // nothing was touched
    assert_eq!(fragment_files(&config, temp_dir.path()).unwrap().len(), 2);
    let changelog = fs::read_to_string(temp_dir.path().join("CHANGELOG.md")).unwrap();
    assert!(!changelog.contains("2024-02-03"));
}

#[test]
fn test_integration_collect_keep_and_prerelease() {
    let temp_dir = TempDir::new().unwrap();
    create_markdown_project(temp_dir.path());
    let config = FragmentsConfig::default();

    let mut opts = options(Some("release 2.0.0rc1 candidate"));
    opts.keep = true;
    let report = collect_entries(&config, temp_dir.path(), &opts).unwrap();

    assert_eq!(report.title, "2.0.0rc1 - 2024-02-03");
    assert!(report.prerelease);
    assert!(!report.removed);
    assert_eq!(fragment_files(&config, temp_dir.path()).unwrap().len(), 2);
}

#[test]
fn test_integration_collect_without_fragments() {
    let temp_dir = TempDir::new().unwrap();
    let config = FragmentsConfig::default();

    let result = collect_entries(&config, temp_dir.path(), &options(None));
    assert!(matches!(result, Err(Error::NothingToCollect { .. })));
    assert!(!temp_dir.path().join("CHANGELOG.md").exists());
}

#[test]
fn test_integration_collect_bad_version_text() {
    let temp_dir = TempDir::new().unwrap();
    create_markdown_project(temp_dir.path());
    let config = FragmentsConfig::default();

    let result = collect_entries(&config, temp_dir.path(), &options(Some("the next one")));
    assert!(matches!(result, Err(Error::VersionNotFound { .. })));
}

#[test]
fn test_integration_collect_rst_into_new_changelog() {
    let temp_dir = TempDir::new().unwrap();
    let config = FragmentsConfig::default().format(EntryFormat::Rst);
    write_fragment(
        temp_dir.path(),
        "20240101_1000_alice.rst",
        ".. A comment.\n\nFixed\n-----\n\n- Fixed it.\n",
    );
    write_fragment(temp_dir.path(), "20240101_1001_alice.md", "### Added\n\n- Wrong format.\n");

    let report = collect_entries(&config, temp_dir.path(), &options(None)).unwrap();
    assert_eq!(report.title, "2024-02-03");
    assert_eq!(report.fragments.len(), 1);
    assert_eq!(report.output_file, temp_dir.path().join("CHANGELOG.rst"));

    let changelog = fs::read_to_string(temp_dir.path().join("CHANGELOG.rst")).unwrap();
    assert_eq!(
        changelog,
        "2024-02-03\n==========\n\nFixed\n-----\n\n- Fixed it.\n\n"
    );
}

#[test]
fn test_integration_collect_uses_configured_version_and_order() {
    let temp_dir = TempDir::new().unwrap();
    let config = FragmentsConfig::default()
        .categories(vec!["Security".to_string(), "Fixed".to_string()])
        .version_text("__version__ = \"0.9.1\"")
        .insert_marker("INSERT");
    write_fragment(
        temp_dir.path(),
        "20240101_1000_alice.md",
        "### Other\n\n- Misc.\n\n### Fixed\n\n- Fix.\n\n### Security\n\n- Patch.\n",
    );

    let report = collect_entries(&config, temp_dir.path(), &options(None)).unwrap();
    assert_eq!(report.title, "0.9.1 - 2024-02-03");

    let changelog = fs::read_to_string(temp_dir.path().join("CHANGELOG.md")).unwrap();
    assert_eq!(
        changelog,
        "# 0.9.1 - 2024-02-03\n\n\
         ## Security\n\n- Patch.\n\n\
         ## Fixed\n\n- Fix.\n\n\
         ## Other\n\n- Misc.\n\n"
    );
}

#[test]
fn test_integration_create_then_collect() {
    let temp_dir = TempDir::new().unwrap();
    let config = FragmentsConfig::default();
    let now = release_day().and_hms_opt(9, 30, 0).unwrap();

    let path = create_entry(&config, temp_dir.path(), "carol", Some("carol/docs"), now).unwrap();
    assert_eq!(
        path,
        temp_dir.path().join("changelog.d/20240203_0930_carol_docs.md")
    );

    // fill in one category the way a contributor would
    fs::write(&path, "### Changed\n\n- Changed the docs.\n").unwrap();

    let report = collect_entries(&config, temp_dir.path(), &options(Some("3.0"))).unwrap();
    assert_eq!(report.fragments, vec![path.clone()]);
    assert!(!path.exists());

    let changelog = fs::read_to_string(&report.output_file).unwrap();
    assert!(changelog.starts_with("# 3.0 - 2024-02-03\n\n## Changed\n\n- Changed the docs.\n"));
}
