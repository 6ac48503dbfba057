use std::io::Write;

use querykit::examples::models::{Artwork, Game};
use querykit::{ClientConfig, ConfigError};

#[test]
fn loads_config_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[query]
warn_on_registry_miss = false

[endpoints]
Artwork = "artworks_archive"
"#
    )
    .unwrap();

    let config = ClientConfig::load(file.path()).unwrap();
    assert!(!config.query.warn_on_registry_miss);
    assert_eq!(config.endpoint_for::<Artwork>(), Some("artworks_archive"));
    assert_eq!(config.endpoint_for::<Game>(), Some("games"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClientConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
