//! Config file round trips and request derivation.

use std::path::PathBuf;

use icon_extractor::{ExtractorConfig, GridUnit, NameSourceKind};

#[test]
fn written_config_drives_a_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[input]
sheet = "iconlist_ivtrm.dds"
manifest = "iconlist_ivtrm.txt"

[output]
dir = "icons"
snapshot_dir = "snapshots"

[names]
source = "static-headers"

[names.headers]
dir = "skills_src"

[grid]
unit = "cells"

[text]
encoding = "gbk"
"#,
    )
    .unwrap();

    let config = ExtractorConfig::from_file(&path).unwrap();
    let request = config.to_request().unwrap();
    assert_eq!(request.sheet, Some(PathBuf::from("iconlist_ivtrm.dds")));
    assert_eq!(request.output_dir, Some(PathBuf::from("icons")));
    assert_eq!(request.snapshot_dir, Some(PathBuf::from("snapshots")));
    assert_eq!(request.names.source, NameSourceKind::StaticHeaders);
    assert_eq!(request.names.headers.prefix, "skill");
    assert_eq!(request.grid_unit, GridUnit::Cells);
    assert_eq!(request.decoder.name(), "GBK");
}

#[test]
fn default_config_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("config.toml");
    ExtractorConfig::default().save_to_file(&path).unwrap();

    let loaded = ExtractorConfig::from_file(&path).unwrap();
    assert_eq!(loaded.names.native.first_id, 1);
    assert_eq!(loaded.names.native.last_id, 10_000);
    assert_eq!(loaded.text.encoding, "gb18030");
    assert!(loaded.output.snapshot);
    assert!(loaded.input.sheet.is_none());
}
