//! Name resolution through static skill headers, end to end.

use icon_extractor::names::headers::StaticHeaderSource;
use icon_extractor::names::{SkillIconSource, build_name_map};
use icon_extractor::text::LegacyDecoder;
use icon_extractor::{ImageCodec, MetadataIssue, NameSourceKind, resolve_names, run};

use crate::helpers::{Workspace, cell_colour, write_manifest, write_sheet};

fn write_headers(dir: &std::path::Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("skill1001.h"),
        "// Fire ball\r\nname = \"fire\"\r\nicon = \"FX_Fire.dds\",\r\n",
    )
    .unwrap();
    std::fs::write(dir.join("skill2002.h"), "Icon=\"fx_ice.DDS\"\n").unwrap();
    // Sorts before skill2002.h, so it claims the shared icon first.
    std::fs::write(dir.join("skill0500.h"), "icon=\"fx_ice.dds\"\nicon=\"bolt.dds\"\n").unwrap();
    std::fs::write(dir.join("readme.h"), "icon=\"nope.dds\"\n").unwrap();
}

#[test]
fn header_ids_name_the_output_files() {
    let ws = Workspace::new();
    let headers = ws.dir.path().join("skills_src");
    write_headers(&headers);
    write_sheet(&ws.sheet, 16, 2, 2);
    write_manifest(
        &ws.manifest,
        [16, 16, 32, 32],
        &["fx_fire.dds", "FX_ICE.dds", "bolt.dds", "unknown.dds"],
    );

    let report = run(&ws.request_with_headers(&headers), &ImageCodec, None).unwrap();

    assert!(report.all_succeeded());
    assert_eq!(
        ws.outputs(),
        vec!["0500.png", "1001.png", "sheet.png", "unknown.png"]
    );
    // fx_ice.dds and bolt.dds both map to 0500; the later one (bolt, cell 2) wins.
    assert_eq!(report.overwritten, 1);
    let shared = image::open(ws.out.join("0500.png")).unwrap().to_rgba8();
    assert!(shared.pixels().all(|p| *p == cell_colour(2)));

    assert!(report.items[0].resolved);
    assert!(!report.items[3].resolved);
    assert!(matches!(
        report.name_issues.as_slice(),
        [MetadataIssue::UnexpectedFileName { .. }]
    ));
}

#[test]
fn missing_header_directory_falls_back_to_manifest_names() {
    let ws = Workspace::new();
    write_sheet(&ws.sheet, 16, 1, 1);
    write_manifest(&ws.manifest, [16, 16, 16, 16], &["Fx_Fire.dds"]);

    let request = ws.request_with_headers(&ws.dir.path().join("absent"));
    let report = run(&request, &ImageCodec, None).unwrap();

    assert!(report.all_succeeded());
    assert!(ws.outputs().contains(&"fx_fire.png".to_owned()));
    assert!(matches!(
        report.name_issues.as_slice(),
        [MetadataIssue::SourceUnavailable { .. }]
    ));
}

#[test]
fn resolve_names_matches_direct_source() {
    let dir = tempfile::tempdir().unwrap();
    write_headers(dir.path());

    let mut source = StaticHeaderSource::new(dir.path(), "skill", "h", LegacyDecoder::default());
    let direct = build_name_map(&mut source);
    assert_eq!(source.label(), "static-headers");

    let mut config = icon_extractor::ExtractorConfig::default();
    config.names.source = NameSourceKind::StaticHeaders;
    config.names.headers.dir = Some(dir.path().to_path_buf());
    let resolved = resolve_names(&config.names, LegacyDecoder::default());

    assert_eq!(direct.map, resolved.map);
    assert_eq!(resolved.map.get("FX_FIRE.DDS"), Some("1001"));
    assert_eq!(resolved.map.get("fx_ice.dds"), Some("0500"));
    assert_eq!(resolved.map.len(), 3);
}

#[test]
fn custom_prefix_and_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("buff7.inc"), "icon = \"shield.dds\"\n").unwrap();
    std::fs::write(dir.path().join("skill8.h"), "icon = \"ignored.dds\"\n").unwrap();

    let mut config = icon_extractor::ExtractorConfig::default();
    config.names.source = NameSourceKind::StaticHeaders;
    config.names.headers.dir = Some(dir.path().to_path_buf());
    config.names.headers.prefix = "buff".to_owned();
    config.names.headers.extension = ".inc".to_owned();
    let build = resolve_names(&config.names, LegacyDecoder::default());

    assert_eq!(build.map.get("shield.dds"), Some("7"));
    assert!(!build.map.contains("ignored.dds"));
    assert!(build.issues.is_empty());
}
