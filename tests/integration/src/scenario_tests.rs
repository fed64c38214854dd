//! End-to-end publishing scenarios against the library pipeline.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use xpi_manifest::{Error, LinkSource, RunOptions, run};
use xpi_test_utils::{TestWorkspace, XpiBuilder, sha256_hex};

const TEMPLATE: &str = "https://h/@version@";

fn options(ws: &TestWorkspace, archive: &str) -> RunOptions {
    RunOptions {
        archive: ws.path(archive),
        update_in: Some(ws.path("updates.json")),
        update_out: Some(ws.path("updates.json")),
        update_link: None,
    }
}

fn updates(ws: &TestWorkspace, addon: &str) -> Vec<Value> {
    ws.read_json("updates.json")["addons"][addon]["updates"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

#[tokio::test]
async fn empty_manifest_gets_first_version() {
    let ws = TestWorkspace::new();
    let xpi = ws.write_xpi("ext.xpi", XpiBuilder::new().descriptor("ext@x", "1.0").signed());
    let hash = sha256_hex(&std::fs::read(&xpi).unwrap());

    let summary = run(&RunOptions {
        update_in: None,
        update_link: Some(TEMPLATE.into()),
        ..options(&ws, "ext.xpi")
    })
    .await
    .unwrap();

    assert_eq!(summary.addon_id, "ext@x");
    assert_eq!(summary.link_source, LinkSource::Template);
    assert_eq!(hash.len(), 64);
    assert_eq!(
        ws.read_json("updates.json"),
        json!({"addons": {"ext@x": {"updates": [{
            "version": "1.0",
            "update_hash": format!("sha256:{hash}"),
            "update_link": "https://h/1.0"
        }]}}})
    );
}

#[tokio::test]
async fn release_train_builds_history() {
    let ws = TestWorkspace::new();

    ws.write_xpi("ext.xpi", XpiBuilder::new().descriptor("ext@x", "1.0"));
    run(&RunOptions {
        update_link: Some("https://cdn/ext-@version@.xpi".into()),
        ..options(&ws, "ext.xpi")
    })
    .await
    .unwrap();

    for version in ["1.1", "1.2b1", "1.2"] {
        ws.write_xpi("ext.xpi", XpiBuilder::new().descriptor("ext@x", version));
        run(&options(&ws, "ext.xpi")).await.unwrap();
    }

    let links: Vec<_> = updates(&ws, "ext@x")
        .iter()
        .map(|u| u["update_link"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        links,
        vec![
            "https://cdn/ext-1.0.xpi",
            "https://cdn/ext-1.1.xpi",
            "https://cdn/ext-1.2b1.xpi",
            "https://cdn/ext-1.2.xpi",
        ]
    );
}

#[tokio::test]
async fn hotfix_for_older_branch_rebases_from_latest() {
    let ws = TestWorkspace::new();
    ws.write_json(
        "updates.json",
        &json!({"addons": {"ext@x": {"updates": [
            {"version": "2.0", "update_link": "https://x/2.0/ext.xpi", "channel": "stable"},
            {"version": "1.9", "update_link": "https://old/1.9/ext.xpi", "channel": "legacy"}
        ]}}}),
    );
    ws.write_xpi("ext.xpi", XpiBuilder::new().descriptor("ext@x", "1.9.1"));

    run(&options(&ws, "ext.xpi")).await.unwrap();

    let history = updates(&ws, "ext@x");
    assert_eq!(history.len(), 3);
    assert_eq!(history[2]["version"], json!("1.9.1"));
    assert_eq!(history[2]["update_link"], json!("https://x/1.9.1/ext.xpi"));
    assert_eq!(history[2]["channel"], json!("stable"));
}

#[tokio::test]
async fn compat_fields_carry_forward() {
    let ws = TestWorkspace::new();
    ws.write_json(
        "updates.json",
        &json!({"addons": {"ext@x": {"updates": [
            {"version": "1.0", "update_link": "https://x/1.0", "compat": {"min": "60"}}
        ]}}}),
    );
    ws.write_xpi("ext.xpi", XpiBuilder::new().descriptor("ext@x", "1.1"));

    run(&options(&ws, "ext.xpi")).await.unwrap();

    assert_eq!(updates(&ws, "ext@x")[1]["compat"], json!({"min": "60"}));
}

#[tokio::test]
async fn second_addon_joins_existing_manifest() {
    let ws = TestWorkspace::new();
    ws.write_json(
        "updates.json",
        &json!({"addons": {"first@x": {"updates": [{"version": "3", "update_link": "https://a/3"}]}}}),
    );
    ws.write_xpi("ext.xpi", XpiBuilder::new().descriptor("second@x", "0.1"));

    run(&RunOptions {
        update_link: Some(TEMPLATE.into()),
        ..options(&ws, "ext.xpi")
    })
    .await
    .unwrap();

    let doc = ws.read_json("updates.json");
    let ids: Vec<_> = doc["addons"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(ids, vec!["first@x", "second@x"]);
    assert_eq!(updates(&ws, "first@x").len(), 1);
}

#[tokio::test]
async fn missing_descriptor_leaves_manifest_untouched() {
    let ws = TestWorkspace::new();
    let original = "{\n  \"addons\": {}\n}";
    ws.write_file("updates.json", original);
    ws.write_xpi("ext.xpi", XpiBuilder::new().file("content.js", b"x").signed());

    let err = run(&RunOptions {
        update_link: Some(TEMPLATE.into()),
        ..options(&ws, "ext.xpi")
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::ArchiveMissingManifest { .. }));
    assert_eq!(ws.read_file("updates.json"), original);
}

#[tokio::test]
async fn corrupt_archive_aborts_run() {
    let ws = TestWorkspace::new();
    ws.write_file("ext.xpi", "this is not a zip archive at all, just some text padding");

    let err = run(&RunOptions {
        update_link: Some(TEMPLATE.into()),
        ..options(&ws, "ext.xpi")
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Archive { .. }));
    assert!(!ws.path("updates.json").exists());
}

#[tokio::test]
async fn unwritable_output_is_reported() {
    let ws = TestWorkspace::new();
    ws.write_xpi("ext.xpi", XpiBuilder::new().descriptor("ext@x", "1.0"));
    std::fs::create_dir(ws.path("updates.json")).unwrap();

    let err = run(&RunOptions {
        update_in: None,
        update_link: Some(TEMPLATE.into()),
        ..options(&ws, "ext.xpi")
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Fs(xpi_fs::Error::Io { .. })));
    assert!(ws.path("updates.json").is_dir());
}

#[tokio::test]
async fn streamed_archive_joins_existing_history() {
    let ws = TestWorkspace::new();
    ws.write_json(
        "updates.json",
        &json!({"addons": {"ext@x": {"updates": [
            {"version": "1.0", "update_link": "https://x/1.0/ext.xpi", "update_hash": null}
        ]}}}),
    );
    ws.write_xpi(
        "ext.xpi",
        XpiBuilder::new()
            .descriptor("ext@x", "1.1")
            .signed()
            .data_descriptors(),
    );

    let summary = run(&options(&ws, "ext.xpi")).await.unwrap();

    assert!(summary.signed);
    let history = updates(&ws, "ext@x");
    assert_eq!(
        history[0],
        json!({"version": "1.0", "update_link": "https://x/1.0/ext.xpi", "update_hash": null})
    );
    assert_eq!(history[1]["update_link"], json!("https://x/1.1/ext.xpi"));
}
