use assert_cmd::cargo::cargo_bin_cmd;

#[test]
fn top_level_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("loopfrontctl");
    let output = cmd
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("backfill"), "help missing backfill");
    assert!(text.contains("verify"), "help missing verify");
}

#[test]
fn backfill_help_mentions_required_flags() {
    let mut cmd = cargo_bin_cmd!("loopfrontctl");
    let output = cmd
        .arg("backfill")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("--catalog"), "backfill help missing --catalog");
    assert!(
        text.contains("--media-dir"),
        "backfill help missing --media-dir"
    );
    assert!(
        text.contains("--base-url"),
        "backfill help missing --base-url"
    );
    assert!(text.contains("--dry-run"), "backfill help missing --dry-run");
}

#[test]
fn verify_requires_a_catalog_path() {
    let mut cmd = cargo_bin_cmd!("loopfrontctl");
    cmd.arg("verify").assert().failure();
}
