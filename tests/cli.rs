use std::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_itc2021-facts");

#[test]
fn writes_facts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.lp");
    std::fs::write(&input, r#"<Instance><Teams><team id="0"/><team id="1"/></Teams><GA1 meetings="0,1"/></Instance>"#).unwrap();

    let out = Command::new(BIN).arg(&input).arg(&output).arg("-v").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Generated 7 facts"));

    let facts = std::fs::read_to_string(&output).unwrap();
    assert!(facts.contains("team(0..1).\nnum_teams(2).\n"));
    assert!(facts.contains("ga1_meetings(ga1_1, 0, 1).\n"));
}

#[test]
fn quiet_without_verbose_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    std::fs::write(&input, "<Instance/>").unwrap();
    let out = Command::new(BIN).arg(&input).arg(dir.path().join("out.lp")).output().unwrap();
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_input_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.lp");
    let out = Command::new(BIN).arg(dir.path().join("missing.xml")).arg(&output).output().unwrap();
    assert!(!out.status.success());
    assert!(!output.exists());
}

#[test]
fn malformed_document_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.lp");
    std::fs::write(&input, "<Instance><Teams>").unwrap();
    let out = Command::new(BIN).arg(&input).arg(&output).output().unwrap();
    assert!(!out.status.success());
    assert!(!output.exists());
}

#[test]
fn bad_team_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.lp");
    std::fs::write(&input, r#"<Instance><Teams><team id="x"/></Teams></Instance>"#).unwrap();
    let out = Command::new(BIN).arg(&input).arg(&output).output().unwrap();
    assert!(!out.status.success());
    assert!(!output.exists());
}

#[test]
fn unwritable_output_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xml");
    std::fs::write(&input, "<Instance/>").unwrap();
    let out = Command::new(BIN)
        .arg(&input)
        .arg(dir.path().join("no/such/dir/out.lp"))
        .output()
        .unwrap();
    assert!(!out.status.success());
}
