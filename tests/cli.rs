use assert_cmd::Command;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("-V");
    cmd.assert()
        .success()
        .stdout(predicates::str::starts_with("labelprep"));
}

#[test]
fn help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("labelprep").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("remap"))
        .stdout(predicates::str::contains("labels"))
        .stdout(predicates::str::contains("prepare"));
}
