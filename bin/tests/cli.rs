use assert_cmd::prelude::*; // Add methods on commands
use assert_fs::prelude::*;
use predicates::prelude::*; // Used for writing assertions
use std::process::Command; // Run programs

const CHAIN: &str = "arg(a). arg(b). arg(c).\natt(a,b). att(b,c).\n";
const CYCLE: &str = "arg(a). arg(b).\natt(a,b). att(b,a).\n";

#[test]
fn arguments() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("af-vis")?;
    cmd.arg("-vvv").arg("--grd").arg("file.apx");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot read file.apx"));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg("-v").arg("-q").arg("file.apx");
    cmd.assert().failure().stderr(predicate::str::contains(
        "cannot be used with",
    ));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg("--local").arg("file.apx");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--prov"));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg("-h");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage: af-vis"));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("af-vis "));
    Ok(())
}

#[test]
fn grounded() -> Result<(), Box<dyn std::error::Error>> {
    let file = assert_fs::NamedTempFile::new("chain.apx")?;
    file.write_str(CHAIN)?;

    let mut cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--grd");
    cmd.assert().success().stdout(predicate::str::contains(
        "a accepted 0\nb defeated 1\nc accepted 2\n",
    ));

    let self_attack = assert_fs::NamedTempFile::new("self.apx")?;
    self_attack.write_str("arg(x). att(x,x).")?;
    cmd = Command::cargo_bin("af-vis")?;
    cmd.env_clear();
    cmd.arg(self_attack.path()).arg("-q").arg("--grd");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("x undefined ∞"));

    let wrong_file = assert_fs::NamedTempFile::new("wrong.apx")?;
    wrong_file.write_str("arg(a). att(a,b.")?;
    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(wrong_file.path()).arg("--grd");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot read framework"));

    let unknown = assert_fs::NamedTempFile::new("unknown.apx")?;
    unknown.write_str("arg(a). att(a,b).")?;
    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(unknown.path()).arg("--rust_log").arg("trace").arg("--grd");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("malformed argumentation framework"));
    Ok(())
}

#[test]
fn json_input() -> Result<(), Box<dyn std::error::Error>> {
    let file = assert_fs::NamedTempFile::new("chain.json")?;
    file.write_str(
        r#"{"name":"chain","arguments":[{"id":"a","annotation":"first"},{"id":"b"}],"defeats":[{"from":"a","to":"b"}]}"#,
    )?;
    let mut cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--grd");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("a accepted 0\nb defeated 1\n"));

    let apx = assert_fs::NamedTempFile::new("chain.txt")?;
    apx.write_str(CHAIN)?;
    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(apx.path()).arg("--format").arg("json").arg("--grd");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot read framework"));
    Ok(())
}

#[test]
fn extensions() -> Result<(), Box<dyn std::error::Error>> {
    let file = assert_fs::NamedTempFile::new("chain.apx")?;
    file.write_str(CHAIN)?;

    let mut cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--ext").arg("a,c");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("in: {a, c}, out: {b}, undec: {}"));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--ext").arg("a,z");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown argument \"z\""));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--ext").arg("a,c").arg("--dot");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""a" [label="a.0""#))
        .stdout(predicate::str::contains(r#""c" [label="c.2""#))
        .stdout(predicate::str::contains("pos=").not());

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""nodes""#))
        .stdout(predicate::str::contains(r#""label": "b""#));
    Ok(())
}

#[test]
fn provenance() -> Result<(), Box<dyn std::error::Error>> {
    let file = assert_fs::NamedTempFile::new("chain.apx")?;
    file.write_str("arg(a). arg(b). arg(c). arg(d).\natt(a,b). att(b,c). att(c,d).\n")?;

    let mut cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--prov").arg("c").arg("--kind").arg("pr");
    cmd.assert().success().stdout(predicate::str::contains(
        "primary provenance of c: {a, b, c}\nattacks: {(a, b), (b, c)}",
    ));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--prov").arg("z");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown argument \"z\""));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path())
        .arg("--prov")
        .arg("d")
        .arg("--local")
        .arg("--dot");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("penwidth=5"))
        .stdout(predicate::str::contains(r#""d" [label="d""#));
    Ok(())
}

#[test]
fn critical() -> Result<(), Box<dyn std::error::Error>> {
    let file = assert_fs::NamedTempFile::new("cycle.apx")?;
    file.write_str(CYCLE)?;

    let mut cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--critical");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--ext"));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--ext").arg("a").arg("--critical");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("critical: (b, a)"));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--ext").arg("").arg("--critical");
    cmd.assert().success().stdout(predicate::str::contains(
        "No critical attacks under the selected extension",
    ));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path())
        .arg("--ext")
        .arg("a")
        .arg("--select")
        .arg("(b,a)")
        .arg("--apply")
        .arg("--dot");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("a.0′"))
        .stdout(predicate::str::contains("#ff0000"));

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--select").arg("(a,c)").arg("--dot");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown argument \"c\""));
    Ok(())
}

#[test]
fn settings() -> Result<(), Box<dyn std::error::Error>> {
    let file = assert_fs::NamedTempFile::new("chain.apx")?;
    file.write_str(CHAIN)?;
    let config = assert_fs::NamedTempFile::new("settings.json")?;
    config.write_str(r#"{"rank_dir":"LR","rank_mode":"none"}"#)?;

    let mut cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path())
        .arg("--config")
        .arg(config.path())
        .arg("--grd")
        .arg("--dot");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("rankdir=LR"))
        .stdout(predicate::str::contains("rank = same").not());

    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path())
        .arg("--config")
        .arg(config.path())
        .arg("--rank-dir")
        .arg("BT")
        .arg("--dot");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("rankdir=BT"));

    let broken = assert_fs::NamedTempFile::new("broken.json")?;
    broken.write_str(r#"{"limits":{"timeout":-1}}"#)?;
    cmd = Command::cargo_bin("af-vis")?;
    cmd.arg(file.path()).arg("--config").arg(broken.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a valid number of seconds"));
    Ok(())
}
