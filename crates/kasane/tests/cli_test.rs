use assert_cmd::Command;
use predicates::prelude::*;

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("kasane").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ビルドマトリクス"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("versions"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("kasane").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kasane"));
}

/// buildコマンドのヘルプにマトリクス・実行系の引数が出ることを確認
#[test]
fn test_build_help() {
    let mut cmd = Command::cargo_bin("kasane").unwrap();
    cmd.arg("build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--image"))
        .stdout(predicate::str::contains("--package"))
        .stdout(predicate::str::contains("--threads"))
        .stdout(predicate::str::contains("--variant"))
        .stdout(predicate::str::contains("--exclude"))
        .stdout(predicate::str::contains("--skip-existing"))
        .stdout(predicate::str::contains("--dry-run"));
}

/// 必須引数が環境変数からも与えられることがヘルプに出ることを確認
#[test]
fn test_build_help_mentions_env_vars() {
    let mut cmd = Command::cargo_bin("kasane").unwrap();
    cmd.arg("build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("IMAGE"))
        .stdout(predicate::str::contains("PACKAGE"))
        .stdout(predicate::str::contains("THREADS"));
}

/// 必須引数なしの plan はエラーになることを確認
#[test]
fn test_plan_requires_image_and_package() {
    let mut cmd = Command::cargo_bin("kasane").unwrap();
    cmd.env_remove("IMAGE")
        .env_remove("PACKAGE")
        .arg("plan")
        .assert()
        .failure();
}

/// 必須引数なしの build はエラーになることを確認
#[test]
fn test_build_requires_image_and_package() {
    let mut cmd = Command::cargo_bin("kasane").unwrap();
    cmd.env_remove("IMAGE")
        .env_remove("PACKAGE")
        .arg("build")
        .assert()
        .failure();
}

/// 不正なコマンドでエラーになることを確認
#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("kasane").unwrap();
    cmd.arg("invalid-command").assert().failure();
}
