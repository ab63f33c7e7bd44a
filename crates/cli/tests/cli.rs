use std::path::PathBuf;
use std::process::{Command, Stdio};

fn transflow() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_transflow"));
    command.env_remove("RUST_LOG");
    command
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("transflow-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn demo_solve_prints_reference_sections() {
    let output = transflow().args(["solve"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let distance = stdout.find("result of distance calculation:\n").unwrap();
    let counts = stdout.find("num of warehouse:11\nnum of factories:10\n").unwrap();
    let flows = stdout.find("result of output:\n").unwrap();
    assert!(distance < counts && counts < flows);
    // facility (5,11) to customers (14,18) and (4,9)
    assert!(stdout.contains("result of distance calculation:\n11.4018 2.23607 "));
    assert!(stdout.contains("status: Optimal"));
}

#[test]
fn unbalanced_instance_fails_with_one_line() {
    let path = scratch("unbalanced.json");
    std::fs::write(
        &path,
        r#"{"facilities":[{"x":0,"y":0}],"customers":[{"x":3,"y":4}],"supply":[5],"demand":[3]}"#,
    )
    .unwrap();
    let output = transflow()
        .args(["solve", "--instance"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.lines().count(), 1, "stderr was {stderr:?}");
    assert!(stderr.starts_with("error: unbalanced: "));
    assert!(output.stdout.is_empty());
}

#[test]
fn deferred_balance_reports_infeasibility() {
    let path = scratch("deferred.json");
    std::fs::write(
        &path,
        r#"{"facilities":[{"x":0,"y":0}],"customers":[{"x":3,"y":4}],"supply":[5],"demand":[3]}"#,
    )
    .unwrap();
    let output = transflow()
        .args(["solve", "--defer-balance", "--instance"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: infeasible: "), "stderr was {stderr:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("result of output:"));
}

#[test]
fn generated_instance_checks_clean() {
    let path = scratch("generated.json");
    let generate = transflow()
        .args(["generate", "--facilities", "4", "--customers", "6", "--seed", "3", "--output"])
        .arg(&path)
        .status()
        .unwrap();
    assert!(generate.success());
    let check = transflow().args(["check", "--instance"]).arg(&path).output().unwrap();
    assert!(check.status.success());
    assert!(String::from_utf8(check.stdout)
        .unwrap()
        .starts_with("instance ok: 4 facilities, 6 customers"));
}

#[test]
fn closed_stdout_is_not_an_error() {
    let mut child = transflow()
        .args(["solve"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdout.take());
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(!stderr.contains("Broken pipe"), "stderr was {stderr:?}");
}

#[test]
fn non_finite_tolerance_is_rejected() {
    let output = transflow().args(["solve", "--tol=NaN"]).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("error: input: "), "stderr was {stderr:?}");
}

#[test]
fn demo_maps_are_written() {
    let routes = scratch("maps/routes.svg");
    let residuals = scratch("maps/residuals.svg");
    let output = transflow()
        .args(["solve", "--quiet-summary", "--map"])
        .arg(&routes)
        .arg("--residual-map")
        .arg(&residuals)
        .output()
        .unwrap();
    assert!(output.status.success());
    let svg = std::fs::read_to_string(&routes).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.matches(r#"class="facility""#).count() == 10);
    assert!(svg.contains(r#"class="route""#));
    let svg = std::fs::read_to_string(&residuals).unwrap();
    assert!(svg.matches(r#"class="customer""#).count() == 11);
}
