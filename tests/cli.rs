use assert_cmd::Command;
use predicates::prelude::*;
use std::env;
use std::fs;
use std::io;

// Solver tests drive both methods over the same fixture. Generator
// tests can only check shape and reproducibility, since the output
// depends on the seed.

const RULES_6X6: &str = "2====3\n.....|\n.....|\n.....|\n.....|\n1----2\n";
const BACKTRACKING_6X6: &str = "2----3\n|....H\n|....H\n|....H\n|....H\n1....2\n";

#[test]
fn test_cli_solve() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.arg("solve")
        .pipe_stdin("puzzles/example_6x6.txt")
        .unwrap()
        .assert()
        .success()
        .stdout(RULES_6X6);
}

#[test]
fn test_cli_input_flag() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.arg("solve")
        .arg("--input-file=puzzles/example_6x6.txt")
        .assert()
        .success()
        .stdout(RULES_6X6);
}

#[test]
fn test_cli_backtracking_method() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.arg("solve")
        .arg("--method=backtracking")
        .pipe_stdin("puzzles/example_6x6.txt")
        .unwrap()
        .assert()
        .success()
        .stdout(BACKTRACKING_6X6);
}

#[test]
fn test_cli_solve_stdin() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.arg("solve")
        .write_stdin("202\n000\n000\n")
        .assert()
        .success()
        .stdout("2=2\n...\n...\n");
}

#[test]
fn test_cli_output_flag() -> io::Result<()> {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    let mut path = env::temp_dir();
    path.push("test-hashiwokakero-toolkit-solve.txt");

    cmd.arg("solve")
        .pipe_stdin("puzzles/example_6x6.txt")
        .unwrap()
        .arg(format!("--output-file={}", path.to_str().unwrap()))
        .assert()
        .success()
        .stdout("");

    let actual = fs::read_to_string(path.clone())?;
    fs::remove_file(path)?;
    assert_eq!(RULES_6X6, actual);

    Ok(())
}

#[test]
fn test_cli_no_solutions() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.arg("solve")
        .write_stdin("...1..")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No solutions"));
}

#[test]
fn test_cli_parse_error() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.arg("solve")
        .write_stdin("This is not a valid input.")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("puzzle is empty"));
}

#[test]
fn test_cli_row_length_error() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.arg("solve")
        .write_stdin("202\n00\n000\n")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("expected 3 digits"));
}

#[test]
fn test_cli_generate() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.args(["generate", "--size", "7", "--seed", "42"])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            out.lines().count() == 7
                && out
                    .lines()
                    .all(|line| line.len() == 7 && line.chars().all(|c| c.is_ascii_digit()))
        }));
}

#[test]
fn test_cli_generate_deterministic() {
    let first = Command::cargo_bin("hashiwokakero-toolkit")
        .unwrap()
        .args(["generate", "--size", "10", "--seed", "99"])
        .output()
        .unwrap();
    let second = Command::cargo_bin("hashiwokakero-toolkit")
        .unwrap()
        .args(["generate", "--size", "10", "--seed", "99"])
        .output()
        .unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_cli_generate_show_solution() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.args(["generate", "--size", "7", "--seed", "1", "--show-solution"])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            // Puzzle, a blank separator, then the bridged solution.
            out.lines().count() == 15 && out.contains("\n\n")
        }));
}

#[test]
fn test_cli_generate_output_flag() -> io::Result<()> {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    let mut path = env::temp_dir();
    path.push("test-hashiwokakero-toolkit-generate.txt");

    cmd.args(["generate", "--size", "7", "--seed", "5"])
        .arg(format!("--output-file={}", path.to_str().unwrap()))
        .assert()
        .success()
        .stdout("");

    let actual = fs::read_to_string(path.clone())?;
    fs::remove_file(path)?;
    assert_eq!(actual.lines().count(), 7);

    Ok(())
}

#[test]
fn test_cli_generate_bad_size() {
    let mut cmd = Command::cargo_bin("hashiwokakero-toolkit").unwrap();

    cmd.args(["generate", "--size", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--size must be one of"));
}
