use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

fn modelinfer() -> Command {
    Command::cargo_bin("modelinfer").unwrap()
}

#[test]
fn test_verify_missing_model_fails() {
    modelinfer()
        .args(["verify", "/nonexistent/model.onnx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_verify_image_session() {
    let model = NamedTempFile::new().unwrap();

    modelinfer()
        .arg("verify")
        .arg(model.path())
        .args(["--width", "224", "--height", "224"])
        .assert()
        .success()
        .stdout(predicate::str::contains("224x224"));
}

#[test]
fn test_verify_rejects_out_of_range_dimensions() {
    let model = NamedTempFile::new().unwrap();

    for (w, h) in [("0", "224"), ("-1", "224"), ("224", "4097")] {
        modelinfer()
            .arg("verify")
            .arg(model.path())
            .args(["--width", w, "--height", h])
            .assert()
            .failure()
            .stderr(predicate::str::contains("1~4096"));
    }
}

#[test]
fn test_verify_unloadable_model_is_runtime_failure() {
    let model = NamedTempFile::new().unwrap();
    std::fs::write(model.path(), b"not an onnx model").unwrap();

    modelinfer()
        .arg("verify")
        .arg(model.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to initialize the model runtime"));
}

#[test]
fn test_config_init_writes_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.json");

    modelinfer()
        .args(["config", "init", "--model", "net.onnx", "--output"])
        .arg(&config_path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("\"model_path\": \"net.onnx\""));

    modelinfer()
        .args(["config", "init", "--output"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_run_with_missing_model_fails() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.json");
    let input = dir.path().join("input.bin");
    std::fs::write(&input, [0u8; 16]).unwrap();

    modelinfer()
        .args(["config", "init", "--model", "/nonexistent/net.onnx", "--output"])
        .arg(&config_path)
        .assert()
        .success();

    modelinfer()
        .arg("--config")
        .arg(&config_path)
        .arg("run")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn test_run_with_missing_input_fails() {
    modelinfer()
        .args(["run", "/nonexistent/input.bin", "--model", "/nonexistent/net.onnx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.bin");

    modelinfer()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_run_rejects_image_config() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("net.onnx");
    std::fs::write(&model, b"model").unwrap();
    let input = dir.path().join("input.bin");
    std::fs::write(&input, [0u8; 16]).unwrap();

    let config_path = dir.path().join("config.json");
    let config = serde_json::json!({
        "model_path": model,
        "image": { "width": 224, "height": 224 },
    });
    std::fs::write(&config_path, config.to_string()).unwrap();

    modelinfer()
        .arg("--config")
        .arg(&config_path)
        .arg("run")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("image session (224x224)"));
}
