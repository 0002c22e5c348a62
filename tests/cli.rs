use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn insighthub() -> Command {
    let mut cmd = Command::cargo_bin("insighthub").unwrap();
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("INSIGHTHUB_MODEL")
        .env_remove("INSIGHTHUB_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    insighthub()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: insighthub [OPTIONS] <COMMAND>"))
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("index"))
        .stdout(predicate::str::contains("--api-key <API_KEY>"))
        .stdout(predicate::str::contains("--knowledge-base <FILE>"))
        .stdout(predicate::str::contains("INSIGHTHUB_MODEL"))
        .stdout(predicate::str::contains("INSIGHTHUB_BASE_URL"));
}

#[test]
fn test_cli_no_command() {
    insighthub()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: insighthub [OPTIONS] <COMMAND>"));
}

#[test]
fn test_index_prints_builtin_summary() {
    insighthub()
        .arg("index")
        .assert()
        .success()
        .stdout(predicate::str::contains("### Salesforce"))
        .stdout(predicate::str::contains("### Machine Learning"))
        .stdout(predicate::str::contains("### SQL"));
}

#[test]
fn test_index_system_instruction() {
    insighthub()
        .args(["index", "--system"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You are InsightHub Assistant"))
        .stdout(predicate::str::contains("5. Use Markdown for formatting."));
}

#[test]
fn test_index_from_knowledge_base_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("kb.json");
    fs::write(
        &path,
        r#"{"categories":[{"title":"Rust","description":"Systems language","subCategories":[{"title":"Ownership","links":[{"title":"Borrowing","url":"/borrow"}]}]}]}"#,
    )
    .unwrap();

    insighthub()
        .args(["index", "--knowledge-base"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("### Rust\nSystems language\n- Ownership: Borrowing"));
}

#[test]
fn test_missing_knowledge_base_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    insighthub()
        .args(["index", "--knowledge-base"])
        .arg(temp_dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load knowledge base"));
}

#[test]
fn test_ask_without_api_key_answers_with_fallback() {
    insighthub()
        .args(["ask", "What is SQL?"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "An error occurred while communicating with the AI. Please ensure your API key is valid.",
        ));
}

#[test]
fn test_chat_reads_stdin_until_eof() {
    insighthub()
        .arg("chat")
        .write_stdin("   \nWhat is SQL?\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Assistant: Hello! I'm your knowledge base assistant."))
        .stdout(predicate::str::contains("Assistant: An error occurred while communicating with the AI."));
}

#[test]
fn test_settings_file_is_validated() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("insighthub.toml");
    fs::write(&path, "top_p = 3.0\n").unwrap();

    insighthub()
        .args(["index", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid assistant configuration"));
}

fn answer(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_model_env_overrides_settings_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/env-model:generateContent"))
        .respond_with(answer("answered by env-model"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/file-model:generateContent"))
        .respond_with(answer("answered by file-model"))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("insighthub.toml");
    fs::write(&config, "model = \"file-model\"\nbase_url = \"http://127.0.0.1:1\"\n").unwrap();

    insighthub()
        .env("GEMINI_API_KEY", "test-key")
        .env("INSIGHTHUB_MODEL", "env-model")
        .env("INSIGHTHUB_BASE_URL", server.uri())
        .args(["ask", "What is SQL?", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("answered by env-model"));

    // Without the env override the settings file wins over the default.
    insighthub()
        .env("GEMINI_API_KEY", "test-key")
        .env("INSIGHTHUB_BASE_URL", server.uri())
        .args(["ask", "What is SQL?", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("answered by file-model"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_model_flag_overrides_env() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/flag-model:generateContent"))
        .respond_with(answer("answered by flag-model"))
        .expect(1)
        .mount(&server)
        .await;

    insighthub()
        .env("GEMINI_API_KEY", "test-key")
        .env("INSIGHTHUB_MODEL", "env-model")
        .args(["ask", "What is SQL?", "--model", "flag-model", "--base-url"])
        .arg(server.uri())
        .assert()
        .success()
        .stdout(predicate::str::contains("answered by flag-model"));
}
