use super::load_existing_config as load_existing_config_impl;
use super::test_ollama_connection as test_ollama_connection_impl;
use super::*;
use crate::config::settings::CONFIG_DIR_ENV;
use serial_test::serial;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
#[serial]
fn load_existing_config() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    // SAFETY: #[serial]
    unsafe { std::env::set_var(CONFIG_DIR_ENV, temp_dir.path()) };

    let config = load_existing_config_impl().expect("config loaded successfully");

    // SAFETY: #[serial]
    unsafe { std::env::remove_var(CONFIG_DIR_ENV) };

    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert!(!config.ollama.host.is_empty());
    assert!(config.ollama.port > 0);
    assert!(!config.llm.model.is_empty());
}

#[test]
#[serial]
fn api_key_description() {
    let llm = LlmConfig {
        api_key_env: "NEURON_ARCHIVE_DESCRIBE_KEY".to_string(),
        ..LlmConfig::default()
    };

    // SAFETY: #[serial]
    unsafe { std::env::remove_var("NEURON_ARCHIVE_DESCRIBE_KEY") };
    assert!(describe_api_key(&llm).contains("missing (NEURON_ARCHIVE_DESCRIBE_KEY)"));

    // SAFETY: #[serial]
    unsafe { std::env::set_var("NEURON_ARCHIVE_DESCRIBE_KEY", "secret") };
    let description = describe_api_key(&llm);
    // SAFETY: #[serial]
    unsafe { std::env::remove_var("NEURON_ARCHIVE_DESCRIBE_KEY") };

    assert!(description.contains("set (via NEURON_ARCHIVE_DESCRIBE_KEY)"));
    assert!(!description.contains("secret"));
}

#[tokio::test]
async fn ollama_connection_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"version":"0.5.0"}"#))
        .mount(&server)
        .await;

    let address = server.address();
    let ollama = OllamaConfig {
        host: address.ip().to_string(),
        port: address.port(),
        ..OllamaConfig::default()
    };

    let reachable = tokio::task::spawn_blocking(move || test_ollama_connection_impl(&ollama))
        .await
        .expect("blocking task should join");
    assert!(reachable);
}

#[tokio::test]
async fn ollama_connection_check_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("should bind");
    let port = listener.local_addr().expect("should have address").port();
    drop(listener);

    let ollama = OllamaConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..OllamaConfig::default()
    };

    let reachable = tokio::task::spawn_blocking(move || test_ollama_connection_impl(&ollama))
        .await
        .expect("blocking task should join");
    assert!(!reachable);
}
