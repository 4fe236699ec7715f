use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.ollama.protocol, "http");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.model, "nomic-embed-text:latest");
    assert_eq!(config.ollama.batch_size, 16);
    assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
    assert!((config.llm.temperature - 0.6).abs() < f32::EPSILON);
    assert_eq!(config.llm.max_tokens, 512);
    assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
    assert_eq!(config.chunking.chunk_size, 500);
    assert_eq!(config.chunking.chunk_overlap, 100);
    assert_eq!(config.retrieval.top_k, 3);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.batch_size = 1001;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.llm.temperature = 2.5;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTemperature(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.llm.base_url = "not a url".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidUrl(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.retrieval.top_k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopK(0))
    ));

    let mut invalid_config = config;
    invalid_config.chunking.chunk_overlap = 500;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::OverlapTooLarge(500, 500))
    ));
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn llm_endpoint_url() {
    let mut llm = LlmConfig::default();
    let url = llm.endpoint_url().expect("default endpoint should parse");
    assert_eq!(
        url.as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );

    llm.base_url = "http://localhost:8080/v1/".to_string();
    let url = llm.endpoint_url().expect("trailing slash should be tolerated");
    assert_eq!(url.as_str(), "http://localhost:8080/v1/chat/completions");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_toml_uses_defaults() {
    let parsed: Config = toml::from_str(
        r#"
        [llm]
        model = "llama-3.1-8b-instant"
        "#,
    )
    .expect("partial config should parse");

    assert_eq!(parsed.llm.model, "llama-3.1-8b-instant");
    assert_eq!(parsed.llm.max_tokens, 512);
    assert_eq!(parsed.ollama, OllamaConfig::default());
    assert_eq!(parsed.chunking.chunk_size, 500);
}

#[test]
fn setter_validation() {
    let mut config = OllamaConfig::default();

    assert!(config.set_protocol("https".to_string()).is_ok());
    assert!(config.set_host("example.com".to_string()).is_ok());
    assert!(config.set_port(8080).is_ok());
    assert!(config.set_model("new-model".to_string()).is_ok());
    assert!(config.set_batch_size(128).is_ok());

    assert!(config.set_protocol("ftp".to_string()).is_err());
    assert!(config.set_port(0).is_err());
    assert!(config.set_model(String::new()).is_err());
    assert!(config.set_batch_size(0).is_err());
    assert!(config.set_batch_size(1001).is_err());

    let mut llm = LlmConfig::default();
    assert!(llm.set_base_url("http://localhost:1234/v1".to_string()).is_ok());
    assert!(llm.set_base_url("nope".to_string()).is_err());
    assert!(llm.set_temperature(0.0).is_ok());
    assert!(llm.set_temperature(-0.1).is_err());
    assert!(llm.set_max_tokens(1024).is_ok());
    assert!(llm.set_max_tokens(0).is_err());
    assert!(llm.set_model("  ".to_string()).is_err());
}

#[test]
fn load_missing_config() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config::load(temp_dir.path()).expect("missing file should load defaults");

    assert_eq!(config.get_base_dir(), temp_dir.path());
    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.llm, LlmConfig::default());
}

#[test]
fn save_and_reload() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config::load(temp_dir.path()).expect("should load defaults");
    config.retrieval.top_k = 5;
    config.llm.api_key = Some("from-file".to_string());

    config.save().expect("should save config");
    assert!(config.config_file_path().exists());

    let reloaded = Config::load(temp_dir.path()).expect("should reload config");
    assert_eq!(reloaded, config);
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[retrieval]\ntop_k = 100\n",
    )
    .expect("should write config");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
#[serial]
fn api_key_prefers_environment() {
    let llm = LlmConfig {
        api_key_env: "NEURON_ARCHIVE_TEST_KEY".to_string(),
        api_key: Some("from-file".to_string()),
        ..LlmConfig::default()
    };

    // SAFETY: serialised with every other test touching the environment
    unsafe { std::env::set_var("NEURON_ARCHIVE_TEST_KEY", "from-env") };
    assert_eq!(llm.api_key().expect("key should resolve"), "from-env");

    // SAFETY: as above
    unsafe { std::env::remove_var("NEURON_ARCHIVE_TEST_KEY") };
    assert_eq!(llm.api_key().expect("key should resolve"), "from-file");
}

#[test]
#[serial]
fn missing_api_key() {
    let llm = LlmConfig {
        api_key_env: "NEURON_ARCHIVE_ABSENT_KEY".to_string(),
        api_key: None,
        ..LlmConfig::default()
    };

    // SAFETY: #[serial]
    unsafe { std::env::remove_var("NEURON_ARCHIVE_ABSENT_KEY") };
    let err = llm.api_key().expect_err("no key should be found");
    assert!(matches!(err, ConfigError::MissingApiKey(ref name) if name == "NEURON_ARCHIVE_ABSENT_KEY"));
    assert!(err.to_string().contains("NEURON_ARCHIVE_ABSENT_KEY not found"));
}

#[test]
#[serial]
fn config_dir_honours_override() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    // SAFETY: #[serial]
    unsafe { std::env::set_var(CONFIG_DIR_ENV, temp_dir.path()) };
    let dir = Config::config_dir().expect("override should resolve");
    // SAFETY: #[serial]
    unsafe { std::env::remove_var(CONFIG_DIR_ENV) };

    assert_eq!(dir, temp_dir.path());
}
