//! Integration tests for configuration loading.

use movecast_rs::config;

#[tokio::test]
async fn test_load_full_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Config.toml");

    tokio::fs::write(
        &path,
        r#"
commentary_url = "http://localhost:8000"
white_agent = "stockfish"
black_agent = "maia"
listen_addr = "0.0.0.0:9000"
"#,
    )
    .await
    .unwrap();

    let config = config::load_from(&path).await.unwrap();

    assert_eq!(config.commentary_url, "http://localhost:8000");
    assert_eq!(config.white_agent, "stockfish");
    assert_eq!(config.black_agent, "maia");
    assert_eq!(config.listen_addr, "0.0.0.0:9000");
}

#[tokio::test]
async fn test_listen_addr_defaults_when_omitted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Config.toml");

    tokio::fs::write(
        &path,
        r#"
commentary_url = "http://localhost:8000"
white_agent = "alpha"
black_agent = "beta"
"#,
    )
    .await
    .unwrap();

    let config = config::load_from(&path).await.unwrap();

    assert_eq!(config.listen_addr, "127.0.0.1:7878");
}

#[tokio::test]
async fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Nonexistent.toml");

    let result = config::load_from(&path).await;

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Could not read config file"));
}

#[tokio::test]
async fn test_incomplete_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Config.toml");

    tokio::fs::write(&path, "commentary_url = \"http://localhost:8000\"\n")
        .await
        .unwrap();

    assert!(config::load_from(&path).await.is_err());
}
