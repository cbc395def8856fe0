use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() -> Result<()> {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>()?;

    assert_eq!(
        doc.get("model").and_then(|e| return e.as_str()),
        Some("gemini-2.5-flash")
    );
    assert_eq!(
        doc.get("gemini-url").and_then(|e| return e.as_str()),
        Some("https://generativelanguage.googleapis.com")
    );
    assert!(doc.get("gemini-token").is_none());
    assert!(doc.get("config-file").is_none());
    assert!(res.contains("# gemini-token = \"\""));

    return Ok(());
}

#[test]
fn it_uses_kebab_case_keys() {
    assert_eq!(ConfigKey::GeminiURL.to_string(), "gemini-url");
    assert_eq!(ConfigKey::GeminiToken.to_string(), "gemini-token");
    assert_eq!(ConfigKey::DataDir.to_string(), "data-dir");
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["crewforge", "-c", "./config.example.toml"])?;
    Config::load(cli::build(), vec![&matches]).await?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["crewforge", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}
