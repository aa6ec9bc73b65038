//! Integration tests for verifier configuration loading and overrides.
//!
//! These tests verify:
//! - Correct loading of configuration from TOML files.
//! - Precedence order: Defaults < TOML < Environment Variables.
//! - Rejection of secrets in environment variables.

use figment::Jail;

use blockstone_verifier::config::{ApiToken, Config, DEFAULT_BLOCKCYPHER_URL, DEFAULT_ESPLORA_URL};

const CUSTOM_CONFIG: &str = r#"
[primary]
url = "https://mempool.example/api"

[secondary]
url = "https://blockcypher.example/v1/btc/main"
token = "config-file-token"

[http]
user_agent = "blockstone-admin/2.0"
"#;

#[test]
fn load_defaults() {
    let _init_guard = blockstone_test::init();

    Jail::expect_with(|jail| {
        jail.clear_env();

        let config = Config::load(None).expect("defaults always load");

        assert_eq!(config, Config::default());
        assert_eq!(config.primary.url, DEFAULT_ESPLORA_URL);
        assert_eq!(config.secondary.url, DEFAULT_BLOCKCYPHER_URL);
        assert_eq!(config.secondary.token, None);

        Ok(())
    });
}

#[test]
fn load_custom_config() {
    let _init_guard = blockstone_test::init();

    Jail::expect_with(|jail| {
        jail.clear_env();

        let config_path = jail.directory().join("blockstone.toml");
        jail.create_file(&config_path, CUSTOM_CONFIG)?;

        let config = Config::load(Some(config_path)).expect("custom config is valid");

        assert_eq!(config.primary.url, "https://mempool.example/api");
        assert_eq!(config.secondary.url, "https://blockcypher.example/v1/btc/main");
        assert_eq!(
            config.secondary.token,
            Some(ApiToken::new("config-file-token"))
        );
        assert_eq!(config.http.user_agent, "blockstone-admin/2.0");

        // secrets are never shown in logs
        assert!(!format!("{config:?}").contains("config-file-token"));

        Ok(())
    });
}

#[test]
fn env_overrides_config_file() {
    let _init_guard = blockstone_test::init();

    Jail::expect_with(|jail| {
        jail.clear_env();

        let config_path = jail.directory().join("blockstone.toml");
        jail.create_file(&config_path, CUSTOM_CONFIG)?;
        jail.set_env("BLOCKSTONE_PRIMARY__URL", "http://127.0.0.1:3002/api");

        let config = Config::load(Some(config_path)).expect("env override is valid");

        assert_eq!(config.primary.url, "http://127.0.0.1:3002/api");
        assert_eq!(config.secondary.url, "https://blockcypher.example/v1/btc/main");

        Ok(())
    });
}

#[test]
fn env_token_is_rejected() {
    let _init_guard = blockstone_test::init();

    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("BLOCKSTONE_SECONDARY__TOKEN", "env-token");

        let error = Config::load(None).expect_err("tokens can't be set in the environment");
        let message = error.to_string();

        assert!(message.contains("BLOCKSTONE_SECONDARY__TOKEN"));
        assert!(!message.contains("env-token"));

        Ok(())
    });
}

#[test]
fn invalid_config_files_are_rejected() {
    let _init_guard = blockstone_test::init();

    Jail::expect_with(|jail| {
        jail.clear_env();

        let unknown_field = jail.directory().join("unknown.toml");
        jail.create_file(&unknown_field, "[primary]\nurl = \"http://a\"\nretries = 3\n")?;
        assert!(Config::load(Some(unknown_field)).is_err());

        let missing = jail.directory().join("missing.toml");
        assert!(Config::load(Some(missing)).is_err());

        Ok(())
    });
}
