#[cfg(test)]
mod tests {
    use peerlink_config::ConfigLoader;
    use peerlink_config::schema::*;
    use std::io::Write;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_endpoint_config_defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.name, "cluster");
        assert_eq!(config.binding_policy, BindingPolicy::First);
        assert_eq!(config.malformed_payload, MalformedPayloadPolicy::Empty);
        assert_eq!(config.global_client_cert_key, "peerlink.global-client-cert");
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = PeerlinkConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: PeerlinkConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.endpoint.name, config.endpoint.name);
        assert_eq!(restored.endpoint.binding_policy, config.endpoint.binding_policy);
        assert_eq!(restored.logging.level, config.logging.level);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[endpoint]
name = "vault-ha"
binding_policy = "single"
"#;
        let config: PeerlinkConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint.name, "vault-ha");
        assert_eq!(config.endpoint.binding_policy, BindingPolicy::Single);
        // Defaults should fill in
        assert_eq!(config.endpoint.malformed_payload, MalformedPayloadPolicy::Empty);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_malformed_policy_deserialize() {
        let toml_str = r#"
[endpoint]
malformed_payload = "error"
"#;
        let config: PeerlinkConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint.malformed_payload, MalformedPayloadPolicy::Error);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let toml_str = r#"
[endpoint]
binding_policy = "random"
"#;
        assert!(toml::from_str::<PeerlinkConfig>(toml_str).is_err());
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_validate_defaults_ok() {
        let warnings = PeerlinkConfig::default().validate().unwrap();
        assert!(warnings.iter().all(|w| w.severity != WarningSeverity::Error));
    }

    #[test]
    fn test_validate_empty_name_is_error() {
        let mut config = PeerlinkConfig::default();
        config.endpoint.name = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.contains("endpoint.name"));
    }

    #[test]
    fn test_validate_empty_global_key_is_error() {
        let mut config = PeerlinkConfig::default();
        config.endpoint.global_client_cert_key = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.contains("global_client_cert_key"));
    }

    #[test]
    fn test_validate_dotted_name_warns() {
        let mut config = PeerlinkConfig::default();
        config.endpoint.name = "vault.ha".into();
        let warnings = config.validate().unwrap();
        assert!(
            warnings
                .iter()
                .any(|w| w.field == "endpoint.name" && w.severity == WarningSeverity::Warning)
        );
    }

    #[test]
    fn test_validate_unknown_log_format_warns() {
        let mut config = PeerlinkConfig::default();
        config.logging.format = "xml".into();
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "logging.format"));
    }

    #[test]
    fn test_warning_display() {
        let w = ConfigWarning {
            field: "endpoint.name".into(),
            message: "endpoint name is empty".into(),
            severity: WarningSeverity::Error,
            hint: Some("set it".into()),
        };
        let s = w.to_string();
        assert!(s.contains("endpoint.name"));
        assert!(s.contains("set it"));
    }

    // ── ConfigLoader tests ─────────────────────────────────────

    #[test]
    fn test_config_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("peerlink.toml");
        let mut f = std::fs::File::create(&config_path).unwrap();
        writeln!(
            f,
            r#"
[endpoint]
global_client_cert_key = "charm.vault.global-client-cert"
malformed_payload = "error"

[logging]
format = "json"
"#
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let config = loader.get();
        assert_eq!(
            config.endpoint.global_client_cert_key,
            "charm.vault.global-client-cert"
        );
        assert_eq!(config.endpoint.malformed_payload, MalformedPayloadPolicy::Error);
        assert_eq!(config.logging.format, "json");
        assert_eq!(loader.path(), config_path.as_path());
    }

    #[test]
    fn test_config_loader_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("absent.toml");
        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        assert_eq!(loader.get().endpoint.binding_policy, BindingPolicy::First);
    }

    #[test]
    fn test_config_loader_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("peerlink.toml");
        std::fs::write(&config_path, "[endpoint\nname = ").unwrap();
        assert!(ConfigLoader::load(Some(config_path.as_path())).is_err());
    }

    #[test]
    fn test_config_loader_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("peerlink.toml");

        std::fs::write(
            &config_path,
            r#"
[endpoint]
binding_policy = "first"
"#,
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let shared = loader.shared();
        assert_eq!(loader.get().endpoint.binding_policy, BindingPolicy::First);

        std::fs::write(
            &config_path,
            r#"
[endpoint]
binding_policy = "single"
"#,
        )
        .unwrap();

        loader.reload().unwrap();
        assert_eq!(loader.get().endpoint.binding_policy, BindingPolicy::Single);
        assert_eq!(shared.read().endpoint.binding_policy, BindingPolicy::Single);
    }

    #[test]
    fn test_config_loader_reload_keeps_config_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("peerlink.toml");
        std::fs::write(&config_path, "[endpoint]\nname = \"vault-ha\"\n").unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        std::fs::write(&config_path, "[endpoint]\nglobal_client_cert_key = \"\"\n").unwrap();

        assert!(loader.reload().is_err());
        assert_eq!(loader.get().endpoint.global_client_cert_key, "peerlink.global-client-cert");
    }

    #[test]
    fn test_from_config_validates() {
        let mut config = PeerlinkConfig::default();
        config.endpoint.name = String::new();
        assert!(ConfigLoader::from_config(config).is_err());
    }

    // ── JSON roundtrip ─────────────────────────────────────────

    #[test]
    fn test_config_json_roundtrip() {
        let config = PeerlinkConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: PeerlinkConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.endpoint.name, config.endpoint.name);
    }
}
