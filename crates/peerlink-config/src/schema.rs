use serde::{Deserialize, Serialize};

/// Root configuration — maps to `peerlink.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerlinkConfig {
    pub endpoint: EndpointConfig,
    pub logging: LoggingConfig,
}

// ── Endpoint ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Endpoint name; lifecycle flags are namespaced by it (`<name>.connected`).
    pub name: String,
    /// Which binding is authoritative when the transport reports several.
    pub binding_policy: BindingPolicy,
    /// What `get` does when a peer published text that is not valid JSON.
    pub malformed_payload: MalformedPayloadPolicy,
    /// Record key holding the group-wide client certificate bundle.
    pub global_client_cert_key: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            name: "cluster".into(),
            binding_policy: BindingPolicy::First,
            malformed_payload: MalformedPayloadPolicy::Empty,
            global_client_cert_key: "peerlink.global-client-cert".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingPolicy {
    /// The first binding in transport order wins; the others are ignored.
    #[default]
    First,
    /// Exactly one binding may be active; several is an error.
    Single,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPayloadPolicy {
    /// Log a warning and return an empty mapping.
    #[default]
    Empty,
    /// Return a decoding error to the caller.
    Error,
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "{} {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl PeerlinkConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Endpoint name ───
        let name = &self.endpoint.name;
        if name.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "endpoint.name".into(),
                message: "endpoint name is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to the peer relation name, e.g. 'cluster'".into()),
            });
        } else if name.contains('.') {
            warnings.push(ConfigWarning {
                field: "endpoint.name".into(),
                message: format!("endpoint name '{}' contains '.', flag names become ambiguous", name),
                severity: WarningSeverity::Warning,
                hint: Some("Use a name without dots, e.g. 'cluster' or 'vault-ha'".into()),
            });
        }

        // ── Global record key ───
        if self.endpoint.global_client_cert_key.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "endpoint.global_client_cert_key".into(),
                message: "global client certificate key is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'peerlink.global-client-cert'".into()),
            });
        }

        // ── Binding policy ───
        if self.endpoint.binding_policy == BindingPolicy::First {
            warnings.push(ConfigWarning {
                field: "endpoint.binding_policy".into(),
                message: "with several peer-group bindings only the first is used".into(),
                severity: WarningSeverity::Info,
                hint: Some("Set to 'single' to reject ambiguous bindings instead".into()),
            });
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
