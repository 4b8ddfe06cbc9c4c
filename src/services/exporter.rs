// Export Service
// Renders a validated configuration as the two downloadable artifacts

use crate::models::Config;

/// Pretty-printed config.json document, legacy build aliases included
pub fn config_json(config: &Config) -> Result<String, String> {
    let doc = config.to_document()?;
    serde_json::to_string_pretty(&doc)
        .map_err(|e| format!("Failed to serialize configuration: {e}"))
}

/// The .env-style artifact: KEY=value lines grouped under comment headers.
/// Values are written as-is, unquoted.
pub fn env_file(config: &Config) -> String {
    let artifacts = config
        .build
        .artifacts
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let lines = [
        "# RustDesk Client Configuration".to_string(),
        "# Environment variables baked into the custom client".to_string(),
        String::new(),
        "# Server configuration (set together or not at all)".to_string(),
        format!("RENDEZVOUS_SERVER={}", config.server.rendezvous_server),
        format!("RS_PUB_KEY={}", config.server.public_key),
        format!("API_SERVER={}", config.server.api_server),
        String::new(),
        "# Build configuration".to_string(),
        format!("BUILD_VERSION={}", config.build.version),
        format!("BUILD_PLATFORM={}", config.build.platform.as_str()),
        format!("BUILD_ARTIFACTS={artifacts}"),
        format!("PUBLISH_RELEASE={}", config.build.publish_release),
        format!("UPLOAD_ARTIFACTS={}", config.build.upload_artifacts),
        String::new(),
        "# Branding".to_string(),
        format!("PRODUCT_NAME={}", config.branding.product_name),
        format!("THEME_COLOR={}", config.branding.theme_color),
        String::new(),
        "# Advanced settings".to_string(),
        format!("DEFAULT_THEME={}", config.advanced.theme.as_str()),
        format!("DEFAULT_LANG={}", config.advanced.lang),
        format!("ENABLE_HARDWARE_CODEC={}", config.advanced.enable_hardware_codec),
        format!("ENCRYPTED_ONLY={}", config.security.encrypted_only),
        format!("REQUIRE_LOGIN={}", config.security.require_login),
        String::new(),
    ];

    lines.join("\n")
}
