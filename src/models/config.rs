// Configuration Model
// The five-section deployment record assembled by the wizard

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Legacy duplicate spellings the build section used to carry alongside the
/// canonical names. The canonical field is the single source of truth; the
/// legacy key is generated at serialization time and promoted back into the
/// canonical field when an old document only carries the legacy spelling.
const LEGACY_BUILD_ALIASES: &[(&str, &str)] = &[
    ("buildDescription", "description"),
    ("sourceBranch", "repository_branch"),
    ("targetArch", "rustdesk_arch"),
    ("portableMode", "portable_mode"),
    ("includeInstaller", "include_installer"),
    ("debugMode", "debug_mode"),
    ("signExecutable", "sign_executable"),
];

/// Rendezvous/relay server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// FQDN of the rendezvous server, e.g. "hbbs.example.com"
    pub rendezvous_server: String,

    /// Base64 public key of the rendezvous server; set together with
    /// `rendezvous_server` or not at all
    pub public_key: String,

    /// Optional API server URL, e.g. "https://hbbs.example.com"
    pub api_server: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rendezvous_server: String::new(),
            public_key: String::new(),
            api_server: String::new(),
        }
    }
}

/// Security presets and policies baked into the client
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
    pub preset_password: String,
    pub access_key: String,
    pub preset_remove_wallpaper: bool,
    pub preset_block_input: bool,
    pub preset_privacy_mode: bool,
    pub preset_record_session: bool,
    pub encrypted_only: bool,
    pub require_login: bool,
}

/// Visual customization of the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandingConfig {
    pub app_name: String,
    pub company_name: String,
    pub website_url: String,
    pub logo_url: String,
    pub icon_url: String,
    pub welcome_text: String,
    pub support_info: String,
    pub product_name: String,
    pub main_window_title: String,
    pub about_text: String,
    pub logo_light: String,
    pub logo_dark: String,
    pub icon_win_ico: String,
    pub icon_win_png: String,
    pub icon_mac_icns: String,
    pub icon_linux_png: String,
    /// Accent color in #RRGGBB form
    pub theme_color: String,
    pub custom_css: String,
    pub custom_favicon: String,
    pub hide_about_menu: bool,
    pub hide_help_menu: bool,
    pub hide_settings_menu: bool,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            app_name: "RustDesk".to_string(),
            company_name: String::new(),
            website_url: String::new(),
            logo_url: String::new(),
            icon_url: String::new(),
            welcome_text: String::new(),
            support_info: String::new(),
            product_name: "RustDesk".to_string(),
            main_window_title: String::new(),
            about_text: String::new(),
            logo_light: String::new(),
            logo_dark: String::new(),
            icon_win_ico: String::new(),
            icon_win_png: String::new(),
            icon_mac_icns: String::new(),
            icon_linux_png: String::new(),
            theme_color: "#0a84ff".to_string(),
            custom_css: String::new(),
            custom_favicon: String::new(),
            hide_about_menu: false,
            hide_help_menu: false,
            hide_settings_menu: false,
        }
    }
}

// Default video quality requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    Low,
    Medium,
    High,
    Best,
}

// UI theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiTheme {
    System,
    Dark,
    Light,
}

impl UiTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiTheme::System => "system",
            UiTheme::Dark => "dark",
            UiTheme::Light => "light",
        }
    }
}

/// Network and performance tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancedConfig {
    pub custom_tcp_port: String,
    pub custom_udp_port: String,
    pub custom_stun_servers: String,
    pub default_video_quality: VideoQuality,
    /// Frame-rate cap, 1 through 120
    pub max_fps: u32,
    pub enable_hardware_codec: bool,
    pub enable_direct_ip_access: bool,
    pub disable_audio: bool,
    pub enable_file_transfer: bool,
    pub theme: UiTheme,
    pub lang: String,
    /// Free-form key/value overrides passed through to the client config
    pub custom_key_values: HashMap<String, String>,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            custom_tcp_port: String::new(),
            custom_udp_port: String::new(),
            custom_stun_servers: String::new(),
            default_video_quality: VideoQuality::Medium,
            max_fps: 30,
            enable_hardware_codec: true,
            enable_direct_ip_access: true,
            disable_audio: false,
            enable_file_transfer: true,
            theme: UiTheme::System,
            lang: "en".to_string(),
            custom_key_values: HashMap::new(),
        }
    }
}

// Target architecture for the compiled client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetArch {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "aarch64")]
    Aarch64,
}

impl TargetArch {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::X86_64 => "x86_64",
            TargetArch::Aarch64 => "aarch64",
        }
    }
}

// Build platform; only one is supported today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildPlatform {
    #[serde(rename = "windows-x64")]
    WindowsX64,
}

impl BuildPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildPlatform::WindowsX64 => "windows-x64",
        }
    }
}

// Artifact kinds the build can publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Exe,
    Msi,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Exe => "exe",
            ArtifactKind::Msi => "msi",
        }
    }
}

/// Options forwarded to the remote build pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
    pub executable_name: String,
    /// Release tag in vMAJOR.MINOR.PATCH form
    pub version: String,
    pub build_description: String,
    /// Upstream branch the client is built from
    pub source_branch: String,
    pub target_arch: TargetArch,
    pub portable_mode: bool,
    pub include_installer: bool,
    pub debug_mode: bool,
    pub sign_executable: bool,
    pub platform: BuildPlatform,
    pub artifacts: Vec<ArtifactKind>,
    pub publish_release: bool,
    pub upload_artifacts: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            executable_name: String::new(),
            version: "v1.0.0".to_string(),
            build_description: String::new(),
            source_branch: "master".to_string(),
            target_arch: TargetArch::X86_64,
            portable_mode: false,
            include_installer: true,
            debug_mode: false,
            sign_executable: false,
            platform: BuildPlatform::WindowsX64,
            artifacts: vec![ArtifactKind::Exe],
            publish_release: false,
            upload_artifacts: true,
        }
    }
}

/// The full configuration record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub branding: BrandingConfig,
    pub advanced: AdvancedConfig,
    pub build: BuildConfig,
}

impl Config {
    /// Serialize to the persisted/exported document shape, which carries the
    /// legacy build aliases alongside the canonical fields
    pub fn to_document(&self) -> Result<Value, String> {
        let mut doc = serde_json::to_value(self)
            .map_err(|e| format!("Failed to serialize configuration: {e}"))?;

        if let Some(Value::Object(build)) = doc.get_mut("build") {
            append_legacy_build_aliases(build);
        }

        Ok(doc)
    }
}

fn append_legacy_build_aliases(build: &mut Map<String, Value>) {
    for (canonical, legacy) in LEGACY_BUILD_ALIASES {
        if let Some(value) = build.get(*canonical) {
            let value = value.clone();
            build.insert((*legacy).to_string(), value);
        }
    }
}

/// Promote legacy build spellings into their canonical fields when only the
/// legacy key is present, then drop the legacy keys. Documents written by
/// older tooling populated one set without reconciling the other; the
/// canonical value wins whenever both are present.
pub fn promote_legacy_build_fields(doc: &mut Value) {
    let build = match doc.get_mut("build") {
        Some(Value::Object(build)) => build,
        _ => return,
    };

    for (canonical, legacy) in LEGACY_BUILD_ALIASES {
        if let Some(value) = build.remove(*legacy) {
            if !build.contains_key(*canonical) {
                build.insert((*canonical).to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.branding.app_name, "RustDesk");
        assert_eq!(config.branding.product_name, "RustDesk");
        assert_eq!(config.branding.theme_color, "#0a84ff");
        assert_eq!(config.advanced.max_fps, 30);
        assert_eq!(config.advanced.default_video_quality, VideoQuality::Medium);
        assert_eq!(config.build.version, "v1.0.0");
        assert_eq!(config.build.source_branch, "master");
        assert_eq!(config.build.artifacts, vec![ArtifactKind::Exe]);
        assert!(config.build.include_installer);
        assert!(config.build.upload_artifacts);
        assert!(!config.build.publish_release);
    }

    #[test]
    fn test_document_carries_legacy_aliases() {
        let mut config = Config::default();
        config.build.source_branch = "release-1.4".to_string();
        config.build.portable_mode = true;

        let doc = config.to_document().unwrap();
        let build = doc.get("build").unwrap();

        assert_eq!(build["sourceBranch"], "release-1.4");
        assert_eq!(build["repository_branch"], "release-1.4");
        assert_eq!(build["portableMode"], true);
        assert_eq!(build["portable_mode"], true);
        assert_eq!(build["rustdesk_arch"], "x86_64");
    }

    #[test]
    fn test_promote_legacy_fields_fills_missing_canonical() {
        let mut doc = json!({
            "build": {
                "repository_branch": "hotfix",
                "debug_mode": true
            }
        });

        promote_legacy_build_fields(&mut doc);

        let build = doc.get("build").unwrap();
        assert_eq!(build["sourceBranch"], "hotfix");
        assert_eq!(build["debugMode"], true);
        assert!(build.get("repository_branch").is_none());
        assert!(build.get("debug_mode").is_none());
    }

    #[test]
    fn test_promote_legacy_fields_prefers_canonical() {
        let mut doc = json!({
            "build": {
                "sourceBranch": "master",
                "repository_branch": "stale"
            }
        });

        promote_legacy_build_fields(&mut doc);

        assert_eq!(doc["build"]["sourceBranch"], "master");
        assert!(doc["build"].get("repository_branch").is_none());
    }

    #[test]
    fn test_document_round_trips_through_promotion() {
        let config = Config::default();
        let mut doc = config.to_document().unwrap();

        promote_legacy_build_fields(&mut doc);
        let restored: Config = serde_json::from_value(doc).unwrap();

        assert_eq!(restored, config);
    }
}
