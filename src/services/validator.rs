// Configuration Validator
// Per-field rules plus the server/key pairing rule, composed by `validate`

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::models::{
    AdvancedConfig, ArtifactKind, BrandingConfig, BuildConfig, BuildPlatform, Config,
    SecurityConfig, ServerConfig, TargetArch, UiTheme, VideoQuality,
};

// Patterns are anchored: a value must match in its entirety
const FQDN_PATTERN: &str =
    r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";
const BASE64_PATTERN: &str = r"^[A-Za-z0-9+/]+=*$";
const HEX_COLOR_PATTERN: &str = r"^#[0-9A-Fa-f]{6}$";
const VERSION_PATTERN: &str = r"^v\d+\.\d+\.\d+$";

static FQDN_REGEX: OnceLock<Regex> = OnceLock::new();
static BASE64_REGEX: OnceLock<Regex> = OnceLock::new();
static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn fqdn_regex() -> &'static Regex {
    FQDN_REGEX.get_or_init(|| Regex::new(FQDN_PATTERN).unwrap())
}

fn base64_regex() -> &'static Regex {
    BASE64_REGEX.get_or_init(|| Regex::new(BASE64_PATTERN).unwrap())
}

fn hex_color_regex() -> &'static Regex {
    HEX_COLOR_REGEX.get_or_init(|| Regex::new(HEX_COLOR_PATTERN).unwrap())
}

fn version_regex() -> &'static Regex {
    VERSION_REGEX.get_or_init(|| Regex::new(VERSION_PATTERN).unwrap())
}

/// One violated rule, addressed by the dotted path of the offending field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_path: String,
    pub message: String,
}

/// Validate a candidate document against the configuration schema.
///
/// Returns the fully-defaulted configuration when every rule passes, or the
/// complete ordered list of violations (field definition order; for a field
/// with several simultaneous violations, its format error precedes the
/// pairing error). Never a partial success. The candidate is not mutated and
/// no I/O happens here; re-validating a successful result succeeds again and
/// returns an equal value.
pub fn validate(candidate: &Value) -> Result<Config, Vec<FieldError>> {
    if !candidate.is_object() && !candidate.is_null() {
        return Err(vec![FieldError {
            field_path: "config".to_string(),
            message: "must be an object".to_string(),
        }]);
    }

    let mut errors = Vec::new();

    let server = validate_server(candidate, &mut errors);
    let security = validate_security(candidate, &mut errors);
    let branding = validate_branding(candidate, &mut errors);
    let advanced = validate_advanced(candidate, &mut errors);
    let build = validate_build(candidate, &mut errors);

    if errors.is_empty() {
        Ok(Config {
            server,
            security,
            branding,
            advanced,
            build,
        })
    } else {
        Err(errors)
    }
}

fn validate_server(candidate: &Value, errors: &mut Vec<FieldError>) -> ServerConfig {
    check_section(candidate, "server", errors);

    let rendezvous_server = optional_string(candidate, "server", "rendezvousServer", errors);
    check_pattern(
        &rendezvous_server,
        fqdn_regex(),
        "server.rendezvousServer",
        "must be a fully-qualified domain name",
        errors,
    );

    let public_key = optional_string(candidate, "server", "publicKey", errors);
    check_pattern(
        &public_key,
        base64_regex(),
        "server.publicKey",
        "must be a Base64 string",
        errors,
    );

    let api_server = optional_string(candidate, "server", "apiServer", errors);
    if !api_server.is_empty() && Url::parse(&api_server).is_err() {
        push_error(errors, "server.apiServer", "must be a well-formed URL");
    }

    // Pairing rule: runs over the effective values even when one side failed
    // its format check, so a lone (possibly malformed) server name still
    // surfaces the missing key. The format error above is ordered first.
    if rendezvous_server.is_empty() != public_key.is_empty() {
        push_error(
            errors,
            "server.rendezvousServer",
            "rendezvousServer and publicKey must be set together",
        );
    }

    ServerConfig {
        rendezvous_server,
        public_key,
        api_server,
    }
}

fn validate_security(candidate: &Value, errors: &mut Vec<FieldError>) -> SecurityConfig {
    check_section(candidate, "security", errors);

    SecurityConfig {
        preset_password: optional_string(candidate, "security", "presetPassword", errors),
        access_key: optional_string(candidate, "security", "accessKey", errors),
        preset_remove_wallpaper: bool_field(candidate, "security", "presetRemoveWallpaper", false, errors),
        preset_block_input: bool_field(candidate, "security", "presetBlockInput", false, errors),
        preset_privacy_mode: bool_field(candidate, "security", "presetPrivacyMode", false, errors),
        preset_record_session: bool_field(candidate, "security", "presetRecordSession", false, errors),
        encrypted_only: bool_field(candidate, "security", "encryptedOnly", false, errors),
        require_login: bool_field(candidate, "security", "requireLogin", false, errors),
    }
}

fn validate_branding(candidate: &Value, errors: &mut Vec<FieldError>) -> BrandingConfig {
    check_section(candidate, "branding", errors);

    let app_name = required_string(candidate, "branding", "appName", "RustDesk", errors);
    let company_name = optional_string(candidate, "branding", "companyName", errors);
    let website_url = optional_string(candidate, "branding", "websiteUrl", errors);
    let logo_url = optional_string(candidate, "branding", "logoUrl", errors);
    let icon_url = optional_string(candidate, "branding", "iconUrl", errors);
    let welcome_text = optional_string(candidate, "branding", "welcomeText", errors);
    let support_info = optional_string(candidate, "branding", "supportInfo", errors);
    let product_name = required_string(candidate, "branding", "productName", "RustDesk", errors);
    let main_window_title = optional_string(candidate, "branding", "mainWindowTitle", errors);
    let about_text = optional_string(candidate, "branding", "aboutText", errors);
    let logo_light = optional_string(candidate, "branding", "logoLight", errors);
    let logo_dark = optional_string(candidate, "branding", "logoDark", errors);
    let icon_win_ico = optional_string(candidate, "branding", "iconWinIco", errors);
    let icon_win_png = optional_string(candidate, "branding", "iconWinPng", errors);
    let icon_mac_icns = optional_string(candidate, "branding", "iconMacIcns", errors);
    let icon_linux_png = optional_string(candidate, "branding", "iconLinuxPng", errors);

    let theme_color = required_string(candidate, "branding", "themeColor", "#0a84ff", errors);
    check_pattern(
        &theme_color,
        hex_color_regex(),
        "branding.themeColor",
        "must be a hex color in #RRGGBB form",
        errors,
    );

    BrandingConfig {
        app_name,
        company_name,
        website_url,
        logo_url,
        icon_url,
        welcome_text,
        support_info,
        product_name,
        main_window_title,
        about_text,
        logo_light,
        logo_dark,
        icon_win_ico,
        icon_win_png,
        icon_mac_icns,
        icon_linux_png,
        theme_color,
        custom_css: optional_string(candidate, "branding", "customCss", errors),
        custom_favicon: optional_string(candidate, "branding", "customFavicon", errors),
        hide_about_menu: bool_field(candidate, "branding", "hideAboutMenu", false, errors),
        hide_help_menu: bool_field(candidate, "branding", "hideHelpMenu", false, errors),
        hide_settings_menu: bool_field(candidate, "branding", "hideSettingsMenu", false, errors),
    }
}

fn validate_advanced(candidate: &Value, errors: &mut Vec<FieldError>) -> AdvancedConfig {
    check_section(candidate, "advanced", errors);

    AdvancedConfig {
        custom_tcp_port: optional_string(candidate, "advanced", "customTcpPort", errors),
        custom_udp_port: optional_string(candidate, "advanced", "customUdpPort", errors),
        custom_stun_servers: optional_string(candidate, "advanced", "customStunServers", errors),
        default_video_quality: enum_field(
            candidate,
            "advanced",
            "defaultVideoQuality",
            VideoQuality::Medium,
            "must be one of: low, medium, high, best",
            errors,
        ),
        max_fps: max_fps_field(candidate, errors),
        enable_hardware_codec: bool_field(candidate, "advanced", "enableHardwareCodec", true, errors),
        enable_direct_ip_access: bool_field(candidate, "advanced", "enableDirectIpAccess", true, errors),
        disable_audio: bool_field(candidate, "advanced", "disableAudio", false, errors),
        enable_file_transfer: bool_field(candidate, "advanced", "enableFileTransfer", true, errors),
        theme: enum_field(
            candidate,
            "advanced",
            "theme",
            UiTheme::System,
            "must be one of: system, dark, light",
            errors,
        ),
        lang: string_with_default(candidate, "advanced", "lang", "en", errors),
        custom_key_values: key_values_field(candidate, errors),
    }
}

fn validate_build(candidate: &Value, errors: &mut Vec<FieldError>) -> BuildConfig {
    check_section(candidate, "build", errors);

    let executable_name = optional_string(candidate, "build", "executableName", errors);

    let version = required_string(candidate, "build", "version", "v1.0.0", errors);
    check_pattern(
        &version,
        version_regex(),
        "build.version",
        "must match vMAJOR.MINOR.PATCH, e.g. v1.0.0",
        errors,
    );

    BuildConfig {
        executable_name,
        version,
        build_description: optional_string(candidate, "build", "buildDescription", errors),
        source_branch: string_with_default(candidate, "build", "sourceBranch", "master", errors),
        target_arch: enum_field(
            candidate,
            "build",
            "targetArch",
            TargetArch::X86_64,
            "must be one of: x86_64, aarch64",
            errors,
        ),
        portable_mode: bool_field(candidate, "build", "portableMode", false, errors),
        include_installer: bool_field(candidate, "build", "includeInstaller", true, errors),
        debug_mode: bool_field(candidate, "build", "debugMode", false, errors),
        sign_executable: bool_field(candidate, "build", "signExecutable", false, errors),
        platform: enum_field(
            candidate,
            "build",
            "platform",
            BuildPlatform::WindowsX64,
            "must be one of: windows-x64",
            errors,
        ),
        artifacts: artifacts_field(candidate, errors),
        publish_release: bool_field(candidate, "build", "publishRelease", false, errors),
        upload_artifacts: bool_field(candidate, "build", "uploadArtifacts", true, errors),
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn field<'a>(candidate: &'a Value, section: &str, name: &str) -> Option<&'a Value> {
    match candidate.get(section) {
        Some(value) => match value.get(name) {
            Some(Value::Null) => None,
            other => other,
        },
        None => None,
    }
}

fn push_error(errors: &mut Vec<FieldError>, field_path: &str, message: &str) {
    errors.push(FieldError {
        field_path: field_path.to_string(),
        message: message.to_string(),
    });
}

/// A section present with a non-object value is itself a violation; its
/// fields are then treated as absent.
fn check_section(candidate: &Value, section: &str, errors: &mut Vec<FieldError>) {
    if let Some(value) = candidate.get(section) {
        if !value.is_object() && !value.is_null() {
            push_error(errors, section, "must be an object");
        }
    }
}

/// Optional string: absent means empty, present must be a string
fn optional_string(
    candidate: &Value,
    section: &str,
    name: &str,
    errors: &mut Vec<FieldError>,
) -> String {
    match field(candidate, section, name) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            push_error(errors, &format!("{section}.{name}"), "must be a string");
            String::new()
        }
    }
}

/// Optional string with a documented default for the absent case
fn string_with_default(
    candidate: &Value,
    section: &str,
    name: &str,
    default: &str,
    errors: &mut Vec<FieldError>,
) -> String {
    match field(candidate, section, name) {
        None => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            push_error(errors, &format!("{section}.{name}"), "must be a string");
            default.to_string()
        }
    }
}

/// Required string: absent takes the documented default, present-but-empty is
/// a violation
fn required_string(
    candidate: &Value,
    section: &str,
    name: &str,
    default: &str,
    errors: &mut Vec<FieldError>,
) -> String {
    match field(candidate, section, name) {
        None => default.to_string(),
        Some(Value::String(s)) => {
            if s.is_empty() {
                push_error(errors, &format!("{section}.{name}"), "required");
            }
            s.clone()
        }
        Some(_) => {
            push_error(errors, &format!("{section}.{name}"), "must be a string");
            default.to_string()
        }
    }
}

fn bool_field(
    candidate: &Value,
    section: &str,
    name: &str,
    default: bool,
    errors: &mut Vec<FieldError>,
) -> bool {
    match field(candidate, section, name) {
        None => default,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            push_error(errors, &format!("{section}.{name}"), "must be a boolean");
            default
        }
    }
}

/// Fixed-literal-set field; any value outside the set is a violation, with no
/// coercion
fn enum_field<T: DeserializeOwned>(
    candidate: &Value,
    section: &str,
    name: &str,
    default: T,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> T {
    match field(candidate, section, name) {
        None => default,
        Some(value) => match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => parsed,
            Err(_) => {
                push_error(errors, &format!("{section}.{name}"), message);
                default
            }
        },
    }
}

/// Frame-rate cap: integer within [1, 120], no clamping
fn max_fps_field(candidate: &Value, errors: &mut Vec<FieldError>) -> u32 {
    match field(candidate, "advanced", "maxFps") {
        None => 30,
        Some(value) => match value.as_i64() {
            Some(fps) if (1..=120).contains(&fps) => fps as u32,
            Some(_) => {
                push_error(errors, "advanced.maxFps", "must be between 1 and 120");
                30
            }
            None => {
                push_error(errors, "advanced.maxFps", "must be an integer");
                30
            }
        },
    }
}

fn key_values_field(candidate: &Value, errors: &mut Vec<FieldError>) -> HashMap<String, String> {
    match field(candidate, "advanced", "customKeyValues") {
        None => HashMap::new(),
        Some(Value::Object(map)) => {
            let mut out = HashMap::new();
            let mut non_string = false;
            for (key, value) in map {
                match value {
                    Value::String(s) => {
                        out.insert(key.clone(), s.clone());
                    }
                    _ => non_string = true,
                }
            }
            if non_string {
                push_error(errors, "advanced.customKeyValues", "values must be strings");
            }
            out
        }
        Some(_) => {
            push_error(errors, "advanced.customKeyValues", "must be a string map");
            HashMap::new()
        }
    }
}

fn artifacts_field(candidate: &Value, errors: &mut Vec<FieldError>) -> Vec<ArtifactKind> {
    match field(candidate, "build", "artifacts") {
        None => vec![ArtifactKind::Exe],
        Some(value) => match serde_json::from_value::<Vec<ArtifactKind>>(value.clone()) {
            Ok(list) => list,
            Err(_) => {
                push_error(errors, "build.artifacts", "must be a list of: exe, msi");
                vec![ArtifactKind::Exe]
            }
        },
    }
}

/// Anchored format check, applied to non-empty values only (emptiness is
/// handled by the required/pairing rules)
fn check_pattern(
    value: &str,
    regex: &Regex,
    field_path: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) {
    if !value.is_empty() && !regex.is_match(value) {
        push_error(errors, field_path, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paired_server() -> Value {
        json!({
            "rendezvousServer": "hbbs.example.com",
            "publicKey": "OeVuKk5nlHiXp+APNn0Y3pC1Iwpwn44JGqrQCsWqmBw="
        })
    }

    #[test]
    fn test_empty_candidate_yields_all_defaults() {
        let config = validate(&json!({})).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_required_only_candidate_defaults_every_optional_field() {
        let candidate = json!({
            "server": paired_server(),
            "branding": { "appName": "Acme Remote" }
        });

        let config = validate(&candidate).unwrap();
        assert_eq!(config.server.rendezvous_server, "hbbs.example.com");
        assert_eq!(config.branding.app_name, "Acme Remote");
        assert_eq!(config.branding.product_name, "RustDesk");
        assert_eq!(config.branding.theme_color, "#0a84ff");
        assert_eq!(config.advanced.max_fps, 30);
        assert_eq!(config.advanced.lang, "en");
        assert_eq!(config.build.version, "v1.0.0");
        assert_eq!(config.build.source_branch, "master");
        assert!(config.build.include_installer);
        assert!(!config.security.encrypted_only);
        assert!(config.advanced.custom_key_values.is_empty());
    }

    #[test]
    fn test_validation_is_idempotent_on_its_own_output() {
        let candidate = json!({
            "server": paired_server(),
            "branding": { "appName": "Acme Remote" },
            "advanced": { "maxFps": 60 }
        });

        let config = validate(&candidate).unwrap();
        let revalidated = validate(&serde_json::to_value(&config).unwrap()).unwrap();
        assert_eq!(revalidated, config);
    }

    #[test]
    fn test_candidate_is_not_mutated() {
        let candidate = json!({ "server": { "rendezvousServer": "bad_host!" } });
        let before = candidate.clone();
        let _ = validate(&candidate);
        assert_eq!(candidate, before);
    }

    #[test]
    fn test_lone_rendezvous_server_fails_pairing() {
        let candidate = json!({ "server": { "rendezvousServer": "hbbs.example.com" } });
        let errors = validate(&candidate).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_path, "server.rendezvousServer");
        assert!(errors[0].message.contains("together"));
    }

    #[test]
    fn test_lone_public_key_fails_pairing_on_rendezvous_server() {
        let candidate = json!({ "server": { "publicKey": "QUJDRA==" } });
        let errors = validate(&candidate).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_path, "server.rendezvousServer");
    }

    #[test]
    fn test_format_error_precedes_pairing_error() {
        let candidate = json!({ "server": { "rendezvousServer": "bad_host!" } });
        let errors = validate(&candidate).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field_path, "server.rendezvousServer");
        assert!(errors[0].message.contains("domain name"));
        assert_eq!(errors[1].field_path, "server.rendezvousServer");
        assert!(errors[1].message.contains("together"));
    }

    #[test]
    fn test_pairing_runs_even_when_one_side_is_malformed() {
        // Both present, key malformed: format error on the key only, the pair
        // itself is complete so no pairing error
        let candidate = json!({
            "server": {
                "rendezvousServer": "hbbs.example.com",
                "publicKey": "not base64!!"
            }
        });
        let errors = validate(&candidate).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_path, "server.publicKey");
    }

    #[test]
    fn test_fqdn_rule_is_anchored() {
        for bad in ["bad_host!", "-leading.example.com", "trailing-.example.com", "a b.com"] {
            let candidate = json!({
                "server": { "rendezvousServer": bad, "publicKey": "QUJDRA==" }
            });
            let errors = validate(&candidate).unwrap_err();
            assert_eq!(errors[0].field_path, "server.rendezvousServer", "{bad}");
        }

        for good in ["hbbs.example.com", "localhost", "a-1.b-2.example"] {
            let candidate = json!({
                "server": { "rendezvousServer": good, "publicKey": "QUJDRA==" }
            });
            assert!(validate(&candidate).is_ok(), "{good}");
        }
    }

    #[test]
    fn test_api_server_must_be_a_url() {
        let candidate = json!({ "server": { "apiServer": "hbbs.example.com" } });
        let errors = validate(&candidate).unwrap_err();
        assert_eq!(errors[0].field_path, "server.apiServer");

        let candidate = json!({ "server": { "apiServer": "https://hbbs.example.com" } });
        assert!(validate(&candidate).is_ok());

        // Absent and empty are both fine
        assert!(validate(&json!({ "server": { "apiServer": "" } })).is_ok());
    }

    #[test]
    fn test_version_vectors() {
        for good in ["v1.0.0", "v12.3.45"] {
            let candidate = json!({ "build": { "version": good } });
            assert!(validate(&candidate).is_ok(), "{good}");
        }

        for bad in ["1.0.0", "v1.0", "v1.0.0-beta"] {
            let candidate = json!({ "build": { "version": bad } });
            let errors = validate(&candidate).unwrap_err();
            assert_eq!(errors[0].field_path, "build.version", "{bad}");
        }
    }

    #[test]
    fn test_theme_color_vectors() {
        assert!(validate(&json!({ "branding": { "themeColor": "#0a84ff" } })).is_ok());

        for bad in ["0a84ff", "#0a84f", "#GGGGGG"] {
            let errors = validate(&json!({ "branding": { "themeColor": bad } })).unwrap_err();
            assert_eq!(errors[0].field_path, "branding.themeColor", "{bad}");
        }
    }

    #[test]
    fn test_max_fps_vectors() {
        for good in [1, 30, 120] {
            assert!(validate(&json!({ "advanced": { "maxFps": good } })).is_ok(), "{good}");
        }

        for bad in [0, 121] {
            let errors = validate(&json!({ "advanced": { "maxFps": bad } })).unwrap_err();
            assert_eq!(errors[0].message, "must be between 1 and 120", "{bad}");
        }

        let errors = validate(&json!({ "advanced": { "maxFps": 30.5 } })).unwrap_err();
        assert_eq!(errors[0].message, "must be an integer");
    }

    #[test]
    fn test_enums_reject_without_coercion() {
        let errors =
            validate(&json!({ "advanced": { "defaultVideoQuality": "ultra" } })).unwrap_err();
        assert_eq!(errors[0].field_path, "advanced.defaultVideoQuality");

        let errors = validate(&json!({ "advanced": { "theme": "Dark" } })).unwrap_err();
        assert_eq!(errors[0].field_path, "advanced.theme");

        let errors = validate(&json!({ "build": { "targetArch": "arm64" } })).unwrap_err();
        assert_eq!(errors[0].field_path, "build.targetArch");

        let config = validate(&json!({ "build": { "targetArch": "aarch64" } })).unwrap();
        assert_eq!(config.build.target_arch, TargetArch::Aarch64);
    }

    #[test]
    fn test_empty_required_field_reports_required() {
        let errors = validate(&json!({ "branding": { "appName": "" } })).unwrap_err();
        assert_eq!(errors[0].field_path, "branding.appName");
        assert_eq!(errors[0].message, "required");

        let errors = validate(&json!({ "build": { "version": "" } })).unwrap_err();
        assert_eq!(errors[0].message, "required");
    }

    #[test]
    fn test_wrong_types_are_field_errors() {
        let candidate = json!({
            "server": { "rendezvousServer": 5 },
            "security": { "encryptedOnly": "yes" },
            "advanced": { "customKeyValues": [] }
        });
        let errors = validate(&candidate).unwrap_err();

        let paths: Vec<&str> = errors.iter().map(|e| e.field_path.as_str()).collect();
        assert!(paths.contains(&"server.rendezvousServer"));
        assert!(paths.contains(&"security.encryptedOnly"));
        assert!(paths.contains(&"advanced.customKeyValues"));
    }

    #[test]
    fn test_errors_come_in_definition_order() {
        let candidate = json!({
            "server": { "rendezvousServer": "bad_host!", "publicKey": "QUJDRA==" },
            "branding": { "themeColor": "blue" },
            "advanced": { "maxFps": 0 },
            "build": { "version": "1.0" }
        });
        let errors = validate(&candidate).unwrap_err();

        let paths: Vec<&str> = errors.iter().map(|e| e.field_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "server.rendezvousServer",
                "branding.themeColor",
                "advanced.maxFps",
                "build.version"
            ]
        );
    }

    #[test]
    fn test_non_object_section_is_rejected() {
        let errors = validate(&json!({ "security": 5 })).unwrap_err();
        assert_eq!(errors[0].field_path, "security");
        assert_eq!(errors[0].message, "must be an object");
    }

    #[test]
    fn test_non_object_candidate_is_rejected() {
        let errors = validate(&json!("not a config")).unwrap_err();
        assert_eq!(errors[0].field_path, "config");
    }

    #[test]
    fn test_custom_key_values_pass_through() {
        let candidate = json!({
            "advanced": { "customKeyValues": { "relay-server": "r.example.com" } }
        });
        let config = validate(&candidate).unwrap();
        assert_eq!(
            config.advanced.custom_key_values.get("relay-server").map(String::as_str),
            Some("r.example.com")
        );
    }
}
