//! The `doctor` command
//!
//! Checks that a full analysis could run: which config file is in effect,
//! its values, the provider preset and API key, the idea log, the output
//! directory and the report viewer.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::{
    get_all_provider_presets, get_provider_preset, validate_config, ApiKeySource, AppConfig,
    ConfigLoader, LlmSettings, SecretsConfig,
};
use crate::file_storage::ensure_dir;
use crate::file_storage::ideas::IdeaStore;
use crate::report::find_opener;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Outcome of one diagnostic check
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Pass,
            detail: detail.into(),
        }
    }

    fn warn(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Warn,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Fail,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub checks: Vec<Check>,
}

impl DoctorReport {
    /// No check failed (warnings allowed)
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(|c| c.status != CheckStatus::Fail)
    }
}

/// Run every check using the process environment and the global secrets file.
/// `config_file` is the `--config` path, if one was given.
pub fn doctor(config: &AppConfig, config_file: Option<&Path>) -> DoctorReport {
    let secrets = match SecretsConfig::load() {
        Ok(secrets) => secrets,
        Err(e) => {
            log::warn!("[Doctor] {}", e);
            SecretsConfig::default()
        }
    };
    doctor_with(
        config,
        &ConfigLoader::new(),
        config_file,
        &secrets,
        |name| std::env::var(name).ok(),
    )
}

pub fn doctor_with<F>(
    config: &AppConfig,
    loader: &ConfigLoader,
    config_file: Option<&Path>,
    secrets: &SecretsConfig,
    env_lookup: F,
) -> DoctorReport
where
    F: Fn(&str) -> Option<String>,
{
    let mut checks = vec![
        check_config_file(loader, config_file),
        check_config(config),
        check_provider(config),
    ];
    checks.push(check_api_key(config, secrets, env_lookup));
    checks.push(check_idea_log(config));
    checks.push(check_output_dir(&config.report.output_dir));
    checks.push(check_opener(config));

    for check in &checks {
        log::debug!("[Doctor] {} {:?}: {}", check.name, check.status, check.detail);
    }
    DoctorReport { checks }
}

fn check_config_file(loader: &ConfigLoader, config_file: Option<&Path>) -> Check {
    if let Some(path) = config_file {
        return Check::pass("config_file", format!("{} (--config)", path.display()));
    }
    match loader.global_config_path() {
        Some(path) if loader.global_config_exists() => {
            Check::pass("config_file", path.display().to_string())
        }
        Some(path) => Check::pass(
            "config_file",
            format!("{} not found, using defaults", path.display()),
        ),
        None => Check::warn(
            "config_file",
            "no platform config directory, using defaults",
        ),
    }
}

fn check_config(config: &AppConfig) -> Check {
    match validate_config(config) {
        Ok(()) => Check::pass(
            "config",
            format!(
                "temperature {}, max tokens {}, timeout {}s",
                config.llm.temperature, config.llm.max_tokens, config.llm.timeout_secs
            ),
        ),
        Err(e) => Check::fail("config", e.to_string()),
    }
}

fn check_provider(config: &AppConfig) -> Check {
    match get_provider_preset(&config.llm.provider) {
        Some(preset) => {
            let model = config.llm.model.as_deref().unwrap_or(preset.default_model);
            let base_url = config.llm.base_url.as_deref().unwrap_or(preset.base_url);
            Check::pass("provider", format!("{} ({}) model {}", preset.name, base_url, model))
        }
        None => {
            let known: Vec<&str> = get_all_provider_presets().iter().map(|p| p.id).collect();
            Check::fail(
                "provider",
                format!(
                    "Unknown provider '{}' (known: {})",
                    config.llm.provider,
                    known.join(", ")
                ),
            )
        }
    }
}

fn check_api_key<F>(config: &AppConfig, secrets: &SecretsConfig, env_lookup: F) -> Check
where
    F: Fn(&str) -> Option<String>,
{
    let settings = match LlmSettings::resolve_with_env(&config.llm, secrets, env_lookup) {
        Ok(settings) => settings,
        Err(e) => return Check::fail("api_key", e.to_string()),
    };
    let env_var = get_provider_preset(&settings.provider_id)
        .and_then(|p| p.api_key_env)
        .unwrap_or("");

    match settings.api_key_source {
        ApiKeySource::Environment => Check::pass("api_key", format!("found in {}", env_var)),
        ApiKeySource::SecretsFile => Check::pass("api_key", "found in secrets.toml"),
        ApiKeySource::NotRequired => {
            Check::pass("api_key", format!("not required for {}", settings.provider_id))
        }
        ApiKeySource::Missing if config.execution.dry_run => Check::warn(
            "api_key",
            format!("{} is not set (dry run does not need it)", env_var),
        ),
        ApiKeySource::Missing => Check::fail(
            "api_key",
            format!("{} is not set and secrets.toml has no token", env_var),
        ),
    }
}

fn check_idea_log(config: &AppConfig) -> Check {
    let store = IdeaStore::new(&config.storage.ideas_file);
    match store.read_all() {
        Ok(ideas) => Check::pass(
            "idea_log",
            format!("{} ideas in {}", ideas.len(), store.path().display()),
        ),
        Err(e) => Check::fail("idea_log", e.to_string()),
    }
}

fn check_output_dir(dir: &Path) -> Check {
    if let Err(e) = ensure_dir(dir) {
        return Check::fail("output_dir", e.to_string());
    }

    let marker = dir.join(".write_check");
    match fs::write(&marker, b"ok") {
        Ok(()) => {
            let _ = fs::remove_file(&marker);
            Check::pass("output_dir", format!("{} is writable", dir.display()))
        }
        Err(e) => Check::fail(
            "output_dir",
            format!("{} is not writable: {}", dir.display(), e),
        ),
    }
}

fn check_opener(config: &AppConfig) -> Check {
    match find_opener() {
        Some(program) => Check::pass("viewer", program.display().to_string()),
        None if config.report.open_in_browser => Check::warn(
            "viewer",
            "no desktop opener found; the report will not open automatically",
        ),
        None => Check::pass("viewer", "opening disabled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.ideas_file = dir.join("ideas.json");
        config.report.output_dir = dir.join("visualizations");
        config.report.open_in_browser = false;
        config
    }

    fn run(config: &AppConfig, secrets: &SecretsConfig, key: Option<&str>) -> DoctorReport {
        let global = config.storage.ideas_file.with_file_name("config.toml");
        let loader = ConfigLoader::with_global_path(global);
        doctor_with(config, &loader, None, secrets, |name| {
            key.filter(|_| name == "OPENROUTER_API_KEY").map(str::to_string)
        })
    }

    fn status_of(report: &DoctorReport, name: &str) -> CheckStatus {
        report
            .checks
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.status)
            .unwrap()
    }

    #[test]
    fn test_healthy_with_env_key() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());

        let report = run(&config, &SecretsConfig::default(), Some("sk-test"));

        assert!(report.is_healthy(), "{:?}", report);
        assert_eq!(status_of(&report, "api_key"), CheckStatus::Pass);
        assert!(config.report.output_dir.is_dir());
        assert!(!config.report.output_dir.join(".write_check").exists());
    }

    #[test]
    fn test_missing_key_fails_unless_dry_run() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(temp_dir.path());

        let report = run(&config, &SecretsConfig::default(), None);
        assert!(!report.is_healthy());
        assert_eq!(status_of(&report, "api_key"), CheckStatus::Fail);

        config.execution.dry_run = true;
        let report = run(&config, &SecretsConfig::default(), None);
        assert_eq!(status_of(&report, "api_key"), CheckStatus::Warn);
    }

    #[test]
    fn test_key_from_secrets_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let secrets_path = temp_dir.path().join("secrets.toml");
        fs::write(&secrets_path, "[tokens]\nopenrouter = \"sk-secret\"\n").unwrap();
        let secrets = SecretsConfig::load_from(&secrets_path).unwrap();

        let report = run(&config, &secrets, None);
        let check = report.checks.iter().find(|c| c.name == "api_key").unwrap();
        assert_eq!(check.status, CheckStatus::Pass);
        assert!(check.detail.contains("secrets.toml"));
    }

    #[test]
    fn test_unknown_provider_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(temp_dir.path());
        config.llm.provider = "nowhere".to_string();

        let report = run(&config, &SecretsConfig::default(), None);
        assert_eq!(status_of(&report, "config"), CheckStatus::Fail);
        assert_eq!(status_of(&report, "provider"), CheckStatus::Fail);
        let provider = report.checks.iter().find(|c| c.name == "provider").unwrap();
        assert!(provider.detail.contains("known: openrouter"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config_in(temp_dir.path());
        config.llm.provider = "ollama".to_string();

        let report = run(&config, &SecretsConfig::default(), None);
        assert_eq!(status_of(&report, "api_key"), CheckStatus::Pass);
    }

    #[test]
    fn test_reports_which_config_file_is_used() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(temp_dir.path());
        let global = temp_dir.path().join("config.toml");
        let detail = |report: &DoctorReport| {
            report
                .checks
                .iter()
                .find(|c| c.name == "config_file")
                .map(|c| c.detail.clone())
                .unwrap()
        };

        let report = run(&config, &SecretsConfig::default(), Some("sk-test"));
        assert_eq!(status_of(&report, "config_file"), CheckStatus::Pass);
        assert!(detail(&report).ends_with("not found, using defaults"));

        fs::write(&global, "[llm]\nprovider = \"openrouter\"\n").unwrap();
        let report = run(&config, &SecretsConfig::default(), Some("sk-test"));
        assert_eq!(detail(&report), global.display().to_string());

        let explicit = temp_dir.path().join("team.toml");
        let loader = ConfigLoader::with_global_path(&global);
        let report = doctor_with(
            &config,
            &loader,
            Some(&explicit),
            &SecretsConfig::default(),
            |_| None,
        );
        assert!(detail(&report).contains("team.toml (--config)"));
    }
}
