use crate::domain::ports::SiteConfigProvider;
use crate::utils::error::{Result, ScaffoldError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_port, validate_relative_path, validate_url,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3000;
pub const PORT_ENV_VAR: &str = "PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub server: ServerConfig,
    pub site: SiteSection,
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: Option<u16>,
    /// Project directory the static roots live in.
    pub root: String,
    pub includes_dir: String,
    pub public_dir: String,
    pub src_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: None,
            root: ".".to_string(),
            includes_dir: "includes".to_string(),
            public_dir: "public".to_string(),
            src_dir: "src".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub origin: String,
    pub module_dir: String,
    pub include_base: String,
    pub auto_include: bool,
    pub mark_active_nav: bool,
    pub strict_includes: bool,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            origin: format!("http://localhost:{}/", DEFAULT_PORT),
            module_dir: "controller".to_string(),
            include_base: "./".to_string(),
            auto_include: true,
            mark_active_nav: true,
            strict_includes: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub output_dir: String,
    pub source_dirs: Vec<String>,
    pub index_file: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: "public".to_string(),
            source_dirs: vec!["src".to_string(), "includes".to_string()],
            index_file: "index.html".to_string(),
        }
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScaffoldError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 檔案不存在時使用預設值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No config file at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScaffoldError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SITE_ORIGIN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScaffoldError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 連接埠優先順序：命令列 > PORT 環境變數 > 設定檔 > 3000
    pub fn resolve_port(&self, cli_port: Option<u16>) -> u16 {
        cli_port
            .or_else(port_from_env)
            .or(self.server.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn project_root(&self) -> PathBuf {
        PathBuf::from(&self.server.root)
    }

    /// includes, public, src (served in this order).
    pub fn static_root_paths(&self) -> Vec<PathBuf> {
        let root = self.project_root();
        vec![
            root.join(&self.server.includes_dir),
            root.join(&self.server.public_dir),
            root.join(&self.server.src_dir),
        ]
    }
}

fn port_from_env() -> Option<u16> {
    let raw = std::env::var(PORT_ENV_VAR).ok()?;
    match raw.trim().parse::<u16>() {
        Ok(port) => Some(port),
        Err(e) => {
            tracing::warn!("Ignoring {}={}: {}", PORT_ENV_VAR, raw, e);
            None
        }
    }
}

impl SiteConfigProvider for SiteConfig {
    fn origin(&self) -> &str {
        &self.site.origin
    }

    fn module_dir(&self) -> &str {
        &self.site.module_dir
    }

    fn include_base(&self) -> &str {
        &self.site.include_base
    }

    fn static_roots(&self) -> Vec<String> {
        self.static_root_paths()
            .into_iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    fn auto_include(&self) -> bool {
        self.site.auto_include
    }

    fn mark_active_nav(&self) -> bool {
        self.site.mark_active_nav
    }

    fn strict_includes(&self) -> bool {
        self.site.strict_includes
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        validate_url("site.origin", &self.site.origin)?;
        validate_relative_path("site.module_dir", &self.site.module_dir)?;
        validate_non_empty_string("site.include_base", &self.site.include_base)?;

        if let Some(port) = self.server.port {
            validate_port("server.port", port)?;
        }
        validate_path("server.root", &self.server.root)?;
        validate_relative_path("server.includes_dir", &self.server.includes_dir)?;
        validate_relative_path("server.public_dir", &self.server.public_dir)?;
        validate_relative_path("server.src_dir", &self.server.src_dir)?;

        validate_relative_path("build.output_dir", &self.build.output_dir)?;
        validate_non_empty_string("build.index_file", &self.build.index_file)?;
        for dir in &self.build.source_dirs {
            validate_relative_path("build.source_dirs", dir)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let toml_content = r#"
[server]
port = 8080

[site]
origin = "https://docs.example.com/"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.server.public_dir, "public");
        assert_eq!(config.site.origin, "https://docs.example.com/");
        assert_eq!(config.site.module_dir, "controller");
        assert!(config.site.auto_include);
        assert_eq!(config.build.source_dirs, vec!["src", "includes"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SCAFFOLD_TEST_ORIGIN", "https://test.example.com/");

        let toml_content = r#"
[site]
origin = "${SCAFFOLD_TEST_ORIGIN}"
"#;

        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.site.origin, "https://test.example.com/");

        std::env::remove_var("SCAFFOLD_TEST_ORIGIN");
    }

    #[test]
    fn test_unknown_env_var_is_left_in_place() {
        let toml_content = r#"
[site]
origin = "${SCAFFOLD_DEFINITELY_UNSET_VAR}"
"#;
        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.site.origin, "${SCAFFOLD_DEFINITELY_UNSET_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[site]
module_dir = "/abs/controller"
"#;
        let config = SiteConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let config = SiteConfig::from_toml_str("[server]\nport = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = SiteConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, ScaffoldError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_resolve_port_prefers_cli() {
        let config = SiteConfig::from_toml_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.resolve_port(Some(4000)), 4000);
    }

    #[test]
    fn test_static_root_order() {
        let config = SiteConfig::from_toml_str("[server]\nroot = \"site\"\n").unwrap();
        assert_eq!(
            config.static_root_paths(),
            vec![
                PathBuf::from("site/includes"),
                PathBuf::from("site/public"),
                PathBuf::from("site/src"),
            ]
        );
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[build]\noutput_dir = \"dist\"\n")
            .unwrap();

        let config = SiteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.build.index_file, "index.html");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = SiteConfig::load_or_default("/definitely/not/here/scaffold.toml").unwrap();
        assert_eq!(config.server.includes_dir, "includes");
    }
}
