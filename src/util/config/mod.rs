//! Coherence checker configuration
//!
//! Supports user-level and project-level configuration with merge semantics.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Project-level (coherence.toml next to the graph, or --config)
//! 3. User-level (~/.config/yaoxiang/coherence.toml)
//! 4. Default values
//! ```
//!
//! # Example
//!
//! ```toml
//! [check]
//! fundamental = ["core.Box"]
//! parallel = true
//! deny_duplicates = false
//!
//! [output]
//! format = "text"
//! colors = true
//! lang = "en"
//!
//! [log]
//! level = "warn"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::module::TypeRef;
use crate::util::logger::LogLevel;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "coherence.toml";

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// 完整配置（合并后）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CoherenceConfig {
    pub check: CheckConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

/// Check settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckConfig {
    /// 额外的基础类型构造器，`module.Type` 形式
    pub fundamental: Vec<String>,
    /// 多模块检查时使用 rayon 并行
    pub parallel: bool,
    /// 重复实现也使退出码非零
    pub deny_duplicates: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            fundamental: Vec::new(),
            parallel: true,
            deny_duplicates: false,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub colors: bool,
    /// 诊断语言（en / zh）
    pub lang: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            colors: true,
            lang: "en".to_string(),
        }
    }
}

/// Log settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LogConfig {
    pub level: LogLevel,
}

/// 单个配置文件的内容；未出现的键不覆盖低优先级的值
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    pub check: CheckLayer,
    #[serde(default)]
    pub output: OutputLayer,
    #[serde(default)]
    pub log: LogLayer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckLayer {
    pub fundamental: Option<Vec<String>>,
    pub parallel: Option<bool>,
    pub deny_duplicates: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputLayer {
    pub format: Option<OutputFormat>,
    pub colors: Option<bool>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogLayer {
    pub level: Option<LogLevel>,
}

impl CoherenceConfig {
    /// 用更高优先级的配置层覆盖
    pub fn apply(
        &mut self,
        layer: ConfigLayer,
    ) {
        let ConfigLayer { check, output, log } = layer;
        if let Some(fundamental) = check.fundamental {
            self.check.fundamental = fundamental;
        }
        if let Some(parallel) = check.parallel {
            self.check.parallel = parallel;
        }
        if let Some(deny) = check.deny_duplicates {
            self.check.deny_duplicates = deny;
        }
        if let Some(format) = output.format {
            self.output.format = format;
        }
        if let Some(colors) = output.colors {
            self.output.colors = colors;
        }
        if let Some(lang) = output.lang {
            self.output.lang = lang;
        }
        if let Some(level) = log.level {
            self.log.level = level;
        }
    }

    /// 解析额外的基础类型构造器
    pub fn fundamental_types(&self) -> Result<Vec<TypeRef>, ConfigError> {
        self.check
            .fundamental
            .iter()
            .map(|entry| {
                TypeRef::parse_qualified(entry)
                    .ok_or_else(|| ConfigError::InvalidFundamental(entry.clone()))
            })
            .collect()
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error in '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid fundamental type '{0}', expected 'module.Type'")]
    InvalidFundamental(String),
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    // Try XDG config directory on Unix
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("yaoxiang"));
    }

    // Fallback to ~/.config/yaoxiang
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("yaoxiang"));
    }

    // On Windows, try %APPDATA%
    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("yaoxiang"));
    }

    None
}

/// Get the user config file path (~/.config/yaoxiang/coherence.toml)
pub fn user_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// 模块图文件旁的项目配置路径
pub fn project_config_path(graph: &Path) -> PathBuf {
    graph
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(CONFIG_FILE_NAME)
}

/// 读取一个配置层
pub fn load_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 按优先级合并配置文件
///
/// `user` 与 `project` 不存在时跳过；`explicit` 是 `--config` 指定的文件，
/// 必须存在，并取代 `project`。
pub fn load_config_from(
    user: Option<&Path>,
    project: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<CoherenceConfig, ConfigError> {
    let mut config = CoherenceConfig::default();

    if let Some(path) = user.filter(|p| p.exists()) {
        debug!(path = %path.display(), "applying user config");
        config.apply(load_layer(path)?);
    }

    match explicit {
        Some(path) => {
            debug!(path = %path.display(), "applying explicit config");
            config.apply(load_layer(path)?);
        }
        None => {
            if let Some(path) = project.filter(|p| p.exists()) {
                debug!(path = %path.display(), "applying project config");
                config.apply(load_layer(path)?);
            }
        }
    }

    Ok(config)
}

/// 加载用户级与项目级配置
pub fn load_config(
    graph: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<CoherenceConfig, ConfigError> {
    let user = user_config_path();
    let project = graph.map(project_config_path);
    load_config_from(user.as_deref(), project.as_deref(), explicit)
}
