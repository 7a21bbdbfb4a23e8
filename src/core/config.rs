//! 配置
//!
//! 查找顺序：
//!
//! 1. `--config <path>`
//! 2. 当前目录下的 `notegraph.toml`
//! 3. `<config_dir>/notegraph/config.toml`
//! 4. 内置默认值
//!
//! ```toml
//! notes_dir = "notes"
//! root = "HomePage"
//! overflow = "Recent"
//! debounce_ms = 100
//!
//! [costs]
//! link = 1.0
//! topic_link = 0.001
//! overflow_penalty = 10000.0
//!
//! [watch]
//! whitelist = ["*.md"]
//! ```

use crate::core::watch_config::WatchConfig;
use crate::publish::{EdgeCosts, TraversalConfig, DEFAULT_OVERFLOW, DEFAULT_ROOT};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 当前目录下的配置文件名
pub const LOCAL_CONFIG_FILE: &str = "notegraph.toml";

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 笔记目录
    pub notes_dir: PathBuf,
    /// 公开遍历的根笔记
    pub root: String,
    /// 溢出页，空字符串表示没有
    pub overflow: String,
    /// 重新索引的合并延迟（毫秒）
    pub debounce_ms: u64,
    /// 边权
    pub costs: EdgeCosts,
    /// 文件监听过滤
    pub watch: WatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from("."),
            root: DEFAULT_ROOT.to_string(),
            overflow: DEFAULT_OVERFLOW.to_string(),
            debounce_ms: 100,
            costs: EdgeCosts::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// 从 TOML 字符串解析
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 按查找顺序加载配置
    ///
    /// # Arguments
    ///
    /// * `explicit` - 命令行指定的配置文件，必须存在
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in Self::candidates() {
            if candidate.is_file() {
                tracing::debug!("Loading config from {:?}", candidate);
                return Self::from_file(&candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// 默认查找路径
    pub fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("notegraph").join("config.toml"));
        }
        paths
    }

    /// 检查数值是否合法
    pub fn validate(&self) -> crate::core::error::Result<()> {
        use crate::core::error::NotesError;

        if self.root.trim().is_empty() {
            return Err(NotesError::Config("root must not be empty".to_string()));
        }
        let costs = [
            ("costs.link", self.costs.link),
            ("costs.topic_link", self.costs.topic_link),
            ("costs.overflow_penalty", self.costs.overflow_penalty),
        ];
        for (name, value) in costs {
            if !value.is_finite() || value < 0.0 {
                return Err(NotesError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// 遍历参数
    pub fn traversal(&self) -> TraversalConfig {
        TraversalConfig {
            root: self.root.clone(),
            overflow: Some(self.overflow.clone()).filter(|o| !o.is_empty()),
            costs: self.costs,
        }
    }

    /// 合并延迟
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
