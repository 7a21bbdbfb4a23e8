//! 文件监听配置模块
//!
//! 管理文件监听的白名单和黑名单，对应配置文件中的 `[watch]` 段
//!
//! ## 配置格式
//!
//! ```toml
//! [watch]
//! whitelist = ["*.md"]
//! blacklist = [".git/**/*", "*.tmp"]
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// glob → 正则缓存
static PATTERN_CACHE: Lazy<Mutex<HashMap<String, Option<Regex>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// 文件监听配置
///
/// 控制哪些文件变化会触发重新索引
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// 白名单 glob 模式列表
    ///
    /// 空列表表示允许所有文件
    pub whitelist: Vec<String>,

    /// 黑名单 glob 模式列表
    pub blacklist: Vec<String>,
}

impl Default for WatchConfig {
    /// 默认只允许 .md 文件，排除 .git 和编辑器临时文件
    fn default() -> Self {
        Self {
            whitelist: vec!["*.md".to_string()],
            blacklist: vec![
                ".git/**/*".to_string(),
                "*.tmp".to_string(),
                "*.bak".to_string(),
                "*.swp".to_string(),
                ".DS_Store".to_string(),
            ],
        }
    }
}

impl WatchConfig {
    /// 不做任何过滤的配置
    pub fn allow_all() -> Self {
        Self {
            whitelist: Vec::new(),
            blacklist: Vec::new(),
        }
    }

    /// 检查路径是否被允许
    ///
    /// 规则：
    /// 1. 不能匹配黑名单中的任何模式
    /// 2. 白名单非空时，必须匹配其中一个模式
    ///
    /// # Arguments
    ///
    /// * `path` - 要检查的文件路径
    pub fn is_allowed(&self, path: &Path) -> bool {
        if self.is_blacklisted(path) {
            return false;
        }
        self.whitelist.is_empty() || self.is_whitelisted(path)
    }

    /// 检查路径是否匹配白名单
    pub fn is_whitelisted(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        let file_name = file_name(path);
        self.whitelist
            .iter()
            .any(|pattern| matches_pattern(pattern, &path_str) || matches_pattern(pattern, &file_name))
    }

    /// 检查路径是否匹配黑名单
    ///
    /// 含路径分隔符的模式匹配完整路径，否则只匹配文件名
    pub fn is_blacklisted(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        let file_name = file_name(path);
        self.blacklist.iter().any(|pattern| {
            if pattern.contains('/') || pattern.contains('\\') {
                matches_pattern(pattern, &path_str) || contains_segment_match(pattern, path)
            } else {
                matches_pattern(pattern, &file_name)
            }
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 绝对路径下 `.git/**/*` 这样的模式按路径中的某一段起匹配
fn contains_segment_match(pattern: &str, path: &Path) -> bool {
    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (1..components.len()).any(|start| matches_pattern(pattern, &components[start..].join("/")))
}

/// 简单的 glob 匹配
///
/// `*` 匹配任意字符，`**/` 视同 `*`，`?` 匹配单个字符
fn matches_pattern(pattern: &str, text: &str) -> bool {
    let pattern = pattern.replace("**/", "*");
    if !pattern.contains(['*', '?']) {
        return pattern == text;
    }

    let Ok(mut cache) = PATTERN_CACHE.lock() else {
        return false;
    };
    cache
        .entry(pattern.clone())
        .or_insert_with(|| Regex::new(&glob_to_regex(&pattern)).ok())
        .as_ref()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// glob 转为锚定的正则表达式
fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2 + 2);
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_allowed_default_config() {
        let config = WatchConfig::default();

        assert!(config.is_allowed(Path::new("notes/HomePage.md")));
        assert!(!config.is_allowed(Path::new(".git/config")));
        assert!(!config.is_allowed(Path::new("/home/me/notes/.git/index.md")));
        assert!(!config.is_allowed(Path::new("notes/draft.md.tmp")));
        assert!(!config.is_allowed(Path::new("notes/image.png")));
    }

    #[test]
    fn test_custom_lists() {
        let config = WatchConfig {
            whitelist: vec!["*.md".to_string(), "*.markdown".to_string()],
            blacklist: vec!["drafts/**/*".to_string()],
        };

        assert!(config.is_allowed(Path::new("Guide.markdown")));
        assert!(!config.is_allowed(Path::new("drafts/Idea.md")));
    }

    #[test]
    fn test_allow_all() {
        let config = WatchConfig::allow_all();
        assert!(config.is_allowed(Path::new("anything.bin")));
    }

    #[test]
    fn test_matches_pattern_anchored() {
        assert!(matches_pattern("*.md", "test.md"));
        assert!(!matches_pattern("*.md", "test.md.bak"));
        assert!(matches_pattern("notes/*.md", "notes/test.md"));
        assert!(!matches_pattern("notes/*.md", "docs/test.md"));
        assert!(matches_pattern(".DS_Store", ".DS_Store"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: WatchConfig = toml::from_str("blacklist = [\"*.tmp\"]").unwrap();
        assert_eq!(config.whitelist, vec!["*.md"]);
        assert_eq!(config.blacklist, vec!["*.tmp"]);
    }
}
