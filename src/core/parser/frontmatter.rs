//! YAML Frontmatter 解析模块
//!
//! 解析 Markdown 文件头部的 YAML 格式元数据
//!
//! ## Frontmatter 格式
//!
//! ```yaml
//! ---
//! title: 笔记标题
//! public: true
//! topic: true
//! aliases: [OldName, Another]
//! aka: [别名, another name]
//! ---
//! ```

use crate::core::error::{NotesError, Result};
use serde_json::{Map, Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

/// Frontmatter 结构
///
/// 保留原始键值（`raw`），同时提供索引需要的字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    /// 显式标题
    pub title: Option<String>,
    /// 是否公开
    pub public: bool,
    /// 是否是主题（hub）笔记
    pub topic: bool,
    /// 别名（进入重定向表）
    pub aliases: Vec<String>,
    /// 额外的搜索词
    pub aka: Vec<String>,
    /// 全部键值
    pub raw: Map<String, Value>,
}

impl Frontmatter {
    /// 创建新的 Frontmatter
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 YAML 文档构造
    fn from_yaml(doc: &Yaml) -> Option<Self> {
        let hash = doc.as_hash()?;
        let mut frontmatter = Frontmatter::new();

        for (key, value) in hash {
            let Some(key) = yaml_key(key) else { continue };
            frontmatter.raw.insert(key, yaml_to_json(value));
        }

        if let Some(title) = hash.get(&Yaml::String("title".to_string())) {
            frontmatter.title = scalar_string(title).filter(|t| !t.is_empty());
        }

        if let Some(public) = hash.get(&Yaml::String("public".to_string())) {
            frontmatter.public = is_truthy(public);
        }

        if let Some(topic) = hash.get(&Yaml::String("topic".to_string())) {
            frontmatter.topic = is_truthy(topic);
        }

        if let Some(aliases) = hash.get(&Yaml::String("aliases".to_string())) {
            frontmatter.aliases = string_list(aliases);
        }

        if let Some(aka) = hash.get(&Yaml::String("aka".to_string())) {
            frontmatter.aka = string_list(aka);
        }

        Some(frontmatter)
    }
}

/// 解析 YAML frontmatter
///
/// # Arguments
///
/// * `slug` - 笔记 ID（用于错误信息）
/// * `content` - 完整的笔记源码
///
/// # Returns
///
/// (frontmatter, 正文)；没有 frontmatter 时返回默认值和原文
pub fn parse_frontmatter(slug: &str, content: &str) -> Result<(Frontmatter, String)> {
    let (yaml_str, body) = match extract_frontmatter(content) {
        Some(parts) => parts,
        None => {
            if has_frontmatter(content) {
                return Err(NotesError::parse(slug, "unterminated frontmatter block"));
            }
            return Ok((Frontmatter::new(), content.to_string()));
        }
    };

    let docs = YamlLoader::load_from_str(&yaml_str)
        .map_err(|e| NotesError::parse(slug, e.to_string()))?;

    let frontmatter = match docs.first() {
        None | Some(Yaml::Null) => Frontmatter::new(),
        Some(doc) => Frontmatter::from_yaml(doc)
            .ok_or_else(|| NotesError::parse(slug, "frontmatter is not a mapping"))?,
    };

    Ok((frontmatter, body))
}

/// 检查内容是否以 frontmatter 分隔符开头
pub fn has_frontmatter(content: &str) -> bool {
    content
        .lines()
        .next()
        .map(|line| line.trim_end() == "---")
        .unwrap_or(false)
}

/// 从内容中拆出 frontmatter
///
/// 第一行必须是 `---`，到下一行 `---` 结束
///
/// # Returns
///
/// (frontmatter_yaml, content_without_frontmatter)，没有闭合分隔符时返回 None
pub fn extract_frontmatter(content: &str) -> Option<(String, String)> {
    if !has_frontmatter(content) {
        return None;
    }

    let mut offset = 0;
    let mut yaml_start = None;
    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        if yaml_start.is_none() {
            yaml_start = Some(offset);
            continue;
        }

        if line.trim_end() == "---" {
            let yaml = &content[yaml_start?..start];
            let body = &content[offset..];
            return Some((yaml.to_string(), body.to_string()));
        }
    }

    None
}

fn yaml_key(key: &Yaml) -> Option<String> {
    scalar_string(key)
}

/// 标量转字符串（数字、布尔也接受）
fn scalar_string(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 单个字符串或字符串数组
fn string_list(value: &Yaml) -> Vec<String> {
    match value {
        Yaml::Array(items) => items.iter().filter_map(scalar_string).collect(),
        Yaml::Null => Vec::new(),
        other => scalar_string(other).into_iter().collect(),
    }
}

/// YAML 值的真值判断
fn is_truthy(value: &Yaml) -> bool {
    match value {
        Yaml::Boolean(b) => *b,
        Yaml::String(s) => !s.is_empty(),
        Yaml::Integer(i) => *i != 0,
        Yaml::Real(r) => r.parse::<f64>().map(|f| f != 0.0).unwrap_or(false),
        Yaml::Null | Yaml::BadValue => false,
        _ => true,
    }
}

/// 将 YAML 值转换为 JSON 值
fn yaml_to_json(value: &Yaml) -> Value {
    match value {
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Integer(i) => Value::Number((*i).into()),
        Yaml::Real(r) => r
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(r.clone())),
        Yaml::Boolean(b) => Value::Bool(*b),
        Yaml::Array(items) => Value::Array(items.iter().map(yaml_to_json).collect()),
        Yaml::Hash(hash) => {
            let mut map = Map::new();
            for (k, v) in hash {
                if let Some(k) = yaml_key(k) {
                    map.insert(k, yaml_to_json(v));
                }
            }
            Value::Object(map)
        }
        _ => Value::Null,
    }
}
