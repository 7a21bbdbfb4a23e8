//! 笔记源码解析
//!
//! - [`frontmatter`] - YAML 头部元数据
//! - [`markdown`] - 正文纯文本与链接

pub mod frontmatter;
pub mod markdown;

pub use frontmatter::{extract_frontmatter, has_frontmatter, parse_frontmatter, Frontmatter};
pub use markdown::{strip_fragment, MarkdownContent};
