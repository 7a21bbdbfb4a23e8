//! Markdown 内容解析
//!
//! 使用 pulldown-cmark 解析正文，提取纯文本与链接目标
//!
//! ```markdown
//! # 标题
//!
//! 正文 [链接](Target) 以及 [引用式链接][ref]
//!
//! [ref]: OtherTarget
//! ```

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

/// HTML 中的 `<a href="...">`
static HTML_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']*)["']"#).expect("valid regex"));

/// 解析后的 Markdown 内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkdownContent {
    /// 纯文本，块之间以空行分隔
    pub text: String,
    /// 按出现顺序排列的链接目标（可能重复，包含外部链接）
    pub links: Vec<String>,
}

impl MarkdownContent {
    /// 解析 Markdown 源码
    pub fn parse(source: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let mut blocks: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut links = Vec::new();

        for event in Parser::new_ext(source, options) {
            match event {
                Event::Start(Tag::Link { dest_url, .. }) => {
                    links.push(dest_url.to_string());
                }
                Event::Text(text) | Event::Code(text) => current.push_str(&text),
                Event::InlineMath(text) | Event::DisplayMath(text) => current.push_str(&text),
                Event::SoftBreak => current.push(' '),
                Event::HardBreak => current.push('\n'),
                Event::Html(html) | Event::InlineHtml(html) => {
                    for cap in HTML_HREF.captures_iter(&html) {
                        links.push(cap[1].to_string());
                    }
                }
                Event::End(TagEnd::TableCell) => current.push('\t'),
                Event::End(TagEnd::TableHead | TagEnd::TableRow) => {
                    let row = current.trim_end_matches('\t').to_string();
                    current = row;
                    current.push('\n');
                }
                Event::End(
                    TagEnd::Paragraph
                    | TagEnd::Heading(_)
                    | TagEnd::CodeBlock
                    | TagEnd::Item
                    | TagEnd::Table
                    | TagEnd::BlockQuote(_)
                    | TagEnd::FootnoteDefinition,
                ) => flush_block(&mut blocks, &mut current),
                _ => {}
            }
        }
        flush_block(&mut blocks, &mut current);

        Self {
            text: blocks.join("\n\n"),
            links,
        }
    }

    /// 内部链接：排除包含协议分隔符的外部链接，去掉 `#fragment`
    pub fn internal_links(&self) -> Vec<String> {
        self.links
            .iter()
            .filter(|link| !link.contains(':'))
            .map(|link| strip_fragment(link))
            .filter(|link| !link.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// 去掉链接中的 `#fragment`
pub fn strip_fragment(link: &str) -> &str {
    link.split('#').next().unwrap_or("")
}

fn flush_block(blocks: &mut Vec<String>, current: &mut String) {
    let block = current.trim();
    if !block.is_empty() {
        blocks.push(block.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_inline_links() {
        let md = MarkdownContent::parse("[meow](nyan) [ok](https://www.google.com/)");
        assert_eq!(md.links, vec!["nyan", "https://www.google.com/"]);
        assert_eq!(md.internal_links(), vec!["nyan"]);
    }

    #[test]
    fn test_parses_reference_links() {
        let md = MarkdownContent::parse("[yay][meow]\n\n[meow]: nyaa");
        assert_eq!(md.links, vec!["nyaa"]);
    }

    #[test]
    fn test_returns_text() {
        let md = MarkdownContent::parse("# hello world\n\n**[this](that)** was a link");
        assert_eq!(md.text, "hello world\n\nthis was a link");
    }

    #[test]
    fn test_soft_break_becomes_space() {
        let md = MarkdownContent::parse("first line\nsecond line");
        assert_eq!(md.text, "first line second line");
    }

    #[test]
    fn test_html_anchor_links() {
        let md = MarkdownContent::parse("see <a href=\"Inline\">this</a>\n\n<div><a class=\"x\" href='Block'>b</a></div>\n");
        assert_eq!(md.links, vec!["Inline", "Block"]);
    }

    #[test]
    fn test_internal_links_strip_fragment() {
        let md = MarkdownContent::parse("[a](Page#section) [b](#local) [c](mailto:x@y.z) [d](Page)");
        assert_eq!(md.internal_links(), vec!["Page", "Page"]);
    }

    #[test]
    fn test_table_text() {
        let md = MarkdownContent::parse("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert_eq!(md.text, "a\tb\n1\t2");
    }

    #[test]
    fn test_list_items_are_blocks() {
        let md = MarkdownContent::parse("- one [x](X)\n- two\n");
        assert_eq!(md.text, "one x\n\ntwo");
        assert_eq!(md.links, vec!["X"]);
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(strip_fragment("Page#top"), "Page");
        assert_eq!(strip_fragment("Page"), "Page");
        assert_eq!(strip_fragment("#top"), "");
    }
}
