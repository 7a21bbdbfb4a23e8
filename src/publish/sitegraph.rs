//! 站点图：公开可达笔记的标题与出链
//!
//! 只是对已算出的可达集合做投影，不再遍历

use super::traversal::TraversalConfig;
use crate::storage::DocumentRepository;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 一条出链
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitegraphLink {
    pub link: String,
}

/// 站点图节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitegraphNode {
    pub title: String,
    pub links: Vec<SitegraphLink>,
}

/// 站点图
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sitegraph {
    pub nodes: BTreeMap<String, SitegraphNode>,
}

impl Sitegraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// 生成站点图
///
/// # Arguments
///
/// * `repo` - 文档仓库
/// * `ids` - 可达 slug（来自公开树或公开索引）
/// * `config` - 遍历参数，其中的溢出页不作为节点输出
pub fn generate_sitegraph<R, I, S>(repo: &R, ids: I, config: &TraversalConfig) -> Sitegraph
where
    R: DocumentRepository + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut nodes = BTreeMap::new();
    for id in ids {
        let id = id.as_ref();
        if config.is_overflow(id) {
            continue;
        }
        let Some(note) = repo.get_document(id) else {
            tracing::warn!("Sitegraph skipped missing note {}", id);
            continue;
        };
        let links = note
            .link_targets()
            .map(|link| SitegraphLink {
                link: link.to_string(),
            })
            .collect();
        nodes.insert(
            id.to_string(),
            SitegraphNode {
                title: note.title.clone(),
                links,
            },
        );
    }
    Sitegraph { nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::traversal::tests::database;
    use crate::publish::tree::generate_public_tree;

    #[test]
    fn test_sitegraph_projection() {
        let db = database(&[
            ("HomePage", true, false, &["A", "Recent", "A#part", "Private"]),
            ("A", true, false, &["HomePage"]),
            ("Recent", true, false, &["A"]),
            ("Private", false, false, &[]),
        ]);
        let config = TraversalConfig::default();
        let tree = generate_public_tree(&db, &config);

        let sitegraph = generate_sitegraph(&db, tree.ids(), &config);

        assert_eq!(sitegraph.len(), 2);
        assert!(!sitegraph.nodes.contains_key("Recent"));
        assert!(!sitegraph.nodes.contains_key("Private"));
        let links: Vec<_> = sitegraph.nodes["HomePage"]
            .links
            .iter()
            .map(|l| l.link.as_str())
            .collect();
        assert_eq!(links, vec!["A", "Recent", "A", "Private"]);
    }

    #[test]
    fn test_sitegraph_json_shape() {
        let db = database(&[("HomePage", true, false, &["A"])]);
        let sitegraph = generate_sitegraph(&db, ["HomePage"], &TraversalConfig::default());
        assert_eq!(
            serde_json::to_value(&sitegraph).unwrap(),
            serde_json::json!({"nodes": {"HomePage": {"title": "HomePage title", "links": [{"link": "A"}]}}})
        );
    }
}
