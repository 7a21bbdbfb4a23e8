//! 公开树：每篇可达公开笔记的标题与父笔记

use super::traversal::{traverse, TraversalConfig};
use crate::storage::DocumentRepository;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 公开树节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicTreeNode {
    pub title: String,
    pub parent: Option<String>,
}

/// 公开树（按 slug 排序，序列化结果稳定）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicTree {
    pub nodes: BTreeMap<String, PublicTreeNode>,
}

impl PublicTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.nodes.contains_key(slug)
    }

    /// 父笔记
    pub fn parent_of(&self, slug: &str) -> Option<&str> {
        self.nodes.get(slug)?.parent.as_deref()
    }

    /// 可达 slug（按字母序）
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

/// 生成公开树
///
/// # Arguments
///
/// * `repo` - 文档仓库
/// * `config` - 遍历参数
pub fn generate_public_tree<R>(repo: &R, config: &TraversalConfig) -> PublicTree
where
    R: DocumentRepository + ?Sized,
{
    let nodes = traverse(repo, config)
        .into_iter()
        .map(|visit| {
            (
                visit.note.id,
                PublicTreeNode {
                    title: visit.note.title,
                    parent: visit.parent,
                },
            )
        })
        .collect();
    PublicTree { nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::indexer::unindex_note;
    use crate::publish::traversal::tests::database;

    #[test]
    fn test_end_to_end_cycle() {
        let db = database(&[
            ("HomePage", true, false, &["A"]),
            ("A", true, true, &["B"]),
            ("B", true, false, &["HomePage"]),
        ]);

        let tree = generate_public_tree(&db, &TraversalConfig::default());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.parent_of("HomePage"), None);
        assert_eq!(tree.parent_of("A"), Some("HomePage"));
        assert_eq!(tree.parent_of("B"), Some("A"));
        assert_eq!(tree.nodes["A"].title, "A title (topic)");
    }

    #[test]
    fn test_deterministic_serialization() {
        let db = database(&[
            ("HomePage", true, false, &["X", "Y", "Recent"]),
            ("X", true, false, &["Z"]),
            ("Y", true, true, &["Z", "W"]),
            ("Z", true, false, &["W"]),
            ("W", true, false, &[]),
            ("Recent", true, false, &["X"]),
        ]);
        let config = TraversalConfig::default();

        let first = serde_json::to_string(&generate_public_tree(&db, &config)).unwrap();
        let second = serde_json::to_string(&generate_public_tree(&db, &config)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_private_note_excluded() {
        let db = database(&[
            ("HomePage", true, false, &["Private"]),
            ("Private", false, false, &["Hidden"]),
            ("Hidden", true, false, &[]),
        ]);

        let tree = generate_public_tree(&db, &TraversalConfig::default());
        assert!(!tree.contains("Private"));
        assert!(!tree.contains("Hidden"));
    }

    #[test]
    fn test_unindexed_note_unreachable() {
        let mut db = database(&[
            ("HomePage", true, false, &["A"]),
            ("A", true, false, &[]),
        ]);
        unindex_note(&mut db, "A");

        let tree = generate_public_tree(&db, &TraversalConfig::default());
        assert_eq!(tree.ids().collect::<Vec<_>>(), vec!["HomePage"]);
    }

    #[test]
    fn test_serialized_shape() {
        let db = database(&[("HomePage", true, false, &[])]);
        let json = serde_json::to_value(generate_public_tree(&db, &TraversalConfig::default())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"nodes": {"HomePage": {"title": "HomePage title", "parent": null}}})
        );
    }
}
