//! 公开产物
//!
//! 从笔记数据库（或任意 [`DocumentRepository`](crate::storage::DocumentRepository)）
//! 派生对外发布的数据：
//!
//! - [`traversal`] - 一致代价遍历，两种产物共用
//! - [`tree`] - 公开树
//! - [`public_index`] - 公开搜索索引、发现顺序、目录树
//! - [`sitegraph`] - 站点图
//! - [`rename`] - 重命名计划

pub mod public_index;
pub mod rename;
pub mod sitegraph;
pub mod traversal;
pub mod tree;

pub use public_index::{clean_title, generate_public_index, DocumentNode, PublicIndex};
pub use rename::{plan_rename, RenameOperation, RenamePlan};
pub use sitegraph::{generate_sitegraph, Sitegraph, SitegraphLink, SitegraphNode};
pub use traversal::{traverse, EdgeCosts, TraversalConfig, Visit, DEFAULT_OVERFLOW, DEFAULT_ROOT};
pub use tree::{generate_public_tree, PublicTree, PublicTreeNode};
