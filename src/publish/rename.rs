//! 重命名计划
//!
//! 只生成操作列表，不修改任何文件

use crate::storage::NotesDatabase;
use serde::{Deserialize, Serialize};

/// 重命名操作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenameOperation {
    /// 移动笔记文件，旧名字保留为别名
    Rename {
        id: String,
        to: String,
        aliases: Vec<String>,
    },
    /// 更新笔记中指向旧名字的链接
    UpdateLink { id: String },
}

/// 重命名计划
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    pub from: String,
    pub to: String,
    pub operations: Vec<RenameOperation>,
}

impl RenamePlan {
    /// 需要更新链接的笔记
    pub fn link_updates(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().filter_map(|op| match op {
            RenameOperation::UpdateLink { id } => Some(id.as_str()),
            RenameOperation::Rename { .. } => None,
        })
    }
}

/// 生成把 `from` 重命名为 `to` 的计划
///
/// # Arguments
///
/// * `db` - 笔记数据库
/// * `from` - 旧 slug
/// * `to` - 新 slug
///
/// # Returns
///
/// 操作按 slug 顺序排列；`from` 不存在时只包含链接更新
pub fn plan_rename(db: &NotesDatabase, from: &str, to: &str) -> RenamePlan {
    let mut operations = Vec::new();

    for note in db.documents() {
        if note.id == from {
            let mut aliases: Vec<String> = Vec::new();
            let names = std::iter::once(&note.id).chain(&note.aliases);
            for name in names.filter(|name| *name != to) {
                if !aliases.contains(name) {
                    aliases.push(name.clone());
                }
            }
            operations.push(RenameOperation::Rename {
                id: note.id.clone(),
                to: to.to_string(),
                aliases,
            });
        }
        if note.link_targets().any(|link| link == from) {
            operations.push(RenameOperation::UpdateLink {
                id: note.id.clone(),
            });
        }
    }

    RenamePlan {
        from: from.to_string(),
        to: to.to_string(),
        operations,
    }
}
