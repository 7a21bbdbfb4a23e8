//! 文档读取抽象
//!
//! 公开索引与站点图只通过该 trait 读取笔记，
//! 数据可以来自内存数据库，也可以来自某个 Git 提交

use super::NotesDatabase;
use crate::core::note::NoteRecord;

/// 文档仓库
pub trait DocumentRepository {
    /// 按 ID 获取笔记，不存在时返回 None
    fn get_document(&self, id: &str) -> Option<NoteRecord>;
}

impl DocumentRepository for NotesDatabase {
    fn get_document(&self, id: &str) -> Option<NoteRecord> {
        self.get(id).cloned()
    }
}

impl<T: DocumentRepository + ?Sized> DocumentRepository for &T {
    fn get_document(&self, id: &str) -> Option<NoteRecord> {
        (**self).get_document(id)
    }
}
