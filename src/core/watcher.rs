//! 文件监听模块
//!
//! 使用 notify 监听笔记目录，相关文件变化时触发全量索引。
//! 连续的变化由 [`NotesManager`] 的合并窗口合并成一次索引。
//!
//! ## 使用方法
//!
//! ```rust,ignore
//! let mut watcher = NotesWatcher::new(WatchConfig::default())?;
//! watcher.watch(Path::new("notes"))?;
//! watcher.run(manager).await;
//! ```

use crate::core::manager::NotesManager;
use crate::core::watch_config::WatchConfig;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::mpsc;

/// 文件变化事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileEvent {
    /// 文件被创建
    Created(String),
    /// 文件被修改
    Modified(String),
    /// 文件被删除
    Deleted(String),
    /// 文件被重命名
    Renamed(String, String),
}

impl FileEvent {
    /// 获取事件涉及的路径
    pub fn path(&self) -> &str {
        match self {
            FileEvent::Created(p) | FileEvent::Modified(p) | FileEvent::Deleted(p) => p,
            FileEvent::Renamed(_, p) => p,
        }
    }
}

/// 笔记目录监听器
pub struct NotesWatcher {
    rx: mpsc::UnboundedReceiver<FileEvent>,
    watcher: RecommendedWatcher,
}

impl NotesWatcher {
    /// 创建监听器
    ///
    /// # Arguments
    ///
    /// * `config` - 过滤规则
    pub fn new(config: WatchConfig) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |result: notify::Result<notify::Event>| match result {
                Ok(event) => {
                    if let Some(file_event) = convert_event(&event, &config) {
                        let _ = tx.send(file_event);
                    }
                }
                Err(e) => {
                    tracing::error!("Watch error: {:?}", e);
                }
            },
            notify::Config::default(),
        )?;

        Ok(Self { rx, watcher })
    }

    /// 开始监听目录（只监听顶层）
    pub fn watch(&mut self, path: &Path) -> notify::Result<()> {
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        tracing::info!("Started watching: {:?}", path);
        Ok(())
    }

    /// 停止监听
    pub fn unwatch(&mut self, path: &Path) -> notify::Result<()> {
        self.watcher.unwatch(path)?;
        tracing::info!("Stopped watching: {:?}", path);
        Ok(())
    }

    /// 等待下一批事件
    ///
    /// 返回第一个事件以及已经排队的其余事件；监听器关闭时返回 None
    pub async fn next_batch(&mut self) -> Option<Vec<FileEvent>> {
        let first = self.rx.recv().await?;
        let mut batch = vec![first];
        while let Ok(event) = self.rx.try_recv() {
            batch.push(event);
        }
        Some(batch)
    }

    /// 运行监听循环
    ///
    /// 每批事件触发一次 [`NotesManager::index_all`]，不等待其完成
    pub async fn run(mut self, manager: NotesManager) {
        while let Some(batch) = self.next_batch().await {
            tracing::debug!("{} file events, first: {:?}", batch.len(), batch[0]);
            let manager = manager.clone();
            tokio::spawn(async move {
                match manager.index_all().await {
                    Ok(summary) => tracing::info!(
                        "Reindexed after change: +{} ~{} -{}",
                        summary.added,
                        summary.changed,
                        summary.removed
                    ),
                    Err(e) => tracing::error!("Reindex after change failed: {}", e),
                }
            });
        }
    }
}

/// 将 notify 事件转换为内部事件类型
fn convert_event(event: &notify::Event, config: &WatchConfig) -> Option<FileEvent> {
    use notify::event::{ModifyKind, RenameMode};
    use notify::EventKind;

    let allowed = |path: &Path| -> Option<String> {
        config
            .is_allowed(path)
            .then(|| path.to_string_lossy().into_owned())
    };
    let first = event.paths.first();

    match event.kind {
        EventKind::Create(_) => allowed(first?).map(FileEvent::Created),
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            allowed(first?).map(FileEvent::Modified)
        }
        EventKind::Remove(_) => allowed(first?).map(FileEvent::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
            let from = &event.paths[0];
            let to = &event.paths[1];
            if config.is_allowed(from) || config.is_allowed(to) {
                Some(FileEvent::Renamed(
                    from.to_string_lossy().into_owned(),
                    to.to_string_lossy().into_owned(),
                ))
            } else {
                None
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            allowed(first?).map(FileEvent::Deleted)
        }
        EventKind::Modify(ModifyKind::Name(_)) => allowed(first?).map(FileEvent::Created),
        _ => None,
    }
}
