//! 索引管理器
//!
//! 让笔记数据库与笔记来源保持一致：
//!
//! - 同一时刻最多一次索引（全量或单篇），由同一把锁串行化
//! - 全量索引请求先等待一个短暂的合并窗口，窗口内的所有请求共享同一次执行结果
//! - 全量索引对比已知 slug 与扫描结果，移除消失的笔记
//!
//! ## 使用方法
//!
//! ```rust,ignore
//! let manager = NotesManager::new(Arc::new(FileSystemSource::new("notes")));
//! let summary = manager.index_all().await?;
//! let db = manager.db().await;
//! ```

use crate::core::error::{NotesError, Result};
use crate::core::indexer::{index_note, unindex_note, IndexOptions, IndexResult, IndexSummary};
use crate::core::source::NotesSource;
use crate::storage::NotesDatabase;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock, RwLockReadGuard};

/// 一次全量索引的结果，错误以字符串形式广播给所有等待者
type PassOutcome = std::result::Result<IndexSummary, String>;

/// 默认合并窗口
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// 管理器选项
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// 合并窗口
    pub debounce: Duration,
    /// 传给索引器的选项
    pub index: IndexOptions,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            index: IndexOptions::default(),
        }
    }
}

struct Inner {
    source: Arc<dyn NotesSource>,
    db: RwLock<NotesDatabase>,
    /// 串行化全量与单篇索引
    pass_lock: Mutex<()>,
    /// 合并窗口内等待中的全量索引
    pending: StdMutex<Option<watch::Receiver<Option<PassOutcome>>>>,
    passes: AtomicUsize,
    options: ManagerOptions,
}

/// 索引管理器
///
/// 克隆得到的是同一个管理器的句柄
#[derive(Clone)]
pub struct NotesManager {
    inner: Arc<Inner>,
}

impl NotesManager {
    /// 使用默认选项创建
    pub fn new(source: Arc<dyn NotesSource>) -> Self {
        Self::with_options(source, ManagerOptions::default())
    }

    /// 创建管理器
    ///
    /// # Arguments
    ///
    /// * `source` - 笔记来源
    /// * `options` - 合并窗口与索引选项
    pub fn with_options(source: Arc<dyn NotesSource>, options: ManagerOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                db: RwLock::new(NotesDatabase::new()),
                pass_lock: Mutex::new(()),
                pending: StdMutex::new(None),
                passes: AtomicUsize::new(0),
                options,
            }),
        }
    }

    /// 读取数据库
    ///
    /// 持有读锁期间索引会等待
    pub async fn db(&self) -> RwLockReadGuard<'_, NotesDatabase> {
        self.inner.db.read().await
    }

    /// 已执行的全量索引次数
    pub fn passes(&self) -> usize {
        self.inner.passes.load(Ordering::SeqCst)
    }

    /// 全量索引
    ///
    /// 合并窗口内的并发调用只触发一次执行，并得到同一个结果；
    /// 窗口关闭后到达的调用会排队进行下一次执行
    ///
    /// # Returns
    ///
    /// 索引汇总；扫描失败时返回 [`NotesError::PassFailed`]
    pub async fn index_all(&self) -> Result<IndexSummary> {
        let mut rx = self.join_or_schedule();

        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| NotesError::PassFailed("reindex task stopped".to_string()))?
            .clone();

        match outcome {
            Some(Ok(summary)) => Ok(summary),
            Some(Err(message)) => Err(NotesError::PassFailed(message)),
            None => Err(NotesError::PassFailed("reindex produced no result".to_string())),
        }
    }

    /// 加入等待中的执行，没有则安排一次新的执行
    fn join_or_schedule(&self) -> watch::Receiver<Option<PassOutcome>> {
        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(rx) = pending.as_ref() {
            tracing::debug!("Joining pending reindex");
            return rx.clone();
        }

        let (tx, rx) = watch::channel(None);
        *pending = Some(rx.clone());

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.options.debounce).await;
            inner
                .pending
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take();

            let outcome = {
                let _guard = inner.pass_lock.lock().await;
                inner.run_pass().await.map_err(|e| e.to_string())
            };
            if let Err(message) = &outcome {
                tracing::error!("Reindex failed: {}", message);
            }
            let _ = tx.send(Some(outcome));
        });

        rx
    }

    /// 单篇索引
    ///
    /// 与全量索引串行执行；读取失败直接返回给调用方
    pub async fn index(&self, slug: &str) -> Result<IndexResult> {
        let _guard = self.inner.pass_lock.lock().await;
        let content = self.inner.source.read(slug).await?;
        let mut db = self.inner.db.write().await;
        index_note(&mut db, slug, &content, &self.inner.options.index)
    }
}

impl Inner {
    /// 执行一次全量索引，调用方必须持有 `pass_lock`
    async fn run_pass(&self) -> Result<IndexSummary> {
        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Starting indexing pass #{}", pass);

        let mut summary = IndexSummary::start();
        let slugs = self.source.scan().await?;
        let mut stale: BTreeSet<String> = self
            .db
            .read()
            .await
            .known_slugs()
            .map(str::to_string)
            .collect();

        for slug in slugs {
            stale.remove(&slug);
            let content = match self.source.read(&slug).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", slug, e);
                    summary.add_error(&slug, e);
                    continue;
                }
            };

            let mut db = self.db.write().await;
            match index_note(&mut db, &slug, &content, &self.options.index) {
                Ok(result) => summary.add(result),
                Err(e) => {
                    tracing::warn!("Failed to index {}: {}", slug, e);
                    summary.add_error(&slug, e);
                }
            }
        }

        let mut db = self.db.write().await;
        for slug in stale {
            if unindex_note(&mut db, &slug) {
                summary.add(IndexResult::Deleted(slug));
            }
        }
        summary.finish();

        tracing::info!(
            "Indexing done. Added: {}, Changed: {}, Removed: {}, Errors: {}",
            summary.added,
            summary.changed,
            summary.removed,
            summary.errors.len()
        );
        Ok(summary)
    }
}
