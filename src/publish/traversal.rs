//! 公开笔记遍历
//!
//! 从根笔记出发做一致代价搜索（Dijkstra），每篇公开笔记记录代价最低的发现路径。
//! 主题笔记的出链几乎不计代价，溢出页（默认 `Recent`）附加极大惩罚。
//!
//! 非公开或不存在的笔记是死路：不输出记录，也不继续扩展其链接。

use crate::core::note::NoteRecord;
use crate::storage::DocumentRepository;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// 默认根笔记
pub const DEFAULT_ROOT: &str = "HomePage";

/// 默认溢出页
pub const DEFAULT_OVERFLOW: &str = "Recent";

/// 边权
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeCosts {
    /// 普通笔记的出链
    pub link: f64,
    /// 主题笔记的出链
    pub topic_link: f64,
    /// 指向溢出页的附加代价
    pub overflow_penalty: f64,
}

impl Default for EdgeCosts {
    fn default() -> Self {
        Self {
            link: 1.0,
            topic_link: 0.001,
            overflow_penalty: 10000.0,
        }
    }
}

/// 遍历参数
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalConfig {
    /// 根笔记
    pub root: String,
    /// 溢出页，None 表示没有
    pub overflow: Option<String>,
    /// 边权
    pub costs: EdgeCosts,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            overflow: Some(DEFAULT_OVERFLOW.to_string()),
            costs: EdgeCosts::default(),
        }
    }
}

impl TraversalConfig {
    /// 是否是溢出页
    pub fn is_overflow(&self, slug: &str) -> bool {
        self.overflow.as_deref() == Some(slug)
    }

    /// 从 `source` 指向 `target` 的边权
    pub fn edge_cost(&self, source: &NoteRecord, target: &str) -> f64 {
        let base = if source.topic {
            self.costs.topic_link
        } else {
            self.costs.link
        };
        if self.is_overflow(target) {
            base + self.costs.overflow_penalty
        } else {
            base
        }
    }
}

/// 一次确定的访问
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    /// 笔记
    pub note: NoteRecord,
    /// 发现该笔记的父笔记，根为 None
    pub parent: Option<String>,
    /// 从根出发的代价
    pub cost: f64,
}

/// 队列元素：代价最小、发现最早的先出队
#[derive(Debug)]
struct FringeEntry {
    cost: f64,
    seq: u64,
    slug: String,
    parent: Option<String>,
}

impl PartialEq for FringeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FringeEntry {}

impl PartialOrd for FringeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FringeEntry {
    // BinaryHeap 是最大堆，这里反转
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// 遍历公开笔记
///
/// # Arguments
///
/// * `repo` - 文档仓库
/// * `config` - 遍历参数
///
/// # Returns
///
/// 按确定顺序排列的公开笔记；对同一数据重复调用结果完全相同
pub fn traverse<R>(repo: &R, config: &TraversalConfig) -> Vec<Visit>
where
    R: DocumentRepository + ?Sized,
{
    let mut fringe = BinaryHeap::new();
    let mut best_cost: HashMap<String, f64> = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut visits = Vec::new();
    let mut seq = 0u64;

    fringe.push(FringeEntry {
        cost: 0.0,
        seq,
        slug: config.root.clone(),
        parent: None,
    });
    best_cost.insert(config.root.clone(), 0.0);

    while let Some(entry) = fringe.pop() {
        if !visited.insert(entry.slug.clone()) {
            continue;
        }

        let Some(note) = repo.get_document(&entry.slug) else {
            tracing::trace!("Dead end at missing note {}", entry.slug);
            continue;
        };
        if !note.public {
            tracing::trace!("Dead end at private note {}", entry.slug);
            continue;
        }

        for target in note.link_targets() {
            if visited.contains(target) {
                continue;
            }
            let cost = entry.cost + config.edge_cost(&note, target);
            let improved = best_cost
                .get(target)
                .map_or(true, |known| cost < *known);
            if improved {
                seq += 1;
                best_cost.insert(target.to_string(), cost);
                fringe.push(FringeEntry {
                    cost,
                    seq,
                    slug: target.to_string(),
                    parent: Some(entry.slug.clone()),
                });
            }
        }

        visits.push(Visit {
            note,
            parent: entry.parent,
            cost: entry.cost,
        });
    }

    tracing::debug!(
        "Traversed {} public notes from {} ({} nodes visited)",
        visits.len(),
        config.root,
        visited.len()
    );
    visits
}
