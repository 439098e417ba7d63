//! 路由装配器：维护挂载顺序与路由表不变量。
//!
//! 路由表在进程生命周期内只增不减：基线路由必须且只能在接受连接前
//! 挂载一次；能力路由可在任意之后的时刻挂载（包括开始处理流量后），
//! 仅对后续请求生效。对外通过 [`RouteComposer::snapshot`] 暴露当前
//! 已装配的 `Router` 快照，请求路径上无锁读取。

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use axum::Router;
use thiserror::Error;

/// 装配错误
#[derive(Debug, Error)]
pub enum ComposeError {
    /// 基线路由尚未挂载
    #[error("基线路由尚未挂载，不能挂载能力路由")]
    BaselineNotMounted,
    /// 基线路由重复挂载
    #[error("基线路由已挂载，不能重复挂载")]
    BaselineAlreadyMounted,
    /// 同一前缀重复挂载。
    ///
    /// 采用严格模式：直接拒绝而非静默去重，重复挂载只可能来自
    /// 注册表配置失误，宽容处理会掩盖问题。
    #[error("前缀 {0} 已挂载")]
    PrefixAlreadyMounted(String),
    /// 前缀不合法
    #[error("挂载前缀不合法: {0}")]
    InvalidPrefix(String),
}

/// 挂载来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountSource {
    /// 基线路由
    Baseline,
    /// 具名能力
    Capability(&'static str),
}

/// 路由表中的一条挂载记录（仅追加，永不移除）
#[derive(Debug, Clone)]
pub struct MountEntry {
    /// 挂载前缀；基线记录为空串（基线路由自带完整路径）
    pub prefix: String,
    /// 挂载来源
    pub source: MountSource,
}

#[derive(Default)]
struct MountTable {
    baseline_mounted: bool,
    entries: Vec<MountEntry>,
}

/// 路由装配器。
///
/// 写路径（挂载）由互斥锁串行化；读路径（请求分发）通过
/// `ArcSwap` 快照进行，挂载对已取得的快照不可见，只影响后续请求。
#[derive(Clone)]
pub struct RouteComposer {
    inner: Arc<ComposerInner>,
}

struct ComposerInner {
    active: ArcSwap<Router>,
    table: Mutex<MountTable>,
}

impl RouteComposer {
    /// 创建空装配器。基线挂载前的快照对任何请求返回 404。
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ComposerInner {
                active: ArcSwap::from_pointee(Router::new()),
                table: Mutex::new(MountTable::default()),
            }),
        }
    }

    /// 挂载基线路由。必须在服务开始接受连接前调用，且只能调用一次。
    pub fn mount_baseline(&self, routes: Router) -> Result<(), ComposeError> {
        let mut table = self.lock_table();
        if table.baseline_mounted {
            return Err(ComposeError::BaselineAlreadyMounted);
        }

        self.inner.active.store(Arc::new(routes));
        table.baseline_mounted = true;
        table.entries.push(MountEntry {
            prefix: String::new(),
            source: MountSource::Baseline,
        });
        Ok(())
    }

    /// 在 `prefix` 下挂载一个能力的路由。
    ///
    /// 基线挂载之后随时可调用；同一前缀的重复挂载被确定性拒绝。
    /// 挂载只对之后到达的请求生效：启动期间先于挂载到达的请求
    /// 得到标准 404，这是刻意选择的可用性优先行为。
    pub fn mount_capability(
        &self,
        name: &'static str,
        prefix: &str,
        routes: Router,
    ) -> Result<(), ComposeError> {
        validate_prefix(prefix)?;

        let mut table = self.lock_table();
        if !table.baseline_mounted {
            return Err(ComposeError::BaselineNotMounted);
        }
        if table
            .entries
            .iter()
            .any(|entry| entry.prefix == prefix)
        {
            return Err(ComposeError::PrefixAlreadyMounted(prefix.to_string()));
        }

        // 持锁期间重建快照，保证并发挂载不会彼此覆盖。
        let next = self.inner.active.load().as_ref().clone().nest(prefix, routes);
        self.inner.active.store(Arc::new(next));
        table.entries.push(MountEntry {
            prefix: prefix.to_string(),
            source: MountSource::Capability(name),
        });
        Ok(())
    }

    /// 当前已装配路由的快照
    pub fn snapshot(&self) -> Arc<Router> {
        self.inner.active.load_full()
    }

    /// 指定前缀是否已有能力挂载
    pub fn is_mounted(&self, prefix: &str) -> bool {
        self.lock_table()
            .entries
            .iter()
            .any(|entry| entry.prefix == prefix)
    }

    /// 挂载记录（按完成先后排列）
    pub fn mount_entries(&self) -> Vec<MountEntry> {
        self.lock_table().entries.clone()
    }

    fn lock_table(&self) -> std::sync::MutexGuard<'_, MountTable> {
        // 锁内不会 panic，中毒仅可能来自持锁线程之外的缺陷；
        // 此时继续使用表数据仍是安全的（只增语义）。
        match self.inner.table.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for RouteComposer {
    fn default() -> Self {
        Self::new()
    }
}

/// 校验挂载前缀：须以 `/` 开头、非根、无尾斜杠、不含通配符。
///
/// 这些约束与 `Router::nest` 的前置条件一致，提前转成错误，
/// 避免能力挂载演变为装配任务内的 panic。
fn validate_prefix(prefix: &str) -> Result<(), ComposeError> {
    let ok = prefix.len() > 1
        && prefix.starts_with('/')
        && !prefix.ends_with('/')
        && !prefix.contains('*')
        && !prefix.contains(':');
    if ok {
        Ok(())
    } else {
        Err(ComposeError::InvalidPrefix(prefix.to_string()))
    }
}
