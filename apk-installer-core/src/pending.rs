//! 等待授权的安装请求登记表
//!
//! 每个等待中的请求持有独立 token，互不覆盖；调用方通过
//! oneshot 通道拿到最终结果。

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::error::InstallerResult;
use crate::types::InstallRequest;

/// 安装结果回传通道
pub(crate) type InstallResponder = oneshot::Sender<InstallerResult<()>>;

/// 等待中安装请求的句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct InstallToken(u64);

impl fmt::Display for InstallToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 一条等待授权的安装请求
pub(crate) struct PendingInstall {
    pub request: InstallRequest,
    pub responder: InstallResponder,
}

/// 等待授权的请求登记表
#[derive(Default)]
pub(crate) struct PendingInstalls {
    next_token: AtomicU64,
    entries: Mutex<HashMap<u64, PendingInstall>>,
}

impl PendingInstalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条等待中的请求，返回其 token
    pub fn register(&self, request: InstallRequest, responder: InstallResponder) -> InstallToken {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .insert(token, PendingInstall { request, responder });
        InstallToken(token)
    }

    /// 摘掉一条登记（比如打开设置页失败时回滚）
    pub fn remove(&self, token: InstallToken) -> Option<PendingInstall> {
        self.lock().remove(&token.0)
    }

    /// 取走当前所有等待中的请求
    pub fn drain(&self) -> Vec<(InstallToken, PendingInstall)> {
        self.lock()
            .drain()
            .map(|(token, entry)| (InstallToken(token), entry))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, PendingInstall>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
