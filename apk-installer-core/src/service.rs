//! 安装流程编排服务

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::{InstallerError, InstallerResult};
use crate::pending::{InstallResponder, PendingInstalls};
use crate::traits::InstallerBridge;
use crate::types::{InstallGate, InstallRequest, InstallScope};

/// 安装流程编排服务
///
/// 持有平台桥接、启动时选定的授权策略和等待授权的请求登记表。
/// 平台层创建服务后以单例方式复用。
pub struct InstallerService {
    bridge: Arc<dyn InstallerBridge>,
    gate: InstallGate,
    scope: InstallScope,
    pending: PendingInstalls,
}

impl InstallerService {
    /// 创建安装服务，授权策略在此时根据平台能力选定一次
    pub fn new(bridge: Arc<dyn InstallerBridge>, scope: InstallScope) -> InstallerResult<Self> {
        let caps = bridge.capabilities()?;
        let gate = InstallGate::select(&caps);
        log::info!("Install gate selected: {gate:?} (SDK {})", caps.sdk_int);
        Ok(Self {
            bridge,
            gate,
            scope,
            pending: PendingInstalls::new(),
        })
    }

    /// 安装指定路径的 APK。
    ///
    /// 缺少“安装未知应用”授权时请求会挂起并打开系统设置页，
    /// 等用户回到应用、[`Self::settle_pending`] 被调用后才落定。
    pub async fn install(&self, raw_path: Option<&str>) -> InstallerResult<()> {
        let request = InstallRequest::parse(raw_path)?;
        let (tx, rx) = oneshot::channel();
        self.dispatch(request, tx);
        rx.await.map_err(|_| {
            InstallerError::Bridge("Install flow dropped before completion".to_string())
        })?
    }

    /// 当前等待授权的请求数
    #[must_use]
    pub fn pending_installs(&self) -> usize {
        self.pending.len()
    }

    /// 本平台派发安装前是否需要未知来源授权
    #[must_use]
    pub const fn requires_install_grant(&self) -> bool {
        self.gate.requires_grant()
    }

    /// 查询当前是否持有“安装未知应用”授权
    pub fn unknown_sources_allowed(&self) -> InstallerResult<bool> {
        self.bridge.can_install_from_unknown_sources()
    }

    /// 重新结算所有等待授权的请求。
    ///
    /// 应用从系统设置页回到前台时调用：已拿到授权的请求重新派发，
    /// 仍未授权的以 `PermissionDenied` 落定。每条请求独立结算，
    /// 互不影响。
    pub fn settle_pending(&self) {
        if self.pending.is_empty() {
            return;
        }
        let entries = self.pending.drain();
        log::info!("App resumed with {} pending install(s)", entries.len());

        match self.bridge.can_install_from_unknown_sources() {
            Ok(true) => {
                for (token, entry) in entries {
                    log::info!("Unknown-sources grant acquired, retrying install {token}");
                    self.dispatch(entry.request, entry.responder);
                }
            }
            Ok(false) => {
                for (token, entry) in entries {
                    log::warn!("Unknown-sources grant still missing, failing install {token}");
                    respond(entry.responder, Err(InstallerError::PermissionDenied));
                }
            }
            Err(e) => {
                for (token, entry) in entries {
                    log::error!("Grant check failed while settling install {token}: {e}");
                    respond(entry.responder, Err(e.clone()));
                }
            }
        }
    }

    /// 派发一次安装尝试，结果一律经 responder 回传
    fn dispatch(&self, request: InstallRequest, responder: InstallResponder) {
        // 挂起期间文件可能被删除，每次派发前重新校验
        if let Err(e) = self.validate(&request) {
            respond(responder, Err(e));
            return;
        }

        if self.gate.requires_grant() {
            match self.bridge.can_install_from_unknown_sources() {
                Ok(true) => {}
                Ok(false) => {
                    self.park(request, responder);
                    return;
                }
                Err(e) => {
                    respond(responder, Err(e));
                    return;
                }
            }
        }

        let result = self
            .bridge
            .resolve_install_uri(request.path())
            .and_then(|uri| {
                log::debug!("Resolved install uri: {uri}");
                self.bridge.launch_installer(&uri)
            });
        if result.is_ok() {
            log::info!("System installer launched for {}", request.path().display());
        }
        respond(responder, result);
    }

    fn validate(&self, request: &InstallRequest) -> InstallerResult<()> {
        request.verify_exists()?;
        self.scope.check(request.path())
    }

    /// 登记请求并打开未知来源设置页
    fn park(&self, request: InstallRequest, responder: InstallResponder) {
        let path = request.path().display().to_string();
        let token = self.pending.register(request, responder);
        log::info!("Install of {path} waiting for unknown-sources grant ({token})");

        if let Err(e) = self.bridge.open_unknown_sources_settings() {
            // 设置页都打不开，授权流程无从谈起，立即回滚落定
            if let Some(entry) = self.pending.remove(token) {
                respond(entry.responder, Err(e));
            }
        }
    }
}

fn respond(responder: InstallResponder, result: InstallerResult<()>) {
    if responder.send(result).is_err() {
        log::debug!("Install caller went away before the result arrived");
    }
}
