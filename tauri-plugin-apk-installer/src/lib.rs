//! Tauri APK Installer Plugin
//!
//! 用于在 Android 上安装 APK 文件：路径校验、FileProvider URI 转换、
//! “安装未知应用”授权门控。缺少授权时打开系统设置页，用户授权
//! 回到应用后自动续装。
//!
//! 非 Android 平台命令照常注册，调用时返回 `Unsupported` 错误。

use std::sync::Arc;

use serde::Serialize;
use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, RunEvent, Runtime,
};

use apk_installer_core::{InstallScope, InstallerBridge, InstallerError, InstallerService};

mod commands;
mod models;

#[cfg(target_os = "android")]
mod android;
#[cfg(not(target_os = "android"))]
mod desktop;

pub use models::*;

/// 插件错误类型，直接包装核心错误
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Error(pub InstallerError);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<InstallerError> for Error {
    fn from(err: InstallerError) -> Self {
        if err.is_expected() {
            log::warn!("Install error: {err}");
        } else {
            log::error!("Install error: {err}");
        }
        Self(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// APK 安装器，持有平台桥接之上的安装服务
pub struct ApkInstaller(Arc<InstallerService>);

impl ApkInstaller {
    fn new(config: &Config) -> apk_installer_core::InstallerResult<Self> {
        #[cfg(target_os = "android")]
        let bridge: Arc<dyn InstallerBridge> = Arc::new(android::AndroidBridge::new()?);

        #[cfg(not(target_os = "android"))]
        let bridge: Arc<dyn InstallerBridge> = Arc::new(desktop::UnsupportedBridge);

        let scope = if config.restrict_to_app_cache {
            match bridge.capabilities()?.cache_dir {
                Some(dir) => InstallScope::Within(dir),
                // 缓存目录未知时限制无从兑现，拒绝初始化而不是放开限制
                None => {
                    return Err(InstallerError::Bridge(
                        "restrictToAppCache enabled but the cache dir is unknown".to_string(),
                    ));
                }
            }
        } else {
            InstallScope::Unrestricted
        };

        let service = InstallerService::new(bridge, scope)?;
        Ok(Self(Arc::new(service)))
    }

    /// 安装指定路径的 APK 文件
    pub async fn install(&self, file_path: Option<String>) -> Result<()> {
        self.0
            .install(file_path.as_deref())
            .await
            .map_err(Error::from)
    }

    /// 查询未知来源授权状态
    pub fn check_permission(&self) -> Result<InstallPermissionStatus> {
        let granted = self.0.unknown_sources_allowed()?;
        Ok(InstallPermissionStatus {
            granted,
            requires_grant: self.0.requires_install_grant(),
            pending_installs: self.0.pending_installs(),
        })
    }

    fn settle_pending(&self) {
        self.0.settle_pending();
    }
}

/// 为 AppHandle 扩展 APK 安装器方法
pub trait ApkInstallerExt<R: Runtime> {
    fn apk_installer(&self) -> &ApkInstaller;
}

impl<R: Runtime, T: Manager<R>> ApkInstallerExt<R> for T {
    fn apk_installer(&self) -> &ApkInstaller {
        self.state::<ApkInstaller>().inner()
    }
}

/// 初始化插件
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<Config>> {
    Builder::<R, Option<Config>>::new("apk-installer")
        .invoke_handler(tauri::generate_handler![
            commands::install_apk,
            commands::check_install_permission
        ])
        .setup(|app, api| {
            let config = api.config().clone().unwrap_or_default();
            let installer = ApkInstaller::new(&config)?;
            app.manage(installer);
            Ok(())
        })
        .on_event(|app, event| {
            if matches!(event, RunEvent::Resumed) {
                // 用户可能刚从未知来源设置页回来，结算等待中的请求
                app.state::<ApkInstaller>().settle_pending();
            }
        })
        .build()
}
