use tauri::{command, AppHandle, Runtime};

use crate::models::InstallPermissionStatus;
use crate::{ApkInstallerExt, Result};

/// 安装指定路径的 APK 文件
///
/// 缺少“安装未知应用”授权时会打开系统设置页，等用户授权、
/// 应用回到前台后自动续装，返回值到那时才落定。
#[command]
pub async fn install_apk<R: Runtime>(app: AppHandle<R>, file_path: Option<String>) -> Result<()> {
    app.apk_installer().install(file_path).await
}

/// 查询未知来源授权状态
#[command]
pub async fn check_install_permission<R: Runtime>(
    app: AppHandle<R>,
) -> Result<InstallPermissionStatus> {
    app.apk_installer().check_permission()
}
