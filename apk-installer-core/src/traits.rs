//! 平台桥接抽象

use std::path::Path;

use crate::error::InstallerResult;
use crate::types::{InstallUri, PlatformCapabilities};

/// 系统安装器桥接接口
///
/// 核心层只跟这个 trait 打交道，平台层注入具体实现
/// （Android 走 JNI，桌面端是不支持占位）。桥接调用都是
/// 同步的本地调用，不涉及 IO 等待。
pub trait InstallerBridge: Send + Sync {
    /// 上报平台能力，服务启动时调用一次
    fn capabilities(&self) -> InstallerResult<PlatformCapabilities>;

    /// 查询当前是否持有“安装未知应用”授权
    fn can_install_from_unknown_sources(&self) -> InstallerResult<bool>;

    /// 把文件路径解析为系统安装器可读取的 URI
    fn resolve_install_uri(&self, path: &Path) -> InstallerResult<InstallUri>;

    /// 拉起系统安装器
    fn launch_installer(&self, uri: &InstallUri) -> InstallerResult<()>;

    /// 打开本应用的“安装未知应用”系统设置页
    fn open_unknown_sources_settings(&self) -> InstallerResult<()>;
}
