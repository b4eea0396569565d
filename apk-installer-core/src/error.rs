//! 统一错误类型定义

use serde::Serialize;
use thiserror::Error;

/// 安装流程错误类型
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum InstallerError {
    /// 请求未携带文件路径
    #[error("File path is required")]
    PathRequired,

    /// 文件不存在（或不是普通文件）
    #[error("File does not exist: {0}")]
    FileNotFound(String),

    /// 用户拒绝了“安装未知应用”授权
    #[error("User denied permission to install unknown apps")]
    PermissionDenied,

    /// 路径在允许的安装目录之外
    #[error("Path is outside the allowed install directory: {0}")]
    PathNotAllowed(String),

    /// 当前平台不支持安装 APK
    #[error("APK installation is not supported on this platform")]
    Unsupported,

    /// 系统桥接层调用失败
    #[error("Installer bridge error: {0}")]
    Bridge(String),
}

impl InstallerError {
    /// 是否属于预期行为（用户输入、文件不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，返回 `false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::PathRequired
            | Self::FileNotFound(_)
            | Self::PermissionDenied
            | Self::PathNotAllowed(_)
            | Self::Unsupported => true,
            Self::Bridge(_) => false,
        }
    }
}

/// 安装流程 Result 类型别名
pub type InstallerResult<T> = std::result::Result<T, InstallerError>;
