//! APK Installer Core Library
//!
//! 提供 APK 旁加载安装的平台无关流程编排，包括：
//! - 安装请求解析与校验
//! - “安装未知应用”授权门控与挂起/结算
//! - 安装来源路径限制
//!
//! 平台桥接（JNI 调用、系统设置页）通过 trait 抽象注入，
//! 本库自身不依赖任何 Android 运行时。

pub mod error;
pub mod service;
pub mod traits;
pub mod types;

mod pending;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{InstallerError, InstallerResult};
pub use service::InstallerService;
pub use traits::InstallerBridge;
pub use types::{InstallGate, InstallRequest, InstallScope, InstallUri, PlatformCapabilities};
