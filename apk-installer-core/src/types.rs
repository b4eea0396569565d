//! 安装流程核心类型

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InstallerError, InstallerResult};

/// Android 8.0（API 26）起，安装未知来源应用需要用户显式授权
pub const UNKNOWN_SOURCES_MIN_SDK: i32 = 26;

/// 一次经过校验的安装请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    path: PathBuf,
}

impl InstallRequest {
    /// 解析调用方传入的原始路径。
    ///
    /// 空路径被拒绝；`file://` 前缀会被剥掉，其余部分原样保留
    /// （不做 trim，不触碰文件系统）。
    pub fn parse(raw: Option<&str>) -> InstallerResult<Self> {
        let raw = raw.unwrap_or_default();
        if raw.is_empty() {
            return Err(InstallerError::PathRequired);
        }
        let path = raw.strip_prefix("file://").unwrap_or(raw);
        Ok(Self {
            path: PathBuf::from(path),
        })
    }

    /// 归一化后的安装文件路径
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 校验目标文件存在且是普通文件。
    ///
    /// 解析和落地之间文件可能被删除，所以每次派发前都要重新校验。
    pub(crate) fn verify_exists(&self) -> InstallerResult<()> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(InstallerError::FileNotFound(
                self.path.display().to_string(),
            ))
        }
    }
}

/// 交给系统安装器的 URI（`content://` 或 `file://`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallUri(pub String);

impl fmt::Display for InstallUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 桥接层在启动时上报的平台信息
#[derive(Debug, Clone)]
pub struct PlatformCapabilities {
    /// Android API level（非 Android 平台为 0）
    pub sdk_int: i32,
    /// 应用缓存目录，用于可选的安装来源限制
    pub cache_dir: Option<PathBuf>,
}

/// 未知来源授权策略，启动时根据平台能力选定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallGate {
    /// API >= 26：派发前必须持有 `canRequestPackageInstalls` 授权
    RequiresUserGrant,
    /// API < 26：授权由系统安装器自行处理
    Permissive,
}

impl InstallGate {
    /// 根据平台能力选择授权策略
    #[must_use]
    pub fn select(caps: &PlatformCapabilities) -> Self {
        if caps.sdk_int >= UNKNOWN_SOURCES_MIN_SDK {
            Self::RequiresUserGrant
        } else {
            Self::Permissive
        }
    }

    /// 派发前是否需要检查未知来源授权
    #[must_use]
    pub const fn requires_grant(self) -> bool {
        matches!(self, Self::RequiresUserGrant)
    }
}

/// 安装来源路径限制
#[derive(Debug, Clone, Default)]
pub enum InstallScope {
    /// 不限制安装来源路径
    #[default]
    Unrestricted,
    /// 仅允许指定目录（通常是应用缓存目录）下的文件
    Within(PathBuf),
}

impl InstallScope {
    /// 校验路径落在允许的目录内。
    ///
    /// 两侧都先做 canonicalize，防止 `..` 绕过目录限制。
    pub fn check(&self, path: &Path) -> InstallerResult<()> {
        let Self::Within(root) = self else {
            return Ok(());
        };
        // 文件已通过存在性校验，canonicalize 失败说明它又被删掉了
        let canonical = path
            .canonicalize()
            .map_err(|_| InstallerError::FileNotFound(path.display().to_string()))?;
        let root = root.canonicalize().map_err(|e| {
            InstallerError::Bridge(format!("Failed to resolve allowed install directory: {e}"))
        })?;
        if canonical.starts_with(&root) {
            Ok(())
        } else {
            Err(InstallerError::PathNotAllowed(path.display().to_string()))
        }
    }
}
