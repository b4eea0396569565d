//! 非 Android 平台的占位桥接

use std::path::Path;

use apk_installer_core::{
    InstallUri, InstallerBridge, InstallerError, InstallerResult, PlatformCapabilities,
};

/// 占位实现，所有安装操作返回 `Unsupported`
pub struct UnsupportedBridge;

impl InstallerBridge for UnsupportedBridge {
    fn capabilities(&self) -> InstallerResult<PlatformCapabilities> {
        Ok(PlatformCapabilities {
            sdk_int: 0,
            cache_dir: None,
        })
    }

    fn can_install_from_unknown_sources(&self) -> InstallerResult<bool> {
        Err(InstallerError::Unsupported)
    }

    fn resolve_install_uri(&self, _path: &Path) -> InstallerResult<InstallUri> {
        Err(InstallerError::Unsupported)
    }

    fn launch_installer(&self, _uri: &InstallUri) -> InstallerResult<()> {
        Err(InstallerError::Unsupported)
    }

    fn open_unknown_sources_settings(&self) -> InstallerResult<()> {
        Err(InstallerError::Unsupported)
    }
}
