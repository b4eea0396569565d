//! 测试辅助模块
//!
//! 提供 mock 桥接实现和便捷的测试工厂方法。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{InstallerError, InstallerResult};
use crate::service::InstallerService;
use crate::traits::InstallerBridge;
use crate::types::{InstallScope, InstallUri, PlatformCapabilities};

// ===== MockBridge =====

pub struct MockBridge {
    sdk_int: i32,
    granted: AtomicBool,
    grant_checks: AtomicUsize,
    launches: AtomicUsize,
    settings_opens: AtomicUsize,
    resolved: Mutex<Vec<PathBuf>>,
    /// 如果 Some，对应的桥接调用返回此错误（用于测试失败路径）
    capabilities_error: Mutex<Option<String>>,
    grant_error: Mutex<Option<String>>,
    resolve_error: Mutex<Option<String>>,
    launch_error: Mutex<Option<String>>,
    settings_error: Mutex<Option<String>>,
}

impl MockBridge {
    /// 已持有未知来源授权的桥接
    pub fn granted(sdk_int: i32) -> Self {
        Self::new(sdk_int, true)
    }

    /// 尚未授权的桥接
    pub fn denied(sdk_int: i32) -> Self {
        Self::new(sdk_int, false)
    }

    fn new(sdk_int: i32, granted: bool) -> Self {
        Self {
            sdk_int,
            granted: AtomicBool::new(granted),
            grant_checks: AtomicUsize::new(0),
            launches: AtomicUsize::new(0),
            settings_opens: AtomicUsize::new(0),
            resolved: Mutex::new(Vec::new()),
            capabilities_error: Mutex::new(None),
            grant_error: Mutex::new(None),
            resolve_error: Mutex::new(None),
            launch_error: Mutex::new(None),
            settings_error: Mutex::new(None),
        }
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    pub fn set_capabilities_error(&self, err: Option<String>) {
        *lock(&self.capabilities_error) = err;
    }

    pub fn set_grant_error(&self, err: Option<String>) {
        *lock(&self.grant_error) = err;
    }

    pub fn set_resolve_error(&self, err: Option<String>) {
        *lock(&self.resolve_error) = err;
    }

    pub fn set_launch_error(&self, err: Option<String>) {
        *lock(&self.launch_error) = err;
    }

    pub fn set_settings_error(&self, err: Option<String>) {
        *lock(&self.settings_error) = err;
    }

    pub fn grant_checks(&self) -> usize {
        self.grant_checks.load(Ordering::SeqCst)
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn settings_count(&self) -> usize {
        self.settings_opens.load(Ordering::SeqCst)
    }

    /// 解析过的安装路径，按调用顺序
    pub fn resolved_paths(&self) -> Vec<PathBuf> {
        lock(&self.resolved).clone()
    }
}

impl InstallerBridge for MockBridge {
    fn capabilities(&self) -> InstallerResult<PlatformCapabilities> {
        if let Some(msg) = lock(&self.capabilities_error).clone() {
            return Err(InstallerError::Bridge(msg));
        }
        Ok(PlatformCapabilities {
            sdk_int: self.sdk_int,
            cache_dir: None,
        })
    }

    fn can_install_from_unknown_sources(&self) -> InstallerResult<bool> {
        self.grant_checks.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = lock(&self.grant_error).clone() {
            return Err(InstallerError::Bridge(msg));
        }
        Ok(self.granted.load(Ordering::SeqCst))
    }

    fn resolve_install_uri(&self, path: &Path) -> InstallerResult<InstallUri> {
        if let Some(msg) = lock(&self.resolve_error).clone() {
            return Err(InstallerError::Bridge(msg));
        }
        lock(&self.resolved).push(path.to_path_buf());
        Ok(InstallUri(format!("content://test{}", path.display())))
    }

    fn launch_installer(&self, _uri: &InstallUri) -> InstallerResult<()> {
        if let Some(msg) = lock(&self.launch_error).clone() {
            return Err(InstallerError::Bridge(msg));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_unknown_sources_settings(&self) -> InstallerResult<()> {
        if let Some(msg) = lock(&self.settings_error).clone() {
            return Err(InstallerError::Bridge(msg));
        }
        self.settings_opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ===== 工厂方法 =====

/// 创建测试用 `InstallerService`（不限制安装来源）
pub fn create_test_service(bridge: Arc<MockBridge>) -> Arc<InstallerService> {
    Arc::new(InstallerService::new(bridge, InstallScope::Unrestricted).unwrap())
}

/// 创建带来源限制的测试用 `InstallerService`
pub fn create_scoped_service(bridge: Arc<MockBridge>, root: PathBuf) -> Arc<InstallerService> {
    Arc::new(InstallerService::new(bridge, InstallScope::Within(root)).unwrap())
}

/// 在临时目录里放一个假 APK，返回其路径字符串
pub fn write_test_apk(dir: &tempfile::TempDir, name: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, b"PK\x03\x04").unwrap();
    path.display().to_string()
}
