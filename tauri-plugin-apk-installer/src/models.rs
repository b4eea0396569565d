use serde::{Deserialize, Serialize};

/// 插件配置（tauri.conf.json 的 `plugins.apk-installer` 段）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// 只允许安装应用缓存目录下的 APK
    #[serde(default)]
    pub restrict_to_app_cache: bool,
}

/// 未知来源授权状态
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallPermissionStatus {
    /// 当前是否允许本应用安装未知来源应用
    pub granted: bool,
    /// 本平台安装前是否需要该授权（API < 26 为 false）
    pub requires_grant: bool,
    /// 等待授权落定的安装请求数
    pub pending_installs: usize,
}
