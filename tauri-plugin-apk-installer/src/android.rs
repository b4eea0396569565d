//! Android 平台桥接，经 JNI 调用 ART 运行时。
//!
//! URI 解析策略在构造时按 SDK 选定一次：API 24 起必须经
//! FileProvider 换取 `content://` URI，更早的系统直接用
//! `file://`。其余调用（授权查询、拉起安装器、打开设置页）
//! 都是同步 JNI 调用。

use std::path::{Path, PathBuf};

use jni::objects::{JObject, JValue};
use jni::{JNIEnv, JavaVM};

use apk_installer_core::{
    types::UNKNOWN_SOURCES_MIN_SDK, InstallUri, InstallerBridge, InstallerError, InstallerResult,
    PlatformCapabilities,
};

const ACTION_VIEW: &str = "android.intent.action.VIEW";
const ACTION_MANAGE_UNKNOWN_APP_SOURCES: &str = "android.settings.MANAGE_UNKNOWN_APP_SOURCES";
const APK_MIME_TYPE: &str = "application/vnd.android.package-archive";

const FLAG_ACTIVITY_NEW_TASK: i32 = 0x1000_0000;
const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;

/// Android 7.0（API 24）起应用间传递 `file://` URI 会抛
/// `FileUriExposedException`，必须改走 FileProvider
const FILE_PROVIDER_MIN_SDK: i32 = 24;

/// 文件 URI 解析策略，构造时按 SDK 选定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UriMode {
    /// API >= 24：经 FileProvider 换取 `content://` URI
    FileProvider,
    /// API < 24：直接使用 `file://` URI
    Direct,
}

impl UriMode {
    fn select(sdk_int: i32) -> Self {
        if sdk_int >= FILE_PROVIDER_MIN_SDK {
            Self::FileProvider
        } else {
            Self::Direct
        }
    }
}

/// Android 桥接实现
///
/// SDK 版本和缓存目录在构造时查询一次后固定，之后的每次
/// 桥接调用各自 attach 当前线程。
pub struct AndroidBridge {
    sdk_int: i32,
    uri_mode: UriMode,
    cache_dir: Option<PathBuf>,
}

impl AndroidBridge {
    /// 创建 Android 桥接，查询 SDK 版本并选定 URI 解析策略
    pub fn new() -> InstallerResult<Self> {
        with_env(|env, activity| {
            let sdk_int = sdk_int(env)?;
            let cache_dir = match cache_dir(env, activity) {
                Ok(dir) => Some(dir),
                Err(e) => {
                    log::warn!("Failed to query app cache dir: {e}");
                    None
                }
            };
            let uri_mode = UriMode::select(sdk_int);
            log::info!("Android bridge ready: SDK {sdk_int}, uri mode {uri_mode:?}");
            Ok(Self {
                sdk_int,
                uri_mode,
                cache_dir,
            })
        })
    }
}

impl InstallerBridge for AndroidBridge {
    fn capabilities(&self) -> InstallerResult<PlatformCapabilities> {
        Ok(PlatformCapabilities {
            sdk_int: self.sdk_int,
            cache_dir: self.cache_dir.clone(),
        })
    }

    fn can_install_from_unknown_sources(&self) -> InstallerResult<bool> {
        // canRequestPackageInstalls 在 API 26 之前不存在，视为恒真
        if self.sdk_int < UNKNOWN_SOURCES_MIN_SDK {
            return Ok(true);
        }
        with_env(|env, activity| {
            let pm = env
                .call_method(
                    activity,
                    "getPackageManager",
                    "()Landroid/content/pm/PackageManager;",
                    &[],
                )
                .map_err(|e| jni_err("getPackageManager", e))?
                .l()
                .map_err(|e| jni_err("getPackageManager->l", e))?;

            env.call_method(&pm, "canRequestPackageInstalls", "()Z", &[])
                .map_err(|e| jni_err("canRequestPackageInstalls", e))?
                .z()
                .map_err(|e| jni_err("canRequestPackageInstalls->z", e))
        })
    }

    fn resolve_install_uri(&self, path: &Path) -> InstallerResult<InstallUri> {
        let uri_mode = self.uri_mode;
        with_env(move |env, activity| {
            let file = new_file(env, path)?;

            let uri: JObject = match uri_mode {
                UriMode::FileProvider => {
                    let authority = install_authority(env, activity)?;
                    let j_authority = env
                        .new_string(&authority)
                        .map_err(|e| jni_err("new_string(authority)", e))?;

                    env.call_static_method(
                        "androidx/core/content/FileProvider",
                        "getUriForFile",
                        "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
                        &[
                            JValue::Object(activity),
                            JValue::Object(&j_authority),
                            JValue::Object(&file),
                        ],
                    )
                    .map_err(|e| jni_err("FileProvider.getUriForFile", e))?
                    .l()
                    .map_err(|e| jni_err("getUriForFile->l", e))?
                }
                UriMode::Direct => env
                    .call_static_method(
                        "android/net/Uri",
                        "fromFile",
                        "(Ljava/io/File;)Landroid/net/Uri;",
                        &[JValue::Object(&file)],
                    )
                    .map_err(|e| jni_err("Uri.fromFile", e))?
                    .l()
                    .map_err(|e| jni_err("Uri.fromFile->l", e))?,
            };

            uri_to_string(env, &uri).map(InstallUri)
        })
    }

    fn launch_installer(&self, uri: &InstallUri) -> InstallerResult<()> {
        let uri_mode = self.uri_mode;
        with_env(move |env, activity| {
            let uri_obj = parse_uri(env, &uri.0)?;
            let intent = new_intent(env, ACTION_VIEW)?;

            let j_mime = env
                .new_string(APK_MIME_TYPE)
                .map_err(|e| jni_err("new_string(mime)", e))?;
            env.call_method(
                &intent,
                "setDataAndType",
                "(Landroid/net/Uri;Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&uri_obj), JValue::Object(&j_mime)],
            )
            .map_err(|e| jni_err("setDataAndType", e))?;

            // content:// URI 需要给安装器授予读权限
            let mut flags = FLAG_ACTIVITY_NEW_TASK;
            if uri_mode == UriMode::FileProvider {
                flags |= FLAG_GRANT_READ_URI_PERMISSION;
            }
            env.call_method(
                &intent,
                "addFlags",
                "(I)Landroid/content/Intent;",
                &[JValue::Int(flags)],
            )
            .map_err(|e| jni_err("addFlags", e))?;

            start_activity(env, activity, &intent)
        })
    }

    fn open_unknown_sources_settings(&self) -> InstallerResult<()> {
        with_env(|env, activity| {
            let package = package_name(env, activity)?;
            let uri_obj = parse_uri(env, &format!("package:{package}"))?;

            let intent = new_intent(env, ACTION_MANAGE_UNKNOWN_APP_SOURCES)?;
            env.call_method(
                &intent,
                "setData",
                "(Landroid/net/Uri;)Landroid/content/Intent;",
                &[JValue::Object(&uri_obj)],
            )
            .map_err(|e| jni_err("setData", e))?;

            start_activity(env, activity, &intent)
        })
    }
}

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// 在已 attach 的 JNI 环境里执行一段桥接调用。
///
/// `AttachGuard` 在闭包执行期间保持存活；闭包出错时清掉
/// pending 的 Java 异常，避免毒化后续 JNI 调用。
#[allow(unsafe_code)]
fn with_env<T>(
    f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> InstallerResult<T>,
) -> InstallerResult<T> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the Tauri Android glue.
    // The pointer is guaranteed valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| InstallerError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| InstallerError::Bridge(format!("failed to attach JNI thread: {e}")))?;

    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(InstallerError::Bridge(
            "Android context is null, activity not initialised".into(),
        ));
    }
    // SAFETY: the glue layer guarantees this pointer is a valid global
    // jobject for the hosting Activity.
    let activity = unsafe { JObject::from_raw(ptr.cast()) };

    let result = f(&mut env, &activity);
    if result.is_err() && env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    result
}

/// 把 `jni::errors::Error` 映射为桥接错误
fn jni_err(context: &str, e: jni::errors::Error) -> InstallerError {
    InstallerError::Bridge(format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// Android API helpers
// ---------------------------------------------------------------------------

fn sdk_int(env: &mut JNIEnv<'_>) -> InstallerResult<i32> {
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .map_err(|e| jni_err("Build.VERSION.SDK_INT", e))?
        .i()
        .map_err(|e| jni_err("SDK_INT->i", e))
}

fn cache_dir(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> InstallerResult<PathBuf> {
    let dir = env
        .call_method(activity, "getCacheDir", "()Ljava/io/File;", &[])
        .map_err(|e| jni_err("getCacheDir", e))?
        .l()
        .map_err(|e| jni_err("getCacheDir->l", e))?;

    let path = env
        .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("getAbsolutePath", e))?
        .l()
        .map_err(|e| jni_err("getAbsolutePath->l", e))?;

    jstring_value(env, path).map(PathBuf::from)
}

fn package_name(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> InstallerResult<String> {
    let pkg = env
        .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("getPackageName", e))?
        .l()
        .map_err(|e| jni_err("getPackageName->l", e))?;

    jstring_value(env, pkg)
}

/// FileProvider authority，约定为 `<package>.fileprovider`
fn install_authority(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> InstallerResult<String> {
    Ok(format!("{}.fileprovider", package_name(env, activity)?))
}

fn new_file<'local>(env: &mut JNIEnv<'local>, path: &Path) -> InstallerResult<JObject<'local>> {
    let j_path = env
        .new_string(path.to_string_lossy())
        .map_err(|e| jni_err("new_string(path)", e))?;

    env.new_object(
        "java/io/File",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&j_path)],
    )
    .map_err(|e| jni_err("new File", e))
}

fn new_intent<'local>(env: &mut JNIEnv<'local>, action: &str) -> InstallerResult<JObject<'local>> {
    let j_action = env
        .new_string(action)
        .map_err(|e| jni_err("new_string(action)", e))?;

    env.new_object(
        "android/content/Intent",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&j_action)],
    )
    .map_err(|e| jni_err("new Intent", e))
}

fn parse_uri<'local>(env: &mut JNIEnv<'local>, uri: &str) -> InstallerResult<JObject<'local>> {
    let j_uri = env
        .new_string(uri)
        .map_err(|e| jni_err("new_string(uri)", e))?;

    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_uri)],
    )
    .map_err(|e| jni_err("Uri.parse", e))?
    .l()
    .map_err(|e| jni_err("Uri.parse->l", e))
}

fn uri_to_string(env: &mut JNIEnv<'_>, uri: &JObject<'_>) -> InstallerResult<String> {
    let s = env
        .call_method(uri, "toString", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("Uri.toString", e))?
        .l()
        .map_err(|e| jni_err("Uri.toString->l", e))?;

    jstring_value(env, s)
}

fn start_activity(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    intent: &JObject<'_>,
) -> InstallerResult<()> {
    env.call_method(
        activity,
        "startActivity",
        "(Landroid/content/Intent;)V",
        &[JValue::Object(intent)],
    )
    .map_err(|e| jni_err("startActivity", e))?;
    Ok(())
}

fn jstring_value(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> InstallerResult<String> {
    let s: String = env
        .get_string(&obj.into())
        .map_err(|e| jni_err("get_string", e))?
        .into();
    Ok(s)
}
