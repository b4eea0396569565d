const COMMANDS: &[&str] = &["install_apk", "check_install_permission"];

fn main() {
    tauri_plugin::Builder::new(COMMANDS).build();
}
