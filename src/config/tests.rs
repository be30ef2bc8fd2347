use super::load::{default_config_path, default_data_dir, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_tapedeck_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("TAPEDECK_CONFIG_PATH", "/tmp/tapedeck-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/tapedeck-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("tapedeck")
            .join("config.toml")
    );
}

#[test]
fn default_data_dir_falls_back_to_home_local_share() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_DATA_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_data_dir().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".local")
            .join("share")
            .join("tapedeck")
    );
}

#[test]
fn storage_dir_setting_wins_over_xdg_data_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");

    let mut s = Settings::default();
    assert_eq!(
        s.data_dir().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data").join("tapedeck")
    );

    s.storage.dir = Some("/srv/tapes".into());
    assert_eq!(s.data_dir().unwrap(), std::path::PathBuf::from("/srv/tapes"));
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 0.5
lofi = 0.25

[transport]
press_threshold_ms = 450
fast_forward_rate = 4.0
rewind_step_ms = 250
rewind_tick_ms = 40

[library]
bundled_dir = "/tmp/demo-tapes"
extensions = ["mp3"]
recursive = false

[storage]
quota_mb = 64

[ui]
header_text = "hello"

[log]
level = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TAPEDECK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("TAPEDECK__TRANSPORT__PRESS_THRESHOLD_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.volume, 0.5);
    assert_eq!(s.audio.lofi, 0.25);
    assert_eq!(s.audio.volume_step, 0.1);
    assert_eq!(s.transport.press_threshold_ms, 450);
    assert_eq!(s.transport.fast_forward_rate, 4.0);
    assert_eq!(s.transport.rewind_step(), std::time::Duration::from_millis(250));
    assert_eq!(s.transport.rewind_tick(), std::time::Duration::from_millis(40));
    assert_eq!(
        s.library.bundled_dir.as_deref(),
        Some(std::path::Path::new("/tmp/demo-tapes"))
    );
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert_eq!(s.storage.quota_bytes(), Some(64 * 1024 * 1024));
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.log.level, "debug");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[transport]
press_threshold_ms = 300
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TAPEDECK_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("TAPEDECK__TRANSPORT__PRESS_THRESHOLD_MS", "600");

    let s = Settings::load().unwrap();
    assert_eq!(s.transport.press_threshold_ms, 600);
}

#[test]
fn validate_rejects_degenerate_transport_timing() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.transport.rewind_tick_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.transport.fast_forward_rate = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.volume = 1.5;
    assert!(s.validate().is_err());
}

#[test]
fn validate_caps_transport_timing_at_a_minute() {
    let mut s = Settings::default();
    s.transport.press_threshold_ms = 60_000;
    assert!(s.validate().is_ok());

    s.transport.press_threshold_ms = u64::MAX;
    let err = s.validate().unwrap_err();
    assert!(err.contains("press_threshold_ms"));

    let mut s = Settings::default();
    s.transport.rewind_tick_ms = 60_001;
    assert!(s.validate().is_err());
}
