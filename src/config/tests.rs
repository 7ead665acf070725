#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use super::*;

fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn clear_env() {
    // SAFETY: test-only env mutation; #[serial] prevents races.
    unsafe {
        std::env::remove_var("QRSTUDIO_STORE_DIR");
        std::env::remove_var("QRSTUDIO_BACKEND");
    }
}

// --- try_load_config ---

#[test]
fn missing_file_is_none() {
    let dir = TempDir::new().unwrap();
    assert!(try_load_config(&dir.path().join("nope.toml")).unwrap().is_none());
}

#[test]
fn full_file_parses() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        "config.toml",
        r##"
[store]
dir = "codes"
backend = "sqlite"

[style]
color = "#112233"
background = "#fff"
module_size = 6
border = 2
"##,
    );
    let cfg = try_load_config(&path).unwrap().unwrap();
    assert_eq!(cfg.store.dir, Some(PathBuf::from("codes")));
    assert_eq!(cfg.store.backend, Some(Backend::Sqlite));
    assert_eq!(cfg.style.color, Some(HexColor([0x11, 0x22, 0x33])));
    assert_eq!(cfg.style.background, Some(HexColor::WHITE));
    assert_eq!(cfg.style.module_size, Some(6));
    assert_eq!(cfg.style.border, Some(2));
}

#[test]
fn invalid_toml_is_an_error_naming_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "config.toml", "[store\n");
    let err = try_load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("config.toml"), "{err:#}");
}

#[test]
fn invalid_colour_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "config.toml", "[style]\ncolor = \"blue\"\n");
    assert!(try_load_config(&path).is_err());
}

#[test]
fn unknown_backend_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "config.toml", "[store]\nbackend = \"csv\"\n");
    assert!(try_load_config(&path).is_err());
}

// --- load_from ---

#[test]
fn no_files_gives_defaults() {
    let cfg = StudioConfig::load_from(None, None).unwrap();
    assert_eq!(cfg, StudioConfig::default());
    assert_eq!(cfg.store_dir, PathBuf::from("saved_qr_codes"));
    assert_eq!(cfg.backend, Backend::Text);
}

#[test]
fn project_overrides_global_field_by_field() {
    let dir = TempDir::new().unwrap();
    let global = write_config(
        dir.path(),
        "global.toml",
        "[store]\ndir = \"/global/codes\"\n[style]\nborder = 7\nmodule_size = 12\n",
    );
    let project = write_config(dir.path(), "project.toml", "[style]\nborder = 2\n");

    let cfg = StudioConfig::load_from(Some(&project), Some(&global)).unwrap();

    assert_eq!(cfg.store_dir, PathBuf::from("/global/codes"));
    assert_eq!(cfg.style.border, 2);
    assert_eq!(cfg.style.module_size, 12);
    assert_eq!(cfg.style.module_color, HexColor::BLACK);
}

#[test]
fn missing_project_file_falls_back_to_global() {
    let dir = TempDir::new().unwrap();
    let global = write_config(dir.path(), "global.toml", "[store]\nbackend = \"sqlite\"\n");
    let cfg =
        StudioConfig::load_from(Some(&dir.path().join("absent.toml")), Some(&global)).unwrap();
    assert_eq!(cfg.backend, Backend::Sqlite);
}

#[test]
fn out_of_range_style_is_rejected() {
    let dir = TempDir::new().unwrap();
    let project = write_config(dir.path(), "project.toml", "[style]\nmodule_size = 50\n");
    assert!(StudioConfig::load_from(Some(&project), None).is_err());
}

// --- apply_env ---

#[test]
#[serial]
fn env_overrides_store_dir_and_backend() {
    unsafe {
        std::env::set_var("QRSTUDIO_STORE_DIR", "/env/codes");
        std::env::set_var("QRSTUDIO_BACKEND", "SQLite");
    }
    let mut cfg = StudioConfig::default();
    let result = cfg.apply_env();
    clear_env();
    result.unwrap();
    assert_eq!(cfg.store_dir, PathBuf::from("/env/codes"));
    assert_eq!(cfg.backend, Backend::Sqlite);
}

#[test]
#[serial]
fn env_with_unknown_backend_is_an_error() {
    unsafe { std::env::set_var("QRSTUDIO_BACKEND", "mongodb") };
    let mut cfg = StudioConfig::default();
    let result = cfg.apply_env();
    clear_env();
    assert!(result.is_err());
}

#[test]
#[serial]
fn empty_env_values_are_ignored() {
    unsafe {
        std::env::set_var("QRSTUDIO_STORE_DIR", "");
        std::env::set_var("QRSTUDIO_BACKEND", "");
    }
    let mut cfg = StudioConfig::default();
    let result = cfg.apply_env();
    clear_env();
    result.unwrap();
    assert_eq!(cfg, StudioConfig::default());
}

// --- to_toml ---

#[test]
fn to_toml_round_trips_through_config_file() {
    let cfg = StudioConfig {
        store_dir: PathBuf::from("codes"),
        backend: Backend::Sqlite,
        style: StyleOptions {
            module_color: HexColor([0x12, 0x34, 0x56]),
            background_color: HexColor::WHITE,
            module_size: 8,
            border: 3,
        },
    };
    let rendered = cfg.to_toml().unwrap();
    assert!(rendered.contains("backend = \"sqlite\""), "{rendered}");
    assert!(rendered.contains("color = \"#123456\""), "{rendered}");

    let parsed: ConfigFile = toml::from_str(&rendered).unwrap();
    assert_eq!(StudioConfig::from_file(parsed).unwrap(), cfg);
}
