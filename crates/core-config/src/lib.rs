//! Configuration loading for the recognized options enumerated in §6.
//!
//! Follows the teacher's `ConfigFile`/`Config` split: `ConfigFile` is the
//! `#[serde(default)]`-annotated deserializable shape; `Config` wraps it and
//! additionally tracks clamped effective values, following the same pattern
//! the teacher used for its scroll-margin clamp (`apply_context`). Discovery
//! order mirrors the teacher: a local `editor.toml`, then
//! `dirs::config_dir()`, then built-in defaults. Parse errors are resilient —
//! logged and replaced with defaults, never surfaced as a hard failure to
//! `EditorCore` construction (§0.3).

use serde::Deserialize;
use std::{fs, path::PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// `BELL_STYLE` mapping per §9.1: `none`/`off` suppress all bell output;
/// `audible`/`on` emit the `bel` capability; `visible` flashes, falling back
/// to audible if the terminal has no `flash` capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BellStyle {
    None,
    Audible,
    Visible,
}

impl BellStyle {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "none" | "off" => Some(Self::None),
            "audible" | "on" => Some(Self::Audible),
            "visible" => Some(Self::Visible),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConfigFile {
    pub disable_event_expansion: bool,
    pub disable_history: bool,
    pub history_verify: bool,
    pub menu_complete: bool,
    pub auto_list: bool,
    pub auto_menu: bool,
    pub list_ambiguous: bool,
    pub case_insensitive: bool,
    pub complete_in_word: bool,
    pub recognize_exact: bool,
    pub list_rows_first: bool,
    pub group: bool,
    pub pad_prompts: bool,
    pub bind_tty_special_chars: bool,
    pub errors: u32,
    pub list_max: usize,
    pub ambiguous_binding_ms: u64,
    pub escape_timeout_ms: u64,
    pub blink_matching_paren_timeout_ms: u64,
    pub completion_query_items: usize,
    pub tab_width: u8,
    pub comment_begin: String,
    pub bell_style: String,
    pub search_terminators: String,
    pub remove_suffix_chars: String,
    pub kill_ring_capacity: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            disable_event_expansion: false,
            disable_history: false,
            history_verify: false,
            menu_complete: false,
            auto_list: false,
            auto_menu: false,
            list_ambiguous: false,
            case_insensitive: false,
            complete_in_word: false,
            recognize_exact: false,
            list_rows_first: false,
            group: false,
            pad_prompts: false,
            bind_tty_special_chars: false,
            errors: 2,
            list_max: 100,
            ambiguous_binding_ms: 1000,
            // 0 disables the timeout (§9.1: block indefinitely rather than poll).
            escape_timeout_ms: 0,
            blink_matching_paren_timeout_ms: 500,
            completion_query_items: 100,
            tab_width: 8,
            comment_begin: "#".to_string(),
            bell_style: "audible".to_string(),
            search_terminators: "\u{1b}\n".to_string(),
            remove_suffix_chars: " \t\n;&|".to_string(),
            kill_ring_capacity: 60,
        }
    }
}

/// Runtime configuration: the parsed file plus values clamped into sane
/// ranges. Clamps are cheap and total, so they're applied once at load time
/// rather than re-derived on every read.
#[derive(Debug, Clone)]
pub struct Config {
    pub file: ConfigFile,
    pub bell_style: BellStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default())
    }
}

impl Config {
    fn from_file(mut file: ConfigFile) -> Self {
        let bell_style = BellStyle::parse(&file.bell_style).unwrap_or_else(|| {
            warn!(target: "config", value = %file.bell_style, "unrecognized bell-style, defaulting to audible");
            BellStyle::Audible
        });

        clamp_u8(&mut file.tab_width, 1, 16, "tab_width");
        clamp_usize(&mut file.list_max, 1, usize::MAX, "list_max");
        clamp_usize(
            &mut file.completion_query_items,
            1,
            usize::MAX,
            "completion_query_items",
        );

        Self { file, bell_style }
    }

    pub fn tab_width(&self) -> usize {
        self.file.tab_width as usize
    }

    pub fn errors(&self) -> u32 {
        self.file.errors
    }

    pub fn escape_timeout(&self) -> Option<std::time::Duration> {
        if self.file.escape_timeout_ms == 0 {
            None
        } else {
            Some(std::time::Duration::from_millis(self.file.escape_timeout_ms))
        }
    }

    pub fn ambiguous_binding_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.file.ambiguous_binding_ms)
    }

    pub fn blink_matching_paren_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.file.blink_matching_paren_timeout_ms)
    }

    pub fn search_terminators(&self) -> &str {
        &self.file.search_terminators
    }

    pub fn remove_suffix_chars(&self) -> &str {
        &self.file.remove_suffix_chars
    }
}

fn clamp_u8(value: &mut u8, min: u8, max: u8, field: &str) {
    let clamped = (*value).clamp(min, max);
    if clamped != *value {
        info!(target: "config", field, raw = *value, clamped, "config value clamped");
        *value = clamped;
    }
}

fn clamp_usize(value: &mut usize, min: usize, max: usize, field: &str) {
    let clamped = (*value).clamp(min, max);
    if clamped != *value {
        info!(target: "config", field, raw = *value, clamped, "config value clamped");
        *value = clamped;
    }
}

/// Local-first, then XDG/AppData config dir, matching the teacher's
/// `discover()` precedence.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("editor.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("editor").join("editor.toml");
    }
    PathBuf::from("editor.toml")
}

/// Load configuration from `path` (or the discovered default location).
/// Never fails: a missing or malformed file logs and falls back to
/// built-in defaults (§0.3).
pub fn load_from(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(discover);
    match try_load(&path) {
        Ok(file) => Config::from_file(file),
        Err(e) => {
            if path.exists() {
                warn!(target: "config", path = %path.display(), error = %e, "failed to load config, using defaults");
            }
            Config::default()
        }
    }
}

fn try_load(path: &PathBuf) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = Config::default();
        assert_eq!(cfg.errors(), 2);
        assert_eq!(cfg.file.list_max, 100);
        assert_eq!(cfg.tab_width(), 8);
        assert_eq!(cfg.escape_timeout(), None);
        assert_eq!(cfg.file.comment_begin, "#");
        assert!(matches!(cfg.bell_style, BellStyle::Audible));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load_from(Some(PathBuf::from("__definitely_missing__.toml")));
        assert_eq!(cfg.file.errors, 2);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not = [valid toml").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.file.errors, 2);
    }

    #[test]
    fn parses_recognized_options() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "auto_menu = true\nerrors = 3\nlist_max = 50\nbell_style = \"visible\"\ntab_width = 4\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert!(cfg.file.auto_menu);
        assert_eq!(cfg.file.errors, 3);
        assert_eq!(cfg.file.list_max, 50);
        assert_eq!(cfg.tab_width(), 4);
        assert!(matches!(cfg.bell_style, BellStyle::Visible));
    }

    #[test]
    fn unrecognized_bell_style_falls_back_to_audible() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "bell_style = \"klaxon\"\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert!(matches!(cfg.bell_style, BellStyle::Audible));
    }

    #[test]
    fn tab_width_clamped_into_range() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "tab_width = 200\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.tab_width(), 16);
    }
}
