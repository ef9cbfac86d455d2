use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use cross_xdg::BaseDirs;
use nu_ansi_term::Color;

use crate::interp::BracketPolicy;
use crate::tape::DEFAULT_TAPE_LEN;
use crate::theme::catppuccin::Macchiato as P;

/// Highlight colors for the REPL, one per operator group.
#[derive(Debug, Clone)]
pub struct Colors {
    pub op_advance: Color,   // '>'
    pub op_retreat: Color,   // '<'
    pub op_increment: Color, // '+'
    pub op_decrement: Color, // '-'
    pub op_emit: Color,      // '.'
    pub op_consume: Color,   // ','
    pub op_bracket: Color,   // '[' and ']'
    pub commentary: Color,
}

impl Default for Colors {
    fn default() -> Self {
        // Movement in the blues, data in green/red, I/O in the warm pair,
        // flow control in mauve; commentary dimmed.
        Self {
            op_advance: P::SKY,
            op_retreat: P::TEAL,
            op_increment: P::GREEN,
            op_decrement: P::RED,
            op_emit: P::YELLOW,
            op_consume: P::PEACH,
            op_bracket: P::MAUVE,
            commentary: P::SURFACE2,
        }
    }
}

/// User-tunable interpreter and CLI settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Tape length in cells.
    pub tape_len: usize,
    /// What a stray ']' does.
    pub bracket_policy: BracketPolicy,
    /// Default wall-clock budget for `run`, in milliseconds.
    pub timeout_ms: u64,
    /// Default step budget for `run`; `None` means unlimited.
    pub max_steps: Option<u64>,
    pub colors: Colors,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_len: DEFAULT_TAPE_LEN,
            bracket_policy: BracketPolicy::Lenient,
            timeout_ms: 2_000,
            max_steps: None,
            colors: Colors::default(),
        }
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| load_from_toml().unwrap_or_default())
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
    } else {
        // Try named colors matching nu_ansi_term::Color variants
        let name = s.to_ascii_lowercase();
        return Some(match name.as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" | "purple" => Color::Purple,
            "cyan" => Color::Cyan,
            "gray" | "grey" => Color::LightGray,
            "darkgray" | "dark_grey" | "darkgrey" | "dark_gray" => Color::DarkGray,
            "lightred" | "light_red" => Color::LightRed,
            "lightgreen" | "light_green" => Color::LightGreen,
            "lightblue" | "light_blue" => Color::LightBlue,
            "lightmagenta" | "light_magenta" | "lightpurple" | "light_purple" => Color::LightPurple,
            "lightcyan" | "light_cyan" => Color::LightCyan,
            "white" => Color::White,
            _ => return None,
        });
    }
    None
}

fn load_from_toml() -> Option<Settings> {
    let base_dirs = BaseDirs::new().unwrap();

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let config_home = base_dirs.config_home();

    let mut path = PathBuf::from(config_home);
    path.push("bfs.toml");

    let content = fs::read_to_string(path).ok()?;
    // Very small hand-rolled parser: track the current [section] and collect
    // "section.key" -> value pairs. Values may be quoted or bare.
    let mut section = String::new();
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len()-1].to_string();
            continue;
        }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq+1..].trim();
            // Accept quoted or unquoted
            let val = if val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2 {
                val_raw[1..val_raw.len()-1].to_string()
            } else { val_raw.to_string() };
            map.insert(format!("{section}.{key}"), val);
        }
    }

    let mut cfg = Settings::default();

    if let Some(v) = map.get("interpreter.tape_size").and_then(|s| s.parse::<usize>().ok()) {
        if v >= 1 {
            cfg.tape_len = v;
        }
    }
    if let Some(v) = map.get("interpreter.bracket_policy") {
        match v.to_ascii_lowercase().as_str() {
            "strict" => cfg.bracket_policy = BracketPolicy::Strict,
            "lenient" => cfg.bracket_policy = BracketPolicy::Lenient,
            _ => {}
        }
    }
    if let Some(v) = map.get("limits.timeout_ms").and_then(|s| s.parse::<u64>().ok()) {
        cfg.timeout_ms = v;
    }
    if let Some(v) = map.get("limits.max_steps").and_then(|s| s.parse::<u64>().ok()) {
        cfg.max_steps = Some(v);
    }

    macro_rules! set {
        ($field:ident, $key:literal) => {
            if let Some(v) = map.get($key).and_then(|s| parse_color(s)) { cfg.colors.$field = v; }
        };
    }

    set!(op_advance, "colors.op_advance");
    set!(op_retreat, "colors.op_retreat");
    set!(op_increment, "colors.op_increment");
    set!(op_decrement, "colors.op_decrement");
    set!(op_emit, "colors.op_emit");
    set!(op_consume, "colors.op_consume");
    set!(op_bracket, "colors.op_bracket");
    set!(commentary, "colors.commentary");

    Some(cfg)
}
