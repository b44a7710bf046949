use std::path::PathBuf;

pub fn default_app_port() -> u16 {
    3000
}

pub fn default_cdn_port() -> u16 {
    3200
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_public_path() -> String {
    "/".to_string()
}

pub fn default_src_dir() -> PathBuf {
    PathBuf::from("src")
}

pub fn default_statics_dir() -> PathBuf {
    PathBuf::from("dist/statics")
}

pub fn default_typecheck_command() -> Vec<String> {
    ["npx", "tsc", "--noEmit", "--pretty", "false"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_watch_ignore() -> Vec<String> {
    ["node_modules", ".git", "*.swp", "*~", ".DS_Store"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_debounce_ms() -> u64 {
    100
}
