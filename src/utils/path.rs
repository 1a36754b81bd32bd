use std::env;

use log::error;

/// 当前工作目录的绝对路径，获取失败时返回空串
pub fn current_dir() -> String {
    let dir = match env::current_dir() {
        Ok(x) => x,
        Err(e) => {
            error!("neko: PROMPT: env current_dir error: {}", e);
            return String::new();
        }
    };
    match dir.to_str() {
        Some(x) => x.to_string(),
        None => {
            error!("neko: PROMPT: to_str error");
            String::new()
        }
    }
}

/// 提示符里展示用的目录，家目录缩写成 ~
pub fn display_dir() -> String {
    let dir = current_dir();
    if let Ok(home) = env::var("HOME") {
        if !home.is_empty() && dir.starts_with(&home) {
            return dir.replacen(&home, "~", 1);
        }
    }
    dir
}
