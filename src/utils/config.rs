use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::fs;
use std::path::PathBuf;

pub struct Config {
    pub name: String,
    pub theme: String,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/neko")
        } else {
            PathBuf::from("tmp")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from("nekosh"),
            theme: String::from("default"),
            history_file: config_dir.join(".neko_history"),
            editor_mode: String::from("vi"),
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
            config_dir,
        }
    }

    pub fn new() -> Self {
        // 优先加载环境变量
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        // 默认配置
        let mut config = Config::default();

        // 从环境变量加载配置
        if let Ok(theme) = env::var("NEKO_THEME") {
            config.theme = theme;
        }

        if let Ok(editor) = env::var("NEKO_EDITOR") {
            config.editor_mode = editor;
        }

        if let Ok(history) = env::var("NEKO_HISTORY") {
            config.history_file = PathBuf::from(history);
        }

        if let Ok(level) = env::var("NEKO_LOG_LEVEL") {
            config.logger_level = level;
        }

        if let Ok(dir) = env::var("NEKO_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }

        // 确保历史文件目录存在
        if let Some(parent) = config.history_file.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("neko: 无法创建历史记录目录: {}", e);
            }
        }

        config
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "emacs" => EditMode::Emacs,
            _ => EditMode::Vi,
        }
    }
}
