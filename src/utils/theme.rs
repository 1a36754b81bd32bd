use std::collections::HashMap;

use colored::Colorize;
use lazy_static::lazy_static;
use rand::seq::SliceRandom;

type StyleFn = Box<dyn Fn(String) -> String>;

pub struct Theme {
    pub prompt_style: StyleFn,
    pub success_style: StyleFn,
    pub warning_style: StyleFn,
    pub error_style: StyleFn,
}

lazy_static! {
    static ref MESSAGES: HashMap<&'static str, Vec<&'static str>> = {
        let mut m = HashMap::new();
        m.insert(
            "welcome",
            vec![
                "喵～欢迎回来，今天也要乖乖敲命令哦～",
                "喵呜～主人终于想起人家了吗？",
                "喵！人家已经把终端暖好了～",
            ],
        );
        m.insert("help", vec!["输入 exit 或按 Ctrl-D 离开喵～"]);
        m.insert("prompt", vec!["にゃ>"]);
        m.insert(
            "exit",
            vec!["喵～这就走了吗？下次早点回来哦～", "喵呜……人家会想你的……"],
        );
        m.insert("eof_signal", vec!["喵？不说再见就走吗……"]);
        m.insert("interrupt_signal", vec!["喵！吓人家一跳！"]);
        m.insert("error", vec!["出错了喵"]);
        m.insert("error_symbol", vec!["✗"]);
        m.insert("command_error", vec!["命令好像出错了喵……"]);
        m
    };
}

impl Theme {
    pub fn load_theme(name: &str) -> Self {
        match name {
            "dark" => Theme {
                prompt_style: Box::new(|s| s.bright_purple().to_string()),
                success_style: Box::new(|s| s.magenta().to_string()),
                warning_style: Box::new(|s| s.yellow().to_string()),
                error_style: Box::new(|s| s.red().to_string()),
            },
            _ => Theme {
                prompt_style: Box::new(|s| s.bright_cyan().to_string()),
                success_style: Box::new(|s| s.bright_magenta().to_string()),
                warning_style: Box::new(|s| s.bright_yellow().to_string()),
                error_style: Box::new(|s| s.bright_red().to_string()),
            },
        }
    }

    /// 同一个 key 可能有多条消息，随机挑一条
    pub fn get_message(&self, key: &str) -> String {
        let mut rng = rand::thread_rng();
        MESSAGES
            .get(key)
            .and_then(|messages| messages.choose(&mut rng))
            .copied()
            .unwrap_or("")
            .to_string()
    }
}
