use log::{debug, error, warn};
use std::error::Error;
use std::io::Write;
use std::process;

use crate::shell::errors::ShellError;
use crate::shell::executor::Executor;
use crate::shell::parser::Parser;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::utils::config::Config;
use crate::utils::path;
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    theme: Theme,
    readline: ReadlineManager<'a>,
    executor: Executor,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, theme: Theme) -> Self {
        Self {
            theme,
            readline: ReadlineManager::new(config),
            executor: Executor::new(),
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("初始化 NekoShell...");
        self.readline.load_history();

        println!(
            "{}",
            (self.theme.success_style)(self.theme.get_message("welcome"))
        );
        println!(
            "{}",
            (self.theme.warning_style)(self.theme.get_message("help"))
        );
        debug!("NekoShell 准备就绪...");

        self.run_loop()?;
        self.readline.save_history();

        debug!("退出 NekoShell...");
        Ok(())
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn Error>> {
        loop {
            std::io::stdout().flush()?;
            let prompt = self.render_prompt();

            match self.readline.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if line.trim() == "exit" {
                        debug!("退出 NekoShell...");
                        println!(
                            "{}",
                            (self.theme.success_style)(self.theme.get_message("exit"))
                        );
                        process::exit(0);
                    }
                    self.handle_input(&line);
                }
                Err(err) => match err {
                    ReadlineError::Eof => {
                        warn!("接收到 EOF 信号，退出 NekoShell...");
                        println!(
                            "\n{}",
                            (self.theme.warning_style)(self.theme.get_message("eof_signal"))
                        );
                        break;
                    }
                    ReadlineError::Interrupted => {
                        warn!("接收到中断信号...");
                        println!(
                            "\n{}",
                            (self.theme.warning_style)(self.theme.get_message("interrupt_signal"))
                        );
                    }
                    err => {
                        error!("发生错误: {}", err);
                        eprintln!(
                            "{}: {}",
                            (self.theme.error_style)(self.theme.get_message("error")),
                            err
                        );
                    }
                },
            }
        }
        Ok(())
    }

    /// 提示符带当前工作目录，家目录缩写成 ~
    fn render_prompt(&self) -> String {
        format!(
            "{} {} ",
            (self.theme.prompt_style)(path::display_dir()),
            (self.theme.prompt_style)(self.theme.get_message("prompt")),
        )
    }

    fn handle_input(&mut self, line: &str) {
        self.readline.add_history(line.to_string());
        debug!("执行命令: {}", line);

        let mut parser = Parser::new(line);
        let node = match parser.parse_command() {
            Ok(node) => node,
            Err(e) => {
                // 解析错误只作废这一行
                eprintln!(
                    "{} {}",
                    (self.theme.error_style)(self.theme.get_message("error_symbol")),
                    (self.theme.error_style)(e.to_string()),
                );
                return;
            }
        };

        match self.executor.execute(&node) {
            Ok(status) => {
                if status != 0 {
                    debug!("命令退出码: {}", status);
                    eprintln!(
                        "{} {}",
                        (self.theme.error_style)(self.theme.get_message("error_symbol")),
                        (self.theme.error_style)(self.theme.get_message("command_error")),
                    );
                }
            }
            // 进程级资源错误没有恢复手段，整个 shell 直接退出
            Err(e @ ShellError::Resource(_)) => {
                error!("不可恢复的资源错误: {}", e);
                eprintln!("neko: {}", e);
                process::exit(1);
            }
            Err(e) => {
                eprintln!(
                    "{} {}",
                    (self.theme.error_style)(self.theme.get_message("error_symbol")),
                    (self.theme.error_style)(e.to_string()),
                );
            }
        }
    }
}
