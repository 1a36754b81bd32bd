use std::env;
use std::path::PathBuf;
use std::process;

use log::debug;

use crate::shell::errors::{Result, ShellError};
use crate::shell::parser::ast::Builtin;
use crate::utils::path;

/// 在 shell 自己的进程里执行内建命令。cd 必须改父进程的工作目录，
/// 丢到子进程里做是白做
pub fn run(builtin: Builtin, tokens: &[String]) -> Result<i32> {
    match builtin {
        Builtin::Cd => cd(tokens),
        Builtin::Exit => exit(),
    }
}

/// cd 只认一个参数，多了少了都不动当前目录
fn cd(tokens: &[String]) -> Result<i32> {
    if tokens.len() != 2 {
        return Err(ShellError::Builtin(format!(
            "cd: expected exactly one argument, got {}",
            tokens.len() - 1
        )));
    }

    let target = resolve_target(&tokens[1]);
    debug!("cd 切换目录: {}", target.display());
    env::set_current_dir(&target)
        .map_err(|e| ShellError::Builtin(format!("cd: {}: {}", tokens[1], e)))?;
    Ok(0)
}

/// exit 直接结束整个 shell 进程，不走按行清理
fn exit() -> ! {
    debug!("exit 退出 shell");
    process::exit(0);
}

/// 不以 / 开头的路径拼接到当前工作目录后面，绝对路径原样使用
fn resolve_target(arg: &str) -> PathBuf {
    if arg.starts_with('/') {
        PathBuf::from(arg)
    } else {
        PathBuf::from(path::current_dir()).join(arg)
    }
}
