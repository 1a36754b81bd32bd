use std::fmt;

use nix::errno::Errno;

/// 解析阶段的错误，只作废当前这一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 重定向操作符后面缺路径
    MissingRedirectionTarget(String),
    /// 管道两侧或去掉重定向之后命令为空
    EmptyCommand,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingRedirectionTarget(op) => {
                write!(f, "expected a path after `{}`", op)
            }
            ParseError::EmptyCommand => write!(f, "expected a command"),
        }
    }
}

#[derive(Debug)]
pub enum ShellError {
    /// 当前行作废，shell 继续读下一行
    Parse(ParseError),
    /// fork/pipe/dup 失败，shell 整个退出
    Resource(Errno),
    /// 只发生在 fork 出来的子进程里：程序找不到或重定向目标打不开
    Exec(String),
    /// 内建命令参数不对或执行失败，返回非零状态
    Builtin(String),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Parse(e) => write!(f, "syntax error: {}", e),
            ShellError::Resource(errno) => write!(f, "resource error: {}", errno),
            ShellError::Exec(message) => write!(f, "{}", message),
            ShellError::Builtin(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<ParseError> for ShellError {
    fn from(e: ParseError) -> Self {
        ShellError::Parse(e)
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
