use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::process;

use log::{debug, error};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, execvp, fork, pipe, ForkResult, Pid};

use super::builtins;
use crate::shell::errors::{Result, ShellError};
use crate::shell::parser::ast::{Node, SimpleCommand};

pub struct Executor;

impl Executor {
    pub fn new() -> Self {
        Self
    }

    /// 执行一棵命令树，返回最终退出码。每行建一棵树，执行一次就丢
    pub fn execute(&self, node: &Node) -> Result<i32> {
        match node {
            Node::Simple(command) => self.execute_simple(command),
            Node::Pipeline(left, right) => self.execute_pipeline(left, right),
        }
    }

    fn execute_simple(&self, command: &SimpleCommand) -> Result<i32> {
        if let Some(builtin) = command.builtin {
            debug!("执行内建命令: {:?}", command.tokens);
            return builtins::run(builtin, &command.tokens);
        }

        debug!("执行外部命令: {:?}", command.tokens);
        match unsafe { fork() }.map_err(ShellError::Resource)? {
            ForkResult::Parent { child } => self.wait_child(child),
            ForkResult::Child => exec_simple(command),
        }
    }

    /// 管道两端各 fork 一个子进程。父进程必须先关掉自己手里的两个
    /// 管道描述符再等待，否则读端永远等不到 EOF，三个进程一起卡死
    fn execute_pipeline(&self, left: &Node, right: &Node) -> Result<i32> {
        let (read_end, write_end) = pipe().map_err(ShellError::Resource)?;

        let left_pid = match unsafe { fork() }.map_err(ShellError::Resource)? {
            ForkResult::Child => {
                if let Err(e) = dup2(write_end.as_raw_fd(), libc::STDOUT_FILENO) {
                    exit_child(ShellError::Resource(e));
                }
                drop(read_end);
                drop(write_end);
                self.exec_node(left)
            }
            ForkResult::Parent { child } => child,
        };

        let right_pid = match unsafe { fork() }.map_err(ShellError::Resource)? {
            ForkResult::Child => {
                if let Err(e) = dup2(read_end.as_raw_fd(), libc::STDIN_FILENO) {
                    exit_child(ShellError::Resource(e));
                }
                drop(read_end);
                drop(write_end);
                self.exec_node(right)
            }
            ForkResult::Parent { child } => child,
        };

        drop(read_end);
        drop(write_end);

        // 两个子进程都要收割，后收割的那个决定整条管道的退出码
        let _ = self.wait_child(left_pid)?;
        self.wait_child(right_pid)
    }

    /// 在 fork 出来的子进程里执行一棵子树，绝不返回。
    /// 子树自己还是管道时继续 fork，所以任意长的链都能接起来
    fn exec_node(&self, node: &Node) -> ! {
        match node {
            // 管道里的内建命令改不了父进程的状态，直接成功退出
            Node::Simple(command) if command.builtin.is_some() => process::exit(0),
            Node::Simple(command) => exec_simple(command),
            Node::Pipeline(left, right) => match self.execute_pipeline(left, right) {
                Ok(status) => process::exit(status),
                Err(e) => exit_child(e),
            },
        }
    }

    fn wait_child(&self, pid: Pid) -> Result<i32> {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => Ok(code),
            Ok(WaitStatus::Signaled(_, sig, _)) => Ok(128 + sig as i32),
            Ok(status) => {
                error!("waitpid 返回了意外状态: {:?}", status);
                Ok(1)
            }
            Err(e) => Err(ShellError::Resource(e)),
        }
    }
}

/// 子进程侧：挂好重定向再用 execvp 替换进程映像。
/// 失败只能带非零码退出，控制权绝不交还给 shell 逻辑
fn exec_simple(command: &SimpleCommand) -> ! {
    // Rust 运行时默认忽略 SIGPIPE，而 ignore 会穿过 execvp 传给新映像，
    // 这里先恢复默认行为
    unsafe {
        let _ = signal(Signal::SIGPIPE, SigHandler::SigDfl);
    }

    let err = match apply_redirections(command) {
        Err(e) => e,
        Ok(()) => exec_program(&command.tokens),
    };
    exit_child(err)
}

/// execvp 成功时进程映像已经被替换，这个函数只在失败时返回
fn exec_program(tokens: &[String]) -> ShellError {
    let program = match CString::new(tokens[0].as_str()) {
        Ok(p) => p,
        Err(_) => return ShellError::Exec(format!("{}: invalid program name", tokens[0])),
    };
    let mut args = Vec::with_capacity(tokens.len());
    for token in tokens {
        match CString::new(token.as_str()) {
            Ok(arg) => args.push(arg),
            Err(_) => return ShellError::Exec(format!("{}: invalid argument", token)),
        }
    }

    match execvp(&program, &args) {
        Err(errno) => ShellError::Exec(format!("{}: {}", tokens[0], errno.desc())),
        Ok(_) => unreachable!(),
    }
}

/// 打开重定向目标并复制到对应标准流上。`&>` 只打开一次，
/// 同时接到 stdout 和 stderr；临时描述符随 File 析构关闭
fn apply_redirections(command: &SimpleCommand) -> Result<()> {
    if let Some(path) = &command.stdin {
        let file =
            File::open(path).map_err(|e| ShellError::Exec(format!("{}: {}", path, e)))?;
        dup_onto(file.as_raw_fd(), libc::STDIN_FILENO)?;
    }

    let combined = command.stdout.is_some() && command.stdout == command.stderr;
    if let Some(path) = &command.stdout {
        let file = open_truncated(path, 0o600)?;
        dup_onto(file.as_raw_fd(), libc::STDOUT_FILENO)?;
        if combined {
            dup_onto(file.as_raw_fd(), libc::STDERR_FILENO)?;
        }
    }
    if !combined {
        if let Some(path) = &command.stderr {
            let file = open_truncated(path, 0o644)?;
            dup_onto(file.as_raw_fd(), libc::STDERR_FILENO)?;
        }
    }

    Ok(())
}

fn open_truncated(path: &str, mode: u32) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
        .map_err(|e| ShellError::Exec(format!("{}: {}", path, e)))
}

fn dup_onto(fd: RawFd, stream: RawFd) -> Result<()> {
    dup2(fd, stream).map_err(ShellError::Resource)?;
    Ok(())
}

/// 子进程里报告错误然后退出
fn exit_child(err: ShellError) -> ! {
    eprintln!("neko: {}", err);
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::parser::Parser;
    use std::fs;
    use std::path::PathBuf;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("neko_{}_{}", std::process::id(), name))
    }

    #[allow(clippy::unwrap_used)]
    fn run_line(line: &str) -> i32 {
        let mut parser = Parser::new(line);
        let node = parser.parse_command().unwrap();
        Executor::new().execute(&node).unwrap()
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_output_redirection_writes_the_file() {
        let out = temp_file("out.txt");
        let status = run_line(&format!("echo hi > {}", out.display()));
        assert_eq!(status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
        let _ = fs::remove_file(&out);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_pipeline_delivers_stdout_to_stdin() {
        let out = temp_file("pipe.txt");
        let status = run_line(&format!("echo hi | cat > {}", out.display()));
        assert_eq!(status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
        let _ = fs::remove_file(&out);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_chained_pipeline_is_byte_exact() {
        let out = temp_file("chain.txt");
        let status = run_line(&format!("echo hello world | cat | cat > {}", out.display()));
        assert_eq!(status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello world\n");
        let _ = fs::remove_file(&out);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_input_redirection_reads_the_file() {
        let input = temp_file("in.txt");
        let out = temp_file("in_out.txt");
        fs::write(&input, "data\n").unwrap();
        let status = run_line(&format!("cat < {} > {}", input.display(), out.display()));
        assert_eq!(status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "data\n");
        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&out);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_stderr_redirection_captures_errors() {
        let err_file = temp_file("err.txt");
        let status = run_line(&format!("cat /neko/no/such/file 2> {}", err_file.display()));
        assert_ne!(status, 0);
        assert!(!fs::read_to_string(&err_file).unwrap().is_empty());
        let _ = fs::remove_file(&err_file);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_combined_redirection_captures_errors() {
        let all = temp_file("all.txt");
        let status = run_line(&format!("cat /neko/no/such/file &> {}", all.display()));
        assert_ne!(status, 0);
        assert!(!fs::read_to_string(&all).unwrap().is_empty());
        let _ = fs::remove_file(&all);
    }

    #[test]
    fn test_missing_program_reports_nonzero_status() {
        let status = run_line("neko_definitely_missing_program_413");
        assert_ne!(status, 0);
    }

    #[test]
    fn test_unopenable_redirection_fails_only_that_command() {
        let status = run_line("cat < /neko/no/such/file");
        assert_ne!(status, 0);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_builtin_inside_pipeline_is_a_noop() {
        let out = temp_file("builtin_pipe.txt");
        let status = run_line(&format!("cd | cat > {}", out.display()));
        assert_eq!(status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "");
        let _ = fs::remove_file(&out);
    }
}
