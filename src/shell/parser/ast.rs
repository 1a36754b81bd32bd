use std::collections::HashMap;

use once_cell::sync::Lazy;

/// 内建命令表
static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("cd", Builtin::Cd);
    m.insert("exit", Builtin::Exit);
    m
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Exit,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        BUILTINS.get(name).copied()
    }
}

/// 命令树：叶子是简单命令，管道节点的两个孩子本身又是完整的命令树，
/// `a|b|c` 解析成右结合的 Pipeline(a, Pipeline(b, c))
#[derive(Debug)]
pub enum Node {
    Simple(SimpleCommand),
    Pipeline(Box<Node>, Box<Node>),
}

/// 一次程序调用：参数 0 是程序名或内建命令名，tokens 永远非空
#[derive(Debug, Clone, Default)]
pub struct SimpleCommand {
    pub tokens: Vec<String>,
    pub stdin: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub builtin: Option<Builtin>,
}
