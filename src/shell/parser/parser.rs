use super::ast::{Builtin, Node, SimpleCommand};
use super::lexer::{Lexer, Token};
use super::redirect;
use crate::shell::errors::{ParseError, ShellError};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
        }
    }

    fn next_token(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// 整行解析成一棵命令树。任何一个叶子失败整行作废，不返回半成品
    pub fn parse_command(&mut self) -> Result<Node, ShellError> {
        self.parse_node()
    }

    /// 在第一个管道符处切开，左半边是简单命令，右半边递归解析，
    /// 所以 `a|b|c` 得到右结合的 Pipeline(a, Pipeline(b, c))
    fn parse_node(&mut self) -> Result<Node, ShellError> {
        let left = self.parse_simple_command()?;

        if self.current_token == Token::Pipe {
            self.next_token(); // 跳过管道符
            let right = self.parse_node()?;
            return Ok(Node::Pipeline(
                Box::new(Node::Simple(left)),
                Box::new(right),
            ));
        }

        Ok(Node::Simple(left))
    }

    fn parse_simple_command(&mut self) -> Result<SimpleCommand, ShellError> {
        let mut segment = Vec::new();
        loop {
            match &self.current_token {
                Token::EOF | Token::Pipe => break,
                token => {
                    segment.push(token.clone());
                    self.next_token();
                }
            }
        }

        if segment.is_empty() {
            return Err(ParseError::EmptyCommand.into());
        }

        // 内建命令不做重定向解析，整段词形原样变成参数
        if let Token::Word(first) = &segment[0] {
            if let Some(builtin) = Builtin::lookup(first) {
                return Ok(SimpleCommand {
                    tokens: segment.iter().map(|t| t.lexeme().to_string()).collect(),
                    builtin: Some(builtin),
                    ..SimpleCommand::default()
                });
            }
        }

        let (tokens, redirections) = redirect::extract(segment)?;
        Ok(SimpleCommand {
            tokens,
            stdin: redirections.stdin,
            stdout: redirections.stdout,
            stderr: redirections.stderr,
            builtin: None,
        })
    }
}
