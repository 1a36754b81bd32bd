use super::lexer::{RedirectOp, Token};
use crate::shell::errors::ParseError;

/// 一条简单命令的重定向目标，同一条流后扫描到的覆盖先前的
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirections {
    pub stdin: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

/// 从一段 token 里摘出重定向对，返回清理后的参数表。
/// 操作符后面必须紧跟一个路径词，缺了或者又是操作符都算语法错误
pub fn extract(tokens: Vec<Token>) -> Result<(Vec<String>, Redirections), ParseError> {
    let mut args = Vec::new();
    let mut redirections = Redirections::default();
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        match token {
            Token::Word(word) => args.push(word),
            Token::Redirect(op) => {
                let target = match iter.next() {
                    Some(Token::Word(path)) => path,
                    _ => {
                        return Err(ParseError::MissingRedirectionTarget(
                            op.as_str().to_string(),
                        ))
                    }
                };
                match op {
                    RedirectOp::Input => redirections.stdin = Some(target),
                    RedirectOp::Output => redirections.stdout = Some(target),
                    RedirectOp::Error => redirections.stderr = Some(target),
                    RedirectOp::Both => {
                        redirections.stdout = Some(target.clone());
                        redirections.stderr = Some(target);
                    }
                }
            }
            // 管道符和 EOF 不会出现在一段命令里
            Token::Pipe | Token::EOF => {}
        }
    }

    if args.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    Ok((args, redirections))
}

#[cfg(test)]
mod tests {
    use super::super::lexer::Lexer;
    use super::*;

    fn tokens(line: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(line);
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token() {
                Token::EOF => break,
                token => tokens.push(token),
            }
        }
        tokens
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_no_redirections_passes_args_through() {
        let (args, redirections) = extract(tokens("echo hello world")).unwrap();
        assert_eq!(args, vec!["echo", "hello", "world"]);
        assert_eq!(redirections, Redirections::default());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_each_operator_sets_its_stream() {
        let (args, redirections) =
            extract(tokens("sort < in.txt > out.txt 2> err.txt")).unwrap();
        assert_eq!(args, vec!["sort"]);
        assert_eq!(redirections.stdin.as_deref(), Some("in.txt"));
        assert_eq!(redirections.stdout.as_deref(), Some("out.txt"));
        assert_eq!(redirections.stderr.as_deref(), Some("err.txt"));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_both_operator_sets_stdout_and_stderr() {
        let (args, redirections) = extract(tokens("make &> build.log")).unwrap();
        assert_eq!(args, vec!["make"]);
        assert_eq!(redirections.stdout.as_deref(), Some("build.log"));
        assert_eq!(redirections.stderr.as_deref(), Some("build.log"));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_later_operator_wins() {
        let (_, redirections) = extract(tokens("ls > a.txt > b.txt")).unwrap();
        assert_eq!(redirections.stdout.as_deref(), Some("b.txt"));

        // &> 在 2> 之后，stderr 也被它覆盖
        let (_, redirections) = extract(tokens("ls 2> err.txt &> all.txt")).unwrap();
        assert_eq!(redirections.stdout.as_deref(), Some("all.txt"));
        assert_eq!(redirections.stderr.as_deref(), Some("all.txt"));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_cleaned_args_preserve_order() {
        let (args, _) = extract(tokens("cc -o a.out > log main.c")).unwrap();
        assert_eq!(args, vec!["cc", "-o", "a.out", "main.c"]);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_trailing_operator_is_an_error() {
        let err = extract(tokens("ls >")).unwrap_err();
        assert_eq!(err, ParseError::MissingRedirectionTarget(">".to_string()));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_adjacent_operators_are_an_error() {
        let err = extract(tokens("ls > < file")).unwrap_err();
        assert_eq!(err, ParseError::MissingRedirectionTarget(">".to_string()));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_args_must_not_end_up_empty() {
        let err = extract(tokens("> file")).unwrap_err();
        assert_eq!(err, ParseError::EmptyCommand);
    }
}
