//! 规则文本词法分析
//!
//! 在每个扫描位置按优先级依次尝试：比较操作符、AND/OR 关键字、括号、
//! 标识符、单引号字符串、十进制整数。空白和无法识别的片段直接丢弃。

use crate::operators::Comparator;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// 关键字在标识符之前匹配且不要求单词边界，`ORDER` 会被切分为 `OR` + `DER`
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<cmp>=>|<=|>=|==|!=|<|>|=)|(?P<kw>AND|OR)|(?P<lparen>\()|(?P<rparen>\))|(?P<ident>[a-zA-Z_][a-zA-Z0-9_]*)|(?P<string>'[^'\n]*')|(?P<number>[0-9]+)",
    )
    .expect("token pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftParen,
    RightParen,
    And,
    Or,
    Comparator(Comparator),
    Identifier(String),
    /// 保留两侧单引号，由解析器在消费时去除
    StringLiteral(String),
    NumberLiteral(f64),
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Self::LeftParen => "'('".to_string(),
            Self::RightParen => "')'".to_string(),
            Self::And => "AND".to_string(),
            Self::Or => "OR".to_string(),
            Self::Comparator(c) => format!("操作符 {}", c),
            Self::Identifier(s) => format!("标识符 {}", s),
            Self::StringLiteral(s) => format!("字符串 {}", s),
            Self::NumberLiteral(n) => format!("数字 {}", n),
        }
    }
}

/// 将规则文本切分为词法单元
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for caps in TOKEN_PATTERN.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        log_dropped(&input[last_end..whole.start()]);
        last_end = whole.end();

        let token = if let Some(m) = caps.name("cmp") {
            Token::Comparator(Comparator::from(m.as_str()))
        } else if let Some(m) = caps.name("kw") {
            if m.as_str() == "AND" { Token::And } else { Token::Or }
        } else if caps.name("lparen").is_some() {
            Token::LeftParen
        } else if caps.name("rparen").is_some() {
            Token::RightParen
        } else if let Some(m) = caps.name("ident") {
            Token::Identifier(m.as_str().to_string())
        } else if let Some(m) = caps.name("string") {
            Token::StringLiteral(m.as_str().to_string())
        } else if let Some(m) = caps.name("number") {
            match m.as_str().parse::<f64>() {
                Ok(n) => Token::NumberLiteral(n),
                Err(_) => continue,
            }
        } else {
            continue;
        };

        tokens.push(token);
    }
    log_dropped(&input[last_end..]);

    tokens
}

fn log_dropped(fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        debug!(fragment = %fragment, "忽略无法识别的输入片段");
    }
}
