//! 递归下降解析器
//!
//! 语法（AND 与 OR 同一优先级，左结合）：
//!
//! ```text
//! Expression := Term ((AND | OR) Term)*
//! Term       := '(' Expression ')' | Condition
//! Condition  := Identifier Comparator (StringLiteral | NumberLiteral)
//! ```
//!
//! 语法树深度（单个条件为 1）和括号嵌套层数都不超过 [`MAX_RULE_DEPTH`]，
//! 超出时视为格式错误。

use crate::error::{Result, RuleError};
use crate::lexer::{Token, tokenize};
use crate::models::{AstNode, OperandNode, Value};
use crate::operators::LogicalOperator;

/// 语法树允许的最大深度
pub const MAX_RULE_DEPTH: usize = 50;

/// 基于下标游标的解析器，不修改输入的 token 序列
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// 当前括号嵌套层数
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            nesting: 0,
        }
    }

    /// 解析完整规则，表达式之后不允许残留 token
    pub fn parse(mut self) -> Result<AstNode> {
        let (ast, _) = self.parse_expression()?;

        if let Some(token) = self.peek() {
            return Err(RuleError::malformed(format!(
                "位置 {} 存在多余的 {}",
                self.pos,
                token.describe()
            )));
        }

        Ok(ast)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// 返回子树及其深度
    fn parse_expression(&mut self) -> Result<(AstNode, usize)> {
        let (mut left, mut depth) = self.parse_term()?;

        loop {
            let op = match self.peek() {
                Some(Token::And) => LogicalOperator::And,
                Some(Token::Or) => LogicalOperator::Or,
                _ => break,
            };
            self.pos += 1;

            let (right, right_depth) = self.parse_term()?;
            depth = depth.max(right_depth) + 1;
            if depth > MAX_RULE_DEPTH {
                return Err(RuleError::malformed(format!(
                    "规则嵌套过深，语法树深度不能超过 {}",
                    MAX_RULE_DEPTH
                )));
            }
            left = AstNode::operator(op, left, right);
        }

        Ok((left, depth))
    }

    fn parse_term(&mut self) -> Result<(AstNode, usize)> {
        match self.next() {
            Some(Token::LeftParen) => {
                self.nesting += 1;
                if self.nesting > MAX_RULE_DEPTH {
                    return Err(RuleError::malformed(format!(
                        "括号嵌套不能超过 {} 层",
                        MAX_RULE_DEPTH
                    )));
                }
                let inner = self.parse_expression()?;
                self.nesting -= 1;
                // 闭合位置的 token 直接跳过，不校验是否为 ')'
                self.next();
                Ok(inner)
            }
            Some(Token::Identifier(field)) => Ok((self.parse_condition(field)?, 1)),
            Some(other) => Err(RuleError::malformed(format!(
                "位置 {} 期望条件或 '('，实际为 {}",
                self.pos - 1,
                other.describe()
            ))),
            None => Err(RuleError::malformed("规则意外结束，缺少条件")),
        }
    }

    fn parse_condition(&mut self, field: &str) -> Result<AstNode> {
        let comparator = match self.next() {
            Some(Token::Comparator(c)) => c.clone(),
            Some(other) => {
                return Err(RuleError::malformed(format!(
                    "字段 '{}' 之后期望比较操作符，实际为 {}",
                    field,
                    other.describe()
                )));
            }
            None => {
                return Err(RuleError::malformed(format!(
                    "字段 '{}' 之后缺少比较操作符",
                    field
                )));
            }
        };

        let literal = match self.next() {
            Some(Token::StringLiteral(raw)) => Value::Text(strip_quotes(raw).to_string()),
            Some(Token::NumberLiteral(n)) if n.is_finite() => Value::Number(*n),
            Some(Token::NumberLiteral(_)) => {
                return Err(RuleError::malformed(format!(
                    "条件 '{} {}' 的数字超出可表示范围",
                    field, comparator
                )));
            }
            Some(other) => {
                return Err(RuleError::malformed(format!(
                    "条件 '{} {}' 期望字符串或数字，实际为 {}",
                    field,
                    comparator,
                    other.describe()
                )));
            }
            None => {
                return Err(RuleError::malformed(format!(
                    "条件 '{} {}' 缺少比较值",
                    field, comparator
                )));
            }
        };

        Ok(AstNode::Operand(OperandNode {
            field: field.to_string(),
            comparator,
            literal,
        }))
    }
}

fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw)
}

/// 解析 token 序列
pub fn parse(tokens: &[Token]) -> Result<AstNode> {
    Parser::new(tokens).parse()
}

/// 将规则文本编译为 AST
pub fn parse_rule_to_ast(rule: &str) -> Result<AstNode> {
    let tokens = tokenize(rule);
    parse(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Comparator;

    #[test]
    fn test_parse_single_condition() {
        let ast = parse_rule_to_ast("age > 30").unwrap();
        assert_eq!(ast, AstNode::operand("age", Comparator::Gt, 30));
    }

    #[test]
    fn test_parse_string_literal_strips_quotes() {
        let ast = parse_rule_to_ast("department = 'Sales'").unwrap();
        assert_eq!(ast, AstNode::operand("department", Comparator::Eq, "Sales"));
    }

    #[test]
    fn test_and_or_same_precedence_left_assoc() {
        // a OR b AND c => (a OR b) AND c
        let ast = parse_rule_to_ast("a = 1 OR b = 2 AND c = 3").unwrap();
        let expected = AstNode::and(
            AstNode::or(
                AstNode::operand("a", Comparator::Eq, 1),
                AstNode::operand("b", Comparator::Eq, 2),
            ),
            AstNode::operand("c", Comparator::Eq, 3),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_parenthesized_expression() {
        let ast = parse_rule_to_ast("(age > 30 OR age < 10) AND gender = 'Male'").unwrap();
        let expected = AstNode::and(
            AstNode::or(
                AstNode::operand("age", Comparator::Gt, 30),
                AstNode::operand("age", Comparator::Lt, 10),
            ),
            AstNode::operand("gender", Comparator::Eq, "Male"),
        );
        assert_eq!(ast, expected);
    }

    #[test]
    fn test_missing_close_paren_is_tolerated() {
        let ast = parse_rule_to_ast("(age > 30 AND salary < 100").unwrap();
        assert_eq!(
            ast,
            AstNode::and(
                AstNode::operand("age", Comparator::Gt, 30),
                AstNode::operand("salary", Comparator::Lt, 100),
            )
        );
    }

    #[test]
    fn test_close_slot_consumes_any_token() {
        let ast = parse_rule_to_ast("(a = 1 ( AND c = 2").unwrap();
        assert_eq!(
            ast,
            AstNode::and(
                AstNode::operand("a", Comparator::Eq, 1),
                AstNode::operand("c", Comparator::Eq, 2),
            )
        );

        let result = parse_rule_to_ast("(a = 1) b = 2");
        assert!(matches!(result, Err(RuleError::MalformedRule(_))));
    }

    #[test]
    fn test_unknown_comparator_is_kept() {
        let ast = parse_rule_to_ast("age == 30").unwrap();
        assert_eq!(
            ast,
            AstNode::operand("age", Comparator::Unknown("==".to_string()), 30)
        );
    }

    #[test]
    fn test_malformed_rules() {
        let cases = [
            "",
            "   ",
            "age",
            "age >",
            "age > 30 AND",
            "age 30",
            "age > other_field",
            "> 30",
            "AND age > 1",
            "age > 30)",
            "age > 30 salary < 2",
            "()",
        ];

        for rule in cases {
            let result = parse_rule_to_ast(rule);
            assert!(
                matches!(result, Err(RuleError::MalformedRule(_))),
                "rule {:?} should be malformed, got {:?}",
                rule,
                result
            );
        }
    }

    /// n 个条件以 AND 串联
    fn chain(n: usize) -> String {
        (0..n)
            .map(|i| format!("f{} > {}", i, i))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    #[test]
    fn test_chain_at_depth_limit_roundtrips() {
        let ast = parse_rule_to_ast(&chain(MAX_RULE_DEPTH)).unwrap();
        assert_eq!(ast.operands().len(), MAX_RULE_DEPTH);

        let text = serde_json::to_string(&ast).unwrap();
        let restored: AstNode = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, ast);
    }

    #[test]
    fn test_chain_beyond_depth_limit_is_malformed() {
        for n in [MAX_RULE_DEPTH + 1, 130, 20_000] {
            let result = parse_rule_to_ast(&chain(n));
            assert!(
                matches!(result, Err(RuleError::MalformedRule(_))),
                "chain of {} conditions should be rejected",
                n
            );
        }
    }

    #[test]
    fn test_deep_parentheses_are_malformed() {
        let deep = format!("{}a = 1{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(
            parse_rule_to_ast(&deep),
            Err(RuleError::MalformedRule(_))
        ));

        let ok = format!(
            "{}a = 1{}",
            "(".repeat(MAX_RULE_DEPTH),
            ")".repeat(MAX_RULE_DEPTH)
        );
        assert_eq!(
            parse_rule_to_ast(&ok).unwrap(),
            AstNode::operand("a", Comparator::Eq, 1)
        );
    }

    #[test]
    fn test_non_finite_number_is_malformed() {
        let rule = format!("x > {}", "9".repeat(400));
        assert!(matches!(
            parse_rule_to_ast(&rule),
            Err(RuleError::MalformedRule(_))
        ));
    }

    #[test]
    fn test_parse_does_not_consume_input() {
        let tokens = tokenize("x = 1");
        let first = parse(&tokens).unwrap();
        let second = parse(&tokens).unwrap();
        assert_eq!(first, second);
        assert_eq!(tokens.len(), 3);
    }
}
