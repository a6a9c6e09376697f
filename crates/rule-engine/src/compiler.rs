//! 规则编译器
//!
//! 将规则文本编译为可保存的规则实体，并预提取规则引用的字段。

use crate::error::Result;
use crate::lexer::tokenize;
use crate::models::{AstNode, Rule};
use crate::parser::parse;
use std::collections::BTreeSet;
use tracing::debug;

/// 编译后的规则
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: Rule,
    /// 规则中引用的全部字段
    pub required_fields: BTreeSet<String>,
    /// 编译版本号
    pub compile_version: u64,
}

impl CompiledRule {
    pub fn id(&self) -> &str {
        &self.rule.id
    }

    pub fn ast(&self) -> &AstNode {
        &self.rule.ast
    }
}

/// 规则编译器
pub struct RuleCompiler {
    compile_version: u64,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self { compile_version: 0 }
    }

    /// 编译规则文本
    pub fn compile(&mut self, rule_string: &str) -> Result<CompiledRule> {
        let tokens = tokenize(rule_string);
        let ast = parse(&tokens)?;

        debug!(tokens = tokens.len(), "规则文本解析完成");

        self.compile_ast(Rule::new(rule_string, ast))
    }

    /// 重新编译已有规则（如从存储中加载）
    pub fn compile_ast(&mut self, rule: Rule) -> Result<CompiledRule> {
        let required_fields = Self::extract_fields(&rule.ast);

        self.compile_version += 1;

        Ok(CompiledRule {
            rule,
            required_fields,
            compile_version: self.compile_version,
        })
    }

    fn extract_fields(ast: &AstNode) -> BTreeSet<String> {
        ast.operands()
            .into_iter()
            .map(|operand| operand.field.clone())
            .collect()
    }
}

impl Default for RuleCompiler {
    fn default() -> Self {
        Self::new()
    }
}
