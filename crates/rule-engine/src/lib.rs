//! 文本规则引擎
//!
//! 将 `age > 30 AND department = 'Sales'` 这类规则文本编译为二叉语法树，
//! 支持：
//! - 规则文本词法分析与递归下降解析
//! - 多条规则合并为 AND 根节点
//! - 基于宽松比较语义的非短路求值
//! - 规则存储与 HTTP 接口

pub mod api;
pub mod combiner;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod models;
pub mod operators;
pub mod parser;
pub mod store;

pub use combiner::combine_rule_strings;
pub use compiler::{CompiledRule, RuleCompiler};
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use executor::{RuleExecutor, evaluate_document, evaluate_rule};
pub use lexer::{Token, tokenize};
pub use models::{AstNode, EvaluationResult, OperandNode, OperatorNode, Record, Rule, Value};
pub use operators::{Comparator, LogicalOperator};
pub use parser::{MAX_RULE_DEPTH, Parser, parse, parse_rule_to_ast};
pub use store::{InMemoryRuleStore, RuleRepository};
