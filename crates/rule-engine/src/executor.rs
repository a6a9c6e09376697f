//! 规则执行器
//!
//! 递归遍历 AST。逻辑节点总是先完整评估左右子树再组合结果（不短路），
//! 因此评估追踪中会出现每一个条件节点。

use crate::evaluator::ConditionEvaluator;
use crate::models::{AstNode, EvaluationResult, OperandNode, OperatorNode, Record, Value};
use crate::operators::{Comparator, LogicalOperator};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Instant;
use tracing::debug;

/// 规则执行器
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 执行规则评估，`None` 表示空规则，恒为真
    pub fn execute(&self, ast: Option<&AstNode>, record: &Record) -> EvaluationResult {
        let start = Instant::now();
        let mut result = EvaluationResult::default();

        result.matched = match ast {
            Some(node) => self.evaluate_node(node, record, &mut result, "root"),
            None => {
                if self.trace_enabled {
                    result.evaluation_trace.push("root: 空规则 => MATCHED".to_string());
                }
                true
            }
        };
        result.evaluation_time_ms = start.elapsed().as_millis() as i64;

        result
    }

    /// 仅返回匹配结果
    pub fn evaluate(&self, ast: Option<&AstNode>, record: &Record) -> bool {
        match ast {
            Some(node) => self.evaluate_node(node, record, &mut EvaluationResult::default(), "root"),
            None => true,
        }
    }

    fn evaluate_node(
        &self,
        node: &AstNode,
        record: &Record,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        match node {
            AstNode::Operand(operand) => self.evaluate_operand(operand, record, result, path),
            AstNode::Operator(operator) => self.evaluate_operator(operator, record, result, path),
        }
    }

    fn evaluate_operand(
        &self,
        operand: &OperandNode,
        record: &Record,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        let field_value = record.get_field(&operand.field);
        let matched =
            ConditionEvaluator::evaluate(field_value, &operand.comparator, &operand.literal);

        let description = format!(
            "{} {} {}",
            operand.field, operand.comparator, operand.literal
        );

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: {} => {}",
                path,
                description,
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            ));
        }

        if matched {
            result.matched_conditions.push(format!("{}: {}", path, description));
        }

        matched
    }

    /// 评估逻辑节点（左右子树都会被评估）
    fn evaluate_operator(
        &self,
        operator: &OperatorNode,
        record: &Record,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        let left = self.evaluate_node(&operator.left, record, result, &format!("{}.left", path));
        let right = self.evaluate_node(&operator.right, record, result, &format!("{}.right", path));

        let matched = match &operator.op {
            LogicalOperator::And => left && right,
            LogicalOperator::Or => left || right,
            LogicalOperator::Unknown(op) => {
                debug!(operator = %op, path, "不支持的逻辑操作符，节点视为不满足");
                false
            }
        };

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: {} ({}, {}) => {}",
                path,
                operator.op,
                left,
                right,
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            ));
        }

        matched
    }
}

/// 评估规则，永不失败
pub fn evaluate_rule(ast: Option<&AstNode>, record: &Record) -> bool {
    RuleExecutor::new().evaluate(ast, record)
}

/// 直接在 AST 文档上求值
///
/// 逐节点容错：null 子树为真，缺失的子树或无法识别的节点只让该节点为假，
/// 不影响其兄弟节点。
pub fn evaluate_document(doc: &JsonValue, record: &Record) -> bool {
    if doc.is_null() {
        return true;
    }

    match doc.get("type").and_then(JsonValue::as_str) {
        Some("operator") => evaluate_operator_document(doc, record),
        Some("operand") => evaluate_operand_document(doc, record),
        other => {
            debug!(node_type = ?other, "无法识别的 AST 节点，视为不满足");
            false
        }
    }
}

fn evaluate_child_document(child: Option<&JsonValue>, record: &Record) -> bool {
    child.is_some_and(|child| evaluate_document(child, record))
}

fn evaluate_operator_document(doc: &JsonValue, record: &Record) -> bool {
    let left = evaluate_child_document(doc.get("left"), record);
    let right = evaluate_child_document(doc.get("right"), record);

    let op = doc
        .get("value")
        .and_then(JsonValue::as_str)
        .map(|op| LogicalOperator::from(op.to_string()));

    match op {
        Some(LogicalOperator::And) => left && right,
        Some(LogicalOperator::Or) => left || right,
        _ => false,
    }
}

fn evaluate_operand_document(doc: &JsonValue, record: &Record) -> bool {
    let Some(condition) = doc.get("value") else {
        return false;
    };

    let field = condition.get("condition").and_then(JsonValue::as_str);
    let comparator = condition.get("operator").and_then(JsonValue::as_str);
    let literal = condition
        .get("value")
        .and_then(|literal| Value::deserialize(literal).ok());

    match (field, comparator, literal) {
        (Some(field), Some(comparator), Some(literal)) => ConditionEvaluator::evaluate(
            record.get_field(field),
            &Comparator::from(comparator),
            &literal,
        ),
        _ => {
            debug!("条件节点缺少字段、操作符或比较值，视为不满足");
            false
        }
    }
}
