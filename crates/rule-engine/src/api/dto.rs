//! 请求/响应 DTO 定义

use crate::models::{AstNode, EvaluationResult, Record, Rule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// 请求 DTO
// ============================================================================

/// 创建规则请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRuleRequest {
    #[validate(length(min = 1, message = "规则内容不能为空"))]
    pub rule_string: String,
}

/// 合并规则请求
#[derive(Debug, Deserialize)]
pub struct CombineRulesRequest {
    pub rules: Vec<String>,
}

/// 评估请求
///
/// `ast` 保持原始文档形态，求值时逐节点容错
#[derive(Debug, Deserialize)]
pub struct EvaluateRuleRequest {
    #[serde(default)]
    pub ast: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Record,
}

/// 评估已保存规则的请求
#[derive(Debug, Default, Deserialize)]
pub struct EvaluateStoredRuleRequest {
    #[serde(default)]
    pub data: Record,
    /// 是否返回评估追踪
    #[serde(default)]
    pub trace: bool,
}

// ============================================================================
// 响应 DTO
// ============================================================================

/// 创建规则响应
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRuleResponse {
    pub message: String,
    pub id: String,
    pub ast: AstNode,
}

/// 合并规则响应，`ast` 为 null 表示空规则
#[derive(Debug, Serialize, Deserialize)]
pub struct CombineRulesResponse {
    pub message: String,
    pub ast: Option<AstNode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateRuleResponse {
    pub result: bool,
}

/// 已保存规则
#[derive(Debug, Serialize, Deserialize)]
pub struct RuleDto {
    pub id: String,
    pub rule_string: String,
    pub ast: AstNode,
    pub created_at: DateTime<Utc>,
}

impl From<Rule> for RuleDto {
    fn from(rule: Rule) -> Self {
        Self {
            id: rule.id,
            rule_string: rule.rule_string,
            ast: rule.ast,
            created_at: rule.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleListResponse {
    pub rules: Vec<RuleDto>,
    pub total: usize,
}

/// 已保存规则的评估结果
#[derive(Debug, Serialize)]
pub struct EvaluateStoredRuleResponse {
    pub rule_id: String,
    #[serde(flatten)]
    pub evaluation: EvaluationResult,
}
