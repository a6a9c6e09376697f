//! 规则 API 处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rule_shared::observability::metrics;
use std::time::Instant;
use tracing::{info, warn};
use validator::Validate;

use crate::api::dto::{
    CombineRulesRequest, CombineRulesResponse, CreateRuleRequest, CreateRuleResponse,
    EvaluateRuleRequest, EvaluateRuleResponse, EvaluateStoredRuleRequest,
    EvaluateStoredRuleResponse, RuleDto, RuleListResponse,
};
use crate::api::error::{ApiError, Result};
use crate::api::state::AppState;
use crate::combiner::combine_rule_strings;
use crate::error::RuleError;
use crate::executor::{RuleExecutor, evaluate_document};

/// 创建规则
///
/// POST /create_rule
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<(StatusCode, Json<CreateRuleResponse>)> {
    req.validate()?;

    let compiled = {
        let mut compiler = state.compiler.lock();
        compiler.compile(&req.rule_string)
    };
    let compiled = match compiled {
        Ok(compiled) => {
            metrics::record_rule_compilation("success");
            compiled
        }
        Err(e) => {
            metrics::record_rule_compilation("malformed");
            warn!(rule = %req.rule_string, error = %e, "规则解析失败");
            return Err(e.into());
        }
    };

    state.repository.save(&compiled.rule).await?;

    info!(
        rule_id = %compiled.id(),
        fields = ?compiled.required_fields,
        compile_version = compiled.compile_version,
        "规则已创建"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateRuleResponse {
            message: "Rule created".to_string(),
            id: compiled.rule.id.clone(),
            ast: compiled.rule.ast,
        }),
    ))
}

/// 合并规则
///
/// POST /combine_rules
pub async fn combine_rules(Json(req): Json<CombineRulesRequest>) -> Result<Json<CombineRulesResponse>> {
    let ast = combine_rule_strings(&req.rules)?;

    info!(rules = req.rules.len(), empty = ast.is_none(), "规则已合并");

    Ok(Json(CombineRulesResponse {
        message: "Combined rules".to_string(),
        ast,
    }))
}

/// 评估规则
///
/// POST /evaluate_rule
pub async fn evaluate_rule(Json(req): Json<EvaluateRuleRequest>) -> Json<EvaluateRuleResponse> {
    let start = Instant::now();

    // 缺省或 null 的 AST 为空规则；其余按文档逐节点求值
    let result = req
        .ast
        .as_ref()
        .is_none_or(|doc| evaluate_document(doc, &req.data));

    metrics::record_rule_evaluation("inline", result, start.elapsed().as_secs_f64());

    Json(EvaluateRuleResponse { result })
}

/// 列出已保存的规则
///
/// GET /rules
pub async fn list_rules(State(state): State<AppState>) -> Result<Json<RuleListResponse>> {
    let rules: Vec<RuleDto> = state
        .repository
        .list()
        .await?
        .into_iter()
        .map(RuleDto::from)
        .collect();
    let total = rules.len();

    Ok(Json(RuleListResponse { rules, total }))
}

/// 获取规则详情
///
/// GET /rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RuleDto>> {
    let rule = state
        .repository
        .get(&id)
        .await?
        .ok_or(RuleError::RuleNotFound(id))?;

    Ok(Json(rule.into()))
}

/// 删除规则
///
/// DELETE /rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if state.repository.delete(&id).await? {
        info!(rule_id = %id, "规则已删除");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::RuleNotFound(id))
    }
}

/// 使用已保存的规则评估数据
///
/// POST /rules/{id}/evaluate
pub async fn evaluate_stored_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EvaluateStoredRuleRequest>,
) -> Result<Json<EvaluateStoredRuleResponse>> {
    let rule = state
        .repository
        .get(&id)
        .await?
        .ok_or_else(|| RuleError::RuleNotFound(id.clone()))?;

    let executor = if req.trace {
        RuleExecutor::new().with_trace()
    } else {
        RuleExecutor::new()
    };
    let evaluation = executor.execute(Some(&rule.ast), &req.data);

    metrics::record_rule_evaluation(
        "stored",
        evaluation.matched,
        evaluation.evaluation_time_ms as f64 / 1000.0,
    );

    Ok(Json(EvaluateStoredRuleResponse {
        rule_id: rule.id,
        evaluation,
    }))
}

/// 健康检查
///
/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
