//! 规则合并
//!
//! 将多条规则文本合并为一棵以 AND 为根的树。根节点只有两个槽位：第一条规则
//! 占左子树，最后一条规则占右子树，中间的规则会被解析但不会出现在结果中。

use crate::error::Result;
use crate::models::AstNode;
use crate::parser::parse_rule_to_ast;
use tracing::{debug, warn};

/// 合并多条规则
///
/// - 空字符串直接跳过
/// - 没有任何非空规则时返回 `None`（空规则，恒为真）
/// - 只有一条规则时直接返回该规则的语法树
/// - 任意一条规则格式错误都会导致整体失败
pub fn combine_rule_strings<S: AsRef<str>>(rules: &[S]) -> Result<Option<AstNode>> {
    let mut left: Option<AstNode> = None;
    let mut right: Option<AstNode> = None;
    let mut parsed = 0usize;

    for rule in rules.iter().map(AsRef::as_ref) {
        if rule.is_empty() {
            continue;
        }

        let ast = parse_rule_to_ast(rule)?;
        parsed += 1;

        if left.is_none() {
            left = Some(ast);
        } else {
            right = Some(ast);
        }
    }

    if parsed > 2 {
        warn!(
            parsed,
            discarded = parsed - 2,
            "合并超过两条规则，仅保留第一条和最后一条"
        );
    }
    debug!(parsed, "规则合并完成");

    Ok(match right {
        Some(right) => left.map(|left| AstNode::and(left, right)),
        None => left,
    })
}
