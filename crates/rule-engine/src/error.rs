//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    /// 规则文本无法构造出完整的语法树
    #[error("规则格式错误: {0}")]
    MalformedRule(String),

    #[error("规则未找到: {0}")]
    RuleNotFound(String),

    /// 持久化文档不是合法的 AST 结构
    #[error("无效的 AST 文档: {0}")]
    InvalidDocument(String),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RuleError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRule(message.into())
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
