//! 规则操作符定义
//!
//! 比较操作符和逻辑操作符都以原始文本形式持久化。无法识别的文本保留在
//! `Unknown` 中，求值时按 false 处理，而不是在反序列化阶段报错。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 条件比较操作符
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Comparator {
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    Neq,
    /// 词法上合法但求值器不支持的操作符（如 `==`、`=>`）
    Unknown(String),
}

impl Comparator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Unknown(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for Comparator {
    fn from(s: &str) -> Self {
        match s {
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Lte,
            ">=" => Self::Gte,
            "=" => Self::Eq,
            "!=" => Self::Neq,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Comparator {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Comparator> for String {
    fn from(c: Comparator) -> Self {
        match c {
            Comparator::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 逻辑操作符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicalOperator {
    And,
    Or,
    Unknown(String),
}

impl LogicalOperator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for LogicalOperator {
    fn from(s: String) -> Self {
        match s.as_str() {
            "AND" => Self::And,
            "OR" => Self::Or,
            _ => Self::Unknown(s),
        }
    }
}

impl From<LogicalOperator> for String {
    fn from(op: LogicalOperator) -> Self {
        match op {
            LogicalOperator::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
