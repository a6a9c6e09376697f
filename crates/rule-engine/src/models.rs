//! 规则引擎领域模型
//!
//! AST 的持久化形态是嵌套文档：
//!
//! ```json
//! {"type": "operator", "left": {...}, "right": {...}, "value": "AND"}
//! {"type": "operand", "left": null, "right": null,
//!  "value": {"condition": "age", "operator": ">", "value": 30}}
//! ```

use crate::error::{Result, RuleError};
use crate::operators::{Comparator, LogicalOperator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// 条件字面量 / 记录字段值
///
/// 规则文本只会产生 `Number` 和 `Text`；记录中的布尔值和 null 也按 JSON 标量接收。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

/// 2^53，超出后 f64 无法精确表示整数
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            // 整数值按 JSON 整数输出，与规则文本中的写法保持一致
            Self::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null => serializer.serialize_unit(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "'{}'", s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// AST 节点（逻辑操作符或条件操作数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AstNode {
    Operator(OperatorNode),
    Operand(OperandNode),
}

/// 逻辑操作符节点，独占左右两棵子树
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorNode {
    pub left: Box<AstNode>,
    pub right: Box<AstNode>,
    #[serde(rename = "value")]
    pub op: LogicalOperator,
}

/// 条件节点：`field comparator literal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "OperandDocument", into = "OperandDocument")]
pub struct OperandNode {
    pub field: String,
    pub comparator: Comparator,
    pub literal: Value,
}

/// 条件节点的文档形态，左右子节点恒为 null
#[derive(Serialize, Deserialize)]
struct OperandDocument {
    #[serde(default)]
    left: Option<serde_json::Value>,
    #[serde(default)]
    right: Option<serde_json::Value>,
    value: ConditionDocument,
}

#[derive(Serialize, Deserialize)]
struct ConditionDocument {
    condition: String,
    operator: Comparator,
    value: Value,
}

impl From<OperandDocument> for OperandNode {
    fn from(doc: OperandDocument) -> Self {
        Self {
            field: doc.value.condition,
            comparator: doc.value.operator,
            literal: doc.value.value,
        }
    }
}

impl From<OperandNode> for OperandDocument {
    fn from(node: OperandNode) -> Self {
        Self {
            left: None,
            right: None,
            value: ConditionDocument {
                condition: node.field,
                operator: node.comparator,
                value: node.literal,
            },
        }
    }
}

impl AstNode {
    pub fn operator(op: LogicalOperator, left: AstNode, right: AstNode) -> Self {
        Self::Operator(OperatorNode {
            left: Box::new(left),
            right: Box::new(right),
            op,
        })
    }

    pub fn and(left: AstNode, right: AstNode) -> Self {
        Self::operator(LogicalOperator::And, left, right)
    }

    pub fn or(left: AstNode, right: AstNode) -> Self {
        Self::operator(LogicalOperator::Or, left, right)
    }

    pub fn operand(
        field: impl Into<String>,
        comparator: Comparator,
        literal: impl Into<Value>,
    ) -> Self {
        Self::Operand(OperandNode {
            field: field.into(),
            comparator,
            literal: literal.into(),
        })
    }

    /// 转换为持久化文档
    pub fn to_document(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// 从持久化文档还原
    pub fn from_document(doc: &serde_json::Value) -> Result<Self> {
        Self::deserialize(doc).map_err(|e| RuleError::InvalidDocument(e.to_string()))
    }

    /// 按先序遍历收集所有条件节点
    pub fn operands(&self) -> Vec<&OperandNode> {
        let mut out = Vec::new();
        self.collect_operands(&mut out);
        out
    }

    fn collect_operands<'a>(&'a self, out: &mut Vec<&'a OperandNode>) {
        match self {
            Self::Operand(operand) => out.push(operand),
            Self::Operator(node) => {
                node.left.collect_operands(out);
                node.right.collect_operands(out);
            }
        }
    }
}

/// 评估记录：扁平的 字段 -> 值 映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象创建
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// 获取字段值，不支持点号路径
    pub fn get_field(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 已保存的规则
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub rule_string: String,
    pub ast: AstNode,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(rule_string: impl Into<String>, ast: AstNode) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            rule_string: rule_string.into(),
            ast,
            created_at: Utc::now(),
        }
    }
}

/// 评估结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationResult {
    pub matched: bool,
    pub matched_conditions: Vec<String>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_ms: i64,
}
