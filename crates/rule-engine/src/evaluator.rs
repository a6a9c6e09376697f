//! 条件评估器
//!
//! 比较语义沿用脚本语言的宽松规则：
//! - `=` / `!=` 使用宽松相等，数字与字符串比较时先把字符串转换为数字
//! - `<` `>` `<=` `>=` 两侧都是字符串时按 UTF-16 码元逐位比较，否则按数字比较
//! - 字段不存在时只有 `!=` 为真（与 null 宽松相等）
//! - 布尔值先转为 1/0 再比较；null 只与 null 相等，排序比较时视为 0
//! - NaN 参与的任何比较都为假（`!=` 为真）

use crate::models::Value;
use crate::operators::Comparator;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;
use tracing::debug;

static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("decimal pattern is valid")
});

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估条件
    ///
    /// # Arguments
    /// * `field_value` - 从记录中获取的字段值，字段不存在时为 `None`
    /// * `comparator` - 比较操作符
    /// * `expected` - 规则中定义的字面量
    pub fn evaluate(field_value: Option<&Value>, comparator: &Comparator, expected: &Value) -> bool {
        match comparator {
            Comparator::Eq => Self::loose_eq(field_value, expected),
            Comparator::Neq => !Self::loose_eq(field_value, expected),
            Comparator::Lt => Self::compare(field_value, expected) == Some(Ordering::Less),
            Comparator::Gt => Self::compare(field_value, expected) == Some(Ordering::Greater),
            Comparator::Lte => matches!(
                Self::compare(field_value, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Comparator::Gte => matches!(
                Self::compare(field_value, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Comparator::Unknown(op) => {
                debug!(operator = %op, "不支持的比较操作符，条件视为不满足");
                false
            }
        }
    }

    /// 宽松相等
    fn loose_eq(field: Option<&Value>, expected: &Value) -> bool {
        let Some(field) = field else {
            return matches!(expected, Value::Null);
        };

        Self::loose_eq_values(field, expected)
    }

    fn loose_eq_values(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bool(b), other) | (other, Value::Bool(b)) => {
                Self::loose_eq_values(&Value::Number(bool_to_number(*b)), other)
            }
            (Value::Number(n), Value::Text(s)) | (Value::Text(s), Value::Number(n)) => {
                to_number(s) == *n
            }
        }
    }

    /// 宽松排序比较，无法比较时返回 `None`
    fn compare(field: Option<&Value>, expected: &Value) -> Option<Ordering> {
        let field = field?;

        match (field, expected) {
            (Value::Text(a), Value::Text(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
            _ => Self::as_f64(field).partial_cmp(&Self::as_f64(expected)),
        }
    }

    fn as_f64(value: &Value) -> f64 {
        match value {
            Value::Number(n) => *n,
            Value::Text(s) => to_number(s),
            Value::Bool(b) => bool_to_number(*b),
            Value::Null => 0.0,
        }
    }
}

fn bool_to_number(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// 字符串转数字（脚本语言语义）
///
/// 首尾空白被忽略，空串为 0，支持十进制/指数、`0x`/`0o`/`0b` 前缀和
/// `Infinity`，其余一律为 NaN。
pub fn to_number(s: &str) -> f64 {
    let s = s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');

    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&s[2..], radix);
    }

    if DECIMAL_PATTERN.is_match(s) {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }

    digits
        .chars()
        .try_fold(0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN)
}
