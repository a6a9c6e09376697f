//! 规则存储
//!
//! 规则以嵌套 JSON 文档形式保存（`rule_string`、`ast`、`created_at`），
//! 读取时再还原为语法树。`RuleRepository` 是存储抽象，默认实现为基于
//! DashMap 的内存存储。

use crate::error::{Result, RuleError};
use crate::models::Rule;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 规则仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    async fn save(&self, rule: &Rule) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Rule>>;
    async fn list(&self) -> Result<Vec<Rule>>;
    /// 返回规则是否存在
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// 内存规则存储
#[derive(Clone, Default)]
pub struct InMemoryRuleStore {
    documents: Arc<DashMap<String, serde_json::Value>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// 清空所有规则
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let count = self.documents.len();
        self.documents.clear();
        info!("已清空 {} 条规则", count);
    }

    fn decode(id: &str, document: serde_json::Value) -> Result<Rule> {
        serde_json::from_value(document).map_err(|e| {
            warn!(rule_id = %id, error = %e, "规则文档无法还原");
            RuleError::InvalidDocument(format!("{}: {}", id, e))
        })
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleStore {
    #[instrument(skip(self, rule), fields(rule_id = %rule.id))]
    async fn save(&self, rule: &Rule) -> Result<()> {
        let document = serde_json::to_value(rule)?;
        self.documents.insert(rule.id.clone(), document);

        info!("规则已保存");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Rule>> {
        let document = self.documents.get(id).map(|entry| entry.value().clone());

        document.map(|doc| Self::decode(id, doc)).transpose()
    }

    async fn list(&self) -> Result<Vec<Rule>> {
        let documents: Vec<(String, serde_json::Value)> = self
            .documents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut rules = documents
            .into_iter()
            .map(|(id, doc)| Self::decode(&id, doc))
            .collect::<Result<Vec<_>>>()?;
        rules.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(rules)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool> {
        if self.documents.remove(id).is_some() {
            info!("规则已删除");
            Ok(true)
        } else {
            warn!("删除不存在的规则");
            Ok(false)
        }
    }
}
