//! 应用状态定义

use crate::compiler::RuleCompiler;
use crate::store::{InMemoryRuleStore, RuleRepository};
use parking_lot::Mutex;
use std::sync::Arc;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 规则仓储
    pub repository: Arc<dyn RuleRepository>,
    /// 规则编译器，编译版本号需要串行递增
    pub compiler: Arc<Mutex<RuleCompiler>>,
}

impl AppState {
    pub fn new(repository: Arc<dyn RuleRepository>) -> Self {
        Self {
            repository,
            compiler: Arc::new(Mutex::new(RuleCompiler::new())),
        }
    }

    /// 使用内存存储
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRuleStore::new()))
    }
}
