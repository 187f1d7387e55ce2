//! 注入特征配置
//!
//! 容器在创建注入器时传入的 `Properties` 风格配置表。
//! 注入器核心只读取由它派生出的布尔开关。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 是否启用按名称解析
pub const USE_NAMES: &str = "use_names";
/// 是否允许参数规格中存在未被消费的参数
pub const ALLOW_UNUSED_PARAMETERS: &str = "allow_unused_parameters";
/// 是否禁用静态注入
pub const NO_STATIC_INJECTION: &str = "no_static_injection";

/// 注入特征配置表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Characteristics {
    values: HashMap<String, serde_json::Value>,
}

impl Characteristics {
    /// 创建空配置表
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入配置项
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// 链式写入配置项
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.set(key, value);
        self
    }

    /// 读取布尔配置项
    pub fn bool_of(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => default,
        }
    }

    /// 是否启用按名称解析
    pub fn use_names(&self) -> bool {
        self.bool_of(USE_NAMES, false)
    }

    /// 是否允许未被消费的参数
    pub fn allow_unused_parameters(&self) -> bool {
        self.bool_of(ALLOW_UNUSED_PARAMETERS, false)
    }

    /// 是否禁用静态注入
    pub fn no_static_injection(&self) -> bool {
        self.bool_of(NO_STATIC_INJECTION, false)
    }
}
