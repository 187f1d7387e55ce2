//! 组件存储抽象接口
//!
//! 注入器解析依赖时面向的容器契约。容器本身的实现
//! （注册表、行为包装、缓存）不属于注入核心。

use crate::key::ComponentKey;
use injector_common::{Binding, ComponentInstance, InjectionResult, TypeInfo};

/// 注入目标
///
/// 描述发起解析的位置（被注入的类型），用于容器侧的定向解析。
#[derive(Debug, Clone, Default)]
pub struct InjectionTarget {
    /// 请求方类型信息
    pub type_info: Option<TypeInfo>,
}

impl InjectionTarget {
    /// 无目标信息
    pub fn none() -> Self {
        Self::default()
    }

    /// 以类型 `T` 为目标
    pub fn of<T: 'static>() -> Self {
        Self {
            type_info: Some(TypeInfo::of::<T>()),
        }
    }

    /// 以给定类型信息为目标
    pub fn for_type(type_info: TypeInfo) -> Self {
        Self {
            type_info: Some(type_info),
        }
    }
}

/// 组件存储 trait
///
/// 注入器通过它解析依赖；实现方负责自身的并发纪律。
pub trait ComponentStore: Send + Sync {
    /// 按键获取组件实例
    ///
    /// 返回 `Ok(None)` 表示该键被注册为显式空值；
    /// 未注册的键返回携带键信息的错误由实现方决定（通常为 `Ok(None)` 之外的未命中语义，
    /// 本核心只在候选键存在的前提下按键取值）。
    fn get_component_into(
        &self,
        key: &ComponentKey,
        into: &InjectionTarget,
    ) -> InjectionResult<Option<ComponentInstance>>;

    /// 列出匹配给定类型和绑定限定符的候选键
    ///
    /// 返回顺序必须确定（同一存储状态下多次调用顺序一致）。
    fn candidate_keys(&self, expected: &TypeInfo, binding: Option<&Binding>) -> Vec<ComponentKey>;

    /// 按名称获取组件实例
    fn get_by_name(
        &self,
        name: &str,
        into: &InjectionTarget,
    ) -> InjectionResult<Option<ComponentInstance>>;
}
