//! 组件监视器抽象接口
//!
//! 监视器观察注入过程中的关键事件（实例化、成员调用、失败），
//! 并在调用前拥有放行或覆盖的裁决权。

use crate::injector::Injector;
use injector_common::{ComponentInstance, ComponentModel, InjectionError, MemberRef};
use std::sync::Arc;
use std::time::Duration;

/// 成员调用前的裁决
pub enum InvokeDecision {
    /// 照常调用
    Proceed,
    /// 跳过调用，以给定值作为调用结果
    Override(Option<ComponentInstance>),
}

/// 组件监视器 trait
pub trait ComponentMonitor: Send + Sync {
    /// 实例化开始
    fn instantiating(&self, _model: &ComponentModel) {}

    /// 实例化完成
    fn instantiated(&self, _model: &ComponentModel, _duration: Duration, _arg_count: usize) {}

    /// 实例化失败
    fn instantiation_failed(&self, _model: &ComponentModel, _error: &InjectionError) {}

    /// 成员调用前裁决
    fn invoking(
        &self,
        _member: &MemberRef<'_>,
        _instance: Option<&ComponentInstance>,
    ) -> InvokeDecision {
        InvokeDecision::Proceed
    }

    /// 成员调用完成
    fn invoked(
        &self,
        _member: &MemberRef<'_>,
        _instance: Option<&ComponentInstance>,
        _duration: Duration,
    ) {
    }

    /// 成员调用失败
    fn invocation_failed(&self, _member: &MemberRef<'_>, _error: &InjectionError) {}

    /// 注入器创建钩子，允许包装或替换
    fn new_injector(&self, injector: Box<dyn Injector>) -> Box<dyn Injector> {
        injector
    }
}

/// 静默监视器，所有事件均为空操作
#[derive(Debug, Default, Clone)]
pub struct NullComponentMonitor;

impl ComponentMonitor for NullComponentMonitor {}

/// 基于 tracing 的监视器，把注入事件写入结构化日志
#[derive(Debug, Default, Clone)]
pub struct TracingComponentMonitor;

impl ComponentMonitor for TracingComponentMonitor {
    fn instantiating(&self, model: &ComponentModel) {
        tracing::debug!(component = %model.type_info.name, "开始实例化组件");
    }

    fn instantiated(&self, model: &ComponentModel, duration: Duration, arg_count: usize) {
        tracing::debug!(
            component = %model.type_info.name,
            duration_us = duration.as_micros() as u64,
            arg_count,
            "组件实例化完成"
        );
    }

    fn instantiation_failed(&self, model: &ComponentModel, error: &InjectionError) {
        tracing::warn!(component = %model.type_info.name, %error, "组件实例化失败");
    }

    fn invoking(
        &self,
        member: &MemberRef<'_>,
        _instance: Option<&ComponentInstance>,
    ) -> InvokeDecision {
        tracing::trace!(member = %member, "调用注入成员");
        InvokeDecision::Proceed
    }

    fn invoked(
        &self,
        member: &MemberRef<'_>,
        _instance: Option<&ComponentInstance>,
        duration: Duration,
    ) {
        tracing::trace!(member = %member, duration_us = duration.as_micros() as u64, "注入成员调用完成");
    }

    fn invocation_failed(&self, member: &MemberRef<'_>, error: &InjectionError) {
        tracing::warn!(member = %member, %error, "注入成员调用失败");
    }
}

/// 共享监视器句柄
pub type MonitorHandle = Arc<dyn ComponentMonitor>;
