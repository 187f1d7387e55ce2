//! 组件生命周期管理

use crate::errors::{LifecycleError, LifecycleResult};
use crate::metadata::{ComponentInstance, ComponentModel};
use tracing::debug;

/// 生命周期策略 trait
///
/// 决定组件实例的启动/停止/销毁方式。注入器核心不调度生命周期，
/// 由容器在组装完成后统一驱动。
pub trait LifecycleStrategy: Send + Sync {
    /// 启动组件
    fn start(&self, instance: &ComponentInstance, model: &ComponentModel) -> LifecycleResult<()>;

    /// 停止组件
    fn stop(&self, instance: &ComponentInstance, model: &ComponentModel) -> LifecycleResult<()>;

    /// 销毁组件
    fn dispose(&self, instance: &ComponentInstance, model: &ComponentModel) -> LifecycleResult<()>;

    /// 组件是否声明了生命周期操作
    fn has_lifecycle(&self, model: &ComponentModel) -> bool;
}

/// 空生命周期策略，所有操作均为无操作
#[derive(Debug, Default)]
pub struct NullLifecycleStrategy;

impl LifecycleStrategy for NullLifecycleStrategy {
    fn start(&self, _instance: &ComponentInstance, _model: &ComponentModel) -> LifecycleResult<()> {
        Ok(())
    }

    fn stop(&self, _instance: &ComponentInstance, _model: &ComponentModel) -> LifecycleResult<()> {
        Ok(())
    }

    fn dispose(&self, _instance: &ComponentInstance, _model: &ComponentModel) -> LifecycleResult<()> {
        Ok(())
    }

    fn has_lifecycle(&self, _model: &ComponentModel) -> bool {
        false
    }
}

/// 基于组件模型生命周期闭包的策略
///
/// 组件在模型中声明 start/stop/dispose 操作，本策略逐一驱动。
/// 未声明的操作视为无操作。
#[derive(Debug, Default)]
pub struct StartableLifecycleStrategy;

impl LifecycleStrategy for StartableLifecycleStrategy {
    fn start(&self, instance: &ComponentInstance, model: &ComponentModel) -> LifecycleResult<()> {
        if let Some(thunk) = &model.lifecycle.start {
            debug!("启动组件: {}", model.type_info.name);
            thunk(instance.as_ref())?;
        }
        Ok(())
    }

    fn stop(&self, instance: &ComponentInstance, model: &ComponentModel) -> LifecycleResult<()> {
        if let Some(thunk) = &model.lifecycle.stop {
            debug!("停止组件: {}", model.type_info.name);
            thunk(instance.as_ref())?;
        }
        Ok(())
    }

    fn dispose(&self, instance: &ComponentInstance, model: &ComponentModel) -> LifecycleResult<()> {
        if let Some(thunk) = &model.lifecycle.dispose {
            debug!("销毁组件: {}", model.type_info.name);
            thunk(instance.as_ref())?;
        }
        Ok(())
    }

    fn has_lifecycle(&self, model: &ComponentModel) -> bool {
        !model.lifecycle.is_empty()
    }
}

impl LifecycleError {
    /// 创建启动失败错误
    pub fn start_failed(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StartFailed {
            component: component.into(),
            message: message.into(),
        }
    }

    /// 创建停止失败错误
    pub fn stop_failed(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StopFailed {
            component: component.into(),
            message: message.into(),
        }
    }
}
