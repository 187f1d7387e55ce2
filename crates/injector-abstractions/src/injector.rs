//! 注入器抽象接口
//!
//! 所有注入策略（构造函数、字段、方法、组合）实现统一的
//! [`Injector`] trait；策略工厂以 [`InjectionType`] 描述，
//! 供组合层按特征配置选择。

use crate::key::ComponentKey;
use crate::monitor::MonitorHandle;
use crate::parameter::ParameterSpec;
use crate::store::{ComponentStore, InjectionTarget};
use injector_common::{Characteristics, ComponentInstance, ComponentModel, InjectionResult};
use std::sync::Arc;

/// 注入器 trait
///
/// 一个注入器绑定一个组件键与组件模型，负责该组件的
/// 实例构造、成员注入、可满足性校验。
pub trait Injector: Send + Sync {
    /// 组件键
    fn key(&self) -> &ComponentKey;

    /// 组件模型
    fn model(&self) -> &Arc<ComponentModel>;

    /// 策略描述符，如 `SetterInjector-`
    fn descriptor(&self) -> String;

    /// 构造组件实例并完成注入
    fn get_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance>;

    /// 对已有实例执行成员注入（装饰）
    ///
    /// 返回 `Ok(Some(v))` 表示注入产生了替代实例（如 setter 返回值策略）。
    fn decorate_component_instance(
        &self,
        _store: &dyn ComponentStore,
        _into: &InjectionTarget,
        _instance: &ComponentInstance,
    ) -> InjectionResult<Option<ComponentInstance>> {
        Ok(None)
    }

    /// 校验依赖可满足，但不构造实例
    fn verify(&self, store: &dyn ComponentStore) -> InjectionResult<()>;

    /// 接受访问者
    fn accept(&self, visitor: &mut dyn InjectorVisitor) {
        visitor.visit_injector(&self.descriptor(), self.key());
    }
}

/// 注入器访问者
pub trait InjectorVisitor {
    /// 访问一个注入器
    fn visit_injector(&mut self, descriptor: &str, key: &ComponentKey);

    /// 访问一个参数规格
    fn visit_parameter_spec(&mut self, _spec: &ParameterSpec) {}
}

/// 注入策略工厂 trait
///
/// 每种注入策略提供一个工厂，按监视器、特征配置和
/// 组件注册信息创建对应的注入器。
pub trait InjectionType: Send + Sync {
    /// 创建注入器
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>>;

    /// 策略描述符
    fn descriptor(&self) -> &'static str;
}
