//! 注解方法注入
//!
//! 按标记注解在基类链上发现方法（任意元数）并注入。同签名
//! 的派生类重声明若未标注, 基类声明被抑制。

use crate::method::{MethodInjector, MethodSelection};
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    MonitorHandle, ParameterSpec,
};
use injector_common::{Characteristics, ComponentInstance, ComponentModel, InjectionResult};
use std::sync::Arc;

/// 注解方法注入器
pub struct AnnotatedMethodInjector {
    inner: MethodInjector,
}

impl AnnotatedMethodInjector {
    /// 创建注解方法注入器
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        annotations: Vec<String>,
        requires_all_parameters: bool,
    ) -> InjectionResult<Self> {
        let inner = MethodInjector::with_strategy_name(
            key,
            model,
            monitor,
            characteristics,
            specs,
            MethodSelection::ByAnnotation(annotations),
            requires_all_parameters,
            "AnnotatedMethodInjector",
        )?;
        Ok(Self { inner })
    }
}

impl Injector for AnnotatedMethodInjector {
    fn key(&self) -> &ComponentKey {
        self.inner.key()
    }

    fn model(&self) -> &Arc<ComponentModel> {
        self.inner.model()
    }

    fn descriptor(&self) -> String {
        self.inner.descriptor()
    }

    fn get_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance> {
        self.inner.get_component_instance(store, into)
    }

    fn decorate_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
        instance: &ComponentInstance,
    ) -> InjectionResult<Option<ComponentInstance>> {
        self.inner.decorate_component_instance(store, into, instance)
    }

    fn verify(&self, store: &dyn ComponentStore) -> InjectionResult<()> {
        self.inner.verify(store)
    }
}

/// 注解方法注入策略工厂
#[derive(Debug, Clone)]
pub struct AnnotatedMethodInjection {
    /// 接受的注解集合
    pub annotations: Vec<String>,
    /// 是否要求所有形参都可解析
    pub requires_all_parameters: bool,
}

impl Default for AnnotatedMethodInjection {
    fn default() -> Self {
        Self {
            annotations: vec![crate::annotated_field::DEFAULT_INJECT_ANNOTATION.into()],
            requires_all_parameters: true,
        }
    }
}

impl AnnotatedMethodInjection {
    /// 默认配置（注解 `inject`）
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定注解集合
    pub fn with_annotations(annotations: Vec<String>) -> Self {
        Self {
            annotations,
            ..Self::default()
        }
    }
}

impl InjectionType for AnnotatedMethodInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let injector = AnnotatedMethodInjector::new(
            key,
            model,
            Arc::clone(&monitor),
            characteristics,
            specs,
            self.annotations.clone(),
            self.requires_all_parameters,
        )?;
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "AnnotatedMethodInjector-"
    }
}
