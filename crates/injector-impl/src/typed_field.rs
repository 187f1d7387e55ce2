//! 类型名字段注入
//!
//! 按字段声明类型名称允许表发现字段并注入。

use crate::core::InjectorCore;
use crate::iterative::{IterativeInjector, MemberReturnPolicy};
use crate::selector::MemberSelector;
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    MonitorHandle, ParameterSpec,
};
use injector_common::{Characteristics, ComponentInstance, ComponentModel, InjectionResult};
use std::sync::Arc;

/// 类型名字段注入器
pub struct TypedFieldInjector {
    inner: IterativeInjector,
}

impl TypedFieldInjector {
    /// 创建类型名字段注入器
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        type_names: Vec<String>,
        requires_all_parameters: bool,
    ) -> InjectionResult<Self> {
        let core = InjectorCore::new(key, model, monitor, characteristics, specs)?;
        let details = type_names.join(",");
        let inner = IterativeInjector::new(
            core,
            MemberSelector::ByTypeName { type_names },
            requires_all_parameters,
            "TypedFieldInjector",
            details,
            MemberReturnPolicy::Instance,
        );
        Ok(Self { inner })
    }
}

impl Injector for TypedFieldInjector {
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

/// 类型名字段注入策略工厂
#[derive(Debug, Clone, Default)]
pub struct TypedFieldInjection {
    /// 待注入的字段类型名称
    pub type_names: Vec<String>,
    /// 是否要求所有字段都可解析
    pub requires_all_parameters: bool,
}

impl TypedFieldInjection {
    /// 指定类型名称
    pub fn of_types(type_names: Vec<String>) -> Self {
        Self {
            type_names,
            requires_all_parameters: true,
        }
    }
}

impl InjectionType for TypedFieldInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let injector = TypedFieldInjector::new(
            key,
            model,
            Arc::clone(&monitor),
            characteristics,
            specs,
            self.type_names.clone(),
            self.requires_all_parameters,
        )?;
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "TypedFieldInjector-"
    }
}
