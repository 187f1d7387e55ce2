//! setter 注入
//!
//! 按方法名前缀发现单参 set 方法并逐个注入。setter 的非空
//! 返回值会替换工作实例（受
//! [`MemberReturnPolicy::SetterReturn`] 策略约束）。

use crate::core::InjectorCore;
use crate::iterative::{IterativeInjector, MemberReturnPolicy};
use crate::selector::MemberSelector;
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    MonitorHandle, ParameterSpec,
};
use injector_common::{
    Characteristics, ComponentInstance, ComponentModel, InjectionResult,
};
use std::sync::Arc;

/// setter 注入器
pub struct SetterInjector {
    inner: IterativeInjector,
}

impl SetterInjector {
    /// 创建 setter 注入器
    ///
    /// `requires_all_parameters` 独立于按名称解析开关：`false`
    /// （缺省）时未解析的 setter 被跳过，假定由组合中的其他
    /// 注入器消费。
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        prefix: impl Into<String>,
        exclusions: Vec<String>,
        requires_all_parameters: bool,
    ) -> InjectionResult<Self> {
        let core = InjectorCore::new(key, model, monitor, characteristics, specs)?;
        let prefix = prefix.into();
        let details = prefix.clone();
        let inner = IterativeInjector::new(
            core,
            MemberSelector::ByPrefix {
                prefix,
                exclusions,
            },
            requires_all_parameters,
            "SetterInjector",
            details,
            MemberReturnPolicy::SetterReturn,
        );
        Ok(Self { inner })
    }
}

impl Injector for SetterInjector {
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

/// setter 注入策略工厂
#[derive(Debug, Clone)]
pub struct SetterInjection {
    /// 方法名前缀
    pub prefix: String,
    /// 排除的方法名
    pub exclusions: Vec<String>,
    /// 是否要求所有 setter 都可解析
    pub requires_all_parameters: bool,
}

impl Default for SetterInjection {
    fn default() -> Self {
        Self {
            prefix: "set".into(),
            exclusions: Vec::new(),
            requires_all_parameters: false,
        }
    }
}

impl SetterInjection {
    /// 默认配置（前缀 `set`, 缺失的 setter 被跳过）
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定前缀
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }
}

impl InjectionType for SetterInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let injector = SetterInjector::new(
            key,
            model,
            Arc::clone(&monitor),
            characteristics,
            specs,
            self.prefix.clone(),
            self.exclusions.clone(),
            self.requires_all_parameters,
        )?;
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "SetterInjector-"
    }
}
