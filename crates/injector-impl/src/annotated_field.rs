//! 注解字段注入
//!
//! 按标记注解在基类链上发现字段并注入，基类字段在前。
//! 可携带静态注入引用集, 使静态字段在遍历中按序完成
//! 恰好一次的写入。

use crate::core::InjectorCore;
use crate::iterative::{IterativeInjector, MemberReturnPolicy};
use crate::selector::{MemberKindFilter, MemberSelector};
use crate::statics::StaticsInitializedReferenceSet;
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    MonitorHandle, ParameterSpec,
};
use injector_common::{Characteristics, ComponentInstance, ComponentModel, InjectionResult};
use std::sync::Arc;

/// 默认的注入标记注解
pub const DEFAULT_INJECT_ANNOTATION: &str = "inject";

/// 注解字段注入器
pub struct AnnotatedFieldInjector {
    inner: IterativeInjector,
}

impl AnnotatedFieldInjector {
    /// 创建注解字段注入器
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        annotations: Vec<String>,
        requires_all_parameters: bool,
        statics: Option<Arc<StaticsInitializedReferenceSet>>,
    ) -> InjectionResult<Self> {
        let core = InjectorCore::new(key, model, monitor, characteristics, specs)?;
        let details: Vec<String> = annotations.iter().map(|a| format!("@{a}")).collect();
        let mut inner = IterativeInjector::new(
            core,
            MemberSelector::ByAnnotation {
                annotations,
                kind: MemberKindFilter::Fields,
            },
            requires_all_parameters,
            "AnnotatedFieldInjector",
            details.join(","),
            MemberReturnPolicy::Instance,
        );
        if let Some(reference_set) = statics {
            inner = inner.with_statics(reference_set);
        }
        Ok(Self { inner })
    }
}

impl Injector for AnnotatedFieldInjector {
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

/// 注解字段注入策略工厂
#[derive(Debug, Clone)]
pub struct AnnotatedFieldInjection {
    /// 接受的注解集合
    pub annotations: Vec<String>,
    /// 是否要求所有字段都可解析
    pub requires_all_parameters: bool,
}

impl Default for AnnotatedFieldInjection {
    fn default() -> Self {
        Self {
            annotations: vec![DEFAULT_INJECT_ANNOTATION.into()],
            requires_all_parameters: true,
        }
    }
}

impl AnnotatedFieldInjection {
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

impl InjectionType for AnnotatedFieldInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let injector = AnnotatedFieldInjector::new(
            key,
            model,
            Arc::clone(&monitor),
            characteristics,
            specs,
            self.annotations.clone(),
            self.requires_all_parameters,
            None,
        )?;
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "AnnotatedFieldInjector-"
    }
}
