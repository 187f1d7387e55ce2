//! 命名字段注入
//!
//! 按显式名称允许表在基类链上发现字段并注入。

use crate::core::InjectorCore;
use crate::iterative::{IterativeInjector, MemberReturnPolicy};
use crate::selector::{MemberKindFilter, MemberSelector};
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    MonitorHandle, ParameterSpec,
};
use injector_common::{Characteristics, ComponentInstance, ComponentModel, InjectionResult};
use std::sync::Arc;

/// 命名字段注入器
pub struct NamedFieldInjector {
    inner: IterativeInjector,
}

impl NamedFieldInjector {
    /// 创建命名字段注入器
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        field_names: Vec<String>,
        requires_all_parameters: bool,
    ) -> InjectionResult<Self> {
        let core = InjectorCore::new(key, model, monitor, characteristics, specs)?;
        let details = field_names.join(",");
        let inner = IterativeInjector::new(
            core,
            MemberSelector::ByName {
                names: field_names,
                kind: MemberKindFilter::Fields,
            },
            requires_all_parameters,
            "NamedFieldInjector",
            details,
            MemberReturnPolicy::Instance,
        );
        Ok(Self { inner })
    }
}

impl Injector for NamedFieldInjector {
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

/// 命名字段注入策略工厂
#[derive(Debug, Clone, Default)]
pub struct NamedFieldInjection {
    /// 待注入的字段名称
    pub field_names: Vec<String>,
    /// 是否要求所有字段都可解析
    pub requires_all_parameters: bool,
}

impl NamedFieldInjection {
    /// 指定字段名称
    pub fn of_fields(field_names: Vec<String>) -> Self {
        Self {
            field_names,
            requires_all_parameters: true,
        }
    }
}

impl InjectionType for NamedFieldInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let injector = NamedFieldInjector::new(
            key,
            model,
            Arc::clone(&monitor),
            characteristics,
            specs,
            self.field_names.clone(),
            self.requires_all_parameters,
        )?;
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "NamedFieldInjector-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MapComponentStore;
    use injector_abstractions::NullComponentMonitor;
    use injector_common::{required_arg, InjectionError, ParamMeta};
    use parking_lot::RwLock;

    #[derive(Default)]
    struct Report {
        title: RwLock<Option<String>>,
        body: RwLock<Option<String>>,
    }

    fn report_model() -> Arc<ComponentModel> {
        let set_slot = |pick: fn(&Report) -> &RwLock<Option<String>>| {
            move |target: &(dyn std::any::Any + Send + Sync),
                  value: injector_common::ResolvedArgument|
                  -> InjectionResult<()> {
                let report = target
                    .downcast_ref::<Report>()
                    .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
                let text = required_arg::<String>(&[value], 0)?;
                *pick(report).write() = Some((*text).clone());
                Ok(())
            }
        };
        ComponentModel::of::<Report>()
            .constructor(vec![], |_| {
                Ok(Arc::new(Report::default()) as ComponentInstance)
            })
            .field("title", ParamMeta::of::<String>(), vec![], set_slot(|r| &r.title))
            .field("body", ParamMeta::of::<String>(), vec![], set_slot(|r| &r.body))
            .build()
    }

    #[test]
    fn test_only_listed_fields_are_injected() {
        let injector = NamedFieldInjector::new(
            ComponentKey::of::<Report>(),
            report_model(),
            Arc::new(NullComponentMonitor),
            &Characteristics::new(),
            vec![],
            vec!["title".into()],
            true,
        )
        .unwrap();
        let store = MapComponentStore::new();
        store.register_instance("月度报告".to_string());
        let instance = injector
            .get_component_instance(&store, &InjectionTarget::none())
            .unwrap();
        let report = instance.downcast::<Report>().unwrap();
        assert_eq!(report.title.read().as_deref(), Some("月度报告"));
        assert!(report.body.read().is_none());
    }
}
