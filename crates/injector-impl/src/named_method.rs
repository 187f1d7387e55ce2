//! 命名方法注入
//!
//! 按显式名称允许表发现单参方法并注入。名称既可以是方法名
//! 本身, 也可以是 `set` 前缀剥离后的属性名。

use crate::core::InjectorCore;
use crate::iterative::{IterativeInjector, MemberReturnPolicy};
use crate::selector::{MemberKindFilter, MemberSelector};
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    MonitorHandle, ParameterSpec,
};
use injector_common::{Characteristics, ComponentInstance, ComponentModel, InjectionResult};
use std::sync::Arc;

/// 命名方法注入器
pub struct NamedMethodInjector {
    inner: IterativeInjector,
}

impl NamedMethodInjector {
    /// 创建命名方法注入器
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        method_names: Vec<String>,
        requires_all_parameters: bool,
    ) -> InjectionResult<Self> {
        let core = InjectorCore::new(key, model, monitor, characteristics, specs)?;
        let details = method_names.join(",");
        let inner = IterativeInjector::new(
            core,
            MemberSelector::ByName {
                names: method_names,
                kind: MemberKindFilter::Methods,
            },
            requires_all_parameters,
            "NamedMethodInjector",
            details,
            MemberReturnPolicy::SetterReturn,
        );
        Ok(Self { inner })
    }
}

impl Injector for NamedMethodInjector {
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

/// 命名方法注入策略工厂
#[derive(Debug, Clone, Default)]
pub struct NamedMethodInjection {
    /// 待注入的方法/属性名称
    pub method_names: Vec<String>,
    /// 是否要求所有方法都可解析
    pub requires_all_parameters: bool,
}

impl NamedMethodInjection {
    /// 指定方法名称
    pub fn of_methods(method_names: Vec<String>) -> Self {
        Self {
            method_names,
            requires_all_parameters: true,
        }
    }
}

impl InjectionType for NamedMethodInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let injector = NamedMethodInjector::new(
            key,
            model,
            Arc::clone(&monitor),
            characteristics,
            specs,
            self.method_names.clone(),
            self.requires_all_parameters,
        )?;
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "NamedMethodInjector-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MapComponentStore;
    use injector_abstractions::NullComponentMonitor;
    use injector_common::{required_arg, InjectionError, ParamMeta};
    use parking_lot::RwLock;

    struct Gearbox;

    #[derive(Default)]
    struct Crane {
        gearbox: RwLock<bool>,
        hoist: RwLock<bool>,
    }

    fn crane_model() -> Arc<ComponentModel> {
        ComponentModel::of::<Crane>()
            .constructor(vec![], |_| {
                Ok(Arc::new(Crane::default()) as ComponentInstance)
            })
            .method(
                "setGearbox",
                vec![ParamMeta::of::<Gearbox>()],
                None,
                vec![],
                |target, args| {
                    let crane = target
                        .downcast_ref::<Crane>()
                        .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
                    required_arg::<Gearbox>(&args, 0)?;
                    *crane.gearbox.write() = true;
                    Ok(None)
                },
            )
            .method(
                "setHoist",
                vec![ParamMeta::of::<Gearbox>()],
                None,
                vec![],
                |target, args| {
                    let crane = target
                        .downcast_ref::<Crane>()
                        .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
                    required_arg::<Gearbox>(&args, 0)?;
                    *crane.hoist.write() = true;
                    Ok(None)
                },
            )
            .build()
    }

    #[test]
    fn test_property_name_matches_setter() {
        let injector = NamedMethodInjector::new(
            ComponentKey::of::<Crane>(),
            crane_model(),
            Arc::new(NullComponentMonitor),
            &Characteristics::new(),
            vec![],
            vec!["gearbox".into()],
            true,
        )
        .unwrap();
        let store = MapComponentStore::new();
        store.register_instance(Gearbox);
        let instance = injector
            .get_component_instance(&store, &InjectionTarget::none())
            .unwrap();
        let crane = instance.downcast::<Crane>().unwrap();
        assert!(*crane.gearbox.read());
        assert!(!*crane.hoist.read());
    }
}
