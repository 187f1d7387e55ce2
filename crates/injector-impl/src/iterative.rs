//! 逐成员注入引擎
//!
//! setter / 字段 / 命名方法等策略共享的执行引擎：按选择器
//! 发现的顺序逐个注入单参成员。实例经由无参构造函数产出，
//! 成员发现结果在首次使用后缓存。

use crate::core::{CyclicDependencyGuard, InjectorCore};
use crate::multi_arg;
use crate::selector::{MemberSelector, SelectedMember};
use crate::statics::{self, StaticsInitializedReferenceSet};
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, Injector, InvokeDecision,
};
use injector_common::{
    ComponentInstance, ComponentModel, InjectionError, InjectionResult,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;

/// 成员注入完成后的返回值策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberReturnPolicy {
    /// 始终返回组件实例
    Instance,
    /// setter 的非空返回值替换工作实例
    SetterReturn,
}

/// 逐成员注入引擎
///
/// 策略包装类型（setter、注解字段等）在此之上只负责选择器
/// 与默认配置。
pub struct IterativeInjector {
    core: InjectorCore,
    selector: MemberSelector,
    requires_all: bool,
    strategy_name: &'static str,
    details: String,
    return_policy: MemberReturnPolicy,
    statics: Option<Arc<StaticsInitializedReferenceSet>>,
    members: OnceCell<Vec<SelectedMember>>,
    instantiation_guard: CyclicDependencyGuard,
    decoration_guard: CyclicDependencyGuard,
    verification_guard: CyclicDependencyGuard,
}

impl IterativeInjector {
    /// 创建引擎
    pub fn new(
        core: InjectorCore,
        selector: MemberSelector,
        requires_all: bool,
        strategy_name: &'static str,
        details: impl Into<String>,
        return_policy: MemberReturnPolicy,
    ) -> Self {
        Self {
            core,
            selector,
            requires_all,
            strategy_name,
            details: details.into(),
            return_policy,
            statics: None,
            members: OnceCell::new(),
            instantiation_guard: CyclicDependencyGuard::new(),
            decoration_guard: CyclicDependencyGuard::new(),
            verification_guard: CyclicDependencyGuard::new(),
        }
    }

    /// 启用静态成员注入
    ///
    /// 选择器命中的静态成员在成员遍历中按序注入（幂等，受
    /// 引用集约束）；未启用时静态成员被跳过。
    pub fn with_statics(mut self, reference_set: Arc<StaticsInitializedReferenceSet>) -> Self {
        self.statics = Some(reference_set);
        self
    }

    pub(crate) fn core(&self) -> &InjectorCore {
        &self.core
    }

    /// 发现结果（首次调用后缓存）
    pub fn members(&self) -> &[SelectedMember] {
        self.members
            .get_or_init(|| self.selector.select(self.core.model()))
    }

    fn inject_members(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
        instance: &ComponentInstance,
    ) -> InjectionResult<Option<ComponentInstance>> {
        let mut current = instance.clone();
        let mut replaced = false;
        let mut unsatisfied = Vec::new();

        for member in self.members() {
            if member.is_static() {
                if let Some(reference_set) = &self.statics {
                    statics::inject_static_member(&self.core, store, member, into, reference_set)?;
                }
                continue;
            }

            let mut arguments = multi_arg::resolve_member_arguments(
                &self.core,
                store,
                &member.member_ref(),
                member.params(),
                into,
                false,
            )?;
            if arguments.is_empty() {
                if self.requires_all {
                    unsatisfied.push(format!(
                        "{} ({})",
                        member.qualified_name(),
                        member.params()[0].ty.name
                    ));
                }
                continue;
            }

            let member_ref = member.member_ref();
            let started = Instant::now();
            let invocation_return = match self.core.monitor().invoking(&member_ref, Some(&current)) {
                InvokeDecision::Override(value) => value,
                InvokeDecision::Proceed => match member {
                    SelectedMember::Field(field) => {
                        let thunk = field.set.as_ref().ok_or_else(|| {
                            InjectionError::MemberMismatch {
                                member: field.qualified_name(),
                                expected: "实例字段写入闭包".into(),
                            }
                        })?;
                        thunk(&*current, arguments.remove(0))
                            .map_err(|err| self.core.fail_invocation(&member_ref, err))?;
                        None
                    }
                    SelectedMember::Method(method) => {
                        let thunk = method.invoke.as_ref().ok_or_else(|| {
                            InjectionError::MemberMismatch {
                                member: method.qualified_name(),
                                expected: "实例方法调用闭包".into(),
                            }
                        })?;
                        thunk(&*current, arguments)
                            .map_err(|err| self.core.fail_invocation(&member_ref, err))?
                    }
                },
            };
            self.core
                .monitor()
                .invoked(&member_ref, Some(&current), started.elapsed());

            if self.return_policy == MemberReturnPolicy::SetterReturn {
                if let Some(next) = invocation_return {
                    current = next;
                    replaced = true;
                }
            }
        }

        if !unsatisfied.is_empty() {
            return Err(InjectionError::UnsatisfiableDependencies {
                component: self.core.model().type_info.name.clone(),
                unsatisfied,
            });
        }
        Ok(if replaced { Some(current) } else { None })
    }
}

impl Injector for IterativeInjector {
    fn key(&self) -> &ComponentKey {
        self.core.key()
    }

    fn model(&self) -> &Arc<ComponentModel> {
        self.core.model()
    }

    fn descriptor(&self) -> String {
        if self.details.is_empty() {
            format!("{}-", self.strategy_name)
        } else {
            format!("{}[{}]-", self.strategy_name, self.details)
        }
    }

    fn get_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance> {
        let scope = self.core.model().type_info.clone();
        self.instantiation_guard.observe(&scope, || {
            let model = self.core.model();
            let constructor = model.no_arg_constructor().ok_or_else(|| {
                InjectionError::composition(format!(
                    "{} 缺少无参构造函数, 无法逐成员注入",
                    model.type_info.name
                ))
            })?;
            self.core.monitor().instantiating(model);
            let started = Instant::now();
            let instance = (constructor.construct)(Vec::new())
                .map_err(|err| self.core.fail_instantiation(err))?;
            self.core
                .monitor()
                .instantiated(model, started.elapsed(), 0);

            let replacement = self.inject_members(store, into, &instance)?;
            Ok(replacement.unwrap_or(instance))
        })
    }

    fn decorate_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
        instance: &ComponentInstance,
    ) -> InjectionResult<Option<ComponentInstance>> {
        let scope = self.core.model().type_info.clone();
        self.decoration_guard
            .observe(&scope, || self.inject_members(store, into, instance))
    }

    fn verify(&self, store: &dyn ComponentStore) -> InjectionResult<()> {
        let scope = self.core.model().type_info.clone();
        self.verification_guard.observe(&scope, || {
            let mut unsatisfied = Vec::new();
            for member in self.members() {
                if member.is_static() && self.statics.is_none() {
                    continue;
                }
                let missing = multi_arg::verify_member_arguments(
                    &self.core,
                    store,
                    &member.member_ref(),
                    member.params(),
                )?;
                if !missing.is_empty() {
                    unsatisfied.push(format!("{} ({})", member.qualified_name(), missing.join(", ")));
                }
            }
            if self.requires_all && !unsatisfied.is_empty() {
                return Err(InjectionError::UnsatisfiableDependencies {
                    component: self.core.model().type_info.name.clone(),
                    unsatisfied,
                });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::MemberKindFilter;
    use crate::store::MapComponentStore;
    use injector_abstractions::NullComponentMonitor;
    use injector_common::{Characteristics, ParamMeta, required_arg};
    use parking_lot::RwLock;

    #[derive(Default)]
    struct Kettle {
        water: RwLock<Option<String>>,
    }

    fn kettle_model() -> Arc<ComponentModel> {
        ComponentModel::of::<Kettle>()
            .constructor(vec![], |_| {
                Ok(Arc::new(Kettle::default()) as ComponentInstance)
            })
            .field("water", ParamMeta::of::<String>(), vec!["inject"], |target, value| {
                let kettle = target
                    .downcast_ref::<Kettle>()
                    .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
                let water = required_arg::<String>(&[value], 0)?;
                *kettle.water.write() = Some((*water).clone());
                Ok(())
            })
            .build()
    }

    fn field_injector(requires_all: bool) -> IterativeInjector {
        let core = InjectorCore::new(
            ComponentKey::of::<Kettle>(),
            kettle_model(),
            Arc::new(NullComponentMonitor),
            &Characteristics::new(),
            vec![],
        )
        .unwrap();
        IterativeInjector::new(
            core,
            MemberSelector::ByAnnotation {
                annotations: vec!["inject".into()],
                kind: MemberKindFilter::Fields,
            },
            requires_all,
            "AnnotatedFieldInjector",
            "@inject",
            MemberReturnPolicy::Instance,
        )
    }

    #[test]
    fn test_member_injection_fills_the_slot() {
        let injector = field_injector(true);
        let store = MapComponentStore::new();
        store.register_instance("泉水".to_string());
        let instance = injector
            .get_component_instance(&store, &InjectionTarget::none())
            .unwrap();
        let kettle = instance.downcast::<Kettle>().unwrap();
        assert_eq!(kettle.water.read().as_deref(), Some("泉水"));
    }

    #[test]
    fn test_required_member_missing_fails_with_full_list() {
        let injector = field_injector(true);
        let store = MapComponentStore::new();
        let result = injector.get_component_instance(&store, &InjectionTarget::none());
        match result {
            Err(InjectionError::UnsatisfiableDependencies { component, unsatisfied }) => {
                assert_eq!(component, "Kettle");
                assert_eq!(unsatisfied, vec!["Kettle.water (String)".to_string()]);
            }
            other => panic!("期望不可满足错误, 实际为 {other:?}"),
        }
    }

    #[test]
    fn test_optional_member_missing_is_skipped() {
        let injector = field_injector(false);
        let store = MapComponentStore::new();
        let instance = injector
            .get_component_instance(&store, &InjectionTarget::none())
            .unwrap();
        let kettle = instance.downcast::<Kettle>().unwrap();
        assert!(kettle.water.read().is_none());
    }

    #[test]
    fn test_decorate_injects_into_external_instance() {
        let injector = field_injector(true);
        let store = MapComponentStore::new();
        store.register_instance("雨水".to_string());
        let external: ComponentInstance = Arc::new(Kettle::default());
        let replacement = injector
            .decorate_component_instance(&store, &InjectionTarget::none(), &external)
            .unwrap();
        assert!(replacement.is_none());
        let kettle = external.downcast::<Kettle>().unwrap();
        assert_eq!(kettle.water.read().as_deref(), Some("雨水"));
    }

    #[test]
    fn test_verify_reports_missing_dependencies_without_instantiating() {
        let injector = field_injector(true);
        let store = MapComponentStore::new();
        assert!(matches!(
            injector.verify(&store),
            Err(InjectionError::UnsatisfiableDependencies { .. })
        ));
        store.register_instance("井水".to_string());
        assert!(injector.verify(&store).is_ok());
    }

    #[test]
    fn test_discovery_is_cached_and_deterministic() {
        let first = field_injector(true);
        let second = field_injector(true);
        let names = |inj: &IterativeInjector| -> Vec<String> {
            inj.members().iter().map(|m| m.qualified_name()).collect()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(names(&first), names(&first));
    }
}
