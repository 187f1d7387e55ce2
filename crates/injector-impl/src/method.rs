//! 多参方法注入
//!
//! 通过无参构造函数产出实例后，按序调用发现的注入方法，
//! 每个方法的全部形参独立解析。与逐成员引擎不同，这里的
//! 方法可以携带任意个形参。

use crate::core::{CyclicDependencyGuard, InjectorCore};
use crate::multi_arg;
use crate::ordering;
use crate::selector;
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    InvokeDecision, MonitorHandle, ParameterSpec,
};
use injector_common::{
    Characteristics, ComponentInstance, ComponentModel, InjectionError, InjectionResult,
    MemberRef, MethodMeta,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;

/// 注入方法的发现方式
#[derive(Debug, Clone)]
pub enum MethodSelection {
    /// 方法名前缀（缺省 `inject`）
    ByPrefix(String),
    /// 显式方法名列表
    Specific(Vec<String>),
    /// 标记注解集合（带覆盖抑制）
    ByAnnotation(Vec<String>),
}

impl MethodSelection {
    fn details(&self) -> String {
        match self {
            MethodSelection::ByPrefix(prefix) => prefix.clone(),
            MethodSelection::Specific(names) => names.join(","),
            MethodSelection::ByAnnotation(annotations) => {
                let marks: Vec<String> = annotations.iter().map(|a| format!("@{a}")).collect();
                marks.join(",")
            }
        }
    }
}

/// 多参方法注入器
pub struct MethodInjector {
    core: InjectorCore,
    selection: MethodSelection,
    strategy_name: &'static str,
    requires_all_parameters: bool,
    methods: OnceCell<Vec<Arc<MethodMeta>>>,
    instantiation_guard: CyclicDependencyGuard,
    decoration_guard: CyclicDependencyGuard,
    verification_guard: CyclicDependencyGuard,
}

impl MethodInjector {
    /// 创建多参方法注入器
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        selection: MethodSelection,
        requires_all_parameters: bool,
    ) -> InjectionResult<Self> {
        Self::with_strategy_name(
            key,
            model,
            monitor,
            characteristics,
            specs,
            selection,
            requires_all_parameters,
            "MethodInjector",
        )
    }

    pub(crate) fn with_strategy_name(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        selection: MethodSelection,
        requires_all_parameters: bool,
        strategy_name: &'static str,
    ) -> InjectionResult<Self> {
        let core = InjectorCore::new(key, model, monitor, characteristics, specs)?;
        Ok(Self {
            core,
            selection,
            strategy_name,
            requires_all_parameters,
            methods: OnceCell::new(),
            instantiation_guard: CyclicDependencyGuard::new(),
            decoration_guard: CyclicDependencyGuard::new(),
            verification_guard: CyclicDependencyGuard::new(),
        })
    }

    /// 发现结果（首次调用后缓存）
    pub fn methods(&self) -> &[Arc<MethodMeta>] {
        self.methods.get_or_init(|| match &self.selection {
            MethodSelection::ByAnnotation(annotations) => {
                selector::annotated_methods(self.core.model(), annotations)
                    .into_iter()
                    .filter(|(_, _, m)| !m.is_static)
                    .map(|(_, _, m)| m)
                    .collect()
            }
            MethodSelection::ByPrefix(prefix) => self.collect(|m| m.name.starts_with(prefix)),
            MethodSelection::Specific(names) => {
                self.collect(|m| names.iter().any(|n| n == &m.name))
            }
        })
    }

    fn collect(&self, accept: impl Fn(&MethodMeta) -> bool) -> Vec<Arc<MethodMeta>> {
        let mut ordered: Vec<((usize, bool, usize), Arc<MethodMeta>)> = Vec::new();
        for (depth, class) in self.core.model().hierarchy().into_iter().enumerate() {
            for (index, method) in class.methods.iter().enumerate() {
                if !method.is_static && accept(method) {
                    ordered.push((ordering::rank(depth, false, index), method.clone()));
                }
            }
        }
        ordered.sort_by(|a, b| a.0.cmp(&b.0));
        ordered.into_iter().map(|(_, m)| m).collect()
    }

    fn invoke_methods(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
        instance: &ComponentInstance,
    ) -> InjectionResult<Option<ComponentInstance>> {
        let mut last_return = None;
        for method in self.methods() {
            let member = MemberRef::Method(method);
            let arguments = multi_arg::resolve_member_arguments(
                &self.core,
                store,
                &member,
                &method.params,
                into,
                self.requires_all_parameters,
            )?;
            if arguments.len() != method.params.len() {
                // 缺参时整个方法跳过, 不做部分调用
                continue;
            }

            let started = Instant::now();
            let invocation_return = match self.core.monitor().invoking(&member, Some(instance)) {
                InvokeDecision::Override(value) => value,
                InvokeDecision::Proceed => {
                    let thunk = method.invoke.as_ref().ok_or_else(|| {
                        InjectionError::MemberMismatch {
                            member: method.qualified_name(),
                            expected: "实例方法调用闭包".into(),
                        }
                    })?;
                    thunk(&**instance, arguments)
                        .map_err(|err| self.core.fail_invocation(&member, err))?
                }
            };
            self.core
                .monitor()
                .invoked(&member, Some(instance), started.elapsed());
            if invocation_return.is_some() {
                last_return = invocation_return;
            }
        }
        Ok(last_return)
    }
}

impl Injector for MethodInjector {
    fn key(&self) -> &ComponentKey {
        self.core.key()
    }

    fn model(&self) -> &Arc<ComponentModel> {
        self.core.model()
    }

    fn descriptor(&self) -> String {
        format!("{}[{}]-", self.strategy_name, self.selection.details())
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
                    "{} 缺少无参构造函数, 无法方法注入",
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
            self.invoke_methods(store, into, &instance)?;
            Ok(instance)
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
            .observe(&scope, || self.invoke_methods(store, into, instance))
    }

    fn verify(&self, store: &dyn ComponentStore) -> InjectionResult<()> {
        let scope = self.core.model().type_info.clone();
        self.verification_guard.observe(&scope, || {
            let mut unsatisfied = Vec::new();
            for method in self.methods() {
                let member = MemberRef::Method(method);
                let missing =
                    multi_arg::verify_member_arguments(&self.core, store, &member, &method.params)?;
                if !missing.is_empty() {
                    unsatisfied.push(format!("{} ({})", method.qualified_name(), missing.join(", ")));
                }
            }
            if self.requires_all_parameters && !unsatisfied.is_empty() {
                return Err(InjectionError::UnsatisfiableDependencies {
                    component: self.core.model().type_info.name.clone(),
                    unsatisfied,
                });
            }
            Ok(())
        })
    }
}

/// 多参方法注入策略工厂
#[derive(Debug, Clone)]
pub struct MethodInjection {
    /// 方法发现方式
    pub selection: MethodSelection,
    /// 是否要求所有形参都可解析
    pub requires_all_parameters: bool,
}

impl Default for MethodInjection {
    fn default() -> Self {
        Self {
            selection: MethodSelection::ByPrefix("inject".into()),
            requires_all_parameters: true,
        }
    }
}

impl MethodInjection {
    /// 默认配置（前缀 `inject`）
    pub fn new() -> Self {
        Self::default()
    }

    /// 显式方法名列表
    pub fn of_methods(names: Vec<String>) -> Self {
        Self {
            selection: MethodSelection::Specific(names),
            requires_all_parameters: true,
        }
    }
}

impl InjectionType for MethodInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let injector = MethodInjector::new(
            key,
            model,
            Arc::clone(&monitor),
            characteristics,
            specs,
            self.selection.clone(),
            self.requires_all_parameters,
        )?;
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "MethodInjector-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MapComponentStore;
    use injector_abstractions::NullComponentMonitor;
    use injector_common::{required_arg, ParamMeta};
    use parking_lot::RwLock;

    struct Gearbox;
    struct Radiator;

    #[derive(Default)]
    struct Assembly {
        wired: RwLock<Vec<&'static str>>,
    }

    fn assembly_model() -> Arc<ComponentModel> {
        ComponentModel::of::<Assembly>()
            .constructor(vec![], |_| {
                Ok(Arc::new(Assembly::default()) as ComponentInstance)
            })
            .method(
                "injectDrivetrain",
                vec![ParamMeta::of::<Gearbox>(), ParamMeta::of::<Radiator>()],
                None,
                vec![],
                |target, args| {
                    let assembly = target
                        .downcast_ref::<Assembly>()
                        .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
                    required_arg::<Gearbox>(&args, 0)?;
                    required_arg::<Radiator>(&args, 1)?;
                    assembly.wired.write().push("drivetrain");
                    Ok(None)
                },
            )
            .method(
                "injectCooling",
                vec![ParamMeta::of::<Radiator>()],
                None,
                vec![],
                |target, args| {
                    let assembly = target
                        .downcast_ref::<Assembly>()
                        .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
                    required_arg::<Radiator>(&args, 0)?;
                    assembly.wired.write().push("cooling");
                    Ok(None)
                },
            )
            .build()
    }

    fn method_injector() -> MethodInjector {
        MethodInjector::new(
            ComponentKey::of::<Assembly>(),
            assembly_model(),
            Arc::new(NullComponentMonitor),
            &Characteristics::new(),
            vec![],
            MethodSelection::ByPrefix("inject".into()),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_methods_invoked_in_declaration_order() {
        let store = MapComponentStore::new();
        store.register_instance(Gearbox);
        store.register_instance(Radiator);
        let instance = method_injector()
            .get_component_instance(&store, &InjectionTarget::none())
            .unwrap();
        let assembly = instance.downcast::<Assembly>().unwrap();
        assert_eq!(*assembly.wired.read(), vec!["drivetrain", "cooling"]);
    }

    #[test]
    fn test_missing_argument_fails_whole_member() {
        let store = MapComponentStore::new();
        store.register_instance(Radiator);
        let result = method_injector().get_component_instance(&store, &InjectionTarget::none());
        assert!(matches!(
            result,
            Err(InjectionError::UnsatisfiableDependencies { .. })
        ));
    }

    #[test]
    fn test_specific_selection_limits_invocations() {
        let injector = MethodInjector::new(
            ComponentKey::of::<Assembly>(),
            assembly_model(),
            Arc::new(NullComponentMonitor),
            &Characteristics::new(),
            vec![],
            MethodSelection::Specific(vec!["injectCooling".into()]),
            true,
        )
        .unwrap();
        let store = MapComponentStore::new();
        store.register_instance(Radiator);
        let instance = injector
            .get_component_instance(&store, &InjectionTarget::none())
            .unwrap();
        let assembly = instance.downcast::<Assembly>().unwrap();
        assert_eq!(*assembly.wired.read(), vec!["cooling"]);
    }

    #[test]
    fn test_descriptor_names_the_selection() {
        assert_eq!(method_injector().descriptor(), "MethodInjector[inject]-");
    }
}
