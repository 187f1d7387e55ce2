//! 构造函数注入
//!
//! 在候选构造函数中选择实参可满足数最多（最贪婪）的一个；
//! 同一元数的可满足候选多于一个时报歧义错误，一个都没有时
//! 汇总全部缺失依赖。

use crate::core::{CyclicDependencyGuard, InjectorCore};
use crate::multi_arg;
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    MonitorHandle, ParameterSpec,
};
use injector_common::{
    Characteristics, ComponentInstance, ComponentModel, InjectionError, InjectionResult, MemberRef,
    ResolvedArgument,
};
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

/// 构造函数注入器
pub struct ConstructorInjector {
    core: InjectorCore,
    remember_chosen: bool,
    chosen: OnceCell<usize>,
    instantiation_guard: CyclicDependencyGuard,
    verification_guard: CyclicDependencyGuard,
}

impl ConstructorInjector {
    /// 创建构造函数注入器
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
        remember_chosen: bool,
    ) -> InjectionResult<Self> {
        let core = InjectorCore::new(key, model, monitor, characteristics, specs)?;
        if core.model().constructors.is_empty() {
            return Err(InjectionError::composition(format!(
                "{} 没有注册任何构造函数",
                core.model().type_info.name
            )));
        }
        Ok(Self {
            core,
            remember_chosen,
            chosen: OnceCell::new(),
            instantiation_guard: CyclicDependencyGuard::new(),
            verification_guard: CyclicDependencyGuard::new(),
        })
    }

    /// 选择实参可满足数最多的构造函数
    ///
    /// 按元数降序尝试；首个全可满足元数上出现第二个可满足
    /// 候选即为歧义。全部不可满足时报出缺失依赖的并集。
    fn select_constructor(&self, store: &dyn ComponentStore) -> InjectionResult<usize> {
        let model = self.core.model();
        let mut indices: Vec<usize> = (0..model.constructors.len()).collect();
        indices.sort_by(|a, b| {
            model.constructors[*b]
                .params
                .len()
                .cmp(&model.constructors[*a].params.len())
        });

        let mut all_missing: BTreeSet<String> = BTreeSet::new();
        let mut satisfiable: Option<(usize, usize)> = None;

        for index in indices {
            let constructor = &model.constructors[index];
            let member = MemberRef::Constructor(constructor, &model.type_info);
            let missing =
                multi_arg::verify_member_arguments(&self.core, store, &member, &constructor.params)?;
            if missing.is_empty() {
                match satisfiable {
                    Some((_, arity)) if arity == constructor.params.len() => {
                        let chosen = satisfiable.map(|(i, _)| i).unwrap_or(index);
                        return Err(InjectionError::AmbiguousComponentResolution {
                            component: model.type_info.name.clone(),
                            member: "constructor".into(),
                            parameter_index: 0,
                            candidates: vec![
                                model.constructors[chosen].signature(&model.type_info),
                                constructor.signature(&model.type_info),
                            ],
                        });
                    }
                    Some(_) => {}
                    None => satisfiable = Some((index, constructor.params.len())),
                }
            } else {
                all_missing.extend(missing);
            }
        }

        satisfiable.map(|(index, _)| index).ok_or_else(|| {
            InjectionError::UnsatisfiableDependencies {
                component: model.type_info.name.clone(),
                unsatisfied: all_missing.into_iter().collect(),
            }
        })
    }

    fn resolve_arguments(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
        index: usize,
    ) -> InjectionResult<Vec<ResolvedArgument>> {
        let model = self.core.model();
        let constructor = &model.constructors[index];
        let member = MemberRef::Constructor(constructor, &model.type_info);
        multi_arg::resolve_member_arguments(&self.core, store, &member, &constructor.params, into, true)
    }
}

impl Injector for ConstructorInjector {
    fn key(&self) -> &ComponentKey {
        self.core.key()
    }

    fn model(&self) -> &Arc<ComponentModel> {
        self.core.model()
    }

    fn descriptor(&self) -> String {
        "ConstructorInjector-".into()
    }

    fn get_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance> {
        let scope = self.core.model().type_info.clone();
        self.instantiation_guard.observe(&scope, || {
            let index = match self.chosen.get() {
                Some(index) if self.remember_chosen => *index,
                _ => {
                    let index = self.select_constructor(store)?;
                    if self.remember_chosen {
                        let _ = self.chosen.set(index);
                    }
                    index
                }
            };
            let arguments = self.resolve_arguments(store, into, index)?;
            let model = self.core.model();
            self.core.monitor().instantiating(model);
            let started = Instant::now();
            let arg_count = arguments.len();
            let instance = (model.constructors[index].construct)(arguments)
                .map_err(|err| self.core.fail_instantiation(err))?;
            self.core
                .monitor()
                .instantiated(model, started.elapsed(), arg_count);
            Ok(instance)
        })
    }

    fn verify(&self, store: &dyn ComponentStore) -> InjectionResult<()> {
        let scope = self.core.model().type_info.clone();
        self.verification_guard
            .observe(&scope, || self.select_constructor(store).map(|_| ()))
    }
}

/// 构造函数注入策略工厂
#[derive(Debug, Default, Clone)]
pub struct ConstructorInjection {
    /// 是否记住首次选中的构造函数
    pub remember_chosen: bool,
}

impl ConstructorInjection {
    /// 默认配置（每次调用重新选择）
    pub fn new() -> Self {
        Self::default()
    }

    /// 记住首次选中的构造函数
    pub fn remembering_chosen() -> Self {
        Self {
            remember_chosen: true,
        }
    }
}

impl InjectionType for ConstructorInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let injector = ConstructorInjector::new(
            key,
            model,
            Arc::clone(&monitor),
            characteristics,
            specs,
            self.remember_chosen,
        )?;
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "ConstructorInjector-"
    }
}
