//! 工厂注入
//!
//! 组件不由容器直接构造, 而是由一个提供者按需产出。提供者
//! 的 `provide` 方法形参照常由容器解析, 每次请求都产出新
//! 实例, 缓存由外层包装决定。

use crate::core::{CyclicDependencyGuard, InjectorCore};
use crate::multi_arg;
use injector_abstractions::{
    ComponentKey, ComponentStore, InjectionTarget, Injector, MonitorHandle, ParameterSpec,
};
use injector_common::{
    Characteristics, ComponentInstance, ComponentModel, InjectionError, InjectionResult,
    MemberRef, MethodMeta, TypeInfo,
};
use std::sync::Arc;

/// 提供者名约定：工厂方法必须叫这个名字
pub const PROVIDE_METHOD: &str = "provide";

/// 手写提供者契约
///
/// 绕过元数据模型直接产出实例的轻量入口, 由
/// [`FactoryInjector`] 装入容器。
pub trait Provider: Send + Sync {
    /// 产出的组件类型
    fn provided_type(&self) -> TypeInfo;

    /// 产出一个新实例
    fn provide(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance>;
}

/// 提供者包装注入器
///
/// 基于元数据模型：提供者模型上必须恰好声明一个名为
/// `provide` 且带返回值的实例方法, 否则注册失败。组件键取
/// 自该方法的返回类型。
pub struct ProviderAdapter {
    core: InjectorCore,
    provider: ComponentInstance,
    provide: Arc<MethodMeta>,
    guard: CyclicDependencyGuard,
}

impl ProviderAdapter {
    /// 包装一个提供者实例
    pub fn new(
        provider: ComponentInstance,
        provider_model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Self> {
        let mut candidates = provider_model
            .methods
            .iter()
            .filter(|m| m.name == PROVIDE_METHOD && !m.is_static);
        let provide = match (candidates.next(), candidates.next()) {
            (Some(method), None) => method.clone(),
            (None, _) => {
                return Err(InjectionError::composition(format!(
                    "{} 未声明 {PROVIDE_METHOD} 方法",
                    provider_model.type_info.name
                )))
            }
            (Some(_), Some(_)) => {
                return Err(InjectionError::composition(format!(
                    "{} 声明了多个 {PROVIDE_METHOD} 方法",
                    provider_model.type_info.name
                )))
            }
        };
        let provided = provide.returns.clone().ok_or_else(|| {
            InjectionError::composition(format!(
                "{} 的 {PROVIDE_METHOD} 方法没有返回值",
                provider_model.type_info.name
            ))
        })?;
        let key = ComponentKey::Type(provided);
        let core = InjectorCore::new(key, provider_model, monitor, characteristics, specs)?;
        Ok(Self {
            core,
            provider,
            provide,
            guard: CyclicDependencyGuard::new(),
        })
    }
}

impl Injector for ProviderAdapter {
    fn key(&self) -> &ComponentKey {
        self.core.key()
    }

    fn model(&self) -> &Arc<ComponentModel> {
        self.core.model()
    }

    fn descriptor(&self) -> String {
        format!("ProviderAdapter[{}]-", self.core.model().type_info.name)
    }

    fn get_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance> {
        let scope = self.core.model().type_info.clone();
        self.guard.observe(&scope, || {
            let member = MemberRef::Method(&self.provide);
            let arguments = multi_arg::resolve_member_arguments(
                &self.core,
                store,
                &member,
                &self.provide.params,
                into,
                true,
            )?;
            let thunk = self.provide.invoke.as_ref().ok_or_else(|| {
                InjectionError::MemberMismatch {
                    member: self.provide.qualified_name(),
                    expected: "实例方法调用闭包".into(),
                }
            })?;
            let produced = thunk(&*self.provider, arguments)
                .map_err(|err| self.core.fail_invocation(&member, err))?;
            produced.ok_or_else(|| {
                InjectionError::composition(format!(
                    "{} 的 {PROVIDE_METHOD} 方法返回了空值",
                    self.core.model().type_info.name
                ))
            })
        })
    }

    fn verify(&self, store: &dyn ComponentStore) -> InjectionResult<()> {
        let member = MemberRef::Method(&self.provide);
        let missing =
            multi_arg::verify_member_arguments(&self.core, store, &member, &self.provide.params)?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InjectionError::UnsatisfiableDependencies {
                component: self.core.model().type_info.name.clone(),
                unsatisfied: missing,
            })
        }
    }
}

/// 手写提供者的注入器包装
pub struct FactoryInjector {
    key: ComponentKey,
    model: Arc<ComponentModel>,
    provider: Box<dyn Provider>,
}

impl FactoryInjector {
    /// 包装一个 [`Provider`] 实现
    ///
    /// `model` 描述被产出的组件类型, 其类型信息必须与
    /// [`Provider::provided_type`] 一致。
    pub fn new(model: Arc<ComponentModel>, provider: Box<dyn Provider>) -> InjectionResult<Self> {
        let provided = provider.provided_type();
        if provided.id != model.type_info.id {
            return Err(InjectionError::composition(format!(
                "提供者产出类型 {} 与模型类型 {} 不一致",
                provided.name, model.type_info.name
            )));
        }
        Ok(Self {
            key: ComponentKey::Type(provided),
            model,
            provider,
        })
    }
}

impl Injector for FactoryInjector {
    fn key(&self) -> &ComponentKey {
        &self.key
    }

    fn model(&self) -> &Arc<ComponentModel> {
        &self.model
    }

    fn descriptor(&self) -> String {
        format!("FactoryInjector[{}]-", self.model.type_info.name)
    }

    fn get_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance> {
        self.provider.provide(store, into)
    }

    fn verify(&self, _store: &dyn ComponentStore) -> InjectionResult<()> {
        Ok(())
    }
}
