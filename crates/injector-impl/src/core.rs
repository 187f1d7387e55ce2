//! 注入器公共基座
//!
//! 所有注入策略共享的状态与校验逻辑：组件键、组件模型、
//! 监视器、参数规格表，以及线程局部的循环依赖防护。

use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentParameter, MonitorHandle, Parameter, ParameterSpec,
};
use injector_common::{
    Characteristics, ComponentModel, InjectionError, InjectionResult, MemberRef, TypeInfo,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 注入器公共基座
///
/// 创建时校验注册合法性：组件模型必须是具体类型，
/// 参数规格不得为空条目、不得重复指向同一成员。
pub struct InjectorCore {
    key: ComponentKey,
    model: Arc<ComponentModel>,
    monitor: MonitorHandle,
    use_names: bool,
    specs: Vec<ParameterSpec>,
}

impl InjectorCore {
    /// 创建基座并校验注册合法性
    pub fn new(
        key: ComponentKey,
        model: Arc<ComponentModel>,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Self> {
        if !model.is_concrete() {
            return Err(InjectionError::NotConcreteRegistration {
                type_name: model.type_info.name.clone(),
            });
        }
        for (index, spec) in specs.iter().enumerate() {
            if spec.parameters.is_empty() {
                return Err(InjectionError::InvalidParameterSpec {
                    index,
                    reason: "参数列表为空".into(),
                });
            }
            let duplicated = specs[..index].iter().any(|earlier| {
                earlier.target_member == spec.target_member
                    && earlier.target_declaring.as_ref().map(|t| t.id)
                        == spec.target_declaring.as_ref().map(|t| t.id)
            });
            if duplicated {
                return Err(InjectionError::InvalidParameterSpec {
                    index,
                    reason: format!("重复指向成员 {}", spec.target_member),
                });
            }
        }
        tracing::debug!(
            component = %model.type_info.name,
            key = %key,
            spec_count = specs.len(),
            "注入器基座创建完成"
        );
        Ok(Self {
            key,
            model,
            monitor,
            use_names: characteristics.use_names(),
            specs,
        })
    }

    /// 组件键
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// 组件模型
    pub fn model(&self) -> &Arc<ComponentModel> {
        &self.model
    }

    /// 监视器
    pub fn monitor(&self) -> &MonitorHandle {
        &self.monitor
    }

    /// 是否启用按名称解析
    pub fn use_names(&self) -> bool {
        self.use_names
    }

    /// 查找目标成员的参数规格
    ///
    /// 优先匹配声明类型限定的规格，找不到时回退到不限定声明类型的兜底规格。
    pub fn spec_for(&self, declaring: &TypeInfo, member: &str) -> Option<&ParameterSpec> {
        self.specs
            .iter()
            .find(|spec| spec.target_declaring.is_some() && spec.matches(declaring, member))
            .or_else(|| {
                self.specs
                    .iter()
                    .find(|spec| spec.target_declaring.is_none() && spec.matches(declaring, member))
            })
    }

    /// 为目标成员生成逐形参的解析策略列表
    ///
    /// 规格缺省的形参补默认的 [`ComponentParameter`]；
    /// 规格条目多于形参数量视为配置错误。
    pub fn parameters_for(
        &self,
        declaring: &TypeInfo,
        member: &str,
        arity: usize,
    ) -> InjectionResult<Vec<Arc<dyn Parameter>>> {
        let mut parameters: Vec<Arc<dyn Parameter>> = match self.spec_for(declaring, member) {
            Some(spec) => {
                if spec.parameters.len() > arity {
                    return Err(InjectionError::InvalidParameterSpec {
                        index: arity,
                        reason: format!(
                            "成员 {member} 只有 {arity} 个形参, 规格给出了 {} 个",
                            spec.parameters.len()
                        ),
                    });
                }
                spec.parameters.clone()
            }
            None => Vec::new(),
        };
        while parameters.len() < arity {
            parameters.push(ComponentParameter::default_parameter());
        }
        Ok(parameters)
    }

    /// 实例化失败的监视器上报
    pub fn fail_instantiation(&self, error: InjectionError) -> InjectionError {
        self.monitor.instantiation_failed(&self.model, &error);
        error
    }

    /// 成员调用失败的监视器上报
    pub fn fail_invocation(&self, member: &MemberRef<'_>, error: InjectionError) -> InjectionError {
        self.monitor.invocation_failed(member, &error);
        error
    }
}

static GUARD_IDS: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static OBSERVED_GUARDS: RefCell<HashSet<u64>> = RefCell::new(HashSet::new());
}

/// 循环依赖防护
///
/// 每个注入器入口持有一个防护实例。同一线程上对同一防护的
/// 重入视为循环依赖；独立线程互不干扰。退出路径（包括错误
/// 上浮）必然清除标记。
pub struct CyclicDependencyGuard {
    id: u64,
}

impl Default for CyclicDependencyGuard {
    fn default() -> Self {
        Self::new()
    }
}

struct ObservationReset {
    id: u64,
}

impl Drop for ObservationReset {
    fn drop(&mut self) {
        OBSERVED_GUARDS.with(|set| {
            set.borrow_mut().remove(&self.id);
        });
    }
}

impl CyclicDependencyGuard {
    /// 创建独立的防护实例
    pub fn new() -> Self {
        Self {
            id: GUARD_IDS.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// 在防护下执行解析
    ///
    /// 重入时返回 [`InjectionError::CyclicDependency`]，链上记录
    /// 当前作用域；下层上浮的循环依赖错误会被追加当前作用域名称。
    pub fn observe<T>(
        &self,
        scope: &TypeInfo,
        f: impl FnOnce() -> InjectionResult<T>,
    ) -> InjectionResult<T> {
        let entered = OBSERVED_GUARDS.with(|set| set.borrow_mut().insert(self.id));
        if !entered {
            return Err(InjectionError::CyclicDependency {
                chain: vec![scope.name.clone()],
            });
        }
        let _reset = ObservationReset { id: self.id };
        match f() {
            Err(InjectionError::CyclicDependency { mut chain }) => {
                if chain.last() != Some(&scope.name) {
                    chain.push(scope.name.clone());
                }
                Err(InjectionError::CyclicDependency { chain })
            }
            other => other,
        }
    }
}
