//! 静态成员注入
//!
//! 静态成员属于类型而非实例，注入必须对同一引用集恰好发生
//! 一次，与实例个数无关。实参解析在锁外完成（解析可能递归
//! 回到同一声明类型的静态注入），幂等复查与写入在按声明
//! 类型分片的进程级锁的同一临界区内进行。

use crate::core::InjectorCore;
use crate::multi_arg;
use crate::selector::{MemberKindFilter, MemberSelector, SelectedMember};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use crate::annotated_field::DEFAULT_INJECT_ANNOTATION;
use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    InvokeDecision, MonitorHandle, ParameterSpec,
};
use injector_common::{
    Characteristics, ComponentInstance, ComponentModel, InjectionError, InjectionResult, MemberId,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// 静态注入引用集
///
/// 记录已完成注入的静态成员身份。同一引用集内的成员不会被
/// 二次注入；更换引用集开启新的注入纪元。
pub struct StaticsInitializedReferenceSet {
    epoch: Uuid,
    created_at: DateTime<Utc>,
    initialized: Mutex<HashSet<MemberId>>,
}

impl Default for StaticsInitializedReferenceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticsInitializedReferenceSet {
    /// 开启新的注入纪元
    pub fn new() -> Self {
        Self {
            epoch: Uuid::new_v4(),
            created_at: Utc::now(),
            initialized: Mutex::new(HashSet::new()),
        }
    }

    /// 纪元标识
    pub fn epoch(&self) -> Uuid {
        self.epoch
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 成员是否已注入
    pub fn is_initialized(&self, member: &MemberId) -> bool {
        self.initialized.lock().contains(member)
    }

    /// 标记成员已注入
    pub fn mark_initialized(&self, member: MemberId) {
        self.initialized.lock().insert(member);
    }

    /// 清空记录，允许下一轮注入重新写入
    pub fn dispose(&self) {
        self.initialized.lock().clear();
    }
}

static CLASS_LOCKS: Lazy<DashMap<TypeId, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

fn class_lock(declaring: TypeId) -> Arc<Mutex<()>> {
    CLASS_LOCKS
        .entry(declaring)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// 注入单个静态成员
///
/// 返回 `Ok(true)` 表示本次完成了写入，`Ok(false)` 表示该成员
/// 在当前引用集内已注入过而被跳过。
pub fn inject_static_member(
    core: &InjectorCore,
    store: &dyn ComponentStore,
    member: &SelectedMember,
    into: &InjectionTarget,
    reference_set: &StaticsInitializedReferenceSet,
) -> InjectionResult<bool> {
    let member_id = member.member_id();
    if reference_set.is_initialized(&member_id) {
        tracing::trace!(member = %member.qualified_name(), "静态成员已注入, 跳过");
        return Ok(false);
    }

    // 锁外解析: 依赖构造可能递归触发同一声明类型的静态注入
    let mut arguments =
        multi_arg::resolve_member_arguments(core, store, &member.member_ref(), member.params(), into, true)?;

    let lock = class_lock(member.declaring().id);
    let _class_guard = lock.lock();
    if reference_set.is_initialized(&member_id) {
        tracing::trace!(member = %member.qualified_name(), "静态成员已被并发注入, 跳过");
        return Ok(false);
    }

    let member_ref = member.member_ref();
    let started = Instant::now();
    match core.monitor().invoking(&member_ref, None) {
        InvokeDecision::Override(_) => {}
        InvokeDecision::Proceed => {
            let invocation = match member {
                SelectedMember::Field(field) => {
                    let thunk = field.set_static.as_ref().ok_or_else(|| {
                        InjectionError::MemberMismatch {
                            member: field.qualified_name(),
                            expected: "静态字段写入闭包".into(),
                        }
                    })?;
                    thunk(arguments.pop().flatten())
                }
                SelectedMember::Method(method) => {
                    let thunk = method.invoke_static.as_ref().ok_or_else(|| {
                        InjectionError::MemberMismatch {
                            member: method.qualified_name(),
                            expected: "静态方法调用闭包".into(),
                        }
                    })?;
                    thunk(arguments).map(|_| ())
                }
            };
            invocation.map_err(|err| core.fail_invocation(&member_ref, err))?;
        }
    }
    core.monitor().invoked(&member_ref, None, started.elapsed());

    reference_set.mark_initialized(member_id);
    tracing::debug!(member = %member.qualified_name(), "静态成员注入完成");
    Ok(true)
}

/// 注解驱动的静态注入
///
/// 包装一个委托注入器：实例产出之前先在基类链上（基类在前）
/// 完成所有带注解静态成员的注入。`no_static_injection` 特征
/// 生效时整个静态阶段被跳过。
pub struct AnnotatedStaticInjection {
    core: InjectorCore,
    delegate: Box<dyn Injector>,
    annotations: Vec<String>,
    reference_set: Arc<StaticsInitializedReferenceSet>,
    enabled: bool,
}

impl AnnotatedStaticInjection {
    /// 创建静态注入包装
    pub fn new(
        core: InjectorCore,
        delegate: Box<dyn Injector>,
        annotations: Vec<String>,
        reference_set: Arc<StaticsInitializedReferenceSet>,
        enabled: bool,
    ) -> Self {
        Self {
            core,
            delegate,
            annotations,
            reference_set,
            enabled,
        }
    }

    fn inject_statics(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<()> {
        if !self.enabled {
            return Ok(());
        }
        for selector in [
            MemberSelector::ByAnnotation {
                annotations: self.annotations.clone(),
                kind: MemberKindFilter::Fields,
            },
            MemberSelector::ByAnnotation {
                annotations: self.annotations.clone(),
                kind: MemberKindFilter::Methods,
            },
        ] {
            for member in selector.select(self.core.model()) {
                if member.is_static() {
                    inject_static_member(&self.core, store, &member, into, &self.reference_set)?;
                }
            }
        }
        Ok(())
    }
}

impl Injector for AnnotatedStaticInjection {
    fn key(&self) -> &ComponentKey {
        self.delegate.key()
    }

    fn model(&self) -> &Arc<ComponentModel> {
        self.delegate.model()
    }

    fn descriptor(&self) -> String {
        format!("StaticInjector-{}", self.delegate.descriptor())
    }

    fn get_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance> {
        self.inject_statics(store, into)?;
        self.delegate.get_component_instance(store, into)
    }

    fn decorate_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
        instance: &ComponentInstance,
    ) -> InjectionResult<Option<ComponentInstance>> {
        self.inject_statics(store, into)?;
        self.delegate.decorate_component_instance(store, into, instance)
    }

    fn verify(&self, store: &dyn ComponentStore) -> InjectionResult<()> {
        self.delegate.verify(store)
    }
}

/// 注解静态注入策略工厂
///
/// 包装任意委托策略工厂；`no_static_injection` 特征生效时
/// 创建出的注入器跳过静态阶段。
pub struct StaticInjection {
    delegate: Box<dyn InjectionType>,
    annotations: Vec<String>,
    reference_set: Arc<StaticsInitializedReferenceSet>,
}

impl StaticInjection {
    /// 包装委托工厂（默认注解 `inject`）
    pub fn of(
        delegate: Box<dyn InjectionType>,
        reference_set: Arc<StaticsInitializedReferenceSet>,
    ) -> Self {
        Self {
            delegate,
            annotations: vec![DEFAULT_INJECT_ANNOTATION.into()],
            reference_set,
        }
    }

    /// 指定注解集合
    pub fn with_annotations(mut self, annotations: Vec<String>) -> Self {
        self.annotations = annotations;
        self
    }
}

impl InjectionType for StaticInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let delegate = self.delegate.create_injector(
            Arc::clone(&monitor),
            characteristics,
            key.clone(),
            Arc::clone(&model),
            specs.clone(),
        )?;
        let core = InjectorCore::new(key, model, Arc::clone(&monitor), characteristics, specs)?;
        let injector = AnnotatedStaticInjection::new(
            core,
            delegate,
            self.annotations.clone(),
            Arc::clone(&self.reference_set),
            !characteristics.no_static_injection(),
        );
        Ok(monitor.new_injector(Box::new(injector)))
    }

    fn descriptor(&self) -> &'static str {
        "StaticInjector-"
    }
}
