//! 组件存储实现
//!
//! 面向组装根和测试的最小注册表：按键登记实例、显式空值或
//! 注入器。按类型的候选列举只考察带类型信息的键（按名称的
//! 注册通过名称回退参与解析）, 返回顺序按键的显示串排序,
//! 对同一存储状态确定。

use injector_abstractions::{ComponentKey, ComponentStore, InjectionTarget, Injector};
use injector_common::{
    Binding, ComponentInstance, ComponentModel, InjectionError, InjectionResult, LifecycleResult,
    LifecycleStrategy, StartableLifecycleStrategy, TypeInfo,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

enum Registration {
    Instance {
        instance: ComponentInstance,
        model: Arc<ComponentModel>,
    },
    Null,
    Injector(Arc<dyn Injector>),
}

/// 基于 HashMap 的组件存储
pub struct MapComponentStore {
    registrations: RwLock<HashMap<ComponentKey, Registration>>,
    lifecycle: Arc<dyn LifecycleStrategy>,
}

impl Default for MapComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MapComponentStore {
    /// 创建空存储（生命周期由模型闭包驱动）
    pub fn new() -> Self {
        Self::with_lifecycle(Arc::new(StartableLifecycleStrategy))
    }

    /// 指定生命周期策略
    pub fn with_lifecycle(lifecycle: Arc<dyn LifecycleStrategy>) -> Self {
        Self {
            registrations: RwLock::new(HashMap::new()),
            lifecycle,
        }
    }

    /// 按类型登记现成实例
    pub fn register_instance<T: Send + Sync + 'static>(&self, value: T) {
        self.register_instance_with_model(
            ComponentKey::of::<T>(),
            Arc::new(value),
            ComponentModel::of::<T>().build(),
        );
    }

    /// 按名称登记现成实例
    pub fn register_named_instance<T: Send + Sync + 'static>(&self, name: impl Into<String>, value: T) {
        self.register_instance_with_model(
            ComponentKey::named(name),
            Arc::new(value),
            ComponentModel::of::<T>().build(),
        );
    }

    /// 按类型加名称限定登记现成实例
    pub fn register_named_typed<T: Send + Sync + 'static>(&self, name: impl Into<String>, value: T) {
        self.register_instance_with_model(
            ComponentKey::qualified::<T>(Binding::Named(name.into())),
            Arc::new(value),
            ComponentModel::of::<T>().build(),
        );
    }

    /// 按给定键和模型登记实例
    pub fn register_instance_with_model(
        &self,
        key: ComponentKey,
        instance: ComponentInstance,
        model: Arc<ComponentModel>,
    ) {
        tracing::debug!(key = %key, "登记组件实例");
        self.registrations
            .write()
            .insert(key, Registration::Instance { instance, model });
    }

    /// 按类型登记显式空值
    pub fn register_null<T: 'static>(&self) {
        let key = ComponentKey::of::<T>();
        tracing::debug!(key = %key, "登记显式空值");
        self.registrations.write().insert(key, Registration::Null);
    }

    /// 登记注入器, 键取自注入器自身
    pub fn register_injector(&self, injector: Arc<dyn Injector>) {
        let key = injector.key().clone();
        tracing::debug!(key = %key, strategy = %injector.descriptor(), "登记注入器");
        self.registrations
            .write()
            .insert(key, Registration::Injector(injector));
    }

    /// 校验全部注入器的依赖可满足性
    pub fn validate(&self) -> InjectionResult<()> {
        let injectors: Vec<Arc<dyn Injector>> = {
            let registrations = self.registrations.read();
            registrations
                .values()
                .filter_map(|r| match r {
                    Registration::Injector(injector) => Some(injector.clone()),
                    _ => None,
                })
                .collect()
        };
        for injector in injectors {
            injector.verify(self)?;
        }
        Ok(())
    }

    fn for_each_lifecycle(
        &self,
        op: impl Fn(&dyn LifecycleStrategy, &ComponentInstance, &ComponentModel) -> LifecycleResult<()>,
    ) -> LifecycleResult<()> {
        let registrations = self.registrations.read();
        for registration in registrations.values() {
            if let Registration::Instance { instance, model } = registration {
                if self.lifecycle.has_lifecycle(model) {
                    op(self.lifecycle.as_ref(), instance, model)?;
                }
            }
        }
        Ok(())
    }

    /// 启动所有声明了生命周期的已登记实例
    pub fn start_all(&self) -> LifecycleResult<()> {
        self.for_each_lifecycle(|strategy, instance, model| strategy.start(instance, model))
    }

    /// 停止所有声明了生命周期的已登记实例
    pub fn stop_all(&self) -> LifecycleResult<()> {
        self.for_each_lifecycle(|strategy, instance, model| strategy.stop(instance, model))
    }

    /// 销毁所有声明了生命周期的已登记实例
    pub fn dispose_all(&self) -> LifecycleResult<()> {
        self.for_each_lifecycle(|strategy, instance, model| strategy.dispose(instance, model))
    }
}

impl ComponentStore for MapComponentStore {
    fn get_component_into(
        &self,
        key: &ComponentKey,
        into: &InjectionTarget,
    ) -> InjectionResult<Option<ComponentInstance>> {
        let injector = {
            let registrations = self.registrations.read();
            match registrations.get(key) {
                Some(Registration::Instance { instance, .. }) => {
                    return Ok(Some(instance.clone()))
                }
                Some(Registration::Null) => return Ok(None),
                Some(Registration::Injector(injector)) => injector.clone(),
                None => {
                    return Err(InjectionError::composition(format!(
                        "组件未注册: {key}"
                    )))
                }
            }
        };
        // 注入器解析在读锁之外进行, 允许解析期间的递归查找
        injector.get_component_instance(self, into).map(Some)
    }

    fn candidate_keys(&self, expected: &TypeInfo, binding: Option<&Binding>) -> Vec<ComponentKey> {
        let registrations = self.registrations.read();
        let mut keys: Vec<ComponentKey> = registrations
            .keys()
            .filter(|key| {
                let type_matches = key
                    .type_info()
                    .map(|ty| ty.id == expected.id)
                    .unwrap_or(false);
                match binding {
                    Some(b) => type_matches && key.binding() == Some(b),
                    None => type_matches,
                }
            })
            .cloned()
            .collect();
        keys.sort_by_key(|key| key.to_string());
        keys
    }

    fn get_by_name(
        &self,
        name: &str,
        into: &InjectionTarget,
    ) -> InjectionResult<Option<ComponentInstance>> {
        let key = {
            let registrations = self.registrations.read();
            let named = ComponentKey::named(name);
            if registrations.contains_key(&named) {
                Some(named)
            } else {
                registrations
                    .keys()
                    .find(|key| {
                        matches!(key, ComponentKey::Qualified(_, Binding::Named(n)) if n == name)
                    })
                    .cloned()
            }
        };
        match key {
            Some(key) => self.get_component_into(&key, into),
            None => Ok(None),
        }
    }
}
