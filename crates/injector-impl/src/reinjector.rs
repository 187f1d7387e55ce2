//! 再注入
//!
//! 对容器中已存在的实例重新执行某个策略的装饰路径, 典型
//! 用途是在配置变更后刷新 setter / 字段槽位。再注入从不
//! 构造新实例。

use injector_abstractions::{ComponentKey, ComponentStore, InjectionTarget, Injector};
use injector_common::{ComponentInstance, InjectionError, InjectionResult};
use std::sync::Arc;

/// 再注入执行器
pub struct Reinjector {
    store: Arc<dyn ComponentStore>,
}

impl Reinjector {
    /// 绑定父容器
    pub fn new(store: Arc<dyn ComponentStore>) -> Self {
        Self { store }
    }

    /// 对已注册实例执行一次装饰
    ///
    /// 键未注册时失败；底层策略的错误原样上浮。返回装饰后的
    /// 实例（被替换时为替换值, 否则为原实例）。
    pub fn reinject(
        &self,
        key: &ComponentKey,
        injector: &dyn Injector,
    ) -> InjectionResult<ComponentInstance> {
        let into = InjectionTarget::none();
        let instance = self
            .store
            .get_component_into(key, &into)?
            .ok_or_else(|| {
                InjectionError::composition(format!("容器中不存在组件: {key}"))
            })?;
        tracing::debug!(key = %key, strategy = %injector.descriptor(), "执行再注入");
        match injector.decorate_component_instance(&*self.store, &into, &instance)? {
            Some(replaced) => Ok(replaced),
            None => Ok(instance),
        }
    }
}
