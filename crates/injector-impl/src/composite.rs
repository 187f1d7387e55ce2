//! 组合注入
//!
//! 把多个注入策略按固定顺序串联：第一个策略产出实例，
//! 其余策略依次装饰。字段策略排在方法策略之前是组合的
//! 固定约定。

use crate::annotated_field::AnnotatedFieldInjection;
use crate::annotated_method::AnnotatedMethodInjection;
use crate::constructor::ConstructorInjection;
use injector_abstractions::{
    ComponentKey, ComponentStore, InjectionTarget, InjectionType, Injector, InjectorVisitor,
    MonitorHandle, ParameterSpec,
};
use injector_common::{
    Characteristics, ComponentInstance, ComponentModel, InjectionError, InjectionResult,
};
use std::sync::Arc;

/// 组合注入器
pub struct CompositeInjector {
    injectors: Vec<Box<dyn Injector>>,
}

impl CompositeInjector {
    /// 创建组合注入器，第一个子注入器负责产出实例
    pub fn new(injectors: Vec<Box<dyn Injector>>) -> InjectionResult<Self> {
        if injectors.is_empty() {
            return Err(InjectionError::composition("组合注入器至少需要一个子注入器"));
        }
        Ok(Self { injectors })
    }
}

impl Injector for CompositeInjector {
    fn key(&self) -> &ComponentKey {
        self.injectors[0].key()
    }

    fn model(&self) -> &Arc<ComponentModel> {
        self.injectors[0].model()
    }

    fn descriptor(&self) -> String {
        let parts: Vec<String> = self
            .injectors
            .iter()
            .map(|i| i.descriptor().trim_end_matches('-').to_string())
            .collect();
        format!("CompositeInjector({})-", parts.join("+"))
    }

    fn get_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ComponentInstance> {
        let mut current = self.injectors[0].get_component_instance(store, into)?;
        for injector in &self.injectors[1..] {
            if let Some(next) = injector.decorate_component_instance(store, into, &current)? {
                current = next;
            }
        }
        Ok(current)
    }

    fn decorate_component_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
        instance: &ComponentInstance,
    ) -> InjectionResult<Option<ComponentInstance>> {
        let mut current = instance.clone();
        let mut replaced = false;
        for injector in &self.injectors {
            if let Some(next) = injector.decorate_component_instance(store, into, &current)? {
                current = next;
                replaced = true;
            }
        }
        Ok(if replaced { Some(current) } else { None })
    }

    fn verify(&self, store: &dyn ComponentStore) -> InjectionResult<()> {
        for injector in &self.injectors {
            injector.verify(store)?;
        }
        Ok(())
    }

    fn accept(&self, visitor: &mut dyn InjectorVisitor) {
        visitor.visit_injector(&self.descriptor(), self.key());
        for injector in &self.injectors {
            injector.accept(visitor);
        }
    }
}

/// 组合注入策略工厂
pub struct CompositeInjection {
    /// 子策略工厂, 顺序即注入顺序
    pub types: Vec<Box<dyn InjectionType>>,
}

impl CompositeInjection {
    /// 按给定顺序组合子策略
    pub fn of(types: Vec<Box<dyn InjectionType>>) -> Self {
        Self { types }
    }
}

impl InjectionType for CompositeInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let mut injectors = Vec::with_capacity(self.types.len());
        for (index, ty) in self.types.iter().enumerate() {
            // 参数规格交给首个子策略消费, 其余子策略按默认规格解析
            let sub_specs = if index == 0 { specs.clone() } else { Vec::new() };
            injectors.push(ty.create_injector(
                Arc::clone(&monitor),
                characteristics,
                key.clone(),
                Arc::clone(&model),
                sub_specs,
            )?);
        }
        Ok(Box::new(CompositeInjector::new(injectors)?))
    }

    fn descriptor(&self) -> &'static str {
        "CompositeInjector-"
    }
}

/// 构造函数 + 注解字段 + 注解方法的标准组合
///
/// 字段注入先于方法注入, 方法体因此可以读取已填充的字段。
#[derive(Debug, Clone)]
pub struct MultiInjection {
    /// 接受的注解集合
    pub annotations: Vec<String>,
}

impl Default for MultiInjection {
    fn default() -> Self {
        Self {
            annotations: vec![crate::annotated_field::DEFAULT_INJECT_ANNOTATION.into()],
        }
    }
}

impl MultiInjection {
    /// 默认配置（注解 `inject`）
    pub fn new() -> Self {
        Self::default()
    }
}

impl InjectionType for MultiInjection {
    fn create_injector(
        &self,
        monitor: MonitorHandle,
        characteristics: &Characteristics,
        key: ComponentKey,
        model: Arc<ComponentModel>,
        specs: Vec<ParameterSpec>,
    ) -> InjectionResult<Box<dyn Injector>> {
        let composite = CompositeInjection::of(vec![
            Box::new(ConstructorInjection::new()),
            Box::new(AnnotatedFieldInjection {
                annotations: self.annotations.clone(),
                requires_all_parameters: false,
            }),
            Box::new(AnnotatedMethodInjection {
                annotations: self.annotations.clone(),
                requires_all_parameters: false,
            }),
        ]);
        composite.create_injector(monitor, characteristics, key, model, specs)
    }

    fn descriptor(&self) -> &'static str {
        "MultiInjector-"
    }
}
