//! # Injector Impl
//!
//! WireCore 注入策略实现层。每种策略实现统一的
//! [`injector_abstractions::Injector`] 契约：
//!
//! - [`ConstructorInjector`] - 贪婪选择可满足构造函数
//! - [`SetterInjector`] - 前缀发现的单参 set 方法
//! - [`AnnotatedFieldInjector`] / [`AnnotatedMethodInjector`] - 注解驱动
//! - [`NamedFieldInjector`] / [`NamedMethodInjector`] / [`TypedFieldInjector`] - 允许表驱动
//! - [`CompositeInjector`] - 策略串联, [`MultiInjection`] 为标准组合
//! - [`AnnotatedStaticInjection`] - 恰好一次的静态成员注入
//! - [`ProviderAdapter`] / [`FactoryInjector`] - 工厂产出
//! - [`Reinjector`] - 对已有实例重放装饰路径
//!
//! 解析全程受线程局部的循环依赖防护保护, 成员发现确定且
//! 幂等。[`MapComponentStore`] 提供组装根与测试使用的最小
//! 存储实现。

pub mod annotated_field;
pub mod annotated_method;
pub mod composite;
pub mod constructor;
pub mod core;
pub mod iterative;
pub mod method;
pub mod multi_arg;
pub mod named_field;
pub mod named_method;
pub mod ordering;
pub mod provider;
pub mod reinjector;
pub mod selector;
pub mod setter;
pub mod statics;
pub mod store;
pub mod typed_field;

pub use annotated_field::{AnnotatedFieldInjection, AnnotatedFieldInjector, DEFAULT_INJECT_ANNOTATION};
pub use annotated_method::{AnnotatedMethodInjection, AnnotatedMethodInjector};
pub use composite::{CompositeInjection, CompositeInjector, MultiInjection};
pub use constructor::{ConstructorInjection, ConstructorInjector};
pub use core::{CyclicDependencyGuard, InjectorCore};
pub use iterative::{IterativeInjector, MemberReturnPolicy};
pub use method::{MethodInjection, MethodInjector, MethodSelection};
pub use named_field::{NamedFieldInjection, NamedFieldInjector};
pub use named_method::{NamedMethodInjection, NamedMethodInjector};
pub use provider::{FactoryInjector, Provider, ProviderAdapter, PROVIDE_METHOD};
pub use reinjector::Reinjector;
pub use selector::{MemberKindFilter, MemberSelector, SelectedMember};
pub use setter::{SetterInjection, SetterInjector};
pub use statics::{AnnotatedStaticInjection, StaticInjection, StaticsInitializedReferenceSet};
pub use store::MapComponentStore;
pub use typed_field::{TypedFieldInjection, TypedFieldInjector};
