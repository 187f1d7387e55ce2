//! WireCore 依赖注入抽象层
//!
//! 定义注入核心与容器实现之间的契约：组件键、组件存储、
//! 参数解析策略、注入器与监视器。具体的注入策略实现
//! 位于 `injector-impl`。

pub mod injector;
pub mod key;
pub mod monitor;
pub mod parameter;
pub mod store;

pub use injector::{InjectionType, Injector, InjectorVisitor};
pub use key::ComponentKey;
pub use monitor::{
    ComponentMonitor, InvokeDecision, MonitorHandle, NullComponentMonitor, TracingComponentMonitor,
};
pub use parameter::{
    ComponentParameter, ConstantParameter, Parameter, ParameterNameBinding, ParameterSpec, Resolver,
};
pub use store::{ComponentStore, InjectionTarget};
