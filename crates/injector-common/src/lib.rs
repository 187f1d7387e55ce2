//! # Injector Common
//!
//! 这个 crate 提供 WireCore 注入核心的公共类型和工具。
//!
//! ## 核心组件
//!
//! - [`ComponentModel`] - 组件静态元数据表（替代运行时反射）
//! - [`InjectionError`] - 注入错误分类
//! - [`LifecycleStrategy`] - 组件生命周期策略
//! - [`Characteristics`] - 注入特征配置
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 注册时构建静态元数据，运行时零反射
//! - 同步解析，错误即时上浮

pub mod characteristics;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use characteristics::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
