//! 组件键定义

use injector_common::{Binding, TypeInfo};
use std::fmt;

/// 组件键
///
/// 在一个容器作用域内唯一标识一次注册。注册后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKey {
    /// 按类型注册
    Type(TypeInfo),
    /// 按名称注册
    Name(String),
    /// 按类型加限定符注册
    Qualified(TypeInfo, Binding),
}

impl ComponentKey {
    /// 创建类型 `T` 的组件键
    pub fn of<T: 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    /// 创建按名称的组件键
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// 创建带限定符的组件键
    pub fn qualified<T: 'static>(binding: Binding) -> Self {
        Self::Qualified(TypeInfo::of::<T>(), binding)
    }

    /// 键关联的类型信息（按名称注册的键没有类型信息）
    pub fn type_info(&self) -> Option<&TypeInfo> {
        match self {
            ComponentKey::Type(ty) | ComponentKey::Qualified(ty, _) => Some(ty),
            ComponentKey::Name(_) => None,
        }
    }

    /// 键关联的绑定限定符
    pub fn binding(&self) -> Option<&Binding> {
        match self {
            ComponentKey::Qualified(_, binding) => Some(binding),
            _ => None,
        }
    }

    /// 键关联的名称（按名称注册或 `@Named` 限定）
    pub fn name(&self) -> Option<&str> {
        match self {
            ComponentKey::Name(name) => Some(name),
            ComponentKey::Qualified(_, Binding::Named(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKey::Type(ty) => write!(f, "{}", ty.name),
            ComponentKey::Name(name) => write!(f, "'{name}'"),
            ComponentKey::Qualified(ty, binding) => write!(f, "{}[{binding}]", ty.name),
        }
    }
}
