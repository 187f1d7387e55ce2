//! 错误类型定义

use thiserror::Error;

/// 依赖注入错误类型
///
/// 注入器核心的完整错误分类。注册期错误（如非具体类型）不可恢复，
/// 解析期错误携带足够的上下文用于自诊断组合问题。
#[derive(Error, Debug)]
pub enum InjectionError {
    #[error("组件实现不是具体类型，无法注册: {type_name}")]
    NotConcreteRegistration { type_name: String },

    #[error("参数规格无效: 第 {index} 个条目, 原因: {reason}")]
    InvalidParameterSpec { index: usize, reason: String },

    #[error("依赖无法满足: {component}, 未满足的成员: {unsatisfied:?}")]
    UnsatisfiableDependencies {
        component: String,
        unsatisfied: Vec<String>,
    },

    #[error(
        "依赖解析歧义: {component} 的成员 {member} 第 {parameter_index} 个参数存在多个候选: {candidates:?}"
    )]
    AmbiguousComponentResolution {
        component: String,
        member: String,
        parameter_index: usize,
        candidates: Vec<String>,
    },

    #[error("参数不允许为空: 成员 {member} 第 {index} 个参数 ({name}) 解析结果为空")]
    ParameterCannotBeNull {
        index: usize,
        member: String,
        name: String,
    },

    #[error("检测到循环依赖: {chain:?}")]
    CyclicDependency { chain: Vec<String> },

    #[error("成员类型不匹配: {member}, 期望 {expected}")]
    MemberMismatch { member: String, expected: String },

    #[error("组件实例化失败: {type_name}, 原因: {source}")]
    InstantiationFailed {
        type_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("成员调用失败: {member}, 原因: {source}")]
    InvocationFailed {
        member: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("组件装配失败: {message}")]
    CompositionFailed { message: String },
}

impl InjectionError {
    /// 创建装配失败错误
    pub fn composition(message: impl Into<String>) -> Self {
        Self::CompositionFailed {
            message: message.into(),
        }
    }

    /// 是否为循环依赖错误
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::CyclicDependency { .. })
    }
}

/// 生命周期管理错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("组件启动失败: {component}, 原因: {message}")]
    StartFailed { component: String, message: String },

    #[error("组件停止失败: {component}, 原因: {message}")]
    StopFailed { component: String, message: String },

    #[error("组件销毁失败: {component}, 原因: {message}")]
    DisposeFailed { component: String, message: String },

    #[error("组件不支持生命周期管理: {component}")]
    NotSupported { component: String },
}

/// 结果类型别名
pub type InjectionResult<T> = Result<T, InjectionError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;
