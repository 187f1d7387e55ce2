//! 参数解析抽象接口
//!
//! 每个形参/字段槽位由一个可插拔的 [`Parameter`] 解析策略负责，
//! 解析尝试的结果由 [`Resolver`] 表达：是否命中、延迟取值。

use crate::key::ComponentKey;
use crate::store::{ComponentStore, InjectionTarget};
use injector_common::{
    box_primitive, Binding, InjectionError, InjectionResult, ParamMeta, ResolvedArgument, TypeInfo,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// 形参名称绑定
///
/// 惰性解析形参的名称：优先使用元数据中声明的形参名，
/// 否则从期望类型派生（首字母小写的短类型名）。
pub struct ParameterNameBinding<'a> {
    member: &'a str,
    index: usize,
    param: &'a ParamMeta,
    cached: OnceCell<String>,
}

impl<'a> ParameterNameBinding<'a> {
    /// 创建名称绑定
    pub fn new(member: &'a str, index: usize, param: &'a ParamMeta) -> Self {
        Self {
            member,
            index,
            param,
            cached: OnceCell::new(),
        }
    }

    /// 所属成员名称
    pub fn member(&self) -> &str {
        self.member
    }

    /// 形参下标
    pub fn index(&self) -> usize {
        self.index
    }

    /// 解析形参名称（首次调用时计算并缓存）
    pub fn name(&self) -> &str {
        self.cached.get_or_init(|| match &self.param.name {
            Some(name) => name.clone(),
            None => decapitalize(self.param.ty.short_name()),
        })
    }
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// 单个解析尝试的结果
pub trait Resolver: Send + Sync {
    /// 解析是否命中
    fn is_resolved(&self) -> bool;

    /// 取出解析到的实例
    ///
    /// `Ok(None)` 表示解析到显式空值，仅对可空槽位合法。
    fn resolve_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ResolvedArgument>;
}

/// 参数解析策略 trait
pub trait Parameter: Send + Sync {
    /// 针对一个槽位发起解析
    fn resolve(
        &self,
        store: &dyn ComponentStore,
        expected: &TypeInfo,
        name_binding: &ParameterNameBinding<'_>,
        use_names: bool,
        binding: Option<&Binding>,
    ) -> InjectionResult<Box<dyn Resolver>>;

    /// 校验槽位可解析，但不取出实例
    ///
    /// 未命中时报 [`InjectionError::UnsatisfiableDependencies`]，
    /// `unsatisfied` 携带 `名称 (类型)` 形式的槽位描述；组件名
    /// 留空，由按成员聚合诊断的调用方补齐。
    fn verify(
        &self,
        store: &dyn ComponentStore,
        expected: &TypeInfo,
        name_binding: &ParameterNameBinding<'_>,
        use_names: bool,
        binding: Option<&Binding>,
    ) -> InjectionResult<()> {
        let resolver = self.resolve(store, expected, name_binding, use_names, binding)?;
        if resolver.is_resolved() {
            Ok(())
        } else {
            Err(InjectionError::UnsatisfiableDependencies {
                component: String::new(),
                unsatisfied: vec![format!("{} ({})", name_binding.name(), expected.name)],
            })
        }
    }
}

enum ComponentResolution {
    Unresolved,
    ByKey(ComponentKey),
    ByName(String),
}

struct ComponentResolver {
    resolution: ComponentResolution,
}

impl Resolver for ComponentResolver {
    fn is_resolved(&self) -> bool {
        !matches!(self.resolution, ComponentResolution::Unresolved)
    }

    fn resolve_instance(
        &self,
        store: &dyn ComponentStore,
        into: &InjectionTarget,
    ) -> InjectionResult<ResolvedArgument> {
        match &self.resolution {
            ComponentResolution::Unresolved => Ok(None),
            ComponentResolution::ByKey(key) => store.get_component_into(key, into),
            ComponentResolution::ByName(name) => store.get_by_name(name, into),
        }
    }
}

/// 默认的按类型解析策略
///
/// 按期望类型在存储中列出候选键：零候选时在 `use_names`
/// 开启的前提下回退到按名称查找；多候选时先尝试用形参名
/// 消歧，仍然歧义则报 [`InjectionError::AmbiguousComponentResolution`]
/// 并携带全部候选键。
#[derive(Debug, Default, Clone)]
pub struct ComponentParameter;

impl ComponentParameter {
    /// 默认实例
    pub fn default_parameter() -> Arc<dyn Parameter> {
        Arc::new(ComponentParameter)
    }
}

impl Parameter for ComponentParameter {
    fn resolve(
        &self,
        store: &dyn ComponentStore,
        expected: &TypeInfo,
        name_binding: &ParameterNameBinding<'_>,
        use_names: bool,
        binding: Option<&Binding>,
    ) -> InjectionResult<Box<dyn Resolver>> {
        let expected = box_primitive(expected);
        let candidates = store.candidate_keys(&expected, binding);

        let resolution = match candidates.len() {
            0 => {
                if use_names
                    && store
                        .get_by_name(name_binding.name(), &InjectionTarget::none())?
                        .is_some()
                {
                    ComponentResolution::ByName(name_binding.name().to_string())
                } else {
                    ComponentResolution::Unresolved
                }
            }
            1 => ComponentResolution::ByKey(candidates.into_iter().next().expect("非空候选")),
            _ => {
                let by_name: Vec<&ComponentKey> = candidates
                    .iter()
                    .filter(|key| key.name() == Some(name_binding.name()))
                    .collect();
                if use_names && by_name.len() == 1 {
                    ComponentResolution::ByKey((*by_name[0]).clone())
                } else {
                    return Err(InjectionError::AmbiguousComponentResolution {
                        component: String::new(),
                        member: name_binding.member().to_string(),
                        parameter_index: name_binding.index(),
                        candidates: candidates.iter().map(ToString::to_string).collect(),
                    });
                }
            }
        };

        Ok(Box::new(ComponentResolver { resolution }))
    }
}

struct ConstantResolver {
    value: ResolvedArgument,
}

impl Resolver for ConstantResolver {
    fn is_resolved(&self) -> bool {
        true
    }

    fn resolve_instance(
        &self,
        _store: &dyn ComponentStore,
        _into: &InjectionTarget,
    ) -> InjectionResult<ResolvedArgument> {
        Ok(self.value.clone())
    }
}

/// 常量参数策略，总是解析为预设值
#[derive(Clone)]
pub struct ConstantParameter {
    value: ResolvedArgument,
}

impl ConstantParameter {
    /// 预设给定值
    pub fn of<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
        }
    }

    /// 预设显式空值（仅对可空槽位合法）
    pub fn null() -> Self {
        Self { value: None }
    }
}

impl Parameter for ConstantParameter {
    fn resolve(
        &self,
        _store: &dyn ComponentStore,
        _expected: &TypeInfo,
        _name_binding: &ParameterNameBinding<'_>,
        _use_names: bool,
        _binding: Option<&Binding>,
    ) -> InjectionResult<Box<dyn Resolver>> {
        Ok(Box::new(ConstantResolver {
            value: self.value.clone(),
        }))
    }
}

/// 参数规格
///
/// 把一组 [`Parameter`] 策略关联到一个目标成员
/// （按声明类型 + 成员名匹配；声明类型缺省时作为不限定的兜底规格）。
#[derive(Clone)]
pub struct ParameterSpec {
    /// 目标成员的声明类型（`None` 为不限定的兜底规格）
    pub target_declaring: Option<TypeInfo>,
    /// 目标成员名称
    pub target_member: String,
    /// 按形参顺序排列的解析策略
    pub parameters: Vec<Arc<dyn Parameter>>,
}

impl ParameterSpec {
    /// 创建针对具体声明类型成员的规格
    pub fn for_member(
        declaring: TypeInfo,
        member: impl Into<String>,
        parameters: Vec<Arc<dyn Parameter>>,
    ) -> Self {
        Self {
            target_declaring: Some(declaring),
            target_member: member.into(),
            parameters,
        }
    }

    /// 创建不限定声明类型的兜底规格
    pub fn for_any(member: impl Into<String>, parameters: Vec<Arc<dyn Parameter>>) -> Self {
        Self {
            target_declaring: None,
            target_member: member.into(),
            parameters,
        }
    }

    /// 是否匹配给定成员
    pub fn matches(&self, declaring: &TypeInfo, member: &str) -> bool {
        if self.target_member != member {
            return false;
        }
        match &self.target_declaring {
            Some(target) => target.id == declaring.id,
            None => true,
        }
    }
}
