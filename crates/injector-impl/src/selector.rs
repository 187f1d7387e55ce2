//! 成员发现
//!
//! 从组件模型的基类链上挑选待注入成员。发现结果按
//! [`crate::ordering::rank`] 的全序排列，对同一模型确定且幂等。

use crate::ordering;
use injector_common::{ComponentModel, FieldMeta, MemberId, MemberRef, MethodMeta, ParamMeta, TypeInfo};
use std::collections::HashMap;
use std::sync::Arc;

/// 被选中的待注入成员
#[derive(Clone)]
pub enum SelectedMember {
    /// 字段
    Field(Arc<FieldMeta>),
    /// 方法
    Method(Arc<MethodMeta>),
}

impl SelectedMember {
    /// 成员名称
    pub fn name(&self) -> &str {
        match self {
            SelectedMember::Field(f) => &f.name,
            SelectedMember::Method(m) => &m.name,
        }
    }

    /// 声明类型
    pub fn declaring(&self) -> &TypeInfo {
        match self {
            SelectedMember::Field(f) => &f.declaring,
            SelectedMember::Method(m) => &m.declaring,
        }
    }

    /// 是否为静态成员
    pub fn is_static(&self) -> bool {
        match self {
            SelectedMember::Field(f) => f.is_static,
            SelectedMember::Method(m) => m.is_static,
        }
    }

    /// 成员身份标识
    pub fn member_id(&self) -> MemberId {
        match self {
            SelectedMember::Field(f) => f.member_id(),
            SelectedMember::Method(m) => m.member_id(),
        }
    }

    /// 限定名称
    pub fn qualified_name(&self) -> String {
        match self {
            SelectedMember::Field(f) => f.qualified_name(),
            SelectedMember::Method(m) => m.qualified_name(),
        }
    }

    /// 成员的形参元数据（字段视为单形参成员）
    pub fn params(&self) -> &[ParamMeta] {
        match self {
            SelectedMember::Field(f) => std::slice::from_ref(&f.param),
            SelectedMember::Method(m) => &m.params,
        }
    }

    /// 诊断用成员引用
    pub fn member_ref(&self) -> MemberRef<'_> {
        match self {
            SelectedMember::Field(f) => MemberRef::Field(f),
            SelectedMember::Method(m) => MemberRef::Method(m),
        }
    }
}

/// 成员种类过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKindFilter {
    /// 只选字段
    Fields,
    /// 只选单参方法
    Methods,
}

/// 成员选择器
///
/// 闭合的发现策略集合；每个逐成员注入策略持有一个选择器。
#[derive(Clone)]
pub enum MemberSelector {
    /// 按标记注解选择
    ByAnnotation {
        /// 接受的注解集合
        annotations: Vec<String>,
        /// 成员种类
        kind: MemberKindFilter,
    },
    /// 按成员名称选择
    ByName {
        /// 接受的名称集合
        names: Vec<String>,
        /// 成员种类
        kind: MemberKindFilter,
    },
    /// 按字段声明类型名称选择
    ByTypeName {
        /// 接受的类型名称集合
        type_names: Vec<String>,
    },
    /// 按方法名前缀选择单参 set 方法
    ///
    /// 前缀之后必须紧跟一个大写字母，静态方法与排除表中的
    /// 方法不参与。
    ByPrefix {
        /// 方法名前缀，如 `set`
        prefix: String,
        /// 排除的方法名
        exclusions: Vec<String>,
    },
}

impl MemberSelector {
    /// 在模型的基类链上发现成员
    pub fn select(&self, model: &ComponentModel) -> Vec<SelectedMember> {
        let mut ordered: Vec<((usize, bool, usize), SelectedMember)> = Vec::new();

        match self {
            MemberSelector::ByAnnotation {
                annotations,
                kind: MemberKindFilter::Fields,
            } => {
                for_each_field(model, |depth, index, field| {
                    if field.has_any_annotation(annotations) {
                        ordered.push((
                            ordering::rank(depth, field.is_static, index),
                            SelectedMember::Field(field.clone()),
                        ));
                    }
                });
            }
            MemberSelector::ByAnnotation {
                annotations,
                kind: MemberKindFilter::Methods,
            } => {
                for (depth, index, method) in annotated_methods(model, annotations) {
                    if method.params.len() == 1 {
                        ordered.push((
                            ordering::rank(depth, method.is_static, index),
                            SelectedMember::Method(method),
                        ));
                    }
                }
            }
            MemberSelector::ByName {
                names,
                kind: MemberKindFilter::Fields,
            } => {
                for_each_field(model, |depth, index, field| {
                    if names.iter().any(|n| n == &field.name) {
                        ordered.push((
                            ordering::rank(depth, field.is_static, index),
                            SelectedMember::Field(field.clone()),
                        ));
                    }
                });
            }
            MemberSelector::ByName {
                names,
                kind: MemberKindFilter::Methods,
            } => {
                for_each_method(model, |depth, index, method| {
                    if method.params.len() == 1 && matches_method_name(names, &method.name) {
                        ordered.push((
                            ordering::rank(depth, method.is_static, index),
                            SelectedMember::Method(method.clone()),
                        ));
                    }
                });
            }
            MemberSelector::ByTypeName { type_names } => {
                for_each_field(model, |depth, index, field| {
                    if type_names.iter().any(|n| n == &field.param.ty.name) {
                        ordered.push((
                            ordering::rank(depth, field.is_static, index),
                            SelectedMember::Field(field.clone()),
                        ));
                    }
                });
            }
            MemberSelector::ByPrefix { prefix, exclusions } => {
                for_each_method(model, |depth, index, method| {
                    if !method.is_static
                        && method.params.len() == 1
                        && is_prefixed_setter(&method.name, prefix)
                        && !exclusions.iter().any(|e| e == &method.name)
                    {
                        ordered.push((
                            ordering::rank(depth, false, index),
                            SelectedMember::Method(method.clone()),
                        ));
                    }
                });
            }
        }

        ordered.sort_by(|a, b| a.0.cmp(&b.0));
        ordered.into_iter().map(|(_, member)| member).collect()
    }
}

fn for_each_field(model: &ComponentModel, mut f: impl FnMut(usize, usize, &Arc<FieldMeta>)) {
    for (depth, class) in model.hierarchy().into_iter().enumerate() {
        for (index, field) in class.fields.iter().enumerate() {
            f(depth, index, field);
        }
    }
}

fn for_each_method(model: &ComponentModel, mut f: impl FnMut(usize, usize, &Arc<MethodMeta>)) {
    for (depth, class) in model.hierarchy().into_iter().enumerate() {
        for (index, method) in class.methods.iter().enumerate() {
            f(depth, index, method);
        }
    }
}

/// 前缀匹配：前缀后必须紧跟大写字母
fn is_prefixed_setter(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}

/// 名称匹配：直接命中，或命中 `set` 前缀剥离后的属性名
fn matches_method_name(names: &[String], method: &str) -> bool {
    if names.iter().any(|n| n == method) {
        return true;
    }
    match method.strip_prefix("set") {
        Some(rest) if rest.chars().next().map(char::is_uppercase).unwrap_or(false) => {
            let mut chars = rest.chars();
            let property = match chars.next() {
                Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
                None => return false,
            };
            names.iter().any(|n| n == &property)
        }
        _ => false,
    }
}

/// 带覆盖抑制的注解方法发现
///
/// 基类链上同签名的实例方法以最派生的声明为准：派生类重新
/// 声明而未标注时，基类的标注被抑制。静态方法不参与覆盖。
/// 返回 (深度, 声明下标, 方法) 且已按注入顺序排列。
pub(crate) fn annotated_methods(
    model: &ComponentModel,
    annotations: &[String],
) -> Vec<(usize, usize, Arc<MethodMeta>)> {
    let mut by_signature: HashMap<String, (usize, usize, Arc<MethodMeta>)> = HashMap::new();
    let mut selected: Vec<(usize, usize, Arc<MethodMeta>)> = Vec::new();

    for (depth, class) in model.hierarchy().into_iter().enumerate() {
        for (index, method) in class.methods.iter().enumerate() {
            if method.is_static {
                if method.has_any_annotation(annotations) {
                    selected.push((depth, index, method.clone()));
                }
            } else {
                by_signature.insert(method.signature(), (depth, index, method.clone()));
            }
        }
    }
    selected.extend(
        by_signature
            .into_values()
            .filter(|(_, _, m)| m.has_any_annotation(annotations)),
    );
    selected.sort_by_key(|(depth, index, m)| ordering::rank(*depth, m.is_static, *index));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use injector_common::{ComponentInstance, InjectionResult, ResolvedArgument};

    struct Base;
    struct Derived;
    struct Radiator;

    fn noop_invoke(
        _: &(dyn std::any::Any + Send + Sync),
        _: Vec<ResolvedArgument>,
    ) -> InjectionResult<Option<ComponentInstance>> {
        Ok(None)
    }

    fn hierarchy_model() -> Arc<ComponentModel> {
        let base = ComponentModel::of::<Base>()
            .static_field("REGISTRY", ParamMeta::of::<String>(), vec!["inject"], |_| Ok(()))
            .field("baseSlot", ParamMeta::of::<Radiator>(), vec!["inject"], |_, _| Ok(()))
            .build();
        ComponentModel::of::<Derived>()
            .base(base)
            .static_field("COUNTER", ParamMeta::of::<i32>(), vec!["inject"], |_| Ok(()))
            .field("derivedSlot", ParamMeta::of::<Radiator>(), vec!["inject"], |_, _| Ok(()))
            .build()
    }

    #[test]
    fn test_annotated_fields_follow_hierarchy_order() {
        let selector = MemberSelector::ByAnnotation {
            annotations: vec!["inject".into()],
            kind: MemberKindFilter::Fields,
        };
        let names: Vec<String> = selector
            .select(&hierarchy_model())
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["REGISTRY", "baseSlot", "COUNTER", "derivedSlot"]);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let selector = MemberSelector::ByAnnotation {
            annotations: vec!["inject".into()],
            kind: MemberKindFilter::Fields,
        };
        let model = hierarchy_model();
        let first: Vec<String> = selector.select(&model).iter().map(|m| m.qualified_name()).collect();
        let second: Vec<String> = selector.select(&model).iter().map(|m| m.qualified_name()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_prefix_selection_requires_uppercase_continuation() {
        let model = ComponentModel::of::<Derived>()
            .method("setRadiator", vec![ParamMeta::of::<Radiator>()], None, vec![], noop_invoke)
            .method("settle", vec![ParamMeta::of::<Radiator>()], None, vec![], noop_invoke)
            .method("setName", vec![ParamMeta::of::<String>()], None, vec![], noop_invoke)
            .build();
        let selector = MemberSelector::ByPrefix {
            prefix: "set".into(),
            exclusions: vec!["setName".into()],
        };
        let names: Vec<String> = selector
            .select(&model)
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["setRadiator"]);
    }

    #[test]
    fn test_override_without_annotation_suppresses_base_method() {
        let base = ComponentModel::of::<Base>()
            .method(
                "wire",
                vec![ParamMeta::of::<Radiator>()],
                None,
                vec!["inject"],
                noop_invoke,
            )
            .build();
        let derived = ComponentModel::of::<Derived>()
            .base(base)
            .method("wire", vec![ParamMeta::of::<Radiator>()], None, vec![], noop_invoke)
            .build();
        let selector = MemberSelector::ByAnnotation {
            annotations: vec!["inject".into()],
            kind: MemberKindFilter::Methods,
        };
        assert!(selector.select(&derived).is_empty());
    }

    #[test]
    fn test_named_method_selection_accepts_property_names() {
        let model = ComponentModel::of::<Derived>()
            .method("setRadiator", vec![ParamMeta::of::<Radiator>()], None, vec![], noop_invoke)
            .method("attach", vec![ParamMeta::of::<Radiator>()], None, vec![], noop_invoke)
            .build();
        let selector = MemberSelector::ByName {
            names: vec!["radiator".into(), "attach".into()],
            kind: MemberKindFilter::Methods,
        };
        let names: Vec<String> = selector
            .select(&model)
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["setRadiator", "attach"]);
    }

    #[test]
    fn test_typed_field_selection() {
        let model = ComponentModel::of::<Derived>()
            .field("radiator", ParamMeta::of::<Radiator>(), vec![], |_, _| Ok(()))
            .field("label", ParamMeta::of::<String>(), vec![], |_, _| Ok(()))
            .build();
        let selector = MemberSelector::ByTypeName {
            type_names: vec!["Radiator".into()],
        };
        let names: Vec<String> = selector
            .select(&model)
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["radiator"]);
    }
}
