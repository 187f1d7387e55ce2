//! 多参数成员解析
//!
//! 构造函数与多参方法共享的逐形参解析流程：定位参数规格、
//! 补默认策略、空值检查、歧义信息富化。

use crate::core::InjectorCore;
use injector_abstractions::{ComponentStore, InjectionTarget, ParameterNameBinding};
use injector_common::{
    box_primitive, InjectionError, InjectionResult, MemberRef, ParamMeta, ResolvedArgument,
};

fn enrich_ambiguity(
    core: &InjectorCore,
    member: &MemberRef<'_>,
    error: InjectionError,
) -> InjectionError {
    match error {
        InjectionError::AmbiguousComponentResolution {
            parameter_index,
            candidates,
            ..
        } => InjectionError::AmbiguousComponentResolution {
            component: core.model().type_info.name.clone(),
            member: member.qualified_name(),
            parameter_index,
            candidates,
        },
        other => other,
    }
}

/// 解析一个成员的全部实参
///
/// `require_all` 为 `true` 时，任一无法解析的形参使整个成员
/// 解析失败；为 `false` 时该实参被整体省略（不做空值填充），
/// 假定由组合中的其他注入器消费。解析到显式空值的非可空
/// 形参报 [`InjectionError::ParameterCannotBeNull`]。
pub fn resolve_member_arguments(
    core: &InjectorCore,
    store: &dyn ComponentStore,
    member: &MemberRef<'_>,
    params: &[ParamMeta],
    into: &InjectionTarget,
    require_all: bool,
) -> InjectionResult<Vec<ResolvedArgument>> {
    let strategies = core.parameters_for(member.declaring(), member.name(), params.len())?;
    let mut arguments = Vec::with_capacity(params.len());
    let mut unsatisfied = Vec::new();

    for (index, param) in params.iter().enumerate() {
        let expected = box_primitive(&param.ty);
        let name_binding = ParameterNameBinding::new(member.name(), index, param);
        let resolver = strategies[index]
            .resolve(
                store,
                &expected,
                &name_binding,
                core.use_names(),
                param.binding.as_ref(),
            )
            .map_err(|err| enrich_ambiguity(core, member, err))?;

        if !resolver.is_resolved() {
            if require_all {
                unsatisfied.push(format!("{} ({})", name_binding.name(), expected.name));
            }
            continue;
        }

        let value = resolver
            .resolve_instance(store, into)
            .map_err(|err| enrich_ambiguity(core, member, err))?;
        if value.is_none() && !param.nullable {
            return Err(InjectionError::ParameterCannotBeNull {
                index,
                member: member.qualified_name(),
                name: name_binding.name().to_string(),
            });
        }
        arguments.push(value);
    }

    if !unsatisfied.is_empty() {
        return Err(InjectionError::UnsatisfiableDependencies {
            component: core.model().type_info.name.clone(),
            unsatisfied,
        });
    }
    Ok(arguments)
}

/// 只校验可解析性，不取出实例
///
/// 逐槽位委托 [`Parameter::verify`]，收集无法满足的形参描述
/// （`名称 (类型)`），供调用方汇总为一次性的不可满足错误。
///
/// [`Parameter::verify`]: injector_abstractions::Parameter::verify
pub fn verify_member_arguments(
    core: &InjectorCore,
    store: &dyn ComponentStore,
    member: &MemberRef<'_>,
    params: &[ParamMeta],
) -> InjectionResult<Vec<String>> {
    let strategies = core.parameters_for(member.declaring(), member.name(), params.len())?;
    let mut unsatisfied = Vec::new();

    for (index, param) in params.iter().enumerate() {
        let expected = box_primitive(&param.ty);
        let name_binding = ParameterNameBinding::new(member.name(), index, param);
        match strategies[index].verify(
            store,
            &expected,
            &name_binding,
            core.use_names(),
            param.binding.as_ref(),
        ) {
            Ok(()) => {}
            Err(InjectionError::UnsatisfiableDependencies {
                unsatisfied: mut slots,
                ..
            }) => unsatisfied.append(&mut slots),
            Err(other) => return Err(enrich_ambiguity(core, member, other)),
        }
    }
    Ok(unsatisfied)
}
