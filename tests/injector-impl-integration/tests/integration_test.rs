//! injector-impl 集中集成测试
//!
//! 覆盖注入策略族的端到端行为: 注册校验、基类链注入顺序、
//! 静态注入幂等、循环依赖防护、解析失败分类、组合注入与
//! 监视器裁决。

use injector_abstractions::{
    ComponentKey, ComponentMonitor, ComponentStore, InjectionTarget, InjectionType, Injector,
    InvokeDecision, NullComponentMonitor,
};
use injector_common::{
    Characteristics, ComponentInstance, ComponentModel, InjectionError, MemberRef, ParamMeta,
    required_arg,
};
use injector_impl::{
    AnnotatedFieldInjector, ConstructorInjector, InjectorCore, IterativeInjector,
    MapComponentStore, MemberKindFilter, MemberReturnPolicy, MemberSelector, MultiInjection,
    SetterInjector, StaticsInitializedReferenceSet,
};
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Once};

struct Gauge;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init()
            .ok();
    });
}

fn null_monitor() -> Arc<NullComponentMonitor> {
    Arc::new(NullComponentMonitor)
}

// ---------------------------------------------------------------------------
// 注册校验
// ---------------------------------------------------------------------------

#[test]
fn test_abstract_model_registration_is_rejected() {
    struct Port;
    let model = ComponentModel::of::<Port>().abstract_type().build();
    let result = AnnotatedFieldInjector::new(
        ComponentKey::of::<Port>(),
        model,
        null_monitor(),
        &Characteristics::new(),
        vec![],
        vec!["inject".into()],
        true,
        None,
    );
    match result {
        Err(InjectionError::NotConcreteRegistration { type_name }) => {
            assert_eq!(type_name, "Port");
        }
        other => panic!("期望非具体类型错误, 实际为 {:?}", other.err()),
    }
}

// ---------------------------------------------------------------------------
// 基类链注入顺序: 基类静态 -> 基类实例 -> 派生静态 -> 派生实例
// ---------------------------------------------------------------------------

static ORDER_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

struct OrderBase;
struct OrderDerived;

fn order_model() -> Arc<ComponentModel> {
    let base = ComponentModel::of::<OrderBase>()
        .static_field("baseRegistry", ParamMeta::of::<Gauge>(), vec!["inject"], |_| {
            ORDER_LOG.lock().push("base-static");
            Ok(())
        })
        .field("basePipe", ParamMeta::of::<Gauge>(), vec!["inject"], |_, _| {
            ORDER_LOG.lock().push("base-instance");
            Ok(())
        })
        .build();
    ComponentModel::of::<OrderDerived>()
        .base(base)
        .constructor(vec![], |_| {
            Ok(Arc::new(OrderDerived) as ComponentInstance)
        })
        .static_field("derivedRegistry", ParamMeta::of::<Gauge>(), vec!["inject"], |_| {
            ORDER_LOG.lock().push("derived-static");
            Ok(())
        })
        .field("derivedPipe", ParamMeta::of::<Gauge>(), vec!["inject"], |_, _| {
            ORDER_LOG.lock().push("derived-instance");
            Ok(())
        })
        .build()
}

#[test]
fn test_hierarchy_injection_order_interleaves_statics() {
    init_test_logger();
    let injector = AnnotatedFieldInjector::new(
        ComponentKey::of::<OrderDerived>(),
        order_model(),
        null_monitor(),
        &Characteristics::new(),
        vec![],
        vec!["inject".into()],
        true,
        Some(Arc::new(StaticsInitializedReferenceSet::new())),
    )
    .unwrap();
    let store = MapComponentStore::new();
    store.register_instance(Gauge);

    ORDER_LOG.lock().clear();
    injector
        .get_component_instance(&store, &InjectionTarget::none())
        .unwrap();
    assert_eq!(
        *ORDER_LOG.lock(),
        vec!["base-static", "base-instance", "derived-static", "derived-instance"]
    );
}

// ---------------------------------------------------------------------------
// 静态注入幂等: 同一引用集内恰好一次, 外部改写不被覆盖
// ---------------------------------------------------------------------------

static TOWER_KEEPER: RwLock<Option<String>> = RwLock::new(None);

struct Tower;

fn tower_model() -> Arc<ComponentModel> {
    ComponentModel::of::<Tower>()
        .constructor(vec![], |_| Ok(Arc::new(Tower) as ComponentInstance))
        .static_field("KEEPER", ParamMeta::of::<String>(), vec!["inject"], |value| {
            let text = required_arg::<String>(&[value], 0)?;
            *TOWER_KEEPER.write() = Some((*text).clone());
            Ok(())
        })
        .build()
}

fn tower_injector(reference_set: Arc<StaticsInitializedReferenceSet>) -> AnnotatedFieldInjector {
    AnnotatedFieldInjector::new(
        ComponentKey::of::<Tower>(),
        tower_model(),
        null_monitor(),
        &Characteristics::new(),
        vec![],
        vec!["inject".into()],
        true,
        Some(reference_set),
    )
    .unwrap()
}

#[test]
fn test_static_injection_is_once_per_reference_set() {
    init_test_logger();
    let store = MapComponentStore::new();
    store.register_instance("Testing".to_string());

    let reference_set = Arc::new(StaticsInitializedReferenceSet::new());
    let injector = tower_injector(reference_set.clone());
    injector
        .get_component_instance(&store, &InjectionTarget::none())
        .unwrap();
    assert_eq!(TOWER_KEEPER.read().as_deref(), Some("Testing"));

    // 外部改写后, 同一引用集内的再次实例化不得重新注入
    *TOWER_KEEPER.write() = Some("Do-Da".to_string());
    injector
        .get_component_instance(&store, &InjectionTarget::none())
        .unwrap();
    assert_eq!(TOWER_KEEPER.read().as_deref(), Some("Do-Da"));

    // 新引用集开启新纪元
    let fresh = tower_injector(Arc::new(StaticsInitializedReferenceSet::new()));
    fresh
        .get_component_instance(&store, &InjectionTarget::none())
        .unwrap();
    assert_eq!(TOWER_KEEPER.read().as_deref(), Some("Testing"));
}

// ---------------------------------------------------------------------------
// 循环依赖防护
// ---------------------------------------------------------------------------

struct Alpha;
struct Beta;

fn cyclic_store() -> MapComponentStore {
    let alpha_model = ComponentModel::of::<Alpha>()
        .constructor(vec![ParamMeta::of::<Beta>()], |args| {
            required_arg::<Beta>(&args, 0)?;
            Ok(Arc::new(Alpha) as ComponentInstance)
        })
        .build();
    let beta_model = ComponentModel::of::<Beta>()
        .constructor(vec![ParamMeta::of::<Alpha>()], |args| {
            required_arg::<Alpha>(&args, 0)?;
            Ok(Arc::new(Beta) as ComponentInstance)
        })
        .build();
    let store = MapComponentStore::new();
    store.register_injector(Arc::new(
        ConstructorInjector::new(
            ComponentKey::of::<Alpha>(),
            alpha_model,
            null_monitor(),
            &Characteristics::new(),
            vec![],
            false,
        )
        .unwrap(),
    ));
    store.register_injector(Arc::new(
        ConstructorInjector::new(
            ComponentKey::of::<Beta>(),
            beta_model,
            null_monitor(),
            &Characteristics::new(),
            vec![],
            false,
        )
        .unwrap(),
    ));
    store
}

#[test]
fn test_cyclic_dependency_reports_both_scopes() {
    init_test_logger();
    let store = cyclic_store();
    let result = store.get_component_into(&ComponentKey::of::<Alpha>(), &InjectionTarget::none());
    match result {
        Err(InjectionError::CyclicDependency { chain }) => {
            assert!(chain.contains(&"Alpha".to_string()));
            assert!(chain.contains(&"Beta".to_string()));
        }
        other => panic!("期望循环依赖错误, 实际为 {other:?}"),
    }
}

#[test]
fn test_independent_threads_resolve_concurrently() {
    struct Lone;
    let model = ComponentModel::of::<Lone>()
        .constructor(vec![], |_| Ok(Arc::new(Lone) as ComponentInstance))
        .build();
    let injector = Arc::new(
        ConstructorInjector::new(
            ComponentKey::of::<Lone>(),
            model,
            null_monitor(),
            &Characteristics::new(),
            vec![],
            false,
        )
        .unwrap(),
    );
    let store = Arc::new(MapComponentStore::new());

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let injector = injector.clone();
            let store = store.clone();
            std::thread::spawn(move || {
                injector.get_component_instance(store.as_ref(), &InjectionTarget::none())
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
}

// ---------------------------------------------------------------------------
// 解析失败分类: 零候选 vs 多候选
// ---------------------------------------------------------------------------

struct Pump;
struct Valve;

fn pump_model() -> Arc<ComponentModel> {
    ComponentModel::of::<Pump>()
        .constructor(vec![ParamMeta::of::<Valve>()], |args| {
            required_arg::<Valve>(&args, 0)?;
            Ok(Arc::new(Pump) as ComponentInstance)
        })
        .build()
}

#[test]
fn test_zero_candidates_names_type_and_member() {
    let injector = ConstructorInjector::new(
        ComponentKey::of::<Pump>(),
        pump_model(),
        null_monitor(),
        &Characteristics::new(),
        vec![],
        false,
    )
    .unwrap();
    let store = MapComponentStore::new();
    match injector.get_component_instance(&store, &InjectionTarget::none()) {
        Err(InjectionError::UnsatisfiableDependencies { component, unsatisfied }) => {
            assert_eq!(component, "Pump");
            assert_eq!(unsatisfied, vec!["valve (Valve)".to_string()]);
        }
        other => panic!("期望不可满足错误, 实际为 {other:?}"),
    }
}

#[test]
fn test_two_candidates_is_ambiguous_with_both_keys() {
    let injector = ConstructorInjector::new(
        ComponentKey::of::<Pump>(),
        pump_model(),
        null_monitor(),
        &Characteristics::new(),
        vec![],
        false,
    )
    .unwrap();
    let store = MapComponentStore::new();
    store.register_named_typed::<Valve>("intake", Valve);
    store.register_named_typed::<Valve>("exhaust", Valve);
    match injector.get_component_instance(&store, &InjectionTarget::none()) {
        Err(InjectionError::AmbiguousComponentResolution { candidates, .. }) => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates.iter().any(|c| c.contains("intake")));
            assert!(candidates.iter().any(|c| c.contains("exhaust")));
        }
        other => panic!("期望歧义错误, 实际为 {other:?}"),
    }
}

#[test]
fn test_use_names_breaks_the_tie() {
    let model = ComponentModel::of::<Pump>()
        .constructor(vec![ParamMeta::of::<Valve>().named("intake")], |args| {
            required_arg::<Valve>(&args, 0)?;
            Ok(Arc::new(Pump) as ComponentInstance)
        })
        .build();
    let injector = ConstructorInjector::new(
        ComponentKey::of::<Pump>(),
        model,
        null_monitor(),
        &Characteristics::new().with("use_names", true),
        vec![],
        false,
    )
    .unwrap();
    let store = MapComponentStore::new();
    store.register_named_typed::<Valve>("intake", Valve);
    store.register_named_typed::<Valve>("exhaust", Valve);
    assert!(injector
        .get_component_instance(&store, &InjectionTarget::none())
        .is_ok());
}

// ---------------------------------------------------------------------------
// 空值策略
// ---------------------------------------------------------------------------

struct Boiler;

#[test]
fn test_explicit_null_rejected_for_non_nullable_slot() {
    let model = ComponentModel::of::<Boiler>()
        .constructor(vec![ParamMeta::of::<Valve>()], |_| {
            Ok(Arc::new(Boiler) as ComponentInstance)
        })
        .build();
    let injector = ConstructorInjector::new(
        ComponentKey::of::<Boiler>(),
        model,
        null_monitor(),
        &Characteristics::new(),
        vec![],
        false,
    )
    .unwrap();
    let store = MapComponentStore::new();
    store.register_null::<Valve>();
    match injector.get_component_instance(&store, &InjectionTarget::none()) {
        Err(InjectionError::ParameterCannotBeNull { index, .. }) => assert_eq!(index, 0),
        other => panic!("期望空值错误, 实际为 {other:?}"),
    }
}

#[test]
fn test_explicit_null_accepted_for_nullable_slot() {
    let model = ComponentModel::of::<Boiler>()
        .constructor(vec![ParamMeta::of::<Valve>().nullable()], |args| {
            assert!(args[0].is_none());
            Ok(Arc::new(Boiler) as ComponentInstance)
        })
        .build();
    let injector = ConstructorInjector::new(
        ComponentKey::of::<Boiler>(),
        model,
        null_monitor(),
        &Characteristics::new(),
        vec![],
        false,
    )
    .unwrap();
    let store = MapComponentStore::new();
    store.register_null::<Valve>();
    assert!(injector
        .get_component_instance(&store, &InjectionTarget::none())
        .is_ok());
}

#[derive(Default)]
struct Mixer {
    saw_null: RwLock<bool>,
}

fn mixer_model(param: ParamMeta) -> Arc<ComponentModel> {
    ComponentModel::of::<Mixer>()
        .constructor(vec![], |_| Ok(Arc::new(Mixer::default()) as ComponentInstance))
        .method("setValve", vec![param], None, vec![], |target, args| {
            let mixer = target
                .downcast_ref::<Mixer>()
                .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
            *mixer.saw_null.write() = args[0].is_none();
            Ok(None)
        })
        .build()
}

fn mixer_injector(param: ParamMeta) -> SetterInjector {
    SetterInjector::new(
        ComponentKey::of::<Mixer>(),
        mixer_model(param),
        null_monitor(),
        &Characteristics::new(),
        vec![],
        "set",
        vec![],
        true,
    )
    .unwrap()
}

#[test]
fn test_explicit_null_rejected_for_non_nullable_setter() {
    init_test_logger();
    let injector = mixer_injector(ParamMeta::of::<Valve>());
    let store = MapComponentStore::new();
    store.register_null::<Valve>();
    match injector.get_component_instance(&store, &InjectionTarget::none()) {
        Err(InjectionError::ParameterCannotBeNull { index, member, name }) => {
            assert_eq!(index, 0);
            assert!(member.contains("setValve"), "成员应为 setValve: {member}");
            assert_eq!(name, "valve");
        }
        other => panic!("期望空值错误, 实际为 {other:?}"),
    }
}

#[test]
fn test_explicit_null_accepted_for_nullable_setter() {
    init_test_logger();
    let injector = mixer_injector(ParamMeta::of::<Valve>().nullable());
    let store = MapComponentStore::new();
    store.register_null::<Valve>();
    let instance = injector
        .get_component_instance(&store, &InjectionTarget::none())
        .unwrap();
    assert!(*instance.downcast::<Mixer>().unwrap().saw_null.read());
}

// ---------------------------------------------------------------------------
// 组合注入: 字段先于方法
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Gizmo {
    steps: RwLock<Vec<&'static str>>,
}

fn gizmo_injector() -> Box<dyn Injector> {
    let model = ComponentModel::of::<Gizmo>()
        .constructor(vec![], |_| {
            Ok(Arc::new(Gizmo::default()) as ComponentInstance)
        })
        .field("gauge", ParamMeta::of::<Gauge>(), vec!["inject"], |target, _| {
            let gizmo = target
                .downcast_ref::<Gizmo>()
                .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
            gizmo.steps.write().push("field");
            Ok(())
        })
        .method(
            "attachGauge",
            vec![ParamMeta::of::<Gauge>()],
            None,
            vec!["inject"],
            |target, _| {
                let gizmo = target
                    .downcast_ref::<Gizmo>()
                    .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
                gizmo.steps.write().push("method");
                Ok(None)
            },
        )
        .build();
    MultiInjection::new()
        .create_injector(
            null_monitor(),
            &Characteristics::new(),
            ComponentKey::of::<Gizmo>(),
            model,
            vec![],
        )
        .unwrap()
}

#[test]
fn test_multi_injection_runs_fields_before_methods() {
    init_test_logger();
    let store = MapComponentStore::new();
    store.register_instance(Gauge);
    let instance = gizmo_injector()
        .get_component_instance(&store, &InjectionTarget::none())
        .unwrap();
    let gizmo = instance.downcast::<Gizmo>().unwrap();
    assert_eq!(*gizmo.steps.read(), vec!["field", "method"]);
}

#[test]
fn test_composite_descriptor_orders_field_before_method() {
    let descriptor = gizmo_injector().descriptor();
    let field_at = descriptor.find("AnnotatedFieldInjector").expect("缺少字段策略");
    let method_at = descriptor.find("AnnotatedMethodInjector").expect("缺少方法策略");
    assert!(field_at < method_at, "字段策略必须排在方法策略之前: {descriptor}");
}

// ---------------------------------------------------------------------------
// 发现确定性
// ---------------------------------------------------------------------------

#[test]
fn test_member_discovery_is_identical_across_injector_instances() {
    let build = || {
        let core = InjectorCore::new(
            ComponentKey::of::<OrderDerived>(),
            order_model(),
            null_monitor(),
            &Characteristics::new(),
            vec![],
        )
        .unwrap();
        IterativeInjector::new(
            core,
            MemberSelector::ByAnnotation {
                annotations: vec!["inject".into()],
                kind: MemberKindFilter::Fields,
            },
            true,
            "AnnotatedFieldInjector",
            "@inject",
            MemberReturnPolicy::Instance,
        )
    };
    let first: Vec<String> = build().members().iter().map(|m| m.qualified_name()).collect();
    let second: Vec<String> = build().members().iter().map(|m| m.qualified_name()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

// ---------------------------------------------------------------------------
// 监视器裁决
// ---------------------------------------------------------------------------

struct VetoMonitor;

impl ComponentMonitor for VetoMonitor {
    fn invoking(
        &self,
        _member: &MemberRef<'_>,
        _instance: Option<&ComponentInstance>,
    ) -> InvokeDecision {
        InvokeDecision::Override(None)
    }
}

#[test]
fn test_monitor_override_skips_member_invocation() {
    #[derive(Default)]
    struct Silo {
        filled: RwLock<bool>,
    }
    let model = ComponentModel::of::<Silo>()
        .constructor(vec![], |_| Ok(Arc::new(Silo::default()) as ComponentInstance))
        .method(
            "setGauge",
            vec![ParamMeta::of::<Gauge>()],
            None,
            vec![],
            |target, _| {
                let silo = target
                    .downcast_ref::<Silo>()
                    .ok_or_else(|| InjectionError::composition("目标类型不符"))?;
                *silo.filled.write() = true;
                Ok(None)
            },
        )
        .build();
    let injector = SetterInjector::new(
        ComponentKey::of::<Silo>(),
        model,
        Arc::new(VetoMonitor),
        &Characteristics::new(),
        vec![],
        "set",
        vec![],
        true,
    )
    .unwrap();
    let store = MapComponentStore::new();
    store.register_instance(Gauge);
    let instance = injector
        .get_component_instance(&store, &InjectionTarget::none())
        .unwrap();
    assert!(!*instance.downcast::<Silo>().unwrap().filled.read());
}
