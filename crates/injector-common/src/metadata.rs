//! 元数据定义
//!
//! 组件的静态元数据表在注册时构建，替代运行时反射：
//! 每个组件以 [`ComponentModel`] 描述自己的构造函数、字段、方法
//! 以及基类链，注入器只面向这些元数据工作。

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::errors::{InjectionError, InjectionResult, LifecycleResult};

/// 组件实例的类型擦除句柄
pub type ComponentInstance = Arc<dyn Any + Send + Sync>;

/// 已解析的注入参数
///
/// `None` 表示显式解析为空值，仅对标记为可空的槽位合法。
pub type ResolvedArgument = Option<ComponentInstance>;

/// 构造函数调用闭包
pub type ConstructThunk =
    Arc<dyn Fn(Vec<ResolvedArgument>) -> InjectionResult<ComponentInstance> + Send + Sync>;

/// 实例字段写入闭包（组件内部通过内部可变性承接注入值）
pub type FieldSetThunk =
    Arc<dyn Fn(&(dyn Any + Send + Sync), ResolvedArgument) -> InjectionResult<()> + Send + Sync>;

/// 静态字段写入闭包
pub type StaticSetThunk = Arc<dyn Fn(ResolvedArgument) -> InjectionResult<()> + Send + Sync>;

/// 实例方法调用闭包，返回值为方法自身的返回值（无返回值时为 `None`）
pub type MethodInvokeThunk = Arc<
    dyn Fn(&(dyn Any + Send + Sync), Vec<ResolvedArgument>) -> InjectionResult<Option<ComponentInstance>>
        + Send
        + Sync,
>;

/// 静态方法调用闭包
pub type StaticInvokeThunk =
    Arc<dyn Fn(Vec<ResolvedArgument>) -> InjectionResult<Option<ComponentInstance>> + Send + Sync>;

/// 生命周期操作闭包
pub type LifecycleThunk =
    Arc<dyn Fn(&(dyn Any + Send + Sync)) -> LifecycleResult<()> + Send + Sync>;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 模块路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>()
                .split("::")
                .last()
                .unwrap_or("Unknown")
                .to_string(),
            id: TypeId::of::<T>(),
            module_path: std::any::type_name::<T>().to_string(),
        }
    }

    /// 从类型名称创建类型信息（类型ID 由 [`box_primitive`] 等规范化步骤补全）
    pub fn from_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: TypeId::of::<()>(),
            module_path: name.to_string(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        self.name.split("::").last().unwrap_or(&self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 基本类型规范化
///
/// 将 8 种基本类型的名称映射到携带真实 `TypeId` 的规范形式，
/// 使按名称构建的 [`TypeInfo`] 与按类型构建的在按类型查找时一致。
pub fn box_primitive(ty: &TypeInfo) -> TypeInfo {
    match ty.name.as_str() {
        "bool" => TypeInfo::of::<bool>(),
        "char" => TypeInfo::of::<char>(),
        "i8" => TypeInfo::of::<i8>(),
        "i16" => TypeInfo::of::<i16>(),
        "i32" => TypeInfo::of::<i32>(),
        "i64" => TypeInfo::of::<i64>(),
        "f32" => TypeInfo::of::<f32>(),
        "f64" => TypeInfo::of::<f64>(),
        _ => ty.clone(),
    }
}

/// 组件类型分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// 具体类型，可实例化
    Concrete,
    /// 抽象类型，仅作为基类参与元数据继承
    Abstract,
    /// 接口类型，仅描述契约
    Interface,
}

/// 绑定限定符，用于在同类型候选间消除歧义
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    /// 按名称绑定
    Named(String),
    /// 自定义限定符
    Qualifier(&'static str),
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Named(name) => write!(f, "@Named({name})"),
            Binding::Qualifier(q) => write!(f, "@{q}"),
        }
    }
}

/// 成员种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
}

/// 成员身份标识，用于静态注入的幂等记录
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberId {
    /// 声明类型的 `TypeId`
    pub declaring: TypeId,
    /// 成员种类
    pub kind: MemberKind,
    /// 成员名称
    pub name: String,
}

/// 形参元数据
#[derive(Clone)]
pub struct ParamMeta {
    /// 期望的参数类型
    pub ty: TypeInfo,
    /// 形参名称（用于按名称消歧）
    pub name: Option<String>,
    /// 是否允许解析为空值
    pub nullable: bool,
    /// 绑定限定符
    pub binding: Option<Binding>,
}

impl ParamMeta {
    /// 创建指向类型 `T` 的形参元数据
    pub fn of<T: 'static>() -> Self {
        Self {
            ty: TypeInfo::of::<T>(),
            name: None,
            nullable: false,
            binding: None,
        }
    }

    /// 设置形参名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 标记为可空
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// 设置绑定限定符
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }
}

impl fmt::Debug for ParamMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamMeta")
            .field("ty", &self.ty.name)
            .field("name", &self.name)
            .field("nullable", &self.nullable)
            .field("binding", &self.binding)
            .finish()
    }
}

/// 构造函数元数据
#[derive(Clone)]
pub struct ConstructorMeta {
    /// 形参列表
    pub params: Vec<ParamMeta>,
    /// 构造闭包
    pub construct: ConstructThunk,
}

impl ConstructorMeta {
    /// 构造函数签名的可读形式
    pub fn signature(&self, declaring: &TypeInfo) -> String {
        let types: Vec<&str> = self.params.iter().map(|p| p.ty.name.as_str()).collect();
        format!("{}({})", declaring.name, types.join(", "))
    }
}

impl fmt::Debug for ConstructorMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorMeta")
            .field("params", &self.params)
            .field("construct", &"<thunk>")
            .finish()
    }
}

/// 字段元数据
#[derive(Clone)]
pub struct FieldMeta {
    /// 字段名称
    pub name: String,
    /// 声明类型
    pub declaring: TypeInfo,
    /// 字段槽位的形参元数据
    pub param: ParamMeta,
    /// 是否为静态字段
    pub is_static: bool,
    /// 标记注解集合（默认注入注解为 `"inject"`）
    pub annotations: Vec<String>,
    /// 实例字段写入闭包
    pub set: Option<FieldSetThunk>,
    /// 静态字段写入闭包
    pub set_static: Option<StaticSetThunk>,
}

impl FieldMeta {
    /// 成员身份标识
    pub fn member_id(&self) -> MemberId {
        MemberId {
            declaring: self.declaring.id,
            kind: MemberKind::Field,
            name: self.name.clone(),
        }
    }

    /// 限定名称，如 `OrderBase.something`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring.short_name(), self.name)
    }

    /// 是否携带给定注解之一
    pub fn has_any_annotation(&self, annotations: &[String]) -> bool {
        self.annotations.iter().any(|a| annotations.contains(a))
    }
}

impl fmt::Debug for FieldMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMeta")
            .field("name", &self.name)
            .field("declaring", &self.declaring.name)
            .field("is_static", &self.is_static)
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// 方法元数据
#[derive(Clone)]
pub struct MethodMeta {
    /// 方法名称
    pub name: String,
    /// 声明类型
    pub declaring: TypeInfo,
    /// 形参列表
    pub params: Vec<ParamMeta>,
    /// 返回值类型（无返回值时为 `None`）
    pub returns: Option<TypeInfo>,
    /// 是否为静态方法
    pub is_static: bool,
    /// 标记注解集合
    pub annotations: Vec<String>,
    /// 实例方法调用闭包
    pub invoke: Option<MethodInvokeThunk>,
    /// 静态方法调用闭包
    pub invoke_static: Option<StaticInvokeThunk>,
}

impl MethodMeta {
    /// 成员身份标识
    pub fn member_id(&self) -> MemberId {
        MemberId {
            declaring: self.declaring.id,
            kind: MemberKind::Method,
            name: self.name.clone(),
        }
    }

    /// 限定名称，如 `Engine.setGearbox`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring.short_name(), self.name)
    }

    /// 方法签名键（名称 + 形参类型），用于基类链上的覆盖判定
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.params.iter().map(|p| p.ty.name.as_str()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// 是否携带给定注解之一
    pub fn has_any_annotation(&self, annotations: &[String]) -> bool {
        self.annotations.iter().any(|a| annotations.contains(a))
    }
}

impl fmt::Debug for MethodMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodMeta")
            .field("name", &self.name)
            .field("declaring", &self.declaring.name)
            .field("params", &self.params)
            .field("is_static", &self.is_static)
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// 成员引用，用于诊断信息和监控回调
#[derive(Debug, Clone)]
pub enum MemberRef<'a> {
    Field(&'a FieldMeta),
    Method(&'a MethodMeta),
    Constructor(&'a ConstructorMeta, &'a TypeInfo),
}

impl MemberRef<'_> {
    /// 限定名称
    pub fn qualified_name(&self) -> String {
        match self {
            MemberRef::Field(f) => f.qualified_name(),
            MemberRef::Method(m) => m.qualified_name(),
            MemberRef::Constructor(c, declaring) => c.signature(declaring),
        }
    }

    /// 声明类型
    pub fn declaring(&self) -> &TypeInfo {
        match self {
            MemberRef::Field(f) => &f.declaring,
            MemberRef::Method(m) => &m.declaring,
            MemberRef::Constructor(_, declaring) => declaring,
        }
    }

    /// 成员名称
    pub fn name(&self) -> &str {
        match self {
            MemberRef::Field(f) => &f.name,
            MemberRef::Method(m) => &m.name,
            MemberRef::Constructor(..) => "constructor",
        }
    }
}

impl fmt::Display for MemberRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// 生命周期操作闭包集合
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    /// 启动
    pub start: Option<LifecycleThunk>,
    /// 停止
    pub stop: Option<LifecycleThunk>,
    /// 销毁
    pub dispose: Option<LifecycleThunk>,
}

impl LifecycleHooks {
    /// 是否定义了任一生命周期操作
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && self.dispose.is_none()
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("start", &self.start.is_some())
            .field("stop", &self.stop.is_some())
            .field("dispose", &self.dispose.is_some())
            .finish()
    }
}

/// 组件模型
///
/// 一个组件实现类型的完整静态元数据表。注册后不可变，
/// 注入器对它的成员发现是幂等且稳定的。
#[derive(Debug, Clone)]
pub struct ComponentModel {
    /// 类型信息
    pub type_info: TypeInfo,
    /// 类型分类
    pub kind: TypeKind,
    /// 基类模型
    pub base: Option<Arc<ComponentModel>>,
    /// 构造函数列表（按声明顺序）
    pub constructors: Vec<Arc<ConstructorMeta>>,
    /// 字段列表（按声明顺序）
    pub fields: Vec<Arc<FieldMeta>>,
    /// 方法列表（按声明顺序）
    pub methods: Vec<Arc<MethodMeta>>,
    /// 生命周期操作
    pub lifecycle: LifecycleHooks,
}

impl ComponentModel {
    /// 创建类型 `T` 的模型构建器
    pub fn of<T: 'static>() -> ComponentModelBuilder {
        ComponentModelBuilder::new(TypeInfo::of::<T>())
    }

    /// 是否为具体类型
    pub fn is_concrete(&self) -> bool {
        self.kind == TypeKind::Concrete
    }

    /// 基类链，基类在前（根基类为第一项，自身为最后一项）
    pub fn hierarchy(&self) -> Vec<&ComponentModel> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(model) = current {
            chain.push(model);
            current = model.base.as_deref();
        }
        chain.reverse();
        chain
    }

    /// 查找无参构造函数
    pub fn no_arg_constructor(&self) -> Option<&Arc<ConstructorMeta>> {
        self.constructors.iter().find(|c| c.params.is_empty())
    }
}

/// 组件模型构建器
pub struct ComponentModelBuilder {
    type_info: TypeInfo,
    kind: TypeKind,
    base: Option<Arc<ComponentModel>>,
    constructors: Vec<Arc<ConstructorMeta>>,
    fields: Vec<Arc<FieldMeta>>,
    methods: Vec<Arc<MethodMeta>>,
    lifecycle: LifecycleHooks,
}

impl ComponentModelBuilder {
    fn new(type_info: TypeInfo) -> Self {
        Self {
            type_info,
            kind: TypeKind::Concrete,
            base: None,
            constructors: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            lifecycle: LifecycleHooks::default(),
        }
    }

    /// 标记为抽象类型
    pub fn abstract_type(mut self) -> Self {
        self.kind = TypeKind::Abstract;
        self
    }

    /// 标记为接口类型
    pub fn interface_type(mut self) -> Self {
        self.kind = TypeKind::Interface;
        self
    }

    /// 设置基类模型
    pub fn base(mut self, base: Arc<ComponentModel>) -> Self {
        self.base = Some(base);
        self
    }

    /// 添加构造函数
    pub fn constructor<F>(mut self, params: Vec<ParamMeta>, construct: F) -> Self
    where
        F: Fn(Vec<ResolvedArgument>) -> InjectionResult<ComponentInstance> + Send + Sync + 'static,
    {
        self.constructors.push(Arc::new(ConstructorMeta {
            params,
            construct: Arc::new(construct),
        }));
        self
    }

    /// 添加实例字段
    pub fn field<F>(mut self, name: impl Into<String>, param: ParamMeta, annotations: Vec<&str>, set: F) -> Self
    where
        F: Fn(&(dyn Any + Send + Sync), ResolvedArgument) -> InjectionResult<()> + Send + Sync + 'static,
    {
        let name = name.into();
        self.fields.push(Arc::new(FieldMeta {
            param: param.named(name.clone()),
            name,
            declaring: self.type_info.clone(),
            is_static: false,
            annotations: annotations.into_iter().map(String::from).collect(),
            set: Some(Arc::new(set)),
            set_static: None,
        }));
        self
    }

    /// 添加静态字段
    pub fn static_field<F>(
        mut self,
        name: impl Into<String>,
        param: ParamMeta,
        annotations: Vec<&str>,
        set: F,
    ) -> Self
    where
        F: Fn(ResolvedArgument) -> InjectionResult<()> + Send + Sync + 'static,
    {
        let name = name.into();
        self.fields.push(Arc::new(FieldMeta {
            param: param.named(name.clone()),
            name,
            declaring: self.type_info.clone(),
            is_static: true,
            annotations: annotations.into_iter().map(String::from).collect(),
            set: None,
            set_static: Some(Arc::new(set)),
        }));
        self
    }

    /// 添加实例方法
    pub fn method<F>(
        mut self,
        name: impl Into<String>,
        params: Vec<ParamMeta>,
        returns: Option<TypeInfo>,
        annotations: Vec<&str>,
        invoke: F,
    ) -> Self
    where
        F: Fn(&(dyn Any + Send + Sync), Vec<ResolvedArgument>) -> InjectionResult<Option<ComponentInstance>>
            + Send
            + Sync
            + 'static,
    {
        self.methods.push(Arc::new(MethodMeta {
            name: name.into(),
            declaring: self.type_info.clone(),
            params,
            returns,
            is_static: false,
            annotations: annotations.into_iter().map(String::from).collect(),
            invoke: Some(Arc::new(invoke)),
            invoke_static: None,
        }));
        self
    }

    /// 添加静态方法
    pub fn static_method<F>(
        mut self,
        name: impl Into<String>,
        params: Vec<ParamMeta>,
        returns: Option<TypeInfo>,
        annotations: Vec<&str>,
        invoke: F,
    ) -> Self
    where
        F: Fn(Vec<ResolvedArgument>) -> InjectionResult<Option<ComponentInstance>> + Send + Sync + 'static,
    {
        self.methods.push(Arc::new(MethodMeta {
            name: name.into(),
            declaring: self.type_info.clone(),
            params,
            returns,
            is_static: true,
            annotations: annotations.into_iter().map(String::from).collect(),
            invoke: None,
            invoke_static: Some(Arc::new(invoke)),
        }));
        self
    }

    /// 设置启动操作
    pub fn on_start<F>(mut self, thunk: F) -> Self
    where
        F: Fn(&(dyn Any + Send + Sync)) -> LifecycleResult<()> + Send + Sync + 'static,
    {
        self.lifecycle.start = Some(Arc::new(thunk));
        self
    }

    /// 设置停止操作
    pub fn on_stop<F>(mut self, thunk: F) -> Self
    where
        F: Fn(&(dyn Any + Send + Sync)) -> LifecycleResult<()> + Send + Sync + 'static,
    {
        self.lifecycle.stop = Some(Arc::new(thunk));
        self
    }

    /// 设置销毁操作
    pub fn on_dispose<F>(mut self, thunk: F) -> Self
    where
        F: Fn(&(dyn Any + Send + Sync)) -> LifecycleResult<()> + Send + Sync + 'static,
    {
        self.lifecycle.dispose = Some(Arc::new(thunk));
        self
    }

    /// 完成构建
    pub fn build(self) -> Arc<ComponentModel> {
        Arc::new(ComponentModel {
            type_info: self.type_info,
            kind: self.kind,
            base: self.base,
            constructors: self.constructors,
            fields: self.fields,
            methods: self.methods,
            lifecycle: self.lifecycle,
        })
    }
}

/// 从已解析参数列表中按下标取出必需参数并转换类型
pub fn required_arg<T: Send + Sync + 'static>(
    args: &[ResolvedArgument],
    index: usize,
) -> InjectionResult<Arc<T>> {
    let slot = args.get(index).ok_or_else(|| InjectionError::CompositionFailed {
        message: format!("参数[{index}] 缺失"),
    })?;
    let instance = slot.as_ref().ok_or_else(|| InjectionError::CompositionFailed {
        message: format!("参数[{index}] 为空值"),
    })?;
    instance
        .clone()
        .downcast::<T>()
        .map_err(|_| InjectionError::CompositionFailed {
            message: format!("参数[{index}] 类型转换失败: 期望 {}", std::any::type_name::<T>()),
        })
}

/// 从已解析参数列表中按下标取出可空参数并转换类型
pub fn optional_arg<T: Send + Sync + 'static>(
    args: &[ResolvedArgument],
    index: usize,
) -> InjectionResult<Option<Arc<T>>> {
    match args.get(index) {
        None | Some(None) => Ok(None),
        Some(Some(instance)) => instance
            .clone()
            .downcast::<T>()
            .map(Some)
            .map_err(|_| InjectionError::CompositionFailed {
                message: format!("参数[{index}] 类型转换失败: 期望 {}", std::any::type_name::<T>()),
            }),
    }
}
