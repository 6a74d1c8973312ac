//! 特质一致性测试
//!
//! 共用的模块图夹具：
//!
//! ```text
//! core  : trait Show; type Id; type Box<_> (fundamental); type Pair<_, _>
//! ext   : type Widget                 (依赖 core)
//! app   : 依赖 ext
//! p1/p2 : 各自的 Wrap<_> 包装类型      (依赖 ext)
//! combo : 依赖 p1, p2
//! ```


use crate::module::{ImplDecl, ImplId, ModuleDecl, ModuleId, TraitRef, TypeRef};
use crate::traits::pattern::TypePattern;

pub(super) fn id(name: &str) -> ModuleId {
    ModuleId::new(name)
}

pub(super) fn show() -> TraitRef {
    TraitRef::new("core", "Show")
}

pub(super) fn con(
    module: &str,
    name: &str,
    args: Vec<TypePattern>,
) -> TypePattern {
    TypePattern::con(TypeRef::new(module, name), args)
}

pub(super) fn named(
    module: &str,
    name: &str,
) -> TypePattern {
    con(module, name, Vec::new())
}

pub(super) fn param(name: &str) -> TypePattern {
    TypePattern::param(name)
}

pub(super) fn widget() -> TypePattern {
    named("ext", "Widget")
}

pub(super) fn boxed(inner: TypePattern) -> TypePattern {
    con("core", "Box", vec![inner])
}

/// 独立的实现声明（不放入模块图）
pub(super) fn impl_decl(
    impl_id: &str,
    owner: &str,
    trait_ref: TraitRef,
    pattern: TypePattern,
) -> ImplDecl {
    ImplDecl {
        id: ImplId::new(impl_id),
        trait_ref,
        pattern,
        owner: id(owner),
    }
}

pub(super) fn core_module() -> ModuleDecl {
    let mut core = ModuleDecl::new("core");
    core.declare_trait("Show", false);
    core.declare_type("Id", 0, false);
    core.declare_type("Box", 1, true);
    core.declare_type("Pair", 2, false);
    core
}

pub(super) fn ext_module() -> ModuleDecl {
    let mut ext = ModuleDecl::new("ext").depends_on("core");
    ext.declare_type("Widget", 0, false);
    ext
}

pub(super) fn wrapper_module(name: &str) -> ModuleDecl {
    let mut module = ModuleDecl::new(name).depends_on("ext");
    let wrap = module.declare_type("Wrap", 1, false);
    module.declare_impl(
        format!("show_{}_wrap", name).as_str(),
        show(),
        TypePattern::con(wrap, vec![widget()]),
    );
    module
}
