//! Rewriting of implicit `super()` delegations.
//!
//! A constructor without an explicit delegation target is parsed with a
//! `super()` call constructing the root placeholder. Once the transformer
//! knows the class's effective superclass, every such call is pointed at it.

use crate::ast::{
    CalleeReference, ClassDeclaration, ConstructorDeclaration, Declaration,
    DelegatedConstructorCall, ResolvedTypeRef, TypeRef,
};
use tracing::trace;

pub struct DelegatedConstructorRewriter<'a> {
    super_class: &'a ResolvedTypeRef,
}

impl<'a> DelegatedConstructorRewriter<'a> {
    pub fn new(super_class: &'a ResolvedTypeRef) -> Self {
        Self { super_class }
    }

    /// Rewrite the constructors declared directly in `class`. Nested classes
    /// are left for their own pass. Returns the number of calls rewritten.
    pub fn rewrite_class(&self, class: &mut ClassDeclaration) -> usize {
        let mut rewritten = 0;
        for declaration in &mut class.declarations {
            if let Declaration::Constructor(constructor) = declaration
                && self.rewrite_constructor(constructor)
            {
                rewritten += 1;
            }
        }
        if rewritten > 0 {
            trace!(
                class = %class.name,
                super_class = self.super_class.fq_name(),
                rewritten,
                "rewrote implicit super calls"
            );
        }
        rewritten
    }

    pub fn rewrite_constructor(&self, constructor: &mut ConstructorDeclaration) -> bool {
        match constructor.delegated_call.as_mut() {
            Some(call) => self.rewrite_call(call),
            None => false,
        }
    }

    fn rewrite_call(&self, call: &mut DelegatedConstructorCall) -> bool {
        if !call.is_super() || !call.constructed_type.is_implicit_root() {
            return false;
        }
        let super_type = TypeRef::Resolved(ResolvedTypeRef {
            span: call.span,
            ..self.super_class.clone()
        });
        call.constructed_type = super_type.clone();
        call.callee = CalleeReference::ExplicitSuper { super_type };
        true
    }
}

#[cfg(test)]
#[path = "../tests/delegated_tests.rs"]
mod tests;
