//! Member maps
//!
//! Metadata for one mapped field or property.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::{MappingError, Result};
use crate::reflect::{MemberDescriptor, TypeKey};

/// Shared resolver function for instances of `C`
pub type ResolverFn<C, R> = Arc<dyn Fn(&C) -> R + Send + Sync>;

/// A stored resolver binding
///
/// The function is kept type-erased; a document executor recovers it with
/// [`ResolverBinding::downcast`]. Nothing in this crate calls it.
#[derive(Clone)]
pub struct ResolverBinding {
    instance_type: TypeKey,
    result_type: TypeKey,
    func: Arc<dyn Any + Send + Sync>,
}

impl ResolverBinding {
    fn new<C, R, F>(func: F) -> Self
    where
        C: ?Sized + 'static,
        R: 'static,
        F: Fn(&C) -> R + Send + Sync + 'static,
    {
        let func: ResolverFn<C, R> = Arc::new(func);
        Self {
            instance_type: TypeKey::of::<C>(),
            result_type: TypeKey::of::<R>(),
            func: Arc::new(func),
        }
    }

    pub fn instance_type(&self) -> TypeKey {
        self.instance_type
    }

    pub fn result_type(&self) -> TypeKey {
        self.result_type
    }

    /// The resolver function, if it was bound for `C` and returns `R`
    pub fn downcast<C: ?Sized + 'static, R: 'static>(&self) -> Option<ResolverFn<C, R>> {
        self.func.downcast_ref::<ResolverFn<C, R>>().cloned()
    }
}

impl fmt::Debug for ResolverBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverBinding")
            .field("instance_type", &self.instance_type)
            .field("result_type", &self.result_type)
            .finish_non_exhaustive()
    }
}

/// Metadata record for one mapped member
#[derive(Debug, Clone)]
pub struct MemberMap {
    descriptor: MemberDescriptor,
    class_type: TypeKey,
    member_type: TypeKey,
    nullable: bool,
    resolver: Option<ResolverBinding>,
}

impl MemberMap {
    /// Create a member map for `descriptor` owned by the class map of
    /// `class_type`
    pub fn new(class_type: TypeKey, descriptor: MemberDescriptor) -> Result<Self> {
        let member_type =
            descriptor
                .member_type()
                .ok_or_else(|| MappingError::UnsupportedMemberKind {
                    member: descriptor.to_string(),
                    kind: descriptor.kind().to_string(),
                })?;

        Ok(Self {
            descriptor,
            class_type,
            member_type,
            nullable: false,
            resolver: None,
        })
    }

    pub fn descriptor(&self) -> &MemberDescriptor {
        &self.descriptor
    }

    pub fn member_name(&self) -> &'static str {
        self.descriptor.name()
    }

    pub fn member_type(&self) -> TypeKey {
        self.member_type
    }

    /// Class whose class map owns this member map
    pub fn class_type(&self) -> TypeKey {
        self.class_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Set whether the member can be null
    pub fn set_nullable(&mut self, value: bool) -> &mut Self {
        self.nullable = value;
        self
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    pub fn resolver(&self) -> Option<&ResolverBinding> {
        self.resolver.as_ref()
    }
}

impl PartialEq for MemberMap {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
    }
}

impl Eq for MemberMap {}

/// Typed handle to a member map of class `C` holding values of type `M`
///
/// Returned by the selector-based mapping operations so calls chain:
///
/// ```ignore
/// cm.map_property(Selector::member("friends"))?
///     .set_nullable(true)
///     .resolve(|human: &Human| human.friends.clone());
/// ```
pub struct MemberMapMut<'a, C: ?Sized, M> {
    inner: &'a mut MemberMap,
    _marker: PhantomData<fn(&C) -> M>,
}

impl<'a, C: ?Sized + 'static, M> MemberMapMut<'a, C, M> {
    pub(crate) fn new(inner: &'a mut MemberMap) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Set whether the member can be null
    pub fn set_nullable(self, value: bool) -> Self {
        self.inner.nullable = value;
        self
    }

    /// Attach a resolver producing the member's value for an instance of
    /// `C`, replacing any earlier one
    ///
    /// The resolver yields the selector's value type, which for a converted
    /// selector is the slot type rather than the member's declared type.
    pub fn resolve<F>(self, func: F) -> Self
    where
        M: 'static,
        F: Fn(&C) -> M + Send + Sync + 'static,
    {
        self.inner.resolver = Some(ResolverBinding::new::<C, M, F>(func));
        self
    }

    /// The untyped member map
    pub fn into_inner(self) -> &'a mut MemberMap {
        self.inner
    }
}

impl<C: ?Sized, M> fmt::Debug for MemberMapMut<'_, C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MemberMapMut").field(&self.inner).finish()
    }
}

impl<C: ?Sized, M> Deref for MemberMapMut<'_, C, M> {
    type Target = MemberMap;

    fn deref(&self) -> &MemberMap {
        self.inner
    }
}
