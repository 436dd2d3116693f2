//! Member selector resolution
//!
//! Turns a typed [`Selector`] or a bare field name into a
//! [`MemberDescriptor`] pinned to the class being mapped. Selectors that
//! point at an interface property are followed through the class's declared
//! [`InterfaceBinding`](crate::reflect::InterfaceBinding) to the concrete
//! property that implements it.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{MappingError, Result};
use crate::reflect::{Accessor, MemberDescriptor, MemberKind, Reflect, TypeInfo, TypeKey};

/// Shape of a selector expression
#[derive(Debug, Clone)]
pub enum SelectorBody {
    /// Direct member access
    Access(MemberDescriptor),
    /// Implicit conversion of the operand from `source` to `target`
    Convert {
        source: TypeKey,
        target: TypeKey,
        operand: Box<SelectorBody>,
    },
    /// Any other expression
    Opaque(String),
    /// A member name the owner's table does not list
    Unknown { owner: TypeKey, name: String },
}

impl fmt::Display for SelectorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorBody::Access(d) => write!(f, "x.{}", d.name()),
            SelectorBody::Convert {
                target, operand, ..
            } => write!(f, "({}) {}", target.short_name(), operand),
            SelectorBody::Opaque(text) => f.write_str(text),
            SelectorBody::Unknown { owner, name } => write!(f, "{}.{}", owner.short_name(), name),
        }
    }
}

/// Typed member access on `C` producing a value of type `M`
pub struct Selector<C: ?Sized, M> {
    body: SelectorBody,
    _marker: PhantomData<fn(&C) -> M>,
}

impl<C: ?Sized, M> Selector<C, M> {
    fn from_body(body: SelectorBody) -> Self {
        Self {
            body,
            _marker: PhantomData,
        }
    }

    /// Select an explicit descriptor
    pub fn from_descriptor(descriptor: MemberDescriptor) -> Self {
        Self::from_body(SelectorBody::Access(descriptor))
    }

    /// An expression that is not a member access, e.g. a computed value
    pub fn expression(text: impl Into<String>) -> Self {
        Self::from_body(SelectorBody::Opaque(text.into()))
    }

    /// Select member `name` as declared on `T`, usually an interface `C`
    /// implements
    pub fn through<T: Reflect + ?Sized>(name: &str) -> Self {
        Self::from_body(lookup(T::type_info(), name))
    }

    /// Read the selected value through a slot of type `N`
    pub fn converted<N: 'static>(self) -> Selector<C, N>
    where
        M: 'static,
    {
        Selector::from_body(SelectorBody::Convert {
            source: TypeKey::of::<M>(),
            target: TypeKey::of::<N>(),
            operand: Box::new(self.body),
        })
    }

    pub fn body(&self) -> &SelectorBody {
        &self.body
    }
}

impl<C: Reflect + ?Sized, M> Selector<C, M> {
    /// Select member `name` declared on `C`
    pub fn member(name: &str) -> Self {
        Self::from_body(lookup(C::type_info(), name))
    }
}

impl<C: Reflect + ?Sized, M: 'static> Selector<C, M> {
    /// Resolve to a descriptor declared on `C`
    ///
    /// The selected member must hold values of type `M`, or of the declared
    /// source type when the selector is converted.
    pub fn resolve(&self) -> Result<MemberDescriptor> {
        let descriptor = resolve_body(&self.body, C::type_info())?;
        check_value_type(&self.body, TypeKey::of::<M>())?;
        Ok(descriptor)
    }
}

impl<C: ?Sized, M> Clone for Selector<C, M> {
    fn clone(&self) -> Self {
        Self::from_body(self.body.clone())
    }
}

impl<C: ?Sized, M> fmt::Debug for Selector<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.body).finish()
    }
}

fn lookup(info: &TypeInfo, name: &str) -> SelectorBody {
    match info.member(name) {
        Some(descriptor) => SelectorBody::Access(descriptor.clone()),
        None => SelectorBody::Unknown {
            owner: info.key(),
            name: name.to_string(),
        },
    }
}

/// Resolve a selector body against the table of the class being mapped
pub fn resolve_body(body: &SelectorBody, class: &TypeInfo) -> Result<MemberDescriptor> {
    let descriptor = match body {
        SelectorBody::Access(d) => d,
        SelectorBody::Convert { operand, .. } => match operand.as_ref() {
            SelectorBody::Access(d) => d,
            other => return Err(invalid(body, other)),
        },
        other => return Err(invalid(body, other)),
    };

    match descriptor.kind() {
        MemberKind::Field => Ok(descriptor.clone()),
        MemberKind::Property
            if descriptor.is_interface_member() && descriptor.declaring_type() != class.key() =>
        {
            find_implementation(descriptor, class)
        }
        MemberKind::Property => Ok(descriptor.clone()),
        MemberKind::Method => Err(MappingError::InvalidSelector(format!(
            "{} selects a method, expected a field or property",
            body
        ))),
    }
}

/// Check that `body` produces values of type `expected`
///
/// Only the shapes [`resolve_body`] accepts are checked; anything else is
/// rejected there first.
pub fn check_value_type(body: &SelectorBody, expected: TypeKey) -> Result<()> {
    match body {
        SelectorBody::Access(d) => check_member_type(body, d, expected),
        SelectorBody::Convert {
            source,
            target,
            operand,
        } => {
            if *target != expected {
                return Err(mismatch(body, expected, *target));
            }
            match operand.as_ref() {
                SelectorBody::Access(d) => check_member_type(body, d, *source),
                _ => Ok(()),
            }
        }
        SelectorBody::Opaque(_) | SelectorBody::Unknown { .. } => Ok(()),
    }
}

fn check_member_type(
    body: &SelectorBody,
    descriptor: &MemberDescriptor,
    expected: TypeKey,
) -> Result<()> {
    match descriptor.member_type() {
        Some(actual) if actual != expected => Err(mismatch(body, expected, actual)),
        _ => Ok(()),
    }
}

fn mismatch(body: &SelectorBody, expected: TypeKey, actual: TypeKey) -> MappingError {
    MappingError::InvalidSelector(format!(
        "{}: expected a value of type {}, the member holds {}",
        body, expected, actual
    ))
}

fn invalid(body: &SelectorBody, inner: &SelectorBody) -> MappingError {
    let reason = match inner {
        SelectorBody::Unknown { owner, name } => {
            format!("{} has no member named '{}'", owner.short_name(), name)
        }
        _ => "expected a member access".to_string(),
    };
    MappingError::InvalidSelector(format!("{}: {}", body, reason))
}

/// Find the property of `class` that implements interface property `member`
pub fn find_implementation(member: &MemberDescriptor, class: &TypeInfo) -> Result<MemberDescriptor> {
    let failure = |reason: String| MappingError::ResolutionFailure {
        class: class.key().to_string(),
        interface: member.declaring_type().to_string(),
        member: member.name().to_string(),
        reason,
    };

    let binding = class
        .interface_binding(member.declaring_type())
        .ok_or_else(|| failure("the class does not implement the interface".to_string()))?;

    let required = member
        .accessors()
        .iter()
        .map(|acc| {
            binding
                .target_of(acc)
                .ok_or_else(|| failure(unbound_reason(acc, binding.unknown_members())))
        })
        .collect::<Result<Vec<Accessor>>>()?;

    let mut candidates = class
        .members()
        .iter()
        .filter(|m| m.kind() == MemberKind::Property && m.covers(&required));

    match (candidates.next(), candidates.next()) {
        (Some(found), None) => Ok(found.clone()),
        (None, _) => Err(failure("missing implementation".to_string())),
        (Some(_), Some(_)) => Err(failure("ambiguous implementation".to_string())),
    }
}

fn unbound_reason(accessor: &Accessor, unknown: &[&'static str]) -> String {
    let reason = format!("no binding for the {:?} accessor", accessor.role);
    if unknown.is_empty() {
        reason
    } else {
        format!(
            "{} (the binding names undeclared interface members: {})",
            reason,
            unknown.join(", ")
        )
    }
}

/// Field declared directly on `class` named `name`
pub fn field_by_name(class: &TypeInfo, name: &str) -> Result<MemberDescriptor> {
    if name.is_empty() {
        return Err(MappingError::NullArgument("field_name"));
    }

    class
        .members()
        .iter()
        .find(|m| m.kind() == MemberKind::Field && m.name() == name)
        .cloned()
        .ok_or_else(|| MappingError::NotFound {
            class: class.key().to_string(),
            field: name.to_string(),
        })
}
