//! Type tables
//!
//! Rust has no runtime member introspection, so every type that takes part in
//! a schema publishes an explicit table of its members through [`Reflect`].
//! Interfaces are trait object types (`dyn Trait`); a class lists the
//! interfaces it implements together with the accessor binding that says
//! which of its own accessors satisfies each interface accessor.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Identity of a type taking part in a schema
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path (generic arguments are kept as-is)
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(idx) if !self.name.contains('<') => &self.name[idx + 2..],
            _ => self.name,
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Whether a table describes a concrete class or an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
}

/// Kind of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Property,
    Method,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberKind::Field => "field",
            MemberKind::Property => "property",
            MemberKind::Method => "method",
        };
        f.write_str(s)
    }
}

/// Role of an accessor operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorRole {
    Get,
    Set,
}

/// One accessor operation (getter or setter) of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accessor {
    pub owner: TypeKey,
    pub member: &'static str,
    pub role: AccessorRole,
}

impl Accessor {
    pub fn new(owner: TypeKey, member: &'static str, role: AccessorRole) -> Self {
        Self { owner, member, role }
    }
}

/// Identity and shape of a single member
///
/// Two descriptors denote the same member when declaring type, name and kind
/// match; value type and accessors follow from those.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    name: &'static str,
    declaring_type: TypeKey,
    declaring_kind: TypeKind,
    value_type: TypeKey,
    kind: MemberKind,
    accessors: Vec<Accessor>,
}

impl MemberDescriptor {
    /// Describe a field of `declaring_type`
    pub fn field(declaring_type: TypeKey, name: &'static str, value_type: TypeKey) -> Self {
        Self {
            name,
            declaring_type,
            declaring_kind: TypeKind::Class,
            value_type,
            kind: MemberKind::Field,
            accessors: Vec::new(),
        }
    }

    /// Describe a property of `declaring_type` with the given accessor roles
    pub fn property(
        declaring_type: TypeKey,
        declaring_kind: TypeKind,
        name: &'static str,
        value_type: TypeKey,
        roles: &[AccessorRole],
    ) -> Self {
        Self {
            name,
            declaring_type,
            declaring_kind,
            value_type,
            kind: MemberKind::Property,
            accessors: roles
                .iter()
                .map(|role| Accessor::new(declaring_type, name, *role))
                .collect(),
        }
    }

    /// Describe a method of `declaring_type` returning `return_type`
    pub fn method(declaring_type: TypeKey, name: &'static str, return_type: TypeKey) -> Self {
        Self {
            name,
            declaring_type,
            declaring_kind: TypeKind::Class,
            value_type: return_type,
            kind: MemberKind::Method,
            accessors: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declaring_type(&self) -> TypeKey {
        self.declaring_type
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    /// Whether the member is declared on an interface rather than a class
    pub fn is_interface_member(&self) -> bool {
        self.declaring_kind == TypeKind::Interface
    }

    /// Type of the value the member holds; `None` for methods
    pub fn member_type(&self) -> Option<TypeKey> {
        match self.kind {
            MemberKind::Field | MemberKind::Property => Some(self.value_type),
            MemberKind::Method => None,
        }
    }

    /// Whether `self` implements every accessor in `required`
    pub(crate) fn covers(&self, required: &[Accessor]) -> bool {
        required.iter().all(|acc| self.accessors.contains(acc))
    }
}

impl PartialEq for MemberDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.name == other.name
            && self.kind == other.kind
    }
}

impl Eq for MemberDescriptor {}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type.short_name(), self.name)
    }
}

/// Accessor binding between one interface and the class implementing it
#[derive(Debug, Clone)]
pub struct InterfaceBinding {
    interface: TypeKey,
    targets: Vec<(Accessor, Accessor)>,
    unknown: Vec<&'static str>,
}

impl InterfaceBinding {
    pub fn interface(&self) -> TypeKey {
        self.interface
    }

    /// Concrete accessor bound to an interface accessor
    pub fn target_of(&self, interface_accessor: &Accessor) -> Option<Accessor> {
        self.targets
            .iter()
            .find(|(from, _)| from == interface_accessor)
            .map(|(_, to)| *to)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Names bound as interface members that the interface does not declare
    /// (or declares without the bound accessor)
    pub fn unknown_members(&self) -> &[&'static str] {
        &self.unknown
    }
}

/// Builds an [`InterfaceBinding`] for one class/interface pair
pub struct InterfaceBindingBuilder {
    class: TypeKey,
    interface: &'static TypeInfo,
    targets: Vec<(Accessor, Accessor)>,
    unknown: Vec<&'static str>,
}

impl InterfaceBindingBuilder {
    /// Bind every accessor of interface property `interface_member` to the
    /// accessor with the same role on class property `class_member`
    pub fn bind(mut self, interface_member: &'static str, class_member: &'static str) -> Self {
        match self.interface.member(interface_member) {
            Some(member) if member.kind() == MemberKind::Property => {
                for from in member.accessors() {
                    let to = Accessor::new(self.class, class_member, from.role);
                    self.targets.push((*from, to));
                }
            }
            _ => self.unknown.push(interface_member),
        }
        self
    }

    /// Bind a single interface accessor to a single class accessor
    pub fn bind_accessor(
        mut self,
        interface_member: &'static str,
        interface_role: AccessorRole,
        class_member: &'static str,
        class_role: AccessorRole,
    ) -> Self {
        let from = Accessor::new(self.interface.key(), interface_member, interface_role);
        let declared = self
            .interface
            .member(interface_member)
            .is_some_and(|m| m.accessors().contains(&from));
        if !declared {
            self.unknown.push(interface_member);
        }
        let to = Accessor::new(self.class, class_member, class_role);
        self.targets.push((from, to));
        self
    }

    /// Bind every interface property to the class property of the same name
    pub fn by_name(self) -> Self {
        let names: Vec<&'static str> = self
            .interface
            .members()
            .iter()
            .filter(|m| m.kind() == MemberKind::Property)
            .map(|m| m.name())
            .collect();
        names.into_iter().fold(self, |b, name| b.bind(name, name))
    }

    fn build(self) -> InterfaceBinding {
        if !self.unknown.is_empty() {
            warn!(
                class = self.class.name(),
                interface = self.interface.key().name(),
                members = ?self.unknown,
                "binding names undeclared interface members"
            );
        }
        InterfaceBinding {
            interface: self.interface.key(),
            targets: self.targets,
            unknown: self.unknown,
        }
    }
}

/// Member table for one type
#[derive(Debug, Clone)]
pub struct TypeInfo {
    key: TypeKey,
    kind: TypeKind,
    members: Vec<MemberDescriptor>,
    interfaces: Vec<InterfaceBinding>,
}

impl TypeInfo {
    /// Start a table for class `T`
    pub fn class<T: ?Sized + 'static>() -> Self {
        Self::with_kind(TypeKey::of::<T>(), TypeKind::Class)
    }

    /// Start a table for interface `T` (normally a `dyn Trait`)
    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::with_kind(TypeKey::of::<T>(), TypeKind::Interface)
    }

    fn with_kind(key: TypeKey, kind: TypeKind) -> Self {
        Self {
            key,
            kind,
            members: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    /// Add a field
    pub fn field<M: ?Sized + 'static>(mut self, name: &'static str) -> Self {
        self.members
            .push(MemberDescriptor::field(self.key, name, TypeKey::of::<M>()));
        self
    }

    /// Add a read/write property
    pub fn property<M: ?Sized + 'static>(self, name: &'static str) -> Self {
        self.property_with::<M>(name, &[AccessorRole::Get, AccessorRole::Set])
    }

    /// Add a read-only property
    pub fn readonly<M: ?Sized + 'static>(self, name: &'static str) -> Self {
        self.property_with::<M>(name, &[AccessorRole::Get])
    }

    /// Add a property with an explicit set of accessors
    pub fn property_with<M: ?Sized + 'static>(
        mut self,
        name: &'static str,
        roles: &[AccessorRole],
    ) -> Self {
        self.members.push(MemberDescriptor::property(
            self.key,
            self.kind,
            name,
            TypeKey::of::<M>(),
            roles,
        ));
        self
    }

    /// Add a method
    pub fn method<R: ?Sized + 'static>(mut self, name: &'static str) -> Self {
        self.members
            .push(MemberDescriptor::method(self.key, name, TypeKey::of::<R>()));
        self
    }

    /// Declare that this class implements `I`, binding properties by name
    pub fn implements<I: Reflect + ?Sized>(self) -> Self {
        self.implements_with::<I, _>(InterfaceBindingBuilder::by_name)
    }

    /// Declare that this class implements `I` with an explicit binding
    pub fn implements_with<I, F>(mut self, bind: F) -> Self
    where
        I: Reflect + ?Sized,
        F: FnOnce(InterfaceBindingBuilder) -> InterfaceBindingBuilder,
    {
        let builder = InterfaceBindingBuilder {
            class: self.key,
            interface: I::type_info(),
            targets: Vec::new(),
            unknown: Vec::new(),
        };
        self.interfaces.push(bind(builder).build());
        self
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Members declared directly on this type
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Member by name, any kind
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// Declared accessor binding for `interface`
    pub fn interface_binding(&self, interface: TypeKey) -> Option<&InterfaceBinding> {
        self.interfaces.iter().find(|b| b.interface == interface)
    }

    /// Whether values of this type can be used where `target` is expected
    pub fn is_assignable_to(&self, target: TypeKey) -> bool {
        self.key == target || self.interface_binding(target).is_some()
    }
}

/// Types that publish a member table
///
/// Implementations normally cache the table in a `OnceLock`:
///
/// ```
/// use std::sync::OnceLock;
/// use familiar_classmap::{Reflect, TypeInfo};
///
/// struct Planet { name: String }
///
/// impl Reflect for Planet {
///     fn type_info() -> &'static TypeInfo {
///         static INFO: OnceLock<TypeInfo> = OnceLock::new();
///         INFO.get_or_init(|| TypeInfo::class::<Planet>().field::<String>("name"))
///     }
/// }
/// ```
pub trait Reflect: 'static {
    fn type_info() -> &'static TypeInfo;
}
