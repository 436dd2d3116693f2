//! Class maps
//!
//! A class map collects the member maps declared for one class. It is
//! created empty by the [`SchemaRegistry`](crate::SchemaRegistry), filled in
//! by the configuration callback and frozen behind an `Arc` afterwards.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::error::{MappingError, Result};
use crate::member_map::{MemberMap, MemberMapMut};
use crate::reflect::{MemberDescriptor, Reflect, TypeKey};
use crate::selector::{self, Selector};

/// Type-erased view of a class map
pub trait ClassMapInfo: Any + Send + Sync + fmt::Debug {
    fn class_type(&self) -> TypeKey;

    /// Member maps declared on this class, in mapping order
    fn declared_member_maps(&self) -> &[MemberMap];

    /// Interfaces recorded with `map_interface`
    fn interfaces(&self) -> &[TypeKey];

    fn base_class_map(&self) -> Option<Arc<dyn ClassMapInfo>>;

    fn as_any(&self) -> &dyn Any;
}

/// Schema contribution of class `C`
pub struct ClassMap<C: ?Sized> {
    class_type: TypeKey,
    base_class_map: Option<Weak<dyn ClassMapInfo>>,
    declared_member_maps: Vec<MemberMap>,
    interfaces: Vec<TypeKey>,
    _marker: PhantomData<fn() -> *const C>,
}

impl<C: Reflect + ?Sized> ClassMap<C> {
    pub(crate) fn new(base_class_map: Option<Weak<dyn ClassMapInfo>>) -> Self {
        Self {
            class_type: TypeKey::of::<C>(),
            base_class_map,
            declared_member_maps: Vec::new(),
            interfaces: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Map the member described by `descriptor`
    ///
    /// Returns the existing member map when the member is already mapped.
    pub fn map_member(&mut self, descriptor: MemberDescriptor) -> Result<&mut MemberMap> {
        self.ensure_member_is_for_this_class(&descriptor)?;

        let index = match self
            .declared_member_maps
            .iter()
            .position(|m| m.descriptor() == &descriptor)
        {
            Some(index) => index,
            None => {
                let member_map = MemberMap::new(self.class_type, descriptor)?;
                debug!(
                    class = self.class_type.name(),
                    member = member_map.member_name(),
                    "mapped member"
                );
                self.declared_member_maps.push(member_map);
                self.declared_member_maps.len() - 1
            }
        };

        Ok(&mut self.declared_member_maps[index])
    }

    /// Map the member picked by `selector`
    pub fn map_member_selector<M: 'static>(
        &mut self,
        selector: Selector<C, M>,
    ) -> Result<MemberMapMut<'_, C, M>> {
        let descriptor = selector.resolve()?;
        let member_map = self.map_member(descriptor)?;
        Ok(MemberMapMut::new(member_map))
    }

    /// Map the property picked by `selector`
    pub fn map_property<M: 'static>(
        &mut self,
        selector: Selector<C, M>,
    ) -> Result<MemberMapMut<'_, C, M>> {
        self.map_member_selector(selector)
    }

    /// Map the field picked by `selector`
    pub fn map_field<M: 'static>(
        &mut self,
        selector: Selector<C, M>,
    ) -> Result<MemberMapMut<'_, C, M>> {
        self.map_member_selector(selector)
    }

    /// Map the field declared on `C` named `field_name`
    pub fn map_field_named(&mut self, field_name: &str) -> Result<&mut MemberMap> {
        let descriptor = selector::field_by_name(C::type_info(), field_name)?;
        self.map_member(descriptor)
    }

    /// Record that `C` is exposed as interface `I`
    ///
    /// Only the relationship is recorded: the member maps of `I` are not
    /// merged into this class map.
    pub fn map_interface<I: Reflect + ?Sized>(&mut self) -> Result<()> {
        let interface = TypeKey::of::<I>();
        if !C::type_info().is_assignable_to(interface) {
            return Err(MappingError::NotAssignable {
                interface: interface.to_string(),
                class: self.class_type.to_string(),
            });
        }

        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
        Ok(())
    }

    /// Attach a function that picks the concrete type of an instance
    ///
    /// Polymorphic type resolution is not available yet; this always fails.
    pub fn resolve_type<F>(&mut self, _resolver: F) -> Result<()>
    where
        F: Fn(&C) -> TypeKey + Send + Sync + 'static,
    {
        Err(MappingError::NotImplemented("resolve_type"))
    }

    fn ensure_member_is_for_this_class(&self, descriptor: &MemberDescriptor) -> Result<()> {
        if descriptor.declaring_type() != self.class_type {
            return Err(MappingError::WrongClass {
                expected: self.class_type.to_string(),
                actual: descriptor.declaring_type().to_string(),
            });
        }
        Ok(())
    }
}

impl<C: ?Sized> ClassMap<C> {
    pub fn class_type(&self) -> TypeKey {
        self.class_type
    }

    pub fn base_class_map(&self) -> Option<Arc<dyn ClassMapInfo>> {
        self.base_class_map.as_ref().and_then(Weak::upgrade)
    }

    pub fn declared_member_maps(&self) -> &[MemberMap] {
        &self.declared_member_maps
    }

    /// Member map for `descriptor`, if mapped
    pub fn member_map(&self, descriptor: &MemberDescriptor) -> Option<&MemberMap> {
        self.declared_member_maps
            .iter()
            .find(|m| m.descriptor() == descriptor)
    }

    /// Member map by member name
    pub fn member_map_named(&self, name: &str) -> Option<&MemberMap> {
        self.declared_member_maps
            .iter()
            .find(|m| m.member_name() == name)
    }

    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }
}

impl<C: ?Sized> fmt::Debug for ClassMap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMap")
            .field("class_type", &self.class_type)
            .field(
                "base_class_map",
                &self.base_class_map().map(|b| b.class_type()),
            )
            .field("declared_member_maps", &self.declared_member_maps)
            .field("interfaces", &self.interfaces)
            .finish()
    }
}

impl<C: ?Sized + 'static> ClassMapInfo for ClassMap<C> {
    fn class_type(&self) -> TypeKey {
        self.class_type
    }

    fn declared_member_maps(&self) -> &[MemberMap] {
        &self.declared_member_maps
    }

    fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    fn base_class_map(&self) -> Option<Arc<dyn ClassMapInfo>> {
        ClassMap::base_class_map(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
