//! Mapping behaviour against the Star Wars reference schema.

use std::sync::Arc;

use familiar_classmap::starwars::{self, Character, Droid, Episode, Human};
use familiar_classmap::{
    MappingError, MemberMap, Reflect, SchemaRegistry, Selector, SelectorBody, TypeKey,
};

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_register_then_duplicate() {
    let registry = SchemaRegistry::new();
    assert!(!registry
        .is_class_map_registered(Some(TypeKey::of::<Droid>()))
        .unwrap());

    registry.register::<Droid>().unwrap();
    assert!(registry
        .is_class_map_registered(Some(TypeKey::of::<Droid>()))
        .unwrap());

    let err = registry.register::<Droid>().unwrap_err();
    assert!(matches!(err, MappingError::DuplicateRegistration(_)));
    assert!(registry.is_registered::<Droid>());
}

#[test]
fn test_reference_schema_snapshot() {
    let registry = SchemaRegistry::new();
    starwars::register_schema(&registry).unwrap();

    let snapshot = registry.snapshot(true).unwrap();
    assert_eq!(snapshot.classes.len(), 4);
    assert!(snapshot.verify().unwrap());

    let droid = snapshot
        .classes
        .iter()
        .find(|c| c.name.ends_with("::Droid"))
        .unwrap();
    let names: Vec<_> = droid.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "name", "appears_in", "friends", "primary_function"]
    );
    assert_eq!(droid.interfaces.len(), 1);
    assert!(droid.members[3].has_resolver);
}

// =============================================================================
// Member maps
// =============================================================================

#[test]
fn test_map_member_twice_returns_same_member_map() {
    let registry = SchemaRegistry::new();
    registry
        .register_with::<Droid, _>(|cm| {
            let descriptor = Droid::type_info().member("name").unwrap().clone();

            let first: *const MemberMap = cm.map_member(descriptor.clone())?;
            assert_eq!(cm.declared_member_maps().len(), 1);

            let second: *const MemberMap = cm.map_member(descriptor)?;
            assert_eq!(cm.declared_member_maps().len(), 1);
            assert!(std::ptr::eq(first, second));
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_droid_id_nullable_after_refetch() {
    let registry = SchemaRegistry::new();
    let droid = registry
        .register_with::<Droid, _>(|cm| {
            cm.map_property(Selector::<Droid, String>::member("id"))?
                .set_nullable(true);
            cm.map_property(Selector::<Droid, String>::member("name"))?;

            let refetched = cm.map_member(Droid::type_info().member("id").unwrap().clone())?;
            assert!(refetched.is_nullable());
            Ok(())
        })
        .unwrap();

    assert_eq!(droid.declared_member_maps().len(), 2);
    let id = droid
        .member_map(Droid::type_info().member("id").unwrap())
        .unwrap();
    assert!(id.is_nullable());
    assert!(!droid.member_map_named("name").unwrap().is_nullable());
}

#[test]
fn test_interface_selection_matches_direct_selection() {
    let registry = SchemaRegistry::new();
    registry
        .register_with::<Human, _>(|cm| {
            let via_interface: *const MemberMap = cm
                .map_property(Selector::<Human, String>::through::<dyn Character>("name"))?
                .into_inner();
            let direct: *const MemberMap = cm
                .map_property(Selector::<Human, String>::member("name"))?
                .into_inner();

            assert!(std::ptr::eq(via_interface, direct));
            assert_eq!(cm.declared_member_maps().len(), 1);
            assert_eq!(
                cm.declared_member_maps()[0].descriptor().declaring_type(),
                TypeKey::of::<Human>()
            );
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_converted_selector() {
    let registry = SchemaRegistry::new();
    let human = registry
        .register_with::<Human, _>(|cm| {
            let selector =
                Selector::<Human, Vec<Episode>>::member("appears_in").converted::<Vec<i32>>();
            assert!(matches!(selector.body(), SelectorBody::Convert { .. }));
            cm.map_property(selector)?;
            Ok(())
        })
        .unwrap();

    let appears_in = human.member_map_named("appears_in").unwrap();
    assert_eq!(appears_in.member_type(), TypeKey::of::<Vec<Episode>>());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_map_field_named_missing() {
    let registry = SchemaRegistry::new();
    let err = registry
        .register_with::<Droid, _>(|cm| {
            cm.map_field_named("doesNotExist")?;
            Ok(())
        })
        .unwrap_err();

    match err {
        MappingError::NotFound { class, field } => {
            assert!(class.ends_with("Droid"));
            assert_eq!(field, "doesNotExist");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
    assert!(!registry.is_registered::<Droid>());
}

#[test]
fn test_wrong_class_descriptor() {
    let registry = SchemaRegistry::new();
    let err = registry
        .register_with::<Droid, _>(|cm| {
            cm.map_member(Human::type_info().member("id").unwrap().clone())?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, MappingError::WrongClass { .. }));

    // a class selector is not followed like an interface selector
    let err = registry
        .register_with::<Droid, _>(|cm| {
            cm.map_property(Selector::<Droid, String>::through::<Human>("id"))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, MappingError::WrongClass { .. }));
}

#[test]
fn test_invalid_selectors() {
    let registry = SchemaRegistry::new();
    let err = registry
        .register_with::<Droid, _>(|cm| {
            cm.map_property(Selector::<Droid, String>::expression("x.name.to_uppercase()"))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, MappingError::InvalidSelector(_)));

    let err = registry
        .register_with::<Droid, _>(|cm| {
            cm.map_property(Selector::<Droid, String>::member("home_planet"))?;
            Ok(())
        })
        .unwrap_err();
    assert!(err.to_string().contains("home_planet"));
}

#[test]
fn test_selector_value_type_is_checked() {
    let registry = SchemaRegistry::new();
    let err = registry
        .register_with::<Droid, _>(|cm| {
            cm.map_property(Selector::<Droid, u64>::member("name"))?
                .resolve(|_| 42u64);
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, MappingError::InvalidSelector(_)));
    assert!(err.to_string().contains("u64"));
    assert!(!registry.is_registered::<Droid>());
}

#[test]
fn test_map_interface_not_assignable() {
    let registry = SchemaRegistry::new();
    let err = registry
        .register_with::<Episode, _>(|cm| cm.map_interface::<dyn Character>())
        .unwrap_err();
    assert!(matches!(err, MappingError::NotAssignable { .. }));
}

#[test]
fn test_resolve_type_not_implemented() {
    let registry = SchemaRegistry::new();
    let err = registry
        .register_with::<dyn Character, _>(|cm| {
            cm.resolve_type(|c| {
                if c.id().starts_with('1') {
                    TypeKey::of::<Human>()
                } else {
                    TypeKey::of::<Droid>()
                }
            })
        })
        .unwrap_err();
    assert!(matches!(err, MappingError::NotImplemented(_)));
}

// =============================================================================
// Resolvers
// =============================================================================

#[test]
fn test_friends_resolver_is_retrievable() {
    let registry = SchemaRegistry::new();
    starwars::register_schema(&registry).unwrap();

    let droid = registry.class_map::<Droid>().unwrap();
    let binding = droid.member_map_named("friends").unwrap().resolver().unwrap();
    let resolve = binding.downcast::<Droid, Vec<Arc<dyn Character>>>().unwrap();

    let friends = resolve(&starwars::artoo());
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].name(), "Luke Skywalker");
}
