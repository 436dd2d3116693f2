//! Star Wars reference schema
//!
//! The characters of the original trilogy, mapped the way the GraphQL
//! reference implementation's `starWarsSchema` describes them. Used by the
//! integration tests and by `classmap-inspect snapshot`.

use std::sync::{Arc, OnceLock};

use crate::error::Result;
use crate::reflect::{Reflect, TypeInfo};
use crate::registry::SchemaRegistry;
use crate::selector::Selector;

/// One of the films in the Star Wars Trilogy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Episode {
    /// Released in 1977.
    NewHope = 4,
    /// Released in 1980.
    Empire = 5,
    /// Released in 1983.
    Jedi = 6,
}

/// A character in the Star Wars Trilogy
pub trait Character: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn friends(&self) -> &[Arc<dyn Character>];
    fn appears_in(&self) -> &[Episode];
}

/// A humanoid creature in the Star Wars universe
#[derive(Clone)]
pub struct Human {
    pub id: String,
    pub name: String,
    pub friends: Vec<Arc<dyn Character>>,
    pub appears_in: Vec<Episode>,
    /// The home planet of the human, or None if unknown
    pub home_planet: Option<String>,
}

/// A mechanical creature in the Star Wars universe
#[derive(Clone)]
pub struct Droid {
    pub id: String,
    pub name: String,
    pub friends: Vec<Arc<dyn Character>>,
    pub appears_in: Vec<Episode>,
    pub primary_function: String,
}

impl Character for Human {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn friends(&self) -> &[Arc<dyn Character>] {
        &self.friends
    }

    fn appears_in(&self) -> &[Episode] {
        &self.appears_in
    }
}

impl Character for Droid {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn friends(&self) -> &[Arc<dyn Character>] {
        &self.friends
    }

    fn appears_in(&self) -> &[Episode] {
        &self.appears_in
    }
}

impl Reflect for Episode {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(TypeInfo::class::<Episode>)
    }
}

impl Reflect for dyn Character {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            TypeInfo::interface::<dyn Character>()
                .property::<String>("id")
                .property::<String>("name")
                .property::<Vec<Arc<dyn Character>>>("friends")
                .property::<Vec<Episode>>("appears_in")
        })
    }
}

impl Reflect for Human {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            TypeInfo::class::<Human>()
                .property::<String>("id")
                .property::<String>("name")
                .property::<Vec<Arc<dyn Character>>>("friends")
                .property::<Vec<Episode>>("appears_in")
                .property::<Option<String>>("home_planet")
                .implements::<dyn Character>()
        })
    }
}

impl Reflect for Droid {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            TypeInfo::class::<Droid>()
                .property::<String>("id")
                .property::<String>("name")
                .property::<Vec<Arc<dyn Character>>>("friends")
                .property::<Vec<Episode>>("appears_in")
                .property::<String>("primary_function")
                .implements::<dyn Character>()
        })
    }
}

/// Register the reference schema
///
/// Type resolution for `dyn Character` is left out: `resolve_type` is not
/// available yet.
pub fn register_schema(registry: &SchemaRegistry) -> Result<()> {
    registry.register::<Episode>()?;

    registry.register_with::<dyn Character, _>(|cm| {
        cm.map_property(Selector::<dyn Character, String>::member("id"))?;
        cm.map_property(Selector::<dyn Character, String>::member("name"))?;
        cm.map_property(Selector::<dyn Character, Vec<Episode>>::member("appears_in"))?;
        cm.map_property(Selector::<dyn Character, Vec<Arc<dyn Character>>>::member("friends"))?;
        Ok(())
    })?;

    registry.register_with::<Human, _>(|cm| {
        cm.map_property(Selector::<Human, String>::member("id"))?;
        cm.map_property(Selector::<Human, String>::member("name"))?;
        cm.map_property(Selector::<Human, Vec<Episode>>::member("appears_in"))?;
        cm.map_property(Selector::<Human, Vec<Arc<dyn Character>>>::member("friends"))?
            .resolve(|human: &Human| human.friends.clone());
        cm.map_property(Selector::<Human, Option<String>>::member("home_planet"))?
            .set_nullable(true);
        cm.map_interface::<dyn Character>()
    })?;

    registry.register_with::<Droid, _>(|cm| {
        cm.map_property(Selector::<Droid, String>::member("id"))?;
        cm.map_property(Selector::<Droid, String>::member("name"))?;
        cm.map_property(Selector::<Droid, Vec<Episode>>::member("appears_in"))?;
        cm.map_property(Selector::<Droid, Vec<Arc<dyn Character>>>::member("friends"))?
            .resolve(|droid: &Droid| droid.friends.clone());
        cm.map_property(Selector::<Droid, String>::member("primary_function"))?;
        cm.map_interface::<dyn Character>()
    })?;

    Ok(())
}

/// R2-D2 with Luke as his only friend
pub fn artoo() -> Droid {
    let luke: Arc<dyn Character> = Arc::new(Human {
        id: "1000".to_string(),
        name: "Luke Skywalker".to_string(),
        friends: Vec::new(),
        appears_in: vec![Episode::NewHope, Episode::Empire, Episode::Jedi],
        home_planet: Some("Tatooine".to_string()),
    });

    Droid {
        id: "2001".to_string(),
        name: "R2-D2".to_string(),
        friends: vec![luke],
        appears_in: vec![Episode::NewHope, Episode::Empire, Episode::Jedi],
        primary_function: "Astromech".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::TypeKey;

    #[test]
    fn test_register_schema() {
        let registry = SchemaRegistry::new();
        register_schema(&registry).unwrap();

        assert_eq!(registry.len(), 4);
        assert!(registry.is_registered::<Episode>());
        assert!(registry.is_registered::<dyn Character>());

        let human = registry.class_map::<Human>().unwrap();
        assert_eq!(human.declared_member_maps().len(), 5);
        assert!(human.member_map_named("home_planet").unwrap().is_nullable());
        assert!(human.member_map_named("friends").unwrap().has_resolver());
        assert_eq!(human.interfaces(), &[TypeKey::of::<dyn Character>()]);

        let character = registry.class_map::<dyn Character>().unwrap();
        let id = character.member_map_named("id").unwrap();
        assert_eq!(id.descriptor().declaring_type(), TypeKey::of::<dyn Character>());
    }

    #[test]
    fn test_registering_twice_fails() {
        let registry = SchemaRegistry::new();
        register_schema(&registry).unwrap();
        assert!(register_schema(&registry).is_err());
    }

    #[test]
    fn test_artoo() {
        let r2 = artoo();
        assert_eq!(r2.friends().len(), 1);
        assert_eq!(r2.friends()[0].name(), "Luke Skywalker");
        assert_eq!(Character::id(&r2), "2001");
    }
}
