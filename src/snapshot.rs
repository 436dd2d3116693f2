//! Registry snapshots
//!
//! A serializable view of every registered class map, used for inspection
//! and for detecting drift between two schema setups.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::class_map::ClassMapInfo;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::reflect::MemberKind;

/// One mapped member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub name: String,
    pub kind: MemberKind,
    pub value_type: String,
    pub nullable: bool,
    pub has_resolver: bool,
}

/// One registered class map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    pub members: Vec<MemberSnapshot>,
}

impl ClassSnapshot {
    pub fn from_class_map(class_map: &dyn ClassMapInfo) -> Self {
        Self {
            name: class_map.class_type().name().to_string(),
            base: class_map
                .base_class_map()
                .map(|b| b.class_type().name().to_string()),
            interfaces: class_map
                .interfaces()
                .iter()
                .map(|i| i.name().to_string())
                .collect(),
            members: class_map
                .declared_member_maps()
                .iter()
                .map(|m| MemberSnapshot {
                    name: m.member_name().to_string(),
                    kind: m.descriptor().kind(),
                    value_type: m.member_type().name().to_string(),
                    nullable: m.is_nullable(),
                    has_resolver: m.has_resolver(),
                })
                .collect(),
        }
    }
}

/// Everything registered at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub generated_at: DateTime<Utc>,
    pub classes: Vec<ClassSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
}

impl RegistrySnapshot {
    /// Build a snapshot; classes are sorted by name
    pub fn from_class_maps(
        class_maps: &[Arc<dyn ClassMapInfo>],
        include_checksum: bool,
    ) -> Result<Self> {
        let mut classes: Vec<ClassSnapshot> = class_maps
            .iter()
            .map(|cm| ClassSnapshot::from_class_map(cm.as_ref()))
            .collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));

        let checksum = if include_checksum {
            Some(Checksum::from_json(&classes)?)
        } else {
            None
        };

        Ok(Self {
            generated_at: Utc::now(),
            classes,
            checksum,
        })
    }

    pub fn class(&self, name: &str) -> Option<&ClassSnapshot> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Whether the recorded checksum still matches the classes
    pub fn verify(&self) -> Result<bool> {
        match &self.checksum {
            Some(checksum) => checksum.verify_json(&self.classes),
            None => Ok(true),
        }
    }

    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let json = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_map::ClassMap;
    use crate::reflect::{Reflect, TypeInfo};
    use crate::selector::Selector;
    use std::sync::OnceLock;

    struct Planet;

    impl Reflect for Planet {
        fn type_info() -> &'static TypeInfo {
            static INFO: OnceLock<TypeInfo> = OnceLock::new();
            INFO.get_or_init(|| {
                TypeInfo::class::<Planet>()
                    .property::<String>("name")
                    .field::<u64>("population")
            })
        }
    }

    fn planet_map() -> Arc<dyn ClassMapInfo> {
        let mut cm: ClassMap<Planet> = ClassMap::new(None);
        cm.map_property(Selector::<Planet, String>::member("name"))
            .unwrap()
            .set_nullable(true);
        cm.map_field_named("population").unwrap();
        Arc::new(cm)
    }

    #[test]
    fn test_snapshot_members() {
        let snapshot = RegistrySnapshot::from_class_maps(&[planet_map()], true).unwrap();
        assert_eq!(snapshot.classes.len(), 1);

        let planet = &snapshot.classes[0];
        assert!(planet.name.ends_with("Planet"));
        assert_eq!(planet.members.len(), 2);
        assert_eq!(planet.members[0].name, "name");
        assert!(planet.members[0].nullable);
        assert_eq!(planet.members[1].kind, MemberKind::Field);
        assert_eq!(planet.members[1].value_type, "u64");
        assert!(snapshot.verify().unwrap());
    }

    #[test]
    fn test_checksum_ignores_generation_time() {
        let a = RegistrySnapshot::from_class_maps(&[planet_map()], true).unwrap();
        let b = RegistrySnapshot::from_class_maps(&[planet_map()], true).unwrap();
        assert_eq!(a.checksum, b.checksum);
    }

    #[test]
    fn test_tampered_snapshot_fails_verification() {
        let mut snapshot = RegistrySnapshot::from_class_maps(&[planet_map()], true).unwrap();
        snapshot.classes[0].members[0].nullable = false;
        assert!(!snapshot.verify().unwrap());
    }

    #[test]
    fn test_json_output() {
        let snapshot = RegistrySnapshot::from_class_maps(&[planet_map()], false).unwrap();
        let compact = snapshot.to_json(OutputFormat::Compact).unwrap();
        assert!(!compact.contains('\n'));
        assert!(!compact.contains("checksum"));

        let parsed: RegistrySnapshot = serde_json::from_str(&compact).unwrap();
        assert_eq!(parsed.classes, snapshot.classes);
    }
}
