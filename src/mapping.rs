use crate::error::{MapError, Result};
use crate::profile::{ControlKey, ControlKind, DeviceProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// When a button mapping triggers. Serialized with the labels the mapping
/// files have always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PressSemantics {
    #[serde(rename = "Rise")]
    OnPress,
    #[serde(rename = "Fall")]
    OnRelease,
    #[default]
    #[serde(rename = "Press")]
    WhilePressed,
}

impl PressSemantics {
    pub const ALL: [PressSemantics; 3] = [Self::OnPress, Self::OnRelease, Self::WhilePressed];

    pub fn label(&self) -> &'static str {
        match self {
            Self::OnPress => "Rise",
            Self::OnRelease => "Fall",
            Self::WhilePressed => "Press",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub function_name: String,
    /// Always `None` for axes
    pub press: Option<PressSemantics>,
    pub export_in_code: bool,
}

/// On-disk form of a whole mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDocument {
    pub name: String,
    pub items: Vec<DocumentItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentItem {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ControlKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default)]
    pub press_type: Option<PressSemantics>,
    #[serde(default = "default_export_in_code")]
    pub export_in_code: bool,
}

fn default_export_in_code() -> bool {
    true
}

impl DocumentItem {
    fn key(&self) -> ControlKey {
        ControlKey {
            kind: self.kind,
            id: self.id,
        }
    }
}

pub struct MappingStore {
    profile: &'static DeviceProfile,
    entries: BTreeMap<ControlKey, MappingEntry>,
}

impl MappingStore {
    pub fn new(profile: &'static DeviceProfile) -> Self {
        Self {
            profile,
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: ControlKey) -> Option<&MappingEntry> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Set or replace the mapping of one control. Leaves the store untouched
    /// on error.
    pub fn assign(
        &mut self,
        key: ControlKey,
        function_name: &str,
        press: Option<PressSemantics>,
        export_in_code: bool,
    ) -> Result<()> {
        let entry = self.validated_entry(key, Some(function_name), press, export_in_code)?;
        if let Some(entry) = entry {
            log::info!("Mapped {:?} {} to {}", key.kind, key.id, entry.function_name);
            self.entries.insert(key, entry);
        }
        Ok(())
    }

    fn validated_entry(
        &self,
        key: ControlKey,
        function_name: Option<&str>,
        press: Option<PressSemantics>,
        export_in_code: bool,
    ) -> Result<Option<MappingEntry>> {
        let Some(spec) = self.profile.spec(key) else {
            return Err(MapError::Validation(format!(
                "{} {} does not exist on the {}",
                key.kind.label(),
                key.id,
                self.profile.name
            )));
        };

        let Some(function_name) = function_name else {
            return Ok(None);
        };
        let function_name = function_name.trim();
        if function_name.is_empty() {
            return Err(MapError::Validation("Please enter a function name.".to_string()));
        }

        let press = match spec.kind {
            ControlKind::Button => Some(press.unwrap_or_default()),
            ControlKind::Axis => None,
        };

        Ok(Some(MappingEntry {
            function_name: function_name.to_string(),
            press,
            export_in_code,
        }))
    }

    /// Every control of the profile, in profile order, mapped or not
    pub fn serialize(&self) -> MappingDocument {
        let items = self
            .profile
            .items
            .iter()
            .map(|spec| {
                let entry = self.entries.get(&spec.key());
                DocumentItem {
                    id: spec.id,
                    kind: spec.kind,
                    title: Some(spec.title.to_string()),
                    map: entry.map(|e| e.function_name.clone()),
                    press_type: entry.and_then(|e| e.press),
                    export_in_code: entry.map(|e| e.export_in_code).unwrap_or(true),
                }
            })
            .collect();

        MappingDocument {
            name: self.profile.name.to_string(),
            items,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    /// Parse `text` and merge it into the store. Items with a `null` map
    /// clear the control. Either every item applies or none does.
    pub fn deserialize(&mut self, text: &str) -> Result<usize> {
        let document: MappingDocument = serde_json::from_str(text)?;
        self.apply(document)
    }

    pub fn apply(&mut self, document: MappingDocument) -> Result<usize> {
        if document.name != self.profile.name {
            log::warn!(
                "Mapping file was made for {:?}, applying to {:?}",
                document.name,
                self.profile.name
            );
        }

        let mut entries = self.entries.clone();
        for item in &document.items {
            let key = item.key();
            match self.validated_entry(key, item.map.as_deref(), item.press_type, item.export_in_code)? {
                Some(entry) => {
                    entries.insert(key, entry);
                }
                None => {
                    entries.remove(&key);
                }
            }
        }

        self.entries = entries;
        log::info!("Applied {} mapping items", document.items.len());
        Ok(document.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::f310;

    fn sample_store() -> MappingStore {
        let mut store = MappingStore::new(f310());
        store
            .assign(ControlKey::button(0), "intake", Some(PressSemantics::OnPress), true)
            .unwrap();
        store
            .assign(ControlKey::button(5), "shoot", Some(PressSemantics::OnRelease), false)
            .unwrap();
        store
            .assign(ControlKey::axis(1), "drive", Some(PressSemantics::OnPress), true)
            .unwrap();
        store
    }

    #[test]
    fn test_assign_trims_and_stores() {
        let mut store = MappingStore::new(f310());
        store
            .assign(ControlKey::button(2), "  climb ", Some(PressSemantics::WhilePressed), true)
            .unwrap();
        let entry = store.get(ControlKey::button(2)).unwrap();
        assert_eq!(entry.function_name, "climb");
        assert_eq!(entry.press, Some(PressSemantics::WhilePressed));
    }

    #[test]
    fn test_assign_blank_name_is_rejected_without_mutation() {
        let mut store = sample_store();
        let before = store.serialize();

        for name in ["", "   ", "\t\n"] {
            let err = store
                .assign(ControlKey::button(0), name, None, true)
                .unwrap_err();
            assert!(matches!(err, MapError::Validation(_)));
        }
        assert_eq!(store.serialize(), before);
    }

    #[test]
    fn test_assign_unknown_control_is_rejected() {
        let mut store = MappingStore::new(f310());
        let err = store
            .assign(ControlKey::axis(9), "spin", None, true)
            .unwrap_err();
        assert!(matches!(err, MapError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_axis_never_keeps_press_semantics() {
        let store = sample_store();
        assert_eq!(store.get(ControlKey::axis(1)).unwrap().press, None);
    }

    #[test]
    fn test_button_without_press_defaults_to_while_pressed() {
        let mut store = MappingStore::new(f310());
        store.assign(ControlKey::button(1), "arm", None, true).unwrap();
        assert_eq!(
            store.get(ControlKey::button(1)).unwrap().press,
            Some(PressSemantics::WhilePressed)
        );
    }

    #[test]
    fn test_serialize_lists_every_control() {
        let document = sample_store().serialize();
        assert_eq!(document.name, "Logitech F310");
        assert_eq!(document.items.len(), 20);

        let a = &document.items[0];
        assert_eq!((a.id, a.kind), (0, ControlKind::Button));
        assert_eq!(a.map.as_deref(), Some("intake"));

        let unmapped = &document.items[1];
        assert_eq!(unmapped.map, None);
        assert_eq!(unmapped.press_type, None);
    }

    #[test]
    fn test_json_uses_file_field_names() {
        let json = sample_store().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value["items"][0];
        assert_eq!(first["type"], "button");
        assert_eq!(first["map"], "intake");
        assert_eq!(first["press_type"], "Rise");
        assert!(value["items"][1]["map"].is_null());
        assert!(value["items"][17]["press_type"].is_null());
        assert!(first.get("prev_state").is_none());
    }

    #[test]
    fn test_round_trip_preserves_mapping() {
        let original = sample_store();
        let json = original.to_json().unwrap();

        let mut restored = MappingStore::new(f310());
        restored.deserialize(&json).unwrap();
        assert_eq!(restored.serialize(), original.serialize());
        assert_eq!(restored.to_json().unwrap(), json);
    }

    #[test]
    fn test_malformed_json_leaves_store_untouched() {
        let mut store = sample_store();
        let before = store.serialize();
        let err = store.deserialize("{ not json").unwrap_err();
        assert!(matches!(err, MapError::Parse(_)));
        assert_eq!(store.serialize(), before);
    }

    #[test]
    fn test_unknown_id_rejects_whole_document() {
        let mut store = MappingStore::new(f310());
        let text = r#"{
            "name": "Logitech F310",
            "items": [
                { "id": 0, "type": "button", "map": "intake", "press_type": "Rise" },
                { "id": 42, "type": "button", "map": "ghost" }
            ]
        }"#;
        let err = store.deserialize(text).unwrap_err();
        assert!(matches!(err, MapError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_null_map_clears_existing_entry() {
        let mut store = sample_store();
        let text = r#"{ "name": "Logitech F310", "items": [ { "id": 0, "type": "button", "map": null } ] }"#;
        assert_eq!(store.deserialize(text).unwrap(), 1);
        assert!(store.get(ControlKey::button(0)).is_none());
        assert!(store.get(ControlKey::button(5)).is_some());
    }

    #[test]
    fn test_import_drops_press_type_on_axis() {
        let mut store = MappingStore::new(f310());
        let text = r#"{ "name": "Logitech F310", "items": [ { "id": 2, "type": "axis", "map": "turn", "press_type": "Fall" } ] }"#;
        store.deserialize(text).unwrap();
        let entry = store.get(ControlKey::axis(2)).unwrap();
        assert_eq!(entry.press, None);
        assert!(entry.export_in_code);
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let mut store = MappingStore::new(f310());
        let text = r#"{ "name": "Logitech F310", "items": [ { "id": 0, "type": "trigger" } ] }"#;
        assert!(matches!(store.deserialize(text), Err(MapError::Parse(_))));
    }
}
