//! Combat-state snapshot as written by the encounter producer.
//!
//! The producer is not under our control, so decoding is deliberately
//! forgiving at the field level: a non-numeric `hp` becomes `None`, a missing
//! `effects` map becomes all-false, numeric ids are stringified. Only a broken
//! top-level shape (e.g. `combatants` that is not a list) fails to decode.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// One point-in-time description of the whole encounter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// `false` (or absent) means there is no active encounter.
    #[serde(deserialize_with = "truthy")]
    pub running: bool,
    #[serde(deserialize_with = "lenient_round")]
    pub round: u32,
    #[serde(deserialize_with = "lenient_number")]
    pub timestamp: Option<f64>,
    /// Identifiers of the combatants currently acting.
    #[serde(deserialize_with = "id_list")]
    pub active_ids: Vec<String>,
    /// Roster order is the only correlation between consecutive snapshots.
    pub combatants: Vec<Combatant>,
}

impl Snapshot {
    /// The payload the producer writes between encounters.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Whether `id` is one of the currently acting combatants.
    pub fn is_active(&self, id: Option<&str>) -> bool {
        id.is_some_and(|id| self.active_ids.iter().any(|a| a == id))
    }

    /// Find a combatant by its producer-assigned id.
    pub fn find(&self, id: &str) -> Option<&Combatant> {
        self.combatants
            .iter()
            .find(|c| c.id.as_deref() == Some(id))
    }
}

/// A single participant's displayed attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Combatant {
    #[serde(deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(deserialize_with = "text_or_empty")]
    pub display_name: String,
    pub kind: CombatantKind,
    #[serde(deserialize_with = "lenient_number")]
    pub hp: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub max_hp: Option<f64>,
    /// A missing key is an empty pool; `None` means a non-numeric value.
    #[serde(deserialize_with = "lenient_number")]
    pub temp_hp: Option<f64>,
    pub state: CombatantState,
    #[serde(deserialize_with = "lenient_effects")]
    pub effects: EffectFlags,
    /// User-defined effect names in document order. Values are not kept.
    #[serde(
        deserialize_with = "map_keys",
        serialize_with = "serialize_effect_names"
    )]
    pub custom_effects: Vec<String>,
}

impl Default for Combatant {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            display_name: String::new(),
            kind: CombatantKind::default(),
            hp: None,
            max_hp: None,
            temp_hp: Some(0.0),
            state: CombatantState::default(),
            effects: EffectFlags::default(),
            custom_effects: Vec::new(),
        }
    }
}

impl Combatant {
    /// Name shown to players: `display_name`, then `name`, then a dash.
    pub fn label(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if !self.name.is_empty() {
            &self.name
        } else {
            "—"
        }
    }
}

/// Recognized boolean effect flags. Unknown keys in the source map are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectFlags {
    #[serde(deserialize_with = "truthy")]
    pub dead: bool,
    #[serde(deserialize_with = "truthy")]
    pub unconscious: bool,
    #[serde(deserialize_with = "truthy")]
    pub incapacitated: bool,
    #[serde(deserialize_with = "truthy")]
    pub temp_hp: bool,
    #[serde(deserialize_with = "truthy")]
    pub concentration: bool,
}

/// Lifecycle state reported by the producer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CombatantState {
    #[default]
    Alive,
    Dead,
    Unconscious,
    Left,
    Other(String),
}

impl CombatantState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
            Self::Unconscious => "unconscious",
            Self::Left => "left",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for CombatantState {
    fn from(s: &str) -> Self {
        match s {
            "alive" => Self::Alive,
            "dead" => Self::Dead,
            "unconscious" => Self::Unconscious,
            "left" => Self::Left,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for CombatantState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CombatantState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = deserializer.deserialize_any(TextVisitor)?;
        Ok(text.as_deref().map(Self::from).unwrap_or_default())
    }
}

/// What kind of entity the producer says this is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CombatantKind {
    Player,
    Monster,
    #[default]
    Combatant,
    Other(String),
}

impl CombatantKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Player => "player",
            Self::Monster => "monster",
            Self::Combatant => "combatant",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for CombatantKind {
    fn from(s: &str) -> Self {
        match s {
            "player" => Self::Player,
            "monster" => Self::Monster,
            "combatant" => Self::Combatant,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for CombatantKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CombatantKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = deserializer.deserialize_any(TextVisitor)?;
        Ok(text.as_deref().map(Self::from).unwrap_or_default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lenient field decoders
// ─────────────────────────────────────────────────────────────────────────────

/// Consume and discard a compound value so the outer decoder stays in sync.
fn drain_map<'de, A: MapAccess<'de>>(mut map: A) -> Result<(), A::Error> {
    while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
    Ok(())
}

fn drain_seq<'de, A: SeqAccess<'de>>(mut seq: A) -> Result<(), A::Error> {
    while seq.next_element::<IgnoredAny>()?.is_some() {}
    Ok(())
}

/// Numbers only; everything else is "not numeric".
struct NumberVisitor;

impl<'de> Visitor<'de> for NumberVisitor {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(v.is_finite().then_some(v))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        drain_map(map).map(|_| None)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        drain_seq(seq).map(|_| None)
    }
}

/// Loose truthiness: `true`, non-zero numbers, non-empty strings, any object or list.
struct TruthyVisitor;

impl<'de> Visitor<'de> for TruthyVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
        Ok(v != 0.0 && !v.is_nan())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        Ok(!v.is_empty())
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<bool, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<bool, A::Error> {
        drain_map(map).map(|_| true)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<bool, A::Error> {
        drain_seq(seq).map(|_| true)
    }
}

/// Strings as-is, numbers stringified, anything else absent.
struct TextVisitor;

impl<'de> Visitor<'de> for TextVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        drain_map(map).map(|_| None)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        drain_seq(seq).map(|_| None)
    }
}

/// A list element decoded with [`TextVisitor`].
struct LenientText(Option<String>);

impl<'de> Deserialize<'de> for LenientText {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(TextVisitor).map(LenientText)
    }
}

/// A list of ids; null or a non-list value is an empty list.
struct IdListVisitor;

impl<'de> Visitor<'de> for IdListVisitor {
    type Value = Vec<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a list of ids")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut ids = Vec::new();
        while let Some(LenientText(id)) = seq.next_element()? {
            ids.extend(id);
        }
        Ok(ids)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        drain_map(map).map(|_| Vec::new())
    }
}

/// Keys of a map in document order; anything that is not a map has no keys.
struct MapKeysVisitor;

impl<'de> Visitor<'de> for MapKeysVisitor {
    type Value = Vec<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of effect names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut keys = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            map.next_value::<IgnoredAny>()?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        drain_seq(seq).map(|_| Vec::new())
    }
}

/// Effect flags from a map; any other value carries no flags.
struct EffectsVisitor;

impl<'de> Visitor<'de> for EffectsVisitor {
    type Value = EffectFlags;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of effect flags")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        EffectFlags::deserialize(de::value::MapAccessDeserializer::new(map))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(EffectFlags::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(EffectFlags::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(EffectFlags::default())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(EffectFlags::default())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(EffectFlags::default())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(EffectFlags::default())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(EffectFlags::default())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
        drain_seq(seq).map(|_| EffectFlags::default())
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    d.deserialize_any(NumberVisitor)
}

fn lenient_round<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let round = d.deserialize_any(NumberVisitor)?;
    Ok(round.map(|r| r.max(0.0).floor() as u32).unwrap_or(0))
}

fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    d.deserialize_any(TruthyVisitor)
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    d.deserialize_any(TextVisitor)
}

fn text_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(d.deserialize_any(TextVisitor)?.unwrap_or_default())
}

fn id_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    d.deserialize_any(IdListVisitor)
}

fn map_keys<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    d.deserialize_any(MapKeysVisitor)
}

fn lenient_effects<'de, D: Deserializer<'de>>(d: D) -> Result<EffectFlags, D::Error> {
    d.deserialize_any(EffectsVisitor)
}

fn serialize_effect_names<S: Serializer>(names: &[String], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(names.iter().map(|name| (name, ())))
}
