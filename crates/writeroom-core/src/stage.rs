use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A writing activity category whose time is budgeted separately.
///
/// Declaration order is the iteration order used everywhere. It carries no
/// priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Prewriting,
    Writing,
    Rewriting,
    Skillbuilding,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Prewriting,
        Stage::Writing,
        Stage::Rewriting,
        Stage::Skillbuilding,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Prewriting => "prewriting",
            Stage::Writing => "writing",
            Stage::Rewriting => "rewriting",
            Stage::Skillbuilding => "skillbuilding",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && *c != ' ')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "prewriting" => Ok(Stage::Prewriting),
            "writing" => Ok(Stage::Writing),
            "rewriting" => Ok(Stage::Rewriting),
            "skillbuilding" => Ok(Stage::Skillbuilding),
            "" => Err(ValidationError::MissingField("stage")),
            _ => Err(ValidationError::InvalidValue {
                field: "stage".into(),
                message: format!("unknown stage '{s}'"),
            }),
        }
    }
}

/// One value per stage, serialized as a flat object keyed by stage name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMap<T> {
    pub prewriting: T,
    pub writing: T,
    pub rewriting: T,
    pub skillbuilding: T,
}

impl<T: Copy> StageMap<T> {
    pub fn splat(value: T) -> Self {
        Self {
            prewriting: value,
            writing: value,
            rewriting: value,
            skillbuilding: value,
        }
    }

    pub fn get(&self, stage: Stage) -> T {
        match stage {
            Stage::Prewriting => self.prewriting,
            Stage::Writing => self.writing,
            Stage::Rewriting => self.rewriting,
            Stage::Skillbuilding => self.skillbuilding,
        }
    }

    /// Pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, T)> + '_ {
        Stage::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

impl<T> StageMap<T> {
    pub fn get_mut(&mut self, stage: Stage) -> &mut T {
        match stage {
            Stage::Prewriting => &mut self.prewriting,
            Stage::Writing => &mut self.writing,
            Stage::Rewriting => &mut self.rewriting,
            Stage::Skillbuilding => &mut self.skillbuilding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("Writing".parse::<Stage>().unwrap(), Stage::Writing);
        assert_eq!(
            "skill-building".parse::<Stage>().unwrap(),
            Stage::Skillbuilding
        );
        assert_eq!(
            "skill_building".parse::<Stage>().unwrap(),
            Stage::Skillbuilding
        );
        assert!("editing".parse::<Stage>().is_err());
        assert_eq!(
            "  ".parse::<Stage>(),
            Err(ValidationError::MissingField("stage"))
        );
    }

    #[test]
    fn stage_map_serializes_as_flat_object() {
        let map = StageMap::splat(18000u64);
        let json = serde_json::to_value(map).unwrap();
        assert_eq!(json["skillbuilding"], 18000);
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn iteration_follows_declaration_order() {
        let mut map = StageMap::splat(0u64);
        *map.get_mut(Stage::Rewriting) = 7;
        let stages: Vec<_> = map.iter().map(|(s, _)| s).collect();
        assert_eq!(stages, Stage::ALL.to_vec());
        assert_eq!(map.get(Stage::Rewriting), 7);
    }
}
