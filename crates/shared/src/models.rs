use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DataLoadError};

/// A point in normalized map space (0..1 on both axes) or in pixels,
/// depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Spells,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Spells,
    ];

    /// Lower-case key used in dataset files and asset paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Spells => "spells",
        }
    }

    /// Case-insensitive match against a dataset difficulty tag.
    pub fn matches(&self, tag: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(tag.trim())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
            Difficulty::Spells => write!(f, "Spells"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.matches(s))
            .ok_or_else(|| ConfigError::UnknownDifficulty(s.to_string()))
    }
}

/// Settings chosen in the menu. Fixed for the lifetime of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub selected_regions: BTreeSet<String>,
    pub num_rounds: u32,
}

impl GameSettings {
    /// Build settings from raw menu input, validating every field.
    pub fn parse<I, S>(difficulty: &str, regions: I, num_rounds: u32) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let settings = GameSettings {
            difficulty: difficulty.parse()?,
            selected_regions: regions
                .into_iter()
                .map(Into::into)
                .map(|r: String| r.trim().to_lowercase())
                .filter(|r| !r.is_empty())
                .collect(),
            num_rounds,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selected_regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        if self.num_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        Ok(())
    }
}

/// Menu-facing listing entry for a playable region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub display_name: String,
    pub file_name: String,
    pub active: bool,
}

/// One screenshot location inside a region dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Callout {
    pub location: Position,
    pub region_name: String,
    #[serde(default)]
    pub super_region_name: String,
    pub image_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyCallouts {
    pub difficulty: String,
    #[serde(default)]
    pub callouts: Vec<Callout>,
}

/// A pre-shipped per-region dataset, as stored in `assets/data/{region}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDataset {
    pub display_name: String,
    pub file_path: String,
    pub image_name: String,
    #[serde(default)]
    pub map_data: Vec<DifficultyCallouts>,
}

impl RegionDataset {
    pub fn from_json(region: &str, json: &str) -> Result<Self, DataLoadError> {
        serde_json::from_str(json).map_err(|e| DataLoadError::Parse {
            region: region.to_string(),
            message: e.to_string(),
        })
    }

    /// Path of the full map image the player clicks on.
    pub fn map_image_path(&self) -> String {
        format!("{}{}", self.file_path, self.image_name)
    }

    /// Callouts tagged with `difficulty`, compared case-insensitively.
    pub fn callouts_for(&self, difficulty: Difficulty) -> impl Iterator<Item = &Callout> {
        self.map_data
            .iter()
            .filter(move |group| difficulty.matches(&group.difficulty))
            .flat_map(|group| group.callouts.iter())
    }
}

/// The answer for a round: where a screenshot was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTarget {
    pub id: String,
    pub map_name: String,
    pub image_name: String,
    pub callout_name: String,
    pub location: Position,
    pub difficulty: Difficulty,
    pub map_image: String,
}

impl RoundTarget {
    pub fn from_callout(
        region: &str,
        dataset: &RegionDataset,
        difficulty: Difficulty,
        callout: &Callout,
    ) -> Self {
        let region = region.to_lowercase();
        RoundTarget {
            id: format!("{}/{}/{}", region, difficulty.as_str(), callout.image_file),
            map_name: region,
            image_name: callout.image_file.clone(),
            callout_name: callout.region_name.clone(),
            location: callout.location,
            difficulty,
            map_image: dataset.map_image_path(),
        }
    }

    /// Path of the cropped screenshot shown to the player.
    pub fn image_path(&self) -> String {
        format!(
            "/static/maps/{}/{}/{}",
            self.map_name,
            self.difficulty.as_str(),
            self.image_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCENT_JSON: &str = r#"{
        "displayName": "Ascent",
        "filePath": "/static/maps/ascent/",
        "imageName": "minimap.webp",
        "mapData": [
            {"difficulty": "Easy", "callouts": [
                {"location": {"x": 0.25, "y": 0.5}, "regionName": "Main", "superRegionName": "A", "imageFile": "a_main.webp"}
            ]},
            {"difficulty": "hard", "callouts": [
                {"location": {"x": 0.75, "y": 0.1}, "regionName": "Rafters", "superRegionName": "B", "imageFile": "b_rafters.webp"}
            ]}
        ]
    }"#;

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" Spells ".parse::<Difficulty>().unwrap(), Difficulty::Spells);
    }

    #[test]
    fn test_difficulty_parse_unknown() {
        let err = "nightmare".parse::<Difficulty>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownDifficulty("nightmare".to_string()));
    }

    #[test]
    fn test_settings_parse_normalizes_regions() {
        let s = GameSettings::parse("Medium", ["Ascent", " bind ", ""], 5).unwrap();
        assert_eq!(s.difficulty, Difficulty::Medium);
        assert!(s.selected_regions.contains("ascent"));
        assert!(s.selected_regions.contains("bind"));
        assert_eq!(s.selected_regions.len(), 2);
    }

    #[test]
    fn test_settings_parse_rejects_empty_regions() {
        let err = GameSettings::parse("Easy", Vec::<String>::new(), 5).unwrap_err();
        assert_eq!(err, ConfigError::NoRegions);
    }

    #[test]
    fn test_settings_parse_rejects_zero_rounds() {
        let err = GameSettings::parse("Easy", ["ascent"], 0).unwrap_err();
        assert_eq!(err, ConfigError::NoRounds);
    }

    #[test]
    fn test_dataset_deserializes() {
        let ds = RegionDataset::from_json("ascent", ASCENT_JSON).unwrap();
        assert_eq!(ds.display_name, "Ascent");
        assert_eq!(ds.map_image_path(), "/static/maps/ascent/minimap.webp");
        assert_eq!(ds.map_data.len(), 2);
        assert_eq!(ds.map_data[0].callouts[0].super_region_name, "A");
    }

    #[test]
    fn test_dataset_parse_error_names_region() {
        let err = RegionDataset::from_json("bind", "{not json").unwrap_err();
        match err {
            DataLoadError::Parse { region, .. } => assert_eq!(region, "bind"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_callouts_for_filters_case_insensitively() {
        let ds = RegionDataset::from_json("ascent", ASCENT_JSON).unwrap();
        let easy: Vec<_> = ds.callouts_for(Difficulty::Easy).collect();
        assert_eq!(easy.len(), 1);
        assert_eq!(easy[0].region_name, "Main");
        let hard: Vec<_> = ds.callouts_for(Difficulty::Hard).collect();
        assert_eq!(hard.len(), 1);
        assert_eq!(ds.callouts_for(Difficulty::Spells).count(), 0);
    }

    #[test]
    fn test_round_target_paths() {
        let ds = RegionDataset::from_json("Ascent", ASCENT_JSON).unwrap();
        let callout = &ds.map_data[0].callouts[0];
        let t = RoundTarget::from_callout("Ascent", &ds, Difficulty::Easy, callout);
        assert_eq!(t.id, "ascent/easy/a_main.webp");
        assert_eq!(t.map_name, "ascent");
        assert_eq!(t.image_path(), "/static/maps/ascent/easy/a_main.webp");
        assert_eq!(t.map_image, "/static/maps/ascent/minimap.webp");
    }
}
