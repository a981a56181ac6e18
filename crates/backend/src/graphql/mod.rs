use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, SimpleObject};
use spotguess_shared::models::{self, Difficulty};

use crate::assets::Assets;

// GraphQL output types

#[derive(SimpleObject)]
pub struct GqlRegion {
    pub display_name: String,
    pub file_name: String,
    pub active: bool,
}

impl From<&models::Region> for GqlRegion {
    fn from(r: &models::Region) -> Self {
        GqlRegion {
            display_name: r.display_name.clone(),
            file_name: r.file_name.clone(),
            active: r.active,
        }
    }
}

#[derive(SimpleObject, Clone)]
pub struct GqlPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(SimpleObject)]
pub struct GqlCallout {
    pub location: GqlPosition,
    pub region_name: String,
    pub super_region_name: String,
    pub image_file: String,
}

#[derive(SimpleObject)]
pub struct GqlDifficultyCallouts {
    pub difficulty: String,
    pub callouts: Vec<GqlCallout>,
}

/// Field names line up with the dataset JSON, so clients can deserialize
/// the response straight into `RegionDataset`.
#[derive(SimpleObject)]
pub struct GqlRegionDataset {
    pub display_name: String,
    pub file_path: String,
    pub image_name: String,
    pub map_data: Vec<GqlDifficultyCallouts>,
}

impl From<&models::RegionDataset> for GqlRegionDataset {
    fn from(d: &models::RegionDataset) -> Self {
        GqlRegionDataset {
            display_name: d.display_name.clone(),
            file_path: d.file_path.clone(),
            image_name: d.image_name.clone(),
            map_data: d
                .map_data
                .iter()
                .map(|group| GqlDifficultyCallouts {
                    difficulty: group.difficulty.clone(),
                    callouts: group
                        .callouts
                        .iter()
                        .map(|c| GqlCallout {
                            location: GqlPosition {
                                x: c.location.x,
                                y: c.location.y,
                            },
                            region_name: c.region_name.clone(),
                            super_region_name: c.super_region_name.clone(),
                            image_file: c.image_file.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn regions(&self, ctx: &Context<'_>, active_only: Option<bool>) -> async_graphql::Result<Vec<GqlRegion>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(assets
            .regions
            .iter()
            .filter(|r| !active_only.unwrap_or(false) || r.active)
            .map(GqlRegion::from)
            .collect())
    }

    /// Dataset for one region, or null when the region has none.
    async fn region(
        &self,
        ctx: &Context<'_>,
        file_name: String,
    ) -> async_graphql::Result<Option<GqlRegionDataset>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let file_name = file_name.trim().to_lowercase();
        if assets.find_region_by_file_name(&file_name).is_none() {
            return Err(async_graphql::Error::new(format!(
                "Unknown region: {}",
                file_name
            )));
        }
        Ok(assets.dataset(&file_name).map(GqlRegionDataset::from))
    }

    async fn difficulties(&self) -> Vec<String> {
        Difficulty::ALL.iter().map(|d| d.to_string()).collect()
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(assets: Arc<Assets>) -> Schema {
    async_graphql::Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(assets)
        .finish()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use spotguess_shared::models::{Callout, DifficultyCallouts, Region, RegionDataset};
    use spotguess_shared::Position;

    fn schema() -> Schema {
        let regions = vec![
            Region {
                display_name: "Ascent".to_string(),
                file_name: "ascent".to_string(),
                active: true,
            },
            Region {
                display_name: "Fracture".to_string(),
                file_name: "fracture".to_string(),
                active: false,
            },
        ];
        let mut datasets = HashMap::new();
        datasets.insert(
            "ascent".to_string(),
            RegionDataset {
                display_name: "Ascent".to_string(),
                file_path: "/static/maps/ascent/".to_string(),
                image_name: "minimap.webp".to_string(),
                map_data: vec![DifficultyCallouts {
                    difficulty: "easy".to_string(),
                    callouts: vec![Callout {
                        location: Position::new(0.42, 0.31),
                        region_name: "Market".to_string(),
                        super_region_name: "Mid".to_string(),
                        image_file: "market.webp".to_string(),
                    }],
                }],
            },
        );
        build_schema(Arc::new(Assets::from_parts(regions, datasets)))
    }

    #[tokio::test]
    async fn test_regions_active_only() {
        let resp = schema()
            .execute("{ regions(activeOnly: true) { fileName active } }")
            .await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        let json = resp.data.into_json().unwrap();
        let regions = json["regions"].as_array().unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0]["fileName"], "ascent");
    }

    #[tokio::test]
    async fn test_regions_all() {
        let resp = schema().execute("{ regions { displayName } }").await;
        let json = resp.data.into_json().unwrap();
        assert_eq!(json["regions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_region_dataset_matches_file_shape() {
        let resp = schema()
            .execute(
                r#"{ region(fileName: "Ascent") { displayName filePath imageName
                    mapData { difficulty callouts { location { x y } regionName superRegionName imageFile } } } }"#,
            )
            .await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        let json = resp.data.into_json().unwrap();
        let dataset: RegionDataset = serde_json::from_value(json["region"].clone()).unwrap();
        assert_eq!(dataset.map_image_path(), "/static/maps/ascent/minimap.webp");
        assert_eq!(dataset.map_data[0].callouts[0].location, Position::new(0.42, 0.31));
    }

    #[tokio::test]
    async fn test_region_without_dataset_is_null() {
        let resp = schema()
            .execute(r#"{ region(fileName: "fracture") { displayName } }"#)
            .await;
        assert!(resp.errors.is_empty());
        assert!(resp.data.into_json().unwrap()["region"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_region_is_error() {
        let resp = schema()
            .execute(r#"{ region(fileName: "haven") { displayName } }"#)
            .await;
        assert_eq!(resp.errors.len(), 1);
        assert!(resp.errors[0].message.contains("haven"));
    }

    #[tokio::test]
    async fn test_difficulties() {
        let resp = schema().execute("{ difficulties }").await;
        let json = resp.data.into_json().unwrap();
        assert_eq!(
            json["difficulties"],
            serde_json::json!(["Easy", "Medium", "Hard", "Spells"])
        );
    }
}
