use std::collections::HashMap;
use std::path::{Path, PathBuf};

use spotguess_shared::models::{Region, RegionDataset};
use spotguess_shared::DataLoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Dataset(#[from] DataLoadError),
}

/// Region listing plus every region dataset found on disk.
///
/// Layout under the assets directory:
/// `regions.json`, `data/{fileName}.json` and the images under `maps/`.
pub struct Assets {
    pub regions: Vec<Region>,
    datasets: HashMap<String, RegionDataset>,
}

impl Assets {
    pub fn load(assets_dir: &Path) -> Result<Self, AssetError> {
        let regions_path = assets_dir.join("regions.json");
        let regions_data = std::fs::read_to_string(&regions_path).map_err(|source| {
            AssetError::Read {
                path: regions_path.clone(),
                source,
            }
        })?;
        let regions: Vec<Region> =
            serde_json::from_str(&regions_data).map_err(|source| AssetError::Parse {
                path: regions_path,
                source,
            })?;

        let mut datasets = HashMap::new();
        for region in &regions {
            let path = assets_dir.join("data").join(format!("{}.json", region.file_name));
            let json = match std::fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(region = %region.file_name, "No dataset on disk, skipping");
                    continue;
                }
                Err(source) => return Err(AssetError::Read { path, source }),
            };
            let dataset = RegionDataset::from_json(&region.file_name, &json)?;
            datasets.insert(region.file_name.clone(), dataset);
        }

        tracing::info!(
            regions = regions.len(),
            datasets = datasets.len(),
            "Loaded game assets"
        );

        Ok(Assets { regions, datasets })
    }

    pub fn from_parts(regions: Vec<Region>, datasets: HashMap<String, RegionDataset>) -> Self {
        Assets { regions, datasets }
    }

    pub fn find_region_by_file_name(&self, file_name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.file_name == file_name)
    }

    pub fn dataset(&self, file_name: &str) -> Option<&RegionDataset> {
        self.datasets.get(file_name)
    }
}
