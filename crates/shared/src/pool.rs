use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::{debug, warn};

use crate::error::DataLoadError;
use crate::models::{GameSettings, RegionDataset, RoundTarget};

/// Something that can hand out a region's dataset by file name.
///
/// The backend implements this over its loaded assets; tests use an
/// in-memory map. Browser clients fetch asynchronously and feed the results
/// to [`crate::game::GameSession::complete_load`] instead.
pub trait DatasetSource {
    fn load_region(&self, region: &str) -> Result<RegionDataset, DataLoadError>;
}

impl DatasetSource for HashMap<String, RegionDataset> {
    fn load_region(&self, region: &str) -> Result<RegionDataset, DataLoadError> {
        self.get(region)
            .cloned()
            .ok_or_else(|| DataLoadError::RegionNotFound(region.to_string()))
    }
}

/// Outcome of drawing from the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Draw<'a> {
    Target(&'a RoundTarget),
    /// Every target has been used since the last reset.
    Exhausted,
    Empty,
}

/// Targets available to a game session, with the set already played.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePool {
    targets: Vec<RoundTarget>,
    used: HashSet<String>,
}

impl ImagePool {
    /// Build a pool, dropping targets whose id was already seen.
    pub fn new(targets: impl IntoIterator<Item = RoundTarget>) -> Self {
        let mut pool = ImagePool::default();
        let mut seen = HashSet::new();
        for target in targets {
            if seen.insert(target.id.clone()) {
                pool.targets.push(target);
            } else {
                debug!(id = %target.id, "Skipping duplicate target");
            }
        }
        pool
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[RoundTarget] {
        &self.targets
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Mark a target as played. Ids not in the pool are ignored.
    pub fn mark_used(&mut self, id: &str) {
        if self.targets.iter().any(|t| t.id == id) {
            self.used.insert(id.to_string());
        }
    }

    pub fn reset_used(&mut self) {
        self.used.clear();
    }

    /// Uniform pick among targets not yet used.
    pub fn select_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Draw<'_> {
        if self.targets.is_empty() {
            return Draw::Empty;
        }
        let unused: Vec<&RoundTarget> = self
            .targets
            .iter()
            .filter(|t| !self.used.contains(&t.id))
            .collect();
        if unused.is_empty() {
            return Draw::Exhausted;
        }
        Draw::Target(unused[rng.random_range(0..unused.len())])
    }
}

/// Build a pool from already-fetched region datasets.
///
/// Each dataset contributes the callouts matching the settings' difficulty,
/// tagged with its region name. Datasets for unselected regions are skipped.
pub fn pool_from_datasets<'a>(
    settings: &GameSettings,
    datasets: impl IntoIterator<Item = (&'a str, &'a RegionDataset)>,
) -> ImagePool {
    let mut targets = Vec::new();
    for (region, dataset) in datasets {
        let region = region.to_lowercase();
        if !settings.selected_regions.contains(&region) {
            warn!(region = %region, "Ignoring dataset for unselected region");
            continue;
        }
        let before = targets.len();
        targets.extend(
            dataset
                .callouts_for(settings.difficulty)
                .map(|c| RoundTarget::from_callout(&region, dataset, settings.difficulty, c)),
        );
        debug!(region = %region, count = targets.len() - before, "Loaded region callouts");
    }
    ImagePool::new(targets)
}

/// Fetch every selected region from `source` and build the pool.
pub fn load_for_settings<S: DatasetSource + ?Sized>(
    settings: &GameSettings,
    source: &S,
) -> Result<ImagePool, DataLoadError> {
    let mut datasets = Vec::with_capacity(settings.selected_regions.len());
    for region in &settings.selected_regions {
        datasets.push((region.as_str(), source.load_region(region)?));
    }
    Ok(pool_from_datasets(
        settings,
        datasets.iter().map(|(r, d)| (*r, d)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Callout, Difficulty, DifficultyCallouts, Position};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn callout(name: &str, x: f64, y: f64) -> Callout {
        Callout {
            location: Position { x, y },
            region_name: name.to_string(),
            super_region_name: String::new(),
            image_file: format!("{}.webp", name.to_lowercase()),
        }
    }

    fn dataset(name: &str, easy: &[&str], hard: &[&str]) -> RegionDataset {
        RegionDataset {
            display_name: name.to_string(),
            file_path: format!("/static/maps/{}/", name.to_lowercase()),
            image_name: "minimap.webp".to_string(),
            map_data: vec![
                DifficultyCallouts {
                    difficulty: "Easy".to_string(),
                    callouts: easy.iter().map(|n| callout(n, 0.5, 0.5)).collect(),
                },
                DifficultyCallouts {
                    difficulty: "HARD".to_string(),
                    callouts: hard.iter().map(|n| callout(n, 0.1, 0.9)).collect(),
                },
            ],
        }
    }

    fn source() -> HashMap<String, RegionDataset> {
        let mut m = HashMap::new();
        m.insert("ascent".to_string(), dataset("Ascent", &["Main", "Tree"], &["Rafters"]));
        m.insert("bind".to_string(), dataset("Bind", &["Hookah"], &["Lamps", "Showers"]));
        m
    }

    fn settings(difficulty: &str, regions: &[&str]) -> GameSettings {
        GameSettings::parse(difficulty, regions.iter().copied(), 5).unwrap()
    }

    #[test]
    fn test_load_filters_by_difficulty_and_region() {
        let pool = load_for_settings(&settings("easy", &["ascent"]), &source()).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool.targets().iter().all(|t| t.map_name == "ascent"));
        assert!(pool.targets().iter().all(|t| t.difficulty == Difficulty::Easy));
    }

    #[test]
    fn test_load_appends_each_selected_region() {
        let pool = load_for_settings(&settings("Hard", &["ascent", "bind"]), &source()).unwrap();
        assert_eq!(pool.len(), 3);
        let maps: HashSet<_> = pool.targets().iter().map(|t| t.map_name.as_str()).collect();
        assert!(maps.contains("ascent") && maps.contains("bind"));
    }

    #[test]
    fn test_load_unknown_region_fails() {
        let err = load_for_settings(&settings("Easy", &["lotus"]), &source()).unwrap_err();
        assert_eq!(err, DataLoadError::RegionNotFound("lotus".to_string()));
    }

    #[test]
    fn test_pool_dedups_ids() {
        let ds = dataset("Ascent", &["Main", "Main"], &[]);
        let s = settings("Easy", &["ascent"]);
        let pool = pool_from_datasets(&s, [("ascent", &ds)]);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_pool_skips_unselected_region() {
        let ds = dataset("Bind", &["Hookah"], &[]);
        let s = settings("Easy", &["ascent"]);
        assert!(pool_from_datasets(&s, [("bind", &ds)]).is_empty());
    }

    #[test]
    fn test_select_random_empty_pool() {
        let pool = ImagePool::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pool.select_random(&mut rng), Draw::Empty);
    }

    #[test]
    fn test_select_random_skips_used_then_exhausts() {
        let mut pool = load_for_settings(&settings("Easy", &["ascent"]), &source()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut picked = HashSet::new();
        for _ in 0..2 {
            let Draw::Target(t) = pool.select_random(&mut rng) else {
                panic!("expected a target");
            };
            let id = t.id.clone();
            assert!(picked.insert(id.clone()), "picked {id} twice");
            pool.mark_used(&id);
        }
        assert_eq!(pool.select_random(&mut rng), Draw::Exhausted);
        pool.reset_used();
        assert!(matches!(pool.select_random(&mut rng), Draw::Target(_)));
    }

    #[test]
    fn test_mark_used_ignores_foreign_ids() {
        let mut pool = load_for_settings(&settings("Easy", &["ascent"]), &source()).unwrap();
        pool.mark_used("bind/easy/hookah.webp");
        assert_eq!(pool.used_count(), 0);
    }

    #[test]
    fn test_select_random_covers_all_targets() {
        let pool = load_for_settings(&settings("Hard", &["ascent", "bind"]), &source()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            if let Draw::Target(t) = pool.select_random(&mut rng) {
                seen.insert(t.id.clone());
            }
        }
        assert_eq!(seen.len(), 3);
    }
}
