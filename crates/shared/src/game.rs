use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calc::{self, GuessResult};
use crate::config::GameConfig;
use crate::error::{DataLoadError, GameError, GuessError};
use crate::models::{Difficulty, GameSettings, Position, RegionDataset, RoundTarget};
use crate::pool::{self, DatasetSource, Draw, ImagePool};
use crate::viewport::{Key, KeyOutcome, Viewport};

/// Identifies one dataset load. Results carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// What the caller must fetch before the first round can begin.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub regions: Vec<String>,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Loading,
    InRound,
    RoundResolved,
    GameOver,
    LoadFailed(DataLoadError),
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::NotStarted => "not started",
            Phase::Loading => "loading",
            Phase::InRound => "in round",
            Phase::RoundResolved => "round resolved",
            Phase::GameOver => "game over",
            Phase::LoadFailed(_) => "load failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Started,
    /// The result belonged to a superseded session and was dropped.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAdvance {
    NextRound(u32),
    GameOver,
}

/// Per-round counters. Only the session mutates these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    round: u32,
    score: u32,
    total_score: u64,
    valid_guess: bool,
    have_guessed: bool,
}

impl RoundState {
    fn first() -> Self {
        RoundState {
            round: 1,
            ..RoundState::default()
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Score of the most recently validated round.
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn valid_guess(&self) -> bool {
        self.valid_guess
    }

    pub fn have_guessed(&self) -> bool {
        self.have_guessed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub round: u32,
    pub target_id: String,
    pub guess: Position,
    pub truth: Position,
    pub distance_meters: f64,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Good,
    NeedsPractice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub total_score: u64,
    pub max_possible_score: u64,
    pub rounds: Vec<RoundResult>,
    /// Percent of the maximum achievable score.
    pub average_accuracy: f64,
    pub verdict: Verdict,
}

/// One player's game: settings, image pool, round counters and the map
/// viewer state. Owned by the composition root; every transition goes
/// through a command method.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    rng: StdRng,
    phase: Phase,
    settings: Option<GameSettings>,
    pool: ImagePool,
    round: RoundState,
    active: Option<RoundTarget>,
    guess: Option<Position>,
    current_distance: Option<f64>,
    history: Vec<RoundResult>,
    viewport: Viewport,
    generation: u64,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::NotStarted,
            settings: None,
            pool: ImagePool::default(),
            round: RoundState::default(),
            active: None,
            guess: None,
            current_distance: None,
            history: Vec::new(),
            viewport: Viewport::new(config.viewport),
            generation: 0,
        }
    }

    // --- Getters ---

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn round_state(&self) -> RoundState {
        self.round
    }

    pub fn settings(&self) -> Option<&GameSettings> {
        self.settings.as_ref()
    }

    pub fn pool(&self) -> &ImagePool {
        &self.pool
    }

    pub fn active_target(&self) -> Option<&RoundTarget> {
        self.active.as_ref()
    }

    /// Screenshot shown for the active round.
    pub fn image_path(&self) -> Option<String> {
        self.active.as_ref().map(RoundTarget::image_path)
    }

    /// Map the player clicks on for the active round.
    pub fn map_image_path(&self) -> Option<&str> {
        self.active.as_ref().map(|t| t.map_image.as_str())
    }

    pub fn guess(&self) -> Option<Position> {
        self.guess
    }

    /// Distance in meters between the current guess and the truth.
    pub fn current_distance(&self) -> Option<f64> {
        self.current_distance
    }

    pub fn history(&self) -> &[RoundResult] {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// End-of-game summary, available once the last round is done.
    pub fn summary(&self) -> Option<GameSummary> {
        if self.phase != Phase::GameOver {
            return None;
        }
        let rounds = self.history.len() as u32;
        let scoring = &self.config.scoring;
        let average_accuracy = calc::accuracy_percent(self.round.total_score, rounds, scoring);
        let verdict = if average_accuracy >= scoring.good_accuracy_threshold {
            Verdict::Good
        } else {
            Verdict::NeedsPractice
        };
        Some(GameSummary {
            total_score: self.round.total_score,
            max_possible_score: u64::from(rounds) * u64::from(scoring.max_score),
            rounds: self.history.clone(),
            average_accuracy,
            verdict,
        })
    }

    fn invalid(&self, action: &'static str) -> GameError {
        GameError::InvalidTransition {
            action,
            phase: self.phase.name(),
        }
    }

    // --- Lifecycle ---

    /// Validate settings and enter the loading state. The caller fetches the
    /// requested regions and hands them to [`GameSession::complete_load`].
    pub fn start_game(&mut self, settings: GameSettings) -> Result<LoadRequest, GameError> {
        if !matches!(self.phase, Phase::NotStarted | Phase::LoadFailed(_)) {
            return Err(self.invalid("start a game"));
        }
        settings.validate()?;

        self.generation += 1;
        let request = LoadRequest {
            ticket: LoadTicket(self.generation),
            regions: settings.selected_regions.iter().cloned().collect(),
            difficulty: settings.difficulty,
        };
        info!(
            difficulty = %settings.difficulty,
            regions = ?request.regions,
            rounds = settings.num_rounds,
            "Starting game"
        );
        self.settings = Some(settings);
        self.phase = Phase::Loading;
        Ok(request)
    }

    /// Apply the result of a dataset load. Stale results are discarded.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<(String, RegionDataset)>, DataLoadError>,
    ) -> Result<LoadOutcome, GameError> {
        if self.phase != Phase::Loading || ticket.0 != self.generation {
            debug!(ticket = ticket.0, current = self.generation, "Discarding stale load result");
            return Ok(LoadOutcome::Discarded);
        }
        let Some(settings) = self.settings.as_ref() else {
            return Err(self.invalid("complete a load"));
        };

        let pool = result.and_then(|datasets| {
            let pool = pool::pool_from_datasets(
                settings,
                datasets.iter().map(|(region, ds)| (region.as_str(), ds)),
            );
            if pool.is_empty() {
                Err(DataLoadError::NoTargets {
                    difficulty: settings.difficulty.to_string(),
                })
            } else {
                Ok(pool)
            }
        });

        match pool {
            Ok(pool) => {
                info!(targets = pool.len(), "Image pool loaded");
                self.pool = pool;
                self.round = RoundState::first();
                self.history.clear();
                self.begin_round()?;
                Ok(LoadOutcome::Started)
            }
            Err(e) => {
                warn!(error = %e, "Image pool load failed");
                self.phase = Phase::LoadFailed(e.clone());
                Err(e.into())
            }
        }
    }

    /// Start a game and load it synchronously from `source`.
    pub fn start_game_with<S: DatasetSource + ?Sized>(
        &mut self,
        settings: GameSettings,
        source: &S,
    ) -> Result<(), GameError> {
        let request = self.start_game(settings)?;
        let datasets = request
            .regions
            .iter()
            .map(|region| Ok((region.clone(), source.load_region(region)?)))
            .collect::<Result<Vec<_>, DataLoadError>>();
        self.complete_load(request.ticket, datasets).map(|_| ())
    }

    fn draw_target(&mut self) -> Result<RoundTarget, GameError> {
        let mut draw = self.pool.select_random(&mut self.rng);
        if draw == Draw::Exhausted {
            info!(targets = self.pool.len(), "All targets used, resetting pool");
            self.pool.reset_used();
            draw = self.pool.select_random(&mut self.rng);
        }
        let target = match draw {
            Draw::Target(t) => t.clone(),
            Draw::Exhausted | Draw::Empty => {
                return Err(DataLoadError::NoTargets {
                    difficulty: self
                        .settings
                        .as_ref()
                        .map(|s| s.difficulty.to_string())
                        .unwrap_or_default(),
                }
                .into())
            }
        };
        self.pool.mark_used(&target.id);
        Ok(target)
    }

    fn begin_round(&mut self) -> Result<(), GameError> {
        let target = self.draw_target()?;
        self.begin_round_with(target);
        Ok(())
    }

    fn begin_round_with(&mut self, target: RoundTarget) {
        debug!(round = self.round.round, target = %target.id, "Round started");
        self.active = Some(target);
        self.guess = None;
        self.current_distance = None;
        self.round.valid_guess = false;
        self.round.have_guessed = false;
        self.viewport.reset();
        self.phase = Phase::InRound;
    }

    /// Advance past a resolved round.
    pub fn next_round(&mut self) -> Result<RoundAdvance, GameError> {
        if self.phase != Phase::RoundResolved {
            return Err(self.invalid("advance the round"));
        }
        let num_rounds = self.settings.as_ref().map_or(1, |s| s.num_rounds);
        if self.round.round >= num_rounds {
            info!(total_score = self.round.total_score, "Game over");
            self.phase = Phase::GameOver;
            return Ok(RoundAdvance::GameOver);
        }
        let target = self.draw_target()?;
        self.round.round += 1;
        self.begin_round_with(target);
        Ok(RoundAdvance::NextRound(self.round.round))
    }

    /// Play again with the same settings and pool; every target is eligible again.
    pub fn restart(&mut self) -> Result<(), GameError> {
        if !matches!(
            self.phase,
            Phase::InRound | Phase::RoundResolved | Phase::GameOver
        ) {
            return Err(self.invalid("restart"));
        }
        self.pool.reset_used();
        let target = self.draw_target()?;
        self.round = RoundState::first();
        self.history.clear();
        self.begin_round_with(target);
        info!("Game restarted");
        Ok(())
    }

    /// Drop the session entirely, including settings. Pending loads go stale.
    pub fn back_to_menu(&mut self) {
        self.generation += 1;
        self.phase = Phase::NotStarted;
        self.settings = None;
        self.pool = ImagePool::default();
        self.round = RoundState::default();
        self.active = None;
        self.guess = None;
        self.current_distance = None;
        self.history.clear();
        self.viewport = Viewport::new(self.config.viewport);
        debug!("Returned to menu");
    }

    // --- Guessing ---

    /// Record (or replace) the guess for the active round. Ignored once the
    /// round's guess is validated or outside a round.
    pub fn capture_guess(&mut self, point: Position) -> bool {
        if self.phase != Phase::InRound || self.round.valid_guess {
            return false;
        }
        let point = Position {
            x: point.x.clamp(0.0, 1.0),
            y: point.y.clamp(0.0, 1.0),
        };
        self.guess = Some(point);
        self.round.have_guessed = true;
        self.current_distance = self.active.as_ref().map(|t| {
            calc::to_meters(calc::distance(point, t.location), &self.config.scoring)
        });
        true
    }

    /// Capture a guess from a double-click at a client position, through the
    /// live viewport transform.
    pub fn double_click(&mut self, client: Position) -> bool {
        if self.phase != Phase::InRound || self.round.valid_guess {
            return false;
        }
        match self.viewport.pointer_to_normalized(client) {
            Some(point) => self.capture_guess(point),
            None => false,
        }
    }

    /// Feed a touch tap; a double tap captures a guess like a double-click.
    pub fn double_tap(&mut self, client: Position, time_ms: f64) -> bool {
        self.viewport.register_tap(client, time_ms) && self.double_click(client)
    }

    /// Lock the round's guess and score it.
    pub fn validate_guess(&mut self) -> Result<GuessResult, GameError> {
        if self.round.valid_guess {
            return Err(GuessError::AlreadyValidated.into());
        }
        if self.phase != Phase::InRound {
            return Err(GuessError::NoTarget.into());
        }
        let truth = self.active.as_ref().ok_or(GuessError::NoTarget)?;
        let guess = match self.guess {
            Some(g) if self.round.have_guessed => g,
            _ => return Err(GuessError::NoGuess.into()),
        };

        let result = calc::evaluate_guess(guess, truth.location, &self.config.scoring);
        self.history.push(RoundResult {
            round: self.round.round,
            target_id: truth.id.clone(),
            guess,
            truth: truth.location,
            distance_meters: result.distance_meters,
            score: result.score,
        });
        self.round.score = result.score;
        self.round.total_score += u64::from(result.score);
        self.round.valid_guess = true;
        self.current_distance = Some(result.distance_meters);
        self.viewport.exit_fullscreen();
        self.phase = Phase::RoundResolved;
        info!(
            round = self.round.round,
            distance_m = result.distance_meters,
            score = result.score,
            total = self.round.total_score,
            "Guess validated"
        );
        Ok(result)
    }

    /// Route a key to the viewport; `Enter` validates when a guess is pending.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let outcome = self.viewport.handle_key(key);
        if outcome == KeyOutcome::ValidateGuess {
            if self.phase == Phase::InRound && self.round.have_guessed && !self.round.valid_guess {
                if let Err(e) = self.validate_guess() {
                    warn!(error = %e, "Keyboard validation failed");
                }
            } else {
                return KeyOutcome::Ignored;
            }
        }
        outcome
    }
}
