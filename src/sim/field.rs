//! The playing field
//!
//! Owns the live blocks (the source of truth), the grid derived from their
//! pixel positions, both animation queues and the state of the move in
//! progress. Mode-specific decisions are delegated to the field's
//! [`GameModeStrategy`]; everything here is shared between modes.

use glam::{IVec2, Vec2};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::animation::{AnimationQueue, Effect, FinishAction};
use super::block::{Block, BlockId, Team, step_blocks};
use super::matching::{BlockGrid, Bounds, GridEntry, MatchScan, Region, find_matches, region_at};
use super::mode::{GameModeStrategy, strategy_for};
use super::settle::is_settled;
use crate::error::MatchError;
use crate::settings::{GameMode, Settings};

/// Where the current move is. Input is only accepted in `Idle`.
///
/// A swap runs `Idle → Swapping → (commit, re-check) → Clearing | Reverting`;
/// a clear runs `Clearing → Settling → (post-settle hook) → Idle` or loops
/// back through `Clearing`/`Settling` for cascades and refills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePhase {
    Idle,
    /// Swap animation running, commit pending
    Swapping,
    /// Swap matched nothing; bounce-back animation running
    Reverting,
    /// Removal animation running
    Clearing,
    /// Waiting for falling blocks to come to rest
    Settling,
    /// Game-over banner up, restart pending
    GameOver,
}

/// Things the host may want to react to (HUD, sounds, logging)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    ScoreAdded { delta: u64, total: u64 },
    BlocksCleared { count: usize },
    SwapCommitted { a: BlockId, b: BlockId },
    SwapReverted { a: BlockId, b: BlockId },
    GameOver { score: u64 },
    Restarted,
}

#[derive(Debug)]
pub struct Field {
    settings: Settings,
    bounds: Bounds,
    rng: Pcg32,
    blocks: Vec<Block>,
    grid: BlockGrid,
    next_id: u32,
    phase: MovePhase,
    /// Points earned by the move in progress, committed once it fully settles
    pending_score: u64,
    score: u64,
    /// Animations that hold up input until they finish
    blocking: AnimationQueue,
    /// Purely decorative animations
    cosmetic: AnimationQueue,
    drag_start: Option<BlockId>,
    pointer: Option<Vec2>,
    strategy: &'static dyn GameModeStrategy,
    events: Vec<GameEvent>,
    time_ticks: u64,
}

impl Field {
    /// Build a field and fill it with random teams
    pub fn new(settings: Settings) -> Result<Self, MatchError> {
        settings.validate()?;
        let mut field = Self::empty(settings);
        let forbid = field.strategy.forbids_fill_matches();
        field.fill(forbid)?;
        log::info!(
            "Field {}x{} ready ({} mode, seed {})",
            field.bounds.cols,
            field.bounds.rows,
            field.settings.mode.as_str(),
            field.settings.seed
        );
        Ok(field)
    }

    /// Build a field from an explicit layout, `teams[row][col]`.
    ///
    /// The board size is taken from the layout.
    pub fn from_teams(mut settings: Settings, teams: &[Vec<Team>]) -> Result<Self, MatchError> {
        settings.rows = teams.len() as i32;
        settings.cols = teams.first().map_or(0, |r| r.len()) as i32;
        settings.validate()?;
        if teams.iter().any(|r| r.len() as i32 != settings.cols) {
            return Err(MatchError::InvalidSettings("layout rows differ in length".into()));
        }

        let mut field = Self::empty(settings);
        for (row, line) in teams.iter().enumerate() {
            for (col, &team) in line.iter().enumerate() {
                if team >= field.settings.num_teams {
                    return Err(MatchError::InvalidSettings(format!(
                        "team {} at ({}, {}) exceeds num_teams {}",
                        team, col, row, field.settings.num_teams
                    )));
                }
                field.spawn(IVec2::new(col as i32, row as i32), team);
            }
        }
        field.rebuild_grid();
        Ok(field)
    }

    fn empty(settings: Settings) -> Self {
        let bounds = Bounds::new(settings.cols, settings.rows);
        Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            grid: BlockGrid::new(bounds.cols),
            strategy: strategy_for(settings.mode),
            bounds,
            settings,
            blocks: Vec::new(),
            next_id: 1,
            // The post-settle hook runs once on a fresh board
            phase: MovePhase::Settling,
            pending_score: 0,
            score: 0,
            blocking: AnimationQueue::new(),
            cosmetic: AnimationQueue::new(),
            drag_start: None,
            pointer: None,
            events: Vec::new(),
            time_ticks: 0,
        }
    }

    /// Throw the board away and deal a new one with the same settings
    pub fn reset(&mut self) -> Result<(), MatchError> {
        self.blocks.clear();
        self.grid.clear();
        self.blocking.clear();
        self.cosmetic.clear();
        self.drag_start = None;
        self.pending_score = 0;
        self.score = 0;
        self.phase = MovePhase::Settling;
        let forbid = self.strategy.forbids_fill_matches();
        self.fill(forbid)?;
        self.events.push(GameEvent::Restarted);
        log::info!("Field restarted");
        Ok(())
    }

    // --- accessors ---

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> GameMode {
        self.strategy.mode()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Field size in pixels
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.settings.width(), self.settings.height())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    pub fn phase(&self) -> MovePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn pending_score(&self) -> u64 {
        self.pending_score
    }

    pub fn blocking_animations(&self) -> &AnimationQueue {
        &self.blocking
    }

    pub fn cosmetic_animations(&self) -> &AnimationQueue {
        &self.cosmetic
    }

    pub fn drag_start(&self) -> Option<BlockId> {
        self.drag_start
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub(crate) fn strategy(&self) -> &'static dyn GameModeStrategy {
        self.strategy
    }

    /// New player input is refused while a move is in flight
    pub fn input_blocked(&self) -> bool {
        self.phase != MovePhase::Idle || self.blocking.is_active()
    }

    /// Nothing in flight: no move, no blocking animation
    pub fn is_idle(&self) -> bool {
        !self.input_blocked()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Team of every cell, `[row][col]`, from live block positions
    pub fn team_layout(&self) -> Vec<Vec<Option<Team>>> {
        let mut layout = vec![vec![None; self.bounds.cols as usize]; self.bounds.rows as usize];
        for block in &self.blocks {
            let cell = block.cell();
            if self.bounds.contains(cell) {
                layout[cell.y as usize][cell.x as usize] = Some(block.team());
            }
        }
        layout
    }

    // --- grid & matching ---

    /// Re-derive the grid from pixel positions. Call before every match scan.
    pub fn rebuild_grid(&mut self) {
        self.grid.clear();
        for block in &self.blocks {
            let cell = block.cell();
            self.grid.set(
                cell.x,
                cell.y,
                GridEntry {
                    id: block.id,
                    team: block.team(),
                },
            );
        }
    }

    /// Scan the current grid (rebuild it first)
    pub fn find_matches(&self, mark_for_removal: bool) -> MatchScan {
        find_matches(
            &self.grid,
            self.bounds,
            self.settings.match_threshold,
            mark_for_removal,
        )
    }

    /// Region around a cell of the current grid
    pub fn region_at(&self, cell: IVec2) -> Option<Region> {
        region_at(&self.grid, self.bounds, cell)
    }

    pub fn block_at_point(&self, pos: Vec2) -> Option<BlockId> {
        self.blocks.iter().find(|b| b.contains(pos)).map(|b| b.id)
    }

    /// Cell under a pixel position
    pub fn cell_at_point(&self, pos: Vec2) -> IVec2 {
        (pos / self.settings.block_size).floor().as_ivec2()
    }

    pub fn has_empty_cells(&self) -> bool {
        self.bounds.cells().any(|c| self.grid.get(c.x, c.y).is_none())
    }

    // --- board generation ---

    fn spawn(&mut self, cell: IVec2, team: Team) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        let size = self.settings.block_size;
        self.blocks.push(Block::new(
            id,
            cell.as_vec2() * size,
            size,
            team,
            self.settings.num_teams,
        ));
        id
    }

    fn roll_team(&mut self) -> Team {
        self.rng.random_range(0..self.settings.num_teams)
    }

    /// Put a new block into every empty cell of the grid, column by column.
    ///
    /// With `forbid_matches` a new block that completes a match is given each
    /// other team once, in shuffled order, until the board has no match. If no
    /// team works the board is unfillable and an error is returned.
    fn fill(&mut self, forbid_matches: bool) -> Result<(), MatchError> {
        let empty: Vec<IVec2> = self
            .bounds
            .cells()
            .filter(|c| self.grid.get(c.x, c.y).is_none())
            .collect();

        for cell in empty {
            let team = self.roll_team();
            let id = self.spawn(cell, team);
            self.grid.set(cell.x, cell.y, GridEntry { id, team });
            if !forbid_matches || !self.find_matches(false).found {
                continue;
            }

            let mut candidates: Vec<Team> =
                (0..self.settings.num_teams).filter(|&t| t != team).collect();
            candidates.shuffle(&mut self.rng);

            let mut attempts = 1;
            let mut placed = false;
            for candidate in candidates {
                self.set_team(id, candidate);
                self.grid.set(cell.x, cell.y, GridEntry { id, team: candidate });
                attempts += 1;
                if !self.find_matches(false).found {
                    placed = true;
                    break;
                }
            }
            if !placed {
                log::error!(
                    "No team fits ({}, {}) after {} tries with {} teams",
                    cell.x,
                    cell.y,
                    attempts,
                    self.settings.num_teams
                );
                return Err(MatchError::FillExhausted {
                    col: cell.x,
                    row: cell.y,
                    attempts,
                });
            }
        }
        Ok(())
    }

    /// Fill the cells emptied by a clear and wait for the newcomers to land
    pub fn refill(&mut self) -> Result<(), MatchError> {
        self.rebuild_grid();
        let before = self.blocks.len();
        let forbid = self.strategy.forbids_fill_matches();
        self.fill(forbid)?;
        log::debug!("Refilled {} cells", self.blocks.len() - before);
        self.phase = MovePhase::Settling;
        Ok(())
    }

    // --- block mutation ---

    fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    fn set_team(&mut self, id: BlockId, team: Team) {
        let num_teams = self.settings.num_teams;
        if let Some(i) = self.index_of(id) {
            self.blocks[i].set_team(team, num_teams);
        }
    }

    /// Exchange the teams of two blocks and drop their draw offsets.
    /// Either both change or, if one is gone, neither does.
    fn swap_teams(&mut self, a: BlockId, b: BlockId) -> bool {
        let (Some(ia), Some(ib)) = (self.index_of(a), self.index_of(b)) else {
            return false;
        };
        let num_teams = self.settings.num_teams;
        let (ta, tb) = (self.blocks[ia].team(), self.blocks[ib].team());
        self.blocks[ia].set_team(tb, num_teams);
        self.blocks[ib].set_team(ta, num_teams);
        self.blocks[ia].offset = Vec2::ZERO;
        self.blocks[ib].offset = Vec2::ZERO;
        true
    }

    /// Remove blocks from the list and the grid; returns how many were found
    /// and their mean centre
    fn remove_blocks(&mut self, ids: &[BlockId]) -> (usize, Vec2) {
        let mut removed = 0;
        let mut center = Vec2::ZERO;
        for id in ids {
            let Some(i) = self.index_of(*id) else {
                continue;
            };
            let block = self.blocks.remove(i);
            self.grid.remove(GridEntry {
                id: block.id,
                team: block.team(),
            });
            center += block.center();
            removed += 1;
        }
        if removed > 0 {
            center /= removed as f32;
        }
        (removed, center)
    }

    // --- input ---

    pub fn set_pointer(&mut self, pos: Option<Vec2>) {
        self.pointer = pos;
    }

    pub fn begin_drag(&mut self, id: BlockId) {
        self.drag_start = Some(id);
    }

    pub fn take_drag(&mut self) -> Option<BlockId> {
        self.drag_start.take()
    }

    pub fn cancel_drag(&mut self) {
        self.drag_start = None;
    }

    /// The neighbour a drag from `start` released at `pos` points at.
    ///
    /// Releasing inside the start block means no target; otherwise the
    /// dominant axis of the drag picks one of the four neighbours.
    pub fn drag_target(&mut self, start: BlockId, pos: Vec2) -> Option<BlockId> {
        let block = self.block(start)?;
        let delta = pos - block.center();
        let half = block.size() / 2.0;
        if delta.x.abs() < half && delta.y.abs() < half {
            return None;
        }
        let step = if delta.x.abs() >= delta.y.abs() {
            IVec2::new(delta.x.signum() as i32, 0)
        } else {
            IVec2::new(0, delta.y.signum() as i32)
        };
        let cell = block.cell() + step;

        self.rebuild_grid();
        if !self.bounds.contains(cell) {
            log::warn!("Drag released off the board towards {}", cell);
            return None;
        }
        self.grid.get(cell.x, cell.y).map(|e| e.id)
    }

    // --- move flow ---

    pub fn add_score(&mut self, delta: u64) {
        if delta == 0 {
            return;
        }
        self.score += delta;
        self.events.push(GameEvent::ScoreAdded {
            delta,
            total: self.score,
        });
    }

    pub fn add_pending_score(&mut self, delta: u64) {
        self.pending_score += delta;
    }

    /// Hand the points of a finished move to the score
    pub fn commit_pending_score(&mut self) {
        let delta = std::mem::take(&mut self.pending_score);
        self.add_score(delta);
    }

    /// Start the swap animation; the swap itself commits when it finishes
    pub fn start_swap(&mut self, a: BlockId, b: BlockId) {
        self.blocking
            .start(Effect::Swap { a, b }, Some(FinishAction::CommitSwap { a, b }));
        self.phase = MovePhase::Swapping;
    }

    /// Start the removal animation for `blocks`
    pub fn start_clear(&mut self, blocks: Vec<BlockId>) {
        log::debug!("Clearing {} blocks", blocks.len());
        self.blocking.start(
            Effect::kill(blocks.clone()),
            Some(FinishAction::RemoveBlocks { blocks }),
        );
        self.phase = MovePhase::Clearing;
    }

    /// Rebuild the grid, and if anything matches start clearing it
    pub fn clear_matches(&mut self) -> bool {
        self.rebuild_grid();
        let scan = self.find_matches(true);
        if !scan.found {
            return false;
        }
        log::debug!(
            "{} region(s) matched, {} blocks",
            scan.regions.len(),
            scan.to_remove.len()
        );
        self.start_clear(scan.to_remove);
        true
    }

    /// Show the game-over banner; restarts when it goes away. Only the first
    /// call per board has any effect.
    pub fn enter_game_over(&mut self) {
        if self.phase == MovePhase::GameOver {
            return;
        }
        log::info!("Game over with score {}", self.score);
        self.phase = MovePhase::GameOver;
        self.events.push(GameEvent::GameOver { score: self.score });
        self.blocking.start(
            Effect::text_box(
                format!("Game over! Score: {}", self.score),
                self.settings.game_over_ticks,
            ),
            Some(FinishAction::Restart),
        );
    }

    fn apply(&mut self, action: FinishAction) -> Result<(), MatchError> {
        match action {
            FinishAction::CommitSwap { a, b } => {
                if !self.swap_teams(a, b) {
                    self.phase = MovePhase::Idle;
                    return Ok(());
                }
                log::debug!("Swap committed {:?} <-> {:?}", a, b);
                self.events.push(GameEvent::SwapCommitted { a, b });
                if !self.clear_matches() {
                    self.blocking
                        .start(Effect::Swap { a, b }, Some(FinishAction::RevertSwap { a, b }));
                    self.phase = MovePhase::Reverting;
                }
            }
            FinishAction::RevertSwap { a, b } => {
                self.swap_teams(a, b);
                log::debug!("Swap reverted {:?} <-> {:?}", a, b);
                self.events.push(GameEvent::SwapReverted { a, b });
                self.phase = MovePhase::Idle;
            }
            FinishAction::RemoveBlocks { blocks } => {
                let (count, center) = self.remove_blocks(&blocks);
                let points = self
                    .strategy
                    .points_for(count, self.settings.match_threshold);
                let strategy = self.strategy;
                strategy.on_blocks_removed(self, points);

                let wiggle = self.rng.random_range(10..50) as f32;
                self.cosmetic
                    .start(Effect::fading_text(format!("+{}", points), center, wiggle), None);
                self.events.push(GameEvent::BlocksCleared { count });
                self.phase = MovePhase::Settling;
            }
            FinishAction::Restart => self.reset()?,
        }
        Ok(())
    }

    // --- per-tick passes ---

    pub(crate) fn advance_clock(&mut self) {
        self.time_ticks += 1;
    }

    pub fn step_physics(&mut self) {
        let extent = self.extent();
        step_blocks(&mut self.blocks, extent);
    }

    pub fn is_settled(&self) -> bool {
        is_settled(&self.blocks, self.settings.height())
    }

    /// Leave `Settling` once nothing is falling and no blocking animation is
    /// running, then run the post-settle hook. Fires exactly once per settle.
    pub fn check_settled(&mut self) -> Result<(), MatchError> {
        if self.phase != MovePhase::Settling || self.blocking.is_active() || !self.is_settled() {
            return Ok(());
        }
        self.phase = MovePhase::Idle;
        let strategy = self.strategy;
        strategy.after_settle(self)
    }

    /// Poll both queues once and apply whatever finished
    pub fn advance_animations(&mut self) -> Result<(), MatchError> {
        let finished = self.blocking.update(&mut self.blocks);
        for action in finished {
            self.apply(action)?;
        }
        let finished = self.cosmetic.update(&mut self.blocks);
        for action in finished {
            self.apply(action)?;
        }
        Ok(())
    }
}
