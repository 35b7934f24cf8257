/// Session: the screen flow around the per-level simulation.
///
///   Title ──start──▶ Playing ──AdvanceLevel──▶ Playing (next level)
///                       │
///                       └──Win / Lose──▶ GameOver ──▶ Title
///
/// A level that is advanced from hands only its base score (no time
/// bonus) to the next one.

use crate::config::SimConfig;
use crate::domain::entity::FrameInput;
use crate::error::LevelDiagnostic;
use super::event::GameEvent;
use super::level::Campaign;
use super::step;
use super::world::{FrameResult, WorldState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Title,
    Playing,
    GameOver { won: bool, score: u32 },
}

pub struct Session {
    pub screen: Screen,
    pub paused: bool,
    pub world: Option<WorldState>,
    /// Entries of the running level that were skipped at load.
    pub diagnostics: Vec<LevelDiagnostic>,
    campaign: Campaign,
    sim: SimConfig,
}

impl Session {
    pub fn new(campaign: Campaign, sim: SimConfig) -> Self {
        Session {
            screen: Screen::Title,
            paused: false,
            world: None,
            diagnostics: Vec::new(),
            campaign,
            sim,
        }
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Start (or continue into) level `index`. Returns false when there is
    /// no such level.
    pub fn start(&mut self, index: usize, base_score: u32) -> bool {
        match self.campaign.build(index, &self.sim, base_score) {
            Some((world, diagnostics)) => {
                log::info!("starting level {} ({}) with score {}", index + 1, world.name, base_score);
                if !diagnostics.is_empty() {
                    log::warn!("level {}: {} entries skipped", index + 1, diagnostics.len());
                }
                self.world = Some(world);
                self.diagnostics = diagnostics;
                self.screen = Screen::Playing;
                self.paused = false;
                true
            }
            None => {
                log::warn!("no level {} in the campaign", index + 1);
                false
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.screen == Screen::Playing {
            self.paused = !self.paused;
        }
    }

    pub fn back_to_title(&mut self) {
        self.screen = Screen::Title;
        self.paused = false;
        self.world = None;
        self.diagnostics.clear();
    }

    /// Advance the running level by one frame.
    pub fn tick(&mut self, input: &FrameInput) -> Vec<GameEvent> {
        if self.screen != Screen::Playing || self.paused {
            return vec![];
        }
        let world = match self.world.as_mut() {
            Some(w) => w,
            None => return vec![],
        };

        let report = step::step(world, input);
        match report.result {
            FrameResult::Continue => {}
            FrameResult::AdvanceLevel => {
                let next = world.level_index + 1;
                let carried = world.score.base();
                if !self.start(next, carried) {
                    self.screen = Screen::GameOver { won: true, score: carried };
                }
            }
            FrameResult::Win(score) => self.screen = Screen::GameOver { won: true, score },
            FrameResult::Lose(score) => self.screen = Screen::GameOver { won: false, score },
        }
        report.events
    }
}
