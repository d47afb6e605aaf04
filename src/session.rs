//! Game loop coordinator
//!
//! A [`GameSession`] owns everything one run needs: the lifecycle state
//! machine, both entity managers, the player, the UI and audio collaborators
//! and the fixed tick source. Nothing is global, so independent sessions can
//! coexist.
//!
//! Per tick, in order: player, enemy manager (cooldown, spawn, update,
//! cleanup), flush of bullets fired this tick, bullet manager (update, hits,
//! cleanup), game-over check, info panel refresh.

use std::time::Duration;

use crate::assets::audio::{BATTLE_MUSIC, MENU_MUSIC};
use crate::assets::{AnimationRegistry, AudioManager};
use crate::consts::TICK_INTERVAL;
use crate::error::{SessionError, StateError};
use crate::platform::{DrawContext, FixedTimer, Sprite, SpriteKind, Surface};
use crate::settings::Settings;
use crate::sim::{
    Body, Bullet, BulletManager, EnemyManager, Entity, GameState, IdAllocator, Player, Rect,
    StateMachine, TickContext, TickInput,
};
use crate::ui::{HudInfo, UiManager};

pub struct GameSession {
    state: StateMachine,
    enemies: EnemyManager,
    bullets: BulletManager,
    ui: UiManager,
    audio: AudioManager,
    animations: AnimationRegistry,
    ids: IdAllocator,
    player: Option<Player>,
    timer: FixedTimer,
    input: TickInput,
    /// Bullets fired during the current tick
    spawned: Vec<Bullet>,
    play_area: Rect,
    seed: u64,
    kills: u32,
    ticks: u64,
}

impl GameSession {
    pub fn new(animations: AnimationRegistry, audio: AudioManager, seed: u64) -> Self {
        Self {
            state: StateMachine::new(),
            enemies: EnemyManager::new(seed),
            bullets: BulletManager::new(),
            ui: UiManager::new(),
            audio,
            animations,
            ids: IdAllocator::new(),
            player: None,
            timer: FixedTimer::new(TICK_INTERVAL),
            input: TickInput::default(),
            spawned: Vec::new(),
            play_area: Rect::from_size(glam::Vec2::ZERO),
            seed,
            kills: 0,
            ticks: 0,
        }
    }

    /// Session configured from user settings; a missing seed is drawn at random
    pub fn from_settings(
        animations: AnimationRegistry,
        audio: AudioManager,
        settings: &Settings,
    ) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Session seed: {seed}");
        let mut session = Self::new(animations, audio, seed);
        session.timer = FixedTimer::new(settings.tick_interval());
        session
    }

    pub fn state(&self) -> GameState {
        self.state.current()
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn play_area(&self) -> Rect {
        self.play_area
    }

    pub fn tick_interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.is_active()
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn enemy_manager(&self) -> &EnemyManager {
        &self.enemies
    }

    pub fn bullet_manager(&self) -> &BulletManager {
        &self.bullets
    }

    pub fn ui(&self) -> &UiManager {
        &self.ui
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current info panel numbers (all zero before initialization)
    pub fn hud_info(&self) -> HudInfo {
        if !self.state.current().is_initialized() {
            return HudInfo::default();
        }
        HudInfo {
            player_hit_points: self
                .player
                .as_ref()
                .map(|p| p.body().current_hit_points())
                .unwrap_or(0),
            enemies: self.enemies.repository().len(&self.state),
            kills: self.kills,
            ticks: self.ticks,
        }
    }

    /// Set up a fresh run on `render` (play area) and `info` (side panel)
    /// and start it.
    ///
    /// Calling this while a run is initializing, running or paused is logged
    /// and ignored. From any other state except `NotInitialized` the run must
    /// be [cleared](Self::clear) first.
    pub fn initialize(
        &mut self,
        render: Option<&dyn Surface>,
        info: Option<&dyn Surface>,
    ) -> Result<(), SessionError> {
        if matches!(
            self.state.current(),
            GameState::Initializing | GameState::Running | GameState::Paused
        ) {
            log::error!(
                "initialize() called while {}; the current run is kept",
                self.state.current()
            );
            return Ok(());
        }
        let render = render.ok_or(SessionError::MissingSurface("render"))?;
        let info = info.ok_or(SessionError::MissingSurface("info"))?;

        self.state.start_initialization()?;
        if let Err(err) = self.build_run(render, info) {
            log::error!("Initialization failed: {err}");
            self.timer.stop();
            self.audio.stop_music();
            if let Err(state_err) = self.state.fail() {
                log::error!("Could not enter the error state: {state_err}");
            }
            return Err(err);
        }
        log::info!(
            "Session running on a {}x{} play area",
            self.play_area.width(),
            self.play_area.height()
        );
        Ok(())
    }

    fn build_run(&mut self, render: &dyn Surface, info: &dyn Surface) -> Result<(), SessionError> {
        self.ui.attach(render, info);
        self.play_area = Rect::from_size(render.size());

        self.ids = IdAllocator::new();
        let player = Player::new(self.ids.next_id(), &self.play_area, &self.animations)?
            .with_default_spawner()?;
        self.player = Some(player);

        self.enemies.init(self.seed);
        self.bullets.init();
        self.spawned.clear();
        self.input = TickInput::default();
        self.kills = 0;
        self.ticks = 0;

        self.state.mark_ready()?;
        self.timer.start();
        self.audio.play_music(BATTLE_MUSIC);
        self.state.start_running()?;
        let hud = self.hud_info();
        self.ui.update_info(hud);
        Ok(())
    }

    /// Tear the run down and return to `NotInitialized`
    pub fn clear(&mut self) {
        if self.state.current() == GameState::NotInitialized {
            return;
        }
        self.timer.stop();
        self.audio.stop_music();
        self.state.stop_and_clear();
        self.player = None;
        self.enemies.repository_mut().clear();
        self.bullets.repository_mut().clear();
        self.spawned.clear();
        self.ui.detach();
        self.kills = 0;
        self.ticks = 0;
        log::info!("Session cleared");
    }

    /// Drop any run and wait on the main menu with its music looping
    pub fn return_to_menu(&mut self) {
        self.clear();
        self.ui.show_main_menu();
        self.audio.play_music(MENU_MUSIC);
    }

    /// Clear the current run and start a fresh one on `render` and `info`
    pub fn restart(
        &mut self,
        render: Option<&dyn Surface>,
        info: Option<&dyn Surface>,
    ) -> Result<(), SessionError> {
        self.clear();
        self.initialize(render, info)
    }

    /// Input applied to the player on the following ticks
    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Run one simulation step. Does nothing unless the run is `Running`.
    pub fn tick(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.ticks += 1;

        let mut ctx = TickContext {
            dt: self.timer.interval(),
            play_area: self.play_area,
            animations: &self.animations,
            ids: &mut self.ids,
            spawned: &mut self.spawned,
            player_position: None,
        };

        if let Some(player) = self.player.as_mut() {
            player.apply_input(self.input);
            player.update(&mut ctx);
            ctx.player_position = Some(player.body().center());
        }

        self.enemies.update(&self.state, &mut ctx);

        for bullet in ctx.spawned.drain(..) {
            self.bullets.add_bullet(&self.state, bullet);
        }

        let report = self.bullets.update(
            &self.state,
            &mut ctx,
            self.player.as_mut(),
            self.enemies.repository_mut(),
        );
        self.kills += report.enemies_defeated;
        if report.player_damage > 0 {
            log::debug!("Player took {} damage", report.player_damage);
        }

        if self.player.as_ref().is_some_and(|p| p.body().is_defeated()) {
            self.end_run();
        }
        let hud = self.hud_info();
        self.ui.update_info(hud);
    }

    fn end_run(&mut self) {
        match self.state.game_over() {
            Ok(()) => {
                self.timer.stop();
                self.audio.stop_music();
                self.ui.show_game_over();
                log::info!("Game over after {} ticks, {} kills", self.ticks, self.kills);
            }
            Err(err) => log::error!("Could not end the run: {err}"),
        }
    }

    /// Freeze the run. Returns whether it was running.
    pub fn pause(&mut self) -> bool {
        if !self.state.pause() {
            return false;
        }
        self.timer.stop();
        self.audio.pause_music();
        self.ui.show_pause_menu();
        log::info!("Paused");
        true
    }

    /// Continue a paused run. Returns whether it was paused.
    pub fn resume(&mut self) -> bool {
        if !self.state.is_paused() {
            return false;
        }
        if let Err(err) = self.state.start_running() {
            log::error!("Could not resume: {err}");
            return false;
        }
        self.timer.start();
        self.audio.resume_music();
        self.ui.hide_pause_menu();
        log::info!("Resumed");
        true
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.state.current() {
            GameState::Running => self.pause(),
            GameState::Paused => self.resume(),
            _ => false,
        }
    }

    /// Feed `elapsed` wall time into the tick source and run every due tick.
    /// Returns the number of ticks run.
    pub fn pump(&mut self, elapsed: Duration) -> u32 {
        let due = self.timer.advance(elapsed);
        let mut ran = 0;
        for _ in 0..due {
            if !self.state.is_running() {
                break;
            }
            self.tick();
            ran += 1;
        }
        ran
    }

    /// Stop the run for good: `ShuttingDown`, release collaborators, `Stopped`
    pub fn shutdown(&mut self) -> Result<(), StateError> {
        self.state.begin_shutdown()?;
        self.timer.stop();
        self.audio.stop_music();
        self.ui.detach();
        self.state.finish_shutdown()?;
        log::info!("Session stopped");
        Ok(())
    }

    /// Draw every visible entity: player, then enemies, then bullets
    pub fn render(&self, draw: &mut dyn DrawContext) {
        if !self.state.current().is_initialized() {
            return;
        }
        if let Some(player) = &self.player {
            draw_body(draw, SpriteKind::Player, player.body());
        }
        for enemy in self.enemies.repository().iter(&self.state) {
            draw_body(draw, SpriteKind::Enemy(enemy.archetype()), enemy.body());
        }
        for bullet in self.bullets.repository().iter(&self.state) {
            draw_body(draw, SpriteKind::Bullet(bullet.team()), bullet.body());
        }
    }
}

fn draw_body(draw: &mut dyn DrawContext, kind: SpriteKind, body: &Body) {
    if !body.visible {
        return;
    }
    draw.draw_sprite(&Sprite {
        kind,
        bounds: body.bounding_box(),
        frame: body.animator().current_frame(),
    });
}
