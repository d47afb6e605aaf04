//! UI state: main menu, pause menu, game-over banner and the info panel
//!
//! The session drives this; front ends read it when drawing.

use std::fmt;

use glam::Vec2;

use crate::platform::Surface;

/// Numbers shown in the info panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HudInfo {
    pub player_hit_points: i32,
    pub enemies: usize,
    pub kills: u32,
    pub ticks: u64,
}

impl fmt::Display for HudInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HP {:>2} | Enemies {:>2} | Kills {:>3} | Tick {}",
            self.player_hit_points.max(0),
            self.enemies,
            self.kills,
            self.ticks
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct UiManager {
    render_size: Option<Vec2>,
    info_size: Option<Vec2>,
    main_menu: bool,
    pause_menu: bool,
    game_over: bool,
    info: HudInfo,
}

impl UiManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the render surface and the info panel
    pub fn attach(&mut self, render: &dyn Surface, info: &dyn Surface) {
        self.render_size = Some(render.size());
        self.info_size = Some(info.size());
        self.main_menu = false;
        self.pause_menu = false;
        self.game_over = false;
        self.info = HudInfo::default();
    }

    pub fn detach(&mut self) {
        *self = Self::default();
    }

    pub fn is_attached(&self) -> bool {
        self.render_size.is_some()
    }

    pub fn render_size(&self) -> Option<Vec2> {
        self.render_size
    }

    pub fn info_size(&self) -> Option<Vec2> {
        self.info_size
    }

    /// Shown between runs, while nothing is attached
    pub fn show_main_menu(&mut self) {
        self.main_menu = true;
    }

    pub fn is_main_menu_visible(&self) -> bool {
        self.main_menu
    }

    pub fn show_pause_menu(&mut self) {
        self.pause_menu = true;
    }

    pub fn hide_pause_menu(&mut self) {
        self.pause_menu = false;
    }

    pub fn is_pause_menu_visible(&self) -> bool {
        self.pause_menu
    }

    pub fn show_game_over(&mut self) {
        self.pause_menu = false;
        self.game_over = true;
    }

    pub fn is_game_over_visible(&self) -> bool {
        self.game_over
    }

    pub fn update_info(&mut self, info: HudInfo) {
        self.info = info;
    }

    pub fn info(&self) -> HudInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FixedSurface;

    #[test]
    fn test_attach_detach() {
        let mut ui = UiManager::new();
        ui.attach(&FixedSurface::new(1024.0, 720.0), &FixedSurface::new(200.0, 720.0));
        assert!(ui.is_attached());
        assert_eq!(ui.render_size(), Some(Vec2::new(1024.0, 720.0)));
        ui.show_pause_menu();
        ui.detach();
        assert!(!ui.is_attached());
        assert!(!ui.is_pause_menu_visible());
    }

    #[test]
    fn test_attach_hides_main_menu() {
        let mut ui = UiManager::new();
        ui.show_main_menu();
        assert!(ui.is_main_menu_visible());
        ui.attach(&FixedSurface::new(1024.0, 720.0), &FixedSurface::new(200.0, 720.0));
        assert!(!ui.is_main_menu_visible());
    }

    #[test]
    fn test_game_over_hides_pause_menu() {
        let mut ui = UiManager::new();
        ui.show_pause_menu();
        ui.show_game_over();
        assert!(!ui.is_pause_menu_visible());
        assert!(ui.is_game_over_visible());
    }

    #[test]
    fn test_hud_line() {
        let info = HudInfo {
            player_hit_points: -2,
            enemies: 3,
            kills: 12,
            ticks: 99,
        };
        assert_eq!(info.to_string(), "HP  0 | Enemies  3 | Kills  12 | Tick 99");
    }
}
