//! Danmaku - terminal entry point
//!
//! Opens on the main menu: Enter starts a run, Q quits. In a run,
//! arrows/WASD move, space fires, P or Esc pauses. From the pause screen or
//! after game over, R restarts and M returns to the menu.
//! Logs go to stderr; redirect them (`2>danmaku.log`) with `RUST_LOG` set.

mod terminal;

use std::io::{self, BufWriter, Write, stdout};
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::{
    ExecutableCommand, cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal as term,
};

use danmaku::assets::{self, AudioManager, SilentSink};
use danmaku::platform::{FixedSurface, InputState, Surface};
use danmaku::settings::SETTINGS_FILE;
use danmaku::sim::GameState;
use danmaku::{GameSession, Settings};

use terminal::{Canvas, map_key};

/// Redraw period (~60 Hz)
const FRAME: Duration = Duration::from_millis(16);

fn main() -> io::Result<()> {
    env_logger::init();
    log::info!("Danmaku starting...");

    let settings = Settings::load(Path::new(SETTINGS_FILE));
    let (animations, clips) = assets::load_all(&settings);

    let mut audio = AudioManager::new(clips, Box::new(SilentSink));
    audio.set_volumes(settings.effective_music_volume(), settings.effective_sfx_volume());
    audio.set_muted(settings.muted);

    let mut session = GameSession::from_settings(animations, audio, &settings);

    let mut out = BufWriter::new(stdout());
    term::enable_raw_mode()?;
    out.execute(term::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(term::Clear(term::ClearType::All))?;

    // Release events where the terminal supports them; others fall back to
    // key expiry in InputState
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    let result = run(&mut out, &mut session, &settings);

    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(term::LeaveAlternateScreen);
    let _ = term::disable_raw_mode();

    if session.state() == GameState::NotInitialized {
        session.audio_mut().stop_music();
    } else if let Err(e) = session.shutdown() {
        log::warn!("Shutdown from {}: {e}", session.state());
    }
    log::info!("Danmaku exiting after {} ticks", session.ticks());
    result
}

fn run<W: Write>(out: &mut W, session: &mut GameSession, settings: &Settings) -> io::Result<()> {
    let (cols, rows) = term::size()?;
    let render = FixedSurface::new(settings.play_width, settings.play_height);
    let info = FixedSurface::new(cols as f32, 1.0);
    session.return_to_menu();

    let mut canvas = Canvas::new(cols, rows, render.size());
    let mut input = InputState::new();
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        input.next_frame();

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => match (session.state(), code) {
                        (_, KeyCode::Char('q') | KeyCode::Char('Q')) => return Ok(()),
                        (_, KeyCode::Char('c')) if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        (GameState::NotInitialized, KeyCode::Enter) => {
                            if let Err(e) = session.initialize(Some(&render), Some(&info)) {
                                log::error!("Could not start a run: {e}");
                            }
                            input.release_all();
                            last = Instant::now();
                        }
                        (
                            GameState::Running | GameState::Paused,
                            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Esc,
                        ) => {
                            session.toggle_pause();
                            input.release_all();
                        }
                        (
                            GameState::Paused | GameState::GameOver | GameState::Error,
                            KeyCode::Char('r') | KeyCode::Char('R'),
                        ) => {
                            if let Err(e) = session.restart(Some(&render), Some(&info)) {
                                log::error!("Could not restart: {e}");
                            }
                            input.release_all();
                            last = Instant::now();
                        }
                        (
                            GameState::Paused | GameState::GameOver | GameState::Error,
                            KeyCode::Char('m') | KeyCode::Char('M'),
                        ) => {
                            session.return_to_menu();
                            input.release_all();
                        }
                        (_, other) => {
                            if let Some(key) = map_key(other) {
                                input.press(key);
                            }
                        }
                    },
                    KeyEventKind::Repeat => {
                        if let Some(key) = map_key(code) {
                            input.press(key);
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(key) = map_key(code) {
                            input.release(key);
                        }
                    }
                },
                Event::Resize(cols, rows) => {
                    canvas.resize(cols, rows);
                    out.execute(term::Clear(term::ClearType::All))?;
                }
                _ => {}
            }
        }

        session.set_input(input.intent());
        let now = Instant::now();
        session.pump(now - last);
        last = now;

        canvas.clear();
        session.render(&mut canvas);
        let banner = match session.state() {
            GameState::NotInitialized if session.ui().is_main_menu_visible() => {
                Some("DANMAKU - Enter to start, Q to quit")
            }
            GameState::Paused => Some("PAUSED - P/Esc resume, R restart, M menu, Q quit"),
            GameState::GameOver => Some("GAME OVER - R restart, M menu, Q quit"),
            GameState::Error => Some("ERROR - R retry, M menu, Q quit"),
            _ => None,
        };
        canvas.present(out, &session.ui().info().to_string(), banner)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}
