//! Animation templates, the key-addressed registry, and the sprite-sheet loader
//!
//! Templates are immutable and shared (`Rc`); entities hold an [`Animator`]
//! that walks a template's frames. A missing key yields an animator with no
//! template, which renders nothing and falls back to a default sprite size.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use glam::Vec2;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use serde::Deserialize;

use crate::consts::{BASE_FRAME_TIME_MS, SPRITE_SCALE};
use crate::error::AssetError;

/// Shortest frame duration accepted (zero-length frames would never advance)
const MIN_FRAME_DURATION: Duration = Duration::from_millis(1);
/// Longest frame duration accepted from a config file
const MAX_FRAME_DURATION: Duration = Duration::from_secs(60);

/// One image of an animation, shown for `duration`
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    image: Rc<RgbaImage>,
    duration: Duration,
    tint: [u8; 3],
}

impl AnimationFrame {
    pub fn new(image: RgbaImage, duration: Duration) -> Self {
        let tint = average_colour(&image);
        Self {
            image: Rc::new(image),
            duration: duration.max(MIN_FRAME_DURATION),
            tint,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Pixel size of the frame
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.image.width() as f32, self.image.height() as f32)
    }

    /// Average colour of the opaque pixels (used by coarse renderers)
    pub fn tint(&self) -> [u8; 3] {
        self.tint
    }
}

/// Immutable sequence of frames with a loop flag
#[derive(Debug, Clone)]
pub struct AnimationTemplate {
    frames: Vec<AnimationFrame>,
    looping: bool,
}

impl AnimationTemplate {
    pub fn new(frames: Vec<AnimationFrame>, looping: bool) -> Self {
        Self { frames, looping }
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(AnimationFrame::duration).sum()
    }
}

/// Key-addressed store of animation templates, filled once at startup
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    templates: HashMap<String, Rc<AnimationTemplate>>,
    /// Keys already reported as missing
    missing: RefCell<HashSet<String>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under `key`. The first registration wins; returns
    /// false if the key was already taken.
    pub fn register(&mut self, key: impl Into<String>, template: AnimationTemplate) -> bool {
        let key = key.into();
        if self.templates.contains_key(&key) {
            log::warn!("Animation <{key}> already registered, keeping the first one");
            return false;
        }
        self.templates.insert(key, Rc::new(template));
        true
    }

    pub fn get(&self, key: &str) -> Option<Rc<AnimationTemplate>> {
        self.templates.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Record a failed lookup of `key`. True the first time only.
    pub fn note_missing(&self, key: &str) -> bool {
        self.missing.borrow_mut().insert(key.to_string())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Playback cursor over a shared template
#[derive(Debug, Clone)]
pub struct Animator {
    key: String,
    template: Option<Rc<AnimationTemplate>>,
    frame: usize,
    elapsed: Duration,
}

impl Animator {
    /// Look up `key`; a missing template is logged and tolerated
    pub fn new(key: &str, registry: &AnimationRegistry) -> Self {
        let template = registry.get(key);
        if template.is_none() {
            if registry.note_missing(key) {
                log::warn!("Animation <{key}> not found, entities using it render without a sprite");
            } else {
                log::debug!("Animation <{key}> not found");
            }
        }
        Self {
            key: key.to_string(),
            template,
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_missing(&self) -> bool {
        self.template.is_none()
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn current_frame(&self) -> Option<&AnimationFrame> {
        self.template.as_ref()?.frames.get(self.frame)
    }

    /// True once a non-looping animation has shown its last frame in full
    pub fn is_finished(&self) -> bool {
        match &self.template {
            Some(t) if !t.looping && !t.frames.is_empty() => {
                self.frame + 1 == t.frames.len() && self.elapsed >= t.frames[self.frame].duration
            }
            _ => false,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        let Some(template) = &self.template else {
            return;
        };
        let count = template.frames.len();
        if count == 0 {
            return;
        }
        self.elapsed += dt;
        loop {
            let duration = template.frames[self.frame].duration;
            if self.elapsed < duration {
                break;
            }
            if self.frame + 1 < count {
                self.elapsed -= duration;
                self.frame += 1;
            } else if template.looping {
                self.elapsed -= duration;
                self.frame = 0;
            } else {
                // Hold the last frame
                self.elapsed = duration;
                break;
            }
        }
    }
}

/// One entry of the animation config file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub file_name: String,
    pub num_rows: u32,
    pub num_columns: u32,
    pub frame_time_multiplier: f64,
    pub is_looping: bool,
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<(), AssetError> {
        let invalid = |reason| AssetError::InvalidConfig {
            name: self.file_name.clone(),
            reason,
        };
        if self.file_name.trim().is_empty() {
            return Err(invalid("fileName cannot be blank"));
        }
        if self.num_rows < 1 || self.num_columns < 1 {
            return Err(invalid("rows/columns must be >= 1"));
        }
        if !self.frame_time_multiplier.is_finite() || self.frame_time_multiplier <= 0.0 {
            return Err(invalid("frameTimeMultiplier must be a finite value > 0"));
        }
        match self.checked_frame_duration() {
            Some(duration) if duration <= MAX_FRAME_DURATION => Ok(()),
            _ => Err(invalid("frameTimeMultiplier too large")),
        }
    }

    /// Registry key: the file name without directory or extension
    pub fn key(&self) -> Option<String> {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
    }

    /// Frame duration clamped to the accepted range
    pub fn frame_duration(&self) -> Duration {
        self.checked_frame_duration()
            .unwrap_or(MAX_FRAME_DURATION)
            .clamp(MIN_FRAME_DURATION, MAX_FRAME_DURATION)
    }

    fn checked_frame_duration(&self) -> Option<Duration> {
        let ms = self.frame_time_multiplier * BASE_FRAME_TIME_MS;
        Duration::try_from_secs_f64(ms / 1000.0).ok()
    }
}

pub fn parse_animation_configs(json: &str) -> Result<Vec<AnimationConfig>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Cut a sheet into `rows × columns` equal frames, row-major, each upscaled
/// by `scale`.
pub fn slice_sprite_sheet(
    sheet: &DynamicImage,
    rows: u32,
    columns: u32,
    frame_duration: Duration,
    scale: f32,
) -> Vec<AnimationFrame> {
    let rows = rows.max(1);
    let columns = columns.max(1);
    let frame_w = sheet.width() / columns;
    let frame_h = sheet.height() / rows;
    if frame_w == 0 || frame_h == 0 {
        return Vec::new();
    }

    let scaled_w = ((frame_w as f32 * scale) as u32).max(1);
    let scaled_h = ((frame_h as f32 * scale) as u32).max(1);

    let mut frames = Vec::with_capacity((rows * columns) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let image = sheet
                .crop_imm(column * frame_w, row * frame_h, frame_w, frame_h)
                .resize_exact(scaled_w, scaled_h, FilterType::Nearest)
                .to_rgba8();
            frames.push(AnimationFrame::new(image, frame_duration));
        }
    }
    frames
}

/// Load one config entry from `dir`
pub fn load_template(
    dir: &Path,
    config: &AnimationConfig,
) -> Result<(String, AnimationTemplate), AssetError> {
    config.validate()?;
    let key = config.key().ok_or_else(|| AssetError::InvalidConfig {
        name: config.file_name.clone(),
        reason: "fileName has no usable stem",
    })?;

    let path = dir.join(&config.file_name);
    let sheet = image::open(&path).map_err(|source| AssetError::Image {
        path: path.clone(),
        source,
    })?;

    let frames = slice_sprite_sheet(
        &sheet,
        config.num_rows,
        config.num_columns,
        config.frame_duration(),
        SPRITE_SCALE,
    );
    if frames.is_empty() {
        return Err(AssetError::InvalidConfig {
            name: config.file_name.clone(),
            reason: "sprite sheet is smaller than its grid",
        });
    }
    Ok((key, AnimationTemplate::new(frames, config.is_looping)))
}

/// Load every animation listed in `config_path`. Failures are logged and the
/// affected entries are left out of the registry.
pub fn load_animations(dir: &Path, config_path: &Path) -> AnimationRegistry {
    let mut registry = AnimationRegistry::new();

    let configs = match read_configs(config_path) {
        Ok(configs) => configs,
        Err(e) => {
            log::error!("Failed to load animations: {e}");
            return registry;
        }
    };

    for config in &configs {
        match load_template(dir, config) {
            Ok((key, template)) => {
                log::info!("Loaded animation <{key}> with <{}> frames", template.frame_count());
                registry.register(key, template);
            }
            Err(e) => log::error!("Skipping animation: {e}"),
        }
    }
    registry
}

fn read_configs(path: &Path) -> Result<Vec<AnimationConfig>, AssetError> {
    let json = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_animation_configs(&json).map_err(|source| AssetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn average_colour(image: &RgbaImage) -> [u8; 3] {
    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for pixel in image.pixels().filter(|p| p[3] > 0) {
        sum[0] += pixel[0] as u64;
        sum[1] += pixel[1] as u64;
        sum[2] += pixel[2] as u64;
        count += 1;
    }
    if count == 0 {
        return [255, 255, 255];
    }
    [
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgba;

    /// Registry holding one single-frame template per key, `size` pixels square
    pub(crate) fn registry_with(keys: &[&str], size: u32) -> AnimationRegistry {
        let mut registry = AnimationRegistry::new();
        for key in keys {
            let frame = AnimationFrame::new(RgbaImage::new(size, size), Duration::from_millis(50));
            registry.register(*key, AnimationTemplate::new(vec![frame], true));
        }
        registry
    }

    fn frames(count: usize, ms: u64) -> Vec<AnimationFrame> {
        (0..count)
            .map(|_| AnimationFrame::new(RgbaImage::new(2, 2), Duration::from_millis(ms)))
            .collect()
    }

    #[test]
    fn test_slice_row_major_and_scaled() {
        // 4x2 grid of 8x8 cells; mark the cell at row 1, column 2
        let mut sheet = RgbaImage::new(32, 16);
        for y in 8..16 {
            for x in 16..24 {
                sheet.put_pixel(x, y, Rgba([200, 10, 10, 255]));
            }
        }
        let frames = slice_sprite_sheet(
            &DynamicImage::ImageRgba8(sheet),
            2,
            4,
            Duration::from_millis(100),
            1.5,
        );
        assert_eq!(frames.len(), 8);
        assert_eq!(frames[0].size(), Vec2::new(12.0, 12.0));
        // Row-major: row 1, column 2 is index 6
        assert_eq!(frames[6].tint(), [200, 10, 10]);
        assert_eq!(frames[5].tint(), [255, 255, 255]);
    }

    #[test]
    fn test_slice_sheet_smaller_than_grid() {
        let sheet = DynamicImage::ImageRgba8(RgbaImage::new(3, 3));
        assert!(slice_sprite_sheet(&sheet, 4, 4, Duration::from_millis(10), 1.5).is_empty());
    }

    #[test]
    fn test_registry_first_registration_wins() {
        let mut registry = AnimationRegistry::new();
        assert!(registry.register("a", AnimationTemplate::new(frames(1, 10), true)));
        assert!(!registry.register("a", AnimationTemplate::new(frames(3, 10), true)));
        assert_eq!(registry.get("a").unwrap().frame_count(), 1);
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_animator_loops() {
        let mut registry = AnimationRegistry::new();
        registry.register("spin", AnimationTemplate::new(frames(3, 100), true));
        let mut animator = Animator::new("spin", &registry);

        animator.advance(Duration::from_millis(99));
        assert_eq!(animator.frame_index(), 0);
        animator.advance(Duration::from_millis(1));
        assert_eq!(animator.frame_index(), 1);
        animator.advance(Duration::from_millis(200));
        assert_eq!(animator.frame_index(), 0);
        assert!(!animator.is_finished());
    }

    #[test]
    fn test_animator_holds_last_frame() {
        let mut registry = AnimationRegistry::new();
        registry.register("death", AnimationTemplate::new(frames(2, 50), false));
        let mut animator = Animator::new("death", &registry);
        animator.advance(Duration::from_millis(500));
        assert_eq!(animator.frame_index(), 1);
        assert!(animator.is_finished());
    }

    #[test]
    fn test_animator_missing_template() {
        let registry = AnimationRegistry::new();
        let mut animator = Animator::new("nope", &registry);
        animator.advance(Duration::from_millis(100));
        assert!(animator.is_missing());
        assert!(animator.current_frame().is_none());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"[
            {"fileName": "player/player-idle.png", "numRows": 1, "numColumns": 4,
             "frameTimeMultiplier": 2.0, "isLooping": true}
        ]"#;
        let configs = parse_animation_configs(json).unwrap();
        assert_eq!(configs.len(), 1);
        let config = &configs[0];
        assert!(config.validate().is_ok());
        assert_eq!(config.key().as_deref(), Some("player-idle"));
        assert_eq!(config.frame_duration(), Duration::from_millis(125));
    }

    #[test]
    fn test_config_validation() {
        let base = AnimationConfig {
            file_name: "a.png".into(),
            num_rows: 1,
            num_columns: 1,
            frame_time_multiplier: 1.0,
            is_looping: false,
        };
        assert!(AnimationConfig { file_name: "  ".into(), ..base.clone() }.validate().is_err());
        assert!(AnimationConfig { num_rows: 0, ..base.clone() }.validate().is_err());
        assert!(AnimationConfig { frame_time_multiplier: 0.0, ..base.clone() }.validate().is_err());
        assert!(base.validate().is_ok());
    }

    #[test]
    fn test_huge_frame_time_is_rejected() {
        let base = AnimationConfig {
            file_name: "a.png".into(),
            num_rows: 1,
            num_columns: 1,
            frame_time_multiplier: 1e300,
            is_looping: false,
        };
        assert!(matches!(
            base.validate(),
            Err(AssetError::InvalidConfig { reason: "frameTimeMultiplier too large", .. })
        ));
        let infinite = AnimationConfig { frame_time_multiplier: f64::INFINITY, ..base.clone() };
        assert!(infinite.validate().is_err());
        assert_eq!(base.frame_duration(), MAX_FRAME_DURATION);
    }

    #[test]
    fn test_load_animations_skips_bad_entry() {
        let dir = std::env::temp_dir().join(format!("danmaku-anim-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        RgbaImage::new(8, 8).save(dir.join("ok.png")).unwrap();
        RgbaImage::new(8, 8).save(dir.join("slow.png")).unwrap();
        let config = dir.join("animations_config.json");
        std::fs::write(
            &config,
            r#"[
                {"fileName": "slow.png", "numRows": 1, "numColumns": 1,
                 "frameTimeMultiplier": 1e300, "isLooping": true},
                {"fileName": "ok.png", "numRows": 1, "numColumns": 2,
                 "frameTimeMultiplier": 1.0, "isLooping": true}
            ]"#,
        )
        .unwrap();

        let registry = load_animations(&dir, &config);
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("ok").unwrap().frame_count(), 2);
        assert!(!registry.contains("slow"));
    }

    #[test]
    fn test_missing_key_is_noted_once() {
        let registry = AnimationRegistry::new();
        assert!(registry.note_missing("player-bullet"));
        assert!(!registry.note_missing("player-bullet"));
        Animator::new("enemy-bullet", &registry);
        assert!(!registry.note_missing("enemy-bullet"));
    }

    #[test]
    fn test_load_animations_missing_config_is_empty() {
        let dir = std::env::temp_dir().join("danmaku-no-such-dir");
        let registry = load_animations(&dir, &dir.join("animations_config.json"));
        assert!(registry.is_empty());
    }
}
