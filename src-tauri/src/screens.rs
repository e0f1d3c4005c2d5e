//! Screen model and wallpaper window planning
//!
//! Everything here is pure so the per-screen lifecycle can be reasoned about
//! (and tested) without a running event loop. `wallpaper` feeds it the live
//! monitor list and applies the resulting plan.

use std::collections::BTreeSet;

use crate::settings::DisplayMode;

pub const WINDOW_LABEL_PREFIX: &str = "wallpaper-";

/// A connected screen, in physical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub index: usize,
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
    pub primary: bool,
}

impl Screen {
    pub fn from_monitor(index: usize, monitor: &tauri::Monitor, primary: bool) -> Self {
        let position = monitor.position();
        let size = monitor.size();
        Self {
            index,
            name: monitor.name().cloned(),
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
            scale_factor: monitor.scale_factor(),
            primary,
        }
    }

    pub fn label(&self) -> String {
        format!("{WINDOW_LABEL_PREFIX}{}", self.index)
    }
}

/// Build the screen list from the host's monitors, flagging the primary one.
pub fn screens_from_monitors(
    monitors: &[tauri::Monitor],
    primary: Option<&tauri::Monitor>,
) -> Vec<Screen> {
    monitors
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let is_primary = primary.is_some_and(|p| {
                p.position() == m.position() && p.size() == m.size() && p.name() == m.name()
            });
            Screen::from_monitor(i, m, is_primary)
        })
        .collect()
}

pub fn is_wallpaper_label(label: &str) -> bool {
    label.starts_with(WINDOW_LABEL_PREFIX)
}

/// Screens that should carry a wallpaper window for `mode`.
pub fn target_screens(mode: DisplayMode, screens: &[Screen]) -> Vec<Screen> {
    match mode {
        DisplayMode::AllScreens => screens.to_vec(),
        DisplayMode::MainOnly => screens
            .iter()
            .find(|s| s.primary)
            .or_else(|| screens.first())
            .cloned()
            .into_iter()
            .collect(),
    }
}

/// What to do with the wallpaper windows to match the target screens.
#[derive(Debug, Default, PartialEq)]
pub struct WindowPlan {
    pub create: Vec<Screen>,
    pub update: Vec<Screen>,
    pub close: Vec<String>,
}

impl WindowPlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.close.is_empty()
    }
}

pub fn plan(existing: &[String], targets: &[Screen]) -> WindowPlan {
    let existing: BTreeSet<&str> = existing.iter().map(String::as_str).collect();
    let wanted: BTreeSet<String> = targets.iter().map(Screen::label).collect();

    let mut plan = WindowPlan::default();
    for screen in targets {
        if existing.contains(screen.label().as_str()) {
            plan.update.push(screen.clone());
        } else {
            plan.create.push(screen.clone());
        }
    }
    plan.close = existing
        .into_iter()
        .filter(|label| !wanted.contains(*label))
        .map(str::to_string)
        .collect();

    plan.create.sort_by_key(|s| s.index);
    plan.update.sort_by_key(|s| s.index);
    plan
}

/// Identity of a display configuration; changes when any frame, scale,
/// primary flag or the screen count changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint(Vec<(i32, i32, u32, u32, u64, bool)>);

pub fn fingerprint(screens: &[Screen]) -> Fingerprint {
    Fingerprint(
        screens
            .iter()
            .map(|s| (s.x, s.y, s.width, s.height, s.scale_factor.to_bits(), s.primary))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(index: usize, x: i32, primary: bool) -> Screen {
        Screen {
            index,
            name: Some(format!("Display {index}")),
            x,
            y: 0,
            width: 2560,
            height: 1440,
            scale_factor: 2.0,
            primary,
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(screen(3, 0, false).label(), "wallpaper-3");
        assert!(is_wallpaper_label("wallpaper-0"));
        assert!(!is_wallpaper_label("settings"));
    }

    #[test]
    fn test_main_only_picks_primary() {
        let screens = vec![screen(0, 0, false), screen(1, 2560, true)];
        let targets = target_screens(DisplayMode::MainOnly, &screens);
        assert_eq!(targets, vec![screens[1].clone()]);
    }

    #[test]
    fn test_main_only_falls_back_to_first() {
        let screens = vec![screen(0, 0, false), screen(1, 2560, false)];
        let targets = target_screens(DisplayMode::MainOnly, &screens);
        assert_eq!(targets, vec![screens[0].clone()]);
        assert!(target_screens(DisplayMode::MainOnly, &[]).is_empty());
    }

    #[test]
    fn test_all_screens() {
        let screens = vec![screen(0, 0, true), screen(1, 2560, false)];
        assert_eq!(target_screens(DisplayMode::AllScreens, &screens), screens);
    }

    #[test]
    fn test_plan_from_nothing_creates_all() {
        let targets = vec![screen(1, 2560, false), screen(0, 0, true)];
        let plan = plan(&[], &targets);
        assert_eq!(
            plan.create.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert!(plan.update.is_empty());
        assert!(plan.close.is_empty());
    }

    #[test]
    fn test_plan_after_unplug() {
        let existing = vec!["wallpaper-0".to_string(), "wallpaper-1".to_string()];
        let targets = vec![screen(0, 0, true)];
        let plan = plan(&existing, &targets);
        assert!(plan.create.is_empty());
        assert_eq!(plan.update, targets);
        assert_eq!(plan.close, vec!["wallpaper-1".to_string()]);
    }

    #[test]
    fn test_plan_after_plug_in() {
        let existing = vec!["wallpaper-0".to_string()];
        let targets = vec![screen(0, 0, true), screen(1, 2560, false)];
        let plan = plan(&existing, &targets);
        assert_eq!(plan.create, vec![targets[1].clone()]);
        assert_eq!(plan.update, vec![targets[0].clone()]);
        assert!(plan.close.is_empty());
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_plan_with_no_screens_closes_everything() {
        let existing = vec!["wallpaper-0".to_string()];
        let plan = plan(&existing, &[]);
        assert_eq!(plan.close, existing);
    }

    #[test]
    fn test_fingerprint_tracks_geometry() {
        let a = vec![screen(0, 0, true)];
        let mut b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&b));

        b[0].width = 1920;
        assert_ne!(fingerprint(&a), fingerprint(&b));

        let mut c = a.clone();
        c[0].scale_factor = 1.0;
        assert_ne!(fingerprint(&a), fingerprint(&c));

        let mut d = a.clone();
        d.push(screen(1, 2560, false));
        assert_ne!(fingerprint(&a), fingerprint(&d));
    }
}
