// TUI widget modules for each screen zone.

pub mod browser;
pub mod help_bar;
pub mod now_playing;
pub mod playlist;
pub mod quit_confirm;
pub mod settings;
pub mod status_bar;
pub mod tab_bar;

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
