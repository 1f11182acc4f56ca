//! Color constants for the Gantt view.

use ratatui::style::Color;

use pm_timeline::NodeKind;

// Bars are branded by hierarchy level, like the rest of the pm tooling.

/// Used for Milestones
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);
/// Used for Epics
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used for Tasks
pub const GOLD: Color = Color::Rgb(255, 215, 0);

/// Bar color for a node kind.
pub fn kind_color(kind: NodeKind) -> Color {
    match kind {
        NodeKind::Milestone => DARK_PURPLE,
        NodeKind::Epic => DARK_GREEN,
        NodeKind::Task => GOLD,
    }
}
