use crossterm::style::Color;

/// Foreground/background pair assigned to one agent label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentStyle {
    pub fg: Color,
    pub bg: Color,
}

pub struct Theme;

impl Theme {
    // ── Notices ─────────────────────────────────────────────────
    pub const MUTED_TEXT: Color = Color::DarkGrey;
    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const SUCCESS: Color = Color::Green;
    pub const PROMPT: Color = Color::Magenta;
    pub const TITLE: Color = Color::Cyan;
    pub const LABEL_TEXT: Color = Color::White;

    // ── Well-known roles ────────────────────────────────────────
    pub const PLANNER: AgentStyle = AgentStyle {
        fg: Color::Magenta,
        bg: Color::Magenta,
    };
    pub const SUMMARIZER: AgentStyle = AgentStyle {
        fg: Color::Green,
        bg: Color::Green,
    };
    pub const TOOL_CALL: AgentStyle = AgentStyle {
        fg: Color::Blue,
        bg: Color::Blue,
    };
    pub const TOOL_END: AgentStyle = AgentStyle {
        fg: Color::Yellow,
        bg: Color::Yellow,
    };

    /// Slots handed out by name hash.
    pub const PALETTE: [Color; 10] = [
        Color::Cyan,
        Color::Yellow,
        Color::Red,
        Color::Rgb { r: 255, g: 165, b: 0 },
        Color::Green,
        Color::Magenta,
        Color::Rgb { r: 0, g: 255, b: 255 },
        Color::Rgb { r: 255, g: 105, b: 180 },
        Color::Rgb { r: 0, g: 255, b: 128 },
        Color::Rgb { r: 255, g: 215, b: 0 },
    ];

    /// Visual identity of an agent. Same name, same style, every run.
    pub fn agent_style(agent_name: &str) -> AgentStyle {
        if agent_name.contains("planner") {
            return Self::PLANNER;
        }
        if agent_name.contains("summarizer") {
            return Self::SUMMARIZER;
        }
        if agent_name.contains("tool_call") {
            return Self::TOOL_CALL;
        }
        if agent_name.contains("tool_end") {
            return Self::TOOL_END;
        }
        let color = Self::PALETTE[Self::palette_slot(agent_name)];
        AgentStyle { fg: color, bg: color }
    }

    /// Sum of code points modulo palette size.
    pub fn palette_slot(agent_name: &str) -> usize {
        let hash = agent_name
            .chars()
            .fold(0u64, |acc, c| acc.wrapping_add(u64::from(u32::from(c))));
        (hash % Self::PALETTE.len() as u64) as usize
    }
}
