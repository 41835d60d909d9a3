use ratatui::style::{Color, Modifier, Style};

// Palette: teal ledger lines, saffron stars
pub const TEAL: Color = Color::Rgb(38, 150, 140);
pub const SAFFRON: Color = Color::Rgb(240, 168, 48);
pub const BRICK: Color = Color::Rgb(200, 82, 60);
pub const SLATE: Color = Color::Rgb(112, 124, 132);
pub const TEXT: Color = Color::Rgb(226, 228, 222);
pub const ROW_CURSOR: Color = Color::Rgb(22, 66, 70);
pub const BAR: Color = Color::Rgb(18, 36, 40);

pub fn title_style() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(ROW_CURSOR).fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn muted_style() -> Style {
    Style::default().fg(SLATE)
}

pub fn highlight_style() -> Style {
    Style::default().fg(SAFFRON)
}

pub fn error_style() -> Style {
    Style::default().fg(BRICK).add_modifier(Modifier::BOLD)
}

pub fn favourite_style() -> Style {
    Style::default().fg(SAFFRON).add_modifier(Modifier::BOLD)
}

/// Page numbers and the city selector
pub fn page_style(active: bool) -> Style {
    match active {
        true => Style::default().fg(Color::Black).bg(TEAL).add_modifier(Modifier::BOLD),
        false => Style::default().fg(TEXT),
    }
}

pub fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { TEAL } else { SLATE })
}

pub fn search_style() -> Style {
    Style::default().fg(SAFFRON).add_modifier(Modifier::ITALIC)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(BAR).fg(TEXT)
}

pub fn help_key_style() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(TEXT)
}
