use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use bankbranch_core::models::City;

use crate::app::{App, AppState, LoadState};

use super::styles;
use super::table;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Filters
            Constraint::Min(8),    // Branch table
            Constraint::Length(1), // Pagination
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    let projection = app.projection();

    render_title_bar(frame, chunks[0]);
    render_filter_bar(frame, app, chunks[1]);
    table::render_branches(frame, app, &projection, chunks[2]);
    if app.load_state == LoadState::Ready {
        table::render_pagination(frame, &projection, chunks[3]);
    }
    render_status_bar(frame, app, chunks[4]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Bank Branches";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

/// City selector, search box, page size and favourites toggle on one line
fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" [c]ity: ", styles::muted_style())];
    for (i, city) in City::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            city.label(),
            styles::page_style(*city == app.view.city_filter),
        ));
    }

    let searching = app.state == AppState::Searching;
    let cursor = if searching { "▌" } else { "" };
    spans.push(Span::styled("   [/] Search: ", styles::muted_style()));
    let search_style = if searching { styles::search_style() } else { styles::list_item_style() };
    spans.push(Span::styled(format!("{}{}", app.view.search_text, cursor), search_style));

    let editing = app.state == AppState::EditingPageSize;
    spans.push(Span::styled("   [n] Per page: ", styles::muted_style()));
    if editing {
        spans.push(Span::styled(format!("{}▌", app.page_size_input), styles::search_style()));
    } else {
        spans.push(Span::styled(app.view.items_per_page.to_string(), styles::list_item_style()));
    }

    let checkbox = if app.view.favourites_only { "[x]" } else { "[ ]" };
    spans.push(Span::styled("   [f] Favourites only ", styles::muted_style()));
    spans.push(Span::styled(checkbox, styles::highlight_style()));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[space] favourite | [u]pdate | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        match (&app.load_state, app.store.cache_age()) {
            (LoadState::Ready, Some(age)) => format!(
                " {} branches, {} favourites | Updated {}{} ",
                app.store.len(),
                app.store.favourite_count(),
                age,
                if app.store.is_stale() { " (stale, [u] to update)" } else { "" }
            ),
            (LoadState::Loading, _) => " Fetching branch list... ".to_string(),
            (LoadState::Failed(_), _) => " Load failed ".to_string(),
            _ => String::new(),
        }
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let left_style = if matches!(app.load_state, LoadState::Failed(_)) {
        styles::error_style()
    } else {
        styles::muted_style()
    };

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Bank Branches", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Browse", styles::highlight_style())),
        help_line("↑/↓ j/k", "Select row"),
        help_line("←/→ h/l", "Previous/next page"),
        help_line("Home/End", "First/last page"),
        Line::from(""),
        Line::from(Span::styled(" Filter", styles::highlight_style())),
        help_line("c / C", "Next/previous city"),
        help_line("/", "Search all columns"),
        help_line("Esc", "Clear search"),
        help_line("f", "Favourites only"),
        help_line("n", "Items per page"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("space", "Mark/unmark favourite"),
        help_line("u", "Update branch list"),
        help_line("r", "Retry a failed load"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankbranch_core::Config;
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::TempDir;

    fn screen_text(app: &App) -> String {
        let backend = TestBackend::new(140, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn app_in(dir: &TempDir) -> App {
        let config = Config::default()
            .with_env_overrides(None, Some(dir.path().display().to_string()));
        App::new(config).unwrap()
    }

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect_fixed(50, 20, outer), Rect::new(25, 10, 50, 20));
        let small = Rect::new(0, 0, 10, 5);
        assert_eq!(centered_rect_fixed(50, 20, small), Rect::new(0, 0, 10, 5));
    }

    #[test]
    fn test_render_loading() {
        let dir = TempDir::new().unwrap();
        let app = app_in(&dir);
        assert!(screen_text(&app).contains("Loading branches..."));
    }

    #[test]
    fn test_status_bar_summary_returns_after_message() {
        let dir = TempDir::new().unwrap();
        bankbranch_core::CacheManager::new(dir.path().to_path_buf())
            .unwrap()
            .save_branches_at(
                &[],
                chrono::Utc::now() - chrono::Duration::days(2),
            )
            .unwrap();
        let mut app = app_in(&dir);
        app.start_load();
        assert!(screen_text(&app).contains("stale - press [u]"));

        app.clear_status();
        let text = screen_text(&app);
        assert!(text.contains("0 branches, 0 favourites | Updated 2d ago (stale"));
    }

    #[test]
    fn test_render_failure_offers_retry() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("branches.json"), "garbage").unwrap();
        let mut app = app_in(&dir);
        app.start_load();

        let text = screen_text(&app);
        assert!(text.contains("Could not load branches"));
        assert!(text.contains("to retry"));
    }
}
