use ratatui::{
    layout::{Alignment, Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use bankbranch_core::utils::truncate_string;
use bankbranch_core::view::{page_window, Projection};

use crate::app::{App, LoadState};
use crate::ui::styles;

/// Page numbers shown at once in the pagination bar
const PAGE_RANGE_DISPLAYED: usize = 8;

/// Longest address shown before truncation
const MAX_ADDRESS_LEN: usize = 48;

/// Render the branch table, or the loading / error placeholder
pub fn render_branches(frame: &mut Frame, app: &App, projection: &Projection<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    match &app.load_state {
        LoadState::Loading => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "Loading branches...",
                styles::muted_style(),
            )))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, area);
        }
        LoadState::Failed(message) => {
            let lines = vec![
                Line::from(Span::styled("Could not load branches", styles::error_style())),
                Line::from(""),
                Line::from(Span::styled(message.clone(), styles::muted_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Press ", styles::muted_style()),
                    Span::styled("[r]", styles::help_key_style()),
                    Span::styled(" to retry", styles::muted_style()),
                ]),
            ];
            let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(block);
            frame.render_widget(paragraph, area);
        }
        LoadState::Ready => render_table(frame, app, projection, area, block),
    }
}

fn render_table(frame: &mut Frame, app: &App, projection: &Projection<'_>, area: Rect, block: Block<'_>) {
    let header_cells = [
        "★", "IFSC", "Bank Id", "Branch", "Address", "City", "District", "State", "Bank Name",
    ];

    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = projection
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let record = row.record;
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let marker_style = if record.favourite {
                styles::favourite_style()
            } else {
                styles::muted_style()
            };

            Row::new(vec![
                Cell::from(Span::styled(record.favourite_marker(), marker_style)),
                Cell::from(record.ifsc.as_str()),
                Cell::from(format!("{:>4}", record.bank_id)),
                Cell::from(record.branch.as_str()),
                Cell::from(truncate_string(&record.address, MAX_ADDRESS_LEN)),
                Cell::from(record.city.as_str()),
                Cell::from(record.district.as_str()),
                Cell::from(record.state.as_str()),
                Cell::from(record.bank_name.as_str()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),  // Favourite
        Constraint::Length(11), // IFSC codes are 11 characters
        Constraint::Length(7),  // Bank Id
        Constraint::Fill(2),    // Branch
        Constraint::Fill(4),    // Address
        Constraint::Fill(1),    // City
        Constraint::Fill(1),    // District
        Constraint::Fill(1),    // State
        Constraint::Fill(2),    // Bank Name
    ];

    let title = format!(" Found {} results ", projection.total_matches);

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title).title_style(styles::muted_style()))
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !projection.rows.is_empty() {
        state.select(Some(app.selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// Render "‹ 1 2 [3] 4 ›" style page numbers
pub fn render_pagination(frame: &mut Frame, projection: &Projection<'_>, area: Rect) {
    let line = Line::from(pagination_spans(projection.active_page, projection.page_count))
        .alignment(Alignment::Center);
    frame.render_widget(Paragraph::new(line), area);
}

fn pagination_spans(active: usize, pages: usize) -> Vec<Span<'static>> {
    if pages == 0 {
        return vec![Span::styled("no pages", styles::muted_style())];
    }

    let window = page_window(active, pages, PAGE_RANGE_DISPLAYED);
    let mut spans = Vec::new();

    let prev_style = if active > 1 { styles::list_item_style() } else { styles::muted_style() };
    spans.push(Span::styled("« ‹ ", prev_style));

    if *window.start() > 1 {
        spans.push(Span::styled("… ", styles::muted_style()));
    }
    for page in window.clone() {
        let label = if page == active {
            format!("[{}]", page)
        } else {
            page.to_string()
        };
        spans.push(Span::styled(label, styles::page_style(page == active)));
        spans.push(Span::raw(" "));
    }
    if *window.end() < pages {
        spans.push(Span::styled("… ", styles::muted_style()));
    }

    let next_style = if active < pages { styles::list_item_style() } else { styles::muted_style() };
    spans.push(Span::styled("› »", next_style));
    spans.push(Span::styled(format!("   page {} of {}", active, pages), styles::muted_style()));
    spans
}
