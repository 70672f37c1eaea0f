//! Drawing: menu screen and the live board. Reads game state, never writes it.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::board::CellState;
use crate::game::{Game, GameState};
use crate::piece::TetrominoType;

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

/// Lines under the board: score, device status, key hints.
const FOOTER_HEIGHT: u16 = 3;

fn tetromino_color(t: TetrominoType) -> Color {
    let (r, g, b) = t.rgb();
    Color::Rgb(r, g, b)
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render(frame: &mut Frame, game: &Game, device_status: &str) {
    let area = frame.size();

    match game.state {
        GameState::Menu => render_menu(frame, game, device_status, area),
        GameState::Playing => render_game(frame, game, device_status, area),
    }
}

fn render_menu(frame: &mut Frame, game: &Game, device_status: &str, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "TETRIS",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Press Enter to Start", Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(format!("Best: {}", game.best_score)),
        Line::from(Span::styled(device_status.to_string(), Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(Span::styled(
            "C: Connect device | Q/ESC: Quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(36, 11, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_game(frame: &mut Frame, game: &Game, device_status: &str, area: Rect) {
    let cols = u16::try_from(game.board.width()).unwrap_or(u16::MAX);
    let rows = u16::try_from(game.board.height()).unwrap_or(u16::MAX);
    let grid_display_width = cols.saturating_mul(CELL_WIDTH).saturating_add(2);
    let grid_display_height = rows.saturating_add(2);
    let total_width = grid_display_width.max(80);
    let total_height = grid_display_height.saturating_add(1 + FOOTER_HEIGHT);

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(grid_display_height),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .split(main_area);

    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(grid_display_width),
        Constraint::Fill(1),
    ]);
    let header = horizontal.split(vertical[0])[1];
    let grid = horizontal.split(vertical[1])[1];

    let reset_label = Paragraph::new(Line::from("[R] Reset"))
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::White));
    frame.render_widget(reset_label, header);

    render_grid(frame, game, grid);

    let footer = vec![
        Line::from(Span::styled(
            format!("Score: {} | Best: {}", game.score, game.best_score),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(device_status.to_string(), Style::default().fg(Color::Cyan))),
        Line::from(Span::styled(
            "A/D: Move | S: Drop | W/Z: Rotate | Space: Hard drop | C: Connect | Q: Quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let footer = Paragraph::new(footer).alignment(Alignment::Center);
    frame.render_widget(footer, vertical[2]);
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visual_grid = game.render_grid();

    let lines: Vec<Line> = visual_grid
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(kind) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(tetromino_color(*kind)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}
