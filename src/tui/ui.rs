//! Stateless rendering of the board, side panel and task gate.

use super::app::App;
use crate::review::ReviewStatus;
use little_learners_board::{GameStatus, Player, PlayerColor, TileData, TileType, TurnPhase};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Draws the whole screen.
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let mut title = vec![Span::styled(
        "Little Learners",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if let Some(cue) = app.last_cue() {
        title.push(Span::styled(format!("  ♪ {}", cue), Style::default().fg(Color::DarkGray)));
    }
    let header = Paragraph::new(Line::from(title))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(30)])
        .split(chunks[1]);
    draw_board(f, body[0], app);
    draw_side_panel(f, body[1], app);

    let status = Paragraph::new(app.status_message())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[2]);

    let help = Paragraph::new(help_text(app))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);

    if let Some(review) = app.review() {
        draw_task(f, f.area(), app, review);
    }
}

fn help_text(app: &App) -> &'static str {
    match app.state().status() {
        GameStatus::Setup => "Enter: Start | Q: Quit",
        GameStatus::Finished => "N: New game | Q: Quit",
        GameStatus::Playing if app.review().is_some() => {
            "Type answer | Enter: Ask AI | F1: Speak | F2: Approve | F3: Try again | F5: Continue"
        }
        GameStatus::Playing => "R/Space: Roll | N: New game | Q: Quit",
    }
}

fn token_color(color: PlayerColor) -> Color {
    match color {
        PlayerColor::Red => Color::Red,
        PlayerColor::Blue => Color::Blue,
        PlayerColor::Green => Color::Green,
        PlayerColor::Yellow => Color::Yellow,
    }
}

fn draw_board(f: &mut Frame, area: Rect, app: &App) {
    let layout = app.layout();
    let rows = layout.visual_rows(app.catalog().tiles());

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows.len().max(1) as u32); rows.len()])
        .split(area);

    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, row.len().max(1) as u32); row.len()])
            .split(*row_area);
        for (tile, cell_area) in row.iter().zip(cells.iter()) {
            if let Some(tile) = tile {
                draw_tile(f, *cell_area, app, tile);
            }
        }
    }
}

fn draw_tile(f: &mut Frame, area: Rect, app: &App, tile: &TileData) {
    let position = tile.position();
    let (border, title_style) = match tile.tile_type() {
        TileType::Start => (Color::Green, Style::default().fg(Color::Green)),
        TileType::Finish => (Color::Magenta, Style::default().fg(Color::Magenta)),
        TileType::Task => (Color::Gray, Style::default()),
    };

    let mut header = format!("{} {}", tile.id(), tile.title());
    if app.is_illustrated(*tile.id()) {
        header.push_str(" 🖼");
    }

    let tokens: Vec<Span> = app
        .state()
        .players_at(position)
        .map(|p| token_span(p, app.state().current_player().map(|c| c.id()) == Some(p.id())))
        .collect();

    let moving_here = matches!(
        app.state().turn(),
        Some(TurnPhase::Moving { target }) if *target == position
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if moving_here { Color::White } else { border }))
        .title(Span::styled(header, title_style));

    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            tile.category().to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(tokens),
    ])
    .block(block);
    f.render_widget(paragraph, area);
}

fn token_span(player: &Player, is_current: bool) -> Span<'static> {
    let mut style = Style::default()
        .fg(token_color(*player.color()))
        .add_modifier(Modifier::BOLD);
    if is_current {
        style = style.add_modifier(Modifier::REVERSED);
    }
    let initial = player.name().chars().next().unwrap_or('?');
    Span::styled(format!("●{} ", initial), style)
}

fn draw_side_panel(f: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let mut lines = Vec::new();

    let players: &[Player] = if state.players().is_empty() {
        app.roster()
    } else {
        state.players()
    };
    for (index, player) in players.iter().enumerate() {
        let marker = if state.current_player_index() == Some(index) { "▶ " } else { "  " };
        let mut spans = vec![
            Span::raw(marker),
            Span::styled(
                format!("{} ({})", player.name(), player.icon()),
                Style::default().fg(token_color(*player.color())),
            ),
            Span::raw(format!("  tile {}", player.position() + 1)),
        ];
        if *player.is_finished() {
            spans.push(Span::raw(" 🏆"));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));
    let die = match state.turn() {
        Some(TurnPhase::Rolling) => "🎲 rolling...".to_string(),
        _ => match state.dice_value() {
            Some(face) => format!("🎲 {}", face),
            None => "🎲 -".to_string(),
        },
    };
    lines.push(Line::styled(die, Style::default().add_modifier(Modifier::BOLD)));

    if let Some(winner) = state.winner() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("{} wins!", winner.name()),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ));
    }

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Players"));
    f.render_widget(panel, area);
}

fn draw_task(f: &mut Frame, area: Rect, app: &App, review: &crate::review::TaskReview) {
    let popup = center_rect(area, 70, 20);
    f.render_widget(Clear, popup);

    let tile = review.tile();
    let mut lines = vec![
        Line::styled(tile.description().clone(), Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(""),
    ];
    if !tile.content().is_empty() {
        lines.push(Line::styled(
            tile.content().join("  ·  "),
            Style::default().fg(Color::Cyan),
        ));
        if app.pronunciation_audio().is_some() {
            lines.push(Line::styled("🔊 audio ready", Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::raw(""));
    }

    let answer_style = if review.is_editable() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(vec![
        Span::raw("Answer: "),
        Span::styled(review.answer().to_string(), answer_style),
        Span::raw(if review.is_editable() { "▏" } else { "" }),
    ]));
    lines.push(Line::raw(""));

    let status_line = match review.status() {
        ReviewStatus::Idle => Line::raw("Say or type your answer."),
        ReviewStatus::Checking => Line::styled("Checking...", Style::default().fg(Color::Yellow)),
        ReviewStatus::Reviewed => Line::styled("Teacher, please decide.", Style::default().fg(Color::Yellow)),
        ReviewStatus::Correct => Line::styled(
            "Correct! Press F5 to continue.",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        ReviewStatus::Incorrect => Line::styled("Try again!", Style::default().fg(Color::Red)),
    };
    lines.push(status_line);

    if let Some(verdict) = review.verdict() {
        let color = if *verdict.is_correct() { Color::Green } else { Color::Red };
        lines.push(Line::styled(
            format!("AI: {}", verdict.feedback()),
            Style::default().fg(color),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} · {} ", tile.title(), tile.category()));
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_rect_fits_small_area() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = center_rect(area, 70, 20);
        assert_eq!(popup, Rect::new(0, 0, 40, 10));
    }

    #[test]
    fn test_center_rect_centers() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(center_rect(area, 70, 20), Rect::new(15, 10, 70, 20));
    }
}
