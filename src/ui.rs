use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use crate::app::{App, View};
use crate::fx::PunchSide;
use crate::media::MediaSource;
use crate::share;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.view {
            View::Upload => render_upload(self, area, buf),
            View::Processing => render_processing(self, area, buf),
            View::Editor => render_editor(self, area, buf),
            View::Community => render_community(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn accent_bold() -> Style {
    bold().fg(Color::Green)
}

fn combo_bold() -> Style {
    bold().fg(Color::Red)
}

fn dim_italic() -> Style {
    Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC)
}

/// Rect horizontally centered in `area`, wide enough for `width` columns.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_upload(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("FIGHTHYPE", accent_bold())),
        Line::from(Span::styled(
            "boxing performance analytics",
            dim_italic(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("mode: {}", app.mode.to_string().to_uppercase()),
            bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "(enter) analyze / (1-4) mode / (c)ommunity / (esc)ape",
            dim_italic(),
        )),
    ];

    if let Some(error) = &app.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.clone(), combo_bold())));
    }

    let width = lines
        .iter()
        .map(|l| {
            l.spans
                .iter()
                .map(|s| s.content.width())
                .sum::<usize>() as u16
        })
        .max()
        .unwrap_or(0);

    let target = centered(area, width.max(20), lines.len() as u16);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(target, buf);
}

fn render_processing(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("ANALYZING"))
        .gauge_style(accent_bold())
        .percent(u16::from(app.processing.progress()));
    gauge.render(chunks[1], buf);

    Paragraph::new(Span::styled(app.processing.step(), dim_italic()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

fn render_editor(app: &App, area: Rect, buf: &mut Buffer) {
    let snap = app.engine.snapshot();
    let session = app.engine.session();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints([
            Constraint::Length(1), // session banner
            Constraint::Length(1), // HUD
            Constraint::Length(3), // power meter
            Constraint::Min(5),    // stats grid
            Constraint::Length(1), // legend
        ])
        .split(area);

    let play_state = if app.player.has_ended() {
        "ended"
    } else if app.player.is_playing() {
        "playing"
    } else {
        "paused"
    };
    let banner = format!(
        "SESSION #{}   {}   {:>5.1}s / {:.0}s   [{}]",
        session.id,
        app.mode.to_string().to_uppercase(),
        app.player.position(),
        session.duration,
        play_state,
    );
    Paragraph::new(Span::styled(banner, bold()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if app.show_hud {
        render_hud(app, &snap, chunks[1], buf);
    }

    let meter = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("POWER"))
        .gauge_style(accent_bold())
        .percent(snap.current_power.min(100) as u16);
    meter.render(chunks[2], buf);

    render_stats_grid(app, &snap, chunks[3], buf);

    let legend = if Browser::is_available() {
        "(space) play / (r)estart / (1-4) mode / (m)ute / (h)ud / (s)hare / (t)weet / (g) post / (c)ommunity / (u)pload / (esc)ape"
    } else {
        "(space) play / (r)estart / (1-4) mode / (m)ute / (h)ud / (s)hare / (g) post / (c)ommunity / (u)pload / (esc)ape"
    };
    Paragraph::new(Span::styled(legend, dim_italic()))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn render_hud(app: &App, snap: &crate::engine::StatsSnapshot, area: Rect, buf: &mut Buffer) {
    let mut spans = vec![
        Span::styled(format!("PUNCHES {}", snap.punch_count), bold()),
        Span::raw("   "),
        Span::styled(format!("SPEED {} KM/H", snap.live_speed), bold()),
        Span::raw("   "),
        Span::styled(format!("POWER {}%", snap.current_power), accent_bold()),
        Span::raw("   "),
        Span::styled(format!("COMBO x{}", snap.combo_count), combo_bold()),
    ];

    if app.fx.is_active {
        let marker = match app.fx.side {
            PunchSide::Left => "  ◀ HIT",
            PunchSide::Right => "  HIT ▶",
        };
        let style = if app.fx.brightness() > 0.5 {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(marker, style));
    }

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_stats_grid(
    app: &App,
    snap: &crate::engine::StatsSnapshot,
    area: Rect,
    buf: &mut Buffer,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = vec![
        stat_line("TOTAL STRIKES", snap.punch_count.to_string(), bold()),
        stat_line("PEAK POWER", snap.peak_power.to_string(), accent_bold()),
        stat_line("AVG POWER", snap.avg_power.to_string(), bold()),
        stat_line("MAX COMBO", format!("x{}", snap.max_combo), combo_bold()),
        stat_line("ACCURACY", format!("{}%", snap.accuracy), bold()),
    ];
    let right = vec![
        stat_line("DEFENSE", format!("{}%", snap.defense_rating), bold()),
        stat_line("REACTION", format!("{:.1}s", snap.reaction_time), bold()),
        stat_line("STAMINA", format!("{:.0}%", snap.stamina), bold()),
        stat_line("INTENSITY", snap.intensity.to_string(), bold()),
        stat_line(
            "SOUND",
            if app.muted { "muted" } else { "on" }.to_string(),
            dim_italic(),
        ),
    ];

    Paragraph::new(left)
        .block(Block::default().borders(Borders::ALL).title("COMBAT"))
        .render(columns[0], buf);
    Paragraph::new(right)
        .block(Block::default().borders(Borders::ALL).title("CONDITION"))
        .render(columns[1], buf);
}

fn stat_line(label: &str, value: String, value_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<14}"), dim_italic()),
        Span::styled(value, value_style),
    ])
}

fn render_community(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled("COMMUNITY HIGHLIGHTS", accent_bold()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if app.highlights.is_empty() {
        Paragraph::new(
            "No highlights yet.\nBe the first to share your training highlights!",
        )
        .block(Block::default().borders(Borders::ALL))
        .style(dim_italic())
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    } else {
        let header = Row::new(vec!["FIGHTER", "POWER", "STRIKES", "COMBO", "MODE", "SHARED"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = app
            .highlights
            .iter()
            .map(|h| {
                Row::new(vec![
                    Cell::from(h.fighter.clone()),
                    Cell::from(format!("{}%", h.power)).style(accent_bold()),
                    Cell::from(h.strikes.to_string()),
                    Cell::from(format!("x{}", h.combo)).style(combo_bold()),
                    Cell::from(h.mode.to_uppercase()),
                    Cell::from(share::time_ago(h.created_at)),
                ])
            })
            .collect();

        Table::new(
            rows,
            &[
                Constraint::Length(16),
                Constraint::Length(8),
                Constraint::Length(9),
                Constraint::Length(7),
                Constraint::Length(8),
                Constraint::Min(12),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .render(chunks[1], buf);
    }

    Paragraph::new(Span::styled("(b)ack / (esc)ape", dim_italic()))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::{backend::TestBackend, Terminal};

    fn test_app() -> App {
        let mut rng = StdRng::seed_from_u64(17);
        App::new(&mut rng, &Config::default()).with_store(None)
    }

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_upload_view_renders_title_and_mode() {
        let app = test_app();
        let content = render_to_string(&app);
        assert!(content.contains("FIGHTHYPE"));
        assert!(content.contains("SHADOW"));
    }

    #[test]
    fn test_upload_view_shows_error() {
        let mut app = test_app();
        app.error = Some("file too large".to_string());
        let content = render_to_string(&app);
        assert!(content.contains("file too large"));
    }

    #[test]
    fn test_processing_view_shows_step() {
        let mut app = test_app();
        app.upload(None);
        let content = render_to_string(&app);
        assert!(content.contains("ANALYZING"));
        assert!(content.contains("Reading video data..."));
    }

    #[test]
    fn test_editor_view_shows_session_and_stats() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut app = test_app();
        app.upload(None);
        for _ in 0..50 {
            app.on_tick(&mut rng);
        }
        assert_eq!(app.view, View::Editor);

        let content = render_to_string(&app);
        assert!(content.contains("SESSION #FH"));
        assert!(content.contains("POWER"));
        assert!(content.contains("TOTAL STRIKES"));
        assert!(content.contains("STAMINA"));
        assert!(content.contains("INTENSITY"));
    }

    #[test]
    fn test_editor_hud_hidden_when_toggled_off() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut app = test_app();
        app.upload(None);
        for _ in 0..50 {
            app.on_tick(&mut rng);
        }
        app.toggle_hud();

        let content = render_to_string(&app);
        assert!(!content.contains("PUNCHES"));
    }

    #[test]
    fn test_community_view_empty_state() {
        let mut app = test_app();
        app.switch_view(View::Community);
        let content = render_to_string(&app);
        assert!(content.contains("No highlights yet"));
    }

    #[test]
    fn test_community_view_lists_highlights() {
        use crate::store::Highlight;
        use chrono::Local;

        let mut app = test_app();
        app.switch_view(View::Community);
        app.highlights = vec![Highlight {
            session_id: "FHAAAAAA".to_string(),
            fighter: "Southpaw".to_string(),
            power: 88,
            strikes: 31,
            combo: 6,
            mode: "spar".to_string(),
            created_at: Local::now(),
        }];

        let content = render_to_string(&app);
        assert!(content.contains("Southpaw"));
        assert!(content.contains("88%"));
        assert!(content.contains("SPAR"));
    }
}
