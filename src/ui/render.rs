use crate::generator::{ContentPackage, ContentType};
use crate::orchestrator::PromptSignal;
use crate::ui::app::{App, FocusPane};
use crate::ui::theme::{Theme, ThemeMode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, app: &App) {
    let theme = app.theme();

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg).fg(theme.fg)),
        frame.area(),
    );

    // Main layout: Header + Body + Footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, main_chunks[0]);

    // Split body into left (form) and right (results)
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[1]);

    render_form(frame, app, body_chunks[0]);

    if let Some(error) = &app.error {
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(body_chunks[1]);

        render_error_banner(frame, theme, error, right_chunks[0]);
        render_results(frame, app, right_chunks[1]);
    } else {
        render_results(frame, app, body_chunks[1]);
    }

    render_footer(frame, app, main_chunks[2]);

    match app.modal {
        Some(PromptSignal::EmailUnlock) => render_email_modal(frame, app),
        Some(PromptSignal::Paywall) => render_paywall_modal(frame, theme),
        None => {}
    }
}

fn border_style(theme: &Theme, focused: bool) -> Style {
    if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.fg_dim)
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let theme_icon = match app.theme_mode {
        ThemeMode::Dark => "☀",
        ThemeMode::Light => "🌙",
    };

    let header_text = Line::from(vec![
        Span::styled(
            " ✨ ContentCrafter AI ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Generations Left: ", Style::default().fg(theme.fg_dim)),
        Span::styled(
            app.generations_left.to_string(),
            Style::default()
                .fg(theme.secondary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {} Ctrl+t", theme_icon),
            Style::default().fg(theme.fg_dim),
        ),
    ]);

    let header = Paragraph::new(header_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent)),
    );

    frame.render_widget(header, area);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                  // Topic
            Constraint::Length(ContentType::ALL.len() as u16 + 2), // Content types
            Constraint::Min(0),                                     // Status
        ])
        .split(area);

    // Topic input
    let topic_focused = app.focus == FocusPane::Topic && app.modal.is_none();
    let topic_line = if app.topic.is_empty() && !topic_focused {
        Line::from(Span::styled(
            "e.g. The history of coffee",
            Style::default().fg(theme.fg_dim),
        ))
    } else {
        let cursor = if topic_focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(app.topic.clone(), Style::default().fg(theme.fg)),
            Span::styled(cursor, Style::default().fg(theme.accent)),
        ])
    };

    let topic = Paragraph::new(topic_line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("📝 Topic")
            .border_style(border_style(theme, topic_focused)),
    );
    frame.render_widget(topic, chunks[0]);

    // Content type list
    let list_focused = app.focus == FocusPane::ContentType && app.modal.is_none();
    let items: Vec<ListItem> = ContentType::ALL
        .iter()
        .enumerate()
        .map(|(i, ct)| {
            let marker = if app.content_type == Some(*ct) {
                "(•)"
            } else {
                "( )"
            };
            let style = if list_focused && i == app.content_type_cursor {
                Style::default()
                    .fg(theme.fg)
                    .bg(theme.selection_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.fg)
            };
            ListItem::new(format!("{} {}", marker, ct.label())).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("🎬 Content Type")
            .border_style(border_style(theme, list_focused)),
    );
    frame.render_widget(list, chunks[1]);

    // Status
    let mut lines = Vec::new();
    if app.is_loading {
        lines.push(Line::from(Span::styled(
            format!("{} Crafting your content package...", app.spinner()),
            Style::default().fg(theme.secondary),
        )));
    } else if app.limit_reached {
        lines.push(Line::from(Span::styled(
            "Daily free limit reached. Come back tomorrow!",
            Style::default().fg(theme.error),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Press Enter to generate",
            Style::default().fg(theme.success),
        )));
    }
    if let Some(notice) = &app.notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(theme.secondary),
        )));
    }

    let status = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.fg_dim)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[2]);
}

fn render_error_banner(frame: &mut Frame, theme: &Theme, error: &str, area: Rect) {
    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Press Esc to dismiss",
            Style::default().fg(theme.fg_dim),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.error)),
    )
    .wrap(Wrap { trim: true });

    frame.render_widget(banner, area);
}

/// Lines for a package in the results panel
pub fn package_lines(package: &ContentPackage, theme: &Theme) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(theme.accent)
        .add_modifier(Modifier::BOLD);
    let label = Style::default().fg(theme.fg_dim);

    let mut lines = vec![Line::from(Span::styled("Title Suggestions", heading))];
    for (i, title) in package.titles.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!(" {}. ", i + 1), label),
            Span::styled(
                title.clone(),
                Style::default()
                    .fg(theme.secondary)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Full Script/Outline", heading)));

    for segment in &package.script {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            segment.segment_title.clone(),
            Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled("Talking Points:", label)));
        for point in &segment.talking_points {
            lines.push(Line::from(format!("  • {}", point)));
        }
        if !segment.media_links.is_empty() {
            lines.push(Line::from(Span::styled("Visual & B-Roll Links:", label)));
            for link in &segment.media_links {
                lines.push(Line::from(vec![
                    Span::raw(format!("  🔗 {}  ", link.description)),
                    Span::styled(
                        link.url.clone(),
                        Style::default()
                            .fg(theme.accent)
                            .add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }
        }
    }

    lines
}

fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let focused = app.focus == FocusPane::Results && app.modal.is_none();

    let text = if app.is_loading {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("{} Generating...", app.spinner()),
                Style::default().fg(theme.secondary),
            )),
        ]
    } else if let Some(package) = &app.package {
        package_lines(package, theme)
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Welcome to ContentCrafter AI",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter a topic and select a content type to begin your creation journey.",
                Style::default().fg(theme.fg_dim),
            )),
        ]
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("📦 Content Package")
                .border_style(border_style(theme, focused)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.results_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.modal.is_some() {
        "[Enter] Confirm  [Esc] Close"
    } else {
        match app.focus {
            FocusPane::Topic => "[Type] Topic  [Tab] Next  [Enter] Generate  [Ctrl+t] Theme  [Ctrl+c] Quit",
            FocusPane::ContentType => {
                "[↑↓/jk] Choose  [Space] Select  [Enter] Generate  [Tab] Next  [Ctrl+c] Quit"
            }
            FocusPane::Results => {
                "[↑↓/jk] Scroll  [Ctrl+y] Copy script  [Ctrl+l] Copy links  [Tab] Next  [Ctrl+c] Quit"
            }
        }
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(app.theme().fg_dim))
        .block(Block::default());

    frame.render_widget(footer, area);
}

/// A rectangle of the given size centered in `area`, clamped to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn modal_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.bg).fg(theme.fg))
}

fn render_email_modal(frame: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = centered_rect(60, 12, frame.area());

    let mut lines = vec![
        Line::from(""),
        Line::from(
            "You've reached your anonymous free generation limit. Enter your email to unlock more content packages, completely free.",
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled("Email: ", Style::default().fg(theme.fg_dim)),
            Span::styled(
                app.email_input.clone(),
                Style::default()
                    .fg(theme.secondary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("▏", Style::default().fg(theme.accent)),
        ]),
    ];
    if let Some(hint) = &app.email_hint {
        lines.push(Line::from(Span::styled(
            hint.clone(),
            Style::default().fg(theme.error),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] Unlock More Generations   [Esc] No thanks",
        Style::default().fg(theme.fg_dim),
    )));

    let modal = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(modal_block(" Unlock More Content! ", theme))
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(modal, area);
}

fn render_paywall_modal(frame: &mut Frame, theme: &Theme) {
    let area = centered_rect(60, 10, frame.area());

    let lines = vec![
        Line::from(""),
        Line::from(
            "You've used all your free generations! Subscribe for unlimited access and advanced features to keep creating amazing content.",
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Pricing plans coming soon.",
            Style::default().fg(theme.secondary),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Esc] Maybe later",
            Style::default().fg(theme.fg_dim),
        )),
    ];

    let modal = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(modal_block(" You're a Content Pro! ", theme))
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(modal, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::mock::mock_package;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_centered_rect_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(60, 12, area);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));

        let rect = centered_rect(20, 4, area);
        assert_eq!(rect, Rect::new(10, 3, 20, 4));
    }

    #[test]
    fn test_package_lines_include_titles_and_links() {
        let lines = package_lines(&mock_package(), ThemeMode::Dark.theme());
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();

        assert!(text.iter().any(|l| l.contains("Mock Title 1")));
        assert!(text.iter().any(|l| l.contains("Introduction (Mock Data)")));
        assert!(text
            .iter()
            .any(|l| l.contains("https://www.pexels.com/search/thumbs%20up/")));
    }

    #[test]
    fn test_render_welcome_screen() {
        let mut app = App::new(ThemeMode::Dark);
        app.generations_left = 6;
        let screen = draw(&app);

        assert!(screen.contains("ContentCrafter AI"));
        assert!(screen.contains("Generations Left: 6"));
        assert!(screen.contains("Welcome to ContentCrafter AI"));
    }

    #[test]
    fn test_render_error_and_paywall() {
        let mut app = App::new(ThemeMode::Light);
        app.error = Some("Something broke".to_string());
        app.modal = Some(PromptSignal::Paywall);
        let screen = draw(&app);

        assert!(screen.contains("Something broke"));
        assert!(screen.contains("You're a Content Pro!"));
    }
}
