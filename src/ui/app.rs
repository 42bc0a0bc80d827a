use crate::generator::{ContentPackage, ContentType};
use crate::orchestrator::{GenerateOutcome, PromptSignal};
use crate::ui::theme::{Theme, ThemeMode};
use crate::usage::{Tier, UsageTracker};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusPane {
    Topic,
    ContentType,
    Results,
}

/// Something the event loop has to do outside the UI state
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Generate,
    SubmitEmail(String),
    ToggleTheme,
    CopyPackage,
    CopyLinks,
    Quit,
}

pub struct App {
    pub topic: String,
    pub content_type: Option<ContentType>,
    pub content_type_cursor: usize,
    pub focus: FocusPane,
    /// Open prompt modal, if any
    pub modal: Option<PromptSignal>,
    pub email_input: String,
    pub email_hint: Option<String>,
    /// Dismissible error banner
    pub error: Option<String>,
    /// Short informational line in the form panel
    pub notice: Option<String>,
    pub package: Option<ContentPackage>,
    pub results_scroll: u16,
    pub is_loading: bool,
    pub theme_mode: ThemeMode,
    pub generations_left: u32,
    pub tier: Tier,
    pub limit_reached: bool,
    pub should_quit: bool,
    pub tick: usize,
}

impl App {
    pub fn new(theme_mode: ThemeMode) -> Self {
        Self {
            topic: String::new(),
            content_type: None,
            content_type_cursor: 0,
            focus: FocusPane::Topic,
            modal: None,
            email_input: String::new(),
            email_hint: None,
            error: None,
            notice: None,
            package: None,
            results_scroll: 0,
            is_loading: false,
            theme_mode,
            generations_left: 0,
            tier: Tier::Anonymous,
            limit_reached: true,
            should_quit: false,
            tick: 0,
        }
    }

    pub fn theme(&self) -> &'static Theme {
        self.theme_mode.theme()
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.tick % SPINNER_FRAMES.len()]
    }

    /// Copy the tracker's counters for display
    pub fn sync_usage(&mut self, tracker: &UsageTracker) {
        self.generations_left = tracker.generations_left();
        self.tier = tracker.tier();
        self.limit_reached = tracker.is_limit_reached();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Topic => FocusPane::ContentType,
            FocusPane::ContentType => {
                if self.package.is_some() {
                    FocusPane::Results
                } else {
                    FocusPane::Topic
                }
            }
            FocusPane::Results => FocusPane::Topic,
        };
    }

    pub fn next_content_type(&mut self) {
        self.content_type_cursor = (self.content_type_cursor + 1) % ContentType::ALL.len();
        self.select_content_type();
    }

    pub fn previous_content_type(&mut self) {
        if self.content_type_cursor > 0 {
            self.content_type_cursor -= 1;
        } else {
            self.content_type_cursor = ContentType::ALL.len() - 1;
        }
        self.select_content_type();
    }

    /// Select the content type under the cursor
    pub fn select_content_type(&mut self) {
        self.content_type = ContentType::ALL.get(self.content_type_cursor).copied();
    }

    pub fn scroll_results_up(&mut self, lines: u16) {
        self.results_scroll = self.results_scroll.saturating_sub(lines);
    }

    pub fn scroll_results_down(&mut self, lines: u16) {
        self.results_scroll = self.results_scroll.saturating_add(lines);
    }

    /// A request was accepted and is running
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.notice = None;
        self.package = None;
        self.results_scroll = 0;
    }

    /// Reflect the result of a generate request
    pub fn apply_outcome(&mut self, outcome: GenerateOutcome) {
        self.is_loading = false;

        match outcome {
            GenerateOutcome::Busy => {}
            GenerateOutcome::Gated(prompt) => self.open_modal(prompt),
            GenerateOutcome::Skipped => {
                self.notice = Some("Enter a topic and choose a content type first.".to_string());
            }
            GenerateOutcome::Generated { package, prompt } => {
                self.package = Some(package);
                self.results_scroll = 0;
                if let Some(prompt) = prompt {
                    self.open_modal(prompt);
                }
            }
            GenerateOutcome::Failed(message) => {
                self.error = Some(message);
            }
        }
    }

    pub fn open_modal(&mut self, prompt: PromptSignal) {
        self.modal = Some(prompt);
        self.email_input.clear();
        self.email_hint = None;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.email_input.clear();
        self.email_hint = None;
    }

    /// The orchestrator accepted the email
    pub fn email_accepted(&mut self) {
        self.close_modal();
        self.notice = Some("Email confirmed. More generations unlocked!".to_string());
    }

    pub fn email_rejected(&mut self) {
        self.email_hint = Some("Please enter a valid email address.".to_string());
    }

    /// Update state for a key press and return any action for the event loop
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => Some(AppAction::Quit),
                KeyCode::Char('t') => Some(AppAction::ToggleTheme),
                KeyCode::Char('y') if self.package.is_some() => Some(AppAction::CopyPackage),
                KeyCode::Char('l') if self.package.is_some() => Some(AppAction::CopyLinks),
                _ => None,
            };
        }

        if let Some(prompt) = self.modal {
            return self.handle_modal_key(prompt, key.code);
        }

        match key.code {
            KeyCode::Esc => {
                self.error = None;
                self.notice = None;
                None
            }
            KeyCode::Tab => {
                self.toggle_focus();
                None
            }
            KeyCode::Enter => {
                if self.focus == FocusPane::ContentType {
                    self.select_content_type();
                }
                if self.is_loading {
                    None
                } else {
                    Some(AppAction::Generate)
                }
            }
            code => {
                match self.focus {
                    FocusPane::Topic => match code {
                        KeyCode::Char(c) => self.topic.push(c),
                        KeyCode::Backspace => {
                            self.topic.pop();
                        }
                        KeyCode::Down => self.focus = FocusPane::ContentType,
                        _ => {}
                    },
                    FocusPane::ContentType => match code {
                        KeyCode::Down | KeyCode::Char('j') => self.next_content_type(),
                        KeyCode::Up | KeyCode::Char('k') => self.previous_content_type(),
                        KeyCode::Char(' ') => self.select_content_type(),
                        _ => {}
                    },
                    FocusPane::Results => match code {
                        KeyCode::Down | KeyCode::Char('j') => self.scroll_results_down(1),
                        KeyCode::Up | KeyCode::Char('k') => self.scroll_results_up(1),
                        KeyCode::PageDown => self.scroll_results_down(10),
                        KeyCode::PageUp => self.scroll_results_up(10),
                        KeyCode::Char('g') => self.results_scroll = 0,
                        _ => {}
                    },
                }
                None
            }
        }
    }

    fn handle_modal_key(&mut self, prompt: PromptSignal, code: KeyCode) -> Option<AppAction> {
        match prompt {
            PromptSignal::EmailUnlock => match code {
                KeyCode::Esc => {
                    self.close_modal();
                    None
                }
                KeyCode::Enter => {
                    if self.email_input.trim().is_empty() {
                        self.email_rejected();
                        None
                    } else {
                        Some(AppAction::SubmitEmail(self.email_input.clone()))
                    }
                }
                KeyCode::Backspace => {
                    self.email_input.pop();
                    None
                }
                KeyCode::Char(c) => {
                    self.email_input.push(c);
                    None
                }
                _ => None,
            },
            PromptSignal::Paywall => {
                if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.close_modal();
                }
                None
            }
        }
    }
}
