use tracing::{info, warn};

use crate::config::Config;
use crate::session::QuizError;
use crate::session::controller::{SessionController, SessionMode, SessionState};
use crate::session::result::SessionSummary;
use crate::store::schema::PlaybackPrefs;
use crate::timer::{Clock, FeedbackTimer};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Title,
    Quiz,
    Explanation,
    Result,
    GauntletResult,
}

/// Presenter mapping. While the feedback timer runs an answered question stays
/// on the quiz screen with the answer revealed.
pub fn screen_for(state: &SessionState, revealing: bool) -> AppScreen {
    match state {
        SessionState::Idle => AppScreen::Title,
        SessionState::InProgress { .. } => AppScreen::Quiz,
        SessionState::AwaitingAdvance(_) if revealing => AppScreen::Quiz,
        SessionState::AwaitingAdvance(_) => AppScreen::Explanation,
        SessionState::Complete(SessionSummary::Normal { .. }) => AppScreen::Result,
        SessionState::Complete(SessionSummary::Gauntlet { .. }) => AppScreen::GauntletResult,
    }
}

pub struct App {
    pub screen: AppScreen,
    pub controller: SessionController,
    pub config: Config,
    pub theme: &'static Theme,
    /// Index into the title menu; one past the last genre is the gauntlet.
    pub menu_selected: usize,
    pub toast: Option<String>,
    pub confirm_reset: bool,
    pub should_quit: bool,
    feedback_timer: FeedbackTimer,
    clock: Box<dyn Clock>,
}

impl App {
    pub fn new(config: Config, controller: SessionController, clock: Box<dyn Clock>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let feedback_timer = FeedbackTimer::new(config.feedback_delay());

        Self {
            screen: AppScreen::Title,
            controller,
            config,
            theme,
            menu_selected: 0,
            toast: None,
            confirm_reset: false,
            should_quit: false,
            feedback_timer,
            clock,
        }
    }

    fn sync_screen(&mut self) {
        self.screen = screen_for(&self.controller.state(), self.feedback_timer.is_running());
    }

    fn show_error(&mut self, err: QuizError) {
        info!("{err}");
        self.toast = Some(match err {
            QuizError::GenreNotFound(_) | QuizError::EmptyGenre(_) => {
                "No questions were found for that genre.".to_string()
            }
            QuizError::NoGauntletMaterial => {
                "The gauntlet has no missed questions yet. Play the other routes first."
                    .to_string()
            }
            other => other.to_string(),
        });
        self.sync_screen();
    }

    pub fn menu_len(&self) -> usize {
        self.controller.bank().genres.len() + 1
    }

    pub fn gauntlet_selected(&self) -> bool {
        self.menu_selected == self.controller.bank().genres.len()
    }

    pub fn menu_next(&mut self) {
        self.menu_selected = (self.menu_selected + 1) % self.menu_len();
    }

    pub fn menu_prev(&mut self) {
        if self.menu_selected > 0 {
            self.menu_selected -= 1;
        } else {
            self.menu_selected = self.menu_len() - 1;
        }
    }

    pub fn activate_menu(&mut self) {
        if self.gauntlet_selected() {
            self.choose_gauntlet();
        } else if let Some(id) = self
            .controller
            .bank()
            .genres
            .get(self.menu_selected)
            .map(|g| g.id.clone())
        {
            self.choose_genre(&id);
        }
    }

    pub fn choose_genre(&mut self, genre_id: &str) {
        self.feedback_timer.cancel();
        match self.controller.start_normal(genre_id) {
            Ok(()) => self.sync_screen(),
            Err(err) => self.show_error(err),
        }
    }

    pub fn choose_gauntlet(&mut self) {
        self.feedback_timer.cancel();
        match self.controller.start_gauntlet() {
            Ok(()) => self.sync_screen(),
            Err(err) => self.show_error(err),
        }
    }

    /// Ignored unless a question is waiting for an answer.
    pub fn submit_answer(&mut self, selected: usize) {
        if self.screen != AppScreen::Quiz || self.feedback_timer.is_running() {
            return;
        }
        match self.controller.submit_answer(selected) {
            Ok(_) => {
                self.feedback_timer.arm(self.clock.now());
                self.sync_screen();
            }
            Err(QuizError::ChoiceOutOfRange { .. }) => {}
            Err(err) => warn!("answer rejected: {err}"),
        }
    }

    pub fn tick(&mut self) {
        if self.feedback_timer.poll(self.clock.now()) {
            self.sync_screen();
        }
    }

    pub fn advance(&mut self) {
        if self.screen != AppScreen::Explanation {
            return;
        }
        if let Err(err) = self.controller.advance() {
            warn!("advance rejected: {err}");
        }
        self.sync_screen();
    }

    pub fn retry(&mut self) {
        if !matches!(self.screen, AppScreen::Result | AppScreen::GauntletResult) {
            return;
        }
        match self.controller.retry() {
            Ok(()) => self.sync_screen(),
            Err(err) => {
                self.controller.reset();
                self.show_error(err);
            }
        }
    }

    pub fn go_home(&mut self) {
        self.controller.reset();
        self.feedback_timer.cancel();
        self.confirm_reset = false;
        self.sync_screen();
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    pub fn playback(&self) -> PlaybackPrefs {
        self.controller.ledger().playback()
    }

    pub fn toggle_music(&mut self) {
        let mut prefs = self.playback();
        prefs.music = !prefs.music;
        self.controller.ledger_mut().set_playback(prefs);
    }

    pub fn toggle_effects(&mut self) {
        let mut prefs = self.playback();
        prefs.effects = !prefs.effects;
        self.controller.ledger_mut().set_playback(prefs);
    }

    pub fn request_reset_all(&mut self) {
        if self.screen == AppScreen::Title {
            self.confirm_reset = true;
        }
    }

    pub fn confirm_reset_all(&mut self, confirmed: bool) {
        if self.confirm_reset && confirmed {
            self.controller.ledger_mut().reset_all();
            self.toast = Some("All progress has been reset.".to_string());
        }
        self.confirm_reset = false;
    }

    pub fn cycle_theme(&mut self) {
        let themes = Theme::available_themes();
        let next = match themes.iter().position(|t| *t == self.config.theme) {
            Some(idx) => themes[(idx + 1) % themes.len()].clone(),
            None => match themes.first() {
                Some(first) => first.clone(),
                None => return,
            },
        };
        if let Some(theme) = Theme::load(&next) {
            self.theme = Box::leak(Box::new(theme));
            self.config.theme = next;
            if let Err(err) = self.config.save() {
                warn!("could not save config: {err}");
            }
        }
    }

    pub fn feedback_remaining_ms(&self) -> Option<u64> {
        self.feedback_timer.remaining_ms(self.clock.now())
    }

    /// Header label for the active run.
    pub fn session_title(&self) -> String {
        match self.controller.mode() {
            Some(SessionMode::Normal { genre_id }) => self
                .controller
                .bank()
                .genre(genre_id)
                .map(|g| g.name.clone())
                .unwrap_or_else(|| genre_id.clone()),
            Some(SessionMode::Gauntlet) => "The Gauntlet".to_string(),
            None => String::new(),
        }
    }
}
