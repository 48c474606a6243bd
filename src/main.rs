use std::io;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{info, warn};

use histquiz::app::{App, AppScreen};
use histquiz::bank::QuestionBank;
use histquiz::config::Config;
use histquiz::event::{AppEvent, EventHandler};
use histquiz::logging;
use histquiz::session::controller::{SessionController, SessionState};
use histquiz::store::kv::{FileKvStore, KvStore, MemoryKvStore};
use histquiz::store::ledger::Ledger;
use histquiz::timer::SystemClock;
use histquiz::ui::components::explanation::ExplanationPanel;
use histquiz::ui::components::genre_menu::GenreMenu;
use histquiz::ui::components::question_view::QuestionView;
use histquiz::ui::components::result_dashboard::ResultDashboard;
use histquiz::ui::components::splash::Splash;
use histquiz::ui::components::toast::Toast;
use histquiz::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use histquiz::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "histquiz", version, about = "Terminal modern-history trivia quiz")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Question bank JSON file")]
    bank: Option<PathBuf>,

    #[arg(long, help = "Directory for progress data and the log file")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Delay in milliseconds before the explanation appears")]
    feedback_ms: Option<u64>,

    #[arg(long, help = "Print the stored progress as JSON and exit")]
    dump_ledger: bool,

    #[arg(long, value_name = "GENRE", help = "Mark a genre as cleared and exit")]
    force_clear: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|err| {
        eprintln!("Warning: could not read config ({err}); using defaults");
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(bank) = cli.bank {
        config.question_bank = Some(bank);
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(ms) = cli.feedback_ms {
        config.feedback_delay_ms = ms;
    }
    config.validate();

    let data_dir = config.data_dir();
    if let Err(err) = logging::init(&data_dir) {
        eprintln!("Warning: logging disabled ({err})");
    }
    info!(data_dir = %data_dir.display(), "histquiz starting");

    let store: Box<dyn KvStore> = match FileKvStore::with_base_dir(data_dir.clone()) {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!("cannot open data dir {}: {err}; progress will not be saved", data_dir.display());
            Box::new(MemoryKvStore::new())
        }
    };
    let mut ledger = Ledger::load(store);

    if cli.dump_ledger {
        println!("{}", serde_json::to_string_pretty(&ledger.snapshot())?);
        return Ok(());
    }

    if let Some(genre_id) = cli.force_clear {
        let bank = QuestionBank::load(config.question_bank.as_deref());
        if bank.genre(&genre_id).is_none() {
            bail!("unknown genre '{genre_id}'");
        }
        ledger.force_clear(&genre_id);
        println!("Marked '{genre_id}' as cleared.");
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, config, ledger);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    ledger: Ledger,
) -> Result<()> {
    let splash_theme = Theme::load(&config.theme).unwrap_or_default();
    terminal.draw(|frame| frame.render_widget(Splash { theme: &splash_theme }, frame.area()))?;

    let bank = QuestionBank::load(config.question_bank.as_deref());
    let events = EventHandler::new(config.tick_rate());
    let controller = SessionController::new(bank, ledger);
    let mut app = App::new(config, controller, Box::new(SystemClock));

    loop {
        terminal.draw(|frame| render(frame, &app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(&mut app, key),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            info!("histquiz exiting");
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Popups take priority
    if app.confirm_reset {
        match key.code {
            KeyCode::Char('y') => app.confirm_reset_all(true),
            KeyCode::Char('n') | KeyCode::Esc => app.confirm_reset_all(false),
            _ => {}
        }
        return;
    }
    if app.toast.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_toast();
        }
        return;
    }

    match app.screen {
        AppScreen::Title => handle_title_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Explanation => handle_explanation_key(app, key),
        AppScreen::Result | AppScreen::GauntletResult => handle_result_key(app, key),
    }
}

fn handle_title_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu_next(),
        KeyCode::Enter => app.activate_menu(),
        KeyCode::Char('g') => app.choose_gauntlet(),
        KeyCode::Char('m') => app.toggle_music(),
        KeyCode::Char('e') => app.toggle_effects(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('x') => app.request_reset_all(),
        KeyCode::Char(ch) => {
            if let Some(n) = ch.to_digit(10)
                && n >= 1
            {
                let id = app
                    .controller
                    .bank()
                    .genres
                    .get(n as usize - 1)
                    .map(|g| g.id.clone());
                if let Some(id) = id {
                    app.menu_selected = n as usize - 1;
                    app.choose_genre(&id);
                }
            }
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_home(),
        KeyCode::Char(ch) => {
            if let Some(n) = ch.to_digit(10)
                && n >= 1
            {
                app.submit_answer(n as usize - 1);
            }
        }
        _ => {}
    }
}

fn handle_explanation_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => app.advance(),
        KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry(),
        KeyCode::Char('h') | KeyCode::Char('q') | KeyCode::Esc => app.go_home(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    let state = app.controller.state();
    match app.screen {
        AppScreen::Title => {
            let menu_area = centered_rect(60, 90, layout.main);
            let menu = GenreMenu::new(
                app.controller.bank(),
                app.controller.ledger(),
                app.menu_selected,
                app.theme,
            );
            frame.render_widget(menu, menu_area);
        }
        AppScreen::Quiz => {
            if let Some(question) = app.controller.current_question() {
                let title = app.session_title();
                let feedback = match &state {
                    SessionState::AwaitingAdvance(fb) => Some(fb),
                    _ => None,
                };
                let view = QuestionView {
                    title: &title,
                    question,
                    position: app.controller.position(),
                    total: app.controller.total(),
                    gauntlet: app.controller.mode().is_some_and(|m| m.is_gauntlet()),
                    feedback,
                    theme: app.theme,
                };
                frame.render_widget(view, centered_rect(80, 90, layout.main));
            }
        }
        AppScreen::Explanation => {
            if let (Some(question), SessionState::AwaitingAdvance(fb)) =
                (app.controller.current_question(), &state)
            {
                let last = fb.ends_run || app.controller.position() + 1 >= app.controller.total();
                let panel = ExplanationPanel {
                    question,
                    feedback: fb,
                    last,
                    theme: app.theme,
                };
                frame.render_widget(panel, centered_rect(70, 70, layout.main));
            }
        }
        AppScreen::Result | AppScreen::GauntletResult => {
            if let SessionState::Complete(summary) = &state {
                let title = app.session_title();
                let dashboard = ResultDashboard::new(summary, &title, app.theme);
                frame.render_widget(dashboard, centered_rect(60, 70, layout.main));
            }
        }
    }

    render_footer(frame, app, layout.footer);

    if app.confirm_reset {
        let popup = centered_rect(40, 25, area);
        frame.render_widget(
            Toast::confirm("Erase all cleared genres and missed questions?", app.theme),
            popup,
        );
    } else if let Some(message) = &app.toast {
        let popup = centered_rect(40, 25, area);
        frame.render_widget(Toast::message(message, app.theme), popup);
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let prefs = app.playback();
    let on_off = |on: bool| if on { "on" } else { "off" };

    let mut spans = vec![Span::styled(
        " histquiz ",
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )];
    let title = app.session_title();
    if !title.is_empty() {
        spans.push(Span::styled(
            format!("| {title} "),
            Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
        ));
    }
    let score = match app.screen {
        AppScreen::Quiz | AppScreen::Explanation => format!(
            "| Score {}/{} ",
            app.controller.score(),
            app.controller.total()
        ),
        _ => String::new(),
    };
    spans.push(Span::styled(
        format!(
            "{score}| music {} | effects {} ",
            on_off(prefs.music),
            on_off(prefs.effects)
        ),
        Style::default().fg(colors.muted()).bg(colors.header_bg()),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let hints: &[&str] = match app.screen {
        AppScreen::Title => &[
            "[1-9/Enter] Play",
            "[g] Gauntlet",
            "[m] Music",
            "[e] Effects",
            "[t] Theme",
            "[x] Reset progress",
            "[q] Quit",
        ],
        AppScreen::Quiz => &["[1-9] Answer", "[Esc] Home"],
        AppScreen::Explanation => &["[Enter] Continue", "[Esc] Home"],
        AppScreen::Result | AppScreen::GauntletResult => &["[r] Retry", "[h/Esc] Home"],
    };
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
