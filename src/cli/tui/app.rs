//! Board state and key handling

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::event::{Event, EventHandler};
use super::views;
use super::Terminal;
use crate::domain::{
    assign_to_sprint, compute_priority, progress_summary, Action, Progress, SprintPlan, Task,
    TaskStatus,
};
use crate::storage::Project;

/// Points given to tasks added from the board
const QUICK_ADD_POINTS: i64 = 3;

/// Title used when the quick-add prompt is submitted blank
const QUICK_ADD_TITLE: &str = "New Task";

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    NewTask(String),
}

/// Application state
pub struct App {
    /// Current project
    project: Project,

    /// Board in stored order
    tasks: Vec<Task>,

    /// Fixed reference time, or `None` to follow the clock
    pinned_now: Option<DateTime<Utc>>,

    /// Statuses shown as columns, left to right
    columns: Vec<TaskStatus>,

    /// Focused column index
    column: usize,

    /// Selected card index within the focused column
    card: usize,

    /// Input mode
    input_mode: InputMode,

    /// Sprint capacity in points
    capacity: i64,

    /// Last sprint assignment, cleared when the board changes
    plan: Option<SprintPlan>,

    /// Status message to display
    status_message: Option<String>,

    /// Whether to quit
    should_quit: bool,
}

impl App {
    /// Creates the board for an opened project
    pub fn new(project: Project, pinned_now: Option<DateTime<Utc>>) -> Result<Self> {
        let tasks = project.board_store().read_all()?;
        let board = &project.config().project.board;

        let columns = TaskStatus::ALL
            .into_iter()
            .filter(|s| board.show_done || !s.is_complete())
            .collect();
        let capacity = project.config().project.sprint_capacity;

        Ok(Self {
            project,
            tasks,
            pinned_now,
            columns,
            column: 0,
            card: 0,
            input_mode: InputMode::Normal,
            capacity,
            plan: None,
            status_message: None,
            should_quit: false,
        })
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| views::board::draw(frame, self))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize | Event::Tick => {}
            }
        }

        Ok(())
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match &self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::NewTask(_) => self.handle_new_task_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('h') | KeyCode::Left => self.move_column(-1),
            KeyCode::Char('l') | KeyCode::Right => self.move_column(1),
            KeyCode::Char('j') | KeyCode::Down => self.move_card(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_card(-1),

            KeyCode::Char('s') => self.apply_to_selected(Action::Start),
            KeyCode::Char('b') => self.apply_to_selected(Action::Block),
            KeyCode::Char('u') => self.apply_to_selected(Action::Unblock),
            KeyCode::Char('f') => self.apply_to_selected(Action::Finish),

            KeyCode::Char('n') => self.input_mode = InputMode::NewTask(String::new()),

            KeyCode::Char('+') => self.set_capacity(self.capacity.saturating_add(1)),
            KeyCode::Char('-') => self.set_capacity(self.capacity - 1),
            KeyCode::Char('a') => self.assign_sprint(),

            KeyCode::Char('r') => {
                // reload() replaces this on failure
                self.status_message = Some("Reloaded".to_string());
                self.reload();
            }

            KeyCode::Char('?') => {
                self.status_message = Some(
                    "h/l:column j/k:card s:start b:block u:unblock f:finish n:new +/-:capacity a:assign r:reload q:quit"
                        .to_string(),
                );
            }

            _ => {}
        }
    }

    fn handle_new_task_key(&mut self, key: KeyEvent) {
        let InputMode::NewTask(title) = &mut self.input_mode else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                let title = match title.trim() {
                    "" => QUICK_ADD_TITLE.to_string(),
                    trimmed => trimmed.to_string(),
                };
                self.input_mode = InputMode::Normal;
                self.create_task(title);
            }
            KeyCode::Backspace => {
                title.pop();
            }
            KeyCode::Char(c) => title.push(c),
            _ => {}
        }
    }

    fn move_column(&mut self, delta: isize) {
        let len = self.columns.len() as isize;
        if len == 0 {
            return;
        }
        self.column = (self.column as isize + delta).rem_euclid(len) as usize;
        self.card = 0;
    }

    fn move_card(&mut self, delta: isize) {
        let len = self.cards(self.focused_status()).len() as isize;
        if len == 0 {
            return;
        }
        self.card = (self.card as isize + delta).rem_euclid(len) as usize;
    }

    fn set_capacity(&mut self, capacity: i64) {
        self.capacity = capacity.max(0);
        self.plan = None;
        self.status_message = Some(format!("Capacity: {} points", self.capacity));
    }

    /// Runs the status automaton on the selected card and saves the board
    fn apply_to_selected(&mut self, action: Action) {
        let Some(task) = self.selected_task() else {
            self.status_message = Some("No task selected".to_string());
            return;
        };
        let (id, before) = (task.id.clone(), task.status);

        match self.project.board_store().apply(&id, action) {
            Ok(updated) if updated.status == before => {
                self.status_message = Some(format!("{} stays {}", updated.title, before.label()));
            }
            Ok(updated) => {
                debug!(id = %id, from = %before, to = %updated.status, "Board transition");
                self.status_message = Some(format!(
                    "{}: {} -> {}",
                    updated.title,
                    before.label(),
                    updated.status.label()
                ));
                self.reload();
            }
            Err(e) => self.status_message = Some(format!("Error: {:#}", e)),
        }
    }

    fn create_task(&mut self, title: String) {
        let task = Task::titled(title).with_points(QUICK_ADD_POINTS);

        match self.project.board_store().create(task) {
            Ok(task) => {
                self.status_message = Some(format!("Created: {} ({})", task.title, task.id));
                self.reload();
            }
            Err(e) => self.status_message = Some(format!("Error: {:#}", e)),
        }
    }

    fn assign_sprint(&mut self) {
        match assign_to_sprint(&self.tasks, self.capacity, self.now()) {
            Ok(plan) => {
                let used: i64 = self
                    .tasks
                    .iter()
                    .filter(|t| plan.is_selected(&t.id))
                    .fold(0i64, |acc, t| acc.saturating_add(t.points));
                self.status_message = Some(format!(
                    "Sprint: {} selected ({}/{} pts), {} remaining",
                    plan.selected.len(),
                    used,
                    self.capacity,
                    plan.remaining.len()
                ));
                self.plan = Some(plan);
            }
            Err(e) => self.status_message = Some(format!("Error: {}", e)),
        }
    }

    /// Reloads the board from disk
    fn reload(&mut self) {
        match self.project.board_store().read_all() {
            Ok(tasks) => {
                self.tasks = tasks;
                self.plan = None;
                let len = self.cards(self.focused_status()).len();
                if self.card >= len {
                    self.card = len.saturating_sub(1);
                }
            }
            Err(e) => self.status_message = Some(format!("Error: {:#}", e)),
        }
    }

    fn focused_status(&self) -> TaskStatus {
        self.columns
            .get(self.column)
            .copied()
            .unwrap_or_default()
    }

    // Public accessors for views

    /// Reference time for scoring
    pub fn now(&self) -> DateTime<Utc> {
        self.pinned_now.unwrap_or_else(Utc::now)
    }

    pub fn columns(&self) -> &[TaskStatus] {
        &self.columns
    }

    pub fn focused_column(&self) -> usize {
        self.column
    }

    pub fn selected_card(&self) -> usize {
        self.card
    }

    /// Cards of one column, highest priority first, ties in board order
    pub fn cards(&self, status: TaskStatus) -> Vec<(&Task, u8)> {
        let now = self.now();
        let mut cards: Vec<_> = self
            .tasks
            .iter()
            .filter(|t| t.status == status)
            .map(|t| (t, compute_priority(t, now).unwrap_or(0)))
            .collect();
        cards.sort_by(|a, b| b.1.cmp(&a.1));
        cards
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.cards(self.focused_status())
            .get(self.card)
            .map(|(task, _)| *task)
    }

    /// Progress header; `None` if the board holds an invalid task
    pub fn progress(&self) -> Option<Progress> {
        progress_summary(&self.tasks, self.now()).ok()
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn plan(&self) -> Option<&SprintPlan> {
        self.plan.as_ref()
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap()
    }

    fn demo_app(dir: &TempDir) -> App {
        let project = Project::init(dir.path(), true, now()).unwrap();
        App::new(project, Some(now())).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn input_mode_default_is_normal() {
        assert_eq!(InputMode::default(), InputMode::Normal);
    }

    #[test]
    fn columns_follow_status_order() {
        let dir = TempDir::new().unwrap();
        let app = demo_app(&dir);

        assert_eq!(app.columns(), TaskStatus::ALL);
        assert_eq!(app.cards(TaskStatus::Todo).len(), 2);
        assert_eq!(app.cards(TaskStatus::InProgress).len(), 1);
        assert_eq!(app.cards(TaskStatus::Blocked).len(), 1);
        assert_eq!(app.cards(TaskStatus::Done).len(), 1);
    }

    #[test]
    fn cards_sorted_by_priority() {
        let dir = TempDir::new().unwrap();
        let app = demo_app(&dir);

        let todo = app.cards(TaskStatus::Todo);
        assert!(todo[0].1 >= todo[1].1);
        assert_eq!(todo[0].0.title, "Feature: Boards");
    }

    #[test]
    fn navigation_wraps() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.focused_column(), 3);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.focused_column(), 0);

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_card(), 1);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected_card(), 0);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selected_card(), 1);
    }

    #[test]
    fn start_moves_card_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        let title = app.selected_task().unwrap().title.clone();
        press(&mut app, KeyCode::Char('s'));

        assert_eq!(app.cards(TaskStatus::Todo).len(), 1);
        assert_eq!(app.cards(TaskStatus::InProgress).len(), 2);

        let stored = Project::open(dir.path()).unwrap().board_store().read_all().unwrap();
        let task = stored.iter().find(|t| t.title == title).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn finish_on_done_is_absorbed() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        for _ in 0..3 {
            press(&mut app, KeyCode::Char('l'));
        }
        press(&mut app, KeyCode::Char('b'));

        assert_eq!(app.cards(TaskStatus::Done).len(), 1);
        assert!(app.status_message().unwrap().contains("stays"));
    }

    #[test]
    fn quick_add_creates_todo_task() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Write tests");
        assert_eq!(app.input_mode(), &InputMode::NewTask("Write tests".to_string()));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input_mode(), &InputMode::Normal);
        let todo = app.cards(TaskStatus::Todo);
        let added = todo.iter().find(|(t, _)| t.title == "Write tests").unwrap();
        assert_eq!(added.0.points, QUICK_ADD_POINTS);
        assert!(added.0.due.is_none());
    }

    #[test]
    fn quick_add_blank_title_uses_placeholder() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "  ");
        press(&mut app, KeyCode::Enter);

        let todo = app.cards(TaskStatus::Todo);
        assert_eq!(todo.len(), 3);
        assert!(todo.iter().any(|(t, _)| t.title == QUICK_ADD_TITLE));
    }

    #[test]
    fn quick_add_duplicate_reports_error() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Login Bug");
        press(&mut app, KeyCode::Enter);

        assert!(app.status_message().unwrap().starts_with("Error:"));
        assert_eq!(app.cards(TaskStatus::Todo).len(), 2);
    }

    #[test]
    fn escape_cancels_new_task() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "q");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.input_mode(), &InputMode::Normal);
        assert!(!app.should_quit());
    }

    #[test]
    fn capacity_never_goes_negative() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        for _ in 0..20 {
            press(&mut app, KeyCode::Char('-'));
        }
        assert_eq!(app.capacity(), 0);
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.capacity(), 1);
    }

    #[test]
    fn assign_marks_sprint() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);

        press(&mut app, KeyCode::Char('a'));
        let plan = app.plan().unwrap();
        let open = app.cards(TaskStatus::Todo).len()
            + app.cards(TaskStatus::InProgress).len()
            + app.cards(TaskStatus::Blocked).len();
        assert_eq!(plan.selected.len() + plan.remaining.len(), open);
        assert!(app.status_message().unwrap().starts_with("Sprint:"));

        // Changing capacity invalidates the plan
        press(&mut app, KeyCode::Char('+'));
        assert!(app.plan().is_none());
    }

    #[test]
    fn assign_reports_huge_point_totals() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path(), false, now()).unwrap();
        project
            .board_store()
            .write_all(&[
                Task::titled("Epic").with_points(i64::MAX),
                Task::titled("Typo").with_points(1),
            ])
            .unwrap();
        let mut app = App::new(project, Some(now())).unwrap();

        app.set_capacity(i64::MAX);
        press(&mut app, KeyCode::Char('a'));

        let plan = app.plan().unwrap();
        assert_eq!(plan.selected.len(), 1);
        assert_eq!(plan.remaining.len(), 1);
        assert!(app
            .status_message()
            .unwrap()
            .contains("(1/9223372036854775807 pts)"));
    }

    #[test]
    fn progress_header() {
        let dir = TempDir::new().unwrap();
        let app = demo_app(&dir);

        let progress = app.progress().unwrap();
        assert_eq!(progress.total, 5);
        assert_eq!(progress.done, 1);
        assert_eq!(progress.overdue, 1);
    }

    #[test]
    fn quit_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());

        let dir = TempDir::new().unwrap();
        let mut app = demo_app(&dir);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }
}
