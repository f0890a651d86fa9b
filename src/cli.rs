// Command-line front end over the record tables

use crate::config::{Backend, Config};
use crate::export::{self, CsvRow, ExportFormat};
use crate::filter::Filter;
use crate::kv::KeyValueStore;
use crate::models::{
    ChartPoint, ChartPointForm, Column, Event, EventForm, EventKind, Priority, Task, TaskForm, User, UserForm,
    UserStatus,
};
use crate::overview;
use crate::query::{self, Sort, SortDirection};
use crate::record::{FieldValue, Record};
use crate::store::Store;
use crate::table::{Confirm, FormOutcome, Table};
use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use comfy_table::{Cell, Color};
use eyre::{Context, Result, eyre};
use std::fs;
use std::path::PathBuf;
use tracing::{Level, debug, warn};

type CliTable<T> = Table<T, Box<dyn KeyValueStore>>;

#[derive(Parser)]
#[command(name = "dashstore")]
#[command(about = "Dashboard record tables - users, chart data, calendar events and kanban tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
pub struct Cli {
    /// Config file (default: $DASHSTORE_CONFIG, then the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the collections
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend: files or sqlite
    #[arg(long, global = true)]
    pub backend: Option<Backend>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// User management table
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Monthly chart data points
    Charts {
        #[command(subcommand)]
        action: ChartAction,
    },

    /// Calendar events
    Events {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Kanban board tasks
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Summary metrics across every collection
    Overview {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Actions every collection supports
#[derive(Subcommand)]
pub enum CommonAction {
    /// List one page of records
    List(ListArgs),

    /// Show every field of one record
    Show { id: u64 },

    /// Delete one record
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Select several records and delete them together
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<u64>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the matching records
    Export {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Output file, `-` for stdout (default: users.csv etc. in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct QueryArgs {
    /// Case-insensitive search over the searchable columns
    #[arg(short, long)]
    pub search: Option<String>,

    /// Exact match on a field, e.g. status=Active (repeatable)
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Field to sort by (default: the collection's natural order)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Subcommand)]
pub enum UserAction {
    /// Add a user
    Add(UserArgs),

    /// Edit a user; omitted fields keep their current value
    Update {
        id: u64,
        #[command(flatten)]
        changes: UserChanges,
    },

    #[command(flatten)]
    Common(CommonAction),
}

#[derive(Args)]
pub struct UserArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "User")]
    pub role: String,
    #[arg(long, default_value = "Active")]
    pub status: UserStatus,
    #[arg(long, default_value_t = 0)]
    pub orders: u32,
    #[arg(long, default_value = "")]
    pub location: String,
}

impl From<UserArgs> for UserForm {
    fn from(args: UserArgs) -> Self {
        UserForm {
            name: args.name,
            email: args.email,
            phone: args.phone,
            role: args.role,
            status: args.status,
            orders: args.orders,
            location: args.location,
        }
    }
}

#[derive(Args)]
pub struct UserChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub status: Option<UserStatus>,
    #[arg(long)]
    pub orders: Option<u32>,
    #[arg(long)]
    pub location: Option<String>,
}

impl UserChanges {
    fn apply(self, form: &mut UserForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(email) = self.email {
            form.email = email;
        }
        if let Some(phone) = self.phone {
            form.phone = phone;
        }
        if let Some(role) = self.role {
            form.role = role;
        }
        if let Some(status) = self.status {
            form.status = status;
        }
        if let Some(orders) = self.orders {
            form.orders = orders;
        }
        if let Some(location) = self.location {
            form.location = location;
        }
    }
}

// ============================================================================
// Chart data
// ============================================================================

#[derive(Subcommand)]
pub enum ChartAction {
    /// Add a data point
    Add {
        #[arg(long)]
        label: String,
        #[arg(long, value_parser = finite_number, allow_negative_numbers = true)]
        value: f64,
    },

    /// Edit a data point
    Update {
        id: u64,
        #[arg(long)]
        label: Option<String>,
        #[arg(long, value_parser = finite_number, allow_negative_numbers = true)]
        value: Option<f64>,
    },

    #[command(flatten)]
    Common(CommonAction),
}

/// Chart values must survive a JSON round trip, which rules out NaN and infinity
fn finite_number(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{} is not a finite number", raw))
    }
}

// ============================================================================
// Calendar events
// ============================================================================

#[derive(Subcommand)]
pub enum EventAction {
    /// Add an event
    Add(EventArgs),

    /// Edit an event; omitted fields keep their current value
    Update {
        id: u64,
        #[command(flatten)]
        changes: EventChanges,
    },

    #[command(flatten)]
    Common(CommonAction),
}

#[derive(Args)]
pub struct EventArgs {
    #[arg(long)]
    pub title: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: NaiveDate,
    /// Free text, e.g. "10:00 AM"
    #[arg(long)]
    pub time: String,
    #[arg(long, default_value = "")]
    pub location: String,
    #[arg(long = "type", default_value = "meeting")]
    pub kind: EventKind,
}

impl From<EventArgs> for EventForm {
    fn from(args: EventArgs) -> Self {
        EventForm {
            title: args.title,
            date: args.date,
            time: args.time,
            location: args.location,
            kind: args.kind,
        }
    }
}

#[derive(Args)]
pub struct EventChanges {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub time: Option<String>,
    /// An empty string clears the location
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long = "type")]
    pub kind: Option<EventKind>,
}

impl EventChanges {
    fn apply(self, form: &mut EventForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(date) = self.date {
            form.date = date;
        }
        if let Some(time) = self.time {
            form.time = time;
        }
        if let Some(location) = self.location {
            form.location = location;
        }
        if let Some(kind) = self.kind {
            form.kind = kind;
        }
    }
}

// ============================================================================
// Kanban tasks
// ============================================================================

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task card
    Add(TaskArgs),

    /// Edit a task; omitted fields keep their current value
    Update {
        id: u64,
        #[command(flatten)]
        changes: TaskChanges,
    },

    /// Move a card to another column (todo, progress, review, done)
    Move { id: u64, column: Column },

    /// Print the board one column at a time
    Board,

    #[command(flatten)]
    Common(CommonAction),
}

#[derive(Args)]
pub struct TaskArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub assignee: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub due: Option<NaiveDate>,
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    /// Comma-separated
    #[arg(long, default_value = "")]
    pub tags: String,
    #[arg(long, default_value = "todo")]
    pub column: Column,
}

impl From<TaskArgs> for TaskForm {
    fn from(args: TaskArgs) -> Self {
        TaskForm {
            title: args.title,
            description: args.description,
            assignee: args.assignee,
            due_date: args.due,
            priority: args.priority,
            tags: args.tags,
            column: args.column,
        }
    }
}

#[derive(Args)]
pub struct TaskChanges {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub due: Option<NaiveDate>,
    /// Remove the due date
    #[arg(long, conflicts_with = "due")]
    pub no_due: bool,
    #[arg(long)]
    pub priority: Option<Priority>,
    /// Comma-separated; replaces the current tags
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long)]
    pub column: Option<Column>,
}

impl TaskChanges {
    fn apply(self, form: &mut TaskForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(assignee) = self.assignee {
            form.assignee = assignee;
        }
        if self.no_due {
            form.due_date = None;
        } else if let Some(due) = self.due {
            form.due_date = Some(due);
        }
        if let Some(priority) = self.priority {
            form.priority = priority;
        }
        if let Some(tags) = self.tags {
            form.tags = tags;
        }
        if let Some(column) = self.column {
            form.column = column;
        }
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Confirmation backed by a terminal prompt, or auto-approved with `--yes`
struct Prompt {
    assume_yes: bool,
}

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let answer = dialoguer::Confirm::new().with_prompt(prompt).default(false).interact();
        answer_or_decline(answer)
    }
}

/// A prompt that could not be shown counts as "no", with a hint about `--yes`
fn answer_or_decline(answer: dialoguer::Result<bool>) -> bool {
    match answer {
        Ok(confirmed) => confirmed,
        Err(e) => {
            warn!(error = %e, "Confirmation prompt failed");
            eprintln!(
                "{}",
                format!("Could not ask for confirmation ({}); pass --yes to skip the prompt", e).yellow()
            );
            false
        }
    }
}

/// Max log level: each `-v` raises it, otherwise the configured level
pub fn log_level(verbose: u8, config: &Config) -> Result<Level> {
    Ok(match verbose {
        0 => config.level()?,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    })
}

/// Load the config file and apply command-line overrides
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    Ok(config)
}

pub fn run(cli: Cli, config: &Config) -> Result<()> {
    debug!(backend = ?config.backend, data_dir = ?config.data_dir, "Running command");

    match cli.command {
        Commands::Users { action } => {
            let mut table = open_table::<User>(config)?;
            match action {
                UserAction::Add(args) => add(&mut table, args.into()),
                UserAction::Update { id, changes } => update(&mut table, id, |form| changes.apply(form)),
                UserAction::Common(common) => run_common(&mut table, common),
            }
        }
        Commands::Charts { action } => {
            let mut table = open_table::<ChartPoint>(config)?;
            match action {
                ChartAction::Add { label, value } => add(&mut table, ChartPointForm { label, value }),
                ChartAction::Update { id, label, value } => update(&mut table, id, |form| {
                    if let Some(label) = label {
                        form.label = label;
                    }
                    if let Some(value) = value {
                        form.value = value;
                    }
                }),
                ChartAction::Common(common) => run_common(&mut table, common),
            }
        }
        Commands::Events { action } => {
            let mut table = open_table::<Event>(config)?;
            match action {
                EventAction::Add(args) => add(&mut table, args.into()),
                EventAction::Update { id, changes } => update(&mut table, id, |form| changes.apply(form)),
                EventAction::Common(common) => run_common(&mut table, common),
            }
        }
        Commands::Tasks { action } => {
            let mut table = open_table::<Task>(config)?;
            match action {
                TaskAction::Add(args) => add(&mut table, args.into()),
                TaskAction::Update { id, changes } => update(&mut table, id, |form| changes.apply(form)),
                TaskAction::Move { id, column } => {
                    if table.move_task(id, column)? {
                        println!("{} task {} to {}", "Moved".green(), id, column.title());
                    } else {
                        println!("{}", not_found::<Task>(id));
                    }
                    Ok(())
                }
                TaskAction::Board => {
                    print_board(&table);
                    Ok(())
                }
                TaskAction::Common(common) => run_common(&mut table, common),
            }
        }
        Commands::Overview { json } => print_overview(config, json),
    }
}

fn open_table<T: Record>(config: &Config) -> Result<CliTable<T>> {
    let store = Store::open(config.open_kv()?)?;
    Ok(Table::new(store))
}

fn not_found<T: Record>(id: u64) -> String {
    format!("no {} with id {}", T::noun(), id).yellow().to_string()
}

fn add<T: Record>(table: &mut CliTable<T>, payload: T::Payload) -> Result<()> {
    table.begin_add();
    match table.finish(FormOutcome::Submit(payload))? {
        Some(id) => println!("{} {} {}", "Added".green(), T::noun(), id),
        None => println!("{}", format!("{} was not added", T::noun()).yellow()),
    }
    Ok(())
}

fn update<T: Record>(table: &mut CliTable<T>, id: u64, edit: impl FnOnce(&mut T::Payload)) -> Result<()> {
    let Some(mut payload) = table.begin_edit(id) else {
        println!("{}", not_found::<T>(id));
        return Ok(());
    };
    edit(&mut payload);
    match table.finish(FormOutcome::Submit(payload))? {
        Some(id) => println!("{} {} {}", "Updated".green(), T::noun(), id),
        None => println!("{}", not_found::<T>(id)),
    }
    Ok(())
}

/// Apply search, filters and sort from the command line
fn apply_query<T: Record>(table: &mut CliTable<T>, args: QueryArgs) -> Result<()> {
    if let Some(search) = args.search {
        table.set_search(search);
    }
    for raw in &args.filters {
        table.set_filter(Filter::parse(raw)?);
    }
    match (args.sort, args.desc) {
        (Some(field), false) => table.set_sort(Sort::ascending(field)),
        (Some(field), true) => table.set_sort(Sort::descending(field)),
        (None, true) => table.set_sort(Sort::descending(T::default_sort())),
        (None, false) => {}
    }
    Ok(())
}

fn run_common<T: Record + CsvRow>(table: &mut CliTable<T>, action: CommonAction) -> Result<()> {
    match action {
        CommonAction::List(args) => {
            apply_query(table, args.query)?;
            table.go_to_page(args.page);
            if args.json {
                let view = table.view();
                println!("{}", serde_json::to_string_pretty(&view.items)?);
            } else {
                print_page(table);
            }
        }
        CommonAction::Show { id } => match table.store().get(id) {
            Some(record) => println!("{}", render_record(record)?),
            None => println!("{}", not_found::<T>(id)),
        },
        CommonAction::Delete { id, yes } => {
            if table.store().get(id).is_none() {
                println!("{}", not_found::<T>(id));
            } else if table.delete(id, &Prompt { assume_yes: yes })? {
                println!("{} {} {}", "Deleted".green(), T::noun(), id);
            } else {
                println!("Delete cancelled");
            }
        }
        CommonAction::BulkDelete { ids, yes } => {
            for id in ids {
                if table.store().get(id).is_none() {
                    println!("{}", not_found::<T>(id));
                } else if !table.selection().contains(id) {
                    table.toggle_selected(id);
                }
            }
            if table.selection().is_empty() {
                return Ok(());
            }
            let removed = table.bulk_delete(&Prompt { assume_yes: yes })?;
            if removed == 0 {
                println!("Delete cancelled");
            } else {
                let noun = if removed == 1 { T::noun().to_string() } else { T::plural() };
                println!("{} {} {}", "Deleted".green(), removed, noun);
            }
        }
        CommonAction::Export { query, format, output } => {
            apply_query(table, query)?;
            let rows = table.matching();
            let content = match format {
                ExportFormat::Csv => export::to_csv(rows.iter().copied()),
                ExportFormat::Json => export::to_json(rows.iter().copied(), Utc::now())?,
            };
            let path = output.unwrap_or_else(|| PathBuf::from(export::file_name::<T>(format)));
            if path.as_os_str() == "-" {
                print!("{}", content);
            } else {
                fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
                println!("{} {} rows to {}", "Exported".green(), rows.len(), path.display());
            }
        }
    }
    Ok(())
}

// ============================================================================
// Rendering
// ============================================================================

/// Colour for enum-like cells: user status, task priority, event type
fn cell_color(field: &str, value: &str) -> Option<Color> {
    match (field, value) {
        ("status", "Active") | ("priority", "low") => Some(Color::Green),
        ("status", "Inactive") | ("priority", "high") => Some(Color::Red),
        ("status", "Pending") | ("priority", "medium") => Some(Color::Yellow),
        ("type", "meeting") => Some(Color::Blue),
        ("type", "event") => Some(Color::Magenta),
        ("type", "reminder") => Some(Color::Cyan),
        _ => None,
    }
}

fn render_cell(field: &str, value: Option<FieldValue>) -> Cell {
    let text = value.map(|v| v.to_string()).unwrap_or_default();
    let color = cell_color(field, &text);
    let cell = Cell::new(text);
    match color {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

/// Page of records as a table, one column per display column
pub fn render_rows<T: Record>(rows: &[&T]) -> comfy_table::Table {
    let mut out = comfy_table::Table::new();
    out.load_preset(comfy_table::presets::UTF8_FULL);
    out.set_header(T::columns().to_vec());
    for record in rows {
        out.add_row(
            T::columns()
                .iter()
                .map(|column| render_cell(column, record.field(column)))
                .collect::<Vec<_>>(),
        );
    }
    out
}

/// Field/value table for a single record
fn render_record<T: Record>(record: &T) -> Result<comfy_table::Table> {
    let value = serde_json::to_value(record)?;
    let fields = value
        .as_object()
        .ok_or_else(|| eyre!("{} did not serialize to an object", T::noun()))?;

    let mut out = comfy_table::Table::new();
    out.load_preset(comfy_table::presets::UTF8_BORDERS_ONLY);
    out.set_header(vec!["Field", "Value"]);
    for (name, value) in fields {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        out.add_row(vec![Cell::new(name), render_cell(name, Some(FieldValue::Text(text)))]);
    }
    Ok(out)
}

/// "« 1 2 [3] 4 5 »" style pager line
pub fn render_pager(page: usize, total_pages: usize) -> String {
    query::page_window(page, total_pages)
        .into_iter()
        .map(|p| if p == page { format!("[{}]", p) } else { p.to_string() })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_page<T: Record>(table: &CliTable<T>) {
    let view = table.view();
    if view.items.is_empty() {
        println!("{}", format!("No {} found", T::plural()).dimmed());
    } else {
        println!("{}", render_rows(&view.items));
    }

    let query = table.query();
    let arrow = match query.sort.direction {
        SortDirection::Ascending => "asc",
        SortDirection::Descending => "desc",
    };
    println!("{}", view.summary());
    println!(
        "Page {} of {}  {}  (sorted by {} {})",
        view.page,
        view.total_pages().max(1),
        render_pager(view.page, view.total_pages()),
        query.sort.field,
        arrow
    );
}

fn print_board(table: &CliTable<Task>) {
    for column in Column::ALL {
        let cards = table.board_column(column);
        println!("{} ({})", column.title().bold(), cards.len());
        if cards.is_empty() {
            println!("  {}", "-".dimmed());
        }
        for task in cards {
            let due = task.due_date.map(|d| format!(" due {}", d)).unwrap_or_default();
            println!("  #{} {} [{}] {}{}", task.id, task.title, task.priority, task.assignee, due);
        }
    }
}

fn print_overview(config: &Config, json: bool) -> Result<()> {
    let users = open_table::<User>(config)?;
    let points = open_table::<ChartPoint>(config)?;
    let events = open_table::<Event>(config)?;
    let tasks = open_table::<Task>(config)?;

    let overview = overview::compute(
        users.store().records(),
        points.store().records(),
        events.store().records(),
        tasks.store().records(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!("{}", "Users".bold());
    println!("  total: {}  orders: {}", overview.users.total, overview.users.total_orders);
    for (status, count) in &overview.users.by_status {
        println!("  {}: {}", status, count);
    }

    println!("{}", "Chart".bold());
    match (overview.chart.min, overview.chart.max, overview.chart.average) {
        (Some(min), Some(max), Some(average)) => println!(
            "  points: {}  min: {}  max: {}  average: {:.1}",
            overview.chart.points, min, max, average
        ),
        _ => println!("  no data points"),
    }

    println!("{}", "Events".bold());
    for (kind, count) in &overview.events {
        println!("  {}: {}", kind, count);
    }

    println!("{}", "Tasks".bold());
    for (column, count) in &overview.tasks {
        println!("  {}: {}", column, count);
    }
    for (priority, count) in &overview.priorities {
        println!("  {} priority: {}", priority, count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_users;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dashstore").chain(args.iter().copied())).unwrap()
    }

    fn temp_config(temp: &TempDir) -> Config {
        Config {
            data_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        }
    }

    fn stored_users(config: &Config) -> Vec<User> {
        open_table::<User>(config).unwrap().store().records().to_vec()
    }

    #[test]
    fn test_parse_list_with_filters() {
        let cli = parse(&["users", "list", "--search", "john", "-f", "status=Active", "--sort", "orders", "--desc"]);
        let Commands::Users {
            action: UserAction::Common(CommonAction::List(args)),
        } = cli.command
        else {
            panic!("expected users list");
        };
        assert_eq!(args.query.search.as_deref(), Some("john"));
        assert_eq!(args.query.filters, vec!["status=Active"]);
        assert!(args.query.desc);
        assert_eq!(args.page, 1);
    }

    #[test]
    fn test_global_overrides() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yml");
        fs::write(&config_path, "backend: files\nlog_level: error\n").unwrap();

        let data = temp.path().join("data");
        let cli = parse(&[
            "overview",
            "--config",
            config_path.to_str().unwrap(),
            "--data-dir",
            data.to_str().unwrap(),
            "--backend",
            "sqlite",
            "-vv",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.data_dir, Some(data));
        assert_eq!(log_level(cli.verbose, &config).unwrap(), Level::DEBUG);
        assert_eq!(log_level(0, &config).unwrap(), Level::ERROR);
    }

    #[test]
    fn test_add_update_delete_users() {
        let temp = TempDir::new().unwrap();
        let config = temp_config(&temp);

        let cli = parse(&["users", "add", "--name", "Ann Lee", "--email", "ann@example.com"]);
        run(cli, &config).unwrap();
        let users = stored_users(&config);
        assert_eq!(users.len(), 6);
        assert_eq!(users[5].id, 6);
        assert_eq!(users[5].role, "User");

        let cli = parse(&["users", "update", "6", "--role", "Admin"]);
        run(cli, &config).unwrap();
        let ann = stored_users(&config).into_iter().find(|u| u.id == 6).unwrap();
        assert_eq!(ann.role, "Admin");
        assert_eq!(ann.email, "ann@example.com");

        let cli = parse(&["users", "delete", "3", "--yes"]);
        run(cli, &config).unwrap();
        let ids: Vec<u64> = stored_users(&config).iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 5, 6]);
    }

    #[test]
    fn test_update_missing_id_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let config = temp_config(&temp);

        run(parse(&["users", "update", "99", "--name", "Ghost"]), &config).unwrap();
        run(parse(&["users", "delete", "99", "--yes"]), &config).unwrap();
        assert_eq!(stored_users(&config), seed_users());
    }

    #[test]
    fn test_bulk_delete_skips_unknown_ids() {
        let temp = TempDir::new().unwrap();
        let config = temp_config(&temp);

        run(parse(&["users", "bulk-delete", "1", "2", "42", "--yes"]), &config).unwrap();
        let ids: Vec<u64> = stored_users(&config).iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn test_move_task() {
        let temp = TempDir::new().unwrap();
        let config = temp_config(&temp);

        run(parse(&["tasks", "move", "1", "done"]), &config).unwrap();
        let tasks = open_table::<Task>(&config).unwrap();
        assert_eq!(tasks.store().get(1).unwrap().column, Column::Done);
    }

    #[test]
    fn test_export_to_file() {
        let temp = TempDir::new().unwrap();
        let config = temp_config(&temp);
        let out = temp.path().join("active.csv");

        let cli = parse(&["users", "export", "-f", "status=Active", "--output", out.to_str().unwrap()]);
        run(cli, &config).unwrap();

        let csv = fs::read_to_string(&out).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.starts_with("Name,Email,"));
    }

    #[test]
    fn test_bad_filter_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config = temp_config(&temp);
        assert!(run(parse(&["users", "list", "-f", "status"]), &config).is_err());
    }

    #[test]
    fn test_chart_value_must_be_finite() {
        for bad in ["NaN", "inf", "-inf", "abc"] {
            let args = ["dashstore", "charts", "add", "--label", "X", "--value", bad];
            assert!(Cli::try_parse_from(args).is_err(), "accepted {}", bad);
        }
        assert!(Cli::try_parse_from(["dashstore", "charts", "update", "3", "--value", "NaN"]).is_err());

        let temp = TempDir::new().unwrap();
        let config = temp_config(&temp);
        run(parse(&["charts", "add", "--label", "Dip", "--value", "-2.5"]), &config).unwrap();
        let points = open_table::<ChartPoint>(&config).unwrap();
        assert_eq!(points.store().len(), 13);
        assert_eq!(points.store().get(13).unwrap().value, -2.5);
    }

    #[test]
    fn test_failed_prompt_declines() {
        let err = dialoguer::Error::IO(std::io::Error::new(std::io::ErrorKind::NotConnected, "not a terminal"));
        assert!(!answer_or_decline(Err(err)));
        assert!(answer_or_decline(Ok(true)));
        assert!(!answer_or_decline(Ok(false)));
    }

    #[test]
    fn test_render_pager() {
        assert_eq!(render_pager(1, 3), "[1] 2 3");
        assert_eq!(render_pager(6, 12), "4 5 [6] 7 8");
        assert_eq!(render_pager(1, 0), "");
    }

    #[test]
    fn test_render_rows_has_columns() {
        let users = seed_users();
        let rows: Vec<&User> = users.iter().take(2).collect();
        let rendered = render_rows(&rows).to_string();
        assert!(rendered.contains("lastLogin"));
        assert!(rendered.contains("John Doe"));
        assert!(!rendered.contains("Bob Johnson"));
    }
}
