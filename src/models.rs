// Data models for the dashboard collections

use crate::record::{FieldValue, Record};
use chrono::NaiveDate;
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn optional_text(value: &Option<String>) -> Option<FieldValue> {
    value.as_deref().map(FieldValue::from)
}

// ============================================================================
// Users
// ============================================================================

/// Row of the user management table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub status: UserStatus,
    pub last_login: NaiveDate,
    pub orders: u32,
    pub location: String,
    pub join_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
}

/// Add/edit user form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub status: UserStatus,
    pub orders: u32,
    pub location: String,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            role: "User".to_string(),
            status: UserStatus::Active,
            orders: 0,
            location: String::new(),
        }
    }
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [UserStatus::Active, UserStatus::Inactive, UserStatus::Pending];

    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Pending => "Pending",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown status: {} (expected Active, Inactive or Pending)", s))
    }
}

impl Record for User {
    type Payload = UserForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn storage_key() -> &'static str {
        "users-data"
    }

    fn export_stem() -> &'static str {
        "users"
    }

    fn noun() -> &'static str {
        "user"
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "id" => FieldValue::Number(self.id as f64),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "phone" => self.phone.as_str().into(),
            "role" => self.role.as_str().into(),
            "status" => self.status.as_str().into(),
            "lastLogin" => self.last_login.into(),
            "orders" => self.orders.into(),
            "location" => self.location.as_str().into(),
            "joinDate" => self.join_date.into(),
            _ => return None,
        };
        Some(value)
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["name", "email", "role", "location"]
    }

    fn columns() -> &'static [&'static str] {
        &["id", "name", "email", "role", "status", "lastLogin", "orders", "location"]
    }

    fn default_sort() -> &'static str {
        "name"
    }

    fn from_payload(id: u64, form: UserForm, today: NaiveDate) -> Self {
        Self {
            id,
            name: form.name,
            email: form.email,
            phone: form.phone,
            role: form.role,
            status: form.status,
            last_login: today,
            orders: form.orders,
            location: form.location,
            join_date: today,
        }
    }

    fn apply(&mut self, form: UserForm, today: NaiveDate) {
        self.name = form.name;
        self.email = form.email;
        self.phone = form.phone;
        self.role = form.role;
        self.status = form.status;
        self.orders = form.orders;
        self.location = form.location;
        self.last_login = today;
    }

    fn to_payload(&self) -> UserForm {
        UserForm {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role.clone(),
            status: self.status,
            orders: self.orders,
            location: self.location.clone(),
        }
    }

    fn seed() -> Vec<Self> {
        seed_users()
    }
}

/// The five users a fresh dashboard starts with
pub fn seed_users() -> Vec<User> {
    let user = |id, name: &str, email: &str, phone: &str, role: &str, status, last_login, orders, location: &str, join_date| User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        role: role.to_string(),
        status,
        last_login,
        orders,
        location: location.to_string(),
        join_date,
    };

    vec![
        user(1, "John Doe", "john@example.com", "+1 (555) 123-4567", "Admin", UserStatus::Active, ymd(2024, 1, 15), 23, "New York, USA", ymd(2023, 6, 15)),
        user(2, "Jane Smith", "jane@example.com", "+1 (555) 234-5678", "User", UserStatus::Active, ymd(2024, 1, 14), 45, "Los Angeles, USA", ymd(2023, 8, 22)),
        user(3, "Bob Johnson", "bob@example.com", "+1 (555) 345-6789", "Manager", UserStatus::Inactive, ymd(2024, 1, 10), 12, "Chicago, USA", ymd(2023, 4, 10)),
        user(4, "Alice Brown", "alice@example.com", "+1 (555) 456-7890", "User", UserStatus::Pending, ymd(2024, 1, 16), 67, "Miami, USA", ymd(2024, 1, 1)),
        user(5, "Charlie Wilson", "charlie@example.com", "+1 (555) 567-8901", "Admin", UserStatus::Active, ymd(2024, 1, 15), 89, "Seattle, USA", ymd(2023, 2, 28)),
    ]
}

// ============================================================================
// Chart points
// ============================================================================

/// Colours handed out to new chart points
pub const CHART_PALETTE: [&str; 6] = ["#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4"];

/// One labelled value of the chart data set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub id: u64,
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPointForm {
    pub label: String,
    pub value: f64,
}

impl Record for ChartPoint {
    type Payload = ChartPointForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn storage_key() -> &'static str {
        "chart-data"
    }

    fn noun() -> &'static str {
        "data point"
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Number(self.id as f64)),
            "label" => Some(self.label.as_str().into()),
            "value" => Some(self.value.into()),
            "color" => optional_text(&self.color),
            _ => None,
        }
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["label"]
    }

    fn columns() -> &'static [&'static str] {
        &["id", "label", "value", "color"]
    }

    fn default_sort() -> &'static str {
        "id"
    }

    fn from_payload(id: u64, form: ChartPointForm, _today: NaiveDate) -> Self {
        let color = CHART_PALETTE[(id as usize) % CHART_PALETTE.len()];
        Self {
            id,
            label: form.label,
            value: form.value,
            color: Some(color.to_string()),
        }
    }

    fn apply(&mut self, form: ChartPointForm, _today: NaiveDate) {
        self.label = form.label;
        self.value = form.value;
    }

    fn to_payload(&self) -> ChartPointForm {
        ChartPointForm {
            label: self.label.clone(),
            value: self.value,
        }
    }

    /// JSON has no NaN or infinity; serde_json would write `null`
    fn validate(&self) -> Result<()> {
        if !self.value.is_finite() {
            return Err(eyre!("Data point {} has a non-finite value: {}", self.label, self.value));
        }
        Ok(())
    }

    fn seed() -> Vec<Self> {
        seed_chart_points()
    }
}

/// Monthly values shown by a fresh dashboard
pub fn seed_chart_points() -> Vec<ChartPoint> {
    [
        ("Jan", 45.0, "#3B82F6"),
        ("Feb", 52.0, "#10B981"),
        ("Mar", 48.0, "#F59E0B"),
        ("Apr", 61.0, "#EF4444"),
        ("May", 55.0, "#8B5CF6"),
        ("Jun", 67.0, "#06B6D4"),
        ("Jul", 73.0, "#84CC16"),
        ("Aug", 69.0, "#F97316"),
        ("Sep", 78.0, "#EC4899"),
        ("Oct", 84.0, "#6366F1"),
        ("Nov", 91.0, "#14B8A6"),
        ("Dec", 87.0, "#F43F5E"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (label, value, color))| ChartPoint {
        id: i as u64 + 1,
        label: label.to_string(),
        value,
        color: Some(color.to_string()),
    })
    .collect()
}

// ============================================================================
// Calendar events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Meeting,
    Event,
    Reminder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventForm {
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    /// Empty means no location
    pub location: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Meeting, EventKind::Event, EventKind::Reminder];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Meeting => "meeting",
            EventKind::Event => "event",
            EventKind::Reminder => "reminder",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown event type: {} (expected meeting, event or reminder)", s))
    }
}

impl Record for Event {
    type Payload = EventForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn storage_key() -> &'static str {
        "calendar-events"
    }

    fn noun() -> &'static str {
        "event"
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Number(self.id as f64)),
            "title" => Some(self.title.as_str().into()),
            "date" => Some(self.date.into()),
            "time" => Some(self.time.as_str().into()),
            "location" => optional_text(&self.location),
            "type" => Some(self.kind.as_str().into()),
            _ => None,
        }
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["title", "location"]
    }

    fn columns() -> &'static [&'static str] {
        &["id", "title", "date", "time", "location", "type"]
    }

    fn default_sort() -> &'static str {
        "date"
    }

    fn from_payload(id: u64, form: EventForm, _today: NaiveDate) -> Self {
        Self {
            id,
            title: form.title,
            date: form.date,
            time: form.time,
            location: Some(form.location).filter(|l| !l.is_empty()),
            kind: form.kind,
        }
    }

    fn apply(&mut self, form: EventForm, _today: NaiveDate) {
        self.title = form.title;
        self.date = form.date;
        self.time = form.time;
        self.location = Some(form.location).filter(|l| !l.is_empty());
        self.kind = form.kind;
    }

    fn to_payload(&self) -> EventForm {
        EventForm {
            title: self.title.clone(),
            date: self.date,
            time: self.time.clone(),
            location: self.location.clone().unwrap_or_default(),
            kind: self.kind,
        }
    }

    fn seed() -> Vec<Self> {
        seed_events()
    }
}

pub fn seed_events() -> Vec<Event> {
    let event = |id, title: &str, date, time: &str, location: Option<&str>, kind| Event {
        id,
        title: title.to_string(),
        date,
        time: time.to_string(),
        location: location.map(str::to_string),
        kind,
    };

    vec![
        event(1, "Team Meeting", ymd(2024, 1, 15), "10:00 AM", Some("Conference Room A"), EventKind::Meeting),
        event(2, "Project Review", ymd(2024, 1, 18), "2:00 PM", Some("Online"), EventKind::Meeting),
        event(3, "Client Presentation", ymd(2024, 1, 22), "3:30 PM", Some("Client Office"), EventKind::Event),
        event(4, "Deadline Reminder", ymd(2024, 1, 25), "9:00 AM", None, EventKind::Reminder),
    ]
}

// ============================================================================
// Kanban tasks
// ============================================================================

/// Card on the kanban board; its board column is an ordinary field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub assignee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub column: Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Todo,
    Progress,
    Review,
    Done,
}

/// Add/edit task form; tags are typed as one comma-separated string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub assignee: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub tags: String,
    pub column: Column,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            assignee: String::new(),
            due_date: None,
            priority: Priority::Medium,
            tags: String::new(),
            column: Column::Todo,
        }
    }
}

/// Split a comma-separated tag string, dropping blanks
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown priority: {} (expected low, medium or high)", s))
    }
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Todo, Column::Progress, Column::Review, Column::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Todo => "todo",
            Column::Progress => "progress",
            Column::Review => "review",
            Column::Done => "done",
        }
    }

    /// Board heading
    pub fn title(self) -> &'static str {
        match self {
            Column::Todo => "To Do",
            Column::Progress => "In Progress",
            Column::Review => "Review",
            Column::Done => "Done",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown column: {} (expected todo, progress, review or done)", s))
    }
}

impl Record for Task {
    type Payload = TaskForm;

    fn id(&self) -> u64 {
        self.id
    }

    fn storage_key() -> &'static str {
        "kanban-tasks"
    }

    fn noun() -> &'static str {
        "task"
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Number(self.id as f64)),
            "title" => Some(self.title.as_str().into()),
            "description" => Some(self.description.as_str().into()),
            "assignee" => Some(self.assignee.as_str().into()),
            "dueDate" => self.due_date.map(FieldValue::from),
            "priority" => Some(self.priority.as_str().into()),
            "tags" => Some(self.tags.join(", ").into()),
            "column" => Some(self.column.as_str().into()),
            _ => None,
        }
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["title", "description", "assignee", "tags"]
    }

    fn columns() -> &'static [&'static str] {
        &["id", "title", "assignee", "dueDate", "priority", "tags", "column"]
    }

    fn default_sort() -> &'static str {
        "id"
    }

    fn from_payload(id: u64, form: TaskForm, _today: NaiveDate) -> Self {
        Self {
            id,
            title: form.title,
            description: form.description,
            assignee: form.assignee,
            due_date: form.due_date,
            priority: form.priority,
            tags: parse_tags(&form.tags),
            column: form.column,
        }
    }

    fn apply(&mut self, form: TaskForm, _today: NaiveDate) {
        self.title = form.title;
        self.description = form.description;
        self.assignee = form.assignee;
        self.due_date = form.due_date;
        self.priority = form.priority;
        self.tags = parse_tags(&form.tags);
        self.column = form.column;
    }

    fn to_payload(&self) -> TaskForm {
        TaskForm {
            title: self.title.clone(),
            description: self.description.clone(),
            assignee: self.assignee.clone(),
            due_date: self.due_date,
            priority: self.priority,
            tags: self.tags.join(", "),
            column: self.column,
        }
    }

    fn seed() -> Vec<Self> {
        seed_tasks()
    }
}

pub fn seed_tasks() -> Vec<Task> {
    let task = |id, title: &str, description: &str, assignee: &str, due, priority, tags: [&str; 2], column| Task {
        id,
        title: title.to_string(),
        description: description.to_string(),
        assignee: assignee.to_string(),
        due_date: Some(due),
        priority,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        column,
    };

    vec![
        task(1, "Design System Update", "Update the design system with new color palette and typography", "John Doe", ymd(2024, 1, 20), Priority::High, ["Design", "UI/UX"], Column::Todo),
        task(2, "User Research", "Conduct user interviews for the new feature", "Jane Smith", ymd(2024, 1, 25), Priority::Medium, ["Research", "UX"], Column::Todo),
        task(3, "API Integration", "Integrate the new payment API with the frontend", "Bob Johnson", ymd(2024, 1, 18), Priority::High, ["Development", "Backend"], Column::Progress),
        task(4, "Security Audit", "Complete security audit for the authentication system", "Charlie Wilson", ymd(2024, 1, 16), Priority::High, ["Security", "Audit"], Column::Review),
        task(5, "Landing Page Redesign", "Complete redesign of the landing page with new branding", "Diana Davis", ymd(2024, 1, 15), Priority::Medium, ["Design", "Frontend"], Column::Done),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_matches_dashboard_shape() {
        let users = seed_users();
        let json = serde_json::to_value(&users[0]).unwrap();
        assert_eq!(json["lastLogin"], "2024-01-15");
        assert_eq!(json["joinDate"], "2023-06-15");
        assert_eq!(json["status"], "Active");
        assert_eq!(json["orders"], 23);

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back, users[0]);
    }

    #[test]
    fn test_user_add_and_edit_stamp_dates() {
        let today = ymd(2024, 3, 1);
        let mut user = User::from_payload(9, UserForm {
            name: "Dana Lee".to_string(),
            ..UserForm::default()
        }, today);
        assert_eq!(user.role, "User");
        assert_eq!(user.join_date, today);
        assert_eq!(user.last_login, today);

        let later = ymd(2024, 3, 5);
        let mut form = user.to_payload();
        form.status = UserStatus::Pending;
        user.apply(form, later);
        assert_eq!(user.status, UserStatus::Pending);
        assert_eq!(user.last_login, later);
        assert_eq!(user.join_date, today);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("active".parse::<UserStatus>().unwrap(), UserStatus::Active);
        assert_eq!("Reminder".parse::<EventKind>().unwrap(), EventKind::Reminder);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("review".parse::<Column>().unwrap(), Column::Review);
        assert!("archived".parse::<Column>().is_err());
    }

    #[test]
    fn test_chart_point_color_assignment() {
        let form = ChartPointForm {
            label: "Q1".to_string(),
            value: 10.0,
        };
        let point = ChartPoint::from_payload(13, form.clone(), ymd(2024, 1, 1));
        assert_eq!(point.color.as_deref(), Some(CHART_PALETTE[13 % 6]));

        // Editing keeps the colour
        let mut edited = point.clone();
        edited.apply(ChartPointForm { label: "Q2".to_string(), value: 12.5 }, ymd(2024, 1, 2));
        assert_eq!(edited.color, point.color);
        assert_eq!(edited.field("value"), Some(FieldValue::Number(12.5)));
    }

    #[test]
    fn test_event_location_optional() {
        let events = seed_events();
        let json = serde_json::to_string(&events[3]).unwrap();
        assert!(!json.contains("location"));
        assert!(json.contains("\"type\":\"reminder\""));

        let mut form = events[0].to_payload();
        assert_eq!(form.location, "Conference Room A");
        form.location.clear();
        let event = Event::from_payload(5, form, ymd(2024, 1, 1));
        assert!(event.location.is_none());
        assert!(event.field("location").is_none());
    }

    #[test]
    fn test_task_tags_parsing() {
        assert_eq!(parse_tags(" Design, ,UI/UX ,"), vec!["Design", "UI/UX"]);

        let task = Task::from_payload(
            6,
            TaskForm {
                title: "Write docs".to_string(),
                tags: "Docs, Writing".to_string(),
                ..TaskForm::default()
            },
            ymd(2024, 1, 1),
        );
        assert_eq!(task.tags, vec!["Docs", "Writing"]);
        assert_eq!(task.column, Column::Todo);
        assert_eq!(task.to_payload().tags, "Docs, Writing");
        assert_eq!(task.field("tags"), Some(FieldValue::text("Docs, Writing")));
    }

    #[test]
    fn test_seed_ids_are_sequential() {
        assert!(seed_users().iter().map(|r| r.id).eq(1..=5));
        assert!(seed_chart_points().iter().map(|r| r.id).eq(1..=12));
        assert!(seed_events().iter().map(|r| r.id).eq(1..=4));
        assert!(seed_tasks().iter().map(|r| r.id).eq(1..=5));
    }
}
