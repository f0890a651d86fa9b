// Dashboard overview metrics computed from the stored collections

use crate::models::{ChartPoint, Column, Event, EventKind, Priority, Task, User, UserStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub users: UserStats,
    pub chart: ChartStats,
    pub events: Vec<(String, usize)>,
    pub tasks: Vec<(String, usize)>,
    pub priorities: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: usize,
    pub by_status: Vec<(String, usize)>,
    pub total_orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStats {
    pub points: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
}

pub fn user_stats(users: &[User]) -> UserStats {
    UserStats {
        total: users.len(),
        by_status: UserStatus::ALL
            .into_iter()
            .map(|status| {
                let count = users.iter().filter(|u| u.status == status).count();
                (status.to_string(), count)
            })
            .collect(),
        total_orders: users.iter().map(|u| u64::from(u.orders)).sum(),
    }
}

pub fn chart_stats(points: &[ChartPoint]) -> ChartStats {
    let values = points.iter().map(|p| p.value);
    let min = values.clone().reduce(f64::min);
    let max = values.clone().reduce(f64::max);
    let average = (!points.is_empty()).then(|| values.sum::<f64>() / points.len() as f64);
    ChartStats {
        points: points.len(),
        min,
        max,
        average,
    }
}

pub fn event_counts(events: &[Event]) -> Vec<(String, usize)> {
    EventKind::ALL
        .into_iter()
        .map(|kind| (kind.to_string(), events.iter().filter(|e| e.kind == kind).count()))
        .collect()
}

/// Cards per board column, in board order
pub fn task_counts(tasks: &[Task]) -> Vec<(String, usize)> {
    Column::ALL
        .into_iter()
        .map(|column| (column.title().to_string(), tasks.iter().filter(|t| t.column == column).count()))
        .collect()
}

/// Tasks per priority across the whole board
pub fn priority_counts(tasks: &[Task]) -> Vec<(String, usize)> {
    Priority::ALL
        .into_iter()
        .map(|priority| (priority.to_string(), tasks.iter().filter(|t| t.priority == priority).count()))
        .collect()
}

pub fn compute(users: &[User], points: &[ChartPoint], events: &[Event], tasks: &[Task]) -> Overview {
    Overview {
        users: user_stats(users),
        chart: chart_stats(points),
        events: event_counts(events),
        tasks: task_counts(tasks),
        priorities: priority_counts(tasks),
    }
}
