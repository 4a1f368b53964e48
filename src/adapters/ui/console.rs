//! Implements DisplaySink as a one-line colored status on stdout.

use crate::domain::{DisplayResult, DisplayState, DomainError};
use crate::ports::DisplaySink;
use async_trait::async_trait;
use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use std::io::{Write, stdout};

pub struct ConsoleStatus;

fn color_for(state: DisplayState) -> Color {
    match state {
        DisplayState::Showing => Color::Green,
        DisplayState::NoClasses | DisplayState::NoPeriod => Color::Yellow,
        DisplayState::NotSchoolDay => Color::Blue,
        DisplayState::NoData => Color::Red,
    }
}

/// `2025-03-03 08:50 MonA P1 (current) 3 groups/12 lessons [cal=primary bells=primary lessons=fallback]`
pub fn status_line(result: &DisplayResult) -> String {
    let mut line = result.now.format("%Y-%m-%d %H:%M").to_string();
    match (&result.day_type, &result.period) {
        (Some(day_type), Some(p)) => {
            let status = if p.is_current() { "current" } else { "upcoming" };
            line.push_str(&format!(" {} {} ({})", day_type, p.code, status));
            if let Some(date) = result.date.filter(|d| *d != result.now.date()) {
                line.push_str(&format!(" for {}", date));
            }
        }
        (Some(day_type), None) => line.push_str(&format!(" {}", day_type)),
        _ => {}
    }
    line.push_str(&format!(" {:?}", result.state));
    if result.state == DisplayState::Showing {
        line.push_str(&format!(
            " {} groups/{} lessons",
            result.groups.len(),
            result.lesson_count()
        ));
    }
    line.push_str(&format!(
        " [cal={} bells={} lessons={}]",
        result.origins.calendar, result.origins.bell_schedule, result.origins.lessons
    ));
    if result.config_degraded {
        line.push_str(" (default config)");
    }
    line
}

#[async_trait]
impl DisplaySink for ConsoleStatus {
    async fn publish(&self, result: &DisplayResult) -> Result<(), DomainError> {
        let mut out = stdout();
        let line = status_line(result);
        out.execute(SetForegroundColor(color_for(result.state)))
            .and_then(|o| o.execute(Print(line)))
            .and_then(|o| o.execute(ResetColor))
            .and_then(|o| o.execute(Print("\r\n")))
            .map_err(|e| DomainError::Publish(e.to_string()))?;
        out.flush().map_err(|e| DomainError::Publish(e.to_string()))
    }
}
