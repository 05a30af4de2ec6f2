//! Date operators

use crate::expression::{doc, Expression, Repr};

use super::errors::{OperatorError, OperatorResult};

/// A calendar component extractable from a date expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateComponent {
    Year,
    Month,
    DayOfMonth,
    DayOfWeek,
    DayOfYear,
    Hour,
    Minute,
    Second,
    Millisecond,
    Week,
}

impl DateComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateComponent::Year => "$year",
            DateComponent::Month => "$month",
            DateComponent::DayOfMonth => "$dayOfMonth",
            DateComponent::DayOfWeek => "$dayOfWeek",
            DateComponent::DayOfYear => "$dayOfYear",
            DateComponent::Hour => "$hour",
            DateComponent::Minute => "$minute",
            DateComponent::Second => "$second",
            DateComponent::Millisecond => "$millisecond",
            DateComponent::Week => "$week",
        }
    }
}

/// Extracts one component of a date, optionally in a timezone.
///
/// Without a timezone the body is the date expression itself; with one it
/// is `{"date": x, "timezone": tz}`.
#[derive(Debug, Clone)]
pub struct DatePart {
    component: DateComponent,
    date: Repr,
    timezone: Option<String>,
}

impl DatePart {
    pub fn new(component: DateComponent, date: impl Into<Repr>) -> Self {
        Self {
            component,
            date: date.into(),
            timezone: None,
        }
    }

    pub fn in_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

impl Expression for DatePart {
    fn to_representation(&self) -> Repr {
        let body = match &self.timezone {
            Some(tz) => doc([
                ("date", self.date.clone()),
                ("timezone", Repr::literal(tz.as_str())),
            ]),
            None => self.date.clone(),
        };
        Repr::keyed(self.component.as_str(), body)
    }
}

/// Formats a date as a string
#[derive(Debug, Clone)]
pub struct DateToString {
    format: String,
    date: Repr,
    timezone: Option<String>,
}

impl DateToString {
    pub fn new(format: impl Into<String>, date: impl Into<Repr>) -> Self {
        Self {
            format: format.into(),
            date: date.into(),
            timezone: None,
        }
    }

    pub fn in_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

impl Expression for DateToString {
    fn to_representation(&self) -> Repr {
        let mut entries = vec![
            ("format", Repr::literal(self.format.as_str())),
            ("date", self.date.clone()),
        ];
        if let Some(tz) = &self.timezone {
            entries.push(("timezone", Repr::literal(tz.as_str())));
        }
        Repr::keyed("$dateToString", doc(entries))
    }
}

/// Turns a `YYYY-MM-DD` string expression into a date at a fixed UTC hour
#[derive(Debug, Clone)]
pub struct DateAlign {
    day: Repr,
    hour: u8,
}

impl DateAlign {
    /// Fails if `hour` is not in 0..=23
    pub fn new(day: impl Into<Repr>, hour: u8) -> OperatorResult<Self> {
        if hour > 23 {
            return Err(OperatorError::invalid_argument(
                "$toDate",
                format!("hour must be within 0..=23, got {}", hour),
            ));
        }
        Ok(Self {
            day: day.into(),
            hour,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }
}

impl Expression for DateAlign {
    fn to_representation(&self) -> Repr {
        let suffix = format!("T{:02}:00:00.000Z", self.hour);
        Repr::keyed(
            "$toDate",
            Repr::keyed(
                "$concat",
                Repr::Array(vec![self.day.clone(), Repr::literal(suffix)]),
            ),
        )
    }
}

impl_into_repr!(DatePart, DateToString, DateAlign);
