use std::collections::BTreeMap;

use anyhow::Context;
use derive_more::Display;
use getset::CopyGetters;
use indexmap::IndexMap;
use strum::{EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Month names exactly as the wizard's dropdowns spell them.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    strum::Display,
    EnumString,
    EnumIter,
    FromRepr,
    IntoStaticStr,
)]
#[repr(u8)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}
impl Month {
    /// 0-based position in the calendar.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, CopyGetters)]
#[display("{month} {year}")]
#[getset(get_copy = "pub")]
pub struct MonthTarget {
    // Field order matters: the derived `Ord` compares the year first.
    year: i32,
    month: Month,
}
impl MonthTarget {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// `month` is 1-based, as humans write it.
    pub fn from_calendar(year: i32, month: u8) -> anyhow::Result<Self> {
        let month = month
            .checked_sub(1)
            .and_then(Month::from_repr)
            .with_context(|| format!("Month out of range (expected 1-12): {month}"))?;
        Ok(Self { year, month })
    }

    /// `None` past December of the last representable year.
    pub fn succ(self) -> Option<Self> {
        match Month::from_repr(self.month.index() + 1) {
            Some(month) => Some(Self { month, ..self }),
            None => Some(Self {
                year: self.year.checked_add(1)?,
                month: Month::January,
            }),
        }
    }
}

/// Inclusive range of months, yielded in chronological order.
#[derive(Clone, Debug)]
pub struct MonthRange {
    cursor: Option<MonthTarget>,
    end: MonthTarget,
}
impl MonthRange {
    pub fn new(start: MonthTarget, end: MonthTarget) -> Self {
        Self {
            cursor: Some(start),
            end,
        }
    }
}
impl Iterator for MonthRange {
    type Item = MonthTarget;

    fn next(&mut self) -> Option<MonthTarget> {
        let ret = self.cursor.filter(|&cursor| cursor <= self.end)?;
        self.cursor = ret.succ();
        Some(ret)
    }
}

#[derive(Clone, Copy, Debug, Display)]
#[display("{start} - {end}")]
pub struct DateRange {
    pub start: MonthTarget,
    pub end: MonthTarget,
}
impl DateRange {
    pub fn single(month: MonthTarget) -> Self {
        Self {
            start: month,
            end: month,
        }
    }
}

/// The hidden fields the wizard round-trips on every postback.
/// Any other hidden input on a page is ignored.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, EnumString, EnumIter, IntoStaticStr)]
pub enum StateField {
    #[strum(serialize = "__VIEWSTATE")]
    ViewState,
    #[strum(serialize = "__EVENTVALIDATION")]
    EventValidation,
    #[strum(serialize = "__VIEWSTATEGENERATOR")]
    ViewStateGenerator,
    #[strum(serialize = "__EVENTTARGET")]
    EventTarget,
    #[strum(serialize = "__EVENTARGUMENT")]
    EventArgument,
}
impl StateField {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct HiddenStateSnapshot(BTreeMap<StateField, String>);
impl HiddenStateSnapshot {
    pub fn get(&self, field: StateField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateField, &str)> {
        self.0.iter().map(|(&k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl FromIterator<(StateField, String)> for HiddenStateSnapshot {
    fn from_iter<I: IntoIterator<Item = (StateField, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Where a simulated image-button click lands.
#[derive(Clone, Copy, Debug)]
pub struct ClickAt {
    pub x: u32,
    pub y: u32,
}

/// Form payload of a single postback: the snapshot plus whatever the step overrides.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct StepRequest(IndexMap<String, String>);
impl StepRequest {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) -> &mut Self {
        self.0.shift_remove(name);
        self
    }

    /// An `<input type="image">` submits the click position instead of its value.
    pub fn click(&mut self, name: &str, at: ClickAt) -> &mut Self {
        self.set(format!("{name}.x"), at.x.to_string())
            .set(format!("{name}.y"), at.y.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn query_string(&self) -> anyhow::Result<String> {
        Ok(serde_html_form::to_string(&self.0)?)
    }
}
impl From<&HiddenStateSnapshot> for StepRequest {
    fn from(snapshot: &HiddenStateSnapshot) -> Self {
        Self(
            snapshot
                .iter()
                .map(|(field, value)| (field.name().to_owned(), value.to_owned()))
                .collect(),
        )
    }
}
