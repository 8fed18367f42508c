use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::dates::{days_between, shift_days};

/// Granularity of the lower header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeScale {
    #[default]
    Day,
    Week,
    Month,
}

impl TimeScale {
    pub const ALL: [TimeScale; 3] = [TimeScale::Day, TimeScale::Week, TimeScale::Month];

    pub fn label(self) -> &'static str {
        match self {
            TimeScale::Day => "Day",
            TimeScale::Week => "Week",
            TimeScale::Month => "Month",
        }
    }
}

/// Manual bounds that replace the auto-computed range. Each end is
/// independent; `None` keeps the automatic value for that end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeOverride {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RangeOverride {
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// One header cell, clipped to the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
    pub span_days: i64,
    pub label: String,
    /// Small secondary line (weekday, year, ...).
    pub caption: String,
}

/// The date axis of the chart: an inclusive `[min, max]` day range and the
/// mapping between dates, percentages and pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAxis {
    min: NaiveDate,
    max: NaiveDate,
    total_days: i64,
}

impl TimeAxis {
    /// Build the axis from task spans and an optional override.
    ///
    /// With no spans and no override the axis is the single day `today`.
    pub fn compute<I>(spans: I, range: RangeOverride, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
    {
        let mut auto: Option<(NaiveDate, NaiveDate)> = None;
        for (a, b) in spans {
            let (start, end) = (a.min(b), a.max(b));
            auto = Some(match auto {
                None => (start, end),
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
            });
        }
        let (auto_min, auto_max) = auto.unwrap_or((today, today));
        let min = range.start.unwrap_or(auto_min);
        let max = range.end.unwrap_or(auto_max);
        Self::new(min, max)
    }

    /// An inverted range collapses to the single day `min`.
    pub fn new(min: NaiveDate, max: NaiveDate) -> Self {
        let max = if max < min {
            tracing::debug!(%min, %max, "inverted axis range, collapsing to one day");
            min
        } else {
            max
        };
        Self {
            min,
            max,
            total_days: (days_between(min, max) + 1).max(1),
        }
    }

    pub fn min(&self) -> NaiveDate {
        self.min
    }

    pub fn max(&self) -> NaiveDate {
        self.max
    }

    pub fn total_days(&self) -> i64 {
        self.total_days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }

    pub fn left_percent(&self, date: NaiveDate) -> f32 {
        days_between(self.min, date) as f32 / self.total_days as f32 * 100.0
    }

    /// Both ends inclusive; never narrower than one day.
    pub fn width_percent(&self, start: NaiveDate, end: NaiveDate) -> f32 {
        let days = (days_between(start, end) + 1).max(1);
        days as f32 / self.total_days as f32 * 100.0
    }

    /// Convert a date to an x-pixel offset from the axis start.
    pub fn date_to_x(&self, date: NaiveDate, day_width: f32) -> f32 {
        days_between(self.min, date) as f32 * day_width
    }

    /// Convert an x-pixel offset back to the day under it.
    pub fn x_to_date(&self, x: f32, day_width: f32) -> NaiveDate {
        if day_width <= 0.0 || !day_width.is_finite() || !x.is_finite() {
            return self.min;
        }
        shift_days(self.min, (x / day_width).floor() as i64)
    }

    /// Total width in pixels for the whole axis.
    pub fn total_width(&self, day_width: f32) -> f32 {
        self.total_days as f32 * day_width
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.min.iter_days().take(self.total_days as usize).collect()
    }

    /// Mondays, starting with the one on or before `min`.
    pub fn week_starts(&self) -> Vec<NaiveDate> {
        let back = self.min.weekday().num_days_from_monday() as i64;
        let mut date = shift_days(self.min, -back);
        let mut out = Vec::new();
        while date <= self.max {
            out.push(date);
            let next = shift_days(date, 7);
            if next == date {
                break;
            }
            date = next;
        }
        out
    }

    /// First days of months, starting with the month containing `min`.
    pub fn month_starts(&self) -> Vec<NaiveDate> {
        let mut date = first_of_month(self.min);
        let mut out = Vec::new();
        while date <= self.max {
            out.push(date);
            match next_month(date) {
                Some(next) => date = next,
                None => break,
            }
        }
        out
    }

    /// Contiguous header cells for `scale`, clipped to the axis so that the
    /// spans add up to `total_days`.
    pub fn header_cells(&self, scale: TimeScale) -> Vec<HeaderCell> {
        match scale {
            TimeScale::Day => self
                .days()
                .into_iter()
                .map(|d| HeaderCell {
                    start: d,
                    end: d,
                    span_days: 1,
                    label: d.format("%-d").to_string(),
                    caption: d.format("%a").to_string(),
                })
                .collect(),
            TimeScale::Week => self.clip_cells(self.week_starts(), |start, _| {
                (start.format("%-d %b %Y").to_string(), "Mon".to_string())
            }),
            TimeScale::Month => self.clip_cells(self.month_starts(), |start, _| {
                (start.format("%b %Y").to_string(), start.format("%Y").to_string())
            }),
        }
    }

    /// Top header row: one cell per month.
    pub fn month_cells(&self) -> Vec<HeaderCell> {
        self.clip_cells(self.month_starts(), |start, _| {
            (start.format("%B %Y").to_string(), String::new())
        })
    }

    fn clip_cells(
        &self,
        boundaries: Vec<NaiveDate>,
        label: impl Fn(NaiveDate, NaiveDate) -> (String, String),
    ) -> Vec<HeaderCell> {
        let mut cells = Vec::with_capacity(boundaries.len());
        for (i, boundary) in boundaries.iter().enumerate() {
            let period_end = boundaries
                .get(i + 1)
                .map(|next| shift_days(*next, -1))
                .unwrap_or(self.max);
            let start = (*boundary).max(self.min);
            let end = period_end.min(self.max);
            if end < start {
                continue;
            }
            let (label, caption) = label(*boundary, end);
            cells.push(HeaderCell {
                start,
                end,
                span_days: days_between(start, end) + 1,
                label,
                caption,
            });
        }
        cells
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn jan_axis() -> TimeAxis {
        TimeAxis::compute(
            [(d(2025, 1, 1), d(2025, 1, 10)), (d(2025, 1, 5), d(2025, 1, 15))],
            RangeOverride::default(),
            d(2030, 1, 1),
        )
    }

    #[test]
    fn range_spans_all_tasks() {
        let axis = jan_axis();
        assert_eq!(axis.min(), d(2025, 1, 1));
        assert_eq!(axis.max(), d(2025, 1, 15));
        assert_eq!(axis.total_days(), 15);
        assert_eq!(axis.days().len(), 15);
    }

    #[test]
    fn empty_input_is_one_day_at_today() {
        let today = d(2026, 10, 18);
        let axis = TimeAxis::compute(std::iter::empty(), RangeOverride::default(), today);
        assert_eq!(axis.min(), today);
        assert_eq!(axis.max(), today);
        assert_eq!(axis.total_days(), 1);
    }

    #[test]
    fn override_replaces_each_end_independently() {
        let spans = [(d(2025, 1, 1), d(2025, 1, 10))];
        let only_start = RangeOverride {
            start: Some(d(2024, 12, 25)),
            end: None,
        };
        let axis = TimeAxis::compute(spans, only_start, d(2030, 1, 1));
        assert_eq!((axis.min(), axis.max()), (d(2024, 12, 25), d(2025, 1, 10)));

        let inverted = RangeOverride {
            start: Some(d(2025, 2, 1)),
            end: Some(d(2025, 1, 1)),
        };
        let axis = TimeAxis::compute(spans, inverted, d(2030, 1, 1));
        assert_eq!(axis.total_days(), 1);
        assert_eq!(axis.max(), d(2025, 2, 1));
    }

    #[test]
    fn inverted_records_still_fit() {
        let axis = TimeAxis::compute(
            [(d(2025, 1, 20), d(2025, 1, 12))],
            RangeOverride::default(),
            d(2030, 1, 1),
        );
        assert_eq!((axis.min(), axis.max()), (d(2025, 1, 12), d(2025, 1, 20)));
        assert!(axis.left_percent(d(2025, 1, 20)) < 100.0);
    }

    #[test]
    fn percent_mapping() {
        let axis = jan_axis();
        assert_eq!(axis.left_percent(d(2025, 1, 1)), 0.0);
        assert!((axis.left_percent(d(2025, 1, 4)) - 20.0).abs() < 1e-4);
        assert!((axis.width_percent(d(2025, 1, 1), d(2025, 1, 15)) - 100.0).abs() < 1e-4);
        // Inverted spans still get one day.
        assert!(axis.width_percent(d(2025, 1, 9), d(2025, 1, 3)) > 0.0);
    }

    #[test]
    fn pixel_mapping_is_invertible() {
        let axis = jan_axis();
        for day_width in [12.0, 24.0, 48.0] {
            for date in axis.days() {
                let x = axis.date_to_x(date, day_width);
                assert_eq!(axis.x_to_date(x, day_width), date);
                assert_eq!(axis.x_to_date(x + day_width * 0.9, day_width), date);
            }
        }
        assert_eq!(axis.total_width(24.0), 360.0);
        assert_eq!(axis.x_to_date(100.0, 0.0), axis.min());
    }

    #[test]
    fn week_starts_are_mondays() {
        // 2025-01-01 is a Wednesday.
        let weeks = jan_axis().week_starts();
        assert_eq!(weeks, vec![d(2024, 12, 30), d(2025, 1, 6), d(2025, 1, 13)]);
        assert!(weeks.iter().all(|w| w.weekday() == chrono::Weekday::Mon));
    }

    #[test]
    fn month_starts_cover_the_range() {
        let axis = TimeAxis::new(d(2024, 11, 20), d(2025, 2, 3));
        assert_eq!(
            axis.month_starts(),
            vec![d(2024, 11, 1), d(2024, 12, 1), d(2025, 1, 1), d(2025, 2, 1)]
        );
    }

    #[rstest]
    #[case(TimeScale::Day)]
    #[case(TimeScale::Week)]
    #[case(TimeScale::Month)]
    fn header_cells_tile_the_axis(#[case] scale: TimeScale) {
        let axis = TimeAxis::new(d(2024, 11, 20), d(2025, 2, 3));
        let cells = axis.header_cells(scale);
        let total: i64 = cells.iter().map(|c| c.span_days).sum();
        assert_eq!(total, axis.total_days());
        assert_eq!(cells.first().unwrap().start, axis.min());
        assert_eq!(cells.last().unwrap().end, axis.max());
        for pair in cells.windows(2) {
            assert_eq!(shift_days(pair[0].end, 1), pair[1].start);
        }
    }

    #[test]
    fn week_cells_are_clipped() {
        let cells = jan_axis().header_cells(TimeScale::Week);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].start, d(2025, 1, 1));
        assert_eq!(cells[0].span_days, 5);
        assert_eq!(cells[1].span_days, 7);
        assert_eq!(cells[2].span_days, 3);
        assert_eq!(cells[1].label, "6 Jan 2025");
    }

    #[test]
    fn month_row_labels() {
        let cells = TimeAxis::new(d(2024, 12, 30), d(2025, 1, 2)).month_cells();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].label, "December 2024");
        assert_eq!(cells[0].span_days, 2);
        assert_eq!(cells[1].span_days, 2);
    }
}
