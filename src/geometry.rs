//! Donut chart and progress ring geometry.
//!
//! The view draws each arc as a dashed circle stroke. Lengths are measured along the
//! circumference and every arc starts from 12 o'clock, which is -90 degrees in the usual SVG
//! orientation.

use crate::aggregate::to_f64;
use crate::config::ChartSettings;
use crate::model::Category;
use rust_decimal::Decimal;
use serde::Serialize;
use std::f64::consts::PI;

/// Where every arc starts, in degrees.
pub const ORIGIN_DEGREES: f64 = -90.0;

/// Allowed slack when comparing summed arc lengths with the circumference.
pub const EPSILON: f64 = 1e-9;

pub fn circumference(radius: f64) -> f64 {
    2.0 * PI * radius
}

/// One `(label, value, color)` input of a donut chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentInput {
    pub label: String,
    pub value: f64,
    pub color: String,
}

impl SegmentInput {
    pub fn new(label: impl Into<String>, value: f64, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            color: color.into(),
        }
    }

    /// One segment per category, labelled and colored from the category palette.
    pub fn from_totals(totals: impl IntoIterator<Item = (Category, Decimal)>) -> Vec<Self> {
        totals
            .into_iter()
            .map(|(category, total)| Self::new(category.label(), to_f64(total), category.color()))
            .collect()
    }

    /// Negative, infinite and NaN values contribute nothing.
    fn clean_value(&self) -> f64 {
        if self.value.is_finite() && self.value > 0.0 {
            self.value
        } else {
            0.0
        }
    }
}

/// A laid-out donut segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcSegment {
    pub label: String,
    pub value: f64,
    pub color: String,
    /// Arc length along the circumference.
    pub length: f64,
    /// Cumulative length of the segments before this one.
    pub offset: f64,
    circumference: f64,
}

impl ArcSegment {
    /// The SVG `stroke-dasharray`: the visible arc followed by the rest of the circle.
    pub fn dash_array(&self) -> String {
        format!(
            "{:.3} {:.3}",
            self.length,
            (self.circumference - self.length).max(0.0)
        )
    }

    /// The SVG `stroke-dashoffset` that moves the dash forward to this segment's start.
    pub fn dash_offset(&self) -> f64 {
        -self.offset
    }

    pub fn start_degrees(&self) -> f64 {
        ORIGIN_DEGREES + self.fraction_of(self.offset) * 360.0
    }

    pub fn sweep_degrees(&self) -> f64 {
        self.fraction_of(self.length) * 360.0
    }

    fn fraction_of(&self, length: f64) -> f64 {
        if self.circumference > 0.0 {
            length / self.circumference
        } else {
            0.0
        }
    }
}

/// The text in the middle of the donut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenterLabel {
    pub title: String,
    pub value: f64,
}

/// A donut chart laid out for a fixed radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutChart {
    radius: f64,
    stroke_width: f64,
    hover_stroke_delta: f64,
    circumference: f64,
    total: f64,
    segments: Vec<ArcSegment>,
    hovered: Option<usize>,
}

impl DonutChart {
    pub fn new(inputs: Vec<SegmentInput>, settings: &ChartSettings) -> Self {
        let circumference = circumference(settings.radius);
        let total: f64 = inputs.iter().map(SegmentInput::clean_value).sum();
        let divisor = if total > 0.0 { total } else { 1.0 };

        let mut offset = 0.0;
        let mut segments = Vec::with_capacity(inputs.len());
        for input in inputs {
            let value = input.clean_value();
            let length = circumference * value / divisor;
            segments.push(ArcSegment {
                label: input.label,
                value,
                color: input.color,
                length,
                offset,
                circumference,
            });
            offset += length;
        }

        Self {
            radius: settings.radius,
            stroke_width: settings.stroke_width,
            hover_stroke_delta: settings.hover_stroke_delta,
            circumference,
            total,
            segments,
            hovered: None,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn circumference(&self) -> f64 {
        self.circumference
    }

    /// The sum of the segment values. Zero when nothing was recorded.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// True when only the background ring would be drawn.
    pub fn is_empty(&self) -> bool {
        self.total <= 0.0
    }

    pub fn segments(&self) -> &[ArcSegment] {
        &self.segments
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Highlights a segment. An index past the last segment clears the highlight.
    pub fn hover(&mut self, index: Option<usize>) {
        self.hovered = index.filter(|i| *i < self.segments.len());
    }

    pub fn center_label(&self) -> CenterLabel {
        match self.hovered.and_then(|i| self.segments.get(i)) {
            Some(segment) => CenterLabel {
                title: segment.label.clone(),
                value: segment.value,
            },
            None => CenterLabel {
                title: "Total".to_string(),
                value: self.total,
            },
        }
    }

    pub fn stroke_width_for(&self, index: usize) -> f64 {
        if self.hovered == Some(index) {
            self.stroke_width + self.hover_stroke_delta
        } else {
            self.stroke_width
        }
    }
}

/// A single proportion drawn as an arc over a neutral background ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressRing {
    radius: f64,
    stroke_width: f64,
    percent: f64,
    circumference: f64,
    arc_length: f64,
}

impl ProgressRing {
    /// `percent` is clamped into `0..=100`; NaN counts as zero.
    pub fn new(percent: f64, radius: f64, stroke_width: f64) -> Self {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        let circumference = circumference(radius);
        Self {
            radius,
            stroke_width,
            percent,
            circumference,
            arc_length: circumference * percent / 100.0,
        }
    }

    pub fn with_settings(percent: f64, settings: &ChartSettings) -> Self {
        Self::new(percent, settings.radius, settings.stroke_width)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// The clamped percentage.
    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// The length of the background ring.
    pub fn circumference(&self) -> f64 {
        self.circumference
    }

    pub fn arc_length(&self) -> f64 {
        self.arc_length
    }

    pub fn start_degrees(&self) -> f64 {
        ORIGIN_DEGREES
    }

    pub fn sweep_degrees(&self) -> f64 {
        360.0 * self.percent / 100.0
    }

    pub fn dash_array(&self) -> String {
        format!("{:.3} {:.3}", self.circumference, self.circumference)
    }

    /// The SVG `stroke-dashoffset` that hides everything past the arc.
    pub fn dash_offset(&self) -> f64 {
        self.circumference - self.arc_length
    }
}
