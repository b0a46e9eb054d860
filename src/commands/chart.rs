use crate::aggregate::{breakdown, total_by_category};
use crate::api::Mode;
use crate::args::ChartArgs;
use crate::commands::{open, Out};
use crate::geometry::{CenterLabel, DonutChart, SegmentInput};
use crate::model::Unit;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;

/// Colors for the segments of a single-category breakdown.
const BREAKDOWN_PALETTE: [&str; 8] = [
    "#2563eb", "#16a34a", "#f59e0b", "#dc2626", "#7c3aed", "#0891b2", "#db2777", "#65a30d",
];

/// One segment as the view paints it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentView {
    pub label: String,
    pub value: f64,
    pub color: String,
    pub length: f64,
    pub offset: f64,
    pub dash_array: String,
    pub dash_offset: f64,
    pub start_degrees: f64,
    pub sweep_degrees: f64,
    pub stroke_width: f64,
}

/// The renderable description of a donut chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub title: String,
    pub radius: f64,
    pub circumference: f64,
    pub empty: bool,
    pub center: CenterLabel,
    pub segments: Vec<SegmentView>,
}

impl ChartView {
    fn new(title: impl Into<String>, chart: &DonutChart) -> Self {
        let segments = chart
            .segments()
            .iter()
            .enumerate()
            .map(|(i, s)| SegmentView {
                label: s.label.clone(),
                value: s.value,
                color: s.color.clone(),
                length: s.length,
                offset: s.offset,
                dash_array: s.dash_array(),
                dash_offset: s.dash_offset(),
                start_degrees: s.start_degrees(),
                sweep_degrees: s.sweep_degrees(),
                stroke_width: chart.stroke_width_for(i),
            })
            .collect();
        Self {
            title: title.into(),
            radius: chart.radius(),
            circumference: chart.circumference(),
            empty: chart.is_empty(),
            center: chart.center_label(),
            segments,
        }
    }
}

/// Lays out a donut chart. With a category, the chart breaks that category down by sub-type.
/// Without one, it splits the dollar-valued categories, since quantities and dollars cannot share
/// a circle.
pub async fn chart(config: Config, mode: Mode, args: ChartArgs) -> Result<Out<ChartView>> {
    let repo = open(&config, mode).await?;
    let snapshot = repo.snapshot();

    let (title, inputs): (String, Vec<SegmentInput>) = match args.category {
        Some(category) => (
            format!("{} by type", category.label()),
            breakdown(&snapshot, category)
                .into_iter()
                .zip(BREAKDOWN_PALETTE.iter().cycle())
                .map(|((label, value), color)| {
                    SegmentInput::new(label, crate::aggregate::to_f64(value), *color)
                })
                .collect(),
        ),
        None => (
            "Financial assistance by category".to_string(),
            SegmentInput::from_totals(
                total_by_category(&snapshot)
                    .into_iter()
                    .filter(|(c, _)| c.unit() == Unit::Dollars),
            ),
        ),
    };

    let mut donut = DonutChart::new(inputs, config.chart());
    donut.hover(args.hover);
    let view = ChartView::new(title, &donut);
    Ok(Out::new(render(&view), view))
}

fn render(view: &ChartView) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "{}", view.title);
    if view.empty {
        let _ = writeln!(s, "  (nothing recorded)");
    }
    for segment in &view.segments {
        let share = if view.circumference > 0.0 {
            100.0 * segment.length / view.circumference
        } else {
            0.0
        };
        let _ = writeln!(
            s,
            "  {:<28} {:>12.2} {:>6.1}%  {}",
            segment.label, segment.value, share, segment.color
        );
    }
    let _ = writeln!(s, "  {}: {:.2}", view.center.title, view.center.value);
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[tokio::test]
    async fn test_chart_dollar_categories() {
        let out = chart(crate::test::config(), Mode::Test, ChartArgs::default())
            .await
            .unwrap();
        let view = out.structure().unwrap();
        let labels: Vec<&str> = view.segments.iter().map(|s| s.label.as_str()).collect();
        let expected: Vec<&str> = Category::ALL
            .iter()
            .filter(|c| c.unit() == Unit::Dollars)
            .map(|c| c.label())
            .collect();
        assert_eq!(labels, expected);
        let sum: f64 = view.segments.iter().map(|s| s.length).sum();
        assert!((sum - view.circumference).abs() < 1e-6);
        assert_eq!(view.center.title, "Total");
    }

    #[tokio::test]
    async fn test_chart_breakdown_with_hover() {
        let args = ChartArgs {
            category: Some(Category::Diapers),
            hover: Some(1),
        };
        let out = chart(crate::test::config(), Mode::Test, args).await.unwrap();
        let view = out.structure().unwrap();
        assert_eq!(view.segments.len(), 2);
        assert_eq!(view.center.title, view.segments[1].label);
        assert!(view.segments[1].stroke_width > view.segments[0].stroke_width);
    }
}
