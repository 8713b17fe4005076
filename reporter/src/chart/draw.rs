use std::f64::consts::TAU;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::font::FONT_FAMILY;
use super::plot::{Plot, TimeSeries};
use super::ChartKind;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const ERROR_RED: RGBColor = RGBColor(220, 20, 20);

/// Categorical palette for series and slices.
const CATEGORY10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Pie slices start at this angle, in degrees counter-clockwise from the positive x axis.
const PIE_START_ANGLE: f64 = 140.0;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Draw `plot` as a PNG at `path`.
///
/// The bitmap is owned by this call and flushed to disk before returning. Text is only drawn when
/// `draw_text` is set, as it needs a registered font.
pub(super) fn draw(
    kind: ChartKind,
    plot: &Plot,
    path: &Path,
    draw_text: bool,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, kind.size()).into_drawing_area();
    root.fill(&WHITE)?;

    match plot {
        Plot::Bars(bars) => {
            let color = match kind {
                ChartKind::P90ResponseTimeByLabel => ORANGE,
                _ => SKY_BLUE,
            };
            draw_bars(&root, kind, bars, color, draw_text)?;
        }
        Plot::Lines(series) => {
            let legend = kind == ChartKind::ResponseTimeOverTimeByLabel;
            draw_lines(&root, kind, series, legend, draw_text)?;
        }
        Plot::Pie(slices) => draw_pie(&root, kind, slices, draw_text)?,
    }

    root.present()?;

    Ok(())
}

fn draw_bars(
    root: &Area,
    kind: ChartKind,
    bars: &[(String, f64)],
    color: RGBColor,
    draw_text: bool,
) -> anyhow::Result<()> {
    let top = upper_bound(bars.iter().map(|(_, value)| *value));

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if draw_text {
        builder
            .caption(kind.title(), (FONT_FAMILY, 28))
            .x_label_area_size(120)
            .y_label_area_size(80);
    }
    let mut chart = builder.build_cartesian_2d((0..bars.len()).into_segmented(), 0f64..top)?;

    if draw_text {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&|value| match value {
                SegmentValue::CenterOf(idx) => bars
                    .get(*idx)
                    .map(|(label, _)| label.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc(kind.y_label())
            .axis_desc_style((FONT_FAMILY, 16))
            .draw()?;
    }

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(color.filled())
            .margin(10)
            .data(bars.iter().enumerate().map(|(idx, (_, value))| (idx, *value))),
    )?;

    Ok(())
}

fn draw_lines(
    root: &Area,
    kind: ChartKind,
    series: &[TimeSeries],
    legend: bool,
    draw_text: bool,
) -> anyhow::Result<()> {
    let points = || series.iter().flat_map(|s| s.points.iter());
    let start = points().map(|(t, _)| *t).min().unwrap_or_default();
    let mut end = points().map(|(t, _)| *t).max().unwrap_or_default();
    if end <= start {
        end = start + 1_000;
    }
    let top = upper_bound(points().map(|(_, value)| *value));

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if draw_text {
        builder
            .caption(kind.title(), (FONT_FAMILY, 28))
            .x_label_area_size(50)
            .y_label_area_size(80);
    }
    let mut chart = builder.build_cartesian_2d(start..end, 0f64..top)?;

    if draw_text {
        chart
            .configure_mesh()
            .x_labels(10)
            .x_label_formatter(&|millis| format_time(*millis))
            .y_desc(kind.y_label())
            .axis_desc_style((FONT_FAMILY, 16))
            .draw()?;
    }

    for (idx, line) in series.iter().enumerate() {
        let color = if legend {
            CATEGORY10[idx % CATEGORY10.len()]
        } else {
            ERROR_RED
        };
        let style = color.stroke_width(2);
        let drawn = chart.draw_series(LineSeries::new(line.points.iter().copied(), style))?;
        if legend {
            drawn
                .label(line.name.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }
    }

    if legend && draw_text {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((FONT_FAMILY, 14))
            .draw()?;
    }

    Ok(())
}

fn draw_pie(
    root: &Area,
    kind: ChartKind,
    slices: &[(String, f64)],
    draw_text: bool,
) -> anyhow::Result<()> {
    let area = if draw_text {
        root.titled(kind.title(), (FONT_FAMILY, 28))?
    } else {
        root.clone()
    };

    let total: f64 = slices.iter().map(|(_, value)| value).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;
    let centered = |size: u32| {
        TextStyle::from((FONT_FAMILY, size).into_font()).pos(Pos::new(HPos::Center, VPos::Center))
    };

    let mut angle = PIE_START_ANGLE.to_radians();
    for (idx, (label, value)) in slices.iter().enumerate() {
        if *value <= 0.0 {
            continue;
        }
        let sweep = value / total * TAU;
        let color = CATEGORY10[idx % CATEGORY10.len()];

        // one vertex per degree of arc keeps the outline smooth
        let steps = (sweep.to_degrees().ceil() as usize).max(2);
        let mut outline = Vec::with_capacity(steps + 2);
        outline.push(center);
        outline.extend(
            (0..=steps).map(|step| polar(center, radius, angle + sweep * step as f64 / steps as f64)),
        );
        area.draw(&Polygon::new(outline, color.filled()))?;

        if draw_text {
            let middle = angle + sweep / 2.0;
            area.draw(&Text::new(
                format!("{:.1}%", value / total * 100.0),
                polar(center, radius * 0.6, middle),
                centered(16),
            ))?;
            area.draw(&Text::new(
                label.clone(),
                polar(center, radius * 1.15, middle),
                centered(16),
            ))?;
        }

        angle += sweep;
    }

    Ok(())
}

/// Pixel at `radius` and `angle` (radians, counter-clockwise) from `center`.
fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 - (radius * angle.sin()).round() as i32,
    )
}

/// Headroom above the largest value, so the tallest bar or line does not touch the frame.
fn upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

fn format_time(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}
