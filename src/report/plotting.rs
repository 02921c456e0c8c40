//! PNG chart rendering with plotters

use std::error::Error;
use std::f64::consts::PI;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::charts::{ChartError, ChartRenderer, ChartSpec};
use crate::extraction::competitive::CompetitiveSeries;
use crate::extraction::customer::CustomerSeries;
use crate::extraction::financial::FinancialSeries;
use crate::extraction::kpi::KpiSeries;
use crate::extraction::market::MarketSeries;
use crate::extraction::marketing::MarketingSeries;
use crate::extraction::swot::{Quadrant, SwotSeries};
use crate::extraction::technical::TechnicalSeries;
use crate::extraction::{ExtractedSeries, LabeledValue};

type DrawResult = Result<(), Box<dyn Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const FONT: &str = "sans-serif";
const TAM_COLOR: RGBColor = RGBColor(52, 101, 164);
const SAM_COLOR: RGBColor = RGBColor(114, 159, 207);
const SOM_COLOR: RGBColor = RGBColor(252, 175, 62);
const REVENUE_COLOR: RGBColor = RGBColor(46, 139, 87);
const COST_COLOR: RGBColor = RGBColor(204, 0, 0);
const PROFIT_COLOR: RGBColor = RGBColor(52, 101, 164);

/// Renders chart specs to PNG files via the plotters bitmap backend
pub struct PlottersChartRenderer {
    width: u32,
    height: u32,
}

impl PlottersChartRenderer {
    pub fn new() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }

    fn draw(&self, spec: &ChartSpec, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;
        let title = spec.title();
        let body = root.titled(&title, (FONT, 32))?;

        match &spec.series {
            ExtractedSeries::Market(series) => draw_market(&body, series)?,
            ExtractedSeries::Competitive(series) => draw_competitive(&body, series)?,
            ExtractedSeries::Financial(series) => draw_financial(&body, series)?,
            ExtractedSeries::Customer(series) => draw_customer(&body, series)?,
            ExtractedSeries::Technical(series) => draw_timeline(&body, series)?,
            ExtractedSeries::Kpi(series) => draw_kpis(&body, series)?,
            ExtractedSeries::Swot(series) => draw_swot(&body, series)?,
            ExtractedSeries::Marketing(series) => draw_marketing(&body, series)?,
        }

        if spec.illustrative {
            root.draw(&Text::new(
                "Illustrative: no figures were found in the analysis",
                (12, self.height as i32 - 24),
                (FONT, 16).into_font().color(&RED),
            ))?;
        }

        root.present()?;
        Ok(())
    }
}

impl Default for PlottersChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer for PlottersChartRenderer {
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), ChartError> {
        self.draw(spec, path).map_err(|e| ChartError::Render {
            chart: spec.file_name().to_string(),
            message: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        "plotters"
    }
}

/// Label for a category axis position, blank between categories
fn category_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.15
    }
}

fn draw_market(area: &Area<'_>, series: &MarketSeries) -> DrawResult {
    let groups = [
        ("TAM", series.tam.value(), TAM_COLOR),
        ("SAM", series.sam.value(), SAM_COLOR),
        ("SOM", series.som.value(), SOM_COLOR),
    ];
    let years = &series.years;
    let y_max = axis_max(groups.iter().flat_map(|(_, values, _)| values.iter().copied()));

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(years.len() as f64 - 0.5), 0f64..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(years.len())
        .x_label_formatter(&|x| category_label(years, *x))
        .y_desc("USD (millions)")
        .draw()?;

    let width = 0.8 / groups.len() as f64;
    for (k, (name, values, color)) in groups.iter().enumerate() {
        let color = *color;
        chart
            .draw_series(values.iter().enumerate().map(|(i, v)| {
                let x0 = i as f64 - 0.4 + k as f64 * width;
                Rectangle::new([(x0, 0.0), (x0 + width, *v)], color.filled())
            }))?
            .label(*name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_competitive(area: &Area<'_>, series: &CompetitiveSeries) -> DrawResult {
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..100f64, 0f64..100f64)?;
    chart
        .configure_mesh()
        .x_desc("Price (relative)")
        .y_desc("Features (relative)")
        .draw()?;

    chart.draw_series(series.competitors.value().iter().enumerate().map(|(i, c)| {
        let color = Palette99::pick(i);
        let radius = (8.0 + c.market_share * 0.6) as i32;
        EmptyElement::at((c.price, c.features))
            + Circle::new((0, 0), radius, color.mix(0.6).filled())
            + Text::new(c.name.clone(), (radius + 4, -8), (FONT, 16).into_font())
    }))?;
    Ok(())
}

fn draw_financial(area: &Area<'_>, series: &FinancialSeries) -> DrawResult {
    let revenue = series.revenue.value();
    let costs = series.costs.value();
    let profit = series.profit();
    let months = &series.months;

    let all = revenue.iter().chain(costs).chain(&profit).copied();
    let y_max = axis_max(all.clone());
    let y_min = all.fold(0.0_f64, f64::min) * 1.15;

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(months.len() as f64 - 0.5), y_min..y_max)?;
    chart
        .configure_mesh()
        .x_labels(months.len())
        .x_label_formatter(&|x| category_label(months, *x))
        .y_desc("USD (thousands)")
        .draw()?;

    let lines = [
        ("Revenue", revenue.as_slice(), REVENUE_COLOR),
        ("Costs", costs.as_slice(), COST_COLOR),
        ("Profit", profit.as_slice(), PROFIT_COLOR),
    ];
    for (name, values, color) in lines {
        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
                color.stroke_width(3),
            ))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
    }

    let month = *series.break_even_month.value() as f64 - 1.0;
    if month >= 0.0 && month < months.len() as f64 {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(month, y_min), (month, y_max)],
            BLACK.mix(0.5).stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            "Break-even",
            (month, y_max * 0.95),
            (FONT, 16).into_font(),
        )))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_bars(area: &Area<'_>, caption: &str, values: &[LabeledValue], y_desc: &str, horizontal: bool) -> DrawResult {
    let labels: Vec<String> = values.iter().map(|v| v.label.clone()).collect();
    let max = axis_max(values.iter().map(|v| v.value));
    let n = values.len() as f64;

    let mut builder = ChartBuilder::on(area);
    builder
        .caption(caption, (FONT, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(if horizontal { 130 } else { 60 });

    if horizontal {
        let mut chart = builder.build_cartesian_2d(0f64..max, -0.5f64..(n - 0.5))?;
        // First value on top
        let flipped: Vec<String> = labels.iter().rev().cloned().collect();
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(values.len())
            .y_label_formatter(&|y| category_label(&flipped, *y))
            .x_desc(y_desc)
            .draw()?;
        chart.draw_series(values.iter().enumerate().map(|(i, v)| {
            let y = n - 1.0 - i as f64;
            Rectangle::new([(0.0, y - 0.35), (v.value, y + 0.35)], Palette99::pick(i).filled())
        }))?;
    } else {
        let mut chart = builder.build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..max)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(values.len())
            .x_label_formatter(&|x| category_label(&labels, *x))
            .y_desc(y_desc)
            .draw()?;
        chart.draw_series(values.iter().enumerate().map(|(i, v)| {
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, v.value)], Palette99::pick(i).filled())
        }))?;
    }
    Ok(())
}

fn draw_pie(area: &Area<'_>, caption: &str, values: &[LabeledValue]) -> DrawResult {
    let area = area.titled(caption, (FONT, 22))?;
    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = (width.min(height) as f64 / 2.0 - 40.0).max(10.0);
    let total: f64 = values.iter().map(|v| v.value.max(0.0)).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let point = |angle: f64, r: f64| {
        (
            (center.0 + r * angle.cos()) as i32,
            (center.1 + r * angle.sin()) as i32,
        )
    };
    let label_style = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    let mut angle = -PI / 2.0;
    for (i, value) in values.iter().enumerate() {
        let sweep = value.value.max(0.0) / total * 2.0 * PI;
        if sweep <= 0.0 {
            continue;
        }
        let steps = ((sweep / (2.0 * PI)) * 90.0).ceil().max(2.0) as usize;
        let mut points = vec![point(0.0, 0.0)];
        points.extend((0..=steps).map(|s| point(angle + sweep * s as f64 / steps as f64, radius)));
        area.draw(&Polygon::new(points, Palette99::pick(i).filled()))?;

        let middle = angle + sweep / 2.0;
        area.draw(&Text::new(
            format!("{} ({:.0}%)", value.label, value.value / total * 100.0),
            point(middle, radius * 0.65),
            label_style.clone(),
        ))?;
        angle += sweep;
    }
    Ok(())
}

fn draw_customer(area: &Area<'_>, series: &CustomerSeries) -> DrawResult {
    let panels = area.split_evenly((2, 2));
    draw_pie(&panels[0], "Customer Segments", series.segments.value())?;
    draw_bars(&panels[1], "Age Distribution", series.age_groups.value(), "Share (%)", false)?;
    draw_bars(&panels[2], "Income Levels", series.income_levels.value(), "Share (%)", false)?;
    draw_bars(&panels[3], "Customer Journey Funnel", series.funnel.value(), "Volume", true)?;
    Ok(())
}

fn draw_timeline(area: &Area<'_>, series: &TechnicalSeries) -> DrawResult {
    let phases = series.phases.value();
    let n = phases.len() as f64;
    let labels: Vec<String> = phases.iter().rev().map(|p| p.name.clone()).collect();
    let end = phases.iter().map(|p| p.end_day()).max().unwrap_or(1).max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("Technical complexity: {:.0}/10", series.complexity.value()),
            (FONT, 20),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(180)
        .build_cartesian_2d(0f64..end * 1.05, -0.5f64..(n - 0.5))?;
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(phases.len())
        .y_label_formatter(&|y| category_label(&labels, *y))
        .x_desc("Days from start")
        .draw()?;

    chart.draw_series(phases.iter().enumerate().map(|(i, phase)| {
        let y = n - 1.0 - i as f64;
        Rectangle::new(
            [(phase.start_day as f64, y - 0.3), (phase.end_day() as f64, y + 0.3)],
            Palette99::pick(i).mix(0.35).filled(),
        )
    }))?;
    chart.draw_series(phases.iter().enumerate().filter(|(_, p)| p.progress > 0.0).map(|(i, phase)| {
        let y = n - 1.0 - i as f64;
        let done = phase.start_day as f64 + phase.duration_days as f64 * phase.progress / 100.0;
        Rectangle::new(
            [(phase.start_day as f64, y - 0.3), (done, y + 0.3)],
            Palette99::pick(i).filled(),
        )
    }))?;
    Ok(())
}

fn draw_kpis(area: &Area<'_>, series: &KpiSeries) -> DrawResult {
    let panels = area.split_evenly((2, 3));
    for (panel, metric) in panels.iter().zip(&series.metrics) {
        let (width, height) = panel.dim_in_pixel();
        let (width, height) = (width as i32, height as i32);
        panel.draw(&Text::new(metric.label.clone(), (20, 20), (FONT, 22).into_font()))?;
        panel.draw(&Text::new(
            format!(
                "{} of {}",
                metric.format_value(*metric.current.value()),
                metric.format_value(*metric.target.value())
            ),
            (20, 55),
            (FONT, 18).into_font(),
        ))?;

        let bar_top = height / 2;
        let bar_bottom = bar_top + 36;
        let bar_right = width - 20;
        panel.draw(&Rectangle::new(
            [(20, bar_top), (bar_right, bar_bottom)],
            RGBColor(220, 220, 220).filled(),
        ))?;
        let progress = metric.progress();
        let filled = 20 + ((bar_right - 20) as f64 * progress / 100.0) as i32;
        let color = if progress >= 90.0 {
            REVENUE_COLOR
        } else if progress >= 70.0 {
            SOM_COLOR
        } else {
            COST_COLOR
        };
        panel.draw(&Rectangle::new([(20, bar_top), (filled, bar_bottom)], color.filled()))?;
        panel.draw(&Text::new(
            format!("{:.0}% of target", progress),
            (20, bar_bottom + 12),
            (FONT, 16).into_font(),
        ))?;
    }
    Ok(())
}

fn draw_swot(area: &Area<'_>, series: &SwotSeries) -> DrawResult {
    let colors = [
        RGBColor(46, 139, 87),
        RGBColor(204, 0, 0),
        RGBColor(52, 101, 164),
        RGBColor(245, 121, 0),
    ];
    let panels = area.split_evenly((2, 2));
    for ((panel, quadrant), color) in panels.iter().zip(Quadrant::ALL).zip(colors) {
        let panel = panel.margin(8, 8, 8, 8);
        panel.fill(&color.mix(0.15))?;
        panel.draw(&Text::new(quadrant.title(), (16, 14), (FONT, 26).into_font().color(&color)))?;
        for (line, item) in series.quadrant(quadrant).value().iter().enumerate() {
            panel.draw(&Text::new(
                format!("- {}", item),
                (20, 56 + line as i32 * 28),
                (FONT, 17).into_font(),
            ))?;
        }
    }
    Ok(())
}

fn draw_marketing(area: &Area<'_>, series: &MarketingSeries) -> DrawResult {
    let panels = area.split_evenly((1, 2));
    draw_pie(&panels[0], "Budget Share by Channel", series.channels.value())?;
    draw_bars(
        &panels[1],
        &format!("Allocation of ${:.0}K", series.budget_thousands.value()),
        &series.allocation(),
        "USD (thousands)",
        true,
    )?;
    Ok(())
}
