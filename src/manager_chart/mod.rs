use std::path::Path;
use plotters::prelude::*;
use thiserror::Error;
use crate::config::ChartParameters;
use crate::models::forecast::{Forecast, HOURS_PER_DAY};
use crate::worker::ChartRenderer;

#[derive(Error, Debug)]
#[error("error generating forecast chart: {0}")]
pub struct RenderError(pub String);
/// Struct for rendering forecast charts to PNG files
pub struct Chart {
    params: ChartParameters,
}

impl Chart {
    /// Returns a Chart struct using the given style parameters
    ///
    /// # Arguments
    ///
    /// * 'params' - chart style constants from the configuration file
    pub fn new(params: ChartParameters) -> Chart {
        Chart { params }
    }
}

impl ChartRenderer for Chart {
    /// Renders temperature and rain for the day as line series over the
    /// hours 0-23 and writes the result as a PNG to the given path
    ///
    /// # Arguments
    ///
    /// * 'forecast' - the forecast to render
    /// * 'output_path' - where to write the image
    fn render_chart(&self, forecast: &Forecast, output_path: &Path) -> Result<(), RenderError> {
        let p = &self.params;
        let temperature_color = RGBColor(
            p.temperature_line_color[0], p.temperature_line_color[1], p.temperature_line_color[2]);
        let rain_color = RGBColor(
            p.rain_line_color[0], p.rain_line_color[1], p.rain_line_color[2]);

        let (y_min, y_max) = value_range(forecast);

        let root = BitMapBackend::new(output_path, (p.width, p.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| RenderError(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Temperature and Rain Accumulation", ("sans-serif", 28))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(56)
            .build_cartesian_2d(0.0f64..(HOURS_PER_DAY - 1) as f64, y_min..y_max)
            .map_err(|e| RenderError(e.to_string()))?;

        chart.configure_mesh()
            .x_desc("Time (h)")
            .y_desc("Values")
            .light_line_style(&BLACK.mix(self.params.grid_alpha))
            .draw()
            .map_err(|e| RenderError(e.to_string()))?;

        chart.draw_series(LineSeries::new(
                (0..HOURS_PER_DAY).map(|h| (h as f64, forecast.temperature[h])),
                temperature_color.stroke_width(p.temperature_line_width)))
            .map_err(|e| RenderError(e.to_string()))?
            .label("Temperature (°C)")
            .legend(move |(x, y)| PathElement::new(
                vec![(x, y), (x + 20, y)], temperature_color.stroke_width(2)));

        chart.draw_series(LineSeries::new(
                (0..HOURS_PER_DAY).map(|h| (h as f64, forecast.rain[h])),
                rain_color.stroke_width(p.rain_line_width)))
            .map_err(|e| RenderError(e.to_string()))?
            .label("Rain Accumulation (mm)")
            .legend(move |(x, y)| PathElement::new(
                vec![(x, y), (x + 20, y)], rain_color.stroke_width(2)));

        chart.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| RenderError(e.to_string()))?;

        root.present().map_err(|e| RenderError(e.to_string()))?;

        Ok(())
    }
}

/// Returns the value range covered by the rendered series with some headroom
/// so that neither line sits on the chart border
///
/// # Arguments
///
/// * 'forecast' - the forecast about to be rendered
fn value_range(forecast: &Forecast) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for h in 0..HOURS_PER_DAY {
        min = min.min(forecast.temperature[h]).min(forecast.rain[h]);
        max = max.max(forecast.temperature[h]).max(forecast.rain[h]);
    }

    let padding = if (max - min).abs() > 1e-6 { (max - min) * 0.1 } else { 1.0 };

    (min - padding, max + padding)
}
