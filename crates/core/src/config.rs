use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Canvas, legend and label settings for the rendered chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: String,
    pub svg_width: f64,
    pub svg_height: f64,
    pub margin: Margin,
    pub title_y: f64,
    /// Left edge of the first legend swatch.
    pub legend_min_x: f64,
    /// Baseline of the legend row; `None` means the bottom of the canvas.
    pub legend_min_y: Option<f64>,
    pub legend_height: f64,
    pub inter_legend: f64,
    pub treemap_radius: f64,
    pub polygon_points: usize,
    /// Treemap center inside the drawing area; `None` centres it.
    pub treemap_center: Option<Point>,
    pub font_scale: FontScale,
    /// Leaves lighter than this show their code instead of their name, and
    /// only leaves heavier than it get a value label.
    pub label_threshold: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Share of papers by country".to_string(),
            svg_width: 1600.0,
            svg_height: 1100.0,
            margin: Margin::default(),
            title_y: 20.0,
            legend_min_x: 250.0,
            legend_min_y: None,
            legend_height: 25.0,
            inter_legend: 4.0,
            treemap_radius: 500.0,
            polygon_points: 60,
            treemap_center: None,
            font_scale: FontScale::default(),
            label_threshold: 0.5,
        }
    }
}

impl ChartConfig {
    pub fn width(&self) -> f64 {
        self.svg_width - self.margin.left - self.margin.right
    }

    pub fn height(&self) -> f64 {
        self.svg_height - self.margin.top - self.margin.bottom
    }

    pub fn center(&self) -> Point {
        self.treemap_center
            .unwrap_or_else(|| Point::new(self.width() / 2.0, self.height() / 2.0 + 5.0))
    }

    pub fn legend_origin(&self) -> Point {
        Point::new(self.legend_min_x, self.legend_min_y.unwrap_or(self.svg_height))
    }

    pub fn legend_color_width(&self) -> f64 {
        self.legend_height * 6.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 10.0,
            bottom: 10.0,
            left: 10.0,
        }
    }
}

/// Clamped linear map from a squared weight to a font size in px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl Default for FontScale {
    fn default() -> Self {
        Self {
            domain: [0.0, 40.0],
            range: [15.0, 40.0],
        }
    }
}

impl FontScale {
    pub fn scale(&self, input: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d1 == d0 {
            return r0;
        }
        let t = ((input - d0) / (d1 - d0)).clamp(0.0, 1.0);
        r0 + (r1 - r0) * t
    }

    pub fn for_weight(&self, weight: f64) -> f64 {
        self.scale(weight * weight)
    }
}

/// Relaxation settings for the Voronoi treemap engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreemapConfig {
    /// Stop once total area error / cell area drops below this.
    pub convergence_ratio: f64,
    pub max_iterations: usize,
    /// Weights lighter than this share of the heaviest sibling are raised to it.
    pub min_weight_ratio: f64,
    /// Max relative change of a site weight per iteration.
    pub flickering_influence: f64,
    pub seed: u64,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            convergence_ratio: 0.01,
            max_iterations: 50,
            min_weight_ratio: 0.01,
            flickering_influence: 0.1,
            seed: 0,
        }
    }
}
