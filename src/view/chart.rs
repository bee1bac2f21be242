//! Chart view models.
//!
//! Chart options are explicit configuration structs rather than merged
//! option maps. Time-series charts hold their data in bounded sliding
//! windows: appending past capacity evicts the oldest point, so a chart
//! never grows beyond its configured length no matter how long the page
//! runs.

use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Sliding window
// ---------------------------------------------------------------------------

/// A FIFO buffer that never holds more than `capacity` items.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> SlidingWindow<T> {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends `item`, returning the evicted oldest item when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }
}

impl<T> Extend<T> for SlidingWindow<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Doughnut,
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesConfig {
    pub label: String,
    /// Stroke / fill color as `#rrggbb`.
    pub color: &'static str,
    /// Line charts only: shade the area under the line.
    pub fill: bool,
}

impl SeriesConfig {
    pub fn new(label: impl Into<String>, color: &'static str) -> Self {
        Self {
            label: label.into(),
            color,
            fill: false,
        }
    }

    pub fn filled(mut self) -> Self {
        self.fill = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Element id of the canvas this chart draws into.
    pub canvas: &'static str,
    pub kind: ChartKind,
    pub title: String,
    pub series: Vec<SeriesConfig>,
    /// Maximum number of points (or categories) kept.
    pub window: usize,
}

impl ChartConfig {
    pub fn line(canvas: &'static str, title: impl Into<String>, window: usize) -> Self {
        Self {
            canvas,
            kind: ChartKind::Line,
            title: title.into(),
            series: Vec::new(),
            window,
        }
    }

    pub fn doughnut(canvas: &'static str, title: impl Into<String>, series: SeriesConfig, categories: usize) -> Self {
        Self {
            canvas,
            kind: ChartKind::Doughnut,
            title: title.into(),
            series: vec![series],
            window: categories,
        }
    }

    pub fn bar(canvas: &'static str, title: impl Into<String>, series: SeriesConfig, categories: usize) -> Self {
        Self {
            canvas,
            kind: ChartKind::Bar,
            title: title.into(),
            series: vec![series],
            window: categories,
        }
    }

    pub fn with_series(mut self, series: SeriesConfig) -> Self {
        self.series.push(series);
        self
    }
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    config: ChartConfig,
    labels: SlidingWindow<String>,
    series: Vec<SlidingWindow<Option<f64>>>,
}

impl Chart {
    pub fn new(config: ChartConfig) -> Self {
        let window = config.window;
        let series = config.series.iter().map(|_| SlidingWindow::new(window)).collect();
        Self {
            labels: SlidingWindow::new(window),
            series,
            config,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Appends one point to every series. Missing trailing values are
    /// recorded as gaps; extra values are ignored.
    pub fn append(&mut self, label: impl Into<String>, values: &[Option<f64>]) {
        self.labels.push(label.into());
        for (i, series) in self.series.iter_mut().enumerate() {
            series.push(values.get(i).copied().flatten());
        }
    }

    /// Replaces all data. Only the newest `window` points survive.
    pub fn replace<L, I>(&mut self, points: I)
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, Vec<Option<f64>>)>,
    {
        self.clear();
        for (label, values) in points {
            self.append(label, &values);
        }
    }

    /// Swaps the series list (e.g. when the parameter filter changes) and
    /// drops the data.
    pub fn reconfigure_series(&mut self, series: Vec<SeriesConfig>) {
        self.config.series = series;
        self.series = self
            .config
            .series
            .iter()
            .map(|_| SlidingWindow::new(self.config.window))
            .collect();
        self.labels.clear();
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        for series in &mut self.series {
            series.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.labels.iter().map(String::as_str).collect()
    }

    pub fn series_values(&self, index: usize) -> Vec<Option<f64>> {
        self.series
            .get(index)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// A one-line text rendering of every series, newest point last.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("[{}] {}", self.config.canvas, self.config.title)];
        match self.config.kind {
            ChartKind::Line => {
                for (cfg, data) in self.config.series.iter().zip(&self.series) {
                    let points: Vec<String> = data
                        .iter()
                        .map(|v| v.map(|x| format!("{:.1}", x)).unwrap_or_else(|| "·".to_string()))
                        .collect();
                    let shade = if cfg.fill { " ░" } else { "" };
                    lines.push(format!("  {}{}: {}", cfg.label, shade, points.join(" ")));
                }
            }
            ChartKind::Doughnut | ChartKind::Bar => {
                let values = self.series_values(0);
                for (label, value) in self.labels.iter().zip(values) {
                    lines.push(format!("  {}: {}", label, value.map(|v| v.to_string()).unwrap_or_default()));
                }
            }
        }
        lines
    }
}
