//! Minimal SVG drawing primitives shared by the plots.

/// Stroke style of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    fn dasharray(&self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6,4"),
            Self::Dotted => Some("1.5,3"),
        }
    }
}

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Escape text for use inside SVG elements and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// An SVG document under construction.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    body: String,
}

impl SvgDocument {
    /// Start a document with a white background.
    pub fn new(width: f64, height: f64) -> Self {
        let mut doc = Self {
            width,
            height,
            body: String::new(),
        };
        doc.rect(0.0, 0.0, width, height, "white", "none");
        doc
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, style: LineStyle) {
        let dash = style
            .dasharray()
            .map(|d| format!(" stroke-dasharray=\"{}\"", d))
            .unwrap_or_default();
        self.body.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"{}/>\n",
            x1, y1, x2, y2, stroke, dash
        ));
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &str, stroke: &str) {
        self.body.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\"/>\n",
            x, y, width, height, fill, stroke
        ));
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, opacity: f64) {
        self.body.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"{}\"/>\n",
            cx, cy, r, fill, opacity
        ));
    }

    /// Hollow marker, used for boxplot outliers.
    pub fn ring(&mut self, cx: f64, cy: f64, r: f64, stroke: &str) {
        self.body.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"none\" stroke=\"{}\"/>\n",
            cx, cy, r, stroke
        ));
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: Anchor) {
        self.body.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"{}\" text-anchor=\"{}\">{}</text>\n",
            x,
            y,
            size,
            anchor.as_str(),
            escape(content)
        ));
    }

    /// Text rotated -90 degrees around its anchor point (y-axis titles).
    pub fn vertical_text(&mut self, x: f64, y: f64, content: &str, size: f64) {
        self.body.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"{}\" text-anchor=\"middle\" transform=\"rotate(-90 {:.2} {:.2})\">{}</text>\n",
            x,
            y,
            size,
            x,
            y,
            escape(content)
        ));
    }

    /// Close the document.
    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

/// Round step sizes (1, 2, 5 x 10^k) giving about `target` ticks over a range.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || target == 0 {
        return vec![];
    }
    let raw_step = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let factor = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    let step = factor * magnitude;

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Tick label without trailing float noise.
pub fn format_tick(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// Data-to-pixel mapping for a rectangular plot area with axes.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl PlotArea {
    /// Pixel x of a data value.
    pub fn px(&self, x: f64) -> f64 {
        let (lo, hi) = self.x_range;
        self.left + (x - lo) / (hi - lo) * self.width
    }

    /// Pixel y of a data value (y grows upwards in data space).
    pub fn py(&self, y: f64) -> f64 {
        let (lo, hi) = self.y_range;
        self.top + self.height - (y - lo) / (hi - lo) * self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Frame, y ticks, and (unless `x_ticks` is false) x ticks.
    pub fn draw_axes(&self, doc: &mut SvgDocument, x_ticks: bool) {
        doc.rect(self.left, self.top, self.width, self.height, "none", "black");

        if x_ticks {
            for tick in nice_ticks(self.x_range.0, self.x_range.1, 6) {
                let x = self.px(tick);
                doc.line(x, self.bottom(), x, self.bottom() + 4.0, "black", LineStyle::Solid);
                doc.text(x, self.bottom() + 16.0, &format_tick(tick), 10.0, Anchor::Middle);
            }
        }
        for tick in nice_ticks(self.y_range.0, self.y_range.1, 6) {
            let y = self.py(tick);
            doc.line(self.left - 4.0, y, self.left, y, "black", LineStyle::Solid);
            doc.text(self.left - 6.0, y + 3.5, &format_tick(tick), 10.0, Anchor::End);
        }
    }
}

/// Widen a range that is empty or degenerate, then pad it by `fraction` of
/// its span on each side.
pub fn padded_range(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    let (min, max) = if !(min.is_finite() && max.is_finite()) {
        (0.0, 1.0)
    } else if max - min < 1e-12 {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let pad = (max - min) * fraction;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let ticks = nice_ticks(-3.2, 3.2, 6);
        assert!(ticks.contains(&0.0));
        assert!(ticks.iter().all(|t| (-3.2..=3.2).contains(t)));
        assert!(nice_ticks(1.0, 1.0, 5).is_empty());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.30000000000000004), "0.3");
        assert_eq!(format_tick(-0.0), "0");
        assert_eq!(format_tick(2.0), "2");
    }

    #[test]
    fn test_plot_area_mapping() {
        let area = PlotArea {
            left: 10.0,
            top: 20.0,
            width: 100.0,
            height: 50.0,
            x_range: (0.0, 10.0),
            y_range: (0.0, 5.0),
        };
        assert_eq!(area.px(0.0), 10.0);
        assert_eq!(area.px(10.0), 110.0);
        assert_eq!(area.py(0.0), 70.0);
        assert_eq!(area.py(5.0), 20.0);
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(2.0, 2.0, 0.0), (1.5, 2.5));
        let (lo, hi) = padded_range(0.0, 10.0, 0.1);
        assert_eq!((lo, hi), (-1.0, 11.0));
    }

    #[test]
    fn test_document_is_closed() {
        let mut doc = SvgDocument::new(100.0, 50.0);
        doc.text(1.0, 2.0, "x & y", 8.0, Anchor::Start);
        let svg = doc.finish();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("x &amp; y"));
    }
}
