//! Minimal SVG chart building blocks
//!
//! Charts are assembled as strings: a [`Frame`] maps data coordinates into a
//! plot area and draws axes; the free functions emit single shapes.

pub const AXIS_COLOR: &str = "#9ca3af";
pub const GRID_COLOR: &str = "#e5e7eb";
pub const TEXT_COLOR: &str = "#374151";
pub const MUTED_TEXT_COLOR: &str = "#6b7280";

/// Escape text for use inside SVG/HTML content or attributes
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Data range that is never empty
fn widen(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if (max - min).abs() <= f64::EPSILON * min.abs().max(max.abs()).max(1.0) {
        let pad = 0.5_f64.max(min.abs() * 1e-6);
        (min - pad, max + pad)
    } else {
        (min, max)
    }
}

/// Plot area with linear x and y scales
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Frame {
    pub fn new(width: f64, height: f64, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            width,
            height,
            margin_left: 70.0,
            margin_right: 20.0,
            margin_top: 36.0,
            margin_bottom: 44.0,
            x_range: widen(x_range.0, x_range.1),
            y_range: widen(y_range.0, y_range.1),
        }
    }

    pub fn with_left_margin(mut self, margin: f64) -> Self {
        self.margin_left = margin;
        self
    }

    pub fn plot_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Data x to pixel x
    pub fn x(&self, value: f64) -> f64 {
        let (lo, hi) = self.x_range;
        self.margin_left + (value - lo) / (hi - lo) * self.plot_width()
    }

    /// Data y to pixel y (y grows upward)
    pub fn y(&self, value: f64) -> f64 {
        let (lo, hi) = self.y_range;
        self.margin_top + self.plot_height() - (value - lo) / (hi - lo) * self.plot_height()
    }

    /// Title, axis lines, tick labels and axis captions
    pub fn axes(&self, title: &str, x_label: &str, y_label: &str, y_ticks: bool) -> String {
        let mut out = String::new();
        let bottom = self.margin_top + self.plot_height();
        let right = self.margin_left + self.plot_width();

        out.push_str(&format!(
            r##"<text x="{:.1}" y="20" text-anchor="middle" font-size="14" font-weight="600" fill="{}">{}</text>"##,
            self.width / 2.0,
            TEXT_COLOR,
            escape(title)
        ));
        out.push_str(&format!(
            r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"##,
            self.margin_left, bottom, right, bottom, AXIS_COLOR
        ));
        out.push_str(&format!(
            r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"##,
            self.margin_left, self.margin_top, self.margin_left, bottom, AXIS_COLOR
        ));

        for i in 0..=4 {
            let fraction = i as f64 / 4.0;
            let value = self.x_range.0 + fraction * (self.x_range.1 - self.x_range.0);
            out.push_str(&format!(
                r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="10" fill="{}">{}</text>"##,
                self.x(value),
                bottom + 14.0,
                MUTED_TEXT_COLOR,
                format_tick(value)
            ));
        }

        if y_ticks {
            for i in 0..=4 {
                let fraction = i as f64 / 4.0;
                let value = self.y_range.0 + fraction * (self.y_range.1 - self.y_range.0);
                let y = self.y(value);
                out.push_str(&format!(
                    r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"/>"##,
                    self.margin_left, y, right, y, GRID_COLOR
                ));
                out.push_str(&format!(
                    r##"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="10" fill="{}">{}</text>"##,
                    self.margin_left - 6.0,
                    y + 3.0,
                    MUTED_TEXT_COLOR,
                    format_tick(value)
                ));
            }
        }

        out.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11" fill="{}">{}</text>"##,
            self.margin_left + self.plot_width() / 2.0,
            self.height - 8.0,
            MUTED_TEXT_COLOR,
            escape(x_label)
        ));
        let mid_y = self.margin_top + self.plot_height() / 2.0;
        out.push_str(&format!(
            r##"<text x="14" y="{:.1}" text-anchor="middle" font-size="11" fill="{}" transform="rotate(-90, 14, {:.1})">{}</text>"##,
            mid_y,
            MUTED_TEXT_COLOR,
            mid_y,
            escape(y_label)
        ));

        out
    }

    /// Wrap `body` in an `<svg>` element sized to this frame
    pub fn finish(&self, body: &str) -> String {
        document(self.width, self.height, body)
    }
}

/// Compact tick label
pub fn format_tick(value: f64) -> String {
    if value.abs() >= 10_000.0 {
        format!("{:.0}k", value / 1000.0)
    } else if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

pub fn document(width: f64, height: f64, body: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" style="background:white; border-radius:8px">{}</svg>"##,
        width, height, width, height, body
    )
}

pub fn circle(cx: f64, cy: f64, r: f64, fill: &str, opacity: f64) -> String {
    format!(
        r##"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="{:.2}"/>"##,
        cx, cy, r, fill, opacity
    )
}

pub fn rect(x: f64, y: f64, width: f64, height: f64, fill: &str, opacity: f64) -> String {
    format!(
        r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="{:.2}"/>"##,
        x,
        y,
        width.max(0.0),
        height.max(0.0),
        fill,
        opacity
    )
}

pub fn polyline(points: &[(f64, f64)], stroke: &str) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect();
    format!(
        r##"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5"/>"##,
        coords.join(" "),
        stroke
    )
}

pub fn label(x: f64, y: f64, anchor: &str, size: u32, fill: &str, text: &str) -> String {
    format!(
        r##"<text x="{:.1}" y="{:.1}" text-anchor="{}" font-size="{}" fill="{}">{}</text>"##,
        x,
        y,
        anchor,
        size,
        fill,
        escape(text)
    )
}

/// Blend from white to `rgb` by `intensity` in `[0, 1]`
pub fn shade(rgb: (u8, u8, u8), intensity: f64) -> String {
    let t = intensity.clamp(0.0, 1.0);
    let mix = |c: u8| (255.0 - (255.0 - c as f64) * t).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(rgb.0), mix(rgb.1), mix(rgb.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>&'\""), "&lt;b&gt;&amp;&#39;&quot;");
    }

    #[test]
    fn test_frame_maps_corners() {
        let frame = Frame::new(400.0, 300.0, (0.0, 10.0), (0.0, 100.0));
        assert_eq!(frame.x(0.0), frame.margin_left);
        assert_eq!(frame.x(10.0), frame.margin_left + frame.plot_width());
        assert_eq!(frame.y(0.0), frame.margin_top + frame.plot_height());
        assert_eq!(frame.y(100.0), frame.margin_top);
    }

    #[test]
    fn test_frame_degenerate_range() {
        let frame = Frame::new(400.0, 300.0, (5.0, 5.0), (f64::NAN, 1.0));
        let x = frame.x(5.0);
        assert!(x.is_finite());
        assert!(frame.y(0.5).is_finite());
    }

    #[test]
    fn test_frame_degenerate_huge_range() {
        let frame = Frame::new(400.0, 300.0, (1e300, 1e300), (0.0, 1.0));
        let x = frame.x(1e300);
        assert!(x.is_finite());
        assert!(x > frame.margin_left && x < frame.margin_left + frame.plot_width());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(3.0), "3");
        assert_eq!(format_tick(2.5), "2.50");
        assert_eq!(format_tick(25_000.0), "25k");
    }

    #[test]
    fn test_shade() {
        assert_eq!(shade((0, 0, 0), 0.0), "#ffffff");
        assert_eq!(shade((0, 0, 0), 1.0), "#000000");
        assert_eq!(shade((31, 119, 180), 1.0), "#1f77b4");
    }

    #[test]
    fn test_document_wraps_body() {
        let svg = document(10.0, 20.0, "<g/>");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<g/>"));
        assert!(svg.ends_with("</svg>"));
    }
}
