use crate::types::ValidPoint;
use serde::Serialize;

pub const POPUP_LABEL: &str = "Location:";
pub const LEGEND_TITLE: &str = "Locations";
pub const LEGEND_ENTRY: &str = "Parking/Deployment Nests";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    Circle,
}

/// Visual style shared by every marker. There is no per-point styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub glyph: Glyph,
    pub color: &'static str,
    pub size: [u32; 2],
    pub anchor: [u32; 2],
    pub border: &'static str,
    pub opacity: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            glyph: Glyph::Circle,
            color: "teal",
            size: [12, 12],
            anchor: [6, 6],
            border: "1px solid black",
            opacity: 0.85,
        }
    }
}

impl MarkerStyle {
    /// Inline CSS for the marker's div icon.
    pub fn css(&self) -> String {
        let radius = match self.glyph {
            Glyph::Circle => "50%",
        };
        format!(
            "background: {}; border: {}; border-radius: {}; width: {}px; height: {}px; opacity: {};",
            self.color, self.border, radius, self.size[0], self.size[1], self.opacity
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub label: &'static str,
    pub body: String,
}

impl Popup {
    pub fn html(&self) -> String {
        format!(
            "<div style=\"font-size: 13px; font-family: sans-serif;\"><strong>{}</strong><br>{}</div>",
            self.label,
            escape_html(&self.body)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    pub lat: f64,
    pub lon: f64,
    pub style: MarkerStyle,
    pub popup: Popup,
}

impl MarkerDescriptor {
    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

pub fn project(point: &ValidPoint) -> MarkerDescriptor {
    MarkerDescriptor {
        lat: point.lat,
        lon: point.lon,
        style: MarkerStyle::default(),
        popup: Popup {
            label: POPUP_LABEL,
            body: point.description.clone(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: &'static str,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: &'static str,
    pub entries: Vec<LegendEntry>,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            title: LEGEND_TITLE,
            entries: vec![LegendEntry {
                label: LEGEND_ENTRY,
                style: MarkerStyle::default(),
            }],
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
