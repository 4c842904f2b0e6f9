use std::fmt;

use compute::{Evaluation, Side};

use crate::error::TrackingError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Classification {
    Inside,
    Outside,
    Unknown,
}

impl Classification {
    /// CSS class of the status headline, if any.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Classification::Inside => Some("inside"),
            Classification::Outside => Some("outside"),
            Classification::Unknown => None,
        }
    }
}

/// What the status region currently says.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Status {
    #[default]
    Idle,
    BoundaryDrawn,
    Inside { distance_m: f64 },
    Outside { distance_m: f64 },
    Error(TrackingError),
}

impl Status {
    pub fn from_evaluation(eval: &Evaluation) -> Self {
        let distance_m = eval.reported_distance_m();
        match eval.side {
            Side::Inside => Status::Inside { distance_m },
            Side::Outside => Status::Outside { distance_m },
        }
    }

    pub fn classification(&self) -> Classification {
        match self {
            Status::Inside { .. } => Classification::Inside,
            Status::Outside { .. } => Classification::Outside,
            _ => Classification::Unknown,
        }
    }

    /// Markup for the status region. Error text from the platform is escaped.
    pub fn to_html(&self) -> String {
        match self {
            Status::Inside { distance_m } => format!(
                "<span class=\"inside\">You are INSIDE the area.</span><br>Distance from edge: {distance_m:.2} m"
            ),
            Status::Outside { distance_m } => format!(
                "<span class=\"outside\">You are OUTSIDE the area.</span><br>Nearest distance: {distance_m:.2} m"
            ),
            other => escape_html(&other.to_string()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => write!(f, "Draw a boundary on the map to begin."),
            Status::BoundaryDrawn => write!(f, "Boundary drawn. Allow GPS to check location."),
            Status::Inside { distance_m } => write!(
                f,
                "You are INSIDE the area. Distance from edge: {distance_m:.2} m"
            ),
            Status::Outside { distance_m } => {
                write!(f, "You are OUTSIDE the area. Nearest distance: {distance_m:.2} m")
            }
            Status::Error(err) => write!(f, "{err}"),
        }
    }
}

impl From<TrackingError> for Status {
    fn from(err: TrackingError) -> Self {
        Status::Error(err)
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
