//! Paper geometry and pagination.
use crate::error::Problem;

/// Printable area of one logical page, in points.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageGeometry {
    pub name: String,
    pub top: f64,
    pub bottom: f64,
    pub left_margin: f64,
    pub width: f64,
}

// name, top, bottom, left margin, width
const PAPER_TABLE: &[(&str, f64, f64, f64, f64)] = &[
    ("a4", 756.0, 36.0, 72.0, 595.0),
    ("letter", 756.0, 40.0, 72.0, 612.0),
    // letter with half-inch margins
    ("mletter", 792.0, 36.0, 36.0, 612.0),
];

impl Default for PageGeometry {
    fn default() -> Self {
        Self::builtin("letter").unwrap_or_else(|| PageGeometry {
            name: "letter".into(),
            top: 756.0,
            bottom: 40.0,
            left_margin: 72.0,
            width: 612.0,
        })
    }
}

impl PageGeometry {
    /// Look up one of the builtin paper types, case-insensitively.
    pub fn builtin(name: &str) -> Option<Self> {
        let wanted = name.to_ascii_lowercase();
        PAPER_TABLE
            .iter()
            .find(|(n, ..)| *n == wanted)
            .map(|&(n, top, bottom, left_margin, width)| PageGeometry {
                name: n.to_string(),
                top,
                bottom,
                left_margin,
                width,
            })
    }

    pub fn paper_names() -> impl Iterator<Item = &'static str> {
        PAPER_TABLE.iter().map(|(n, ..)| *n)
    }

    /// Build a user form, validating its extents.
    pub fn custom(
        name: &str,
        top: f64,
        width: f64,
        left_margin: f64,
        bottom: f64,
    ) -> Result<Self, Problem> {
        if top <= 72.0
            || width <= 72.0
            || bottom < 0.0
            || bottom >= top
            || left_margin < 0.0
            || left_margin >= width
        {
            return Err(Problem::InvalidForm(format!(
                "{name}: top {top}, width {width}, left {left_margin}, bottom {bottom}"
            )));
        }
        Ok(PageGeometry {
            name: name.to_ascii_lowercase(),
            top,
            bottom,
            left_margin,
            width,
        })
    }

    /// Usable line width right of the left margin.
    pub fn text_width(&self) -> f64 {
        self.width - self.left_margin
    }
}

/// Logical pages per physical sheet.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pagination {
    #[default]
    One,
    Two,
    Four,
}

impl Pagination {
    pub fn pages_per_sheet(self) -> u32 {
        match self {
            Pagination::One => 1,
            Pagination::Two => 2,
            Pagination::Four => 4,
        }
    }

    /// Scale and rotation applied to every sheet for this pagination.
    pub fn sheet_transform(self, geometry: &PageGeometry) -> (f64, f64) {
        match self {
            Pagination::One => (1.0, 0.0),
            Pagination::Two => (
                geometry.text_width() / (geometry.top + geometry.bottom),
                90.0,
            ),
            Pagination::Four => (1.0 / 2.1, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup_ignores_case() {
        let a4 = PageGeometry::builtin("A4").unwrap();
        assert_eq!(a4.width, 595.0);
        assert!(PageGeometry::builtin("legal").is_none());
    }

    #[test]
    fn custom_form_validation() {
        assert!(PageGeometry::custom("mine", 700.0, 500.0, 50.0, 30.0).is_ok());
        assert!(PageGeometry::custom("low", 60.0, 500.0, 50.0, 30.0).is_err());
        assert!(PageGeometry::custom("bottom", 700.0, 500.0, 50.0, 700.0).is_err());
        assert!(PageGeometry::custom("left", 700.0, 500.0, 500.0, 30.0).is_err());
        assert!(PageGeometry::custom("neg", 700.0, 500.0, -1.0, 30.0).is_err());
    }

    #[test]
    fn four_up_scale() {
        let (scale, rotation) = Pagination::Four.sheet_transform(&PageGeometry::default());
        assert!((scale - 1.0 / 2.1).abs() < 1e-9);
        assert_eq!(rotation, 0.0);
    }
}
