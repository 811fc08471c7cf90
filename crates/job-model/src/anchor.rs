//! Overlay anchors and their placement expressions.

use std::fmt;
use std::str::FromStr;

use fastmark_common::error::FastmarkError;
use serde::{Deserialize, Serialize};

/// Margin between the overlay and the frame edge, in pixels.
pub const EDGE_MARGIN_PX: u32 = 10;

/// Screen-relative position of the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

/// Horizontal/vertical overlay expressions in the engine's expression language.
///
/// `main_w`/`main_h` are the video dimensions, `overlay_w`/`overlay_h` the
/// scaled watermark dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub x: String,
    pub y: String,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::Center,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopRight => "top-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
            Anchor::Center => "center",
        }
    }

    /// Resolve to overlay x/y expressions.
    pub fn placement(self) -> Placement {
        let near = EDGE_MARGIN_PX.to_string();
        let far_x = format!("main_w-overlay_w-{EDGE_MARGIN_PX}");
        let far_y = format!("main_h-overlay_h-{EDGE_MARGIN_PX}");

        let (x, y) = match self {
            Anchor::TopLeft => (near.clone(), near),
            Anchor::TopRight => (far_x, near),
            Anchor::BottomLeft => (near, far_y),
            Anchor::BottomRight => (far_x, far_y),
            Anchor::Center => (
                "(main_w-overlay_w)/2".to_string(),
                "(main_h-overlay_h)/2".to_string(),
            ),
        };
        Placement { x, y }
    }

    fn legal_names() -> String {
        Self::ALL
            .iter()
            .map(|a| format!("'{}'", a.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = FastmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| {
                FastmarkError::validation(format!(
                    "Invalid position '{s}'. Choose from {}.",
                    Self::legal_names()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(anchor: Anchor) -> (String, String) {
        let p = anchor.placement();
        (p.x, p.y)
    }

    #[test]
    fn test_corner_placements() {
        assert_eq!(xy(Anchor::TopLeft), ("10".into(), "10".into()));
        assert_eq!(
            xy(Anchor::TopRight),
            ("main_w-overlay_w-10".into(), "10".into())
        );
        assert_eq!(
            xy(Anchor::BottomLeft),
            ("10".into(), "main_h-overlay_h-10".into())
        );
        assert_eq!(
            xy(Anchor::BottomRight),
            ("main_w-overlay_w-10".into(), "main_h-overlay_h-10".into())
        );
    }

    #[test]
    fn test_center_is_midpoint() {
        assert_eq!(
            xy(Anchor::Center),
            ("(main_w-overlay_w)/2".into(), "(main_h-overlay_h)/2".into())
        );
    }

    #[test]
    fn test_names_round_trip() {
        for anchor in Anchor::ALL {
            assert_eq!(anchor.as_str().parse::<Anchor>().unwrap(), anchor);
        }
    }

    #[test]
    fn test_unknown_name_lists_legal_values() {
        let err = "middle".parse::<Anchor>().unwrap_err();
        assert!(err.is_validation());
        let msg = err.to_string();
        assert!(msg.contains("'middle'"));
        for anchor in Anchor::ALL {
            assert!(msg.contains(anchor.as_str()), "missing {anchor} in {msg}");
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!("Top-Left".parse::<Anchor>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_names() {
        let json = serde_json::to_string(&Anchor::BottomRight).unwrap();
        assert_eq!(json, "\"bottom-right\"");
    }
}
