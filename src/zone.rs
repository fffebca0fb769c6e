//! Screen-corner zones and the stacking geometry inside them.
//!
//! Every zone is laid out on its own: a notification's slot depends only on
//! the parent size and on the notifications stacked before it in that zone.

use crate::error::ToastError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance the off-screen start/end point sits past the parent edge
const OFF_SCREEN_PAD: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Direction a zone's stack grows away from its anchor corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Zone {
    pub const ALL: [Zone; 4] = [
        Zone::TopLeft,
        Zone::TopRight,
        Zone::BottomLeft,
        Zone::BottomRight,
    ];

    pub fn anchor(self) -> Corner {
        match self {
            Zone::TopLeft => Corner::TopLeft,
            Zone::TopRight => Corner::TopRight,
            Zone::BottomLeft => Corner::BottomLeft,
            Zone::BottomRight => Corner::BottomRight,
        }
    }

    pub fn growth(self) -> Growth {
        match self {
            Zone::TopLeft | Zone::TopRight => Growth::Down,
            Zone::BottomLeft | Zone::BottomRight => Growth::Up,
        }
    }

    pub fn is_right(self) -> bool {
        matches!(self, Zone::TopRight | Zone::BottomRight)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::TopLeft => "top-left",
            Zone::TopRight => "top-right",
            Zone::BottomLeft => "bottom-left",
            Zone::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = ToastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        Zone::ALL
            .into_iter()
            .find(|z| z.as_str() == norm)
            .ok_or_else(|| ToastError::InvalidParameter(format!("unknown zone {s:?}")))
    }
}

/// Computes stack slots for the notifications of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneLayout {
    /// Distance from the parent edges
    pub margin: i32,
    /// Gap between stacked notifications
    pub spacing: i32,
}

impl Default for ZoneLayout {
    fn default() -> Self {
        Self {
            margin: 15,
            spacing: 10,
        }
    }
}

impl ZoneLayout {
    pub fn new(margin: i32, spacing: i32) -> Self {
        Self { margin, spacing }
    }

    /// Target offsets for `sizes`, given in stacking order (oldest first).
    pub fn slots(&self, zone: Zone, parent: Size, sizes: &[Size]) -> Vec<Point> {
        let mut cumulative = 0;
        sizes
            .iter()
            .map(|size| {
                let at = self.slot(zone, parent, *size, cumulative);
                cumulative += size.height + self.spacing;
                at
            })
            .collect()
    }

    fn slot(&self, zone: Zone, parent: Size, size: Size, cumulative: i32) -> Point {
        let x = if zone.is_right() {
            parent.width - size.width - self.margin
        } else {
            self.margin
        };
        let y = match zone.growth() {
            Growth::Down => self.margin + cumulative,
            Growth::Up => parent.height - self.margin - size.height - cumulative,
        };
        Point::new(x, y)
    }

    /// Point beside the anchor edge where a notification slides in from and out to.
    pub fn off_screen(&self, zone: Zone, parent: Size, width: i32, at: Point) -> Point {
        if zone.is_right() {
            Point::new(parent.width + OFF_SCREEN_PAD, at.y)
        } else {
            Point::new(-width - OFF_SCREEN_PAD, at.y)
        }
    }
}
