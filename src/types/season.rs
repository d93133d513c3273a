//! Defines the `Season` enum and the fixed month groups averaged into each season.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A season of the seasonal-mean view.
///
/// Each season averages a fixed group of month columns from the wide table:
///
/// | Season  | Months               |
/// |---------|----------------------|
/// | Winter  | DEC, JAN, FEB        |
/// | Summer  | MAR, APR, MAY        |
/// | Monsoon | JUN, JUL, AUG, SEP   |
/// | Autumn  | OCT, NOV             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Summer,
    Monsoon,
    Autumn,
}

impl Season {
    /// All seasons in output order.
    pub const ALL: [Season; 4] = [
        Season::Winter,
        Season::Summer,
        Season::Monsoon,
        Season::Autumn,
    ];

    /// The month columns averaged into this season.
    pub fn months(self) -> &'static [&'static str] {
        match self {
            Season::Winter => &["DEC", "JAN", "FEB"],
            Season::Summer => &["MAR", "APR", "MAY"],
            Season::Monsoon => &["JUN", "JUL", "AUG", "SEP"],
            Season::Autumn => &["OCT", "NOV"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Summer => "Summer",
            Season::Monsoon => "Monsoon",
            Season::Autumn => "Autumn",
        }
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
