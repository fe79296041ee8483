// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const TOP_LEFT: &str = "top_left";
pub const TOP_RIGHT: &str = "top_right";
pub const BOTTOM_LEFT: &str = "bottom_left";
pub const BOTTOM_RIGHT: &str = "bottom_right";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

impl HAlign {
    /// Justification implied by a position label.
    pub fn for_label(label: &str) -> HAlign {
        if label.contains("right") {
            HAlign::Right
        } else if label.contains("left") {
            HAlign::Left
        } else {
            HAlign::Center
        }
    }
}

/// Relative (axes fraction) coordinates of each position label.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Positions(pub BTreeMap<String, (f64, f64)>);

impl Default for Positions {
    fn default() -> Self {
        let mut m = BTreeMap::new();
        m.insert(TOP_LEFT.to_string(), (0.05, 0.90));
        m.insert(TOP_RIGHT.to_string(), (0.95, 0.90));
        m.insert(BOTTOM_LEFT.to_string(), (0.05, 0.10));
        m.insert(BOTTOM_RIGHT.to_string(), (0.95, 0.10));
        Positions(m)
    }
}

impl Positions {
    pub fn get(&self, label: &str) -> Option<(f64, f64)> {
        self.0.get(label).copied()
    }
}

/// Text shown in each cell, keyed by (column, row) and then by
/// position label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotations {
    cells: HashMap<(String, String), Vec<(String, String)>>,
}

impl Annotations {
    pub fn insert(&mut self, column: &str, row: &str, label: &str, text: String) {
        let cell = self
            .cells
            .entry((column.to_string(), row.to_string()))
            .or_insert_with(Vec::new);
        match cell.iter_mut().find(|(l, _)| l == label) {
            Some(entry) => entry.1 = text,
            None => cell.push((label.to_string(), text)),
        }
    }

    pub fn get(&self, column: &str, row: &str) -> Option<&[(String, String)]> {
        self.cells
            .get(&(column.to_string(), row.to_string()))
            .map(|v| v.as_slice())
    }

    /// Labels for a figure of one flyby angle, columns being times and
    /// rows inclinations.
    pub fn build(
        style: &AnnotationStyle,
        angle: &str,
        times: &[String],
        inclinations: &[String],
    ) -> Annotations {
        let mut r = Annotations::default();
        match style {
            AnnotationStyle::PerCell {
                time_origin,
                years_per_unit,
            } => {
                for time in times {
                    for inc in inclinations {
                        let t = match time.trim().parse::<f64>() {
                            Ok(t) => format!(
                                "t = {:.0} yr",
                                (t - time_origin) * years_per_unit
                            ),
                            Err(_) => format!("t = {}", time),
                        };
                        r.insert(time, inc, TOP_LEFT, t);
                        r.insert(
                            time,
                            inc,
                            TOP_RIGHT,
                            format!(
                                "i = {}°, β = {}°",
                                as_integer(inc),
                                as_integer(angle)
                            ),
                        );
                    }
                }
            }
            AnnotationStyle::Margins => {
                for (ti, time) in times.iter().enumerate() {
                    for (ii, inc) in inclinations.iter().enumerate() {
                        if ii == 0 {
                            r.insert(time, inc, TOP_RIGHT, format!("t = {}", time));
                        }
                        if ti == 0 {
                            r.insert(time, inc, TOP_LEFT, format!("i = {}°", inc));
                        }
                    }
                }
            }
        }
        r
    }
}

/// `"00"` -> `"0"`; labels that are not numbers are kept.
fn as_integer(label: &str) -> String {
    match label.trim().parse::<f64>() {
        Ok(x) => format!("{:.0}", x),
        Err(_) => label.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStyle {
    /// Elapsed time and both angles in every cell.
    PerCell {
        time_origin: f64,
        years_per_unit: f64,
    },
    /// Time along the first row, inclination down the first column.
    Margins,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        AnnotationStyle::PerCell {
            time_origin: 100.0,
            years_per_unit: 55.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn per_cell_text() {
        let a = Annotations::build(
            &AnnotationStyle::default(),
            "45",
            &labels(&["100", "110"]),
            &labels(&["00", "90"]),
        );
        let cell = a.get("110", "90").unwrap();
        assert_eq!(cell.len(), 2);
        assert_eq!(cell[0], (TOP_LEFT.to_string(), "t = 550 yr".to_string()));
        assert_eq!(cell[1].1, "i = 90°, β = 45°");
        assert_eq!(a.get("100", "00").unwrap()[0].1, "t = 0 yr");
    }

    #[test]
    fn margin_text_only_on_first_row_and_column() {
        let a = Annotations::build(
            &AnnotationStyle::Margins,
            "45",
            &labels(&["100", "110"]),
            &labels(&["00", "90"]),
        );
        assert_eq!(a.get("100", "00").unwrap().len(), 2);
        assert_eq!(a.get("110", "00").unwrap(), &[(TOP_RIGHT.to_string(), "t = 110".to_string())]);
        assert_eq!(a.get("100", "90").unwrap(), &[(TOP_LEFT.to_string(), "i = 90°".to_string())]);
        assert!(a.get("110", "90").is_none());
    }

    #[test]
    fn alignment_follows_label() {
        assert_eq!(HAlign::for_label(TOP_LEFT), HAlign::Left);
        assert_eq!(HAlign::for_label(BOTTOM_RIGHT), HAlign::Right);
        assert_eq!(HAlign::for_label("middle"), HAlign::Center);
        assert_eq!(Positions::default().get(TOP_RIGHT), Some((0.95, 0.90)));
    }
}
