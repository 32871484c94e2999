use crate::chart::scalable::Scalable;

const DEFAULT_WIDTH: usize = 40;

/// Horizontal bar chart, one labelled bar per entry.
/// Bars are scaled against the largest absolute value; negative values use a lighter fill.
pub struct BarChart<'a> {
    bars: &'a [(String, Option<f64>)],
    width: Option<usize>,
    unit: Option<&'a str>,
}

impl<'a> BarChart<'a> {
    pub fn new(bars: &'a [(String, Option<f64>)]) -> BarChart<'a> {
        BarChart {
            bars,
            width: None,
            unit: None,
        }
    }

    /// longest bar, in characters
    pub fn set_width(mut self, width: usize) -> BarChart<'a> {
        self.width = Some(width);
        self
    }

    /// suffix printed after each value
    pub fn set_unit(mut self, unit: &'a str) -> BarChart<'a> {
        self.unit = Some(unit);
        self
    }

    pub fn render(&self) -> String {
        let width = self.width.unwrap_or(DEFAULT_WIDTH);
        let unit = self.unit.unwrap_or("");
        let label_width = self.bars.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
        let max_abs = self
            .bars
            .iter()
            .filter_map(|(_, value)| value.map(f64::abs))
            .fold(0.0, f64::max);

        let mut out = String::new();
        for (label, value) in self.bars {
            let (bar, text) = match value {
                Some(v) => {
                    let mut len = v.abs().scale_between_ranges(&(0.0..max_abs), &(0.0..width as f64)).round() as usize;
                    if len == 0 && *v != 0.0 {
                        len = 1;
                    }
                    let fill = if *v < 0.0 { "▒" } else { "█" };
                    (fill.repeat(len), format!("{:.1}{}", v, unit))
                }
                None => (String::new(), "N/A".to_string()),
            };
            out.push_str(&format!("{:<label_width$} │{} {}\n", label, bar, text, label_width = label_width));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(values: &[(&str, Option<f64>)]) -> Vec<(String, Option<f64>)> {
        values.iter().map(|(label, value)| (label.to_string(), *value)).collect()
    }

    #[test]
    fn test_bars_scale_to_largest_value() {
        let data = bars(&[("Karachi", Some(30.0)), ("London", Some(15.0))]);
        let rendered = BarChart::new(&data).set_width(10).set_unit("°C").render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], format!("Karachi │{} 30.0°C", "█".repeat(10)));
        assert_eq!(lines[1], format!("London  │{} 15.0°C", "█".repeat(5)));
    }

    #[test]
    fn test_negative_and_missing_values() {
        let data = bars(&[("Oslo", Some(-4.0)), ("Nowhere", None), ("Cairo", Some(8.0))]);
        let rendered = BarChart::new(&data).set_width(8).render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], format!("Oslo    │{} -4.0", "▒".repeat(4)));
        assert_eq!(lines[1], "Nowhere │ N/A");
        assert_eq!(lines[2], format!("Cairo   │{} 8.0", "█".repeat(8)));
    }

    #[test]
    fn test_all_zero_values_draw_no_bars() {
        let data = bars(&[("Reykjavik", Some(0.0))]);
        assert_eq!(BarChart::new(&data).set_width(8).render(), "Reykjavik │ 0.0\n");
    }
}
