//! Terminal visualization of simulation output
//!
//! Renders an ASCII histogram of retained samples and a one-line range bar
//! showing where the sampled range sits relative to the tolerance band.

use console::style;

use crate::cli::helpers::format_value;
use crate::entities::ToleranceBand;

const BAR_MAX_WIDTH: usize = 50;
const RANGE_BAR_WIDTH: usize = 60;

/// Render an ASCII histogram of `samples`.
///
/// With a tolerance band the view is widened to include the band (plus a
/// 10% margin), in-band bins are drawn solid and out-of-band bins shaded.
pub fn render_histogram(samples: &[f64], bins: usize, band: Option<&ToleranceBand>) -> String {
    if samples.is_empty() {
        return String::new();
    }
    let bins = bins.max(1);

    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let (mut range_min, mut range_max) = (min, max);
    if let Some(band) = band {
        let margin = (band.upper - band.lower) * 0.1;
        range_min = range_min.min(band.lower - margin);
        range_max = range_max.max(band.upper + margin);
    }
    let range = range_max - range_min;

    let mut out = format!(
        "   {} ({} samples, {} bins):\n\n",
        style("Distribution Histogram").bold(),
        samples.len(),
        bins
    );

    if range <= 0.0 {
        // Every sample identical and no band to widen the view
        out.push_str(&format!(
            "   {:>10} │{}│ {:>5}\n",
            format_value(min),
            style("█".repeat(BAR_MAX_WIDTH)).green(),
            samples.len()
        ));
        return out;
    }

    let bin_width = range / bins as f64;
    let bin_of = |value: f64| (((value - range_min) / bin_width) as usize).min(bins - 1);

    let mut counts: Vec<usize> = vec![0; bins];
    for &sample in samples {
        counts[bin_of(sample)] += 1;
    }
    let max_count = counts.iter().copied().max().unwrap_or(1).max(1);

    let lower_bin = band.map(|b| bin_of(b.lower));
    let upper_bin = band.map(|b| bin_of(b.upper));

    for (i, &count) in counts.iter().enumerate() {
        let bar_width = (count as f64 / max_count as f64 * BAR_MAX_WIDTH as f64) as usize;
        let bin_center = range_min + (i as f64 + 0.5) * bin_width;
        let in_band = band.map_or(true, |b| b.contains(bin_center));

        let bar = if in_band {
            style("█".repeat(bar_width)).green()
        } else {
            style("░".repeat(bar_width)).red()
        };
        let pad = " ".repeat(BAR_MAX_WIDTH - bar_width);

        let marker = match (lower_bin == Some(i), upper_bin == Some(i)) {
            (true, true) => " ◄LOWER/UPPER",
            (true, false) => " ◄LOWER",
            (false, true) => " ◄UPPER",
            (false, false) => "",
        };

        out.push_str(&format!(
            "   {:>10} │{}{}│ {:>5}{}\n",
            format_value(bin_center),
            bar,
            pad,
            count,
            style(marker).cyan()
        ));
    }

    out.push_str(&format!("   {:>10} └{}┘\n", "", "─".repeat(BAR_MAX_WIDTH)));
    if let Some(band) = band {
        out.push_str(&format!(
            "   {} lower={}  upper={}  (█ in band, ░ out of band)\n",
            style("Legend:").dim(),
            format_value(band.lower),
            format_value(band.upper)
        ));
    }
    out
}

/// Render the sampled range against the tolerance band on one line
pub fn render_range_bar(min: f64, max: f64, band: &ToleranceBand) -> String {
    let width = band.upper - band.lower;
    let margin = width * 0.1;
    let view_min = band.lower.min(min) - margin;
    let view_max = band.upper.max(max) + margin;
    let view_range = view_max - view_min;

    if view_range <= 0.0 {
        return format!(
            "  lower={}  upper={}\n  Min={}  Max={}",
            format_value(band.lower),
            format_value(band.upper),
            format_value(min),
            format_value(max)
        );
    }

    let position = |value: f64| {
        let pos = ((value - view_min) / view_range * RANGE_BAR_WIDTH as f64) as usize;
        pos.min(RANGE_BAR_WIDTH - 1)
    };
    let pos_lower = position(band.lower);
    let pos_upper = position(band.upper);
    let pos_min = position(min);
    let pos_max = position(max);

    let mut bar: Vec<char> = vec!['─'; RANGE_BAR_WIDTH];
    bar[pos_lower] = '│';
    bar[pos_upper] = '│';

    for cell in bar.iter_mut().take(pos_max + 1).skip(pos_min) {
        *cell = if *cell == '│' { '╋' } else { '═' };
    }
    bar[pos_min] = if bar[pos_min] == '╋' { '╟' } else { '[' };
    bar[pos_max] = if bar[pos_max] == '╋' { '╢' } else { ']' };

    let bar: String = bar.into_iter().collect();
    format!(
        "  lower={}  upper={}\n  {}\n  Min={}  Max={}",
        format_value(band.lower),
        format_value(band.upper),
        bar,
        format_value(min),
        format_value(max)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_counts(text: &str) -> Vec<usize> {
        text.lines()
            .filter(|line| line.matches('│').count() == 2)
            .filter_map(|line| {
                let tail = line.rsplit('│').next()?;
                tail.split_whitespace().next()?.parse().ok()
            })
            .collect()
    }

    #[test]
    fn test_histogram_counts_every_sample() {
        console::set_colors_enabled(false);
        let samples: Vec<f64> = (0..1000).map(|i| f64::from(i) / 100.0).collect();
        let text = render_histogram(&samples, 20, None);
        let counts = bar_counts(&text);
        assert_eq!(counts.len(), 20);
        assert_eq!(counts.iter().sum::<usize>(), 1000);
        assert!(text.contains("1000 samples, 20 bins"));
        assert!(!text.contains("Legend"));
    }

    #[test]
    fn test_histogram_marks_band() {
        console::set_colors_enabled(false);
        let samples: Vec<f64> = (0..500).map(|i| 5.0 + f64::from(i) / 100.0).collect();
        let band = ToleranceBand::new(6.0, 8.0);
        let text = render_histogram(&samples, 30, Some(&band));
        assert!(text.contains("◄LOWER"));
        assert!(text.contains("◄UPPER"));
        assert!(text.contains("░"));
        assert!(text.contains("Legend:"));
        assert_eq!(bar_counts(&text).iter().sum::<usize>(), 500);
    }

    #[test]
    fn test_histogram_constant_samples() {
        console::set_colors_enabled(false);
        let text = render_histogram(&[2.5; 10], 40, None);
        assert!(text.contains("2.5"));
        assert_eq!(bar_counts(&text), vec![10]);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(render_histogram(&[], 10, None).is_empty());
    }

    #[test]
    fn test_range_bar() {
        let band = ToleranceBand::new(6.0, 8.0);
        let text = render_range_bar(5.0, 10.0, &band);
        assert!(text.contains("lower=6  upper=8"));
        assert!(text.contains("Min=5  Max=10"));
        assert!(text.contains('['));
        assert!(text.contains(']'));
    }
}
