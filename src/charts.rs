use plotters::prelude::*;
use std::fs;
use std::path::Path;

use crate::comparison::Comparison;
use crate::policy::PolicyType;

const RATIO_NAMES: [&str; 3] = ["CTR", "conversion_given_token", "utilization_stock"];

fn policy_color(policy_type: PolicyType) -> RGBColor {
    match policy_type {
        PolicyType::RANDOM => BLUE,
        PolicyType::THOMPSON => RED,
    }
}

fn ensure_parent(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Grouped bar chart of the mean key ratios (CTR, conversion given token, stock utilization)
/// with one bar per policy in each group
pub fn render_policy_comparison(comparison: &Comparison, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let means: Vec<(PolicyType, [f64; 3])> = PolicyType::ALL
        .iter()
        .map(|&policy_type| {
            let m = comparison.mean(policy_type);
            (policy_type, [m.ctr, m.conversion_given_token, m.utilization_stock])
        })
        .collect();

    let max_value = means.iter().flat_map(|(_, values)| values.iter().copied()).fold(0.0, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.15 } else { 1.0 };

    ensure_parent(path)?;
    let root = BitMapBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Random vs Thompson: key ratios (mean over seeds)", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..2.5f64, 0.0f64..y_max)?;

    // Groups are centred on 0, 1, 2; any other tick stays unlabeled
    let group_label = |x: &f64| -> String {
        if (x - x.round()).abs() < 1e-9 && (0.0..=2.0).contains(x) {
            RATIO_NAMES[x.round() as usize].to_string()
        } else {
            String::new()
        }
    };

    chart.configure_mesh()
        .disable_x_mesh()
        .x_labels(3)
        .x_label_formatter(&group_label)
        .y_desc("Mean value")
        .draw()?;

    let bar_width = 0.8 / means.len() as f64;
    for (slot, (policy_type, values)) in means.iter().enumerate() {
        let color = policy_color(*policy_type);
        let bars: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(group, &value)| (group as f64 - 0.4 + slot as f64 * bar_width, value))
            .collect();

        chart.draw_series(bars.iter().map(|&(x0, value)| {
            Rectangle::new([(x0, 0.0), (x0 + bar_width * 0.9, value)], color.filled())
        }))?
        .label(policy_type.name())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        chart.draw_series(bars.iter().map(|&(x0, value)| {
            Text::new(format!("{:.3}", value), (x0, value + y_max * 0.01), ("sans-serif", 14).into_font())
        }))?;
    }

    chart.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// CTR of every seed, one line per policy
pub fn render_ctr_per_seed(comparison: &Comparison, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let seeds: Vec<u64> = comparison.results
        .values()
        .flat_map(|per_seed| per_seed.keys().copied())
        .collect();
    let (Some(&min_seed), Some(&max_seed)) = (seeds.iter().min(), seeds.iter().max()) else {
        return Err("Cannot chart CTR per seed: comparison is empty".into());
    };

    let max_ctr = comparison.results
        .values()
        .flat_map(|per_seed| per_seed.values().map(|m| m.ctr))
        .fold(0.0, f64::max);
    let y_max = if max_ctr > 0.0 { max_ctr * 1.15 } else { 1.0 };

    ensure_parent(path)?;
    let root = BitMapBackend::new(path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("CTR per seed", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(min_seed as f64 - 0.5..max_seed as f64 + 0.5, 0.0f64..y_max)?;

    chart.configure_mesh()
        .x_desc("Seed")
        .y_desc("CTR")
        .draw()?;

    for policy_type in PolicyType::ALL {
        let Some(per_seed) = comparison.policy_results(policy_type) else {
            continue;
        };
        let color = policy_color(policy_type);
        let points: Vec<(f64, f64)> = per_seed.iter().map(|(&seed, m)| (seed as f64, m.ctr)).collect();

        chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(policy_type.name())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(points.iter().map(|&point| Circle::new(point, 3, color.filled())))?;
    }

    chart.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::{compare, Seeds};

    #[test]
    fn test_ctr_chart_needs_at_least_one_run() {
        let path = std::env::temp_dir().join(format!("dropsim_charts_{}", std::process::id())).join("ctr.png");
        let result = render_ctr_per_seed(&Comparison::default(), &path);
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_charts_are_written_as_png() {
        let dir = std::env::temp_dir().join(format!("dropsim_charts_render_{}", std::process::id()));
        let comparison = compare(200, 300, 3, Seeds::Range(0..3)).unwrap();

        let bars = dir.join("nested").join("policy_comparison.png");
        render_policy_comparison(&comparison, &bars).unwrap();
        let ctr = dir.join("ctr_per_seed.png");
        render_ctr_per_seed(&comparison, &ctr).unwrap();

        for path in [&bars, &ctr] {
            let bytes = fs::read(path).unwrap();
            assert_eq!(&bytes[..4], b"\x89PNG");
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_policy_colors_differ() {
        assert_ne!(policy_color(PolicyType::RANDOM), policy_color(PolicyType::THOMPSON));
    }
}
