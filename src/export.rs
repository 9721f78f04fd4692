use std::fs::{File, create_dir_all};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::comparison::Comparison;

/// Write one CSV row per (seed, policy): seed, policy, then the RunMetrics fields
/// Ratios are written with full precision so rows can be compared bit for bit
pub fn write_csv<W: Write>(comparison: &Comparison, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", Comparison::header().join(","))?;
    for row in comparison.rows() {
        let m = &row.metrics;
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            row.seed, row.policy, m.views, m.tokens, m.redemptions, m.ctr, m.conversion_given_token, m.utilization_stock
        )?;
    }
    Ok(())
}

/// Write the CSV export to `path`, creating parent directories if needed
pub fn write_csv_file(comparison: &Comparison, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv(comparison, &mut writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulationrun::RunMetrics;

    #[test]
    fn test_csv_header_and_row_order() {
        let mut comparison = Comparison::default();
        comparison.results.entry("thompson".to_string()).or_default()
            .insert(1, RunMetrics::from_counts(8, 2, 2, 2, 16));
        comparison.results.entry("random".to_string()).or_default()
            .insert(1, RunMetrics::from_counts(4, 1, 1, 1, 16));
        comparison.results.entry("random".to_string()).or_default()
            .insert(0, RunMetrics::default());

        let mut out = Vec::new();
        write_csv(&comparison, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "seed,policy,views,tokens,redemptions,CTR,conversion_given_token,utilization_stock");
        assert_eq!(lines[1], "0,random,0,0,0,0,0,0");
        assert_eq!(lines[2], "1,random,4,1,1,0.25,1,0.0625");
        assert_eq!(lines[3], "1,thompson,8,2,2,0.25,1,0.125");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_file_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("dropsim_export_{}", std::process::id()));
        let path = dir.join("nested").join("runs.csv");
        let mut comparison = Comparison::default();
        comparison.results.entry("random".to_string()).or_default().insert(3, RunMetrics::default());

        write_csv_file(&comparison, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("3,random,0,0,0,0,0,0\n"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
