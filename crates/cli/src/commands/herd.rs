//! Herd prediction command

use anyhow::{Context, Result};
use std::path::Path;
use tabled::Tabled;

use crate::client::{ApiClient, HerdFile, HerdRequest};
use crate::output::{
    color_accuracy, format_liters, print_json, print_rows, print_warning, OutputFormat,
};

/// Row for herd prediction table
#[derive(Tabled)]
struct HerdRow {
    #[tabled(rename = "Cow")]
    cow_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Accuracy")]
    accuracy: String,
}

/// Read a herd description (cows, records, actuals) from a JSON file
pub fn read_herd_file(path: &Path) -> Result<HerdFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read herd file {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse herd file")
}

/// Predict every milking cow of a herd through the service
pub async fn predict_herd(
    client: &ApiClient,
    file: &Path,
    model_id: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let herd = read_herd_file(file)?;
    let request = HerdRequest { model_id, herd };
    let result = client.predict_herd(&request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.entries.is_empty() {
                print_warning("No active milking cows in herd");
                return Ok(());
            }

            let cows = result.entries.len();
            let rows: Vec<HerdRow> = result
                .entries
                .into_iter()
                .map(|e| HerdRow {
                    cow_id: e.cow_id,
                    name: e.cow_name,
                    predicted: format_liters(e.prediction),
                    actual: e.actual.map(format_liters).unwrap_or_else(|| "-".to_string()),
                    accuracy: color_accuracy(e.accuracy),
                })
                .collect();
            print_rows(rows);

            println!(
                "\nModel: {}  Total: {} across {} cows",
                result.model_id,
                format_liters(result.total_prediction),
                cows
            );
            if let Some(record) = result.records.first() {
                println!("Prediction date: {}", record.prediction_date);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_herd_file_defaults_optional_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cows":[{{"id":"c1","name":"Daisy","breed":"Holstein","weight_kg":560,
                "age_months":44,"lactation_days":90,"avg_production":21.0,
                "status":"active","milking_status":true}}]}}"#
        )
        .unwrap();

        let herd = read_herd_file(file.path()).unwrap();
        assert_eq!(herd.cows.len(), 1);
        assert!(herd.records.is_empty());
        assert!(herd.actuals.is_empty());
    }

    #[test]
    fn test_read_missing_herd_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_herd_file(&dir.path().join("herd.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read herd file"));
    }
}
