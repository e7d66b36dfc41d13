//! Result Export
//!
//! Writes enrichment results as CSV (spreadsheet-friendly, French column
//! headers, UTF-8 BOM so Excel picks up accents) or JSON (summary plus the
//! full record list). Also prints the end-of-run summary block.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use csv::Writer;
use tracing::{debug, info};

use crate::batch::{BatchReport, BatchSummary};
use crate::record::EnrichedRecord;

/// Byte order mark so spreadsheet tools decode the file as UTF-8.
const UTF8_BOM: &str = "\u{FEFF}";

const BASE_HEADERS: [&str; 8] = [
    "Nom",
    "SIRET",
    "Adresse",
    "Code Postal",
    "Ville",
    "Activité",
    "A un site web",
    "URL du site",
];

const DETAIL_HEADERS: [&str; 3] = ["Téléphone", "Note", "Nombre d'avis"];

/// Default output filename carrying the current local timestamp,
/// e.g. `prospection_20260822_143005.csv`.
pub fn default_output_path(extension: &str) -> String {
    format!(
        "prospection_{}.{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}

pub fn export_csv(records: &[EnrichedRecord], output_path: &Path) -> Result<()> {
    debug!("Exporting {} records to CSV: {}", records.len(), output_path.display());

    let file = File::create(output_path)?;
    write_csv(records, file)?;

    info!("Exported {} records to CSV: {}", records.len(), output_path.display());
    Ok(())
}

/// Write the CSV document to any writer.
///
/// Contact detail columns are only emitted when at least one record carries
/// a phone number or a rating, so plain site-check exports stay at the base
/// eight columns.
pub fn write_csv<W: Write>(records: &[EnrichedRecord], mut writer: W) -> Result<()> {
    writer.write_all(UTF8_BOM.as_bytes())?;
    let mut wtr = Writer::from_writer(writer);

    let with_details = records
        .iter()
        .any(|r| r.phone.is_some() || r.rating.is_some());

    let mut headers: Vec<&str> = BASE_HEADERS.to_vec();
    if with_details {
        headers.extend(DETAIL_HEADERS);
    }
    wtr.write_record(&headers)?;

    for record in records {
        let business = &record.business;
        let mut row = vec![
            business.name.clone(),
            business.siret.clone().unwrap_or_default(),
            business.address.clone().unwrap_or_default(),
            business.postal_code.clone().unwrap_or_default(),
            business.city.clone().unwrap_or_default(),
            business.activity_code.clone().unwrap_or_default(),
            if record.has_website { "Oui" } else { "Non" }.to_string(),
            record.website_url.clone().unwrap_or_default(),
        ];

        if with_details {
            row.push(record.phone.clone().unwrap_or_default());
            row.push(record.rating.map(|r| format!("{r:.1}")).unwrap_or_default());
            row.push(if record.rating.is_some() || record.review_count > 0 {
                record.review_count.to_string()
            } else {
                String::new()
            });
        }

        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_json(report: &BatchReport, output_path: &Path) -> Result<()> {
    debug!(
        "Exporting {} records to JSON: {}",
        report.records.len(),
        output_path.display()
    );

    let mut file = File::create(output_path)?;
    write_json(report, &mut file)?;

    info!(
        "Exported {} records to JSON: {}",
        report.records.len(),
        output_path.display()
    );
    Ok(())
}

/// Write the JSON document: run summary plus the full record list, under a
/// `businesses` key the input parser also understands.
pub fn write_json<W: Write>(report: &BatchReport, writer: &mut W) -> Result<()> {
    let json_output = JsonExport {
        summary: &report.summary,
        businesses: &report.records,
    };

    let json_string = serde_json::to_string_pretty(&json_output)?;
    writer.write_all(json_string.as_bytes())?;
    Ok(())
}

#[derive(serde::Serialize)]
struct JsonExport<'a> {
    summary: &'a BatchSummary,
    businesses: &'a [EnrichedRecord],
}

pub fn print_batch_summary(summary: &BatchSummary) {
    if summary.total == 0 {
        println!("No businesses processed.");
        return;
    }

    let prospect_share = summary.without_site as f64 / summary.total as f64 * 100.0;

    println!("\n=== Prospection Summary ===");
    println!("Businesses processed: {}", summary.total);
    println!("With a website: {}", summary.with_site);
    println!(
        "Without a website: {} ({:.0}% prospects)",
        summary.without_site, prospect_share
    );

    if summary.via_places > 0 {
        println!("Enriched via the places API: {}", summary.via_places);
    }
    if summary.errors > 0 {
        println!("Failed lookups: {}", summary.errors);
    }

    println!("Completed in {:.1}s", summary.duration_secs);
    println!("===========================\n");
}
