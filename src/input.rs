//! Business List Input
//!
//! Reads the businesses to process from CSV or JSON files:
//! - CSV with a header row (`nom`/`name` column, optional siret, address,
//!   postal code, city and activity columns)
//! - CSV without a header: one business name per line
//! - JSON arrays of names or record objects, or an object wrapping the
//!   list under `entreprises` or `businesses`
//!
//! Rows without a usable name are skipped. An empty result after parsing is
//! an error: a batch needs at least one record.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::record::BusinessRecord;

/// Input format for business list files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Some(Self::Csv),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Load a business list from a file, auto-detecting the format.
///
/// Fails when the extension is unknown, the file cannot be read or parsed,
/// or no usable record is left after parsing.
pub fn load_business_file(path: &Path) -> Result<Vec<BusinessRecord>> {
    let format = InputFormat::from_path(path).with_context(|| {
        format!(
            "cannot determine input format from file extension, expected .csv or .json: {}",
            path.display()
        )
    })?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read input file: {}", path.display()))?;

    let businesses = match format {
        InputFormat::Csv => parse_csv_businesses(&content)?,
        InputFormat::Json => parse_json_businesses(&content)?,
    };

    if businesses.is_empty() {
        bail!("no businesses found in {}", path.display());
    }

    Ok(businesses)
}

/// Parse businesses from CSV content.
///
/// A first line containing a `nom` or `name` column switches to header
/// mode; otherwise every line's first comma-separated field is taken as a
/// business name. `#` lines and blank lines are skipped either way.
pub fn parse_csv_businesses(content: &str) -> Result<Vec<BusinessRecord>> {
    let mut businesses = Vec::new();
    let Some(first_line) = content.lines().next() else {
        return Ok(businesses);
    };

    let has_header = first_line
        .to_lowercase()
        .split(',')
        .any(|field| matches!(field.trim(), "nom" | "name"));

    if has_header {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers().context("failed to read CSV headers")?.clone();
        let position = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };

        let name_idx = position(&["nom", "name"])
            .context("CSV header row must have a 'nom' or 'name' column")?;
        let siret_idx = position(&["siret"]);
        let address_idx = position(&["adresse", "address"]);
        let postal_idx = position(&["code_postal", "postal_code"]);
        let city_idx = position(&["ville", "city"]);
        let activity_idx = position(&["activite", "activity", "activity_code"]);

        for row in reader.records() {
            let row = row.context("failed to parse CSV record")?;
            let field = |idx: Option<usize>| {
                idx.and_then(|i| row.get(i))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            };

            let Some(name) = field(Some(name_idx)) else {
                debug!("skipping CSV row without a name");
                continue;
            };

            businesses.push(BusinessRecord {
                name,
                siret: field(siret_idx),
                address: field(address_idx),
                postal_code: field(postal_idx),
                city: field(city_idx),
                activity_code: field(activity_idx),
            });
        }
    } else {
        for line in content.lines() {
            let name = line.split(',').next().unwrap_or(line).trim();
            if name.is_empty() || name.starts_with('#') {
                continue;
            }
            businesses.push(BusinessRecord::named(name));
        }
    }

    Ok(businesses)
}

/// Parse businesses from JSON content.
///
/// Accepts an array of name strings, an array of record objects (French
/// field aliases included), a mix of the two, or an object carrying the
/// array under `entreprises` or `businesses`.
pub fn parse_json_businesses(content: &str) -> Result<Vec<BusinessRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("failed to parse JSON content")?;

    let entries = match &value {
        serde_json::Value::Array(items) => parse_json_array(items),

        serde_json::Value::Object(obj) => {
            let list = obj.get("entreprises").or_else(|| obj.get("businesses"));
            match list {
                Some(serde_json::Value::Array(items)) => parse_json_array(items),
                Some(_) => bail!("'entreprises' field must be an array"),
                None => bail!("JSON object must carry an 'entreprises' or 'businesses' array"),
            }
        }

        _ => bail!("JSON must be an array of businesses or an object wrapping one"),
    };

    Ok(entries)
}

fn parse_json_array(items: &[serde_json::Value]) -> Vec<BusinessRecord> {
    let mut entries = Vec::new();

    for item in items {
        match item {
            serde_json::Value::String(name) => {
                let name = name.trim();
                if !name.is_empty() {
                    entries.push(BusinessRecord::named(name));
                }
            }

            serde_json::Value::Object(_) => {
                match serde_json::from_value::<BusinessRecord>(item.clone()) {
                    Ok(record) if !record.name.trim().is_empty() => entries.push(record),
                    Ok(_) => debug!("skipping JSON record with an empty name"),
                    Err(err) => debug!(error = %err, "skipping malformed JSON record"),
                }
            }

            _ => {
                // Numbers, nulls and the like carry no business.
            }
        }
    }

    entries
}
