//! Incident CSV loader.
//!
//! Columns are matched by header name (trimmed, case-insensitive) against a
//! short alias list, so both the canonical names and the names used by the
//! NYC collision extract are accepted. Unknown columns are ignored.

use std::io::Read;

use crash_map_incident_models::IncidentRecord;

use crate::SourceError;
use crate::parsing::{clean_text, parse_bounded_u8, parse_lat_lng_str, parse_severity};

const ID: &[&str] = &["id", "collision_id"];
const LATITUDE: &[&str] = &["latitude", "lat"];
const LONGITUDE: &[&str] = &["longitude", "lon", "lng"];
const REGION: &[&str] = &["region", "borough"];
const POSTAL_CODE: &[&str] = &["postal_code", "zip_code", "zip"];
const HOUR: &[&str] = &["hour_of_day", "hour"];
const DAY: &[&str] = &["day_of_week", "weekday"];
const SEVERITY: &[&str] = &["severity"];

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct Columns {
    id: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    region: Option<usize>,
    postal_code: Option<usize>,
    hour: Option<usize>,
    day: Option<usize>,
    severity: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| names.iter().position(|name| name == alias))
        };

        Self {
            id: find(ID),
            latitude: find(LATITUDE),
            longitude: find(LONGITUDE),
            region: find(REGION),
            postal_code: find(POSTAL_CODE),
            hour: find(HOUR),
            day: find(DAY),
            severity: find(SEVERITY),
        }
    }
}

fn field(record: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column.and_then(|i| record.get(i))
}

/// Reads incident records from CSV text with a header row.
///
/// Rows missing an identifier get a positional one (`row-<n>`, 1-based).
///
/// # Errors
///
/// Returns [`SourceError::Csv`] if the CSV itself cannot be read and
/// [`SourceError::Malformed`] if the header row is empty.
pub fn read_incidents<R: Read>(reader: R) -> Result<Vec<IncidentRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(SourceError::Malformed {
            message: "incident CSV contains no header row".to_string(),
        });
    }

    let columns = Columns::resolve(&headers);
    if columns.latitude.is_none() || columns.longitude.is_none() {
        log::warn!(
            "Incident CSV has no latitude/longitude columns; every record will be unprojectable"
        );
    }

    let mut records = Vec::new();
    let mut missing_position = 0_usize;

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        let id = clean_text(field(&record, columns.id))
            .unwrap_or_else(|| format!("row-{}", row + 1));
        let position = parse_lat_lng_str(
            field(&record, columns.latitude),
            field(&record, columns.longitude),
        );
        if position.is_none() {
            missing_position += 1;
        }

        records.push(IncidentRecord {
            id,
            position,
            severity: parse_severity(field(&record, columns.severity)),
            region: clean_text(field(&record, columns.region)),
            postal_code: clean_text(field(&record, columns.postal_code)),
            hour_of_day: parse_bounded_u8(field(&record, columns.hour), 23),
            day_of_week: parse_bounded_u8(field(&record, columns.day), 6),
        });
    }

    log::debug!(
        "Parsed {} incident rows ({missing_position} without a usable position)",
        records.len()
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use crash_map_incident_models::Severity;

    use super::*;

    const CSV: &str = "\
collision_id,latitude,longitude,borough,zip_code,hour,weekday,severity
4455765,40.667202,-73.8665,BROOKLYN,11208,9,2,injury
4513547,,,QUEENS,,23,6,fatal
4541903,40.68358,-73.97617,,11238,,,
4456314,abc,-73.9,MANHATTAN,10001,25,9,pdo
";

    #[test]
    fn reads_nyc_style_columns() {
        let records = read_incidents(CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 4);

        let first = &records[0];
        assert_eq!(first.id, "4455765");
        assert_eq!(first.severity, Severity::Injury);
        assert_eq!(first.region.as_deref(), Some("BROOKLYN"));
        assert_eq!(first.postal_code.as_deref(), Some("11208"));
        assert_eq!(first.hour_of_day, Some(9));
        assert_eq!(first.day_of_week, Some(2));
        let pos = first.position.unwrap();
        assert!((pos.latitude - 40.667_202).abs() < 1e-9);
    }

    #[test]
    fn coerces_malformed_fields_to_missing() {
        let records = read_incidents(CSV.as_bytes()).unwrap();

        assert!(records[1].position.is_none());
        assert_eq!(records[1].severity, Severity::Fatal);

        let third = &records[2];
        assert!(third.region.is_none());
        assert!(third.hour_of_day.is_none());
        assert_eq!(third.severity, Severity::PropertyDamageOnly);

        let fourth = &records[3];
        assert!(fourth.position.is_none());
        assert!(fourth.hour_of_day.is_none());
        assert!(fourth.day_of_week.is_none());
        assert_eq!(fourth.severity, Severity::PropertyDamageOnly);
    }

    #[test]
    fn accepts_canonical_column_names() {
        let csv = "id,latitude,longitude,region,postal_code,hour_of_day,day_of_week,severity\n\
                   a1,40.7,-74.0,Bronx,10451,0,0,property-damage-only\n";
        let records = read_incidents(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a1");
        assert_eq!(records[0].hour_of_day, Some(0));
        assert_eq!(records[0].day_of_week, Some(0));
    }

    #[test]
    fn missing_id_gets_row_number() {
        let csv = "latitude,longitude\n40.7,-74.0\n40.8,-73.9\n";
        let records = read_incidents(csv.as_bytes()).unwrap();
        assert_eq!(records[0].id, "row-1");
        assert_eq!(records[1].id, "row-2");
    }

    #[test]
    fn header_only_yields_no_records() {
        let records = read_incidents("id,latitude,longitude\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }
}
