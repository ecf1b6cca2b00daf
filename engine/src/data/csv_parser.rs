// Candle loader for semicolon-separated exports with Brazilian number formatting
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::models::Candle;

/// Field parsers for B3-style exports: `.` groups thousands, `,` marks the
/// decimal part, dates are day-first and every timestamp is read as UTC.
pub mod brazilian_format {
    use anyhow::{anyhow, Result};
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

    pub fn parse_decimal(field: &str) -> Result<f64> {
        let canonical: String = field
            .trim()
            .chars()
            .filter(|c| *c != '.')
            .map(|c| if c == ',' { '.' } else { c })
            .collect();
        canonical
            .parse::<f64>()
            .map_err(|e| anyhow!("'{}' is not a Brazilian-formatted number: {}", field, e))
    }

    /// `dd/mm/yyyy` plus `HH:MM:SS`.
    pub fn parse_datetime(date: &str, time: &str) -> Result<DateTime<Utc>> {
        let day = NaiveDate::parse_from_str(date.trim(), "%d/%m/%Y").map_err(|e| anyhow!("bad date '{}': {}", date, e))?;
        let clock = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S").map_err(|e| anyhow!("bad time '{}': {}", time, e))?;
        Ok(NaiveDateTime::new(day, clock).and_utc())
    }

}

// Header positions resolved once per file.
struct Columns {
    symbol: Option<usize>,
    date: usize,
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| anyhow!("Missing '{}' column in CSV header", name));
        Ok(Self {
            symbol: find("Ativo"),
            date: require("Data")?,
            time: require("Hora")?,
            open: require("Abertura")?,
            high: require("Máximo")?,
            low: require("Mínimo")?,
            close: require("Fechamento")?,
            volume: require("Volume")?,
        })
    }
}

pub struct BrazilianCsvParser;

impl BrazilianCsvParser {
    // CSV Header: Ativo;Data;Hora;Abertura;Máximo;Mínimo;Fechamento;Volume;Quantidade
    // Example Row: WINFUT;30/12/2024;18:20:00;124.080;124.090;123.938;123.983;600.822.115,84;24.228
    pub fn load_candles_from_csv(file_path: impl AsRef<Path>, symbol: &str) -> Result<Vec<Candle>> {
        let path = file_path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open CSV file '{}'", path.display()))?;
        let candles = Self::parse_candles(BufReader::new(file), symbol)?;
        tracing::info!(symbol = %symbol, path = %path.display(), count = candles.len(), "Loaded candles from CSV");
        Ok(candles)
    }

    /// Parses candles for `symbol`. Rows for other symbols are skipped when the
    /// file has an `Ativo` column; otherwise every row is taken.
    pub fn parse_candles<R: Read>(reader: R, symbol: &str) -> Result<Vec<Candle>> {
        let mut rdr = ReaderBuilder::new().delimiter(b';').has_headers(true).from_reader(reader);
        let columns = Columns::resolve(rdr.headers()?)?;

        let mut candles = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result.map_err(|e| anyhow!("Error reading CSV record at line {}: {}", line, e))?;

            if let Some(pos) = columns.symbol {
                if record.get(pos).map(str::trim) != Some(symbol) {
                    continue;
                }
            }
            candles.push(Self::parse_record(&record, &columns, line)?);
        }
        Ok(candles)
    }

    fn parse_record(record: &StringRecord, columns: &Columns, line: usize) -> Result<Candle> {
        let field = |pos: usize, name: &str| {
            record.get(pos).ok_or_else(|| anyhow!("Missing '{}' field in CSV record at line {}", name, line))
        };
        let decimal = |pos: usize, name: &str| -> Result<f64> {
            brazilian_format::parse_decimal(field(pos, name)?)
                .map_err(|e| anyhow!("Error parsing '{}' at line {}: {}", name, line, e))
        };

        let timestamp = brazilian_format::parse_datetime(field(columns.date, "Data")?, field(columns.time, "Hora")?)
            .map_err(|e| anyhow!("Error parsing datetime at line {}: {}", line, e))?;

        Ok(Candle::new(
            timestamp,
            decimal(columns.open, "Abertura")?,
            decimal(columns.high, "Máximo")?,
            decimal(columns.low, "Mínimo")?,
            decimal(columns.close, "Fechamento")?,
            decimal(columns.volume, "Volume")?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_candles_from_csv_valid_data() {
        let csv_content = "\
Ativo;Data;Hora;Abertura;Máximo;Mínimo;Fechamento;Volume;Quantidade
WINFUT;30/12/2024;18:20:00;124.080;124.090;123.938;123.983;600.822.115,84;24.228
PETR4;02/01/2023;10:00:00;23,50;23,80;23,40;23,75;1.000.000,00;1000
WINFUT;30/12/2024;18:21:00;123.983;124.010;123.900;124.000;1.000,50;10";
        let tmp_file = create_test_csv(csv_content);
        let candles = BrazilianCsvParser::load_candles_from_csv(tmp_file.path(), "WINFUT").unwrap();

        assert_eq!(candles.len(), 2);
        // WINFUT quotes index points, so "124.080" is 124080
        assert_eq!(candles[0].timestamp, brazilian_format::parse_datetime("30/12/2024", "18:20:00").unwrap());
        assert_eq!(candles[0].open, 124080.0);
        assert_eq!(candles[0].high, 124090.0);
        assert_eq!(candles[0].low, 123938.0);
        assert_eq!(candles[0].close, 123983.0);
        assert_eq!(candles[0].volume, 600822115.84);
        assert_eq!(candles[1].close, 124000.0);
    }

    #[test]
    fn test_parse_candles_without_symbol_column() {
        let csv_content = "Data;Hora;Abertura;Máximo;Mínimo;Fechamento;Volume\n02/01/2023;10:00:00;23,50;23,80;23,40;23,75;1.000.000,00\n";
        let candles = BrazilianCsvParser::parse_candles(csv_content.as_bytes(), "PETR4").unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].open, 23.50);
        assert_eq!(candles[0].volume, 1000000.0);
    }

    #[test]
    fn test_load_candles_from_csv_header_only() {
        let tmp_file = create_test_csv("Ativo;Data;Hora;Abertura;Máximo;Mínimo;Fechamento;Volume;Quantidade");
        let candles = BrazilianCsvParser::load_candles_from_csv(tmp_file.path(), "WINFUT").unwrap();
        assert!(candles.is_empty());
    }

    #[test]
    fn test_load_candles_from_csv_missing_column() {
        let csv_content = "\
Ativo;Data;Hora;Abertura;Máximo;Mínimo;Fechamento
WINFUT;30/12/2024;18:20:00;124.080;124.090;123.938;123.983";
        let tmp_file = create_test_csv(csv_content);
        let err = BrazilianCsvParser::load_candles_from_csv(tmp_file.path(), "WINFUT").unwrap_err();
        assert!(err.to_string().contains("Missing 'Volume' column"));
    }

    #[test]
    fn test_load_candles_from_csv_invalid_number() {
        let csv_content = "\
Ativo;Data;Hora;Abertura;Máximo;Mínimo;Fechamento;Volume;Quantidade
WINFUT;30/12/2024;18:20:00;invalid;124.090;123.938;123.983;600.822.115,84;24.228";
        let tmp_file = create_test_csv(csv_content);
        let err = BrazilianCsvParser::load_candles_from_csv(tmp_file.path(), "WINFUT").unwrap_err();
        assert!(err.to_string().contains("Error parsing 'Abertura'"));
    }

    #[test]
    fn test_load_candles_from_missing_file() {
        let err = BrazilianCsvParser::load_candles_from_csv("/no/such/file.csv", "WINFUT").unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
