//! Row source: delimited tables with a header row.
//!
//! Both input formats are semicolon-separated by default. Header names and
//! values are trimmed, and fully blank records are skipped.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;

use crate::error::{Result, SourceError};

/// One input record: column name to value, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRow {
    /// 1-based line number of the record in the input file.
    pub line: u64,
    fields: IndexMap<String, String>,
}

impl DeviceRow {
    /// Build a row from column/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            line: 0,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a column, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Value of a column if present and non-empty.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        Some(self.get(column)).filter(|v| !v.is_empty())
    }

    /// Check if a column exists in the row.
    pub fn has(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Iterate over (column, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Reader for a delimited input table.
///
/// # Example
///
/// ```rust,no_run
/// use netdeploy::source::RowSource;
///
/// # fn example() -> Result<(), netdeploy::Error> {
/// let rows = RowSource::new("BST-D-1-242.csv")
///     .delimiter(b';')
///     .require(&["Vlan", "Switch"])
///     .read()?;
/// println!("{} rows", rows.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RowSource {
    path: PathBuf,
    delimiter: u8,
    required: Vec<String>,
}

impl RowSource {
    /// Create a reader for `path` with the default `;` delimiter.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b';',
            required: Vec::new(),
        }
    }

    /// Set the field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Columns that must appear in the header row.
    pub fn require(mut self, columns: &[&str]) -> Self {
        self.required = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record.
    pub fn read(&self) -> Result<Vec<DeviceRow>> {
        if !self.path.exists() {
            return Err(SourceError::NotFound {
                path: self.path.clone(),
            }
            .into());
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.csv_error(e))?;

        let headers = reader.headers().map_err(|e| self.csv_error(e))?.clone();
        if headers.iter().all(str::is_empty) {
            return Err(self.parse_error(None, "missing header row"));
        }

        let missing: Vec<&str> = self
            .required
            .iter()
            .map(String::as_str)
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(self.parse_error(
                Some(1),
                format!("missing required column(s): {}", missing.join(", ")),
            ));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.csv_error(e))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let mut row = DeviceRow::from_pairs(headers.iter().zip(record.iter()));
            row.line = line;
            rows.push(row);
        }

        debug!(
            "Read {} row(s) from {}",
            rows.len(),
            self.path.display()
        );
        Ok(rows)
    }

    fn parse_error(&self, line: Option<u64>, message: impl Into<String>) -> crate::Error {
        SourceError::Parse {
            path: self.path.clone(),
            line,
            message: message.into(),
        }
        .into()
    }

    fn csv_error(&self, error: csv::Error) -> crate::Error {
        let line = error.position().map(|p| p.line());
        match error.into_kind() {
            csv::ErrorKind::Io(source) => SourceError::Io {
                path: self.path.clone(),
                source,
            }
            .into(),
            kind => self.parse_error(line, describe_csv_error(kind)),
        }
    }
}

fn describe_csv_error(kind: csv::ErrorKind) -> String {
    match kind {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("found {len} field(s), expected {expected_len}"),
        csv::ErrorKind::Utf8 { err, .. } => format!("invalid UTF-8: {err}"),
        other => format!("{other:?}"),
    }
}

/// Typed view of a switch-configuration row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchRow {
    pub line: u64,
    pub vlan: String,
    pub description: String,
    pub ip_address: String,
    pub netmask: String,
    pub switch: String,
    pub ports: String,
    pub vlan_filtering: String,
}

impl SwitchRow {
    pub const VLAN: &'static str = "Vlan";
    pub const DESCRIPTION: &'static str = "Description";
    pub const IP_ADDRESS: &'static str = "IP Address";
    pub const NETMASK: &'static str = "Netmask";
    pub const SWITCH: &'static str = "Switch";
    pub const PORTS: &'static str = "Ports";
    pub const VLAN_FILTERING: &'static str = "vlan filtering";

    /// Columns every switch table must carry.
    pub const REQUIRED: [&'static str; 6] = [
        Self::VLAN,
        Self::DESCRIPTION,
        Self::IP_ADDRESS,
        Self::NETMASK,
        Self::SWITCH,
        Self::PORTS,
    ];

    pub fn from_row(row: &DeviceRow) -> Self {
        Self {
            line: row.line,
            vlan: row.get(Self::VLAN).to_string(),
            description: row.get(Self::DESCRIPTION).to_string(),
            ip_address: row.get(Self::IP_ADDRESS).to_string(),
            netmask: row.get(Self::NETMASK).to_string(),
            switch: row.get(Self::SWITCH).to_string(),
            ports: row.get(Self::PORTS).to_string(),
            vlan_filtering: row.get(Self::VLAN_FILTERING).to_string(),
        }
    }

    /// Read a switch table, checking for the required columns.
    pub fn read(path: impl Into<PathBuf>, delimiter: u8) -> Result<Vec<Self>> {
        let rows = RowSource::new(path)
            .delimiter(delimiter)
            .require(&Self::REQUIRED)
            .read()?;
        Ok(rows.iter().map(Self::from_row).collect())
    }
}

/// Typed view of a router-configuration row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterRow {
    pub line: u64,
    pub network: String,
    pub interface: String,
    pub description: String,
    pub vlan: String,
    pub ip_address: String,
    pub subnet_mask: String,
    pub default_gateway: String,
}

impl RouterRow {
    pub const NETWORK: &'static str = "network";
    pub const INTERFACE: &'static str = "interface";
    pub const DESCRIPTION: &'static str = "description";
    pub const VLAN: &'static str = "vlan";
    pub const IP_ADDRESS: &'static str = "ipaddress";
    pub const SUBNET_MASK: &'static str = "subnetmask";
    pub const DEFAULT_GATEWAY: &'static str = "defaultgateway";

    /// Columns every router table must carry.
    pub const REQUIRED: [&'static str; 1] = [Self::INTERFACE];

    pub fn from_row(row: &DeviceRow) -> Self {
        let vlan = if row.has(Self::VLAN) {
            row.get(Self::VLAN)
        } else {
            "0"
        };
        Self {
            line: row.line,
            network: row.get(Self::NETWORK).to_string(),
            interface: row.get(Self::INTERFACE).to_string(),
            description: row.get(Self::DESCRIPTION).to_string(),
            vlan: vlan.to_string(),
            ip_address: row.get(Self::IP_ADDRESS).to_string(),
            subnet_mask: row.get(Self::SUBNET_MASK).to_string(),
            default_gateway: row.get(Self::DEFAULT_GATEWAY).to_string(),
        }
    }

    /// Read a router table, checking for the required columns.
    pub fn read(path: impl Into<PathBuf>, delimiter: u8) -> Result<Vec<Self>> {
        let rows = RowSource::new(path)
            .delimiter(delimiter)
            .require(&Self::REQUIRED)
            .read()?;
        Ok(rows.iter().map(Self::from_row).collect())
    }
}
