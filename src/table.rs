use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use std::path::{Path, PathBuf};

use crate::brl::Brl;

/// Tokens in the `valor` column that mean "no amount recorded".
const MISSING_TOKENS: &[&str] = &["", "N/A", "Unknown", "NULL"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// A single sales record.
///
/// The CSV headers are Portuguese (`data`, `valor`, `cliente`, `produto`),
/// with English aliases accepted for each column. A recognized missing-value
/// token in the amount column becomes `None` rather than failing the row,
/// and a date that parses with none of the accepted formats also becomes
/// `None`.
#[derive(Clone, Debug, Deserialize)]
pub struct Sale {
    #[serde(rename = "data", alias = "date", deserialize_with = "opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "valor", alias = "amount", deserialize_with = "opt_amount")]
    pub amount: Option<Brl>,
    #[serde(rename = "cliente", alias = "customer")]
    pub customer: String,
    #[serde(rename = "produto", alias = "product")]
    pub product: String,
}

fn opt_amount<'de, D>(deserializer: D) -> Result<Option<Brl>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if MISSING_TOKENS.contains(&raw) {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(serde::de::Error::custom)
}

fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if MISSING_TOKENS.contains(&raw) {
        return Ok(None);
    }
    Ok(DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok()))
}

/// Errors from loading a sales file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("sales file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("malformed sales file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Holds the sales records loaded from a single CSV file.
///
/// To load a file, use [`Table::load`]. The table keeps every source row,
/// including those with a missing amount; [`Table::valid`] iterates the
/// subset that carries an amount, which is what all aggregates are computed
/// over.
#[derive(Debug, Default)]
pub struct Table {
    sales: Vec<Sale>,
}

impl Table {
    /// Reads sales data from the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] if `path` does not exist, and
    /// [`LoadError::Parse`] if the file has a malformed structure or an
    /// amount that is neither a number nor a recognized missing-value token.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let parse_err = |source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let mut rdr = csv::Reader::from_path(path).map_err(parse_err)?;
        let mut sales = Vec::new();
        for result in rdr.deserialize() {
            sales.push(result.map_err(parse_err)?);
        }
        Ok(Self { sales })
    }

    /// Returns the number of records, counting those with a missing amount.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    /// Iterates all records in source-file order.
    pub fn iter(&self) -> impl Iterator<Item = &Sale> {
        self.sales.iter()
    }

    /// Iterates the records that carry an amount, paired with that amount,
    /// in source-file order.
    pub fn valid(&self) -> impl Iterator<Item = (&Sale, Brl)> {
        self.sales
            .iter()
            .filter_map(|sale| sale.amount.map(|amount| (sale, amount)))
    }
}

impl From<Vec<Sale>> for Table {
    fn from(sales: Vec<Sale>) -> Self {
        Self { sales }
    }
}
