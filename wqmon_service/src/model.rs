/// WaterQualityRecord, Field, Document, StoreError, IngestError
/// core data structures and error handling
///
/// Core data types for the water quality monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O. The only logic here is the mapping between the typed
/// record and the flat document shape the store persists.

use serde::{Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Wire field names
// ---------------------------------------------------------------------------
//
// These names are the contract with the existing collection. Units are part
// of the name and must be preserved byte for byte, including the odd
// spellings inherited from the source data set.

pub const FIELD_STATION: &str = "STATION CODE";
pub const FIELD_LOCATION: &str = "LOCATIONS";
pub const FIELD_REGION: &str = "STATE";
pub const FIELD_YEAR: &str = "year";
pub const FIELD_TEMPERATURE: &str = "Temp";
pub const FIELD_PH: &str = "PH";
pub const FIELD_DISSOLVED_OXYGEN: &str = "D.O. (mg/l)";
pub const FIELD_CONDUCTIVITY: &str = "CONDUCTIVITY (µmhos/cm)";
pub const FIELD_BOD: &str = "B.O.D. (mg/l)";
pub const FIELD_NITRATE: &str = "NITRATENAN N+ NITRITENANN (mg/l)";
pub const FIELD_FECAL_COLIFORM: &str = "FECAL COLIFORM (MPN/100ml)";
pub const FIELD_TOTAL_COLIFORM: &str = "TOTAL COLIFORM (MPN/100ml)Mean";

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A record exactly as the store holds it: a flat mapping of field name to
/// scalar value. Nothing about the shape is guaranteed on read.
pub type Document = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// The fixed field vocabulary of a water quality record.
///
/// Serializes as its wire name, so report output lines up with raw rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Station,
    Location,
    Region,
    Year,
    Temperature,
    Ph,
    DissolvedOxygen,
    Conductivity,
    Bod,
    Nitrate,
    FecalColiform,
    TotalColiform,
}

impl Field {
    /// Every field, in registry order.
    pub const ALL: [Field; 12] = [
        Field::Station,
        Field::Location,
        Field::Region,
        Field::Year,
        Field::Temperature,
        Field::Ph,
        Field::DissolvedOxygen,
        Field::Conductivity,
        Field::Bod,
        Field::Nitrate,
        Field::FecalColiform,
        Field::TotalColiform,
    ];

    /// Fields the normalizer coerces to numbers.
    pub const NUMERIC: [Field; 9] = [
        Field::Year,
        Field::Temperature,
        Field::Ph,
        Field::DissolvedOxygen,
        Field::Conductivity,
        Field::Bod,
        Field::Nitrate,
        Field::FecalColiform,
        Field::TotalColiform,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Station => FIELD_STATION,
            Field::Location => FIELD_LOCATION,
            Field::Region => FIELD_REGION,
            Field::Year => FIELD_YEAR,
            Field::Temperature => FIELD_TEMPERATURE,
            Field::Ph => FIELD_PH,
            Field::DissolvedOxygen => FIELD_DISSOLVED_OXYGEN,
            Field::Conductivity => FIELD_CONDUCTIVITY,
            Field::Bod => FIELD_BOD,
            Field::Nitrate => FIELD_NITRATE,
            Field::FecalColiform => FIELD_FECAL_COLIFORM,
            Field::TotalColiform => FIELD_TOTAL_COLIFORM,
        }
    }

    /// Looks up a field by its exact wire name. Returns `None` for names
    /// outside the vocabulary.
    pub fn from_wire_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.wire_name() == name)
    }

    /// Position of this field in `Field::ALL` and `fields::FIELD_REGISTRY`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_numeric(self) -> bool {
        Field::NUMERIC.contains(&self)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Record type
// ---------------------------------------------------------------------------

/// One water quality observation after normalization.
///
/// Every field may be absent. Numeric fields hold only values that parsed
/// cleanly; anything else was dropped by `normalize`. Fields outside the
/// vocabulary are carried verbatim in `extra` so nothing is lost on a
/// normalize → document round trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WaterQualityRecord {
    pub station: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub year: Option<i32>,
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    pub dissolved_oxygen: Option<f64>,
    pub conductivity: Option<f64>,
    pub bod: Option<f64>,
    pub nitrate: Option<f64>,
    pub fecal_coliform: Option<f64>,
    pub total_coliform: Option<f64>,
    pub extra: Document,
}

impl WaterQualityRecord {
    /// Numeric value of `field`, or `None` if absent or a text field.
    /// The year is widened to `f64` so it can be averaged like the rest.
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Station | Field::Location | Field::Region => None,
            Field::Year => self.year.map(f64::from),
            Field::Temperature => self.temperature,
            Field::Ph => self.ph,
            Field::DissolvedOxygen => self.dissolved_oxygen,
            Field::Conductivity => self.conductivity,
            Field::Bod => self.bod,
            Field::Nitrate => self.nitrate,
            Field::FecalColiform => self.fecal_coliform,
            Field::TotalColiform => self.total_coliform,
        }
    }

    /// Text value of `field`, or `None` if absent or a numeric field.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Station => self.station.as_deref(),
            Field::Location => self.location.as_deref(),
            Field::Region => self.region.as_deref(),
            _ => None,
        }
    }

    /// Renders the record back into the store's flat document shape.
    /// Absent fields are omitted rather than written as null.
    pub fn to_document(&self) -> Document {
        let mut doc = self.extra.clone();
        for field in Field::ALL {
            let value = match field {
                Field::Station | Field::Location | Field::Region => {
                    self.text(field).map(|s| Value::String(s.to_string()))
                }
                Field::Year => self.year.map(Value::from),
                _ => self.value(field).map(Value::from),
            };
            if let Some(value) = value {
                doc.insert(field.wire_name().to_string(), value);
            }
        }
        doc
    }
}

/// Converts a slice of records into documents, preserving order.
pub fn to_documents(records: &[WaterQualityRecord]) -> Vec<Document> {
    records.iter().map(WaterQualityRecord::to_document).collect()
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by a record store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store could not be reached, or the connection target is invalid.
    Connection(String),
    /// The store was reachable but refused the write.
    Write(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StoreError::Write(msg) => write!(f, "Write error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors raised when submitting a new record.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// The submitted form failed validation; the store was not touched.
    Invalid(String),
    /// The store rejected the record or could not be reached.
    Store(StoreError),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Invalid(msg) => write!(f, "Invalid submission: {}", msg),
            IngestError::Store(err) => write!(f, "Submission failed: {}", err),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Invalid(_) => None,
            IngestError::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        IngestError::Store(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
