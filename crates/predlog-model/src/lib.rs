pub mod error;
pub mod layout;
pub mod schema;
pub mod table;
pub mod value;

pub use error::{ModelError, Result};
pub use layout::{
    BINARIZED_OUTCOME_COLUMN, BINARIZED_PREDICTION_COLUMN, ColumnLayout, OUTCOME_SUFFIX,
    PREDICTION_VALUE_COLUMN, PayloadKeys,
};
pub use schema::SchemaDescriptor;
pub use table::{Column, ColumnOrigin, Row, Table};
pub use value::{FieldValue, format_numeric, parse_f64};
