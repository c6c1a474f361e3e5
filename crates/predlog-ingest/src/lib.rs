pub mod csv_table;
pub mod record_parser;

pub use csv_table::{read_csv_from, read_csv_table, write_csv_table, write_csv_to};
pub use record_parser::{
    Record, parse_cell, parse_flag, parse_json_object, try_parse_json_object,
};
