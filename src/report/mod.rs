//! Rendering and export of dashboard rows.

pub mod generator;

pub use generator::{
    generate_csv, generate_json_report, generate_markdown_report, generate_table_page,
    write_output, PageInfo,
};
