//! Batch input and output formats for the command-line front end.

pub mod csv;
