pub mod attestation_writer;
pub mod request_reader;
