pub mod processed_file;
