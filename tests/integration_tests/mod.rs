pub mod replace_files;
