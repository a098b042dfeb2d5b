pub mod network_file;
pub mod trajectory_csv;
