pub mod copy;
pub mod local;
pub mod types;

pub use copy::{copy_dir_local, copy_file_local, sync_times, CopyTotals};
pub use local::LocalFs;
pub use types::*;
