//! Output and restart I/O (§6): XDMF+HDF5 snapshots for visualization and
//! the HDF5 restart format `solve` uses for `auto_save_interval` checkpoints.

pub mod output;
pub mod restart;
