//! Data module for locating and acquiring ephemeris kernels
//!
//! This module finds a JPL SPK kernel on disk, searching an explicit
//! override, caller-supplied directories and the cache directories, and
//! downloads a public kernel into the user cache when nothing is found.

mod kernel;

pub use kernel::{
    ensure_kernel_available, expand_home, HttpSource, KernelError, KernelSearch, KernelSource,
    SearchPlan, DEFAULT_EPHEMERIS_NAME, DOWNLOAD_NAME, EPHEMERIS_PATH_ENV, JPL_DE421_URL,
    KERNEL_CANDIDATE_NAMES,
};
