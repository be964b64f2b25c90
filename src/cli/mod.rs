//! The `tsdoc` binary's own front-end: argument parsing and the driver
//! that turns parsed args into one or more `load` calls against an
//! [`FsHost`](crate::FsHost) (§2.2).

pub mod args;
pub mod driver;
