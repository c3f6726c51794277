pub mod calibrate;
pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
