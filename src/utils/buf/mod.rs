mod buf_slice;
mod buf_wtr;
mod owned_buf_wtr;

pub use buf_slice::*;
pub use buf_wtr::*;
pub use owned_buf_wtr::*;
