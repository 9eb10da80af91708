pub mod clear_data;
pub mod dispatch;
pub mod incident;
pub mod numbering;
pub mod shared;
pub mod summary;
pub mod support;
pub mod volunteer;
