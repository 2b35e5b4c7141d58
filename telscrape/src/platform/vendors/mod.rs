//! Built-in vendor profiles.

pub mod huawei;
pub mod zte;
