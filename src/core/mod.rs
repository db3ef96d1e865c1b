pub mod classifier;
pub mod parser;
pub mod tracking;
pub mod upload;
pub mod validator;

pub use crate::domain::model::{Row, UploadResult};
pub use crate::domain::ports::{ConfigProvider, RowStore, Storage, TableNames};
pub use crate::domain::query::{FarmScope, Query};
pub use crate::utils::error::Result;
