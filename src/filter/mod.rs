pub mod error;
pub mod filter_order;
pub mod filter_where;
pub mod path;
pub mod projection;
pub mod types;
pub mod value;

pub use error::FilterError;
pub use filter_order::FilterOrder;
pub use filter_where::FilterWhere;
pub use types::*;
