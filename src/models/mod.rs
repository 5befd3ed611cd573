pub mod metric;
pub mod params;
pub mod region;
pub mod rendered;
pub mod request;
pub mod row;
pub mod series;

pub use metric::*;
pub use params::*;
pub use region::*;
pub use rendered::*;
pub use request::*;
pub use row::*;
pub use series::*;
