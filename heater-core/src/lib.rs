pub mod counts;
pub mod heatmap;
pub mod matrix;

pub use self::matrix::Matrix;
