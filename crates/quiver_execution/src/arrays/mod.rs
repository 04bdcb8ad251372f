pub mod batch;
pub mod compute;
pub mod datatype;
pub mod field;
pub mod scalar;
pub mod vector;
