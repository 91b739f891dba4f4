pub mod a001_technique;
pub mod a002_season;
pub mod a003_product;
pub mod common;
