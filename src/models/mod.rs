//! Diesel row models and their conversions into domain entities.

pub mod category;
pub mod product;
pub mod subcategory;
