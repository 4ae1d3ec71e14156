pub mod category;
pub mod pet_category;
pub mod pet_product;
pub mod product;
