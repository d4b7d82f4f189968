#[allow(non_snake_case)]
pub mod Descriptors;
#[allow(non_snake_case)]
pub mod Materials;
#[allow(non_snake_case)]
pub mod Utils;
