pub mod assemble;
pub mod check;
pub mod info;
