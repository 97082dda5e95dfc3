//! Physically mapped finite elements

pub mod arnold_awanou_winther;
mod layout;
mod matrix;
pub mod morley;
pub mod reference_cell;

pub use arnold_awanou_winther::ArnoldAwanouWinther;
pub use layout::ReferenceLayout;
pub use matrix::SymbolicMatrix;
pub use morley::Morley;
