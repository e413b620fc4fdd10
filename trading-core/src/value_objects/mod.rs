mod side;
mod symbol;

pub use side::BookSide;
pub use symbol::Symbol;
