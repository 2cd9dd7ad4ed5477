pub mod codec;
mod error;
mod hexedit;
mod text_field;

pub use codec::{Staged, decode, encode};
pub use error::CodecError;
pub use hexedit::{HexCommand, HexEditor};
pub use text_field::TextField;
