pub mod dict;
pub mod dictionary;
pub mod input;
pub mod policy;
pub mod proximity;
pub mod search;
pub mod session;
pub mod settings;
pub mod suggestion;
pub mod unicode;

pub use dict::{DictError, DictFlags, DictionaryFile, FormatError, Header};
pub use dictionary::Dictionary;
pub use input::{InputPoint, KeySet, QueryInput};
pub use proximity::{Key, KeyboardLayout, ProximityInfo};
pub use session::{SuggestOptions, TraversalSession};
pub use suggestion::{OutputType, SuggestedWord};
