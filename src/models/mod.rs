pub mod archetype;
pub mod card;
pub mod deck;
pub mod replacement;
pub mod violation;

pub use archetype::*;
pub use card::*;
pub use deck::*;
pub use replacement::*;
pub use violation::*;
