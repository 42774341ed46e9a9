mod load;
mod parse;
mod person;

pub use load::{LoadError, load_people};
pub use parse::parse_people;
pub use person::Person;
