pub mod books;
pub mod categories;
pub mod oscars;
pub mod quotes;
