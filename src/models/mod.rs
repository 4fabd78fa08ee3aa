pub mod course;
pub mod draft;
pub mod term;

pub use course::Course;
pub use draft::Draft;
pub use term::{Session, Term, parse_term, term_id, term_name_matches, term_sort_key};
