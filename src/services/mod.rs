pub mod anki;
pub mod api;
pub mod deck;
pub mod normalize;
pub mod render;
pub mod wordlist;
