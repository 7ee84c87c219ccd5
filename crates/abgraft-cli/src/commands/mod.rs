pub mod germlines;
pub mod graft;
