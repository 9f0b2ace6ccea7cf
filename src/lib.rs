// Quillbook - Collaborative Notebook Replica

pub mod mimetype;
pub mod notebook;
pub mod replica;
pub mod session;
