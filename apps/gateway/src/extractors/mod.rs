pub mod current_session;

pub use current_session::CurrentSession;
