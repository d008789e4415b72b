// Server module entry
// Listener creation, connection serving and the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the file is mounted as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::{create_listener, describe_bind_error};
pub use server_loop::start_server_loop;
pub use signal::{start_signal_handler, SignalHandler};
