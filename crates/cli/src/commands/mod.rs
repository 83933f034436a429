pub mod get;
pub mod list;
pub mod locate;
pub mod stack;
pub mod watch;

pub use get::get_command;
pub use list::list_command;
pub use locate::locate_command;
pub use stack::stack_command;
pub use watch::watch_command;
