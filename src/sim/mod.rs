pub mod event;
pub mod maze;
pub mod mode;
pub mod scheduler;
pub mod session;
pub mod step;
