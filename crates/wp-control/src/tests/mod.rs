mod error;
mod lock;
