pub mod assets;
pub mod catalog;
pub mod cli;
pub mod conf;
pub mod format;
mod gateway;
pub mod layout;
pub mod logging;
pub mod logview;
pub mod server;
pub mod sink;
pub mod static_files;
pub mod status;
pub mod version;
