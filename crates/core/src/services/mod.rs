pub mod archive;
pub mod copier;
pub mod fileinfo;
pub mod integrity;
pub mod manifest;
pub mod platform;
pub mod resolver;
pub mod script;
