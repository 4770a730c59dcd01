mod matcher;
mod mock;
mod registry;
mod status;
