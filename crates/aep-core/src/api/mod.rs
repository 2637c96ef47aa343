pub mod path;
pub mod resource;
pub mod service;

pub use path::{collection_url, placeholder_name, resource_url};
pub use resource::{CreateMethod, CustomMethod, DeleteMethod, GetMethod, ListMethod, Resource, UpdateMethod};
pub use service::Api;
