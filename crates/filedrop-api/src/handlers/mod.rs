pub mod files;
pub mod upload_url;
