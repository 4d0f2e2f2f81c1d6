pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network contains a link with a missing endpoint: {link_id}")]
    MissingEndpoint { link_id: String },
}
