mod criteria;
mod invoice;
mod store;

pub use criteria::Criteria;
pub use invoice::{classify, trim_client_id, Invoice, Status};
pub use store::Store;
